//! Per-shape-key activation settings.

use crate::curve::FalloffCurve;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    radius: f64,
    /// Adopt the solver's nearest-neighbor radius whenever the group changes
    pub radius_auto_update: bool,
    /// Shape key value at full activation
    pub target: f64,
    pub falloff: FalloffCurve,
}

impl Default for Activation {
    fn default() -> Self {
        Self::new(0.2, 1.0, FalloffCurve::default())
    }
}

impl Activation {
    pub fn new(radius: f64, target: f64, falloff: FalloffCurve) -> Self {
        Self {
            radius: radius.clamp(0.0, 1.0),
            radius_auto_update: true,
            target,
            falloff,
        }
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the radius clamped to `[0, 1]`. Returns whether it changed.
    pub fn set_radius(&mut self, radius: f64) -> bool {
        let radius = if radius.is_nan() { 0.0 } else { radius.clamp(0.0, 1.0) };
        let changed = radius != self.radius;
        self.radius = radius;
        changed
    }

    /// Width of the falloff domain. A zero radius (no distinguishable neighbor) spans
    /// the whole unit domain instead of collapsing it.
    pub fn effective_radius(&self, epsilon: f64) -> f64 {
        if self.radius > epsilon {
            self.radius
        } else {
            1.0
        }
    }
}
