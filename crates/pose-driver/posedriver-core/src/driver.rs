//! Generated driver set of one shape key and its preview evaluation.
//!
//! Each active family writes its distance into one element of the shape key's distance
//! array through a scripted driver and a linear normalization curve. An average driver
//! combines the elements and the falloff keyframes map the average onto the weight.

use crate::activation::Activation;
use crate::channels::DistanceFamily;
use crate::curve::{Extrapolation, Keyframe, KeyframeCurve};
use crate::error::Result;
use crate::expr::{bind, compile_family, evaluate, DriverExpression};
use crate::group::PoseGroup;
use crate::ids::ShapeKeyId;
use crate::metrics::{family_distance, BBoneNorms};
use crate::pose::PoseSample;
use crate::shape_key::DrivenShapeKey;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FamilyDriver {
    pub family: DistanceFamily,
    /// Element of the distance array this driver writes
    pub index: usize,
    pub driver: DriverExpression,
    /// Maps the raw distance into `[1 - radius, 1]`
    pub normalization: KeyframeCurve,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeKeyDriver {
    pub shape_key: ShapeKeyId,
    /// Host data key of the distance array
    pub data_key: String,
    pub families: Vec<FamilyDriver>,
    /// Driver of the shape key weight
    pub combined: DriverExpression,
    /// Keyframes applied to the combined driver; empty for a constant zero driver
    pub falloff: KeyframeCurve,
    pub weight_path: String,
    pub mute: bool,
    /// Group bendy-bone norms inlined in the family formulas
    pub norms: BBoneNorms,
}

/// Per-shape-key distance array slot, one element per active family. Elements hold the
/// normalized family values, after the normalization curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct DistanceData {
    pub key: String,
    pub values: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverEvaluation {
    pub raw: Vec<f64>,
    pub normalized: Vec<f64>,
    pub combined: f64,
    pub weight: f64,
}

/// Linear map of a raw distance: 0 goes to `1 - radius`, `width` and beyond go to 1.
pub fn normalization_keyframes(radius: f64, width: f64) -> KeyframeCurve {
    let keyframes = if width > 0.0 {
        vec![Keyframe::linear(0.0, 1.0 - radius), Keyframe::linear(width, 1.0)]
    } else {
        vec![Keyframe::linear(0.0, 1.0)]
    };
    KeyframeCurve {
        keyframes,
        extrapolation: Extrapolation::Constant,
    }
}

/// Regenerate every driver of `shape` from scratch.
///
/// The normalization width of a family is the radius, shortened to the reference pose's
/// distance from the group rest so that the rest pose always reads as 1.
pub fn build_driver(
    shape: &DrivenShapeKey,
    group: &PoseGroup,
    norms: &BBoneNorms,
    epsilon: f64,
) -> ShapeKeyDriver {
    let channels = group.channels();
    let target = group.target();
    let activation: &Activation = shape.activation();
    let radius = activation.effective_radius(epsilon);
    let data_key = shape.id().data_key();

    let families: Vec<FamilyDriver> = channels
        .families()
        .into_iter()
        .enumerate()
        .map(|(index, family)| {
            let rest_distance =
                family_distance(shape.pose(), group.rest(), family, channels, norms);
            let width = if rest_distance > epsilon {
                radius.min(rest_distance)
            } else {
                radius
            };
            FamilyDriver {
                family,
                index,
                driver: compile_family(family, channels, &target, shape.pose(), norms),
                normalization: normalization_keyframes(radius, width),
            }
        })
        .collect();

    let (combined, falloff) = if families.is_empty() {
        (DriverExpression::constant_zero(), KeyframeCurve::default())
    } else {
        (
            DriverExpression::average(&data_key, families.len()),
            activation
                .falloff
                .activation_keyframes(radius, activation.target),
        )
    };

    ShapeKeyDriver {
        shape_key: shape.id(),
        data_key,
        families,
        combined,
        falloff,
        weight_path: shape.weight_path(),
        mute: shape.mute(),
        norms: *norms,
    }
}

impl ShapeKeyDriver {
    pub fn distance_data(&self) -> DistanceData {
        DistanceData {
            key: self.data_key.clone(),
            values: vec![0.0; self.families.len()],
        }
    }

    /// Run the whole chain against a live pose. A muted driver yields weight 0.
    pub fn evaluate(&self, live: &PoseSample) -> Result<DriverEvaluation> {
        let mut raw = Vec::with_capacity(self.families.len());
        let mut normalized = Vec::with_capacity(self.families.len());
        for family in &self.families {
            let value = evaluate(&family.driver, &bind(&family.driver, live, &[]))?;
            normalized.push(family.normalization.evaluate(value));
            raw.push(value);
        }
        let combined = evaluate(&self.combined, &bind(&self.combined, live, &normalized))?;
        let weight = if self.mute {
            0.0
        } else if self.falloff.is_empty() {
            combined
        } else {
            self.falloff.evaluate(combined)
        };
        Ok(DriverEvaluation {
            raw,
            normalized,
            combined,
            weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn normalization_spans_radius() {
        let keys = normalization_keyframes(0.2, 0.2);
        assert!(approx(keys.evaluate(0.0), 0.8, 1e-12));
        assert!(approx(keys.evaluate(0.1), 0.9, 1e-12));
        assert_eq!(keys.evaluate(0.5), 1.0);
    }

    #[test]
    fn zero_width_is_constant_one() {
        let keys = normalization_keyframes(0.2, 0.0);
        assert_eq!(keys.evaluate(0.0), 1.0);
        assert_eq!(keys.evaluate(3.0), 1.0);
    }
}
