//! Preview evaluator: runs compiled driver expressions against a live pose sample, the
//! way the host's driver system would.

use super::{
    DriverExpression, DriverKind, DriverVariable, TransformType, VariableRotationMode,
    VariableSource,
};
use crate::error::{PoseDriverError, Result};
use crate::math::swing_twist;
use crate::pose::PoseSample;
use hashbrown::HashMap;
use meval::{Context, ContextProvider, Expr};

struct VariableContext<'a> {
    values: &'a HashMap<String, f64>,
}

impl ContextProvider for VariableContext<'_> {
    fn get_var(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Functions the compiler may emit beyond the evaluator's builtins.
fn driver_context() -> Context<'static> {
    let mut context = Context::new();
    context.func2("pow", f64::powf);
    context.func("fabs", f64::abs);
    context.func3("clamp", |value, lo, hi| value.max(lo).min(hi));
    context
}

/// Read the value a variable would see on `live`. `distances` backs distance elements.
pub fn sample_variable(variable: &DriverVariable, live: &PoseSample, distances: &[f64]) -> f64 {
    match &variable.source {
        VariableSource::Transform {
            transform_type,
            rotation_mode,
            ..
        } => sample_transform(*transform_type, *rotation_mode, live),
        VariableSource::BBoneProperty { channel, .. } => live.bbone.get(*channel),
        VariableSource::DistanceElement { index, .. } => {
            distances.get(*index).copied().unwrap_or(0.0)
        }
    }
}

fn sample_transform(
    transform_type: TransformType,
    rotation_mode: VariableRotationMode,
    live: &PoseSample,
) -> f64 {
    use TransformType::*;
    match transform_type {
        LocX => live.location()[0],
        LocY => live.location()[1],
        LocZ => live.location()[2],
        ScaleX => live.scale()[0],
        ScaleY => live.scale()[1],
        ScaleZ => live.scale()[2],
        RotW | RotX | RotY | RotZ => {
            let component = match transform_type {
                RotW => 0,
                RotX => 1,
                RotY => 2,
                _ => 3,
            };
            match rotation_mode {
                VariableRotationMode::Quaternion => live.quaternion()[component],
                VariableRotationMode::Euler(order) => {
                    if component == 0 {
                        0.0
                    } else {
                        live.euler(order.resolve(live.rotation_order))[component - 1]
                    }
                }
                VariableRotationMode::SwingTwist(axis) => {
                    let (swing, twist) = swing_twist(live.quaternion(), axis);
                    if component == axis.index() + 1 {
                        twist
                    } else {
                        swing[component]
                    }
                }
            }
        }
    }
}

/// Bind every variable of `driver` against `live`.
pub fn bind(
    driver: &DriverExpression,
    live: &PoseSample,
    distances: &[f64],
) -> HashMap<String, f64> {
    driver
        .variables
        .iter()
        .map(|v| (v.name.clone(), sample_variable(v, live, distances)))
        .collect()
}

/// Evaluate `driver` with explicit variable values.
pub fn evaluate(driver: &DriverExpression, values: &HashMap<String, f64>) -> Result<f64> {
    match driver.kind {
        DriverKind::Average => {
            if driver.variables.is_empty() {
                return Ok(0.0);
            }
            let mut sum = 0.0;
            for variable in &driver.variables {
                sum += values.get(&variable.name).copied().ok_or_else(|| {
                    PoseDriverError::Expression {
                        expression: driver.expression.clone(),
                        reason: format!("unbound variable '{}'", variable.name),
                    }
                })?;
            }
            Ok(sum / driver.variables.len() as f64)
        }
        DriverKind::Scripted => {
            let expr: Expr = driver
                .expression
                .parse()
                .map_err(|err: meval::Error| PoseDriverError::Expression {
                    expression: driver.expression.clone(),
                    reason: err.to_string(),
                })?;
            let context = driver_context();
            expr.eval_with_context((VariableContext { values }, &context))
                .map_err(|err| PoseDriverError::Expression {
                    expression: driver.expression.clone(),
                    reason: err.to_string(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{AxisFlags, ChannelSelection, RotationChannel};
    use crate::expr::{compile_family, BoneTarget};
    use crate::math::{Axis, EulerOrder, PoseTransform, RotationOrder};
    use crate::metrics::{family_distance, BBoneNorms};
    use crate::pose::BBoneChannel;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn pose(loc: [f64; 3], euler: [f64; 3]) -> PoseSample {
        PoseSample::new(PoseTransform::compose(
            loc,
            EulerOrder::Xyz.to_quaternion(euler),
            [1.0, 1.1, 0.9],
        ))
        .with_bbone(BBoneChannel::CurveInX, 0.3)
    }

    /// The compiled formula must agree with the metric it stands in for.
    #[test]
    fn compiled_formulas_match_metrics() {
        let reference = pose([0.1, 0.2, -0.3], [0.4, -0.2, 0.9]);
        let live = pose([0.5, -0.1, 0.0], [-0.1, 0.3, 0.2]).with_bbone(BBoneChannel::EaseOut, 0.7);
        let norms = BBoneNorms::from_poses([&reference, &live]);
        let rotations = [
            RotationChannel::Quaternion,
            RotationChannel::Swing { axis: Axis::Y },
            RotationChannel::Swing { axis: Axis::X },
            RotationChannel::Twist { axis: Axis::Z },
            RotationChannel::Euler {
                order: RotationOrder::Auto,
                axes: AxisFlags::new(true, false, true),
            },
        ];
        for rotation in rotations {
            let sel = ChannelSelection::default()
                .with_location(AxisFlags::ALL)
                .with_rotation(rotation)
                .with_scale(AxisFlags::new(false, true, true))
                .with_bbone(BBoneChannel::CurveInX)
                .with_bbone(BBoneChannel::EaseOut);
            for family in sel.families() {
                let driver = compile_family(
                    family,
                    &sel,
                    &BoneTarget::new("Armature", "bone"),
                    &reference,
                    &norms,
                );
                let values = bind(&driver, &live, &[]);
                let got = evaluate(&driver, &values).unwrap();
                let expected = family_distance(&live, &reference, family, &sel, &norms);
                assert!(
                    approx(got, expected, 1e-9),
                    "{rotation:?}/{family:?}: {got} vs {expected} in {}",
                    driver.expression
                );
            }
        }
    }

    #[test]
    fn average_requires_bound_variables() {
        let driver = DriverExpression::average("pds_x", 2);
        let mut values = HashMap::new();
        values.insert("distance_1".to_string(), 0.2);
        assert!(evaluate(&driver, &values).is_err());
        values.insert("distance_2".to_string(), 0.6);
        assert!(approx(evaluate(&driver, &values).unwrap(), 0.4, 1e-12));
    }

    #[test]
    fn constant_zero_evaluates_without_variables() {
        let driver = DriverExpression::constant_zero();
        assert_eq!(evaluate(&driver, &HashMap::new()).unwrap(), 0.0);
    }
}
