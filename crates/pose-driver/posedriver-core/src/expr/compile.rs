//! Expression compiler: one scripted driver per distance family.
//!
//! Reference values are inlined as literals, so the variable count always equals the
//! number of live channels sampled.

use super::{
    DriverExpression, DriverKind, DriverVariable, TransformSpace, TransformType,
    VariableRotationMode, VariableSource,
};
use crate::channels::{ChannelSelection, DistanceFamily, RotationChannel};
use crate::math::{rotate_axis, Axis, RotationOrder};
use crate::metrics::BBoneNorms;
use crate::pose::PoseSample;

/// Object and bone a driver samples.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BoneTarget {
    pub object: String,
    pub bone: String,
}

impl BoneTarget {
    pub fn new(object: impl Into<String>, bone: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            bone: bone.into(),
        }
    }

    fn transform(
        &self,
        name: &str,
        transform_type: TransformType,
        rotation_mode: VariableRotationMode,
    ) -> DriverVariable {
        DriverVariable {
            name: name.to_string(),
            source: VariableSource::Transform {
                object: self.object.clone(),
                bone: self.bone.clone(),
                transform_type,
                rotation_mode,
                space: TransformSpace::LocalSpace,
            },
        }
    }
}

/// Format a reference value as an expression literal. Negative values are parenthesized.
pub fn literal(value: f64) -> String {
    // -0.0 would print as "-0.0" and read as a double minus.
    let value = if value == 0.0 { 0.0 } else { value };
    let text = format!("{value:?}");
    let text = if text.contains('e') {
        let fixed = format!("{value:.17}");
        let trimmed = fixed.trim_end_matches('0');
        if trimmed.ends_with('.') {
            format!("{trimmed}0")
        } else {
            trimmed.to_string()
        }
    } else {
        text
    };
    if value < 0.0 {
        format!("({text})")
    } else {
        text
    }
}

fn lower(axis: Axis) -> String {
    axis.name().to_ascii_lowercase()
}

fn euclidean(terms: &[String]) -> String {
    format!("sqrt({})", terms.join("+"))
}

fn squared_difference(variable: &str, reference: f64) -> String {
    format!("pow({}-{},2.0)", variable, literal(reference))
}

fn axis_family(
    target: &BoneTarget,
    axes: impl Iterator<Item = Axis>,
    values: [f64; 3],
    transform_type: fn(Axis) -> TransformType,
    rotation_mode: VariableRotationMode,
) -> DriverExpression {
    let mut variables = Vec::new();
    let mut terms = Vec::new();
    for axis in axes {
        let name = lower(axis);
        terms.push(squared_difference(&name, values[axis.index()]));
        variables.push(target.transform(&name, transform_type(axis), rotation_mode));
    }
    DriverExpression {
        kind: DriverKind::Scripted,
        expression: euclidean(&terms),
        variables,
    }
}

fn quaternion_variables(target: &BoneTarget) -> Vec<DriverVariable> {
    ["w", "x", "y", "z"]
        .iter()
        .zip(TransformType::QUATERNION)
        .map(|(name, tt)| target.transform(name, tt, VariableRotationMode::Quaternion))
        .collect()
}

/// Rotated-axis polynomial in the live `w, x, y, z` variables.
fn rotated_axis_terms(axis: Axis) -> [&'static str; 3] {
    match axis {
        Axis::X => [
            "(1.0-2.0*(y*y+z*z))",
            "2.0*(x*y+w*z)",
            "2.0*(x*z-w*y)",
        ],
        Axis::Y => [
            "2.0*(x*y-w*z)",
            "(1.0-2.0*(x*x+z*z))",
            "2.0*(y*z+w*x)",
        ],
        Axis::Z => [
            "2.0*(x*z+w*y)",
            "2.0*(y*z-w*x)",
            "(1.0-2.0*(x*x+y*y))",
        ],
    }
}

fn rotation_family(
    target: &BoneTarget,
    rotation: RotationChannel,
    reference: &PoseSample,
) -> DriverExpression {
    match rotation {
        RotationChannel::Euler { order, axes } => {
            let angles = reference.euler(order.resolve(reference.rotation_order));
            axis_family(
                target,
                axes.axes(),
                angles,
                TransformType::rotation,
                VariableRotationMode::Euler(order),
            )
        }
        RotationChannel::Quaternion => {
            let q = reference.quaternion();
            let dot = ["w", "x", "y", "z"]
                .iter()
                .zip(q)
                .map(|(name, value)| format!("{}*{}", name, literal(value)))
                .collect::<Vec<_>>()
                .join("+");
            DriverExpression {
                kind: DriverKind::Scripted,
                expression: format!(
                    "acos((2.0*pow(clamp({dot},-1.0,1.0),2.0))-1.0)/pi"
                ),
                variables: quaternion_variables(target),
            }
        }
        RotationChannel::Swing { axis } => {
            let reference_axis = rotate_axis(reference.quaternion(), axis);
            let dot = rotated_axis_terms(axis)
                .iter()
                .zip(reference_axis)
                .map(|(term, value)| format!("{}*{}", term, literal(value)))
                .collect::<Vec<_>>()
                .join("+");
            DriverExpression {
                kind: DriverKind::Scripted,
                expression: format!("(pi/2.0-asin(clamp({dot},-1.0,1.0)))/pi"),
                variables: quaternion_variables(target),
            }
        }
        RotationChannel::Twist { axis } => {
            let name = lower(axis);
            DriverExpression {
                kind: DriverKind::Scripted,
                expression: format!("fabs({}-{})/pi", name, literal(reference.twist(axis))),
                variables: vec![target.transform(
                    &name,
                    TransformType::rotation(axis),
                    VariableRotationMode::SwingTwist(axis),
                )],
            }
        }
    }
}

/// Compile the distance formula of one family against `reference`.
///
/// Bendy-bone differences are divided by the group's channel norms, matching the
/// normalization used by the distance matrix.
pub fn compile_family(
    family: DistanceFamily,
    selection: &ChannelSelection,
    target: &BoneTarget,
    reference: &PoseSample,
    norms: &BBoneNorms,
) -> DriverExpression {
    match family {
        DistanceFamily::Location => axis_family(
            target,
            selection.location.axes(),
            reference.location(),
            TransformType::location,
            VariableRotationMode::Euler(RotationOrder::Auto),
        ),
        DistanceFamily::Scale => axis_family(
            target,
            selection.scale.axes(),
            reference.scale(),
            TransformType::scale,
            VariableRotationMode::Euler(RotationOrder::Auto),
        ),
        DistanceFamily::Rotation => match selection.rotation {
            Some(rotation) if rotation.is_enabled() => {
                rotation_family(target, rotation, reference)
            }
            _ => DriverExpression::constant_zero(),
        },
        DistanceFamily::BBone => {
            let mut variables = Vec::new();
            let mut terms = Vec::new();
            for channel in selection.bbone.channels() {
                let name = channel
                    .property_path()
                    .trim_start_matches("bbone_")
                    .replace(|c: char| c == '[' || c == ']', "");
                let value = reference.bbone.get(channel);
                let norm = norms.0[channel.index()];
                let term = if norm > 0.0 && norm != 1.0 {
                    format!(
                        "pow(({}-{})/{},2.0)",
                        name,
                        literal(value),
                        literal(norm)
                    )
                } else {
                    squared_difference(&name, value)
                };
                terms.push(term);
                variables.push(DriverVariable {
                    name,
                    source: VariableSource::BBoneProperty {
                        object: target.object.clone(),
                        bone: target.bone.clone(),
                        channel,
                    },
                });
            }
            DriverExpression {
                kind: DriverKind::Scripted,
                expression: euclidean(&terms),
                variables,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::AxisFlags;
    use crate::math::PoseTransform;
    use crate::pose::BBoneChannel;

    fn target() -> BoneTarget {
        BoneTarget::new("Armature", "upper_arm.L")
    }

    #[test]
    fn literals_wrap_negatives() {
        assert_eq!(literal(0.5), "0.5");
        assert_eq!(literal(1.0), "1.0");
        assert_eq!(literal(-0.25), "(-0.25)");
        assert!(!literal(1.0e-7).contains('e'));
    }

    #[test]
    fn location_subset_binds_only_selected_axes() {
        let sel = ChannelSelection::default().with_location(AxisFlags::new(true, false, true));
        let reference = PoseSample::new(PoseTransform::compose(
            [0.5, 2.0, -0.25],
            [1.0, 0.0, 0.0, 0.0],
            [1.0; 3],
        ));
        let expr = compile_family(
            DistanceFamily::Location,
            &sel,
            &target(),
            &reference,
            &BBoneNorms::default(),
        );
        assert_eq!(expr.expression, "sqrt(pow(x-0.5,2.0)+pow(z-(-0.25),2.0))");
        let types: Vec<_> = expr
            .variables
            .iter()
            .map(|v| match &v.source {
                VariableSource::Transform { transform_type, .. } => *transform_type,
                other => panic!("unexpected source {other:?}"),
            })
            .collect();
        assert_eq!(types, vec![TransformType::LocX, TransformType::LocZ]);
    }

    #[test]
    fn twist_uses_swing_twist_mode() {
        let sel =
            ChannelSelection::default().with_rotation(RotationChannel::Twist { axis: Axis::Y });
        let expr = compile_family(
            DistanceFamily::Rotation,
            &sel,
            &target(),
            &PoseSample::default(),
            &BBoneNorms::default(),
        );
        assert_eq!(expr.expression, "fabs(y-0.0)/pi");
        match &expr.variables[0].source {
            VariableSource::Transform {
                transform_type,
                rotation_mode,
                ..
            } => {
                assert_eq!(*transform_type, TransformType::RotY);
                assert_eq!(*rotation_mode, VariableRotationMode::SwingTwist(Axis::Y));
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn quaternion_inlines_reference_components() {
        let sel = ChannelSelection::default().with_rotation(RotationChannel::Quaternion);
        let expr = compile_family(
            DistanceFamily::Rotation,
            &sel,
            &target(),
            &PoseSample::default(),
            &BBoneNorms::default(),
        );
        assert_eq!(
            expr.expression,
            "acos((2.0*pow(clamp(w*1.0+x*0.0+y*0.0+z*0.0,-1.0,1.0),2.0))-1.0)/pi"
        );
        assert_eq!(expr.variables.len(), 4);
    }

    #[test]
    fn bbone_terms_divide_by_group_norm() {
        let sel = ChannelSelection::default()
            .with_bbone(BBoneChannel::RollIn)
            .with_bbone(BBoneChannel::ScaleInX);
        let reference = PoseSample::default().with_bbone(BBoneChannel::RollIn, 0.5);
        let mut norms = BBoneNorms::default();
        norms.0[BBoneChannel::RollIn.index()] = 2.0;
        let expr = compile_family(DistanceFamily::BBone, &sel, &target(), &reference, &norms);
        assert_eq!(
            expr.expression,
            "sqrt(pow((rollin-0.5)/2.0,2.0)+pow(scalein0-1.0,2.0))"
        );
        assert_eq!(
            expr.variables[1].source.data_path().as_deref(),
            Some("pose.bones[\"upper_arm.L\"].bbone_scalein[0]")
        );
    }
}
