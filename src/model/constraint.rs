use serde::{Deserialize, Serialize};

use crate::layer::params::ParamRole;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    MaxNorm { max: f64 },
    MinMaxNorm { min: f64, max: f64, rate: f64 },
    NonNegative,
    UnitNorm,
}

// Which parameters a constraint was requested for on the builder
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintTarget {
    AllParameters,
    Weights,
    Bias,
}

/// A constraint resolved against the parameter roles a layer actually has.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamConstraint {
    pub constraint: Constraint,
    pub params: Vec<ParamRole>,
}

/// Resolves builder requests into per-role constraints.
///
/// Order is all-parameter requests, then weight, then bias, each in the
/// order they were added. Requests that match no existing role are dropped.
pub fn normalize_constraints(
    requested: &[(ConstraintTarget, Constraint)],
    has_bias: bool,
) -> Vec<ParamConstraint> {
    let targets = [ConstraintTarget::AllParameters, ConstraintTarget::Weights, ConstraintTarget::Bias];

    targets
        .iter()
        .flat_map(|target| {
            requested
                .iter()
                .filter(move |(t, _)| t == target)
                .filter_map(move |(t, constraint)| {
                    let params = match t {
                        ConstraintTarget::AllParameters if has_bias => vec![ParamRole::Weight, ParamRole::Bias],
                        ConstraintTarget::AllParameters | ConstraintTarget::Weights => vec![ParamRole::Weight],
                        ConstraintTarget::Bias if has_bias => vec![ParamRole::Bias],
                        ConstraintTarget::Bias => return None,
                    };
                    Some(ParamConstraint { constraint: *constraint, params })
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_target_then_insertion() {
        let requested = vec![
            (ConstraintTarget::Bias, Constraint::NonNegative),
            (ConstraintTarget::Weights, Constraint::UnitNorm),
            (ConstraintTarget::AllParameters, Constraint::MaxNorm { max: 2.0 }),
        ];
        let resolved = normalize_constraints(&requested, true);

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].constraint, Constraint::MaxNorm { max: 2.0 });
        assert_eq!(resolved[0].params, vec![ParamRole::Weight, ParamRole::Bias]);
        assert_eq!(resolved[1].params, vec![ParamRole::Weight]);
        assert_eq!(resolved[2].params, vec![ParamRole::Bias]);
    }

    #[test]
    fn bias_requests_vanish_without_bias() {
        let requested = vec![
            (ConstraintTarget::Bias, Constraint::NonNegative),
            (ConstraintTarget::AllParameters, Constraint::UnitNorm),
        ];
        let resolved = normalize_constraints(&requested, false);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].params, vec![ParamRole::Weight]);
    }
}
