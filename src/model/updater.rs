use serde::{Deserialize, Serialize};

/// Answers how many extra scalars an optimizer keeps for a given number of
/// trainable parameters.
pub trait OptimizerStateSizer {
    fn state_size(&self, num_params: u64) -> u64;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Updater {
    Sgd { learning_rate: f64 },
    NoOp,
    Nesterovs { learning_rate: f64, momentum: f64 },
    AdaGrad { learning_rate: f64 },
    RmsProp { learning_rate: f64, decay: f64 },
    Adam { learning_rate: f64, beta1: f64, beta2: f64 },
    AdaMax { learning_rate: f64, beta1: f64, beta2: f64 },
    Nadam { learning_rate: f64, beta1: f64, beta2: f64 },
    AdaDelta { rho: f64 },
    AmsGrad { learning_rate: f64, beta1: f64, beta2: f64 },
}

impl Default for Updater {
    fn default() -> Self {
        Updater::Sgd { learning_rate: 1e-3 }
    }
}

impl Updater {
    pub fn adam(learning_rate: f64) -> Self {
        Updater::Adam { learning_rate, beta1: 0.9, beta2: 0.999 }
    }

    pub fn nesterovs(learning_rate: f64, momentum: f64) -> Self {
        Updater::Nesterovs { learning_rate, momentum }
    }

    /// Number of state arrays kept per parameter.
    pub fn state_multiplier(&self) -> u64 {
        match self {
            Updater::Sgd { .. } | Updater::NoOp => 0,
            // velocity / squared-gradient history
            Updater::Nesterovs { .. } | Updater::AdaGrad { .. } | Updater::RmsProp { .. } => 1,
            // first and second moments
            Updater::Adam { .. }
            | Updater::AdaMax { .. }
            | Updater::Nadam { .. }
            | Updater::AdaDelta { .. } => 2,
            // moments plus running max of the second moment
            Updater::AmsGrad { .. } => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Updater::Sgd { .. } => "Sgd",
            Updater::NoOp => "NoOp",
            Updater::Nesterovs { .. } => "Nesterovs",
            Updater::AdaGrad { .. } => "AdaGrad",
            Updater::RmsProp { .. } => "RmsProp",
            Updater::Adam { .. } => "Adam",
            Updater::AdaMax { .. } => "AdaMax",
            Updater::Nadam { .. } => "Nadam",
            Updater::AdaDelta { .. } => "AdaDelta",
            Updater::AmsGrad { .. } => "AmsGrad",
        }
    }
}

impl OptimizerStateSizer for Updater {
    fn state_size(&self, num_params: u64) -> u64 {
        self.state_multiplier().saturating_mul(num_params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_size_scales_with_kind() {
        assert_eq!(Updater::default().state_size(55), 0);
        assert_eq!(Updater::NoOp.state_size(55), 0);
        assert_eq!(Updater::nesterovs(0.1, 0.9).state_size(55), 55);
        assert_eq!(Updater::adam(1e-3).state_size(55), 110);
        assert_eq!(
            Updater::AmsGrad { learning_rate: 1e-3, beta1: 0.9, beta2: 0.999 }.state_size(10),
            30
        );
    }
}
