use serde::{Deserialize, Serialize};

// Dropout policy applied to the layer input during training.
// Sampling happens elsewhere; here only its presence matters for memory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Dropout {
    Standard { retain_probability: f64 },
    Gaussian { rate: f64 },
    Alpha { p: f64 },
    GaussianNoise { stddev: f64 },
}

impl Dropout {
    pub fn standard(retain_probability: f64) -> Self {
        Dropout::Standard { retain_probability }
    }
}
