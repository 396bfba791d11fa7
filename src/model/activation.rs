use std::fmt;

use serde::{Deserialize, Serialize};

// Activation applied to the layer output. Only recorded here, never evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    Identity,
    ReLU,
    LeakyReLU(f32),
    #[default]
    Sigmoid,
    Softmax,
    Tanh,
    GELU,
    SiLU,
}

impl Activation {
    pub fn name(&self) -> &'static str {
        match self {
            Activation::Identity => "Identity",
            Activation::ReLU => "ReLU",
            Activation::LeakyReLU(_) => "LeakyReLU",
            Activation::Sigmoid => "Sigmoid",
            Activation::Softmax => "Softmax",
            Activation::Tanh => "Tanh",
            Activation::GELU => "GELU",
            Activation::SiLU => "SiLU",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::LeakyReLU(alpha) => write!(f, "LeakyReLU(α={})", alpha),
            other => f.write_str(other.name()),
        }
    }
}
