use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LayerConfError, Result};

/// Shape of a single example flowing into (or out of) a layer.
///
/// The minibatch dimension is never part of the descriptor, so every
/// quantity derived from it is "per example".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputType {
    // Flat vector, e.g. the output of a dense layer
    FeedForward { size: usize },

    // Sequence of `time_series_length` vectors of width `size`
    Recurrent {
        size: usize,
        time_series_length: usize,
    },

    // Image-like activations in channels x height x width layout
    Convolutional {
        channels: usize,
        height: usize,
        width: usize,
    },

    // Image data already flattened to a row vector
    ConvolutionalFlat {
        channels: usize,
        height: usize,
        width: usize,
    },
}

impl InputType {
    pub fn feed_forward(size: usize) -> Self {
        Self::FeedForward { size }
    }

    pub fn recurrent(size: usize, time_series_length: usize) -> Self {
        Self::Recurrent { size, time_series_length }
    }

    pub fn convolutional(channels: usize, height: usize, width: usize) -> Self {
        Self::Convolutional { channels, height, width }
    }

    pub fn convolutional_flat(channels: usize, height: usize, width: usize) -> Self {
        Self::ConvolutionalFlat { channels, height, width }
    }

    /// Number of scalars one example occupies.
    pub fn elements_per_example(&self) -> Result<u64> {
        let dims = match *self {
            Self::FeedForward { size } => [size, 1, 1],
            Self::Recurrent { size, time_series_length } => [size, time_series_length, 1],
            Self::Convolutional { channels, height, width }
            | Self::ConvolutionalFlat { channels, height, width } => [channels, height, width],
        };
        dims.iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(d as u64))
            .ok_or_else(|| LayerConfError::overflow(format!("element count of {}", self)))
    }

    /// Width a fully-connected layer sees for this input: the whole example
    /// flattened, time steps included.
    pub fn flat_width(&self) -> Result<usize> {
        let elements = self.elements_per_example()?;
        usize::try_from(elements).map_err(|_| LayerConfError::overflow(format!("width of {}", self)))
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::FeedForward { size } => write!(f, "FeedForward({})", size),
            Self::Recurrent { size, time_series_length } => {
                write!(f, "Recurrent({}, length={})", size, time_series_length)
            }
            Self::Convolutional { channels, height, width } => {
                write!(f, "Convolutional({}×{}×{})", channels, height, width)
            }
            Self::ConvolutionalFlat { channels, height, width } => {
                write!(f, "ConvolutionalFlat({}×{}×{})", channels, height, width)
            }
        }
    }
}
