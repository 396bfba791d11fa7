use thiserror::Error;

use crate::tensor::input_type::InputType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerConfError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "Invalid configuration for {layer_type} layer (layer name = \"{}\", layer index = {}): \
         nIn and nOut must both be set (nIn = {}, nOut = {})",
        .layer_name.as_deref().unwrap_or("<unnamed>"),
        .layer_index.map_or_else(|| "?".to_string(), |i| i.to_string()),
        .n_in.map_or_else(|| "unset".to_string(), |n| n.to_string()),
        .n_out.map_or_else(|| "unset".to_string(), |n| n.to_string())
    )]
    ConfigurationIncomplete {
        layer_type: &'static str,
        layer_name: Option<String>,
        layer_index: Option<usize>,
        n_in: Option<usize>,
        n_out: Option<usize>,
    },

    #[error(
        "Parameter buffer too small for layer \"{}\": requires {required} values, got {available}",
        .layer_name.as_deref().unwrap_or("<unnamed>")
    )]
    BufferTooSmall {
        layer_name: Option<String>,
        required: usize,
        available: usize,
    },

    #[error("Out of memory error: {0}")]
    OutOfMemory(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

impl LayerConfError {
    pub(crate) fn wrong_input_arity(input_types: &[InputType]) -> Self {
        let described: Vec<String> = input_types.iter().map(|t| t.to_string()).collect();
        LayerConfError::InvalidArgument(format!(
            "Expected 1 input type: got {} [{}]",
            input_types.len(),
            described.join(", ")
        ))
    }

    pub(crate) fn overflow(what: impl std::fmt::Display) -> Self {
        LayerConfError::Overflow(format!("{} does not fit in the index type", what))
    }
}

pub type Result<T> = std::result::Result<T, LayerConfError>;
