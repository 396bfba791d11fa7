use std::fmt;
use std::sync::Arc;

use crate::{
    error::{LayerConfError, Result},
    memory::report::LayerMemoryReport,
    tensor::input_type::InputType,
};

use super::bound::BoundLayer;

/// Receives training progress from a bound layer.
pub trait TrainingListener: Send + Sync {
    fn iteration_done(&self, layer_name: Option<&str>, layer_index: usize, iteration: usize);
}

/// Build-time information handed to `LayerConf::instantiate`.
#[derive(Clone, Default)]
pub struct LayerContext {
    pub name: Option<String>,
    pub layer_index: usize,
    pub num_inputs: usize,
    pub listeners: Vec<Arc<dyn TrainingListener>>,
}

impl LayerContext {
    pub fn new(layer_index: usize) -> Self {
        Self {
            layer_index,
            num_inputs: 1,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn TrainingListener>) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl fmt::Debug for LayerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerContext")
            .field("name", &self.name)
            .field("layer_index", &self.layer_index)
            .field("num_inputs", &self.num_inputs)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// What every layer configuration kind must answer at network-build time.
pub trait LayerConf: Send + Sync {
    // Return a string representation of the layers kind
    fn layer_type(&self) -> &'static str;

    fn layer_name(&self) -> Option<&str>;

    // How many inputs this layer accepts (min and max)
    fn input_requirements(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    // Total number of trainable scalars
    fn num_params(&self) -> Result<usize>;

    fn output_type(&self, layer_index: Option<usize>, input_type: &InputType) -> Result<InputType>;

    fn memory_report(&self, input_types: &[InputType]) -> Result<LayerMemoryReport>;

    /// Binds this configuration to a runtime layer whose parameters alias
    /// `params`. Nothing is copied; `params` is written only when
    /// `initialize_params` is true.
    fn instantiate<'a>(
        &'a self,
        ctx: LayerContext,
        params: &'a mut [f32],
        initialize_params: bool,
    ) -> Result<BoundLayer<'a>>;

    // Return optional configuration details for the layer
    fn config_string(&self) -> Option<String> {
        None
    }

    fn check_input_count(&self, input_types: &[InputType]) -> Result<()> {
        let (min, max) = self.input_requirements();
        let count = input_types.len();
        if count < min || max.is_some_and(|max| count > max) {
            return Err(LayerConfError::wrong_input_arity(input_types));
        }
        Ok(())
    }
}
