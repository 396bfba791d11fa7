use crate::{
    error::{LayerConfError, Result},
    memory::report::{CacheModeMemory, LayerMemoryReport},
    model::{layer_conf::DenseLayerConf, updater::OptimizerStateSizer},
    tensor::input_type::InputType,
};

use super::{
    bound::BoundLayer,
    layer::{LayerConf, LayerContext},
    params::{DefaultParamInitializer, ParamInitializer},
};

const LAYER_TYPE: &str = "DenseLayer";

impl DenseLayerConf {
    pub fn initializer(&self) -> DefaultParamInitializer {
        DefaultParamInitializer
    }
}

impl LayerConf for DenseLayerConf {
    fn layer_type(&self) -> &'static str {
        LAYER_TYPE
    }

    fn layer_name(&self) -> Option<&str> {
        self.base.layer_name.as_deref()
    }

    fn num_params(&self) -> Result<usize> {
        self.initializer().num_params(self)
    }

    fn output_type(&self, layer_index: Option<usize>, _input_type: &InputType) -> Result<InputType> {
        // Any input is flattened, so only nOut shapes the output
        match self.base.n_out {
            Some(n_out) => Ok(InputType::feed_forward(n_out)),
            None => Err(LayerConfError::ConfigurationIncomplete {
                layer_type: LAYER_TYPE,
                layer_name: self.base.layer_name.clone(),
                layer_index,
                n_in: self.base.n_in,
                n_out: None,
            }),
        }
    }

    fn memory_report(&self, input_types: &[InputType]) -> Result<LayerMemoryReport> {
        self.check_input_count(input_types)?;
        let input_type = input_types[0];
        let output_type = self.output_type(None, &input_type)?;

        let num_params = self.num_params()? as u64;
        let updater_state_size = self.base.updater.state_size(num_params);

        // Pre-output is overwritten in place by the activation backward pass,
        // and the returned epsilon is accounted under the same term
        let activations = output_type.elements_per_example()?;

        let fixed_train = 0;
        let variable_train = if self.base.dropout.is_some() {
            // Dropout keeps a copy of the input for the backward pass
            input_type
                .elements_per_example()?
                .checked_add(activations)
                .ok_or_else(|| LayerConfError::overflow("dropout input copy plus activations"))?
        } else {
            activations
        };

        Ok(LayerMemoryReport::builder(self.base.layer_name.clone(), LAYER_TYPE, input_type, output_type)
            .standard_memory(num_params, updater_state_size)
            .working_memory(0, activations, fixed_train, variable_train)
            // No caching in a dense layer
            .cache_memory(CacheModeMemory::all_zeros(), CacheModeMemory::all_zeros())
            .build())
    }

    fn instantiate<'a>(
        &'a self,
        ctx: LayerContext,
        params: &'a mut [f32],
        initialize_params: bool,
    ) -> Result<BoundLayer<'a>> {
        let name = ctx.name.or_else(|| self.base.layer_name.clone());

        if self.base.n_in.is_none() || self.base.n_out.is_none() {
            return Err(LayerConfError::ConfigurationIncomplete {
                layer_type: LAYER_TYPE,
                layer_name: name,
                layer_index: Some(ctx.layer_index),
                n_in: self.base.n_in,
                n_out: self.base.n_out,
            });
        }

        let required = self.num_params()?;
        if params.len() < required {
            return Err(LayerConfError::BufferTooSmall {
                layer_name: name,
                required,
                available: params.len(),
            });
        }

        let view = &mut params[..required];
        let layout = self.initializer().init(self, view, initialize_params)?;

        Ok(BoundLayer::new(self, name, ctx.layer_index, ctx.listeners, view, layout))
    }

    fn config_string(&self) -> Option<String> {
        let n_in = self.base.n_in.map_or_else(|| "?".to_string(), |n| n.to_string());
        let n_out = self.base.n_out.map_or_else(|| "?".to_string(), |n| n.to_string());
        Some(format!(
            "nIn={}, nOut={}, bias={}, activation={}, updater={}",
            n_in,
            n_out,
            self.has_bias,
            self.base.activation,
            self.base.updater.name()
        ))
    }
}
