use serde::{Deserialize, Serialize};

use crate::error::{LayerConfError, Result};
use crate::tensor::input_type::InputType;

use super::{
    activation::Activation,
    constraint::{normalize_constraints, Constraint, ConstraintTarget, ParamConstraint},
    dropout::Dropout,
    updater::Updater,
    weight_init::WeightInit,
};

/// Network-wide defaults a layer falls back to for anything its builder
/// left unset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerDefaults {
    pub activation: Activation,
    pub weight_init: WeightInit,
    pub bias_init: f32,
    pub updater: Updater,
    pub dropout: Option<Dropout>,
    pub l1: f64,
    pub l2: f64,
    pub l1_bias: f64,
    pub l2_bias: f64,
}

impl Default for LayerDefaults {
    fn default() -> Self {
        Self {
            activation: Activation::Sigmoid,
            weight_init: WeightInit::Xavier,
            bias_init: 0.0,
            updater: Updater::default(),
            dropout: None,
            l1: 0.0,
            l2: 0.0,
            l1_bias: 0.0,
            l2_bias: 0.0,
        }
    }
}

/// Hyperparameters shared by every feed-forward layer kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardConf {
    pub layer_name: Option<String>,
    pub n_in: Option<usize>,
    pub n_out: Option<usize>,
    pub activation: Activation,
    pub weight_init: WeightInit,
    pub bias_init: f32,
    pub updater: Updater,
    pub dropout: Option<Dropout>,
    pub l1: f64,
    pub l2: f64,
    pub l1_bias: f64,
    pub l2_bias: f64,
    pub constraints: Vec<ParamConstraint>,
}

impl FeedForwardConf {
    // Both widths, or the error a consumer should raise
    pub fn require_n_in_n_out(
        &self,
        layer_type: &'static str,
        layer_index: Option<usize>,
    ) -> Result<(usize, usize)> {
        match (self.n_in, self.n_out) {
            (Some(n_in), Some(n_out)) => Ok((n_in, n_out)),
            (n_in, n_out) => Err(LayerConfError::ConfigurationIncomplete {
                layer_type,
                layer_name: self.layer_name.clone(),
                layer_index,
                n_in,
                n_out,
            }),
        }
    }
}

/// Frozen configuration of a fully-connected layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseLayerConf {
    pub base: FeedForwardConf,
    pub has_bias: bool,
}

impl DenseLayerConf {
    pub fn builder() -> DenseLayerBuilder {
        DenseLayerBuilder::default()
    }

    pub fn n_in(&self) -> Option<usize> {
        self.base.n_in
    }

    pub fn n_out(&self) -> Option<usize> {
        self.base.n_out
    }

    pub fn has_bias(&self) -> bool {
        self.has_bias
    }

    /// Fills in `n_in` from the preceding layer's output, flattened to its
    /// full element count. A width that is already set is kept as is.
    pub fn with_inferred_n_in(mut self, input_type: &InputType) -> Result<Self> {
        if self.base.n_in.is_none() {
            self.base.n_in = Some(input_type.flat_width()?);
        }
        Ok(self)
    }
}

#[derive(Clone, Debug, Default)]
pub struct DenseLayerBuilder {
    layer_name: Option<String>,
    n_in: Option<usize>,
    n_out: Option<usize>,
    has_bias: Option<bool>,
    activation: Option<Activation>,
    weight_init: Option<WeightInit>,
    bias_init: Option<f32>,
    updater: Option<Updater>,
    dropout: Option<Dropout>,
    l1: Option<f64>,
    l2: Option<f64>,
    l1_bias: Option<f64>,
    l2_bias: Option<f64>,
    constraints: Vec<(ConstraintTarget, Constraint)>,
}

impl DenseLayerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.layer_name = Some(name.into());
        self
    }

    pub fn n_in(mut self, n_in: usize) -> Self {
        self.n_in = Some(n_in);
        self
    }

    pub fn n_out(mut self, n_out: usize) -> Self {
        self.n_out = Some(n_out);
        self
    }

    /// If true (default): include bias parameters in the layer.
    pub fn has_bias(mut self, has_bias: bool) -> Self {
        self.has_bias = Some(has_bias);
        self
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = Some(activation);
        self
    }

    pub fn weight_init(mut self, weight_init: WeightInit) -> Self {
        self.weight_init = Some(weight_init);
        self
    }

    pub fn bias_init(mut self, bias_init: f32) -> Self {
        self.bias_init = Some(bias_init);
        self
    }

    pub fn updater(mut self, updater: Updater) -> Self {
        self.updater = Some(updater);
        self
    }

    pub fn dropout(mut self, dropout: Dropout) -> Self {
        self.dropout = Some(dropout);
        self
    }

    pub fn l1(mut self, l1: f64) -> Self {
        self.l1 = Some(l1);
        self
    }

    pub fn l2(mut self, l2: f64) -> Self {
        self.l2 = Some(l2);
        self
    }

    pub fn l1_bias(mut self, l1_bias: f64) -> Self {
        self.l1_bias = Some(l1_bias);
        self
    }

    pub fn l2_bias(mut self, l2_bias: f64) -> Self {
        self.l2_bias = Some(l2_bias);
        self
    }

    pub fn constrain_all_parameters(mut self, constraint: Constraint) -> Self {
        self.constraints.push((ConstraintTarget::AllParameters, constraint));
        self
    }

    pub fn constrain_weights(mut self, constraint: Constraint) -> Self {
        self.constraints.push((ConstraintTarget::Weights, constraint));
        self
    }

    pub fn constrain_bias(mut self, constraint: Constraint) -> Self {
        self.constraints.push((ConstraintTarget::Bias, constraint));
        self
    }

    pub fn build(self) -> DenseLayerConf {
        self.build_with(&LayerDefaults::default())
    }

    pub fn build_with(self, defaults: &LayerDefaults) -> DenseLayerConf {
        let has_bias = self.has_bias.unwrap_or(true);
        let constraints = normalize_constraints(&self.constraints, has_bias);

        DenseLayerConf {
            base: FeedForwardConf {
                layer_name: self.layer_name,
                n_in: self.n_in,
                n_out: self.n_out,
                activation: self.activation.unwrap_or(defaults.activation),
                weight_init: self.weight_init.unwrap_or_else(|| defaults.weight_init.clone()),
                bias_init: self.bias_init.unwrap_or(defaults.bias_init),
                updater: self.updater.unwrap_or_else(|| defaults.updater.clone()),
                dropout: self.dropout.or(defaults.dropout),
                l1: self.l1.unwrap_or(defaults.l1),
                l2: self.l2.unwrap_or(defaults.l2),
                l1_bias: self.l1_bias.unwrap_or(defaults.l1_bias),
                l2_bias: self.l2_bias.unwrap_or(defaults.l2_bias),
                constraints,
            },
            has_bias,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::params::ParamRole;

    #[test]
    fn bias_is_on_by_default() {
        let conf = DenseLayerConf::builder().n_in(3).n_out(2).build();
        assert!(conf.has_bias());
        assert_eq!(conf.base.activation, Activation::Sigmoid);
        assert_eq!(conf.base.updater, Updater::default());
        assert!(conf.base.dropout.is_none());
    }

    #[test]
    fn builder_values_override_defaults() {
        let defaults = LayerDefaults {
            activation: Activation::Tanh,
            updater: Updater::adam(1e-3),
            dropout: Some(Dropout::standard(0.8)),
            ..LayerDefaults::default()
        };
        let conf = DenseLayerBuilder::new()
            .n_out(4)
            .activation(Activation::ReLU)
            .build_with(&defaults);

        assert_eq!(conf.base.activation, Activation::ReLU);
        assert_eq!(conf.base.updater, Updater::adam(1e-3));
        assert_eq!(conf.base.dropout, Some(Dropout::standard(0.8)));
    }

    #[test]
    fn inferred_n_in_is_set_once() {
        let conf = DenseLayerConf::builder().n_out(5).build();
        let conf = conf.with_inferred_n_in(&InputType::convolutional(2, 3, 4)).unwrap();
        assert_eq!(conf.n_in(), Some(24));

        let conf = conf.with_inferred_n_in(&InputType::feed_forward(99)).unwrap();
        assert_eq!(conf.n_in(), Some(24));
    }

    #[test]
    fn inferred_n_in_spans_all_time_steps() {
        let conf = DenseLayerConf::builder()
            .n_out(4)
            .build()
            .with_inferred_n_in(&InputType::recurrent(8, 25))
            .unwrap();
        assert_eq!(conf.n_in(), Some(200));

        let err = DenseLayerConf::builder()
            .n_out(4)
            .build()
            .with_inferred_n_in(&InputType::convolutional(1 << 22, 1 << 22, 1 << 22))
            .unwrap_err();
        assert!(matches!(err, LayerConfError::Overflow(_)));
    }

    #[test]
    fn bias_regularization_falls_back_to_defaults() {
        let defaults = LayerDefaults {
            l1_bias: 1e-3,
            l2_bias: 2e-3,
            ..LayerDefaults::default()
        };
        let conf = DenseLayerConf::builder()
            .n_in(2)
            .n_out(2)
            .l2_bias(5e-3)
            .build_with(&defaults);

        assert_eq!(conf.base.l1_bias, 1e-3);
        assert_eq!(conf.base.l2_bias, 5e-3);
    }

    #[test]
    fn build_normalizes_constraints() {
        let conf = DenseLayerConf::builder()
            .n_in(2)
            .n_out(2)
            .has_bias(false)
            .constrain_bias(Constraint::NonNegative)
            .constrain_weights(Constraint::UnitNorm)
            .build();

        assert_eq!(conf.base.constraints.len(), 1);
        assert_eq!(conf.base.constraints[0].params, vec![ParamRole::Weight]);
    }

    #[test]
    fn missing_widths_are_reported() {
        let conf = DenseLayerConf::builder().name("d0").n_in(3).build();
        let err = conf.base.require_n_in_n_out("DenseLayer", Some(0)).unwrap_err();
        assert!(matches!(
            err,
            LayerConfError::ConfigurationIncomplete { n_in: Some(3), n_out: None, .. }
        ));
    }
}
