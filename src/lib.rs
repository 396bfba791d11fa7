//! Configuration, memory accounting and parameter binding for dense
//! (fully-connected) layers.
//!
//! A [`DenseLayerConf`] is built once through [`DenseLayerBuilder`] and then
//! only read: [`LayerConf::memory_report`] derives the layer's memory
//! footprint from an input shape alone, and [`LayerConf::instantiate`] binds
//! the configuration to a caller-owned flat parameter buffer.

pub mod error;
pub mod layer;
pub mod memory;
pub mod model;
pub mod tensor;

pub use error::{LayerConfError, Result};
pub use layer::{
    bound::BoundLayer,
    layer::{LayerConf, LayerContext, TrainingListener},
    params::{DefaultParamInitializer, ParamInitializer, ParamLayout, ParamRole, ParamSlot},
};
pub use memory::{
    budget::MemoryBudget,
    report::{CacheMode, CacheModeMemory, LayerMemoryReport, MemoryType, MemoryUseMode},
};
pub use model::{
    activation::Activation,
    constraint::{Constraint, ParamConstraint},
    dropout::Dropout,
    layer_conf::{DenseLayerBuilder, DenseLayerConf, FeedForwardConf, LayerDefaults},
    updater::{OptimizerStateSizer, Updater},
    weight_init::WeightInit,
};
pub use tensor::{data_type::DataType, input_type::InputType};
