pub mod activation;
pub mod constraint;
pub mod dropout;
pub mod layer_conf;
pub mod updater;
pub mod weight_init;
