pub mod data_type;
pub mod input_type;
