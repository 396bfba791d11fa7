use serde::{Deserialize, Serialize};

// Element type used when converting element counts into bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Half,
    #[default]
    Float,
    Double,
}

impl DataType {
    pub fn bytes_per_element(&self) -> u64 {
        match self {
            DataType::Half => 2,
            DataType::Float => std::mem::size_of::<f32>() as u64,
            DataType::Double => std::mem::size_of::<f64>() as u64,
        }
    }
}
