pub mod bound;
pub mod dense;
pub mod layer;
pub mod params;
