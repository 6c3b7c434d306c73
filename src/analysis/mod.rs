pub mod discharge;
pub mod thresholds;
pub mod velocity;
