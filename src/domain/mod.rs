// Domain layer - Core types and pure projection logic
pub mod chart;
pub mod range;
pub mod sample;
