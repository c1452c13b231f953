pub mod generator;
pub mod pipeline;
pub mod render;
pub mod sampler;
