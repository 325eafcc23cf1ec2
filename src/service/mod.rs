pub mod pipeline;
pub mod types;

pub use pipeline::ImagePipeline;
pub use types::*;
