pub mod client;
pub mod config;
pub mod image;
pub mod models;
pub mod service;
pub mod utils;
pub mod web;

pub use config::Config;
pub use models::{Classifier, Label, RandomClassifier};
pub use utils::error::ImageError;

pub type Result<T> = std::result::Result<T, ImageError>;
