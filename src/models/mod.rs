pub mod classifier;

pub use classifier::{Classifier, Label, RandomClassifier};
