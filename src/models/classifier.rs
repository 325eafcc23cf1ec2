use crate::image::ImageTransforms;
use crate::Result;
use image::DynamicImage;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::{Serialize, Serializer};
use std::fmt;

/// Category names a classifier may return, in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Cat,
    Dog,
    Bird,
    Fish,
    Horse,
    Deer,
    Frog,
    Car,
    Airplane,
    Ship,
}

impl Label {
    pub const ALL: [Label; 10] = [
        Label::Cat,
        Label::Dog,
        Label::Bird,
        Label::Fish,
        Label::Horse,
        Label::Deer,
        Label::Frog,
        Label::Car,
        Label::Airplane,
        Label::Ship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Cat => "cat",
            Label::Dog => "dog",
            Label::Bird => "bird",
            Label::Fish => "fish",
            Label::Horse => "horse",
            Label::Deer => "deer",
            Label::Frog => "frog",
            Label::Car => "car",
            Label::Airplane => "airplane",
            Label::Ship => "ship",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Label::as_str).collect()
    }

    pub fn from_name(name: &str) -> Option<Label> {
        Self::ALL.iter().copied().find(|label| label.as_str() == name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Anything that can put a label on a decoded image.
pub trait Classifier: Send + Sync {
    fn classify(&self, image: &DynamicImage) -> Result<Label>;

    /// Short identifier for logs and `/api/info`.
    fn name(&self) -> &str;
}

/// Placeholder classifier: a uniform draw over [`Label::ALL`], ignoring pixel content.
pub struct RandomClassifier {
    rng: Mutex<StdRng>,
}

impl RandomClassifier {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible sequence of labels for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::seeded)
    }
}

impl Default for RandomClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for RandomClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Label> {
        ImageTransforms::validate(image)?;

        let mut rng = self.rng.lock();
        let label = *Label::ALL
            .choose(&mut *rng)
            .unwrap_or(&Label::ALL[0]);

        tracing::debug!("{} picked '{}'", self.name(), label);
        Ok(label)
    }

    fn name(&self) -> &str {
        "random"
    }
}
