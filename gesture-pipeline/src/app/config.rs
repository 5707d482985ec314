//! Configuration Management

use crate::features::extractor::DEFAULT_MIN_SCALE;
use crate::hand_shape::{PatchScorer, ThresholdedClassifier, DEFAULT_MIN_CONFIDENCE};
use crate::sequence::DEFAULT_WINDOW_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data and model locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Windowing
    #[serde(default)]
    pub sequence: SequenceConfig,
    /// Feature extraction
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Reference engine training
    #[serde(default)]
    pub model: ModelConfig,
    /// Ensemble decision rule
    #[serde(default)]
    pub decision: DecisionConfig,
    /// Hand-shape classifier
    #[serde(default)]
    pub hand_shape: HandShapeConfig,
}

/// File locations, relative to the working directory unless absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Codebook of centroids
    pub codebook: PathBuf,
    /// Directory with the per-gesture training rows
    pub dataset_dir: PathBuf,
    /// Directory the trained models are read from and written to
    pub model_dir: PathBuf,
}

/// Sequence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Frames per gesture window (G)
    pub window_size: usize,
}

/// Feature extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Smallest torso-head image distance accepted as scale
    pub min_scale: f32,
}

/// Reference engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Additive smoothing of the symbol histogram
    pub smoothing: f64,
}

/// Decision rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Reject winners scoring below `confidence_floor`
    pub use_confidence_floor: bool,
    /// Minimum log-likelihood of an accepted gesture
    pub confidence_floor: f64,
}

/// Hand-shape classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandShapeConfig {
    /// Top output score below which a hand is `Undefined`
    pub min_confidence: f32,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            codebook: PathBuf::from("Dataset").join("codebook16.txt"),
            dataset_dir: PathBuf::from("Dataset"),
            model_dir: PathBuf::from("Data"),
        }
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { smoothing: 1.0 }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            use_confidence_floor: false,
            confidence_floor: -150.0,
        }
    }
}

impl Default for HandShapeConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.sequence.window_size < 2 {
            return Err(crate::Error::Config(format!(
                "window_size must be >= 2, got {}",
                self.sequence.window_size
            )));
        }
        if !(self.features.min_scale > 0.0) {
            return Err(crate::Error::Config(format!(
                "min_scale must be > 0, got {}",
                self.features.min_scale
            )));
        }
        if !(self.model.smoothing > 0.0) {
            return Err(crate::Error::Config(format!(
                "smoothing must be > 0, got {}",
                self.model.smoothing
            )));
        }
        if !self.decision.confidence_floor.is_finite() {
            return Err(crate::Error::Config(format!(
                "confidence_floor must be finite, got {}",
                self.decision.confidence_floor
            )));
        }
        if !(0.0..=1.0).contains(&self.hand_shape.min_confidence) {
            return Err(crate::Error::Config(format!(
                "min_confidence must be in [0, 1], got {}",
                self.hand_shape.min_confidence
            )));
        }
        Ok(())
    }

    /// The floor handed to the ensemble, `None` when disabled
    pub fn confidence_floor(&self) -> Option<f64> {
        self.decision
            .use_confidence_floor
            .then_some(self.decision.confidence_floor)
    }

    /// Wrap a trained network with the configured confidence floor
    pub fn hand_classifier<S: PatchScorer>(&self, scorer: S) -> ThresholdedClassifier<S> {
        ThresholdedClassifier::with_min_confidence(scorer, self.hand_shape.min_confidence)
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gesture_pipeline").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
