//! Model Training and Persistence
//!
//! Training a class reads its feature-row file, cuts it into windows,
//! quantizes them, multiplies the windows with LOOT and hands the result to
//! the engine. Trained models live in one directory, one file per class.

use crate::classify::{ClassifierEnsemble, GestureClass, ModelParameters, SequenceModelEngine};
use crate::sequence::{loot_matrix, SequenceBuilder};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Model set for every gesture class, in [`GestureClass::ALL`] order
pub type ModelSet = Vec<(GestureClass, ModelParameters)>;

/// Directory holding one persisted model per class
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, class: GestureClass) -> PathBuf {
        self.dir.join(class.model_file())
    }

    pub fn load(&self, class: GestureClass) -> Result<ModelParameters> {
        ModelParameters::load(&self.path(class))
    }

    /// Load every class; the first missing or corrupt file fails the set
    pub fn load_all(&self) -> Result<ModelSet> {
        GestureClass::ALL
            .iter()
            .map(|&class| Ok((class, self.load(class)?)))
            .collect()
    }

    /// Load every class and reject models built for another alphabet
    pub fn load_compatible(&self, symbol_count: usize) -> Result<ModelSet> {
        let models = self.load_all()?;
        for (class, model) in &models {
            if model.symbol_count() != symbol_count {
                return Err(Error::ModelLoad(format!(
                    "{:?} has {} symbols, codebook has {}",
                    self.path(*class),
                    model.symbol_count(),
                    symbol_count
                )));
            }
        }
        Ok(models)
    }

    pub fn save(&self, class: GestureClass, model: &ModelParameters) -> Result<()> {
        let path = self.path(class);
        model.save(&path)?;
        info!("Saved {} model to {:?}", class, path);
        Ok(())
    }

    pub fn save_all(&self, models: &ModelSet) -> Result<()> {
        for (class, model) in models {
            self.save(*class, model)?;
        }
        Ok(())
    }

    /// Load the stored set, or train and store a fresh one when any model
    /// cannot be loaded, does not match the trainer's codebook, or `force`
    /// is set
    pub fn load_or_train<E: SequenceModelEngine>(
        &self,
        trainer: &ModelTrainer<'_, E>,
        force: bool,
    ) -> Result<ModelSet> {
        if !force {
            match self.load_compatible(trainer.symbol_count()) {
                Ok(models) => {
                    info!("Loaded {} models from {:?}", models.len(), self.dir);
                    return Ok(models);
                }
                Err(Error::ModelLoad(msg)) => {
                    warn!("Could not load models ({}), training from scratch", msg);
                }
                Err(e) => return Err(e),
            }
        }

        let models = trainer.train_all()?;
        self.save_all(&models)?;
        Ok(models)
    }
}

/// Trains per-class models from the dataset directory
pub struct ModelTrainer<'a, E> {
    engine: &'a E,
    builder: SequenceBuilder<'a>,
    dataset_dir: PathBuf,
}

impl<'a, E: SequenceModelEngine> ModelTrainer<'a, E> {
    pub fn new(engine: &'a E, builder: SequenceBuilder<'a>, dataset_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            builder,
            dataset_dir: dataset_dir.into(),
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.builder.symbol_count()
    }

    /// Path of the training rows for `class`
    pub fn training_path(&self, class: GestureClass) -> PathBuf {
        self.dataset_dir.join(class.training_file())
    }

    pub fn train_class(&self, class: GestureClass) -> Result<ModelParameters> {
        let path = self.training_path(class);
        let windows = self
            .builder
            .build_from_file(&path)
            .map_err(|e| Error::Training(format!("{} data {:?}: {}", class, path, e)))?;
        if windows.is_empty() {
            return Err(Error::Training(format!(
                "{:?} holds no complete window of {} rows",
                path,
                self.builder.window_size()
            )));
        }

        let augmented = loot_matrix(&windows)?;
        info!(
            "Training {} on {} windows ({} after LOOT)",
            class,
            windows.row_count(),
            augmented.row_count()
        );
        self.engine.train(&augmented)
    }

    pub fn train_all(&self) -> Result<ModelSet> {
        GestureClass::ALL
            .iter()
            .map(|&class| Ok((class, self.train_class(class)?)))
            .collect()
    }
}

/// Register a model set with a fresh ensemble
pub fn build_ensemble<E: SequenceModelEngine>(
    engine: E,
    models: ModelSet,
    confidence_floor: Option<f64>,
) -> Result<ClassifierEnsemble<E>> {
    let mut ensemble = ClassifierEnsemble::new(engine).with_confidence_floor(confidence_floor);
    for (class, model) in models {
        ensemble.register(class, model)?;
    }
    Ok(ensemble)
}
