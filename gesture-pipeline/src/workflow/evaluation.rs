//! Batch evaluation over feature-row files

use crate::classify::{ClassTally, ClassifierEnsemble, ConfusionMatrix, GestureClass, SequenceModelEngine};
use crate::sequence::SequenceBuilder;
use crate::Result;
use std::path::Path;
use tracing::info;

/// Classify every window of one feature-row file
pub fn classify_file<E: SequenceModelEngine>(
    ensemble: &ClassifierEnsemble<E>,
    builder: &SequenceBuilder<'_>,
    path: &Path,
) -> Result<ClassTally> {
    let windows = builder.build_from_file(path)?;
    let tally = ensemble.evaluate_batch(&windows)?;
    info!("Classified {} windows from {:?}", tally.total(), path);
    Ok(tally)
}

/// Ground truth × prediction over the per-class training files
pub fn confusion_matrix<E: SequenceModelEngine>(
    ensemble: &ClassifierEnsemble<E>,
    builder: &SequenceBuilder<'_>,
    dataset_dir: &Path,
) -> Result<ConfusionMatrix> {
    let mut confusion = ConfusionMatrix::default();
    for class in GestureClass::ALL {
        let path = dataset_dir.join(class.training_file());
        let windows = builder.build_from_file(&path)?;
        let tally = ensemble.update_confusion(&mut confusion, class, &windows)?;
        info!(
            "{}: {} of {} windows correct",
            class,
            tally.count(class),
            tally.total()
        );
    }
    Ok(confusion)
}
