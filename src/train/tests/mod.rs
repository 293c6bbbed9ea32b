mod trainer;

use crate::data::{CitationDataset, SyntheticSpec};
use crate::model::{GnnModel, ModelConfig, TransformKind};
use crate::train::{OptimizerKind, TrainConfig};

pub(super) fn tiny_dataset() -> CitationDataset {
    CitationDataset::synthetic(&SyntheticSpec::tiny(), 7).unwrap()
}

pub(super) fn tiny_model(name: &str, kind: TransformKind, dataset: &CitationDataset) -> GnnModel {
    let config = ModelConfig::new(kind, dataset.num_features(), 8, dataset.num_classes());
    GnnModel::new(name, &config, 11).unwrap()
}

pub(super) fn quick_config(epochs: usize) -> TrainConfig {
    TrainConfig {
        max_epochs: epochs,
        optimizer: OptimizerKind::Adam,
        lr: 0.01,
        weight_decay: 5e-4,
        log_every: 10,
        keep_best: true,
    }
}
