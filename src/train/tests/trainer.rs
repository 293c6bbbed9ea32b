use super::{quick_config, tiny_dataset, tiny_model};
use crate::data::{CitationDataset, DataError, SplitMasks};
use crate::model::{ConfigError, TransformKind};
use crate::nn::Module;
use crate::train::{TrainConfig, TrainError, Trainer, evaluate};

#[test]
fn test_training_reduces_loss_and_learns() {
    let dataset = tiny_dataset();
    for kind in [TransformKind::Linear, TransformKind::Gcn] {
        let model = tiny_model("m", kind, &dataset);
        let trainer = Trainer::new(quick_config(100)).unwrap();
        let report = trainer.train(&model, &dataset).unwrap();

        assert_eq!(report.history.len(), 100);
        let first = report.history[0].loss;
        let last = report.final_loss().unwrap();
        assert!(last < first, "{kind}: {first} -> {last}");
        assert!(report.best_val_acc >= 0.5, "{kind}: {}", report.best_val_acc);
        assert!((1..=100).contains(&report.best_epoch));
    }
}

#[test]
fn test_keep_best_restores_best_val_parameters() {
    let dataset = tiny_dataset();
    let model = tiny_model("gcn", TransformKind::Gcn, &dataset);
    let report = Trainer::new(quick_config(30))
        .unwrap()
        .train(&model, &dataset)
        .unwrap();
    let acc = evaluate(&model, &dataset).unwrap();
    assert!((acc.val - report.best_val_acc).abs() < 1e-6);
}

#[test]
fn test_default_sgd_config_trains() {
    let dataset = tiny_dataset();
    let model = tiny_model("gcn", TransformKind::Gcn, &dataset);
    let config = TrainConfig {
        max_epochs: 20,
        ..TrainConfig::default()
    };
    let report = Trainer::new(config).unwrap().train(&model, &dataset).unwrap();
    assert!(report.history.iter().all(|s| s.loss.is_finite()));
    // 训练之后参数仍然属于同一张图，且全部有梯度
    assert!(model.parameters().iter().all(|p| p.grad().unwrap().is_some()));
}

#[test]
fn test_invalid_train_config() {
    for config in [
        TrainConfig {
            max_epochs: 0,
            ..TrainConfig::default()
        },
        TrainConfig {
            lr: 0.0,
            ..TrainConfig::default()
        },
        TrainConfig {
            weight_decay: -1.0,
            ..TrainConfig::default()
        },
    ] {
        assert!(matches!(
            Trainer::new(config),
            Err(ConfigError::InvalidTraining(_))
        ));
    }
}

#[test]
fn test_empty_train_mask_is_an_error() {
    let dataset = tiny_dataset();
    let n = dataset.num_nodes();
    let masks = SplitMasks::new(vec![false; n], vec![true; n], vec![false; n]).unwrap();
    let empty = CitationDataset::new(
        "empty",
        dataset.features().clone(),
        dataset.edges().clone(),
        dataset.labels().to_vec(),
        dataset.num_classes(),
        masks,
    )
    .unwrap();
    let model = tiny_model("gcn", TransformKind::Gcn, &empty);
    let result = Trainer::new(quick_config(5)).unwrap().train(&model, &empty);
    assert!(matches!(
        result,
        Err(TrainError::Data(DataError::EmptyMask(_)))
    ));
}
