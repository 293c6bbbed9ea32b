/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 训练 -> 导出 -> 运行时推理 -> 与原模型比对的完整流程
 */
use only_gnn::data::{CitationDataset, SyntheticSpec};
use only_gnn::model::{EDGES_INPUT, GnnModel, ModelConfig, NODES_INPUT, TransformKind};
use only_gnn::runtime::Environment;
use only_gnn::train::{Checkpoint, OptimizerKind, TrainConfig, TrainOutcome, Trainer, train_or_load};
use only_gnn::verify::{Tolerance, verify_artifact};

fn train_config() -> TrainConfig {
    TrainConfig {
        max_epochs: 40,
        optimizer: OptimizerKind::Adam,
        lr: 0.01,
        ..TrainConfig::default()
    }
}

#[test]
fn test_trained_models_survive_export() {
    let dataset = CitationDataset::synthetic(&SyntheticSpec::tiny(), 21).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let trainer = Trainer::new(train_config()).unwrap();
    let checkpoint = Checkpoint::new(dir.path().join("ckpt"));

    for (name, kind) in [
        ("mlp", TransformKind::Linear),
        ("gcn", TransformKind::Gcn),
        ("graph_conv", TransformKind::GraphConv),
        ("gat", TransformKind::Gat),
    ] {
        let config = ModelConfig::new(kind, dataset.num_features(), 16, dataset.num_classes());
        let model = GnnModel::new(name, &config, 42).unwrap();
        let outcome = train_or_load(&model, &dataset, &trainer, &checkpoint).unwrap();
        assert!(matches!(outcome, TrainOutcome::Trained(_)));

        let path = dir.path().join(format!("{name}.ogfg"));
        let frozen = model
            .export(dataset.features(), Some(dataset.edges()), &path)
            .unwrap();
        let expected_inputs: &[&str] = if kind.uses_edges() {
            &[NODES_INPUT, EDGES_INPUT]
        } else {
            &[NODES_INPUT]
        };
        let names: Vec<&str> = frozen.inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, expected_inputs, "{name}");

        let report = verify_artifact(
            &model,
            &path,
            dataset.features(),
            dataset.edges(),
            &Tolerance::default(),
        )
        .unwrap();
        assert!(report.passed, "{name}: {report}");
        assert!(report.top1_agreement >= 0.95);
    }
}

#[test]
fn test_checkpoint_then_export_from_fresh_process() {
    let dataset = CitationDataset::synthetic(&SyntheticSpec::tiny(), 22).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let checkpoint = Checkpoint::new(dir.path());
    let trainer = Trainer::new(train_config()).unwrap();
    let config = ModelConfig::new(
        TransformKind::Gcn,
        dataset.num_features(),
        16,
        dataset.num_classes(),
    );

    let trained = GnnModel::new("gnn", &config, 1).unwrap();
    train_or_load(&trained, &dataset, &trainer, &checkpoint).unwrap();

    // 模拟再次启动：另一个种子的新模型从检查点恢复后导出
    let restored = GnnModel::new("gnn", &config, 2).unwrap();
    let outcome = train_or_load(&restored, &dataset, &trainer, &checkpoint).unwrap();
    assert!(matches!(outcome, TrainOutcome::Loaded(_)));

    let path = dir.path().join("gnn.ogfg");
    restored
        .export(dataset.features(), Some(dataset.edges()), &path)
        .unwrap();
    let report = verify_artifact(
        &trained,
        &path,
        dataset.features(),
        dataset.edges(),
        &Tolerance::default(),
    )
    .unwrap();
    assert!(report.ensure().is_ok());

    let env = Environment::default();
    let session = env.create_session(&path).unwrap();
    assert_eq!(session.output_info()[0].shape, vec![60, 3]);
    drop(session);
    assert_eq!(env.live_sessions(), 0);
}
