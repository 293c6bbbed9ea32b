use crate::data::EdgeIndex;
use crate::model::{GnnModel, ModelConfig, TransformKind};
use crate::nn::FrozenGraph;
use crate::runtime::Environment;
use crate::tensor::Tensor;
use crate::verify::{Tolerance, VerifyError, check_equivalence, verify_artifact};

fn features(n: usize) -> Tensor {
    let data: Vec<f32> = (0..n * 3).map(|i| ((i * 7) % 5) as f32 / 4.0 - 0.5).collect();
    Tensor::new(&data, &[n, 3])
}

fn edges(n: usize) -> EdgeIndex {
    let pairs = (0..n).flat_map(|i| [(i, (i + 1) % n), ((i + 1) % n, i)]).collect();
    EdgeIndex::new(pairs, n).unwrap()
}

fn model(kind: TransformKind, out_dim: usize) -> GnnModel {
    GnnModel::new("gnn", &ModelConfig::new(kind, 3, 8, out_dim), 5).unwrap()
}

#[test]
fn test_exported_model_is_equivalent() {
    let env = Environment::default();
    for kind in [TransformKind::Linear, TransformKind::Gcn, TransformKind::Gat] {
        let model = model(kind, 3);
        let session = env
            .session_from_graph(model.freeze(&features(6), Some(&edges(6))).unwrap())
            .unwrap();
        let report =
            check_equivalence(&model, &session, &features(6), &edges(6), &Tolerance::default())
                .unwrap();
        assert!(report.passed, "{kind}: {report}");
        assert_eq!((report.node_count, report.class_count), (6, 3));
        assert!(report.max_abs_logit <= 1e-3);
        assert_eq!(report.top1_agreement, 1.0);
        assert!(report.ensure().is_ok());
    }
}

#[test]
fn test_tampered_artifact_is_reported_as_drift() {
    let model = model(TransformKind::Gcn, 3);
    let mut frozen: FrozenGraph = model.freeze(&features(6), Some(&edges(6))).unwrap();
    let bias = frozen
        .initializers
        .iter_mut()
        .find(|init| init.name == "conv2_b")
        .unwrap();
    bias.data[0] += 0.5;

    let env = Environment::default();
    let session = env.session_from_graph(frozen).unwrap();
    let report =
        check_equivalence(&model, &session, &features(6), &edges(6), &Tolerance::default())
            .unwrap();
    assert!(!report.passed);
    assert!((report.max_abs_logit - 0.5).abs() < 1e-4);
    assert!(report.max_abs_prob > 1e-4);
    assert!(matches!(report.ensure(), Err(VerifyError::Drift { .. })));

    // 放宽容差后同样的偏差可以接受
    let loose = Tolerance {
        max_abs_logit: 1.0,
        max_abs_prob: 1.0,
        min_top1_agreement: 0.0,
    };
    let session = env
        .session_from_graph(model.freeze(&features(6), Some(&edges(6))).unwrap())
        .unwrap();
    assert!(
        check_equivalence(&model, &session, &features(6), &edges(6), &loose)
            .unwrap()
            .passed
    );
}

#[test]
fn test_non_finite_artifact_output_is_drift() {
    let model = model(TransformKind::Gcn, 3);
    let mut frozen = model.freeze(&features(6), Some(&edges(6))).unwrap();
    let bias = frozen
        .initializers
        .iter_mut()
        .find(|init| init.name == "conv2_b")
        .unwrap();
    bias.data[2] = f32::NAN;

    let session = Environment::default().session_from_graph(frozen).unwrap();
    // 容差放到最宽也不能通过
    let loose = Tolerance {
        max_abs_logit: f32::MAX,
        max_abs_prob: f32::MAX,
        min_top1_agreement: 0.0,
    };
    for tolerance in [Tolerance::default(), loose] {
        let report =
            check_equivalence(&model, &session, &features(6), &edges(6), &tolerance).unwrap();
        assert!(!report.passed, "{report}");
        assert!(report.max_abs_logit.is_nan());
        assert!(report.to_string().starts_with("未通过"));
        assert!(matches!(report.ensure(), Err(VerifyError::Drift { .. })));
    }
}

#[test]
fn test_input_shape_mismatch_is_fatal() {
    let model = model(TransformKind::Gcn, 3);
    let env = Environment::default();
    let session = env
        .session_from_graph(model.freeze(&features(6), Some(&edges(6))).unwrap())
        .unwrap();
    assert!(matches!(
        check_equivalence(&model, &session, &features(7), &edges(7), &Tolerance::default()),
        Err(VerifyError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_output_shape_mismatch_is_fatal() {
    let exported = model(TransformKind::Gcn, 3);
    let other = model(TransformKind::Gcn, 4);
    let env = Environment::default();
    let session = env
        .session_from_graph(exported.freeze(&features(6), Some(&edges(6))).unwrap())
        .unwrap();
    assert!(matches!(
        check_equivalence(&other, &session, &features(6), &edges(6), &Tolerance::default()),
        Err(VerifyError::ShapeMismatch { expected, got, .. }) if expected == [6, 4] && got == [6, 3]
    ));
}

#[test]
fn test_verify_artifact_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gnn.ogfg");
    let model = model(TransformKind::GraphConv, 3);
    model.export(&features(6), Some(&edges(6)), &path).unwrap();
    let report =
        verify_artifact(&model, &path, &features(6), &edges(6), &Tolerance::default()).unwrap();
    assert!(report.passed);
    assert!(report.to_string().starts_with("通过"));
}

#[test]
fn test_tolerance_defaults_and_partial_json() {
    let tol: Tolerance = serde_json::from_str(r#"{ "max_abs_logit": 0.01 }"#).unwrap();
    assert_eq!(tol.max_abs_logit, 0.01);
    assert_eq!(tol.max_abs_prob, Tolerance::default().max_abs_prob);
    assert_eq!(tol.min_top1_agreement, 0.95);
}
