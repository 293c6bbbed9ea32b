use std::collections::HashMap;
use std::fs;

use approx::assert_abs_diff_eq;
use ndarray::Array2;

use crate::data::EdgeIndex;
use crate::model::{EDGES_INPUT, GnnModel, LOGITS_OUTPUT, ModelConfig, NODES_INPUT, TransformKind};
use crate::nn::{DType, FrozenGraph, FrozenNode, FrozenOp, TensorInfo};
use crate::runtime::{Environment, RuntimeError, Value};
use crate::tensor::Tensor;

fn features() -> Tensor {
    Tensor::new(
        &[
            1.0, 0.0, 0.5, //
            0.0, 1.0, -0.5, //
            0.5, 0.5, 1.0, //
            -1.0, 0.0, 0.0,
        ],
        &[4, 3],
    )
}

fn edges() -> EdgeIndex {
    EdgeIndex::new(vec![(0, 1), (1, 0), (1, 2), (2, 1), (2, 3), (0, 0)], 4).unwrap()
}

fn model(kind: TransformKind) -> GnnModel {
    GnnModel::new("m", &ModelConfig::new(kind, 3, 5, 2), 3).unwrap()
}

fn inputs(with_edges: bool) -> HashMap<&'static str, Value> {
    let mut map = HashMap::from([(NODES_INPUT, Value::from_tensor(&features()).unwrap())]);
    if with_edges {
        map.insert(EDGES_INPUT, Value::from_edges(&edges()));
    }
    map
}

#[test]
fn test_session_matches_model_for_every_kind() {
    let env = Environment::default();
    for kind in [
        TransformKind::Linear,
        TransformKind::Gcn,
        TransformKind::GraphConv,
        TransformKind::Gat,
    ] {
        let model = model(kind);
        let expected = model.forward(&features(), Some(&edges())).unwrap();
        let frozen = model.freeze(&features(), Some(&edges())).unwrap();
        let session = env.session_from_graph(frozen).unwrap();

        let outputs = session.run(inputs(kind.uses_edges())).unwrap();
        let logits = outputs.f32(LOGITS_OUTPUT).unwrap();
        assert_eq!(logits.shape(), &[4, 2]);
        for (a, b) in logits.iter().zip(expected.to_vec()) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-5);
        }
    }
}

#[test]
fn test_live_session_counter_follows_drop() {
    let env = Environment::new("test");
    let frozen = model(TransformKind::Gcn)
        .freeze(&features(), Some(&edges()))
        .unwrap();
    let first = env.session_from_graph(frozen.clone()).unwrap();
    {
        let second = env.session_from_graph(frozen).unwrap();
        assert_eq!(env.live_sessions(), 2);
        // 失败的 run 不影响计数
        assert!(second.run(HashMap::new()).is_err());
    }
    assert_eq!(env.live_sessions(), 1);
    drop(first);
    assert_eq!(env.live_sessions(), 0);
}

#[test]
fn test_create_session_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gcn.ogfg");
    let model = model(TransformKind::Gcn);
    model.export(&features(), Some(&edges()), &path).unwrap();

    let env = Environment::default();
    let session = env.create_session(&path).unwrap();
    assert_eq!(session.source(), Some(path.as_path()));
    assert_eq!(
        session.input_info(),
        &[
            TensorInfo {
                name: NODES_INPUT.to_string(),
                dtype: DType::F32,
                shape: vec![4, 3],
            },
            TensorInfo {
                name: EDGES_INPUT.to_string(),
                dtype: DType::I64,
                shape: vec![2, 6],
            },
        ]
    );
    assert_eq!(session.output_info()[0].shape, vec![4, 2]);
    assert_eq!(env.live_sessions(), 1);
}

#[test]
fn test_mlp_artifact_has_no_edge_input() {
    let frozen = model(TransformKind::Linear)
        .freeze(&features(), None)
        .unwrap();
    let env = Environment::default();
    let session = env.session_from_graph(frozen).unwrap();
    assert_eq!(session.input_info().len(), 1);
    assert!(matches!(
        session.run(inputs(true)),
        Err(RuntimeError::UnknownInput(name)) if name == EDGES_INPUT
    ));
}

#[test]
fn test_missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    let env = Environment::default();
    assert!(matches!(
        env.create_session(dir.path().join("nope.ogfg")),
        Err(RuntimeError::Io(_))
    ));

    let garbage = dir.path().join("garbage.ogfg");
    fs::write(&garbage, b"definitely not a graph").unwrap();
    assert!(matches!(env.create_session(&garbage), Err(RuntimeError::Format(_))));

    let truncated = dir.path().join("truncated.ogfg");
    fs::write(&truncated, b"OG").unwrap();
    assert!(matches!(env.create_session(&truncated), Err(RuntimeError::Format(_))));
    assert_eq!(env.live_sessions(), 0);
}

#[test]
fn test_run_validates_inputs() {
    let env = Environment::default();
    let frozen = model(TransformKind::Gcn)
        .freeze(&features(), Some(&edges()))
        .unwrap();
    let session = env.session_from_graph(frozen).unwrap();

    assert!(matches!(
        session.run(inputs(false)),
        Err(RuntimeError::MissingInput(name)) if name == EDGES_INPUT
    ));

    let mut wrong_dtype = inputs(true);
    wrong_dtype.insert(EDGES_INPUT, Value::F32(Array2::zeros((2, 6))));
    assert!(matches!(
        session.run(wrong_dtype),
        Err(RuntimeError::DTypeMismatch { .. })
    ));

    let mut wrong_shape = inputs(true);
    wrong_shape.insert(NODES_INPUT, Value::F32(Array2::zeros((5, 3))));
    assert!(matches!(
        session.run(wrong_shape),
        Err(RuntimeError::ShapeMismatch { .. })
    ));

    let mut out_of_range = inputs(true);
    let mut bad_edges = edges().to_matrix();
    bad_edges[[1, 4]] = 4;
    out_of_range.insert(EDGES_INPUT, Value::I64(bad_edges));
    assert!(matches!(
        session.run(out_of_range),
        Err(RuntimeError::EdgeOutOfRange {
            edge: 4,
            target_node: 4,
            node_count: 4,
            ..
        })
    ));
}

#[test]
fn test_inconsistent_graph_is_rejected() {
    let mut frozen = FrozenGraph::new("broken");
    frozen.inputs.push(TensorInfo {
        name: "nodes".to_string(),
        dtype: DType::F32,
        shape: vec![2, 2],
    });
    frozen.nodes.push(FrozenNode {
        name: "relu".to_string(),
        op: FrozenOp::Relu,
        inputs: vec!["hidden".to_string()],
        output: "out".to_string(),
    });
    frozen.outputs.push(TensorInfo {
        name: "out".to_string(),
        dtype: DType::F32,
        shape: vec![2, 2],
    });
    let env = Environment::default();
    assert!(matches!(
        env.session_from_graph(frozen.clone()),
        Err(RuntimeError::Format(_))
    ));

    frozen.nodes[0].inputs = vec!["nodes".to_string()];
    let session = env.session_from_graph(frozen).unwrap();
    let x = Array2::from_shape_vec((2, 2), vec![-1.0f32, 2.0, 3.0, -4.0]).unwrap();
    let outputs = session.run(HashMap::from([("nodes", Value::F32(x))])).unwrap();
    assert_eq!(outputs.f32("out").unwrap().as_slice().unwrap(), &[0.0, 2.0, 3.0, 0.0]);
}

#[test]
fn test_smoke_run_with_random_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gat.ogfg");
    model(TransformKind::Gat)
        .export(&features(), Some(&edges()), &path)
        .unwrap();

    let report = crate::runtime::smoke_test(&path, 9).unwrap();
    assert_eq!(
        report.inputs,
        vec![
            (NODES_INPUT.to_string(), vec![4, 3]),
            (EDGES_INPUT.to_string(), vec![2, 6]),
        ]
    );
    assert_eq!(report.outputs, vec![(LOGITS_OUTPUT.to_string(), vec![4, 2])]);
    assert!(report.to_string().contains("output logits: [4, 2]"));

    let env = Environment::default();
    let session = env.create_session(&path).unwrap();
    let inputs = crate::runtime::random_inputs(&session, 9).unwrap();
    let edges = inputs[EDGES_INPUT].as_i64().unwrap();
    assert!(edges.iter().all(|&v| (0..4).contains(&v)));
}

#[test]
fn test_aggregation_over_too_few_rows_is_an_execution_error() {
    for kind in [TransformKind::Gcn, TransformKind::Gat] {
        let mut frozen = model(kind).freeze(&features(), Some(&edges())).unwrap();
        // 让第一个聚合算子读 [1, 5] 的偏置，而不是 [4, 5] 的隐藏层
        let node = frozen
            .nodes
            .iter_mut()
            .find(|node| {
                matches!(
                    node.op,
                    FrozenOp::Propagate { .. } | FrozenOp::GatAttention { .. }
                )
            })
            .unwrap();
        node.inputs[0] = "conv1_b".to_string();
        let target = node.name.clone();

        let env = Environment::default();
        let session = env.session_from_graph(frozen).unwrap();
        match session.run(inputs(true)) {
            Err(RuntimeError::Execution { node, .. }) => assert_eq!(node, target, "{kind}"),
            other => panic!("{kind}: 期望执行错误，实际为 {other:?}"),
        }
        drop(session);
        assert_eq!(env.live_sessions(), 0);
    }
}
