use crate::data::EdgeIndex;
use crate::nn::{Graph, GraphError, Init, VarActivationOps, VarMatrixOps, VarMessageOps};
use crate::nn::Aggregation;
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_forward_matmul_add_relu() {
    let graph = Graph::new_with_seed(1);
    let x = graph
        .input(&Tensor::new(&[1.0, 2.0, -3.0, 0.5], &[2, 2]))
        .unwrap();
    let w = graph.parameter(&[2, 2], Init::Zeros, "w").unwrap();
    w.set_value(&Tensor::new(&[1.0, 0.0, 0.0, 1.0], &[2, 2]))
        .unwrap();
    let b = graph.parameter(&[1, 2], Init::Constant(1.0), "b").unwrap();

    let y = x.matmul(&w).unwrap().try_add(&b).unwrap().relu().unwrap();
    y.forward().unwrap();

    let value = y.value().unwrap().unwrap();
    assert_eq!(value, Tensor::new(&[2.0, 3.0, 0.0, 1.5], &[2, 2]));
}

#[test]
fn test_placeholder_without_value_fails() {
    let graph = Graph::new_with_seed(1);
    let x = graph.input_placeholder("nodes").unwrap();
    let y = x.relu().unwrap();
    assert!(matches!(y.forward(), Err(GraphError::InvalidOperation(_))));

    x.set_value(&Tensor::new(&[-1.0, 1.0], &[1, 2])).unwrap();
    y.forward().unwrap();
    assert_eq!(y.value().unwrap().unwrap(), Tensor::new(&[0.0, 1.0], &[1, 2]));
}

#[test]
fn test_forward_recomputes_after_input_change() {
    let graph = Graph::new_with_seed(1);
    let x = graph.input_placeholder("nodes").unwrap();
    let edges = graph.edge_placeholder("edges").unwrap();
    let y = x.propagate(&edges, Aggregation::Sum).unwrap();

    x.set_value(&Tensor::new(&[1.0, 2.0], &[2, 1])).unwrap();
    edges.set_edges(&EdgeIndex::new(vec![(0, 1)], 2).unwrap()).unwrap();
    y.forward().unwrap();
    assert_eq!(y.value().unwrap().unwrap(), Tensor::new(&[0.0, 1.0], &[2, 1]));

    edges.set_edges(&EdgeIndex::new(vec![(1, 0)], 2).unwrap()).unwrap();
    y.forward().unwrap();
    assert_eq!(y.value().unwrap().unwrap(), Tensor::new(&[2.0, 0.0], &[2, 1]));
}

#[test]
fn test_duplicate_parameter_name_rejected() {
    let graph = Graph::new_with_seed(1);
    graph.parameter(&[2, 2], Init::Zeros, "w").unwrap();
    let result = graph.parameter(&[2, 2], Init::Zeros, "w");
    assert!(matches!(result, Err(GraphError::DuplicateNodeName(_))));
}

#[test]
fn test_vars_from_different_graphs_cannot_mix() {
    let g1 = Graph::new_with_seed(1);
    let g2 = Graph::new_with_seed(2);
    let a = g1.parameter(&[2, 2], Init::Zeros, "a").unwrap();
    let b = g2.parameter(&[2, 2], Init::Zeros, "b").unwrap();
    assert!(!a.same_graph(&b));
    assert!(matches!(a.matmul(&b), Err(GraphError::InvalidOperation(_))));
}

#[test]
fn test_edge_input_is_not_a_tensor_operand() {
    let graph = Graph::new_with_seed(1);
    let edges = graph
        .edge_input(&EdgeIndex::new(vec![(0, 1)], 2).unwrap(), "edges")
        .unwrap();
    let w = graph.parameter(&[2, 2], Init::Zeros, "w").unwrap();
    assert!(edges.matmul(&w).is_err());
    // 反过来，消息传递的第二个操作数必须是边输入
    assert!(w.propagate(&w, Aggregation::Sum).is_err());
}

#[test]
fn test_input_has_no_grad() {
    let graph = Graph::new_with_seed(1);
    let x = graph.input(&Tensor::ones(&[1, 2])).unwrap();
    assert!(x.grad().is_err());
}

#[test]
fn test_same_seed_same_init() {
    let g1 = Graph::new_with_seed(42);
    let g2 = Graph::new_with_seed(42);
    let p1 = g1.parameter(&[3, 4], Init::Kaiming, "p").unwrap();
    let p2 = g2.parameter(&[3, 4], Init::Kaiming, "p").unwrap();
    assert_eq!(p1.value().unwrap(), p2.value().unwrap());

    let g3 = Graph::new_with_seed(43);
    let p3 = g3.parameter(&[3, 4], Init::Kaiming, "p").unwrap();
    assert_ne!(p1.value().unwrap(), p3.value().unwrap());
}

#[test]
fn test_xavier_init_within_bound() {
    let graph = Graph::new_with_seed(7);
    let w = graph.parameter(&[10, 6], Init::Xavier, "w").unwrap();
    let bound = (6.0f32 / 16.0).sqrt();
    for v in w.value().unwrap().unwrap().to_vec() {
        assert!(v.abs() <= bound);
    }
}

#[test]
fn test_trainable_nodes_in_creation_order() {
    let graph = Graph::new_with_seed(1);
    let a = graph.parameter(&[1, 1], Init::Zeros, "a").unwrap();
    let _x = graph.input(&Tensor::ones(&[1, 1])).unwrap();
    let b = graph.parameter(&[1, 1], Init::Zeros, "b").unwrap();
    assert_eq!(
        graph.inner().get_trainable_nodes(),
        vec![a.node_id(), b.node_id()]
    );
}

#[test]
fn test_no_grad_restores_mode() {
    let graph = Graph::new_with_seed(1);
    assert!(graph.is_train());
    let inside = graph.no_grad(|| graph.is_train());
    assert!(!inside);
    assert!(graph.is_train());

    graph.eval();
    graph.no_grad(|| ());
    assert!(!graph.is_train());
}

#[test]
fn test_item_of_scalar() {
    let graph = Graph::new_with_seed(1);
    let x = graph.input(&Tensor::new(&[2.5], &[1, 1])).unwrap();
    assert_abs_diff_eq!(x.item().unwrap(), 2.5);
    let m = graph.input(&Tensor::ones(&[2, 2])).unwrap();
    assert!(m.item().is_err());
}
