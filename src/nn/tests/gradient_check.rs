/*
 * @Description  : 用中心差分校验每个可微节点的反向传播
 */

use super::tiny_edges;
use crate::data::transforms::{masked_one_hot, one_hot};
use crate::nn::{
    Aggregation, Graph, Init, Var, VarActivationOps, VarLossOps, VarMatrixOps, VarMessageOps,
};
use crate::tensor::Tensor;

const EPS: f32 = 1e-3;
const TOL: f32 = 2e-2;

/// 逐元素扰动 `params`，比较数值梯度与 backward 得到的梯度
fn assert_gradients_match(loss: &Var, params: &[Var]) {
    let graph = loss.get_graph();
    graph.zero_grad();
    loss.backward().unwrap();
    let analytic: Vec<Tensor> = params
        .iter()
        .map(|p| p.grad().unwrap().expect("参数应该有梯度"))
        .collect();

    for (param, grad) in params.iter().zip(&analytic) {
        let base = param.value().unwrap().unwrap();
        assert_eq!(grad.shape(), base.shape());
        for r in 0..base.rows() {
            for c in 0..base.cols() {
                let mut plus = base.clone();
                plus[[r, c]] += EPS;
                param.set_value(&plus).unwrap();
                loss.forward().unwrap();
                let loss_plus = loss.item().unwrap();

                let mut minus = base.clone();
                minus[[r, c]] -= EPS;
                param.set_value(&minus).unwrap();
                loss.forward().unwrap();
                let loss_minus = loss.item().unwrap();

                let numeric = (loss_plus - loss_minus) / (2.0 * EPS);
                let got = grad[[r, c]];
                assert!(
                    (numeric - got).abs() <= TOL * (1.0 + numeric.abs()),
                    "{} [{r}, {c}]: 数值梯度 {numeric} vs 反向传播 {got}",
                    param.name().unwrap()
                );
            }
        }
        param.set_value(&base).unwrap();
    }
}

fn normal_param(graph: &Graph, shape: &[usize], name: &str) -> Var {
    graph
        .parameter(shape, Init::Normal { mean: 0.0, std: 1.0 }, name)
        .unwrap()
}

#[test]
fn test_grad_linear_relu() {
    let graph = Graph::new_with_seed(11);
    let x = graph
        .input(&Tensor::new(
            &[0.5, -1.0, 2.0, 0.3, 1.5, 0.2, -0.7, 1.1, -0.4, 0.9, 0.6, -1.3],
            &[3, 4],
        ))
        .unwrap();
    let w = normal_param(&graph, &[4, 3], "w");
    let b = normal_param(&graph, &[1, 3], "b");
    let target = graph.input(&one_hot(&[0, 2, 1], 3)).unwrap();

    let loss = x
        .matmul(&w)
        .unwrap()
        .try_add(&b)
        .unwrap()
        .relu()
        .unwrap()
        .masked_cross_entropy(&target)
        .unwrap();
    assert_gradients_match(&loss, &[w, b]);
}

#[test]
fn test_grad_matmul_both_operands() {
    let graph = Graph::new_with_seed(12);
    let a = normal_param(&graph, &[2, 3], "a");
    let b = normal_param(&graph, &[3, 2], "b");
    let target = graph.input(&one_hot(&[1, 0], 2)).unwrap();
    let loss = a.matmul(&b).unwrap().masked_cross_entropy(&target).unwrap();
    assert_gradients_match(&loss, &[a, b]);
}

#[test]
fn test_grad_propagate_gcn_norm() {
    let graph = Graph::new_with_seed(13);
    let x = normal_param(&graph, &[4, 3], "x");
    let edges = graph.edge_input(&tiny_edges(), "edges").unwrap();
    let target = graph.input(&one_hot(&[0, 1, 2, 1], 3)).unwrap();
    let loss = x
        .propagate(&edges, Aggregation::GcnNorm)
        .unwrap()
        .masked_cross_entropy(&target)
        .unwrap();
    assert_gradients_match(&loss, &[x]);
}

#[test]
fn test_grad_propagate_sum() {
    let graph = Graph::new_with_seed(14);
    let x = normal_param(&graph, &[4, 3], "x");
    let edges = graph.edge_input(&tiny_edges(), "edges").unwrap();
    let target = graph.input(&one_hot(&[2, 1, 0, 0], 3)).unwrap();
    let loss = x
        .propagate(&edges, Aggregation::Sum)
        .unwrap()
        .masked_cross_entropy(&target)
        .unwrap();
    assert_gradients_match(&loss, &[x]);
}

#[test]
fn test_grad_gat_attention() {
    let graph = Graph::new_with_seed(15);
    let h = normal_param(&graph, &[4, 3], "h");
    let att_src = normal_param(&graph, &[1, 3], "att_src");
    let att_dst = normal_param(&graph, &[1, 3], "att_dst");
    let edges = graph.edge_input(&tiny_edges(), "edges").unwrap();
    let target = graph.input(&one_hot(&[1, 2, 0, 2], 3)).unwrap();
    let loss = h
        .gat_attention(&att_src, &att_dst, &edges, 0.2)
        .unwrap()
        .masked_cross_entropy(&target)
        .unwrap();
    assert_gradients_match(&loss, &[h, att_src, att_dst]);
}

#[test]
fn test_grad_masked_cross_entropy() {
    let graph = Graph::new_with_seed(16);
    let logits = normal_param(&graph, &[4, 3], "logits");
    let target = graph
        .input(&masked_one_hot(&[0, 1, 2, 1], &[true, false, true, false], 3))
        .unwrap();
    let loss = logits.masked_cross_entropy(&target).unwrap();
    assert_gradients_match(&loss, std::slice::from_ref(&logits));

    // 未选中的行不产生梯度
    let grad = logits.grad().unwrap().unwrap();
    assert_eq!(grad.row(1).unwrap(), vec![0.0; 3]);
    assert_eq!(grad.row(3).unwrap(), vec![0.0; 3]);
}

#[test]
fn test_grad_two_layer_gcn_stack() {
    let graph = Graph::new_with_seed(17);
    let x = graph
        .input(&Tensor::new(
            &[1.0, 0.0, 0.5, 0.0, 1.0, 0.2, 0.3, 0.3, 1.0, 0.0, 0.6, 0.4],
            &[4, 3],
        ))
        .unwrap();
    let edges = graph.edge_input(&tiny_edges(), "edges").unwrap();
    let w1 = normal_param(&graph, &[3, 5], "w1");
    let w2 = normal_param(&graph, &[5, 2], "w2");
    let target = graph.input(&one_hot(&[0, 1, 1, 0], 2)).unwrap();

    let h = x
        .matmul(&w1)
        .unwrap()
        .propagate(&edges, Aggregation::GcnNorm)
        .unwrap()
        .relu()
        .unwrap();
    let loss = h
        .matmul(&w2)
        .unwrap()
        .propagate(&edges, Aggregation::GcnNorm)
        .unwrap()
        .masked_cross_entropy(&target)
        .unwrap();
    assert_gradients_match(&loss, &[w1, w2]);
}

#[test]
fn test_parameter_grads_accumulate_until_zero_grad() {
    let graph = Graph::new_with_seed(18);
    let logits = normal_param(&graph, &[2, 2], "logits");
    let target = graph.input(&one_hot(&[0, 1], 2)).unwrap();
    let loss = logits.masked_cross_entropy(&target).unwrap();

    loss.backward().unwrap();
    let once = logits.grad().unwrap().unwrap();
    loss.backward().unwrap();
    let twice = logits.grad().unwrap().unwrap();
    assert!(twice.max_abs_diff(&(&once * 2.0)).unwrap() < 1e-6);

    graph.zero_grad();
    assert!(logits.grad().unwrap().is_none());
}
