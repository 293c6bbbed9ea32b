/*
 * @Description  : Sgd / Adam 优化器测试
 */

use crate::data::transforms::one_hot;
use crate::nn::{Adam, Graph, Init, Optimizer, Sgd, Var, VarLossOps, VarMatrixOps};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

fn setup() -> (Graph, Var, Var, Var) {
    let graph = Graph::new_with_seed(21);
    let x = graph
        .input(&Tensor::new(&[1.0, 0.0, 0.5, 0.0, 1.0, -0.5, 0.5, 0.5, 1.0], &[3, 3]))
        .unwrap();
    let w = graph
        .parameter(&[3, 3], Init::Normal { mean: 0.0, std: 0.5 }, "w")
        .unwrap();
    let target = graph.input(&one_hot(&[0, 1, 2], 3)).unwrap();
    let loss = x.matmul(&w).unwrap().masked_cross_entropy(&target).unwrap();
    (graph, x, w, loss)
}

#[test]
fn test_sgd_single_step_matches_formula() {
    let (graph, _x, w, loss) = setup();
    let before = w.value().unwrap().unwrap();
    loss.backward().unwrap();
    let grad = w.grad().unwrap().unwrap();

    let mut sgd = Sgd::new(&graph, std::slice::from_ref(&w), 0.1).with_weight_decay(0.01);
    sgd.step().unwrap();

    let expected = &before - &(&(&grad + &(&before * 0.01)) * 0.1);
    let after = w.value().unwrap().unwrap();
    assert!(after.max_abs_diff(&expected).unwrap() < 1e-6);
}

#[test]
fn test_sgd_momentum_second_step() {
    let (graph, _x, w, loss) = setup();
    let mut sgd = Sgd::new(&graph, std::slice::from_ref(&w), 0.1).with_momentum(0.9);

    sgd.minimize(&loss).unwrap();
    let g1 = w.grad().unwrap().unwrap();
    let after_first = w.value().unwrap().unwrap();

    sgd.minimize(&loss).unwrap();
    let g2 = w.grad().unwrap().unwrap();
    let after_second = w.value().unwrap().unwrap();

    // b2 = 0.9 * g1 + g2
    let velocity = &(&g1 * 0.9) + &g2;
    let expected = &after_first - &(&velocity * 0.1);
    assert!(after_second.max_abs_diff(&expected).unwrap() < 1e-6);
}

#[test]
fn test_adam_first_step_moves_by_lr() {
    let (graph, _x, w, loss) = setup();
    let before = w.value().unwrap().unwrap();
    let mut adam = Adam::new(&graph, std::slice::from_ref(&w), 0.01);
    adam.minimize(&loss).unwrap();
    let grad = w.grad().unwrap().unwrap();
    let after = w.value().unwrap().unwrap();

    // 首步 m_hat = g, v_hat = g²，更新量约为 lr * sign(g)
    for r in 0..3 {
        for c in 0..3 {
            let g = grad[[r, c]];
            if g.abs() > 1e-4 {
                assert_abs_diff_eq!(
                    before[[r, c]] - after[[r, c]],
                    0.01 * g.signum(),
                    epsilon = 1e-4
                );
            }
        }
    }
}

#[test]
fn test_optimizers_reduce_loss() {
    for use_adam in [false, true] {
        let (graph, _x, w, loss) = setup();
        let params = [w];
        let mut optimizer: Box<dyn Optimizer> = if use_adam {
            Box::new(Adam::new(&graph, &params, 0.1))
        } else {
            Box::new(Sgd::new(&graph, &params, 1.0).with_momentum(0.5))
        };
        let first = optimizer.minimize(&loss).unwrap();
        let mut last = first;
        for _ in 0..50 {
            last = optimizer.minimize(&loss).unwrap();
        }
        assert!(last < first * 0.5, "adam={use_adam}: {first} -> {last}");
    }
}

#[test]
fn test_optimizer_only_updates_bound_params() {
    let graph = Graph::new_with_seed(22);
    let a = graph.parameter(&[2, 2], Init::Constant(0.5), "a").unwrap();
    let b = graph
        .parameter(&[2, 2], Init::Normal { mean: 0.0, std: 1.0 }, "b")
        .unwrap();
    let b_before = b.value().unwrap().unwrap();
    let target = graph.input(&one_hot(&[0, 1], 2)).unwrap();
    let loss = a.matmul(&b).unwrap().masked_cross_entropy(&target).unwrap();

    let mut sgd = Sgd::new(&graph, std::slice::from_ref(&a), 1.0);
    sgd.minimize(&loss).unwrap();
    assert_ne!(a.value().unwrap().unwrap(), Tensor::ones(&[2, 2]) * 0.5);
    assert_eq!(b.value().unwrap().unwrap(), b_before);
}

#[test]
fn test_learning_rate_accessors_and_reset() {
    let (graph, _x, w, loss) = setup();
    let mut adam = Adam::new(&graph, &[w], 0.01);
    assert_abs_diff_eq!(adam.learning_rate(), 0.01);
    adam.set_learning_rate(0.02);
    assert_abs_diff_eq!(adam.learning_rate(), 0.02);
    adam.minimize(&loss).unwrap();
    adam.reset();
    adam.minimize(&loss).unwrap();
}
