use crate::data::transforms::one_hot;
use crate::nn::{Graph, GraphError, Init, VarActivationOps, VarLossOps};
use crate::tensor::Tensor;

#[test]
fn test_dropout_train_mode_scales_kept_units() {
    let graph = Graph::new_with_seed(3);
    let x = graph.input(&Tensor::ones(&[20, 20])).unwrap();
    let y = x.dropout(0.5).unwrap();
    y.forward().unwrap();

    let values = y.value().unwrap().unwrap().to_vec();
    assert!(values.iter().all(|&v| v == 0.0 || v == 2.0));
    let dropped = values.iter().filter(|&&v| v == 0.0).count();
    // 400 个元素中丢弃比例应大致为一半
    assert!((120..=280).contains(&dropped), "丢弃了 {dropped} 个");
}

#[test]
fn test_dropout_eval_mode_is_identity() {
    let graph = Graph::new_with_seed(3);
    let data = Tensor::new(&[1.0, -2.0, 3.0, 4.0], &[2, 2]);
    let x = graph.input(&data).unwrap();
    let y = x.dropout(0.9).unwrap();
    graph.eval();
    y.forward().unwrap();
    assert_eq!(y.value().unwrap().unwrap(), data);
}

#[test]
fn test_dropout_masks_reproducible_with_seed() {
    let run = |seed| {
        let graph = Graph::new_with_seed(seed);
        let x = graph.input(&Tensor::ones(&[8, 8])).unwrap();
        let y = x.dropout(0.3).unwrap();
        y.forward().unwrap();
        y.value().unwrap().unwrap()
    };
    assert_eq!(run(5), run(5));
    assert_ne!(run(5), run(6));
}

#[test]
fn test_dropout_gradient_follows_mask() {
    let graph = Graph::new_with_seed(4);
    let w = graph
        .parameter(&[6, 3], Init::Normal { mean: 0.0, std: 1.0 }, "w")
        .unwrap();
    let dropped = w.dropout(0.5).unwrap();
    let target = graph.input(&one_hot(&[0, 1, 2, 0, 1, 2], 3)).unwrap();
    let loss = dropped.masked_cross_entropy(&target).unwrap();
    loss.backward().unwrap();

    let out = dropped.value().unwrap().unwrap().to_vec();
    let grad = w.grad().unwrap().unwrap().to_vec();
    for (o, g) in out.iter().zip(&grad) {
        if *o == 0.0 {
            assert_eq!(*g, 0.0);
        }
    }
}

#[test]
fn test_dropout_probability_validated() {
    let graph = Graph::new_with_seed(1);
    let x = graph.input(&Tensor::ones(&[2, 2])).unwrap();
    assert!(matches!(x.dropout(1.0), Err(GraphError::InvalidOperation(_))));
    assert!(x.dropout(-0.1).is_err());
    assert!(x.dropout(0.0).is_ok());
}
