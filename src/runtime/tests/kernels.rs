use approx::assert_abs_diff_eq;
use ndarray::{Array2, array};

use crate::nn::Aggregation;
use crate::runtime::kernels;

#[test]
fn test_add_broadcasts_row_vector() {
    let a = array![[1.0f32, 2.0], [3.0, 4.0]];
    let b = array![[10.0f32, 20.0]];
    assert_eq!(
        kernels::add(a.view(), b.view()).unwrap(),
        array![[11.0, 22.0], [13.0, 24.0]]
    );
    let bad = array![[1.0f32, 2.0, 3.0]];
    assert!(kernels::add(a.view(), bad.view()).is_err());
}

#[test]
fn test_matmul_checks_inner_dimension() {
    let a = Array2::<f32>::ones((2, 3));
    let b = Array2::<f32>::ones((3, 4));
    assert_eq!(kernels::matmul(a.view(), b.view()).unwrap(), Array2::from_elem((2, 4), 3.0));
    assert!(kernels::matmul(b.view(), a.view()).is_err());
}

#[test]
fn test_edge_pairs_reports_first_bad_edge() {
    let edges = array![[0i64, 1, 3], [1, 2, 0]];
    assert_eq!(
        kernels::edge_pairs(edges.view(), 4).unwrap(),
        vec![(0, 1), (1, 2), (3, 0)]
    );
    // 下标等于节点数同样越界
    assert_eq!(kernels::edge_pairs(edges.view(), 3), Err((2, 3, 0)));
    let negative = array![[0i64], [-1]];
    assert_eq!(kernels::edge_pairs(negative.view(), 3), Err((0, 0, -1)));
}

#[test]
fn test_gcn_propagation_adds_self_loops() {
    // 0 -> 1，补自环后 deg = [1, 2]
    let x = array![[1.0f32], [1.0]];
    let out = kernels::propagate(x.view(), &[(0, 1)], Aggregation::GcnNorm).unwrap();
    assert_abs_diff_eq!(out[[0, 0]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out[[1, 0]], 0.5 + 1.0 / 2f32.sqrt(), epsilon = 1e-6);
}

#[test]
fn test_sum_propagation_excludes_self() {
    let x = array![[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
    let out = kernels::propagate(x.view(), &[(0, 2), (1, 2)], Aggregation::Sum).unwrap();
    assert_eq!(out, array![[0.0, 0.0], [0.0, 0.0], [4.0, 6.0]]);
}

#[test]
fn test_gat_with_zero_attention_is_neighbourhood_mean() {
    let h = array![[2.0f32, 0.0], [0.0, 4.0], [6.0, 6.0]];
    let zeros = Array2::<f32>::zeros((1, 2));
    let out =
        kernels::gat_attention(h.view(), zeros.view(), zeros.view(), &[(0, 2), (1, 2)], 0.2)
            .unwrap();
    // 节点 2 的邻域（含自环）是 {0, 1, 2}
    assert_abs_diff_eq!(out[[2, 0]], 8.0 / 3.0, epsilon = 1e-5);
    assert_abs_diff_eq!(out[[2, 1]], 10.0 / 3.0, epsilon = 1e-5);
    // 孤立节点只看到自己
    assert_abs_diff_eq!(out[[0, 0]], 2.0, epsilon = 1e-6);

    let wrong = Array2::<f32>::zeros((1, 3));
    assert!(kernels::gat_attention(h.view(), wrong.view(), zeros.view(), &[], 0.2).is_err());
}

#[test]
fn test_aggregation_rejects_edges_beyond_rows() {
    let x = array![[1.0f32, 2.0]];
    for aggr in [Aggregation::Sum, Aggregation::GcnNorm] {
        let err = kernels::propagate(x.view(), &[(0, 1)], aggr).unwrap_err();
        assert!(err.contains("行数 1"), "{err}");
    }
    let att = Array2::<f32>::zeros((1, 2));
    assert!(kernels::gat_attention(x.view(), att.view(), att.view(), &[(1, 0)], 0.2).is_err());
}
