use crate::data::{DataError, EdgeIndex};

#[test]
fn test_edge_index_rejects_index_equal_to_node_count() {
    let err = EdgeIndex::new(vec![(0, 1), (1, 3)], 3).unwrap_err();
    match err {
        DataError::EdgeOutOfRange {
            edge,
            source_node,
            target_node,
            node_count,
        } => {
            assert_eq!(edge, 1);
            assert_eq!((source_node, target_node), (1, 3));
            assert_eq!(node_count, 3);
        }
        other => panic!("意外的错误类型: {other:?}"),
    }
}

#[test]
fn test_edge_index_from_rows_rejects_negative() {
    assert!(matches!(
        EdgeIndex::from_rows(&[0, -1], &[1, 0], 2),
        Err(DataError::EdgeOutOfRange { edge: 1, .. })
    ));
    assert!(matches!(
        EdgeIndex::from_rows(&[0, 1], &[1], 2),
        Err(DataError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_edge_index_matrix_layout() {
    let edges = EdgeIndex::new(vec![(0, 1), (2, 0), (1, 2)], 3).unwrap();
    let m = edges.to_matrix();
    assert_eq!(m.shape(), &[2, 3]);
    assert_eq!(m.row(0).to_vec(), vec![0, 2, 1]);
    assert_eq!(m.row(1).to_vec(), vec![1, 0, 2]);

    let back = EdgeIndex::from_matrix(m.view(), 3).unwrap();
    assert_eq!(back, edges);
}

#[test]
fn test_remaining_self_loops_and_degrees() {
    let edges = EdgeIndex::new(vec![(0, 1), (1, 1), (2, 1)], 3).unwrap();
    let looped = edges.with_remaining_self_loops();
    // 节点 1 已有自环，只补 0 和 2
    assert_eq!(looped.edges()[3..], [(0, 0), (2, 2)]);
    assert_eq!(looped.in_degrees(), vec![1, 3, 1]);
}

#[test]
fn test_permuted_edges() {
    let edges = EdgeIndex::new(vec![(0, 1), (1, 2)], 3).unwrap();
    let p = edges.permuted(&[2, 0, 1]).unwrap();
    assert_eq!(p.edges(), &[(2, 0), (0, 1)]);
    assert!(matches!(
        edges.permuted(&[0, 0, 1]),
        Err(DataError::InvalidPermutation(_))
    ));
}

#[test]
fn test_shuffled_keeps_multiset() {
    let edges = EdgeIndex::new((0..20).map(|i| (i, (i + 1) % 20)).collect(), 20).unwrap();
    let shuffled = edges.shuffled(7);
    assert_ne!(shuffled.edges(), edges.edges());
    let mut a = shuffled.edges().to_vec();
    let mut b = edges.edges().to_vec();
    a.sort();
    b.sort();
    assert_eq!(a, b);
}
