use crate::data::{CitationDataset, DataError, Split, SyntheticSpec};

#[test]
fn test_cora_like_shapes() {
    let dataset = CitationDataset::synthetic(&SyntheticSpec::cora_like(), 42).unwrap();
    assert_eq!(dataset.features().shape(), &[2708, 1433]);
    assert_eq!(dataset.num_edges(), 10556);
    assert_eq!(dataset.num_classes(), 7);
    assert_eq!(dataset.edges().to_matrix().shape(), &[2, 10556]);

    // 训练/验证掩码覆盖同一批 2708 个节点，且都非空
    let masks = dataset.masks();
    assert_eq!(masks.node_count(), 2708);
    assert_eq!(masks.count(Split::Train), 140);
    assert_eq!(masks.count(Split::Val), 500);
    assert_eq!(masks.count(Split::Test), 1000);
}

#[test]
fn test_synthetic_is_seeded() {
    let spec = SyntheticSpec::tiny();
    let a = CitationDataset::synthetic(&spec, 3).unwrap();
    let b = CitationDataset::synthetic(&spec, 3).unwrap();
    let c = CitationDataset::synthetic(&spec, 4).unwrap();
    assert_eq!(a.features(), b.features());
    assert_eq!(a.edges(), b.edges());
    assert_eq!(a.labels(), b.labels());
    assert_ne!(a.edges(), c.edges());
}

#[test]
fn test_synthetic_graph_is_simple_and_undirected() {
    let dataset = CitationDataset::synthetic(&SyntheticSpec::tiny(), 9).unwrap();
    let edges = dataset.edges().edges();
    assert!(edges.iter().all(|(s, t)| s != t));
    for &(s, t) in edges {
        assert!(edges.contains(&(t, s)));
    }
    let mut sorted = edges.to_vec();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), edges.len());
}

#[test]
fn test_synthetic_rejects_bad_spec() {
    let mut spec = SyntheticSpec::tiny();
    spec.num_edges = 241;
    assert!(matches!(
        CitationDataset::synthetic(&spec, 0),
        Err(DataError::FormatError(_))
    ));
}

#[test]
fn test_permuted_dataset_is_consistent() {
    let dataset = CitationDataset::synthetic(&SyntheticSpec::tiny(), 5).unwrap();
    let n = dataset.num_nodes();
    let perm: Vec<usize> = (0..n).map(|i| (i * 7 + 3) % n).collect();
    let permuted = dataset.permuted(&perm).unwrap();

    for old in 0..n {
        let new = perm[old];
        assert_eq!(permuted.labels()[new], dataset.labels()[old]);
        assert_eq!(
            permuted.features().row(new).unwrap(),
            dataset.features().row(old).unwrap()
        );
        assert_eq!(
            permuted.masks().mask(Split::Train)[new],
            dataset.masks().mask(Split::Train)[old]
        );
    }
    assert_eq!(permuted.edges().edges()[0].0, perm[dataset.edges().edges()[0].0]);
}
