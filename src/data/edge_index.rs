//! 边索引列表
//!
//! 与导出产物的约定一致：逻辑上是一个 `[2, edge_count]` 的整数矩阵，
//! 第 0 行是消息的发送端（source），第 1 行是接收端（target）。

use ndarray::{Array2, ArrayView2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::error::DataError;

/// 有序的 (source, target) 边列表
///
/// 构造时校验所有端点都落在 `[0, node_count)` 内，之后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeIndex {
    edges: Vec<(usize, usize)>,
    node_count: usize,
}

impl EdgeIndex {
    /// 由 (source, target) 列表创建，任一端点 `>= node_count` 时返回 [`DataError::EdgeOutOfRange`]
    pub fn new(edges: Vec<(usize, usize)>, node_count: usize) -> Result<Self, DataError> {
        if let Some((i, &(s, t))) = edges
            .iter()
            .enumerate()
            .find(|(_, (s, t))| *s >= node_count || *t >= node_count)
        {
            return Err(DataError::EdgeOutOfRange {
                edge: i,
                source_node: s as i64,
                target_node: t as i64,
                node_count,
            });
        }
        Ok(Self { edges, node_count })
    }

    /// 由 `[2, E]` 布局的两行 i64 数据创建（负数同样视为越界）
    pub fn from_rows(sources: &[i64], targets: &[i64], node_count: usize) -> Result<Self, DataError> {
        if sources.len() != targets.len() {
            return Err(DataError::ShapeMismatch {
                expected: vec![2, sources.len()],
                got: vec![2, targets.len()],
            });
        }
        let mut edges = Vec::with_capacity(sources.len());
        for (i, (&s, &t)) in sources.iter().zip(targets).enumerate() {
            let in_range = |v: i64| v >= 0 && (v as u64) < node_count as u64;
            if !in_range(s) || !in_range(t) {
                return Err(DataError::EdgeOutOfRange {
                    edge: i,
                    source_node: s,
                    target_node: t,
                    node_count,
                });
            }
            edges.push((s as usize, t as usize));
        }
        Ok(Self { edges, node_count })
    }

    /// 由 `[2, E]` 的 i64 矩阵创建
    pub fn from_matrix(matrix: ArrayView2<'_, i64>, node_count: usize) -> Result<Self, DataError> {
        if matrix.nrows() != 2 {
            return Err(DataError::ShapeMismatch {
                expected: vec![2, matrix.ncols()],
                got: matrix.shape().to_vec(),
            });
        }
        let sources = matrix.row(0).to_vec();
        let targets = matrix.row(1).to_vec();
        Self::from_rows(&sources, &targets, node_count)
    }

    /// 转成 `[2, E]` 的 i64 矩阵（即导出产物 `edges` 输入的布局）
    pub fn to_matrix(&self) -> Array2<i64> {
        let e = self.edges.len();
        Array2::from_shape_fn((2, e), |(row, col)| {
            let (s, t) = self.edges[col];
            if row == 0 { s as i64 } else { t as i64 }
        })
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// 每个节点作为接收端的次数（入度，重边重复计数）
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut deg = vec![0; self.node_count];
        for &(_, t) in &self.edges {
            deg[t] += 1;
        }
        deg
    }

    /// 为尚无自环的节点补上自环（已有自环的节点保持原样），追加在末尾
    pub fn with_remaining_self_loops(&self) -> EdgeIndex {
        let mut has_loop = vec![false; self.node_count];
        for &(s, t) in &self.edges {
            if s == t {
                has_loop[s] = true;
            }
        }
        let mut edges = self.edges.clone();
        edges.extend(
            (0..self.node_count)
                .filter(|&i| !has_loop[i])
                .map(|i| (i, i)),
        );
        EdgeIndex {
            edges,
            node_count: self.node_count,
        }
    }

    /// 节点重新编号：旧节点 `i` 变为 `perm[i]`
    pub fn permuted(&self, perm: &[usize]) -> Result<EdgeIndex, DataError> {
        check_permutation(perm, self.node_count)?;
        let edges = self
            .edges
            .iter()
            .map(|&(s, t)| (perm[s], perm[t]))
            .collect();
        Ok(EdgeIndex {
            edges,
            node_count: self.node_count,
        })
    }

    /// 以给定种子打乱边的顺序（拓扑不变）
    pub fn shuffled(&self, seed: u64) -> EdgeIndex {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut edges = self.edges.clone();
        edges.shuffle(&mut rng);
        EdgeIndex {
            edges,
            node_count: self.node_count,
        }
    }
}

/// 校验 `perm` 是 `0..n` 的一个排列
pub(crate) fn check_permutation(perm: &[usize], n: usize) -> Result<(), DataError> {
    if perm.len() != n {
        return Err(DataError::InvalidPermutation(format!(
            "长度为 {}，期望 {n}",
            perm.len()
        )));
    }
    let mut seen = vec![false; n];
    for &p in perm {
        if p >= n || seen[p] {
            return Err(DataError::InvalidPermutation(format!(
                "{p} 越界或重复出现"
            )));
        }
        seen[p] = true;
    }
    Ok(())
}
