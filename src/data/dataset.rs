//! 引文图节点分类数据集

use std::path::Path;

use super::datasets::{SplitSpec, SyntheticSpec, cora, synthetic};
use super::edge_index::{EdgeIndex, check_permutation};
use super::error::DataError;
use super::split::SplitMasks;
use crate::tensor::Tensor;

/// 节点分类数据集：一次加载，之后只读
///
/// - `features`: `[node_count, feature_dim]`
/// - `edges`: 消息传递用的边列表
/// - `labels`: 每个节点一个类别，`< num_classes`
/// - `masks`: train/val/test 掩码
#[derive(Debug, Clone)]
pub struct CitationDataset {
    name: String,
    features: Tensor,
    edges: EdgeIndex,
    labels: Vec<usize>,
    num_classes: usize,
    masks: SplitMasks,
}

impl CitationDataset {
    /// 组装数据集并校验各部分的节点数一致、标签不越界
    pub fn new(
        name: &str,
        features: Tensor,
        edges: EdgeIndex,
        labels: Vec<usize>,
        num_classes: usize,
        masks: SplitMasks,
    ) -> Result<Self, DataError> {
        let n = features.rows();
        if features.dimension() != 2 {
            return Err(DataError::ShapeMismatch {
                expected: vec![labels.len(), 0],
                got: features.shape().to_vec(),
            });
        }
        for (what, len) in [
            ("edges", edges.node_count()),
            ("labels", labels.len()),
            ("masks", masks.node_count()),
        ] {
            if len != n {
                return Err(DataError::FormatError(format!(
                    "{what} 覆盖 {len} 个节点，而特征矩阵有 {n} 行"
                )));
            }
        }
        if let Some(&bad) = labels.iter().find(|&&c| c >= num_classes) {
            return Err(DataError::IndexOutOfBounds {
                index: bad,
                len: num_classes,
            });
        }
        Ok(Self {
            name: name.to_string(),
            features,
            edges,
            labels,
            num_classes,
            masks,
        })
    }

    /// 加载 LINQS 格式的 Cora（`cora.content` + `cora.cites`），按 Planetoid 标准规模划分，
    /// `seed` 用于划分掩码
    pub fn load_cora<P: AsRef<Path>>(root: P, seed: u64) -> Result<Self, DataError> {
        cora::load(root.as_ref(), &SplitSpec::default(), seed)
    }

    /// 同 [`CitationDataset::load_cora`]，但使用自定义的划分规模
    pub fn load_cora_with_split<P: AsRef<Path>>(
        root: P,
        split: &SplitSpec,
        seed: u64,
    ) -> Result<Self, DataError> {
        cora::load(root.as_ref(), split, seed)
    }

    /// 生成带种子的合成引文图
    pub fn synthetic(spec: &SyntheticSpec, seed: u64) -> Result<Self, DataError> {
        synthetic::generate(spec, seed)
    }

    /// 一致地重新编号所有节点：旧节点 `i` 变为 `perm[i]`（特征、标签、掩码与边同时变换）
    pub fn permuted(&self, perm: &[usize]) -> Result<Self, DataError> {
        let n = self.num_nodes();
        check_permutation(perm, n)?;
        let mut inverse = vec![0; n];
        for (old, &new) in perm.iter().enumerate() {
            inverse[new] = old;
        }
        let features = self.features.select_rows(&inverse)?;
        let labels = inverse.iter().map(|&old| self.labels[old]).collect();
        Ok(Self {
            name: self.name.clone(),
            features,
            edges: self.edges.permuted(perm)?,
            labels,
            num_classes: self.num_classes,
            masks: self.masks.permuted(perm)?,
        })
    }

    /// 替换特征矩阵（如做归一化），形状必须不变
    pub fn with_features(mut self, features: Tensor) -> Result<Self, DataError> {
        if !features.is_same_shape(&self.features) {
            return Err(DataError::ShapeMismatch {
                expected: self.features.shape().to_vec(),
                got: features.shape().to_vec(),
            });
        }
        self.features = features;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &Tensor {
        &self.features
    }

    pub fn edges(&self) -> &EdgeIndex {
        &self.edges
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn masks(&self) -> &SplitMasks {
        &self.masks
    }

    pub fn num_nodes(&self) -> usize {
        self.features.rows()
    }

    pub fn num_features(&self) -> usize {
        self.features.cols()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}
