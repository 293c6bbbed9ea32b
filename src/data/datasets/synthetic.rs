//! 带种子的合成引文图
//!
//! 生成方式（近似 Cora 的统计特征）：
//! - 标签：各类节点数尽量均衡，随机打散
//! - 特征：稀疏 0/1 词袋，每个类别有一组“主题词”，节点的词大多取自本类主题词
//! - 边：无向、无自环、无重边；以 `homophily` 的概率连向同类节点，每对节点生成正反两条边

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SplitSpec;
use crate::data::dataset::CitationDataset;
use crate::data::edge_index::EdgeIndex;
use crate::data::error::DataError;
use crate::data::split::SplitMasks;
use crate::tensor::Tensor;

/// 合成数据集的规模与统计参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSpec {
    pub num_nodes: usize,
    pub num_features: usize,
    /// 有向边总数，必须为偶数（每对节点正反各一条）
    pub num_edges: usize,
    pub num_classes: usize,
    /// 边连向同类节点的概率
    pub homophily: f32,
    /// 每个节点激活的词数
    pub words_per_node: usize,
    /// 节点的词取自本类主题词的概率
    pub topic_purity: f32,
    pub split: SplitSpec,
}

impl SyntheticSpec {
    /// 与 Cora 同形：2708 个节点，1433 维特征，10556 条边，7 个类别
    pub fn cora_like() -> Self {
        Self {
            num_nodes: 2708,
            num_features: 1433,
            num_edges: 10556,
            num_classes: 7,
            homophily: 0.8,
            words_per_node: 18,
            topic_purity: 0.6,
            split: SplitSpec::default(),
        }
    }

    /// 小规模图，适合单元测试
    pub fn tiny() -> Self {
        Self {
            num_nodes: 60,
            num_features: 24,
            num_edges: 240,
            num_classes: 3,
            homophily: 0.85,
            words_per_node: 5,
            topic_purity: 0.8,
            split: SplitSpec {
                train_per_class: 5,
                num_val: 15,
                num_test: 20,
            },
        }
    }
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self::cora_like()
    }
}

pub(crate) fn generate(spec: &SyntheticSpec, seed: u64) -> Result<CitationDataset, DataError> {
    validate(spec)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let n = spec.num_nodes;

    // 1. 标签
    let mut labels: Vec<usize> = (0..n).map(|i| i % spec.num_classes).collect();
    labels.shuffle(&mut rng);
    let mut members = vec![Vec::new(); spec.num_classes];
    for (i, &c) in labels.iter().enumerate() {
        members[c].push(i);
    }

    // 2. 特征：词表按类别切成若干段作为主题词
    let topic_width = (spec.num_features / spec.num_classes).max(1);
    let mut features = vec![0.0f32; n * spec.num_features];
    for (i, &c) in labels.iter().enumerate() {
        let topic_start = (c * topic_width).min(spec.num_features - 1);
        let topic_end = (topic_start + topic_width).min(spec.num_features);
        for _ in 0..spec.words_per_node {
            let word = if rng.r#gen::<f32>() < spec.topic_purity {
                rng.gen_range(topic_start..topic_end)
            } else {
                rng.gen_range(0..spec.num_features)
            };
            features[i * spec.num_features + word] = 1.0;
        }
    }

    // 3. 边
    let target_pairs = spec.num_edges / 2;
    let mut pairs = HashSet::with_capacity(target_pairs);
    let mut ordered = Vec::with_capacity(target_pairs);
    let max_attempts = target_pairs.saturating_mul(50).max(1000);
    let mut attempts = 0;
    while ordered.len() < target_pairs {
        attempts += 1;
        if attempts > max_attempts {
            return Err(DataError::SplitError(format!(
                "尝试 {max_attempts} 次后只生成了 {} 对边，目标 {target_pairs} 对",
                ordered.len()
            )));
        }
        let a = rng.gen_range(0..n);
        let b = if rng.r#gen::<f32>() < spec.homophily {
            let same = &members[labels[a]];
            same[rng.gen_range(0..same.len())]
        } else {
            rng.gen_range(0..n)
        };
        if a == b {
            continue;
        }
        let key = (a.min(b), a.max(b));
        if pairs.insert(key) {
            ordered.push(key);
        }
    }
    let edges: Vec<(usize, usize)> = ordered
        .into_iter()
        .flat_map(|(a, b)| [(a, b), (b, a)])
        .collect();
    debug!("合成图生成完成，共尝试 {attempts} 次");

    let features = Tensor::from_vec(features, &[n, spec.num_features])?;
    let edges = EdgeIndex::new(edges, n)?;
    let masks = SplitMasks::random_per_class(&labels, spec.num_classes, &spec.split, seed)?;
    CitationDataset::new(
        "synthetic",
        features,
        edges,
        labels,
        spec.num_classes,
        masks,
    )
}

fn validate(spec: &SyntheticSpec) -> Result<(), DataError> {
    if spec.num_nodes < 2 || spec.num_features == 0 || spec.num_classes == 0 {
        return Err(DataError::FormatError(format!(
            "合成图规模不合法：{} 个节点，{} 维特征，{} 个类别",
            spec.num_nodes, spec.num_features, spec.num_classes
        )));
    }
    if spec.num_classes > spec.num_nodes {
        return Err(DataError::FormatError(format!(
            "类别数 {} 超过节点数 {}",
            spec.num_classes, spec.num_nodes
        )));
    }
    if spec.num_edges % 2 != 0 {
        return Err(DataError::FormatError(format!(
            "边数 {} 必须为偶数（无向图正反各一条）",
            spec.num_edges
        )));
    }
    let max_pairs = spec.num_nodes * (spec.num_nodes - 1) / 2;
    if spec.num_edges / 2 > max_pairs {
        return Err(DataError::FormatError(format!(
            "边数 {} 超过 {} 个节点的简单无向图上限 {}",
            spec.num_edges,
            spec.num_nodes,
            max_pairs * 2
        )));
    }
    Ok(())
}
