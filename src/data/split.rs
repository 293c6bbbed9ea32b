//! train/val/test 掩码

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::datasets::SplitSpec;
use super::edge_index::check_permutation;
use super::error::DataError;

/// 数据集划分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        };
        write!(f, "{name}")
    }
}

/// 三个覆盖同一批节点的布尔掩码
///
/// [`SplitMasks::new`] 会校验三者互不相交；
/// 需要容忍重叠时使用 [`SplitMasks::new_unchecked`]，此时不相交由调用方负责。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitMasks {
    train: Vec<bool>,
    val: Vec<bool>,
    test: Vec<bool>,
}

impl SplitMasks {
    pub fn new(train: Vec<bool>, val: Vec<bool>, test: Vec<bool>) -> Result<Self, DataError> {
        let masks = Self::new_unchecked(train, val, test)?;
        masks.check_disjoint()?;
        Ok(masks)
    }

    /// 只校验长度一致，不校验互斥
    pub fn new_unchecked(
        train: Vec<bool>,
        val: Vec<bool>,
        test: Vec<bool>,
    ) -> Result<Self, DataError> {
        let n = train.len();
        for other in [&val, &test] {
            if other.len() != n {
                return Err(DataError::ShapeMismatch {
                    expected: vec![n],
                    got: vec![other.len()],
                });
            }
        }
        Ok(Self { train, val, test })
    }

    /// 按 PyG `RandomNodeSplit` 的方式划分：每类取 `train_per_class` 个训练节点，
    /// 剩余节点中再依次取 `num_val` 个验证节点和 `num_test` 个测试节点
    pub fn random_per_class(
        labels: &[usize],
        num_classes: usize,
        spec: &SplitSpec,
        seed: u64,
    ) -> Result<Self, DataError> {
        let n = labels.len();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut rng);

        let mut train = vec![false; n];
        let mut taken = vec![0usize; num_classes];
        for &i in &order {
            let c = labels[i];
            if c >= num_classes {
                return Err(DataError::IndexOutOfBounds {
                    index: c,
                    len: num_classes,
                });
            }
            if taken[c] < spec.train_per_class {
                taken[c] += 1;
                train[i] = true;
            }
        }
        if let Some(c) = taken.iter().position(|&t| t < spec.train_per_class) {
            return Err(DataError::SplitError(format!(
                "类别 {c} 只有 {} 个节点，不足每类 {} 个训练节点",
                taken[c], spec.train_per_class
            )));
        }

        let rest: Vec<usize> = order.into_iter().filter(|&i| !train[i]).collect();
        if rest.len() < spec.num_val + spec.num_test {
            return Err(DataError::SplitError(format!(
                "剩余 {} 个节点，不足 {} 个验证 + {} 个测试节点",
                rest.len(),
                spec.num_val,
                spec.num_test
            )));
        }
        let mut val = vec![false; n];
        let mut test = vec![false; n];
        for &i in &rest[..spec.num_val] {
            val[i] = true;
        }
        for &i in &rest[spec.num_val..spec.num_val + spec.num_test] {
            test[i] = true;
        }
        Self::new(train, val, test)
    }

    fn check_disjoint(&self) -> Result<(), DataError> {
        let pairs = [
            (Split::Train, Split::Val),
            (Split::Train, Split::Test),
            (Split::Val, Split::Test),
        ];
        for (a, b) in pairs {
            if let Some(node) = self
                .mask(a)
                .iter()
                .zip(self.mask(b))
                .position(|(&x, &y)| x && y)
            {
                return Err(DataError::OverlappingMasks {
                    node,
                    first: a.to_string(),
                    second: b.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn mask(&self, split: Split) -> &[bool] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    /// 掩码选中的节点数
    pub fn count(&self, split: Split) -> usize {
        self.mask(split).iter().filter(|&&m| m).count()
    }

    /// 掩码选中的节点索引（升序）
    pub fn indices(&self, split: Split) -> Vec<usize> {
        self.mask(split)
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.train.len()
    }

    /// 节点重新编号：旧节点 `i` 变为 `perm[i]`
    pub fn permuted(&self, perm: &[usize]) -> Result<SplitMasks, DataError> {
        check_permutation(perm, self.node_count())?;
        let apply = |mask: &[bool]| {
            let mut out = vec![false; mask.len()];
            for (i, &m) in mask.iter().enumerate() {
                out[perm[i]] = m;
            }
            out
        };
        Ok(SplitMasks {
            train: apply(&self.train),
            val: apply(&self.val),
            test: apply(&self.test),
        })
    }
}
