//! 准确率统计

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{CitationDataset, DataError, Split};
use crate::model::GnnModel;
use crate::tensor::Tensor;

use super::error::TrainError;

/// 掩码选中节点上的 top-1 准确率
///
/// 掩码为空时报 [`DataError::EmptyMask`]，不会返回 NaN。
pub fn accuracy(logits: &Tensor, labels: &[usize], mask: &[bool]) -> Result<f32, DataError> {
    if logits.dimension() != 2 || logits.rows() != labels.len() {
        return Err(DataError::ShapeMismatch {
            expected: vec![labels.len(), logits.cols()],
            got: logits.shape().to_vec(),
        });
    }
    if mask.len() != labels.len() {
        return Err(DataError::LengthMismatch {
            what: "掩码".to_string(),
            expected: labels.len(),
            got: mask.len(),
        });
    }
    let predictions = logits.argmax_rows()?;
    let (correct, total) = predictions
        .iter()
        .zip(labels)
        .zip(mask)
        .filter(|&(_, &selected)| selected)
        .fold((0usize, 0usize), |(correct, total), ((pred, label), _)| {
            (correct + usize::from(pred == label), total + 1)
        });
    if total == 0 {
        return Err(DataError::EmptyMask("评估".to_string()));
    }
    Ok(correct as f32 / total as f32)
}

/// 三个划分上的准确率
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitAccuracy {
    pub train: f32,
    pub val: f32,
    pub test: f32,
}

impl SplitAccuracy {
    pub const fn get(&self, split: Split) -> f32 {
        match split {
            Split::Train => self.train,
            Split::Val => self.val,
            Split::Test => self.test,
        }
    }
}

impl fmt::Display for SplitAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "train {:.4} | val {:.4} | test {:.4}",
            self.train, self.val, self.test
        )
    }
}

/// 评估模式下在整张图上推理，分别统计三个划分的准确率
pub fn evaluate(model: &GnnModel, dataset: &CitationDataset) -> Result<SplitAccuracy, TrainError> {
    let logits = model.forward(dataset.features(), Some(dataset.edges()))?;
    let masks = dataset.masks();
    let acc = |split| accuracy(&logits, dataset.labels(), masks.mask(split));
    Ok(SplitAccuracy {
        train: acc(Split::Train)?,
        val: acc(Split::Val)?,
        test: acc(Split::Test)?,
    })
}
