use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::VerifyError;
use crate::data::EdgeIndex;
use crate::model::{EDGES_INPUT, GnnModel, LOGITS_OUTPUT, NODES_INPUT};
use crate::runtime::{Environment, Session, Value};
use crate::tensor::Tensor;

/// 判定等价的阈值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// logits 逐元素最大绝对差
    pub max_abs_logit: f32,
    /// softmax 概率逐元素最大绝对差
    pub max_abs_prob: f32,
    /// top-1 预测一致的节点比例下限
    pub min_top1_agreement: f32,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            max_abs_logit: 1e-3,
            max_abs_prob: 1e-4,
            min_top1_agreement: 0.95,
        }
    }
}

/// 一次等价检查的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceReport {
    pub node_count: usize,
    pub class_count: usize,
    pub max_abs_logit: f32,
    pub max_abs_prob: f32,
    pub top1_agreement: f32,
    pub tolerance: Tolerance,
    pub passed: bool,
}

impl EquivalenceReport {
    /// 未通过时转成 [`VerifyError::Drift`]
    pub fn ensure(self) -> Result<Self, VerifyError> {
        if self.passed {
            Ok(self)
        } else {
            Err(VerifyError::Drift {
                max_abs_logit: self.max_abs_logit,
                max_abs_prob: self.max_abs_prob,
                top1_agreement: self.top1_agreement,
            })
        }
    }
}

impl fmt::Display for EquivalenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}：{} 个节点 × {} 类，logits 最大差 {:.3e}（阈值 {:.0e}），概率最大差 {:.3e}（阈值 {:.0e}），top-1 一致率 {:.2}%",
            if self.passed { "通过" } else { "未通过" },
            self.node_count,
            self.class_count,
            self.max_abs_logit,
            self.tolerance.max_abs_logit,
            self.max_abs_prob,
            self.tolerance.max_abs_prob,
            self.top1_agreement * 100.0
        )
    }
}

/// 在同一组输入上运行原模型（评估模式）与导出产物，比较两者的输出
///
/// 形状不一致直接报错；超出阈值时返回 `passed == false` 的报告并记一条 warn 日志。
pub fn check_equivalence(
    model: &GnnModel,
    session: &Session,
    features: &Tensor,
    edges: &EdgeIndex,
    tolerance: &Tolerance,
) -> Result<EquivalenceReport, VerifyError> {
    let mut inputs = HashMap::new();
    for info in session.input_info() {
        let value = match info.name.as_str() {
            NODES_INPUT => Value::from_tensor(features)?,
            EDGES_INPUT => Value::from_edges(edges),
            _ => continue,
        };
        if value.shape() != info.shape.as_slice() {
            return Err(VerifyError::ShapeMismatch {
                what: format!("输入 {}", info.name),
                expected: info.shape.clone(),
                got: value.shape().to_vec(),
            });
        }
        inputs.insert(info.name.as_str(), value);
    }

    let expected = model.forward(features, Some(edges))?;
    let mut outputs = session.run(inputs)?;
    let got = Tensor::from_array2(outputs.take_f32(LOGITS_OUTPUT)?);
    if !expected.is_same_shape(&got) {
        return Err(VerifyError::ShapeMismatch {
            what: LOGITS_OUTPUT.to_string(),
            expected: expected.shape().to_vec(),
            got: got.shape().to_vec(),
        });
    }
    if expected.rows() == 0 {
        return Err(VerifyError::EmptyOutput);
    }

    let max_abs_logit = expected.max_abs_diff(&got)?;
    let max_abs_prob = expected.softmax_rows()?.max_abs_diff(&got.softmax_rows()?)?;
    let agree = expected
        .argmax_rows()?
        .iter()
        .zip(got.argmax_rows()?)
        .filter(|(a, b)| **a == *b)
        .count();
    let top1_agreement = agree as f32 / expected.rows() as f32;

    // 任一侧出现 NaN/inf 都算漂移
    let finite = !expected.has_non_finite() && !got.has_non_finite();
    let passed = finite
        && max_abs_logit <= tolerance.max_abs_logit
        && max_abs_prob <= tolerance.max_abs_prob
        && top1_agreement >= tolerance.min_top1_agreement;
    let report = EquivalenceReport {
        node_count: expected.rows(),
        class_count: expected.cols(),
        max_abs_logit,
        max_abs_prob,
        top1_agreement,
        tolerance: *tolerance,
        passed,
    };
    if passed {
        info!(model = model.name(), max_abs_logit, top1_agreement, "导出产物与原模型一致");
    } else {
        warn!(
            model = model.name(),
            max_abs_logit,
            max_abs_prob,
            top1_agreement,
            finite,
            "导出产物与原模型的输出超出容差"
        );
    }
    Ok(report)
}

/// 从文件加载导出产物后做 [`check_equivalence`]
pub fn verify_artifact<P: AsRef<Path>>(
    model: &GnnModel,
    path: P,
    features: &Tensor,
    edges: &EdgeIndex,
    tolerance: &Tolerance,
) -> Result<EquivalenceReport, VerifyError> {
    let env = Environment::new("verify");
    let session = env.create_session(path)?;
    check_equivalence(model, &session, features, edges, tolerance)
}
