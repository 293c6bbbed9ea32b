use thiserror::Error;

use crate::errors::TensorError;
use crate::nn::GraphError;
use crate::runtime::RuntimeError;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("{what} 形状不一致：原模型 {expected:?}，导出产物 {got:?}")]
    ShapeMismatch {
        what: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error(
        "导出产物与原模型不一致：logits 最大差 {max_abs_logit:.3e}，概率最大差 {max_abs_prob:.3e}，top-1 一致率 {top1_agreement:.4}"
    )]
    Drift {
        max_abs_logit: f32,
        max_abs_prob: f32,
        top1_agreement: f32,
    },
    #[error("没有可比较的节点")]
    EmptyOutput,
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Tensor(#[from] TensorError),
}
