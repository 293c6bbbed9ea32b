mod add;
mod dropout;
mod gat_attention;
mod mat_mul;
mod propagate;
mod relu;

pub(in crate::nn) use add::Add;
pub(in crate::nn) use dropout::Dropout;
pub(in crate::nn) use gat_attention::GatAttention;
pub(in crate::nn) use mat_mul::MatMul;
pub use propagate::Aggregation;
pub(in crate::nn) use propagate::Propagate;
pub(in crate::nn) use relu::ReLU;

use crate::nn::GraphError;

/// 越界的父节点下标（节点构造保证不会发生，出现即为内部错误）
fn bad_parent_index(node: &str, index: usize) -> GraphError {
    GraphError::ComputationError(format!("{node}节点没有第 {index} 个可求导的父节点"))
}
