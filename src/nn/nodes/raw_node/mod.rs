mod edge_input;
mod input;
mod loss;
mod ops;
mod parameter;

pub(in crate::nn) use edge_input::EdgeInput;
pub(in crate::nn) use input::Input;
pub(in crate::nn) use loss::*;
pub use ops::Aggregation;
pub(in crate::nn) use ops::*;
pub(in crate::nn) use parameter::Parameter;

use enum_dispatch::enum_dispatch;

use super::{ForwardContext, NodeHandle};
use crate::nn::GraphError;
use crate::tensor::Tensor;

#[enum_dispatch]
pub(in crate::nn) enum NodeType {
    Input(Input),
    EdgeInput(EdgeInput),
    Parameter(Parameter),
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓算子↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    MatMul(MatMul),
    Add(Add),
    ReLU(ReLU),
    Dropout(Dropout),
    Propagate(Propagate),
    GatAttention(GatAttention),
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑算子↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
    SoftmaxCrossEntropy(SoftmaxCrossEntropy),
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    /// 节点类型名，用于自动命名和报错
    fn type_name(&self) -> &'static str;

    // 根据父节点的值计算本节点的值（调用前所有父节点都已完成前向传播）
    fn calc_value_by_parents(
        &mut self,
        _parents: &[&NodeHandle],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}节点的值应通过 set_value 设置，而非由父节点计算",
            self.type_name()
        )))
    }

    /// VJP：由本节点的上游梯度计算对第 `index` 个父节点的梯度，结果与该父节点的值同形
    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&NodeHandle],
        _upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}节点没有父节点，不需要向上传播梯度",
            self.type_name()
        )))
    }
}

/// 取父节点的值，父节点尚未前向传播时报错
pub(in crate::nn::nodes) fn value_of<'a>(parent: &'a NodeHandle) -> Result<&'a Tensor, GraphError> {
    parent
        .value()
        .ok_or_else(|| GraphError::ComputationError(format!("{parent}没有值")))
}
