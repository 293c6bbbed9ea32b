use std::fmt;

use rand::rngs::StdRng;

use super::raw_node::{NodeType, TraitNode};
use crate::data::EdgeIndex;
use crate::nn::GraphError;
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// 前向传播时节点可用的图级状态
pub(in crate::nn) struct ForwardContext<'a> {
    pub is_train: bool,
    /// dropout 掩码使用的随机数生成器
    pub rng: &'a mut StdRng,
}

/// 图中的一个节点：原始节点（算子）+ 值、梯度等运行期状态
pub(in crate::nn) struct NodeHandle {
    id: NodeId,
    name: String,
    raw_node: NodeType,
    value: Option<Tensor>,
    grad: Option<Tensor>,
    last_forward_pass_id: u64,
}

impl NodeHandle {
    pub(in crate::nn) fn new<T: Into<NodeType>>(id: NodeId, name: &str, raw_node: T) -> Self {
        Self {
            id,
            name: name.to_string(),
            raw_node: raw_node.into(),
            value: None,
            grad: None,
            last_forward_pass_id: 0,
        }
    }

    pub(in crate::nn) const fn id(&self) -> NodeId {
        self.id
    }

    pub(in crate::nn) fn name(&self) -> &str {
        &self.name
    }

    pub(in crate::nn) const fn node_type(&self) -> &NodeType {
        &self.raw_node
    }

    pub(in crate::nn) fn type_name(&self) -> &'static str {
        self.raw_node.type_name()
    }

    /// 值由外部设置（而非由父节点计算）的节点
    pub(in crate::nn) const fn is_leaf(&self) -> bool {
        matches!(
            self.raw_node,
            NodeType::Input(_) | NodeType::EdgeInput(_) | NodeType::Parameter(_)
        )
    }

    /// 可以接收梯度的节点（数据输入永远不需要梯度）
    pub(in crate::nn) const fn is_differentiable(&self) -> bool {
        !matches!(self.raw_node, NodeType::Input(_) | NodeType::EdgeInput(_))
    }

    pub(in crate::nn) fn has_value(&self) -> bool {
        match &self.raw_node {
            NodeType::EdgeInput(edge_input) => edge_input.edges().is_some(),
            _ => self.value.is_some(),
        }
    }

    pub(in crate::nn) fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    /// 手动设置值，只对输入和参数节点开放
    pub(in crate::nn) fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        match &self.raw_node {
            NodeType::Input(_) => {}
            NodeType::Parameter(parameter) => {
                if let Some(v) = value {
                    if v.shape() != parameter.shape() {
                        return Err(GraphError::ShapeMismatch {
                            expected: parameter.shape().to_vec(),
                            got: v.shape().to_vec(),
                            message: format!("{self}的形状在创建后不可改变"),
                        });
                    }
                }
            }
            _ => {
                return Err(GraphError::InvalidOperation(format!(
                    "{self}的值由父节点计算，不能手动设置"
                )));
            }
        }
        self.value = value.cloned();
        Ok(())
    }

    /// 边输入节点持有的边列表
    pub(in crate::nn) fn edges(&self) -> Option<&EdgeIndex> {
        match &self.raw_node {
            NodeType::EdgeInput(edge_input) => edge_input.edges(),
            _ => None,
        }
    }

    pub(in crate::nn) fn set_edges(&mut self, edges: EdgeIndex) -> Result<(), GraphError> {
        match &mut self.raw_node {
            NodeType::EdgeInput(edge_input) => {
                edge_input.set_edges(edges);
                Ok(())
            }
            _ => Err(GraphError::InvalidOperation(format!(
                "{}不是边输入节点，不能设置边",
                self.name
            ))),
        }
    }

    pub(in crate::nn) fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    pub(in crate::nn) fn set_grad(&mut self, grad: Option<&Tensor>) {
        self.grad = grad.cloned();
    }

    /// 把梯度累加到已有梯度上
    pub(in crate::nn) fn accumulate_grad(&mut self, grad: Tensor) -> Result<(), GraphError> {
        match &mut self.grad {
            Some(existing) => {
                if !existing.is_same_shape(&grad) {
                    return Err(GraphError::ShapeMismatch {
                        expected: existing.shape().to_vec(),
                        got: grad.shape().to_vec(),
                        message: format!("{}收到的梯度形状与已有梯度不同", self.name),
                    });
                }
                *existing += &grad;
            }
            None => self.grad = Some(grad),
        }
        Ok(())
    }

    pub(in crate::nn) fn clear_grad(&mut self) {
        self.grad = None;
    }

    pub(in crate::nn) const fn last_forward_pass_id(&self) -> u64 {
        self.last_forward_pass_id
    }

    pub(in crate::nn) const fn set_last_forward_pass_id(&mut self, pass_id: u64) {
        self.last_forward_pass_id = pass_id;
    }

    pub(in crate::nn) fn calc_value_by_parents(
        &mut self,
        parents: &[&NodeHandle],
        ctx: &mut ForwardContext<'_>,
    ) -> Result<(), GraphError> {
        let value = self.raw_node.calc_value_by_parents(parents, ctx)?;
        self.value = Some(value);
        Ok(())
    }

    /// 给定本节点的上游梯度，计算对第 `index` 个父节点的梯度（VJP）
    pub(in crate::nn) fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        self.raw_node
            .calc_grad_to_parent(index, parents, upstream_grad)
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}节点[{}]", self.type_name(), self.name)
    }
}
