/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner VJP 反向传播
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::NodeType;
use crate::tensor::Tensor;
use std::collections::HashSet;
use tracing::warn;

impl GraphInner {
    // ========== VJP 反向传播核心 ==========

    /// 反向传播：计算损失对所有参数的梯度并累加到参数节点上
    ///
    /// 参数梯度会一直累加，直到调用 `zero_grad`；中间节点的梯度每次都会重置。
    /// 返回损失的标量值。
    pub fn backward(&mut self, loss_id: NodeId) -> Result<f32, GraphError> {
        if !self.is_train_mode() {
            warn!("在 eval 模式下调用 backward，这通常是误用");
        }

        let loss_node = self.get_node(loss_id)?;
        let loss_value = loss_node.value().ok_or_else(|| {
            GraphError::ComputationError(format!("损失{loss_node}没有值，请先执行 forward"))
        })?;
        if loss_value.size() != 1 {
            return Err(GraphError::InvalidOperation(format!(
                "反向传播要求损失为标量 [1, 1]，但得到 {:?}",
                loss_value.shape()
            )));
        }
        let loss_scalar = loss_value.sum();

        self.reset_intermediate_grad();
        self.get_node_mut(loss_id)?
            .set_grad(Some(&Tensor::ones(&[1, 1])));

        let topo_order = self.topological_order(loss_id)?;
        let requires_grad = self.nodes_requiring_grad(&topo_order)?;
        // 子节点先于父节点
        for node_id in topo_order.iter().rev() {
            if requires_grad.contains(node_id) {
                self.propagate_grad_to_parents(*node_id, &requires_grad)?;
            }
        }

        self.last_backward_pass_id += 1;
        Ok(loss_scalar)
    }

    /// 至少有一个参数祖先的节点（只有它们需要梯度）
    fn nodes_requiring_grad(&self, topo_order: &[NodeId]) -> Result<HashSet<NodeId>, GraphError> {
        let mut requires_grad = HashSet::new();
        for &node_id in topo_order {
            let node = self.get_node(node_id)?;
            let needed = match node.node_type() {
                NodeType::Parameter(_) => true,
                _ if !node.is_differentiable() => false,
                _ => self
                    .get_node_parents(node_id)?
                    .iter()
                    .any(|p| requires_grad.contains(p)),
            };
            if needed {
                requires_grad.insert(node_id);
            }
        }
        Ok(requires_grad)
    }

    /// 将梯度从当前节点传播到其父节点
    fn propagate_grad_to_parents(
        &mut self,
        node_id: NodeId,
        requires_grad: &HashSet<NodeId>,
    ) -> Result<(), GraphError> {
        let parent_ids = self.get_node_parents(node_id)?;
        if parent_ids.is_empty() {
            return Ok(());
        }

        let parent_grads: Vec<(NodeId, Tensor)> = {
            let node = self.get_node(node_id)?;
            let Some(upstream_grad) = node.grad() else {
                return Ok(());
            };
            let parents = self.get_nodes(&parent_ids)?;

            let mut grads = Vec::with_capacity(parent_ids.len());
            for (index, parent_id) in parent_ids.iter().enumerate() {
                if !requires_grad.contains(parent_id) {
                    continue;
                }
                let parent_grad = node.calc_grad_to_parent(index, &parents, upstream_grad)?;
                grads.push((*parent_id, parent_grad));
            }
            grads
        };

        for (parent_id, parent_grad) in parent_grads {
            self.get_node_mut(parent_id)?.accumulate_grad(parent_grad)?;
        }
        Ok(())
    }

    /// 重置中间节点（非参数）的梯度
    fn reset_intermediate_grad(&mut self) {
        for node in self.nodes.values_mut() {
            if !matches!(node.node_type(), NodeType::Parameter(_)) {
                node.clear_grad();
            }
        }
    }

    /// 清除所有节点的梯度
    pub fn clear_grad(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_grad();
        }
    }

    /// 清除单个节点的梯度
    pub fn clear_node_grad(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        self.get_node_mut(node_id)?.clear_grad();
        Ok(())
    }

    /// 清零梯度（PyTorch 风格）
    pub fn zero_grad(&mut self) {
        self.clear_grad();
    }
}
