/*
 * @Author       : 老董
 * @Date         : 2026-01-17
 * @Description  : Optimizer 模块 - PyTorch 风格
 *
 * - Optimizer 持有 Rc<RefCell<GraphInner>> 引用，绑定特定参数
 * - zero_grad()/step() 不需要图参数
 * - minimize(&loss) 一步完成 zero_grad + backward + step
 */

mod adam;
mod sgd;

pub use adam::Adam;
pub use sgd::Sgd;

use std::cell::RefCell;
use std::rc::Rc;

use crate::nn::graph::GraphInner;
use crate::nn::{GraphError, NodeId, Var};
use crate::tensor::Tensor;

/// Optimizer trait
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = Sgd::new(&graph, &model.parameters(), 0.1).with_momentum(0.9);
///
/// optimizer.zero_grad()?;
/// loss.backward()?;
/// optimizer.step()?;
///
/// // 或者一步完成
/// let loss_val = optimizer.minimize(&loss)?;
/// ```
pub trait Optimizer {
    /// 清零绑定参数的梯度
    fn zero_grad(&mut self) -> Result<(), GraphError>;

    /// 更新参数（只更新 Optimizer 绑定的参数，没有梯度的参数跳过）
    fn step(&mut self) -> Result<(), GraphError>;

    /// 一步完成：zero_grad + forward + backward + step，返回 loss 的标量值
    fn minimize(&mut self, loss: &Var) -> Result<f32, GraphError> {
        self.zero_grad()?;
        let loss_val = loss.backward()?;
        self.step()?;
        Ok(loss_val)
    }

    fn learning_rate(&self) -> f32;

    fn set_learning_rate(&mut self, lr: f32);

    /// 重置累积状态（如动量）
    fn reset(&mut self);
}

/// 各优化器共享的参数绑定
struct ParamGroup {
    graph: Rc<RefCell<GraphInner>>,
    params: Vec<NodeId>,
}

impl ParamGroup {
    fn new(graph: &crate::nn::Graph, params: &[Var]) -> Self {
        Self {
            graph: graph.inner_rc(),
            params: params.iter().map(Var::node_id).collect(),
        }
    }

    fn zero_grad(&self) -> Result<(), GraphError> {
        let mut g = self.graph.borrow_mut();
        for &node_id in &self.params {
            g.clear_node_grad(node_id)?;
        }
        Ok(())
    }

    /// 对每个有梯度的参数调用 `update(id, 当前值, 梯度)`，并写回返回的新值
    fn update_each<F>(&self, mut update: F) -> Result<(), GraphError>
    where
        F: FnMut(NodeId, &Tensor, &Tensor) -> Tensor,
    {
        let mut g = self.graph.borrow_mut();
        for &node_id in &self.params {
            let Some(grad) = g.get_node_grad(node_id)?.cloned() else {
                continue;
            };
            let current = g.get_node_value(node_id)?.ok_or_else(|| {
                GraphError::ComputationError(format!("参数节点 {node_id:?} 没有值"))
            })?;
            let new_value = update(node_id, current, &grad);
            g.set_node_value(node_id, Some(&new_value))?;
        }
        Ok(())
    }
}
