/*
 * @Author       : 老董
 * @Date         : 2026-01-17
 * @Description  : SGD 优化器（支持动量与权重衰减）
 */

use std::collections::HashMap;

use super::{Optimizer, ParamGroup};
use crate::nn::{Graph, GraphError, NodeId, Var};
use crate::tensor::Tensor;

/// 随机梯度下降
///
/// ```text
/// g = ∇θ + weight_decay · θ
/// b = momentum · b + g        （首步 b = g）
/// θ = θ - lr · b
/// ```
pub struct Sgd {
    group: ParamGroup,
    lr: f32,
    momentum: f32,
    weight_decay: f32,
    /// 动量缓冲
    velocity: HashMap<NodeId, Tensor>,
}

impl Sgd {
    pub fn new(graph: &Graph, params: &[Var], lr: f32) -> Self {
        Self {
            group: ParamGroup::new(graph, params),
            lr,
            momentum: 0.0,
            weight_decay: 0.0,
            velocity: HashMap::new(),
        }
    }

    pub const fn with_momentum(mut self, momentum: f32) -> Self {
        self.momentum = momentum;
        self
    }

    /// L2 权重衰减系数
    pub const fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }
}

impl Optimizer for Sgd {
    fn zero_grad(&mut self) -> Result<(), GraphError> {
        self.group.zero_grad()
    }

    fn step(&mut self) -> Result<(), GraphError> {
        let (lr, momentum, weight_decay) = (self.lr, self.momentum, self.weight_decay);
        let velocity = &mut self.velocity;
        self.group.update_each(|node_id, current, grad| {
            let mut g = grad.clone();
            if weight_decay != 0.0 {
                g += &(current * weight_decay);
            }
            if momentum != 0.0 {
                let buf = velocity
                    .entry(node_id)
                    .and_modify(|b| {
                        *b *= momentum;
                        *b += &g;
                    })
                    .or_insert_with(|| g.clone());
                g = buf.clone();
            }
            current - &(&g * lr)
        })
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.velocity.clear();
    }
}
