/*
 * @Author       : 老董
 * @Date         : 2026-01-17
 * @Description  : Adam 优化器
 */

use std::collections::HashMap;

use super::{Optimizer, ParamGroup};
use crate::nn::{Graph, GraphError, NodeId, Var};
use crate::tensor::Tensor;

/// Adam: Adaptive Moment Estimation
///
/// - g = ∇θ + weight_decay · θ
/// - m = β1 * m + (1 - β1) * g
/// - v = β2 * v + (1 - β2) * g²
/// - θ = θ - α * m_hat / (√v_hat + ε)
pub struct Adam {
    group: ParamGroup,
    lr: f32,
    /// β1 (一阶矩衰减)
    beta1: f32,
    /// β2 (二阶矩衰减)
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    m: HashMap<NodeId, Tensor>,
    v: HashMap<NodeId, Tensor>,
    /// 时间步
    t: usize,
}

impl Adam {
    pub fn new(graph: &Graph, params: &[Var], lr: f32) -> Self {
        Self::with_config(graph, params, lr, 0.9, 0.999, 1e-8)
    }

    /// 创建带完整配置的 Adam 优化器
    pub fn with_config(
        graph: &Graph,
        params: &[Var],
        lr: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    ) -> Self {
        Self {
            group: ParamGroup::new(graph, params),
            lr,
            beta1,
            beta2,
            epsilon,
            weight_decay: 0.0,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        }
    }

    pub const fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }
}

impl Optimizer for Adam {
    fn zero_grad(&mut self) -> Result<(), GraphError> {
        self.group.zero_grad()
    }

    fn step(&mut self) -> Result<(), GraphError> {
        self.t += 1;
        let (beta1, beta2, epsilon, lr) = (self.beta1, self.beta2, self.epsilon, self.lr);
        let (weight_decay, t) = (self.weight_decay, self.t as i32);
        let (ms, vs) = (&mut self.m, &mut self.v);

        self.group.update_each(|node_id, current, grad| {
            let mut g = grad.clone();
            if weight_decay != 0.0 {
                g += &(current * weight_decay);
            }

            let m = ms
                .entry(node_id)
                .or_insert_with(|| Tensor::zeros(g.shape()));
            *m *= beta1;
            *m += &(&g * (1.0 - beta1));

            let v = vs
                .entry(node_id)
                .or_insert_with(|| Tensor::zeros(g.shape()));
            *v *= beta2;
            *v += &(&(&g * &g) * (1.0 - beta2));

            // 偏差修正
            let m_hat = &*m / (1.0 - beta1.powi(t));
            let v_hat = &*v / (1.0 - beta2.powi(t));

            let denom = &v_hat.sqrt() + epsilon;
            let update = &m_hat / &denom;
            current - &(&update * lr)
        })
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }
}
