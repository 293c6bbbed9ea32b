use rand::Rng;

use super::bad_parent_index;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, value_of};
use crate::nn::nodes::{ForwardContext, NodeHandle};
use crate::tensor::Tensor;

/// Inverted dropout：训练时以概率 `p` 置零并把保留的元素放大 `1 / (1 - p)`，评估时为恒等映射
#[derive(Debug, Clone)]
pub(in crate::nn) struct Dropout {
    p: f32,
    /// 最近一次训练模式前向传播所用的缩放掩码；评估模式下为 None
    mask: Option<Tensor>,
}

impl Dropout {
    pub(in crate::nn) fn new(p: f32) -> Result<Self, GraphError> {
        if !(0.0..1.0).contains(&p) {
            return Err(GraphError::InvalidOperation(format!(
                "dropout 概率必须在 [0, 1) 内，但收到 {p}"
            )));
        }
        Ok(Self { p, mask: None })
    }
}

impl TraitNode for Dropout {
    fn type_name(&self) -> &'static str {
        "Dropout"
    }

    fn calc_value_by_parents(
        &mut self,
        parents: &[&NodeHandle],
        ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let x = value_of(parents[0])?;
        if !ctx.is_train || self.p == 0.0 {
            self.mask = None;
            return Ok(x.clone());
        }
        let scale = 1.0 / (1.0 - self.p);
        let keep = (0..x.size())
            .map(|_| if ctx.rng.r#gen::<f32>() < self.p { 0.0 } else { scale })
            .collect();
        let mask = Tensor::from_vec(keep, x.shape())?;
        let value = x * &mask;
        self.mask = Some(mask);
        Ok(value)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        _parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if index != 0 {
            return Err(bad_parent_index(self.type_name(), index));
        }
        Ok(match &self.mask {
            Some(mask) => upstream_grad * mask,
            None => upstream_grad.clone(),
        })
    }
}
