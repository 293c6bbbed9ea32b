use super::bad_parent_index;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, value_of};
use crate::nn::nodes::{ForwardContext, NodeHandle};
use crate::tensor::Tensor;

/// 逐元素加法；右操作数可以是 `[1, m]` 的行向量，按行广播（偏置加法）
#[derive(Debug, Clone, Default)]
pub(in crate::nn) struct Add;

impl Add {
    pub(in crate::nn) const fn new() -> Self {
        Self
    }
}

impl TraitNode for Add {
    fn type_name(&self) -> &'static str {
        "Add"
    }

    fn calc_value_by_parents(
        &mut self,
        parents: &[&NodeHandle],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let a = value_of(parents[0])?;
        let b = value_of(parents[1])?;
        let row_broadcast = b.rows() == 1 && a.dimension() == 2 && b.cols() == a.cols();
        if !a.is_same_shape(b) && !row_broadcast {
            return Err(GraphError::ShapeMismatch {
                expected: a.shape().to_vec(),
                got: b.shape().to_vec(),
                message: format!("Add 的右操作数{}既不与左操作数同形，也不是可广播的行向量", parents[1]),
            });
        }
        Ok(a + b)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        match index {
            0 => Ok(upstream_grad.clone()),
            1 => {
                let b = value_of(parents[1])?;
                if b.is_same_shape(upstream_grad) {
                    Ok(upstream_grad.clone())
                } else {
                    // 广播过的行向量：各行梯度求和
                    Ok(upstream_grad.sum_rows()?)
                }
            }
            _ => Err(bad_parent_index(self.type_name(), index)),
        }
    }
}
