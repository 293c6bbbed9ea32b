use super::bad_parent_index;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, value_of};
use crate::nn::nodes::{ForwardContext, NodeHandle};
use crate::tensor::Tensor;

/// 矩阵乘法 `C = A @ B`
#[derive(Debug, Clone, Default)]
pub(in crate::nn) struct MatMul;

impl MatMul {
    pub(in crate::nn) const fn new() -> Self {
        Self
    }
}

impl TraitNode for MatMul {
    fn type_name(&self) -> &'static str {
        "MatMul"
    }

    fn calc_value_by_parents(
        &mut self,
        parents: &[&NodeHandle],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let a = value_of(parents[0])?;
        let b = value_of(parents[1])?;
        if a.cols() != b.rows() {
            return Err(GraphError::ShapeMismatch {
                expected: vec![a.cols(), b.cols()],
                got: b.shape().to_vec(),
                message: format!(
                    "MatMul 的左操作数{}有 {} 列，右操作数{}却有 {} 行",
                    parents[0],
                    a.cols(),
                    parents[1],
                    b.rows()
                ),
            });
        }
        Ok(a.mat_mul(b)?)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // dA = G @ B^T，dB = A^T @ G
        match index {
            0 => Ok(upstream_grad.mat_mul(&value_of(parents[1])?.transpose()?)?),
            1 => Ok(value_of(parents[0])?.transpose()?.mat_mul(upstream_grad)?),
            _ => Err(bad_parent_index(self.type_name(), index)),
        }
    }
}
