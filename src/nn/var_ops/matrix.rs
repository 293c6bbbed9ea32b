/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 稠密变换扩展 trait：逐节点地把特征行映射到新的特征空间
 */

use crate::nn::{GraphError, Var};

/// 稠密变换扩展 trait
///
/// 节点特征矩阵 `[num_nodes, in]` 的每一行共享同一组权重 `[in, out]`。
pub trait VarMatrixOps {
    /// `self @ other`，`[m, k] @ [k, n] -> [m, n]`
    fn matmul(&self, other: &Var) -> Result<Var, GraphError>;

    /// `self @ weight (+ bias)`，偏置 `[1, out]` 按行广播
    fn affine(&self, weight: &Var, bias: Option<&Var>) -> Result<Var, GraphError>;
}

impl VarMatrixOps for Var {
    fn matmul(&self, other: &Var) -> Result<Var, GraphError> {
        self.derive(&[other], |g| {
            g.new_mat_mul_node(self.node_id(), other.node_id(), None)
        })
    }

    fn affine(&self, weight: &Var, bias: Option<&Var>) -> Result<Var, GraphError> {
        let projected = self.matmul(weight)?;
        match bias {
            Some(bias) => projected.try_add(bias),
            None => Ok(projected),
        }
    }
}
