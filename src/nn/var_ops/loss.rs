/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 损失扩展 trait：只在被选中的节点上计算的 softmax 交叉熵
 */

use crate::nn::{GraphError, Var};

pub trait VarLossOps {
    /// 按行 softmax 后与 one-hot 目标求交叉熵
    ///
    /// `target` 与 logits 同形；全零的目标行（掩码外的节点）不参与损失，
    /// 损失按被选中的行数取平均。一行都没有选中时前向传播报错。
    ///
    /// ```ignore
    /// let target = graph.input(&masked_one_hot(labels, train_mask, num_classes))?;
    /// let loss = logits.masked_cross_entropy(&target)?;
    /// ```
    fn masked_cross_entropy(&self, target: &Var) -> Result<Var, GraphError>;
}

impl VarLossOps for Var {
    fn masked_cross_entropy(&self, target: &Var) -> Result<Var, GraphError> {
        self.derive(&[target], |g| {
            g.new_softmax_cross_entropy_node(self.node_id(), target.node_id(), None)
        })
    }
}
