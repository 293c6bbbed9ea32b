/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 激活与 dropout 扩展 trait（隐藏层之间的非线性与正则）
 */

use crate::nn::{GraphError, Var};

pub trait VarActivationOps {
    /// `max(0, x)`
    fn relu(&self) -> Result<Var, GraphError>;

    /// Inverted dropout，`p` 须在 [0, 1) 内；推理模式下为恒等映射
    fn dropout(&self, p: f32) -> Result<Var, GraphError>;

    /// 隐藏层之后的标准组合：ReLU，`p > 0` 时再接 dropout
    fn relu_dropout(&self, p: f32) -> Result<Var, GraphError>;
}

impl VarActivationOps for Var {
    fn relu(&self) -> Result<Var, GraphError> {
        self.derive(&[], |g| g.new_relu_node(self.node_id(), None))
    }

    fn dropout(&self, p: f32) -> Result<Var, GraphError> {
        self.derive(&[], |g| g.new_dropout_node(self.node_id(), p, None))
    }

    fn relu_dropout(&self, p: f32) -> Result<Var, GraphError> {
        let activated = self.relu()?;
        if p > 0.0 { activated.dropout(p) } else { Ok(activated) }
    }
}
