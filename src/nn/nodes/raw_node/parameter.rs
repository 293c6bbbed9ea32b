use super::TraitNode;
use crate::nn::GraphError;

/// 可训练参数节点，形状在创建时固定
#[derive(Debug, Clone)]
pub(in crate::nn) struct Parameter {
    shape: Vec<usize>,
}

impl Parameter {
    pub(in crate::nn) fn new(shape: &[usize]) -> Result<Self, GraphError> {
        // 权重 [in, out]、偏置与注意力向量 [1, out] 都是矩阵
        if shape.len() != 2 || shape.contains(&0) {
            return Err(GraphError::InvalidOperation(format!(
                "参数必须是非空的 2 维张量，但收到的形状是 {shape:?}"
            )));
        }
        Ok(Self {
            shape: shape.to_vec(),
        })
    }

    pub(in crate::nn) fn shape(&self) -> &[usize] {
        &self.shape
    }
}

impl TraitNode for Parameter {
    fn type_name(&self) -> &'static str {
        "Parameter"
    }
}
