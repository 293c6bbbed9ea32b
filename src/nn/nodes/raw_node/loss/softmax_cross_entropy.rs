use ndarray::Array2;

use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, value_of};
use crate::nn::nodes::{ForwardContext, NodeHandle};
use crate::tensor::Tensor;

/// 带掩码的 Softmax + CrossEntropy 融合损失节点
///
/// ## 输入
/// - 父节点 0: logits `[n, c]`（未经 softmax 的原始分数）
/// - 父节点 1: 目标 `[n, c]`，被选中节点的行为 one-hot，其余行全零
///
/// ## 输出
/// 被选中节点的平均交叉熵 `[1, 1]`：
/// ```text
/// L = -1/|M| Σ_{i∈M} Σ_c y_ic * log_softmax(x_i)_c
/// ```
/// 全零的目标行不计入损失，也不产生梯度；没有任何被选中的行时报错。
#[derive(Debug, Clone, Default)]
pub(in crate::nn) struct SoftmaxCrossEntropy {
    /// 缓存 softmax 结果，用于反向传播
    softmax_cache: Option<Tensor>,
    /// 缓存每行是否被选中
    selected: Vec<bool>,
}

impl SoftmaxCrossEntropy {
    pub(in crate::nn) fn new() -> Self {
        Self::default()
    }
}

impl TraitNode for SoftmaxCrossEntropy {
    fn type_name(&self) -> &'static str {
        "SoftmaxCrossEntropy"
    }

    fn calc_value_by_parents(
        &mut self,
        parents: &[&NodeHandle],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let logits = value_of(parents[0])?;
        let target = value_of(parents[1])?;
        if !logits.is_same_shape(target) {
            return Err(GraphError::ShapeMismatch {
                expected: logits.shape().to_vec(),
                got: target.shape().to_vec(),
                message: "logits 和目标形状必须相同".to_string(),
            });
        }

        let x = logits.view2()?;
        let y = target.view2()?;
        let selected: Vec<bool> = y.rows().into_iter().map(|row| row.sum() > 0.0).collect();
        let count = selected.iter().filter(|&&s| s).count();
        if count == 0 {
            return Err(GraphError::InvalidOperation(
                "目标中没有任何被选中的节点，无法计算平均损失".to_string(),
            ));
        }

        // log_softmax(x)_c = x_c - max - ln Σ exp(x_j - max)
        let mut loss = 0.0f32;
        for (i, (x_row, y_row)) in x.rows().into_iter().zip(y.rows()).enumerate() {
            if !selected[i] {
                continue;
            }
            let max = x_row.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            let log_sum = x_row.iter().map(|&v| (v - max).exp()).sum::<f32>().ln();
            for (&xv, &yv) in x_row.iter().zip(y_row.iter()) {
                if yv != 0.0 {
                    loss -= yv * (xv - max - log_sum);
                }
            }
        }

        self.softmax_cache = Some(logits.softmax_rows()?);
        self.selected = selected;
        Ok(Tensor::new(&[loss / count as f32], &[1, 1]))
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if index != 0 {
            return Err(GraphError::InvalidOperation(
                "交叉熵的目标是常量输入，不需要梯度".to_string(),
            ));
        }
        let softmax = self.softmax_cache.as_ref().ok_or_else(|| {
            GraphError::ComputationError("交叉熵节点尚未前向传播，无法求梯度".to_string())
        })?;
        let scale = upstream_grad.get_data_number().ok_or_else(|| {
            GraphError::ComputationError("交叉熵的上游梯度必须是标量".to_string())
        })?;
        let count = self.selected.iter().filter(|&&s| s).count() as f32;
        let y = value_of(parents[1])?.view2()?;
        let p = softmax.view2()?;

        // ∂L/∂x_i = (softmax(x_i) - y_i) / |M|，未选中的行为 0
        let mut grad = Array2::<f32>::zeros(p.raw_dim());
        for (i, mut row) in grad.rows_mut().into_iter().enumerate() {
            if self.selected[i] {
                row.assign(&(&p.row(i) - &y.row(i)));
                row *= scale / count;
            }
        }
        Ok(Tensor::from_array2(grad))
    }
}
