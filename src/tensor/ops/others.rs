use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::Axis;

impl Tensor {
    /// 逐元素映射
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Tensor {
        Tensor {
            data: self.data.mapv(f),
        }
    }

    pub fn sqrt(&self) -> Tensor {
        self.map(f32::sqrt)
    }

    /// 所有元素之和
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 沿行方向求和（保留维度）：`[n, m]` -> `[1, m]`，用于偏置的梯度
    pub fn sum_rows(&self) -> Result<Tensor, TensorError> {
        let view = self.view2()?;
        let summed = view.sum_axis(Axis(0)).insert_axis(Axis(0));
        Ok(Tensor::from_array2(summed))
    }

    /// 按行做数值稳定的softmax：`exp(x_i - max) / Σ exp(x_j - max)`
    pub fn softmax_rows(&self) -> Result<Tensor, TensorError> {
        let mut out = self.view2()?.to_owned();
        for mut row in out.rows_mut() {
            let max = row.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            row.mapv_inplace(|x| (x - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|x| x / sum);
        }
        Ok(Tensor::from_array2(out))
    }

    /// 每行最大值的列索引（相同最大值取第一个）
    pub fn argmax_rows(&self) -> Result<Vec<usize>, TensorError> {
        let view = self.view2()?;
        Ok(view
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (j, &x) in row.iter().enumerate() {
                    if x > row[best] {
                        best = j;
                    }
                }
                best
            })
            .collect())
    }

    /// 与另一个同形张量逐元素之差的绝对值的最大值，任一差值为 NaN 时返回 NaN
    pub fn max_abs_diff(&self, other: &Tensor) -> Result<f32, TensorError> {
        if !self.is_same_shape(other) {
            return Err(TensorError::OperatorError {
                operator: Operator::Compare,
                left: self.shape().to_vec(),
                right: other.shape().to_vec(),
            });
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, |max, d| if d.is_nan() || d > max { d } else { max }))
    }
}
