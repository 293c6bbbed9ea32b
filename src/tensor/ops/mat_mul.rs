use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    /// 实现矩阵乘法。只接受2阶张量，
    /// 且前一个张量的列数（col）须等于后一个张量的行数（row），否则返回错误。
    pub fn mat_mul(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        let self_data = self.view2()?;
        let other_data = other.view2()?;
        if self_data.ncols() != other_data.nrows() {
            return Err(TensorError::OperatorError {
                operator: Operator::MatMul,
                left: self.shape().to_vec(),
                right: other.shape().to_vec(),
            });
        }
        Ok(Tensor::from_array2(self_data.dot(&other_data)))
    }

    /// 矩阵转置
    pub fn transpose(&self) -> Result<Tensor, TensorError> {
        Ok(Tensor::from_array2(self.view2()?.t().to_owned()))
    }
}
