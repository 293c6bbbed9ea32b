use super::Tensor;
use crate::errors::TensorError;
use ndarray::Axis;
use std::ops::{Index, IndexMut};

// 引用式索引
impl<const N: usize> Index<[usize; N]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; N]) -> &Self::Output {
        &self.data[&index[..]]
    }
}

impl<const N: usize> IndexMut<[usize; N]> for Tensor {
    fn index_mut(&mut self, index: [usize; N]) -> &mut Self::Output {
        &mut self.data[&index[..]]
    }
}

// 克隆式索引
impl Tensor {
    /// 按行索引列表选取矩阵的若干行，返回`[rows.len(), cols]`
    pub fn select_rows(&self, rows: &[usize]) -> Result<Tensor, TensorError> {
        let view = self.view2()?;
        let n = view.nrows();
        if let Some(&index) = rows.iter().find(|&&r| r >= n) {
            return Err(TensorError::RowOutOfRange { index, rows: n });
        }
        Ok(Tensor::from_array2(view.select(Axis(0), rows)))
    }

    /// 取矩阵第`row`行，作为切片返回
    pub fn row(&self, row: usize) -> Result<Vec<f32>, TensorError> {
        let view = self.view2()?;
        if row >= view.nrows() {
            return Err(TensorError::RowOutOfRange {
                index: row,
                rows: view.nrows(),
            });
        }
        Ok(view.row(row).to_vec())
    }
}
