use std::fmt;

use thiserror::Error;

/// 会校验形状的张量运算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    MatMul,
    /// 逐元素比较（如 `max_abs_diff`）
    Compare,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MatMul => "矩阵相乘",
            Self::Compare => "逐元素比较",
        })
    }
}

/// 张量层面的错误：构造时数据与形状不符、运算两侧形状不兼容、按行取值越界
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    #[error("数据长度{len}与形状{shape:?}不符")]
    ShapeDataMismatch { shape: Vec<usize>, len: usize },
    #[error("无法{operator}：左侧形状为{left:?}，右侧形状为{right:?}")]
    OperatorError {
        operator: Operator,
        left: Vec<usize>,
        right: Vec<usize>,
    },
    #[error("需要2阶张量（矩阵），实际形状为{0:?}")]
    NotMatrix(Vec<usize>),
    #[error("行索引{index}越界（行数为{rows}）")]
    RowOutOfRange { index: usize, rows: usize },
}
