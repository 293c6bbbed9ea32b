//! 数据加载错误类型定义

use std::path::PathBuf;
use thiserror::Error;

use crate::errors::TensorError;

/// 数据加载相关错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 文件未找到
    #[error("文件未找到: {0}")]
    FileNotFound(PathBuf),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 格式错误（如列数不一致、未知论文 id）
    #[error("格式错误: {0}")]
    FormatError(String),

    /// 索引越界
    #[error("索引越界: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 形状不匹配
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// 按节点给出的序列（标签、掩码等）长度不一致
    #[error("{what} 长度不匹配: 期望 {expected}, 实际 {got}")]
    LengthMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    /// 边的端点超出节点范围
    #[error("第 {edge} 条边 ({source_node} -> {target_node}) 越界：节点数为 {node_count}")]
    EdgeOutOfRange {
        edge: usize,
        source_node: i64,
        target_node: i64,
        node_count: usize,
    },

    /// 掩码为空（无法计算准确率等统计量）
    #[error("{0} 掩码为空，未选中任何节点")]
    EmptyMask(String),

    /// 掩码之间存在重叠
    #[error("节点 {node} 同时属于 {first} 与 {second} 掩码")]
    OverlappingMasks {
        node: usize,
        first: String,
        second: String,
    },

    /// 置换不合法（不是 0..n 的一个排列）
    #[error("置换不合法: {0}")]
    InvalidPermutation(String),

    /// 数据集划分无法满足（节点不够）
    #[error("数据集划分无法满足: {0}")]
    SplitError(String),

    #[error(transparent)]
    Tensor(#[from] TensorError),
}
