/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : Graph 模块的错误类型
 */

use thiserror::Error;

use crate::data::DataError;
use crate::errors::TensorError;
use crate::nn::NodeId;

/// Graph 操作错误类型
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("节点{0:?}不存在")]
    NodeNotFound(NodeId),
    #[error("非法操作：{0}")]
    InvalidOperation(String),
    #[error("形状不匹配（期望{expected:?}，实际{got:?}）：{message}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("计算错误：{0}")]
    ComputationError(String),
    #[error("节点名重复：{0}")]
    DuplicateNodeName(String),
    /// 参数文件/冻结图文件内容不合法
    #[error("文件格式错误：{0}")]
    FormatError(String),
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("读写文件失败：{0}")]
    Io(#[from] std::io::Error),
}
