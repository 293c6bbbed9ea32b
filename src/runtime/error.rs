use thiserror::Error;

use crate::nn::{DType, GraphError};

/// 推理运行时错误
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("读取推理图失败：{0}")]
    Io(#[from] std::io::Error),
    /// 文件不是合法的冻结图，或图结构自相矛盾
    #[error("推理图格式错误：{0}")]
    Format(String),
    #[error("推理图没有名为 {0} 的输入")]
    UnknownInput(String),
    #[error("缺少输入 {0}")]
    MissingInput(String),
    #[error("输入 {name} 的类型应为 {expected:?}，实际为 {got:?}")]
    DTypeMismatch {
        name: String,
        expected: DType,
        got: DType,
    },
    #[error("输入 {name} 的形状应为 {expected:?}，实际为 {got:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("第 {edge} 条边 ({source_node} -> {target_node}) 越界，节点数为 {node_count}")]
    EdgeOutOfRange {
        edge: usize,
        source_node: i64,
        target_node: i64,
        node_count: usize,
    },
    #[error("执行 {node} 失败：{message}")]
    Execution { node: String, message: String },
    #[error("推理图没有名为 {0} 的输出")]
    UnknownOutput(String),
}

impl From<GraphError> for RuntimeError {
    fn from(e: GraphError) -> Self {
        match e {
            // 文件被截断也算格式错误
            GraphError::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                Self::Format(format!("文件不完整：{io}"))
            }
            GraphError::Io(io) => Self::Io(io),
            other => Self::Format(other.to_string()),
        }
    }
}
