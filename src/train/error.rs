//! 训练错误类型定义

use thiserror::Error;

use crate::data::DataError;
use crate::model::ConfigError;
use crate::nn::GraphError;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("检查点 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("检查点元数据解析失败: {0}")]
    Json(#[from] serde_json::Error),
}
