//! 配置错误类型定义

use thiserror::Error;

/// 模型/实验配置相关错误（均在任何计算开始之前报告）
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未知的变换类型选择符
    #[error("未知的变换类型: {0}（可选 mlp/linear, gcn, graph_conv, gat）")]
    UnknownTransformKind(String),

    /// 模型超参数不合法
    #[error("模型配置无效: {0}")]
    InvalidModel(String),

    /// 训练超参数不合法
    #[error("训练配置无效: {0}")]
    InvalidTraining(String),

    /// 检查点与当前模型配置不一致
    #[error("检查点 {model} 的配置与当前不一致：检查点为 {saved}，当前为 {current}")]
    CheckpointMismatch {
        model: String,
        saved: String,
        current: String,
    },

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
}
