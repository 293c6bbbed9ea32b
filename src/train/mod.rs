//! 训练模块
//!
//! 全批量（full-batch）训练：每个 epoch 在整张图上前向传播，只用训练掩码内的节点计算
//! 交叉熵，反向传播后更新参数，再在验证掩码上评估；训练结束时恢复验证准确率最高的参数。
//!
//! - [`Trainer`]: 训练循环
//! - [`accuracy`] / [`evaluate`]: 按掩码统计准确率
//! - [`Checkpoint`] / [`train_or_load`]: 按模型名存取检查点，已有则跳过训练

mod checkpoint;
mod config;
mod error;
mod metrics;
mod trainer;

#[cfg(test)]
mod tests;

pub use checkpoint::{Checkpoint, CheckpointMeta, TrainOutcome, train_or_load};
pub use config::{OptimizerKind, TrainConfig};
pub use error::TrainError;
pub use metrics::{SplitAccuracy, accuracy, evaluate};
pub use trainer::{EpochStats, TrainReport, Trainer};
