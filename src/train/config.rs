//! 训练超参数

use serde::{Deserialize, Serialize};

use crate::model::ConfigError;

/// 优化器选择
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerKind {
    Sgd { momentum: f32 },
    Adam,
}

/// 训练配置，默认值即 Cora 上的基准实验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub max_epochs: usize,
    pub optimizer: OptimizerKind,
    pub lr: f32,
    pub weight_decay: f32,
    /// 每隔多少个 epoch 输出一次 info 级别日志
    pub log_every: usize,
    /// 训练结束时是否恢复验证准确率最高的参数
    pub keep_best: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_epochs: 200,
            optimizer: OptimizerKind::Sgd { momentum: 0.9 },
            lr: 0.1,
            weight_decay: 2e-3,
            log_every: 20,
            keep_best: true,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_epochs == 0 {
            return Err(ConfigError::InvalidTraining("max_epochs 至少为 1".to_string()));
        }
        if !(self.lr > 0.0 && self.lr.is_finite()) {
            return Err(ConfigError::InvalidTraining(format!(
                "学习率必须为正，但为 {}",
                self.lr
            )));
        }
        if self.weight_decay < 0.0 {
            return Err(ConfigError::InvalidTraining(format!(
                "weight_decay 不能为负，但为 {}",
                self.weight_decay
            )));
        }
        if let OptimizerKind::Sgd { momentum } = self.optimizer {
            if !(0.0..1.0).contains(&momentum) {
                return Err(ConfigError::InvalidTraining(format!(
                    "momentum 必须在 [0, 1) 内，但为 {momentum}"
                )));
            }
        }
        Ok(())
    }
}
