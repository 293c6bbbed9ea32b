//! 全批量训练循环

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::{OptimizerKind, TrainConfig};
use super::error::TrainError;
use super::metrics::accuracy;
use crate::data::transforms::masked_one_hot;
use crate::data::{CitationDataset, DataError, Split};
use crate::model::{ConfigError, GnnModel};
use crate::nn::{Adam, Module, Optimizer, Sgd, Var, VarLossOps};
use crate::tensor::Tensor;

/// 单个 epoch 的统计
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    pub epoch: usize,
    pub loss: f32,
    pub train_acc: f32,
    pub val_acc: f32,
}

/// 一次训练的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    pub history: Vec<EpochStats>,
    /// 验证准确率最高的 epoch（从 1 开始）
    pub best_epoch: usize,
    pub best_val_acc: f32,
}

impl TrainReport {
    pub fn final_loss(&self) -> Option<f32> {
        self.history.last().map(|s| s.loss)
    }
}

pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &TrainConfig {
        &self.config
    }

    fn build_optimizer(&self, model: &GnnModel, params: &[Var]) -> Box<dyn Optimizer> {
        let c = &self.config;
        match c.optimizer {
            OptimizerKind::Sgd { momentum } => Box::new(
                Sgd::new(model.graph(), params, c.lr)
                    .with_momentum(momentum)
                    .with_weight_decay(c.weight_decay),
            ),
            OptimizerKind::Adam => Box::new(
                Adam::new(model.graph(), params, c.lr).with_weight_decay(c.weight_decay),
            ),
        }
    }

    /// 在 `dataset` 的训练掩码上训练 `model`
    ///
    /// 训练掩码或验证掩码为空时报错。`keep_best` 开启时，返回前把参数恢复为
    /// 验证准确率最高时的快照。
    pub fn train(
        &self,
        model: &GnnModel,
        dataset: &CitationDataset,
    ) -> Result<TrainReport, TrainError> {
        let masks = dataset.masks();
        for split in [Split::Train, Split::Val] {
            if masks.count(split) == 0 {
                return Err(DataError::EmptyMask(split.to_string()).into());
            }
        }

        let graph = model.graph();
        model.set_inputs(dataset.features(), Some(dataset.edges()))?;
        let target = graph.input(&masked_one_hot(
            dataset.labels(),
            masks.mask(Split::Train),
            dataset.num_classes(),
        ))?;
        let loss = model.logits().masked_cross_entropy(&target)?;

        let params = model.parameters();
        let mut optimizer = self.build_optimizer(model, &params);
        info!(
            model = model.name(),
            epochs = self.config.max_epochs,
            params = model.num_scalars(),
            "开始训练"
        );

        let mut history = Vec::with_capacity(self.config.max_epochs);
        let mut best: Option<(usize, f32, Vec<Tensor>)> = None;
        graph.train();
        for epoch in 1..=self.config.max_epochs {
            let loss_val = optimizer.minimize(&loss)?;

            let logits = model.forward(dataset.features(), Some(dataset.edges()))?;
            let train_acc = accuracy(&logits, dataset.labels(), masks.mask(Split::Train))?;
            let val_acc = accuracy(&logits, dataset.labels(), masks.mask(Split::Val))?;
            let stats = EpochStats {
                epoch,
                loss: loss_val,
                train_acc,
                val_acc,
            };
            debug!(?stats, "epoch 完成");
            if epoch % self.config.log_every.max(1) == 0 || epoch == self.config.max_epochs {
                info!(
                    "Epoch {epoch:03}: loss {loss_val:.4}, train acc {train_acc:.4}, val acc {val_acc:.4}"
                );
            }
            history.push(stats);

            if best.as_ref().is_none_or(|(_, best_acc, _)| val_acc > *best_acc) {
                best = Some((epoch, val_acc, snapshot(&params)?));
            }
        }

        let (best_epoch, best_val_acc, best_params) = best.ok_or_else(|| {
            ConfigError::InvalidTraining("没有执行任何 epoch".to_string())
        })?;
        if self.config.keep_best {
            for (param, value) in params.iter().zip(&best_params) {
                param.set_value(value)?;
            }
            info!(best_epoch, best_val_acc, "已恢复验证准确率最高的参数");
        }

        Ok(TrainReport {
            history,
            best_epoch,
            best_val_acc,
        })
    }
}

fn snapshot(params: &[Var]) -> Result<Vec<Tensor>, TrainError> {
    params
        .iter()
        .map(|p| {
            p.value()?.ok_or_else(|| {
                TrainError::Config(ConfigError::InvalidTraining(format!(
                    "参数 {} 没有值",
                    p.name().unwrap_or_default()
                )))
            })
        })
        .collect()
}
