//! 按模型名存取的检查点：二进制参数文件 + JSON 元数据

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::TrainError;
use super::trainer::{TrainReport, Trainer};
use crate::data::CitationDataset;
use crate::model::{ConfigError, GnnModel, ModelConfig};

/// 检查点元数据（与参数文件同名的 `.json`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub model_name: String,
    pub model: ModelConfig,
    pub epochs_trained: usize,
    pub best_val_acc: Option<f32>,
    pub producer: String,
}

/// 检查点目录
#[derive(Debug, Clone)]
pub struct Checkpoint {
    dir: PathBuf,
}

impl Checkpoint {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// `{dir}/{model_name}.ckpt`
    pub fn path_for<P: AsRef<Path>>(dir: P, model_name: &str) -> PathBuf {
        dir.as_ref().join(format!("{model_name}.ckpt"))
    }

    fn meta_path(&self, model_name: &str) -> PathBuf {
        self.dir.join(format!("{model_name}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self, model_name: &str) -> bool {
        Self::path_for(&self.dir, model_name).is_file()
    }

    pub fn save(&self, model: &GnnModel, report: Option<&TrainReport>) -> Result<(), TrainError> {
        fs::create_dir_all(&self.dir)?;
        model.save_params(Self::path_for(&self.dir, model.name()))?;
        let meta = CheckpointMeta {
            model_name: model.name().to_string(),
            model: model.config().clone(),
            epochs_trained: report.map_or(0, |r| r.history.len()),
            best_val_acc: report.map(|r| r.best_val_acc),
            producer: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        };
        fs::write(self.meta_path(model.name()), serde_json::to_string_pretty(&meta)?)?;
        Ok(())
    }

    /// 把检查点加载进 `model`；元数据中的模型配置必须与 `model` 一致
    pub fn load(&self, model: &GnnModel) -> Result<CheckpointMeta, TrainError> {
        let meta: CheckpointMeta =
            serde_json::from_str(&fs::read_to_string(self.meta_path(model.name()))?)?;
        if &meta.model != model.config() {
            return Err(ConfigError::CheckpointMismatch {
                model: model.name().to_string(),
                saved: serde_json::to_string(&meta.model)?,
                current: serde_json::to_string(model.config())?,
            }
            .into());
        }
        model.load_params(Self::path_for(&self.dir, model.name()))?;
        Ok(meta)
    }
}

/// [`train_or_load`] 的结果
#[derive(Debug, Clone)]
pub enum TrainOutcome {
    Trained(TrainReport),
    Loaded(CheckpointMeta),
}

/// 检查点存在则加载并跳过训练，否则训练后写入检查点
pub fn train_or_load(
    model: &GnnModel,
    dataset: &CitationDataset,
    trainer: &Trainer,
    checkpoint: &Checkpoint,
) -> Result<TrainOutcome, TrainError> {
    if checkpoint.exists(model.name()) {
        let meta = checkpoint.load(model)?;
        info!(model = model.name(), "已加载检查点，跳过训练");
        return Ok(TrainOutcome::Loaded(meta));
    }
    let report = trainer.train(model, dataset)?;
    checkpoint.save(model, Some(&report))?;
    info!(
        model = model.name(),
        path = %Checkpoint::path_for(checkpoint.dir(), model.name()).display(),
        "检查点已保存"
    );
    Ok(TrainOutcome::Trained(report))
}
