//! 实验配置：数据来源、检查点与导出路径、模型与训练超参数、等价检查阈值
//!
//! 所有字段都有默认值，JSON 文件只需写出要覆盖的部分。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::transforms::normalize_features;
use crate::data::{CitationDataset, DataError, SyntheticSpec, default_data_dir};
use crate::model::{ConfigError, ModelConfig, TransformKind};
use crate::train::TrainConfig;
use crate::verify::Tolerance;

/// 一次完整实验（训练 MLP 与 GNN、导出、校验）的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Cora 数据目录（含 `cora.content` 与 `cora.cites`），缺省为缓存目录下的 `cora`
    pub data_dir: Option<PathBuf>,
    /// 使用与 Cora 同形的合成图代替磁盘数据
    pub synthetic: bool,
    /// 按行归一化节点特征
    pub normalize_features: bool,
    pub seed: u64,
    pub checkpoint_dir: PathBuf,
    pub artifact_path: PathBuf,
    pub mlp: ModelConfig,
    pub gnn: ModelConfig,
    pub train: TrainConfig,
    pub tolerance: Tolerance,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            synthetic: false,
            normalize_features: true,
            seed: 42,
            checkpoint_dir: PathBuf::from("checkpoints"),
            artifact_path: PathBuf::from("artifacts/gnn.ogfg"),
            mlp: ModelConfig {
                kind: TransformKind::Linear,
                ..ModelConfig::default()
            },
            gnn: ModelConfig::default(),
            train: TrainConfig::default(),
            tolerance: Tolerance::default(),
        }
    }
}

impl ExperimentConfig {
    /// 从 JSON 文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.as_ref().display(), "已加载实验配置");
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mlp.kind.uses_edges() {
            return Err(ConfigError::InvalidModel(format!(
                "基线模型必须是 linear，而不是 {}",
                self.mlp.kind
            )));
        }
        self.mlp.validate()?;
        self.gnn.validate()?;
        self.train.validate()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| default_data_dir().join("cora"))
    }

    /// 按配置加载数据集；模型的输入/输出维度随后应当用 [`Self::fit_to`] 对齐
    pub fn load_dataset(&self) -> Result<CitationDataset, DataError> {
        let dataset = if self.synthetic {
            CitationDataset::synthetic(&SyntheticSpec::cora_like(), self.seed)?
        } else {
            CitationDataset::load_cora(self.data_dir(), self.seed)?
        };
        let dataset = if self.normalize_features {
            let features = normalize_features(dataset.features())?;
            dataset.with_features(features)?
        } else {
            dataset
        };
        info!(
            name = dataset.name(),
            nodes = dataset.num_nodes(),
            features = dataset.num_features(),
            edges = dataset.num_edges(),
            classes = dataset.num_classes(),
            "数据集已就绪"
        );
        Ok(dataset)
    }

    /// 把两个模型的输入/输出维度设为数据集的特征数与类别数
    pub fn fit_to(&mut self, dataset: &CitationDataset) {
        for model in [&mut self.mlp, &mut self.gnn] {
            model.in_dim = dataset.num_features();
            model.out_dim = dataset.num_classes();
        }
    }
}
