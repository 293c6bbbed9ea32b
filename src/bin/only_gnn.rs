//! only_gnn 命令行
//!
//! - `train`：训练（或从检查点加载）MLP 基线与 GNN，输出各划分上的准确率
//! - `export`：训练（或加载）GNN 并导出冻结推理图
//! - `verify`：加载导出产物，与原模型做数值等价检查，不一致时以非零状态退出
//! - `smoke`：下游使用方的冒烟测试，用随机输入跑导出产物并打印形状

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use only_gnn::config::ExperimentConfig;
use only_gnn::data::{CitationDataset, DataError};
use only_gnn::model::{ConfigError, GnnModel, ModelConfig};
use only_gnn::nn::GraphError;
use only_gnn::runtime::{RuntimeError, smoke_test};
use only_gnn::train::{Checkpoint, TrainError, TrainOutcome, Trainer, evaluate, train_or_load};
use only_gnn::verify::{VerifyError, verify_artifact};

#[derive(Parser)]
#[command(name = "only_gnn", version, about = "引文图节点分类：训练、导出、校验、冒烟测试")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 训练（或加载）MLP 与 GNN 并评估
    Train {
        #[command(flatten)]
        common: CommonArgs,
        /// 覆盖训练轮数
        #[arg(long)]
        epochs: Option<usize>,
    },
    /// 导出 GNN 的冻结推理图
    Export {
        #[command(flatten)]
        common: CommonArgs,
        /// 导出路径（缺省取配置中的 artifact_path）
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// 校验导出产物与原模型的数值一致性
    Verify {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long)]
        artifact: Option<PathBuf>,
    },
    /// 用随机输入运行导出产物并打印输入/输出形状
    Smoke {
        artifact: PathBuf,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// 实验配置（JSON）
    #[arg(long)]
    config: Option<PathBuf>,
    /// 使用与 Cora 同形的合成图
    #[arg(long)]
    synthetic: bool,
    /// Cora 数据目录
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Train(#[from] TrainError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Verify(#[from] VerifyError),
}

impl CommonArgs {
    fn load(&self) -> Result<(ExperimentConfig, CitationDataset), CliError> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load(path)?,
            None => ExperimentConfig::default(),
        };
        config.synthetic |= self.synthetic;
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.checkpoint_dir {
            config.checkpoint_dir = dir.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        let dataset = config.load_dataset()?;
        config.fit_to(&dataset);
        config.validate()?;
        Ok((config, dataset))
    }
}

fn prepare_model(
    name: &str,
    model_config: &ModelConfig,
    config: &ExperimentConfig,
    dataset: &CitationDataset,
) -> Result<GnnModel, CliError> {
    let model = GnnModel::new(name, model_config, config.seed)?;
    info!("\n{}", model.describe());
    let trainer = Trainer::new(config.train.clone())?;
    let checkpoint = Checkpoint::new(&config.checkpoint_dir);
    match train_or_load(&model, dataset, &trainer, &checkpoint)? {
        TrainOutcome::Trained(report) => info!(
            model = name,
            best_epoch = report.best_epoch,
            best_val_acc = report.best_val_acc,
            "训练完成"
        ),
        TrainOutcome::Loaded(meta) => info!(
            model = name,
            epochs = meta.epochs_trained,
            "使用已有检查点"
        ),
    }
    Ok(model)
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match cli.command {
        Command::Train { common, epochs } => {
            let (mut config, dataset) = common.load()?;
            if let Some(epochs) = epochs {
                config.train.max_epochs = epochs;
            }
            for (name, model_config) in [("mlp", &config.mlp), ("gnn", &config.gnn)] {
                let model = prepare_model(name, model_config, &config, &dataset)?;
                println!("{name}: {}", evaluate(&model, &dataset)?);
            }
        }
        Command::Export { common, out } => {
            let (config, dataset) = common.load()?;
            let model = prepare_model("gnn", &config.gnn, &config, &dataset)?;
            let path = out.unwrap_or_else(|| config.artifact_path.clone());
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(GraphError::from)?;
            }
            let frozen = model.export(dataset.features(), Some(dataset.edges()), &path)?;
            println!("{}", frozen.summary());
            println!("已导出到 {}", path.display());
        }
        Command::Verify { common, artifact } => {
            let (config, dataset) = common.load()?;
            let model = prepare_model("gnn", &config.gnn, &config, &dataset)?;
            let path = artifact.unwrap_or_else(|| config.artifact_path.clone());
            let report = verify_artifact(
                &model,
                &path,
                dataset.features(),
                dataset.edges(),
                &config.tolerance,
            )?;
            println!("{report}");
            if !report.passed {
                return Ok(ExitCode::from(2));
            }
        }
        Command::Smoke { artifact, seed } => {
            print!("{}", smoke_test(&artifact, seed)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
