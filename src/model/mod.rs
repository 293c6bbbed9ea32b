//! 模型定义模块
//!
//! 按层数、隐藏宽度与变换类型搭建节点分类模型：
//! - [`TransformKind::Linear`]：逐节点的 MLP，不使用边
//! - [`TransformKind::Gcn`] / [`TransformKind::GraphConv`] / [`TransformKind::Gat`]：消息传递 GNN
//!
//! 每层在构造时就确定为 [`Layer::Plain`] 或 [`Layer::Message`]，前向传播时不做类型判断。
//!
//! # 使用示例
//!
//! ```ignore
//! use only_gnn::model::{GnnModel, ModelConfig, TransformKind};
//!
//! let config = ModelConfig::new(TransformKind::Gcn, 1433, 16, 7);
//! let model = GnnModel::new("gnn", &config, 42)?;
//! let logits = model.forward(dataset.features(), Some(dataset.edges()))?;
//! model.export(dataset.features(), Some(dataset.edges()), "gnn.ogfg")?;
//! ```

mod config;
mod error;
mod gnn;
mod layers;

#[cfg(test)]
mod tests;

pub use config::{ModelConfig, TransformKind};
pub use error::ConfigError;
pub use gnn::{EDGES_INPUT, GnnModel, LOGITS_OUTPUT, NODES_INPUT};
pub use layers::{Layer, MessageLayer};
