//! 数据加载模块
//!
//! 提供引文图（citation graph）节点分类数据集的加载、校验与划分。
//!
//! # 主要组件
//!
//! - [`EdgeIndex`]: 有序的 (source, target) 边列表，构造时校验节点索引范围
//! - [`SplitMasks`]: train/val/test 三个布尔掩码
//! - [`CitationDataset`]: 节点特征 + 边 + 标签 + 掩码
//! - [`datasets`]: Cora（LINQS 文本格式）与带种子的合成图
//! - [`transforms`]: 特征预处理
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use only_gnn::data::{CitationDataset, SyntheticSpec};
//!
//! let dataset = CitationDataset::load_cora("data/cora", 42)?;
//! // 或者不依赖磁盘数据：
//! let dataset = CitationDataset::synthetic(&SyntheticSpec::cora_like(), 42)?;
//! println!("{} 个节点, {} 条边", dataset.num_nodes(), dataset.num_edges());
//! ```

mod dataset;
pub mod datasets;
mod edge_index;
pub mod error;
mod split;
pub mod transforms;

#[cfg(test)]
mod tests;

// Re-exports
pub use dataset::CitationDataset;
pub use datasets::{SplitSpec, SyntheticSpec, default_data_dir};
pub use edge_index::EdgeIndex;
pub use error::DataError;
pub use split::{Split, SplitMasks};
