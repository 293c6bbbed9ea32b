//! 内置数据集
//!
//! 提供：
//! - Cora：LINQS 发布的文本格式（`cora.content` / `cora.cites`）
//! - 合成引文图：带种子、带社区结构，可生成与 Cora 同形的数据

pub(crate) mod cora;
pub(crate) mod synthetic;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use synthetic::SyntheticSpec;

/// 掩码划分方式：每类训练节点数 + 验证/测试节点数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSpec {
    pub train_per_class: usize,
    pub num_val: usize,
    pub num_test: usize,
}

impl Default for SplitSpec {
    /// Planetoid 的标准划分：每类 20 个训练节点，500 个验证节点，1000 个测试节点
    fn default() -> Self {
        Self {
            train_per_class: 20,
            num_val: 500,
            num_test: 1000,
        }
    }
}

/// 获取默认数据目录
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("only_gnn")
        .join("datasets")
}
