//! 模型超参数

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// 每层特征变换的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransformKind {
    /// 普通全连接，不使用边
    Linear,
    /// 对称归一化图卷积
    Gcn,
    /// 邻居求和 + 自身变换
    GraphConv,
    /// 单头图注意力
    Gat,
}

impl TransformKind {
    pub const fn uses_edges(self) -> bool {
        !matches!(self, Self::Linear)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Gcn => "gcn",
            Self::GraphConv => "graph_conv",
            Self::Gat => "gat",
        }
    }

    /// 层参数名前缀
    pub(crate) const fn layer_prefix(self) -> &'static str {
        match self {
            Self::Linear => "fc",
            Self::Gcn | Self::GraphConv => "conv",
            Self::Gat => "gat",
        }
    }
}

impl FromStr for TransformKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mlp" | "linear" => Ok(Self::Linear),
            "gcn" => Ok(Self::Gcn),
            "graph_conv" | "graphconv" => Ok(Self::GraphConv),
            "gat" => Ok(Self::Gat),
            _ => Err(ConfigError::UnknownTransformKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for TransformKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransformKind> for String {
    fn from(kind: TransformKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 模型结构配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub kind: TransformKind,
    pub in_dim: usize,
    pub hidden_dim: usize,
    pub out_dim: usize,
    /// 变换层数，至少为 1（1 表示单层 in -> out）
    pub num_layers: usize,
    /// 隐藏层之后的 dropout 概率
    pub dropout: f32,
}

impl Default for ModelConfig {
    /// Cora 上的默认实验：2 层 GCN，隐藏宽度 16
    fn default() -> Self {
        Self {
            kind: TransformKind::Gcn,
            in_dim: 1433,
            hidden_dim: 16,
            out_dim: 7,
            num_layers: 2,
            dropout: 0.1,
        }
    }
}

impl ModelConfig {
    pub fn new(kind: TransformKind, in_dim: usize, hidden_dim: usize, out_dim: usize) -> Self {
        Self {
            kind,
            in_dim,
            hidden_dim,
            out_dim,
            ..Self::default()
        }
    }

    pub const fn with_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    pub const fn with_dropout(mut self, dropout: f32) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_layers == 0 {
            return Err(ConfigError::InvalidModel("层数至少为 1".to_string()));
        }
        if self.in_dim == 0 || self.out_dim == 0 || (self.num_layers > 1 && self.hidden_dim == 0) {
            return Err(ConfigError::InvalidModel(format!(
                "维度必须为正：in={}, hidden={}, out={}",
                self.in_dim, self.hidden_dim, self.out_dim
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ConfigError::InvalidModel(format!(
                "dropout 概率必须在 [0, 1) 内，但为 {}",
                self.dropout
            )));
        }
        Ok(())
    }

    /// 每层的 (输入维度, 输出维度)
    pub fn layer_dims(&self) -> Vec<(usize, usize)> {
        if self.num_layers == 1 {
            return vec![(self.in_dim, self.out_dim)];
        }
        let mut dims = vec![(self.in_dim, self.hidden_dim)];
        dims.extend((1..self.num_layers - 1).map(|_| (self.hidden_dim, self.hidden_dim)));
        dims.push((self.hidden_dim, self.out_dim));
        dims
    }
}
