//! # Only GNN
//!
//! 用纯rust完成引文图（Cora）上的节点分类实验：
//! 以 MLP 为基线、以消息传递 GNN（GCN / GraphConv / GAT）为对照训练模型，
//! 把训练好的模型冻结导出为带名称输入/输出的推理图，
//! 再用独立的推理运行时加载执行，并校验两者输出的数值一致性。
//!
//! - [`data`]: 数据集、边列表与掩码
//! - [`nn`]: 计算图、自动求导、图神经网络层与优化器
//! - [`model`]: 按配置搭建节点分类模型
//! - [`train`]: 全批量训练、准确率统计与检查点
//! - [`runtime`]: 冻结推理图的运行时
//! - [`verify`]: 导出产物与原模型的数值等价检查
//! - [`config`]: 实验配置

pub mod config;
pub mod data;
pub mod errors;
pub mod model;
pub mod nn;
pub mod runtime;
pub mod tensor;
pub mod train;
pub mod verify;
