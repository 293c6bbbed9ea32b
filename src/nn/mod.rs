/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-12 10:21:05
 * @Description  : 负责神经网络（neural network）的构建：动态计算图、反向传播、
 *                 图神经网络层（GCN/GraphConv/GAT）、优化器以及冻结导出
 */

mod descriptor;
mod graph;
pub mod layer;
mod module;
mod nodes;
pub mod optimizer;
mod var;
mod var_ops;

pub use descriptor::{
    DType, FROZEN_FORMAT_VERSION, FrozenGraph, FrozenNode, FrozenOp, Initializer, TensorInfo,
};
pub use graph::{Graph, GraphError, GraphInner};
pub use layer::{GatConv, GcnConv, GraphConv, Linear};
pub use module::Module;
pub use nodes::NodeId;
pub use nodes::raw_node::Aggregation;
pub use optimizer::{Adam, Optimizer, Sgd};
pub use var::{Init, Var};
pub use var_ops::{VarActivationOps, VarLossOps, VarMatrixOps, VarMessageOps};

#[cfg(test)]
mod tests;
