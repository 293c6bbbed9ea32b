//! 节点分类模型

use std::path::Path;

use tracing::debug;

use super::config::ModelConfig;
use super::error::ConfigError;
use super::layers::Layer;
use crate::data::EdgeIndex;
use crate::nn::{FrozenGraph, Graph, GraphError, Module, Var, VarActivationOps};
use crate::tensor::Tensor;

/// 导出图的节点特征输入名
pub const NODES_INPUT: &str = "nodes";
/// 导出图的边输入名
pub const EDGES_INPUT: &str = "edges";
/// 导出图的输出名
pub const LOGITS_OUTPUT: &str = "logits";

/// 由 [`ModelConfig`] 搭建的节点分类模型
///
/// 模型拥有一张计算图：特征与边以占位输入节点的形式接入，前向连线在构造时一次完成，
/// 之后每次推理或训练只替换输入的值。
pub struct GnnModel {
    name: String,
    config: ModelConfig,
    graph: Graph,
    layers: Vec<Layer>,
    nodes: Var,
    /// 仅消息传递模型有边输入
    edges: Option<Var>,
    logits: Var,
}

impl GnnModel {
    /// 按配置搭建模型，`seed` 决定参数初值与 dropout 掩码
    ///
    /// 配置不合法时在创建任何节点之前报错。
    pub fn new(name: &str, config: &ModelConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::build(name, config, seed)
            .map_err(|e| ConfigError::InvalidModel(format!("搭建模型 {name} 失败: {e}")))
    }

    fn build(name: &str, config: &ModelConfig, seed: u64) -> Result<Self, GraphError> {
        let graph = Graph::with_name_and_seed(name, seed);
        let nodes = graph.input_placeholder(NODES_INPUT)?;
        let edges = if config.kind.uses_edges() {
            Some(graph.edge_placeholder(EDGES_INPUT)?)
        } else {
            None
        };

        let dims = config.layer_dims();
        let last = dims.len() - 1;
        let mut layers = Vec::with_capacity(dims.len());
        let mut h = nodes.clone();
        for (i, &(in_dim, out_dim)) in dims.iter().enumerate() {
            let layer_name = format!("{}{}", config.kind.layer_prefix(), i + 1);
            let layer = Layer::new(config.kind, &graph, in_dim, out_dim, &layer_name)?;
            h = layer.forward(&h, edges.as_ref())?;
            if i < last {
                h = h.relu_dropout(config.dropout)?;
            }
            layers.push(layer);
        }
        debug!(model = name, kind = %config.kind, layers = layers.len(), "模型搭建完成");

        Ok(Self {
            name: name.to_string(),
            config: config.clone(),
            graph,
            layers,
            nodes,
            edges,
            logits: h,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// 输出 logits 节点 `[N, out_dim]`
    pub const fn logits(&self) -> &Var {
        &self.logits
    }

    /// 把一组输入接入计算图
    ///
    /// - 特征必须是 `[N, in_dim]`
    /// - 消息传递模型必须提供边，且边列表覆盖的节点数为 N
    /// - MLP 忽略边
    pub fn set_inputs(
        &self,
        features: &Tensor,
        edges: Option<&EdgeIndex>,
    ) -> Result<(), GraphError> {
        if features.dimension() != 2 || features.cols() != self.config.in_dim {
            return Err(GraphError::ShapeMismatch {
                expected: vec![features.rows(), self.config.in_dim],
                got: features.shape().to_vec(),
                message: format!("模型 {} 的节点特征维度不符", self.name),
            });
        }
        if let Some(edge_input) = &self.edges {
            let edges = edges.ok_or_else(|| {
                GraphError::InvalidOperation(format!(
                    "{} 模型 {} 需要边列表",
                    self.config.kind, self.name
                ))
            })?;
            if edges.node_count() != features.rows() {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![features.rows()],
                    got: vec![edges.node_count()],
                    message: "边列表覆盖的节点数与特征矩阵的行数不一致".to_string(),
                });
            }
            edge_input.set_edges(edges)?;
        }
        self.nodes.set_value(features)
    }

    /// 评估模式下的前向传播，返回 logits
    pub fn forward(
        &self,
        features: &Tensor,
        edges: Option<&EdgeIndex>,
    ) -> Result<Tensor, GraphError> {
        self.set_inputs(features, edges)?;
        self.graph.no_grad(|| self.logits.forward())?;
        self.logits
            .value()?
            .ok_or_else(|| GraphError::ComputationError("前向传播后 logits 没有值".to_string()))
    }

    /// 每个节点得分最高的类别
    pub fn predict(
        &self,
        features: &Tensor,
        edges: Option<&EdgeIndex>,
    ) -> Result<Vec<usize>, GraphError> {
        Ok(self.forward(features, edges)?.argmax_rows()?)
    }

    /// 以给定样例输入冻结推理图，图输入/输出的形状取自样例输入
    pub fn freeze(
        &self,
        features: &Tensor,
        edges: Option<&EdgeIndex>,
    ) -> Result<FrozenGraph, GraphError> {
        self.set_inputs(features, edges)?;
        self.graph.freeze(&self.name, &self.logits, LOGITS_OUTPUT)
    }

    /// 冻结并写入文件
    pub fn export<P: AsRef<Path>>(
        &self,
        features: &Tensor,
        edges: Option<&EdgeIndex>,
        path: P,
    ) -> Result<FrozenGraph, GraphError> {
        let frozen = self.freeze(features, edges)?;
        frozen.save(path.as_ref())?;
        debug!(model = %self.name, path = %path.as_ref().display(), "已导出冻结图");
        Ok(frozen)
    }

    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.graph.save_params(path)
    }

    pub fn load_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.graph.load_params(path)
    }

    /// 可读的结构描述
    pub fn describe(&self) -> String {
        let mut lines = vec![format!(
            "{}: {} × {} 层 ({} -> {} -> {})，dropout {}",
            self.name,
            self.config.kind,
            self.config.num_layers,
            self.config.in_dim,
            self.config.hidden_dim,
            self.config.out_dim,
            self.config.dropout
        )];
        for (i, layer) in self.layers.iter().enumerate() {
            let params = layer
                .parameters()
                .iter()
                .filter_map(|p| {
                    let name = p.name().ok()?;
                    let shape = p.value().ok().flatten()?.shape().to_vec();
                    Some(format!("{name}{shape:?}"))
                })
                .collect::<Vec<_>>()
                .join(", ");
            let tag = if layer.is_message_passing() { "消息传递" } else { "逐节点" };
            lines.push(format!("  层 {} [{tag}]: {params}", i + 1));
        }
        lines.push(format!("  参数总数: {}", self.num_scalars()));
        lines.join("\n")
    }
}

impl Module for GnnModel {
    fn parameters(&self) -> Vec<Var> {
        self.layers.iter().flat_map(Layer::parameters).collect()
    }
}
