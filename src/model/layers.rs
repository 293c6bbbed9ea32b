//! 模型中的层：构造时即确定是否使用边

use crate::nn::{GatConv, GcnConv, Graph, GraphConv, GraphError, Linear, Module, Var};

use super::config::TransformKind;

/// 消息传递层
pub enum MessageLayer {
    Gcn(GcnConv),
    GraphConv(GraphConv),
    Gat(GatConv),
}

impl MessageLayer {
    fn forward(&self, x: &Var, edges: &Var) -> Result<Var, GraphError> {
        match self {
            Self::Gcn(conv) => conv.forward(x, edges),
            Self::GraphConv(conv) => conv.forward(x, edges),
            Self::Gat(conv) => conv.forward(x, edges),
        }
    }
}

impl Module for MessageLayer {
    fn parameters(&self) -> Vec<Var> {
        match self {
            Self::Gcn(conv) => conv.parameters(),
            Self::GraphConv(conv) => conv.parameters(),
            Self::Gat(conv) => conv.parameters(),
        }
    }
}

/// 模型的一层特征变换
pub enum Layer {
    /// 逐节点变换，忽略边
    Plain(Linear),
    /// 沿边聚合邻居
    Message(MessageLayer),
}

impl Layer {
    pub(crate) fn new(
        kind: TransformKind,
        graph: &Graph,
        in_dim: usize,
        out_dim: usize,
        name: &str,
    ) -> Result<Self, GraphError> {
        Ok(match kind {
            TransformKind::Linear => Self::Plain(Linear::new(graph, in_dim, out_dim, true, name)?),
            TransformKind::Gcn => {
                Self::Message(MessageLayer::Gcn(GcnConv::new(graph, in_dim, out_dim, name)?))
            }
            TransformKind::GraphConv => Self::Message(MessageLayer::GraphConv(GraphConv::new(
                graph, in_dim, out_dim, name,
            )?)),
            TransformKind::Gat => {
                Self::Message(MessageLayer::Gat(GatConv::new(graph, in_dim, out_dim, name)?))
            }
        })
    }

    pub fn forward(&self, x: &Var, edges: Option<&Var>) -> Result<Var, GraphError> {
        match self {
            Self::Plain(linear) => linear.forward(x),
            Self::Message(layer) => {
                let edges = edges.ok_or_else(|| {
                    GraphError::InvalidOperation("消息传递层需要边列表".to_string())
                })?;
                layer.forward(x, edges)
            }
        }
    }

    pub const fn is_message_passing(&self) -> bool {
        matches!(self, Self::Message(_))
    }
}

impl Module for Layer {
    fn parameters(&self) -> Vec<Var> {
        match self {
            Self::Plain(linear) => linear.parameters(),
            Self::Message(layer) => layer.parameters(),
        }
    }
}
