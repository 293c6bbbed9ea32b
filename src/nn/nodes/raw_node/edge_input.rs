use super::TraitNode;
use crate::data::EdgeIndex;

/// 边输入节点：为消息传递算子提供 `[2, E]` 边列表
///
/// 边是整数拓扑而非张量，因此单独存放，也不参与梯度计算。
#[derive(Debug, Clone, Default)]
pub(in crate::nn) struct EdgeInput {
    edges: Option<EdgeIndex>,
}

impl EdgeInput {
    pub(in crate::nn) const fn new() -> Self {
        Self { edges: None }
    }

    pub(in crate::nn) const fn edges(&self) -> Option<&EdgeIndex> {
        self.edges.as_ref()
    }

    pub(in crate::nn) fn set_edges(&mut self, edges: EdgeIndex) {
        self.edges = Some(edges);
    }
}

impl TraitNode for EdgeInput {
    fn type_name(&self) -> &'static str {
        "EdgeInput"
    }
}
