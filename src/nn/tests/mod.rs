mod gradient_check;
mod graph_basic;
mod node_dropout;
mod optimizer;

use crate::data::EdgeIndex;

/// 4 个节点的小图：0 <-> 1 <-> 2 -> 3，外加节点 0 上的一个自环
pub(super) fn tiny_edges() -> EdgeIndex {
    EdgeIndex::new(vec![(0, 1), (1, 0), (1, 2), (2, 1), (2, 3), (0, 0)], 4).unwrap()
}
