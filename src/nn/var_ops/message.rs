/*
 * @Author       : 老董
 * @Date         : 2026-02-01
 * @Description  : Var 消息传递扩展 trait
 */

use crate::nn::{Aggregation, GraphError, Var};

/// 消息传递扩展 trait：沿 `edges`（边输入节点）在节点间聚合特征
pub trait VarMessageOps {
    /// 按 `aggr` 规则把源节点特征聚合到目标节点
    ///
    /// # 形状要求
    /// - self: [N, d]
    /// - 输出: [N, d]
    fn propagate(&self, edges: &Var, aggr: Aggregation) -> Result<Var, GraphError>;

    /// 单头图注意力聚合
    ///
    /// - self: 变换后的特征 [N, d]
    /// - `att_src`、`att_dst`: 注意力向量 [1, d]
    /// - `negative_slope`: 打分时 `LeakyReLU` 的负斜率
    fn gat_attention(
        &self,
        att_src: &Var,
        att_dst: &Var,
        edges: &Var,
        negative_slope: f32,
    ) -> Result<Var, GraphError>;
}

impl VarMessageOps for Var {
    fn propagate(&self, edges: &Var, aggr: Aggregation) -> Result<Var, GraphError> {
        self.derive(&[edges], |g| {
            g.new_propagate_node(self.node_id(), edges.node_id(), aggr, None)
        })
    }

    fn gat_attention(
        &self,
        att_src: &Var,
        att_dst: &Var,
        edges: &Var,
        negative_slope: f32,
    ) -> Result<Var, GraphError> {
        self.derive(&[att_src, att_dst, edges], |g| {
            g.new_gat_attention_node(
                self.node_id(),
                att_src.node_id(),
                att_dst.node_id(),
                edges.node_id(),
                negative_slope,
                None,
            )
        })
    }
}
