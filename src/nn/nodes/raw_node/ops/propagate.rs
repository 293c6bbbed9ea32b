use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::bad_parent_index;
use crate::data::EdgeIndex;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, value_of};
use crate::nn::nodes::{ForwardContext, NodeHandle};
use crate::tensor::Tensor;

/// 消息聚合方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    /// GCN 对称归一化：先补自环，`out[t] += x[s] / sqrt(deg(s) * deg(t))`，deg 为含自环的入度
    GcnNorm,
    /// 对邻居（不含自身）求和：`out[t] += x[s]`
    Sum,
}

/// 一次前向传播确定的带权边列表，反向传播时复用
#[derive(Debug, Clone)]
struct PropagationPlan {
    weighted_edges: Vec<(usize, usize, f32)>,
}

impl PropagationPlan {
    fn build(edges: &EdgeIndex, aggr: Aggregation) -> Self {
        let weighted_edges = match aggr {
            Aggregation::Sum => edges.edges().iter().map(|&(s, t)| (s, t, 1.0)).collect(),
            Aggregation::GcnNorm => {
                let looped = edges.with_remaining_self_loops();
                // 补过自环后每个节点的入度至少为 1
                let deg_inv_sqrt: Vec<f32> = looped
                    .in_degrees()
                    .into_iter()
                    .map(|d| (d as f32).powf(-0.5))
                    .collect();
                looped
                    .edges()
                    .iter()
                    .map(|&(s, t)| (s, t, deg_inv_sqrt[s] * deg_inv_sqrt[t]))
                    .collect()
            }
        };
        Self { weighted_edges }
    }
}

/// 沿边把源节点的特征行加权累加到目标节点：父节点为 `[x, edges]`
#[derive(Debug, Clone)]
pub(in crate::nn) struct Propagate {
    aggr: Aggregation,
    plan: Option<PropagationPlan>,
}

impl Propagate {
    pub(in crate::nn) const fn new(aggr: Aggregation) -> Self {
        Self { aggr, plan: None }
    }

    pub(in crate::nn) const fn aggregation(&self) -> Aggregation {
        self.aggr
    }
}

impl TraitNode for Propagate {
    fn type_name(&self) -> &'static str {
        "Propagate"
    }

    fn calc_value_by_parents(
        &mut self,
        parents: &[&NodeHandle],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let x = value_of(parents[0])?.view2()?;
        let edges = edges_of(parents[1])?;
        check_node_count(x.nrows(), edges, parents[0])?;

        let plan = PropagationPlan::build(edges, self.aggr);
        let mut out = Array2::<f32>::zeros(x.raw_dim());
        for &(s, t, w) in &plan.weighted_edges {
            out.row_mut(t).scaled_add(w, &x.row(s));
        }
        self.plan = Some(plan);
        Ok(Tensor::from_array2(out))
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        _parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if index != 0 {
            return Err(bad_parent_index(self.type_name(), index));
        }
        let plan = self.plan.as_ref().ok_or_else(|| {
            GraphError::ComputationError("Propagate 节点尚未前向传播，无法求梯度".to_string())
        })?;
        // 前向是 out = A x，梯度是 A^T g
        let g = upstream_grad.view2()?;
        let mut dx = Array2::<f32>::zeros(g.raw_dim());
        for &(s, t, w) in &plan.weighted_edges {
            dx.row_mut(s).scaled_add(w, &g.row(t));
        }
        Ok(Tensor::from_array2(dx))
    }
}

/// 取边输入父节点的边列表
pub(super) fn edges_of<'a>(parent: &'a NodeHandle) -> Result<&'a EdgeIndex, GraphError> {
    parent
        .edges()
        .ok_or_else(|| GraphError::ComputationError(format!("{parent}还没有设置边")))
}

/// 边列表的节点数必须与特征矩阵的行数一致
pub(super) fn check_node_count(
    rows: usize,
    edges: &EdgeIndex,
    features: &NodeHandle,
) -> Result<(), GraphError> {
    if edges.node_count() != rows {
        return Err(GraphError::ShapeMismatch {
            expected: vec![edges.node_count()],
            got: vec![rows],
            message: format!("边列表覆盖的节点数与{features}的行数不一致"),
        });
    }
    Ok(())
}
