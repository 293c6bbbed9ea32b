use ndarray::{Array2, ArrayView2, Axis};

use super::bad_parent_index;
use super::propagate::{check_node_count, edges_of};
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, value_of};
use crate::nn::nodes::{ForwardContext, NodeHandle};
use crate::tensor::Tensor;

/// 单头图注意力聚合：父节点为 `[h, att_src, att_dst, edges]`
///
/// 对每条边 `j -> i`（补齐自环后）：
/// ```text
/// z_ij = h_j · att_src + h_i · att_dst
/// α_ij = softmax_j(leaky_relu(z_ij))     // 在同一目标 i 的入边上归一化
/// out_i = Σ_j α_ij h_j
/// ```
#[derive(Debug, Clone)]
pub(in crate::nn) struct GatAttention {
    negative_slope: f32,
    cache: Option<AttentionCache>,
}

#[derive(Debug, Clone)]
struct AttentionCache {
    edges: Vec<(usize, usize)>,
    /// leaky_relu 之前的打分
    scores: Vec<f32>,
    alpha: Vec<f32>,
}

impl GatAttention {
    pub(in crate::nn) const fn new(negative_slope: f32) -> Self {
        Self {
            negative_slope,
            cache: None,
        }
    }

    pub(in crate::nn) const fn negative_slope(&self) -> f32 {
        self.negative_slope
    }

    fn leaky_relu(&self, z: f32) -> f32 {
        if z > 0.0 { z } else { self.negative_slope * z }
    }

    /// 打分 z 对源节点项与目标节点项的梯度（按节点汇总）
    fn score_grads(
        &self,
        cache: &AttentionCache,
        h: ArrayView2<'_, f32>,
        g: ArrayView2<'_, f32>,
    ) -> (Vec<f32>, Vec<f32>) {
        let n = h.nrows();
        // dα_ij = g_i · h_j
        let d_alpha: Vec<f32> = cache
            .edges
            .iter()
            .map(|&(j, i)| g.row(i).dot(&h.row(j)))
            .collect();
        // softmax 反向：de_ij = α_ij (dα_ij - Σ_k α_ik dα_ik)
        let mut weighted = vec![0.0f32; n];
        for (k, &(_, i)) in cache.edges.iter().enumerate() {
            weighted[i] += cache.alpha[k] * d_alpha[k];
        }
        let mut d_src = vec![0.0f32; n];
        let mut d_dst = vec![0.0f32; n];
        for (k, &(j, i)) in cache.edges.iter().enumerate() {
            let de = cache.alpha[k] * (d_alpha[k] - weighted[i]);
            let slope = if cache.scores[k] > 0.0 { 1.0 } else { self.negative_slope };
            let dz = de * slope;
            d_src[j] += dz;
            d_dst[i] += dz;
        }
        (d_src, d_dst)
    }
}

impl TraitNode for GatAttention {
    fn type_name(&self) -> &'static str {
        "GatAttention"
    }

    fn calc_value_by_parents(
        &mut self,
        parents: &[&NodeHandle],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let h = value_of(parents[0])?.view2()?;
        let att_src = value_of(parents[1])?.view2()?;
        let att_dst = value_of(parents[2])?.view2()?;
        for (att, parent) in [(&att_src, parents[1]), (&att_dst, parents[2])] {
            if att.nrows() != 1 || att.ncols() != h.ncols() {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![1, h.ncols()],
                    got: att.shape().to_vec(),
                    message: format!("注意力向量{parent}必须是与特征同宽的行向量"),
                });
            }
        }
        let edge_index = edges_of(parents[3])?;
        check_node_count(h.nrows(), edge_index, parents[0])?;

        let n = h.nrows();
        let src_term = h.dot(&att_src.row(0));
        let dst_term = h.dot(&att_dst.row(0));
        let edges = edge_index.with_remaining_self_loops().edges().to_vec();

        let scores: Vec<f32> = edges
            .iter()
            .map(|&(j, i)| src_term[j] + dst_term[i])
            .collect();
        let logits: Vec<f32> = scores.iter().map(|&z| self.leaky_relu(z)).collect();

        // 按目标节点做数值稳定的 softmax
        let mut max = vec![f32::NEG_INFINITY; n];
        for (k, &(_, i)) in edges.iter().enumerate() {
            max[i] = max[i].max(logits[k]);
        }
        let exp: Vec<f32> = edges
            .iter()
            .enumerate()
            .map(|(k, &(_, i))| (logits[k] - max[i]).exp())
            .collect();
        let mut denom = vec![0.0f32; n];
        for (k, &(_, i)) in edges.iter().enumerate() {
            denom[i] += exp[k];
        }
        let alpha: Vec<f32> = edges
            .iter()
            .enumerate()
            .map(|(k, &(_, i))| exp[k] / denom[i])
            .collect();

        let mut out = Array2::<f32>::zeros(h.raw_dim());
        for (k, &(j, i)) in edges.iter().enumerate() {
            out.row_mut(i).scaled_add(alpha[k], &h.row(j));
        }

        self.cache = Some(AttentionCache {
            edges,
            scores,
            alpha,
        });
        Ok(Tensor::from_array2(out))
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let cache = self.cache.as_ref().ok_or_else(|| {
            GraphError::ComputationError("GatAttention 节点尚未前向传播，无法求梯度".to_string())
        })?;
        let h = value_of(parents[0])?.view2()?;
        let g = upstream_grad.view2()?;
        let (d_src, d_dst) = self.score_grads(cache, h, g);

        match index {
            0 => {
                let att_src = value_of(parents[1])?.view2()?;
                let att_dst = value_of(parents[2])?.view2()?;
                let mut dh = Array2::<f32>::zeros(h.raw_dim());
                // 聚合路径：dh_j += α_ij g_i
                for (k, &(j, i)) in cache.edges.iter().enumerate() {
                    dh.row_mut(j).scaled_add(cache.alpha[k], &g.row(i));
                }
                // 打分路径：dh_j += d_src_j * att_src，dh_i += d_dst_i * att_dst
                for (node, mut row) in dh.axis_iter_mut(Axis(0)).enumerate() {
                    row.scaled_add(d_src[node], &att_src.row(0));
                    row.scaled_add(d_dst[node], &att_dst.row(0));
                }
                Ok(Tensor::from_array2(dh))
            }
            1 => Ok(weighted_row_sum(&d_src, h)),
            2 => Ok(weighted_row_sum(&d_dst, h)),
            _ => Err(bad_parent_index(self.type_name(), index)),
        }
    }
}

/// `Σ_n w_n h_n`，结果为 `[1, f]`
fn weighted_row_sum(weights: &[f32], h: ArrayView2<'_, f32>) -> Tensor {
    let mut out = Array2::<f32>::zeros((1, h.ncols()));
    for (n, &w) in weights.iter().enumerate() {
        out.row_mut(0).scaled_add(w, &h.row(n));
    }
    Tensor::from_array2(out)
}
