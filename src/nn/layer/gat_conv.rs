/*
 * @Author       : 老董
 * @Date         : 2026-02-02
 * @Description  : GatConv 单头图注意力层
 */

use crate::nn::{Graph, GraphError, Init, Module, Var, VarMatrixOps, VarMessageOps};

/// `LeakyReLU` 默认负斜率
pub const GAT_NEGATIVE_SLOPE: f32 = 0.2;

/// 单头图注意力层（Veličković 等）
///
/// ```text
/// h    = x @ W
/// e_ji = LeakyReLU(<att_src, h_j> + <att_dst, h_i>)
/// α_ji = softmax_j(e_ji)         // 在目标 i 的入边（含自环）上归一化
/// out_i = Σ_j α_ji · h_j + b
/// ```
pub struct GatConv {
    weights: Var,
    att_src: Var,
    att_dst: Var,
    bias: Var,
    in_features: usize,
    out_features: usize,
}

impl GatConv {
    /// 参数命名为 `{name}_W` / `{name}_att_src` / `{name}_att_dst` / `{name}_b`
    pub fn new(
        graph: &Graph,
        in_features: usize,
        out_features: usize,
        name: &str,
    ) -> Result<Self, GraphError> {
        let weights = graph.parameter(
            &[in_features, out_features],
            Init::Xavier,
            &format!("{name}_W"),
        )?;
        let att_src = graph.parameter(&[1, out_features], Init::Xavier, &format!("{name}_att_src"))?;
        let att_dst = graph.parameter(&[1, out_features], Init::Xavier, &format!("{name}_att_dst"))?;
        let bias = graph.parameter(&[1, out_features], Init::Zeros, &format!("{name}_b"))?;
        Ok(Self {
            weights,
            att_src,
            att_dst,
            bias,
            in_features,
            out_features,
        })
    }

    pub fn forward(&self, x: &Var, edges: &Var) -> Result<Var, GraphError> {
        x.matmul(&self.weights)?
            .gat_attention(&self.att_src, &self.att_dst, edges, GAT_NEGATIVE_SLOPE)?
            .try_add(&self.bias)
    }

    pub const fn in_features(&self) -> usize {
        self.in_features
    }

    pub const fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for GatConv {
    fn parameters(&self) -> Vec<Var> {
        vec![
            self.weights.clone(),
            self.att_src.clone(),
            self.att_dst.clone(),
            self.bias.clone(),
        ]
    }
}
