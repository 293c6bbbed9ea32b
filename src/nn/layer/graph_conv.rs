/*
 * @Author       : 老董
 * @Date         : 2026-02-01
 * @Description  : GraphConv 层（邻居求和 + 自身变换）
 */

use crate::nn::{Aggregation, Graph, GraphError, Init, Module, Var, VarMatrixOps, VarMessageOps};

/// `out_i = W_root · x_i + W_rel · Σ_{j→i} x_j + b`
///
/// 邻居求和不加自环；节点自身的贡献由单独的 `W_root`（无偏置）提供。
pub struct GraphConv {
    weights_rel: Var,
    bias: Var,
    weights_root: Var,
    in_features: usize,
    out_features: usize,
}

impl GraphConv {
    /// 参数命名为 `{name}_W_rel` / `{name}_b` / `{name}_W_root`
    pub fn new(
        graph: &Graph,
        in_features: usize,
        out_features: usize,
        name: &str,
    ) -> Result<Self, GraphError> {
        let shape = [in_features, out_features];
        let weights_rel = graph.parameter(&shape, Init::Xavier, &format!("{name}_W_rel"))?;
        let bias = graph.parameter(&[1, out_features], Init::Zeros, &format!("{name}_b"))?;
        let weights_root = graph.parameter(&shape, Init::Xavier, &format!("{name}_W_root"))?;
        Ok(Self {
            weights_rel,
            bias,
            weights_root,
            in_features,
            out_features,
        })
    }

    pub fn forward(&self, x: &Var, edges: &Var) -> Result<Var, GraphError> {
        // 先变换再聚合，与先聚合再变换在数学上等价
        let neighbors = x
            .matmul(&self.weights_rel)?
            .propagate(edges, Aggregation::Sum)?
            .try_add(&self.bias)?;
        neighbors.try_add(&x.matmul(&self.weights_root)?)
    }

    pub const fn in_features(&self) -> usize {
        self.in_features
    }

    pub const fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for GraphConv {
    fn parameters(&self) -> Vec<Var> {
        vec![
            self.weights_rel.clone(),
            self.bias.clone(),
            self.weights_root.clone(),
        ]
    }
}
