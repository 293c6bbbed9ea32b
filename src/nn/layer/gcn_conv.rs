/*
 * @Author       : 老董
 * @Date         : 2026-02-01
 * @Description  : GcnConv 图卷积层
 */

use crate::nn::{Aggregation, Graph, GraphError, Init, Module, Var, VarMatrixOps, VarMessageOps};

/// 图卷积层（Kipf & Welling）
///
/// `out = D^-1/2 (A + I) D^-1/2 (x @ W) + b`
///
/// 自环按"缺失才补"的规则添加，度数取目标节点的入度（含自环）。
pub struct GcnConv {
    weights: Var,
    bias: Var,
    in_features: usize,
    out_features: usize,
}

impl GcnConv {
    /// 权重 Xavier 初始化，偏置零初始化；参数命名为 `{name}_W` / `{name}_b`
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
        let bias = graph.parameter(&[1, out_features], Init::Zeros, &format!("{name}_b"))?;
        Ok(Self {
            weights,
            bias,
            in_features,
            out_features,
        })
    }

    pub fn forward(&self, x: &Var, edges: &Var) -> Result<Var, GraphError> {
        x.matmul(&self.weights)?
            .propagate(edges, Aggregation::GcnNorm)?
            .try_add(&self.bias)
    }

    pub const fn in_features(&self) -> usize {
        self.in_features
    }

    pub const fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for GcnConv {
    fn parameters(&self) -> Vec<Var> {
        vec![self.weights.clone(), self.bias.clone()]
    }
}
