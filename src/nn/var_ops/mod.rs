/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 扩展 trait 模块
 *
 * 按功能领域组织 Var 的扩展方法，用户按需 import。
 *
 * # 模块结构
 * - `activation`: 激活与正则（relu, dropout, relu_dropout）
 * - `loss`: 带掩码的损失（masked_cross_entropy）
 * - `matrix`: 稠密变换（matmul, affine）
 * - `message`: 图上的消息传递（propagate, gat_attention）
 *
 * # 使用示例
 * ```ignore
 * use only_gnn::nn::{Aggregation, VarActivationOps, VarLossOps, VarMatrixOps, VarMessageOps};
 *
 * let h = x.matmul(&w)?.propagate(&edges, Aggregation::GcnNorm)?.relu()?;
 * let loss = h.dropout(0.5)?.matmul(&w2)?.masked_cross_entropy(&labels)?;
 * ```
 */

mod activation;
mod loss;
mod matrix;
mod message;

pub use activation::VarActivationOps;
pub use loss::VarLossOps;
pub use matrix::VarMatrixOps;
pub use message::VarMessageOps;
