/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Module trait 定义
 */

use super::Var;

/// 模块 trait
///
/// # 设计原则
/// - `forward()` **不是** trait 方法（签名各异：`Linear` 只需特征，图卷积层还需边）
/// - `new()` **不是** trait 方法（参数各异）
/// - `parameters()` 返回 `Vec<Var>`（签名一致，放入 trait）
///
/// # 使用示例
///
/// ```ignore
/// use only_gnn::nn::{GcnConv, Graph, Module, Var};
///
/// struct TwoLayerGcn {
///     conv1: GcnConv,
///     conv2: GcnConv,
/// }
///
/// impl Module for TwoLayerGcn {
///     fn parameters(&self) -> Vec<Var> {
///         [self.conv1.parameters(), self.conv2.parameters()].concat()
///     }
/// }
/// ```
pub trait Module {
    /// 获取所有可训练参数（优化器更新与参数统计都依赖它）
    fn parameters(&self) -> Vec<Var>;

    /// 获取参数张量个数
    fn num_params(&self) -> usize {
        self.parameters().len()
    }

    /// 获取参数标量总数
    fn num_scalars(&self) -> usize {
        self.parameters()
            .iter()
            .filter_map(|p| p.value().ok().flatten())
            .map(|v| v.size())
            .sum()
    }
}
