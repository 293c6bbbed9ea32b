/*
 * @Author       : 老董
 * @Date         : 2025-12-22
 * @Description  : Layer 模块 - 组合 Node 构建常见网络结构
 *
 * Layer 不是新的抽象层，只是把参数创建和前向连线打包在一起：
 * - `Linear`: 全连接层，不使用图结构
 * - `GcnConv`: 对称归一化的图卷积
 * - `GraphConv`: 邻居求和 + 自身变换
 * - `GatConv`: 单头图注意力
 */

mod gat_conv;
mod gcn_conv;
mod graph_conv;
mod linear;

pub use gat_conv::GatConv;
pub use gcn_conv::GcnConv;
pub use graph_conv::GraphConv;
pub use linear::Linear;
