/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : 计算图：节点存储、前向/反向传播、训练/推理模式、参数存取与冻结导出
 *
 * - `Graph`: 共享所有权的句柄，模型与优化器各持一份
 * - `GraphInner`: 实际的节点表与执行逻辑
 * - `GraphError`: 图操作的错误类型
 */

mod error;
mod handle;
mod inner;

pub use error::GraphError;
pub use handle::Graph;
pub use inner::GraphInner;
