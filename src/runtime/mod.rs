//! # runtime
//!
//! 独立于训练框架的推理运行时：加载 [`FrozenGraph`](crate::nn::FrozenGraph) 产物，
//! 校验输入后用自己的 `ndarray` 算子按拓扑顺序执行。
//!
//! ```ignore
//! let env = Environment::new("smoke");
//! let session = env.create_session("gnn.ogfg")?;
//! let outputs = session.run(HashMap::from([
//!     ("nodes", Value::F32(features)),
//!     ("edges", Value::I64(edges)),
//! ]))?;
//! let logits = outputs.f32("logits")?;
//! ```
//!
//! 会话与 [`Value`] 都按 RAII 释放；[`Environment`] 记录存活的会话数。

mod error;
mod kernels;
mod session;
mod smoke;
mod value;

pub use error::RuntimeError;
pub use session::{Environment, Session};
pub use smoke::{SmokeReport, random_inputs, smoke_test};
pub use value::{Outputs, Value};

#[cfg(test)]
mod tests;
