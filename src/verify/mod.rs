//! 导出产物与原模型的数值等价检查

mod equivalence;
mod error;

pub use equivalence::{EquivalenceReport, Tolerance, check_equivalence, verify_artifact};
pub use error::VerifyError;

#[cfg(test)]
mod tests;
