//! 下游使用方的冒烟测试：按声明的形状与类型造随机输入，跑一遍推理图

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::error::RuntimeError;
use super::session::{Environment, Session};
use super::value::Value;
use crate::nn::DType;

/// 冒烟测试中各输入/输出的形状
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeReport {
    pub inputs: Vec<(String, Vec<usize>)>,
    pub outputs: Vec<(String, Vec<usize>)>,
}

impl fmt::Display for SmokeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, shape) in &self.inputs {
            writeln!(f, "input  {name}: {shape:?}")?;
        }
        for (name, shape) in &self.outputs {
            writeln!(f, "output {name}: {shape:?}")?;
        }
        Ok(())
    }
}

/// 为会话的每个输入生成随机值
///
/// F32 输入取 `[0, 1)` 均匀分布；I64（边）输入取 `[0, 节点数)`，
/// 节点数为 F32 输入的行数。
pub fn random_inputs(session: &Session, seed: u64) -> Result<HashMap<&str, Value>, RuntimeError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let node_count = session
        .input_info()
        .iter()
        .find(|info| info.dtype == DType::F32)
        .map(|info| info.shape[0]);

    let mut inputs = HashMap::new();
    for info in session.input_info() {
        let (rows, cols) = (info.shape[0], info.shape[1]);
        let value = match info.dtype {
            DType::F32 => Value::F32(Array2::from_shape_fn((rows, cols), |_| rng.r#gen::<f32>())),
            DType::I64 => {
                let n = node_count.filter(|&n| n > 0).ok_or_else(|| {
                    RuntimeError::Format(format!("无法为边输入 {} 确定节点数", info.name))
                })?;
                Value::I64(Array2::from_shape_fn((rows, cols), |_| {
                    rng.gen_range(0..n as i64)
                }))
            }
        };
        inputs.insert(info.name.as_str(), value);
    }
    Ok(inputs)
}

/// 加载推理图、喂随机输入、返回输入与输出的形状
pub fn smoke_test<P: AsRef<Path>>(path: P, seed: u64) -> Result<SmokeReport, RuntimeError> {
    let env = Environment::new("smoke");
    let session = env.create_session(path.as_ref())?;
    let inputs = random_inputs(&session, seed)?;
    let input_shapes = session
        .input_info()
        .iter()
        .filter_map(|info| {
            let value = inputs.get(info.name.as_str())?;
            Some((info.name.clone(), value.shape().to_vec()))
        })
        .collect();
    let outputs = session.run(inputs)?;
    let output_shapes = session
        .output_info()
        .iter()
        .filter_map(|info| {
            let value = outputs.get(&info.name)?;
            Some((info.name.clone(), value.shape().to_vec()))
        })
        .collect();
    info!(path = %path.as_ref().display(), "冒烟测试完成");
    Ok(SmokeReport {
        inputs: input_shapes,
        outputs: output_shapes,
    })
}
