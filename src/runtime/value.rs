use std::collections::HashMap;

use ndarray::Array2;

use super::error::RuntimeError;
use crate::data::EdgeIndex;
use crate::nn::DType;
use crate::tensor::Tensor;

/// 运行时的输入/输出值，拥有自己的数据，离开作用域即释放
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    F32(Array2<f32>),
    I64(Array2<i64>),
}

impl Value {
    pub const fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I64(_) => DType::I64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Self::F32(a) => a.shape(),
            Self::I64(a) => a.shape(),
        }
    }

    pub const fn as_f32(&self) -> Option<&Array2<f32>> {
        match self {
            Self::F32(a) => Some(a),
            Self::I64(_) => None,
        }
    }

    pub const fn as_i64(&self) -> Option<&Array2<i64>> {
        match self {
            Self::I64(a) => Some(a),
            Self::F32(_) => None,
        }
    }

    /// 从矩阵张量构造 `F32` 值
    pub fn from_tensor(tensor: &Tensor) -> Result<Self, RuntimeError> {
        let view = tensor
            .view2()
            .map_err(|e| RuntimeError::Format(e.to_string()))?;
        Ok(Self::F32(view.to_owned()))
    }

    /// 边列表的 `[2, E]` i64 布局
    pub fn from_edges(edges: &EdgeIndex) -> Self {
        Self::I64(edges.to_matrix())
    }
}

impl From<Array2<f32>> for Value {
    fn from(a: Array2<f32>) -> Self {
        Self::F32(a)
    }
}

impl From<Array2<i64>> for Value {
    fn from(a: Array2<i64>) -> Self {
        Self::I64(a)
    }
}

/// 一次 `run` 的命名输出
#[derive(Debug, Clone, Default)]
pub struct Outputs {
    values: HashMap<String, Value>,
}

impl Outputs {
    pub(super) fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// 取 `F32` 输出
    pub fn f32(&self, name: &str) -> Result<&Array2<f32>, RuntimeError> {
        self.get(name)
            .and_then(Value::as_f32)
            .ok_or_else(|| RuntimeError::UnknownOutput(name.to_string()))
    }

    /// 取出 `F32` 输出的所有权
    pub fn take_f32(&mut self, name: &str) -> Result<Array2<f32>, RuntimeError> {
        match self.values.remove(name) {
            Some(Value::F32(a)) => Ok(a),
            Some(other) => {
                self.values.insert(name.to_string(), other);
                Err(RuntimeError::UnknownOutput(name.to_string()))
            }
            None => Err(RuntimeError::UnknownOutput(name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
