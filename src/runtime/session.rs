use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ndarray::{Array2, ArrayView2};
use tracing::debug;

use super::error::RuntimeError;
use super::kernels;
use super::value::{Outputs, Value};
use crate::nn::{DType, FrozenGraph, FrozenNode, FrozenOp, TensorInfo};

/// 运行时环境：创建会话并统计存活的会话数
#[derive(Debug, Clone)]
pub struct Environment {
    name: String,
    live_sessions: Rc<Cell<usize>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new("only_gnn")
    }
}

impl Environment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            live_sessions: Rc::new(Cell::new(0)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 当前存活（尚未 drop）的会话数
    pub fn live_sessions(&self) -> usize {
        self.live_sessions.get()
    }

    /// 从文件加载冻结图并创建会话
    ///
    /// 文件不存在报 [`RuntimeError::Io`]，内容不合法报 [`RuntimeError::Format`]。
    pub fn create_session<P: AsRef<Path>>(&self, path: P) -> Result<Session, RuntimeError> {
        let path = path.as_ref();
        let graph = FrozenGraph::load(path)?;
        let mut session = self.session_from_graph(graph)?;
        session.source = Some(path.to_path_buf());
        Ok(session)
    }

    /// 直接从内存中的冻结图创建会话
    pub fn session_from_graph(&self, graph: FrozenGraph) -> Result<Session, RuntimeError> {
        let constants = check_graph(&graph)?;
        self.live_sessions.set(self.live_sessions.get() + 1);
        debug!(
            env = %self.name,
            graph = %graph.name,
            ops = graph.nodes.len(),
            live = self.live_sessions.get(),
            "已创建推理会话"
        );
        Ok(Session {
            graph,
            constants,
            source: None,
            live_sessions: Rc::clone(&self.live_sessions),
        })
    }
}

/// 一个已加载的推理图
pub struct Session {
    graph: FrozenGraph,
    /// 初始化器，创建会话时已转成矩阵
    constants: HashMap<String, Array2<f32>>,
    source: Option<PathBuf>,
    live_sessions: Rc<Cell<usize>>,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.live_sessions
            .set(self.live_sessions.get().saturating_sub(1));
        debug!(graph = %self.graph.name, "推理会话已释放");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("graph", &self.graph.name)
            .field("source", &self.source)
            .finish()
    }
}

/// 执行期的中间值：浮点矩阵或已校验的边列表
enum Slot<'a> {
    Dense(ArrayView2<'a, f32>),
    Owned(Array2<f32>),
    Edges(Vec<(usize, usize)>),
}

impl Session {
    pub fn input_info(&self) -> &[TensorInfo] {
        &self.graph.inputs
    }

    pub fn output_info(&self) -> &[TensorInfo] {
        &self.graph.outputs
    }

    pub fn graph(&self) -> &FrozenGraph {
        &self.graph
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 执行推理图
    ///
    /// 输入名必须与声明一一对应，类型与形状必须和声明完全一致，
    /// 边下标必须落在 `[0, 节点数)` 内，其中节点数取自第一个声明的 F32 输入的行数
    /// （导出的图只有 `nodes` 一个 F32 输入）。各聚合算子执行时还会再用
    /// 实际参与聚合的矩阵行数检查一次边端点，不一致时返回 [`RuntimeError::Execution`]。
    pub fn run(&self, inputs: HashMap<&str, Value>) -> Result<Outputs, RuntimeError> {
        self.check_inputs(&inputs)?;
        let node_count = self
            .graph
            .inputs
            .iter()
            .find(|info| info.dtype == DType::F32)
            .and_then(|info| info.shape.first().copied());

        let mut slots: HashMap<&str, Slot<'_>> = HashMap::new();
        for (name, array) in &self.constants {
            slots.insert(name, Slot::Dense(array.view()));
        }
        for info in &self.graph.inputs {
            let slot = match &inputs[info.name.as_str()] {
                Value::F32(a) => Slot::Dense(a.view()),
                Value::I64(a) => {
                    let n = node_count.ok_or_else(|| {
                        RuntimeError::Format("边输入需要一个 F32 节点输入来确定节点数".to_string())
                    })?;
                    let pairs = kernels::edge_pairs(a.view(), n).map_err(|(edge, s, t)| {
                        RuntimeError::EdgeOutOfRange {
                            edge,
                            source_node: s,
                            target_node: t,
                            node_count: n,
                        }
                    })?;
                    Slot::Edges(pairs)
                }
            };
            slots.insert(&info.name, slot);
        }

        for node in &self.graph.nodes {
            let value = execute(node, &slots).map_err(|message| RuntimeError::Execution {
                node: node.name.clone(),
                message,
            })?;
            slots.insert(&node.output, Slot::Owned(value));
        }

        let mut outputs = Outputs::default();
        for info in &self.graph.outputs {
            let value = match slots.remove(info.name.as_str()) {
                Some(Slot::Owned(a)) => a,
                Some(Slot::Dense(view)) => view.to_owned(),
                _ => return Err(RuntimeError::UnknownOutput(info.name.clone())),
            };
            outputs.insert(&info.name, Value::F32(value));
        }
        Ok(outputs)
    }

    fn check_inputs(&self, inputs: &HashMap<&str, Value>) -> Result<(), RuntimeError> {
        if let Some(name) = inputs.keys().find(|name| self.graph.input(name).is_none()) {
            return Err(RuntimeError::UnknownInput(name.to_string()));
        }
        for info in &self.graph.inputs {
            let value = inputs
                .get(info.name.as_str())
                .ok_or_else(|| RuntimeError::MissingInput(info.name.clone()))?;
            if value.dtype() != info.dtype {
                return Err(RuntimeError::DTypeMismatch {
                    name: info.name.clone(),
                    expected: info.dtype,
                    got: value.dtype(),
                });
            }
            if value.shape() != info.shape.as_slice() {
                return Err(RuntimeError::ShapeMismatch {
                    name: info.name.clone(),
                    expected: info.shape.clone(),
                    got: value.shape().to_vec(),
                });
            }
        }
        Ok(())
    }
}

fn execute(node: &FrozenNode, slots: &HashMap<&str, Slot<'_>>) -> Result<Array2<f32>, String> {
    let name = |i: usize| node.inputs[i].as_str();
    match node.op {
        FrozenOp::MatMul => kernels::matmul(dense(slots, name(0))?, dense(slots, name(1))?),
        FrozenOp::Add => kernels::add(dense(slots, name(0))?, dense(slots, name(1))?),
        FrozenOp::Relu => Ok(kernels::relu(dense(slots, name(0))?)),
        FrozenOp::Propagate { aggr } => kernels::propagate(
            dense(slots, name(0))?,
            edge_list(slots, name(1))?,
            aggr,
        ),
        FrozenOp::GatAttention { negative_slope } => kernels::gat_attention(
            dense(slots, name(0))?,
            dense(slots, name(1))?,
            dense(slots, name(2))?,
            edge_list(slots, name(3))?,
            negative_slope,
        ),
    }
}

fn dense<'s>(
    slots: &'s HashMap<&str, Slot<'_>>,
    name: &str,
) -> Result<ArrayView2<'s, f32>, String> {
    match slots.get(name) {
        Some(Slot::Dense(v)) => Ok(v.view()),
        Some(Slot::Owned(a)) => Ok(a.view()),
        Some(Slot::Edges(_)) => Err(format!("{name} 是边输入，不能参与浮点运算")),
        None => Err(format!("找不到值 {name}")),
    }
}

fn edge_list<'s>(
    slots: &'s HashMap<&str, Slot<'_>>,
    name: &str,
) -> Result<&'s [(usize, usize)], String> {
    match slots.get(name) {
        Some(Slot::Edges(pairs)) => Ok(pairs.as_slice()),
        _ => Err(format!("{name} 不是边输入")),
    }
}

const fn arity(op: &FrozenOp) -> usize {
    match op {
        FrozenOp::Relu => 1,
        FrozenOp::MatMul | FrozenOp::Add | FrozenOp::Propagate { .. } => 2,
        FrozenOp::GatAttention { .. } => 4,
    }
}

/// 加载时的结构校验：初始化器数据完整，每个算子的输入都在它之前定义，声明的输出都会被产出
fn check_graph(graph: &FrozenGraph) -> Result<HashMap<String, Array2<f32>>, RuntimeError> {
    let format_err = |msg: String| RuntimeError::Format(format!("{}: {msg}", graph.name));

    let mut constants = HashMap::with_capacity(graph.initializers.len());
    for init in &graph.initializers {
        let [rows, cols] = init.shape[..] else {
            return Err(format_err(format!(
                "初始化器 {} 的形状 {:?} 不是矩阵",
                init.name, init.shape
            )));
        };
        let array = Array2::from_shape_vec((rows, cols), init.data.clone()).map_err(|_| {
            format_err(format!(
                "初始化器 {} 有 {} 个数，与形状 {:?} 不符",
                init.name,
                init.data.len(),
                init.shape
            ))
        })?;
        constants.insert(init.name.clone(), array);
    }

    let mut defined: HashSet<&str> = constants.keys().map(String::as_str).collect();
    for info in &graph.inputs {
        if info.shape.len() != 2 {
            return Err(format_err(format!("输入 {} 必须是二维的", info.name)));
        }
        if info.dtype == DType::I64 && info.shape[0] != 2 {
            return Err(format_err(format!("边输入 {} 的形状必须是 [2, E]", info.name)));
        }
        if !defined.insert(&info.name) {
            return Err(format_err(format!("值 {} 被重复定义", info.name)));
        }
    }
    for node in &graph.nodes {
        if node.inputs.len() != arity(&node.op) {
            return Err(format_err(format!(
                "算子 {}（{:?}）需要 {} 个输入，实际 {} 个",
                node.name,
                node.op,
                arity(&node.op),
                node.inputs.len()
            )));
        }
        if let Some(missing) = node.inputs.iter().find(|i| !defined.contains(i.as_str())) {
            return Err(format_err(format!(
                "算子 {} 引用了未定义的值 {missing}",
                node.name
            )));
        }
        if !defined.insert(&node.output) {
            return Err(format_err(format!("值 {} 被重复定义", node.output)));
        }
    }
    if graph.outputs.is_empty() {
        return Err(format_err("没有声明输出".to_string()));
    }
    if let Some(info) = graph
        .outputs
        .iter()
        .find(|info| info.dtype != DType::F32 || !graph.nodes.iter().any(|n| n.output == info.name))
    {
        return Err(format_err(format!("输出 {} 不是由算子产出的 F32 值", info.name)));
    }
    Ok(constants)
}
