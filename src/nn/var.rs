/*
 * @Author       : 老董
 * @Date         : 2026-01-08
 * @Description  : Smart Var - 智能变量句柄，支持链式调用
 */

use super::graph::{Graph, GraphInner};
use super::{GraphError, NodeId};
use crate::data::EdgeIndex;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`）
    Kaiming,
    /// Xavier/Glorot 均匀分布初始化，`shape` 为 `[1, m]` 的注意力向量同样适用
    Xavier,
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut StdRng) -> Tensor {
        match self {
            Self::Constant(v) => &Tensor::ones(shape) * *v,
            Self::Zeros => Tensor::zeros(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Kaiming => {
                let fan_in = shape[0];
                let std = (2.0 / fan_in as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
            Self::Xavier => {
                let (fan_in, fan_out) = (shape[0], shape.get(1).copied().unwrap_or(1));
                let bound = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::uniform_with_rng(-bound, bound, shape, rng)
            }
        }
    }
}

// ==================== Var 结构 ====================

/// 智能变量句柄 - 携带图引用，支持链式调用
///
/// # 设计原则
/// - 持有 `Rc<RefCell<GraphInner>>` 引用
/// - Clone 语义（非 Copy），但开销极低（Rc clone）
///
/// # 使用示例
/// ```ignore
/// let graph = Graph::new_with_seed(42);
/// let x = graph.input(&features)?;
/// let edges = graph.edge_input(&edge_index, "edges")?;
/// let h = x.matmul(&w)?.propagate(&edges, Aggregation::GcnNorm)?.relu()?;
/// let loss = h.masked_cross_entropy(&target)?;
/// loss.backward()?;
/// ```
#[derive(Clone)]
pub struct Var {
    /// 节点 ID
    id: NodeId,
    /// 图引用（用户不可见）
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var").field("id", &self.id).finish()
    }
}

impl Var {
    /// 创建新的 Var（内部使用）
    pub(crate) const fn new(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    /// 获取节点 ID
    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    /// 获取内部图引用（供 trait 和内部模块使用）
    pub(crate) const fn graph(&self) -> &Rc<RefCell<GraphInner>> {
        &self.graph
    }

    /// 检查两个 Var 是否来自同一个 Graph
    pub fn same_graph(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    /// 获取 Var 所属的 Graph handle
    pub fn get_graph(&self) -> Graph {
        Graph::from_rc(Rc::clone(&self.graph))
    }

    /// 节点名称
    pub fn name(&self) -> Result<String, GraphError> {
        Ok(self.graph.borrow().get_node_name(self.id)?.to_string())
    }

    /// 在同一张图上创建以 `self` 和 `others` 为父节点的新节点
    pub(crate) fn derive<F>(&self, others: &[&Self], build: F) -> Result<Self, GraphError>
    where
        F: FnOnce(&mut GraphInner) -> Result<NodeId, GraphError>,
    {
        if others.iter().any(|other| !self.same_graph(other)) {
            return Err(GraphError::InvalidOperation(
                "不能对来自不同 Graph 的 Var 进行运算".to_string(),
            ));
        }
        let id = build(&mut self.graph.borrow_mut())?;
        Ok(Self::new(id, Rc::clone(&self.graph)))
    }

    // ==================== 执行 ====================

    /// 前向传播
    pub fn forward(&self) -> Result<(), GraphError> {
        self.graph.borrow_mut().forward(self.id)
    }

    /// 反向传播（ensure-forward 语义）
    ///
    /// 先执行 forward() 确保 loss 值已计算，再反向传播，返回 loss 的标量值。
    pub fn backward(&self) -> Result<f32, GraphError> {
        let mut g = self.graph.borrow_mut();
        g.forward(self.id)?;
        g.backward(self.id)
    }

    // ==================== 值访问和设置 ====================

    /// 获取节点的值（克隆的 Tensor）
    pub fn value(&self) -> Result<Option<Tensor>, GraphError> {
        Ok(self.graph.borrow().get_node_value(self.id)?.cloned())
    }

    /// 设置输入或参数节点的值
    pub fn set_value(&self, value: &Tensor) -> Result<(), GraphError> {
        self.graph.borrow_mut().set_node_value(self.id, Some(value))
    }

    /// 设置边输入节点的边
    pub fn set_edges(&self, edges: &EdgeIndex) -> Result<(), GraphError> {
        self.graph.borrow_mut().set_node_edges(self.id, edges.clone())
    }

    /// 获取标量值（假设是 1x1 Tensor）
    pub fn item(&self) -> Result<f32, GraphError> {
        let val = self
            .value()?
            .ok_or_else(|| GraphError::ComputationError(format!("{:?} 没有值", self.id)))?;
        val.get_data_number()
            .ok_or_else(|| GraphError::InvalidOperation("Tensor 不是标量".to_string()))
    }

    /// 获取节点的梯度
    pub fn grad(&self) -> Result<Option<Tensor>, GraphError> {
        Ok(self.graph.borrow().get_node_grad(self.id)?.cloned())
    }

    /// 逐元素加法，`other` 可为按行广播的 `[1, m]`
    pub fn try_add(&self, other: &Self) -> Result<Self, GraphError> {
        self.derive(&[other], |g| g.new_add_node(self.id, other.id, None))
    }
}
