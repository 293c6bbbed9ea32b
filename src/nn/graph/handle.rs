/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : Graph 句柄（用户级 API）
 */

use super::error::GraphError;
use super::inner::GraphInner;
use crate::data::EdgeIndex;
use crate::nn::descriptor::FrozenGraph;
use crate::nn::var::{Init, Var};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Graph - 计算图句柄（PyTorch 风格用户 API）
///
/// # 设计原则
/// - 是 `Rc<RefCell<GraphInner>>` 的薄封装
/// - Clone 语义：多个 Graph 引用同一个 GraphInner
/// - 创建的 Var 自动持有图引用
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Graph {
    // ==================== 创建 ====================

    /// 创建带种子的图（用于确定性训练）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::from_inner(GraphInner::new_with_seed(seed))
    }

    /// 创建带名称和种子的图
    pub fn with_name_and_seed(name: &str, seed: u64) -> Self {
        Self::from_inner(GraphInner::with_name_and_seed(name, seed))
    }

    /// 从现有 GraphInner 创建句柄
    pub fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// 从现有 Rc 创建句柄
    pub(crate) const fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    /// 获取内部 GraphInner 的不可变引用
    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    /// 获取内部 Rc（供优化器等持有图引用的组件使用）
    pub(crate) fn inner_rc(&self) -> Rc<RefCell<GraphInner>> {
        Rc::clone(&self.inner)
    }

    // ==================== 创建节点 ====================

    /// 创建带初值的数据输入节点
    pub fn input(&self, data: &Tensor) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let node_id = g.new_input_node(None)?;
        g.set_node_value(node_id, Some(data))?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建带初值的命名数据输入节点
    pub fn input_named(&self, data: &Tensor, name: &str) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let node_id = g.new_input_node(Some(name))?;
        g.set_node_value(node_id, Some(data))?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建暂无值的命名数据输入节点（前向传播前用 `Var::set_value` 赋值）
    pub fn input_placeholder(&self, name: &str) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_input_node(Some(name))?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建带边列表的边输入节点
    pub fn edge_input(&self, edges: &EdgeIndex, name: &str) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let node_id = g.new_edge_input_node(Some(name))?;
        g.set_node_edges(node_id, edges.clone())?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建暂无边的边输入节点（前向传播前用 `Var::set_edges` 赋值）
    pub fn edge_placeholder(&self, name: &str) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_edge_input_node(Some(name))?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建参数节点，按 `init` 用图的随机数生成器初始化
    pub fn parameter(&self, shape: &[usize], init: Init, name: &str) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let node_id = g.new_parameter_node(shape, Some(name))?;
        let init_data = init.generate_with_rng(shape, g.rng_mut());
        g.set_node_value(node_id, Some(&init_data))?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    // ==================== 执行 ====================

    // ==================== 训练控制 ====================

    /// 清零所有参数的梯度
    pub fn zero_grad(&self) {
        self.inner.borrow_mut().zero_grad();
    }

    /// 设置训练模式
    pub fn train(&self) {
        self.inner.borrow_mut().set_train_mode();
    }

    /// 设置评估模式
    pub fn eval(&self) {
        self.inner.borrow_mut().set_eval_mode();
    }

    pub fn is_train(&self) -> bool {
        self.inner.borrow().is_train_mode()
    }

    /// 在 eval 模式下执行闭包，结束后恢复原模式
    pub fn no_grad<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let was_train = self.is_train();
        self.eval();
        let result = f();
        if was_train {
            self.train();
        }
        result
    }

    // ==================== 参数与导出 ====================

    /// 保存所有参数
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.inner.borrow().save_params(path)
    }

    /// 加载参数（名称与形状须与图中参数一一对应）
    pub fn load_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.inner.borrow_mut().load_params(path)
    }

    /// 把 `output` 的推理子图冻结为 [`FrozenGraph`]
    pub fn freeze(
        &self,
        graph_name: &str,
        output: &Var,
        output_name: &str,
    ) -> Result<FrozenGraph, GraphError> {
        self.inner
            .borrow_mut()
            .freeze(graph_name, output.node_id(), output_name)
    }
}
