/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner 节点构建方法（new_*_node）
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::raw_node::{
    Add, Aggregation, Dropout, EdgeInput, GatAttention, Input, MatMul, Parameter, Propagate, ReLU,
    SoftmaxCrossEntropy, TraitNode,
};
use crate::nn::nodes::{NodeHandle, NodeType};

impl GraphInner {
    /// 添加节点到列表
    fn add_node_to_list<T: Into<NodeType>>(
        &mut self,
        raw_node: T,
        name: Option<&str>,
        parents: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let raw_node: NodeType = raw_node.into();
        for &parent_id in parents {
            let _ = self.get_node(parent_id)?;
        }
        let node_name = self.generate_valid_new_node_name(name.unwrap_or(""), raw_node.type_name())?;
        let node_id = self.generate_valid_node_id();

        self.backward_edges
            .entry(node_id)
            .or_default()
            .extend(parents);

        self.nodes
            .insert(node_id, NodeHandle::new(node_id, &node_name, raw_node));
        Ok(node_id)
    }

    /// 张量算子的操作数不能是边输入
    fn check_tensor_operands(&self, operands: &[NodeId]) -> Result<(), GraphError> {
        for &id in operands {
            let node = self.get_node(id)?;
            if matches!(node.node_type(), NodeType::EdgeInput(_)) {
                return Err(GraphError::InvalidOperation(format!(
                    "{node}是边输入，不能作为张量算子的操作数"
                )));
            }
        }
        Ok(())
    }

    fn check_edge_operand(&self, id: NodeId) -> Result<(), GraphError> {
        let node = self.get_node(id)?;
        if !matches!(node.node_type(), NodeType::EdgeInput(_)) {
            return Err(GraphError::InvalidOperation(format!(
                "消息传递算子需要边输入节点，但{node}不是"
            )));
        }
        Ok(())
    }

    /// 创建数据输入节点（值稍后通过 set_node_value 设置）
    pub fn new_input_node(&mut self, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_node_to_list(Input::new(), name, &[])
    }

    /// 创建边输入节点（边稍后通过 set_node_edges 设置）
    pub fn new_edge_input_node(&mut self, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_node_to_list(EdgeInput::new(), name, &[])
    }

    /// 创建参数节点（值稍后由初始化策略或参数文件设置）
    pub fn new_parameter_node(
        &mut self,
        shape: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.add_node_to_list(Parameter::new(shape)?, name, &[])
    }

    pub fn new_mat_mul_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.check_tensor_operands(&[left, right])?;
        self.add_node_to_list(MatMul::new(), name, &[left, right])
    }

    pub fn new_add_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.check_tensor_operands(&[left, right])?;
        self.add_node_to_list(Add::new(), name, &[left, right])
    }

    pub fn new_relu_node(&mut self, x: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.check_tensor_operands(&[x])?;
        self.add_node_to_list(ReLU::new(), name, &[x])
    }

    pub fn new_dropout_node(
        &mut self,
        x: NodeId,
        p: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.check_tensor_operands(&[x])?;
        self.add_node_to_list(Dropout::new(p)?, name, &[x])
    }

    pub fn new_propagate_node(
        &mut self,
        x: NodeId,
        edges: NodeId,
        aggr: Aggregation,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.check_tensor_operands(&[x])?;
        self.check_edge_operand(edges)?;
        self.add_node_to_list(Propagate::new(aggr), name, &[x, edges])
    }

    pub fn new_gat_attention_node(
        &mut self,
        h: NodeId,
        att_src: NodeId,
        att_dst: NodeId,
        edges: NodeId,
        negative_slope: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.check_tensor_operands(&[h, att_src, att_dst])?;
        self.check_edge_operand(edges)?;
        self.add_node_to_list(
            GatAttention::new(negative_slope),
            name,
            &[h, att_src, att_dst, edges],
        )
    }

    pub fn new_softmax_cross_entropy_node(
        &mut self,
        logits: NodeId,
        target: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.check_tensor_operands(&[logits, target])?;
        self.add_node_to_list(SoftmaxCrossEntropy::new(), name, &[logits, target])
    }
}
