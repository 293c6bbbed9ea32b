/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : GraphInner 冻结：把某个输出节点的推理子图导出为 FrozenGraph
 *
 * - 只保留输出节点的祖先
 * - Dropout 折叠为恒等（其输出直接引用输入）
 * - 参数变成初始化器，数据输入/边输入变成带固定形状的图输入
 * - 损失等训练专用节点不能出现在推理子图中
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::descriptor::{DType, FrozenGraph, FrozenNode, FrozenOp, Initializer, TensorInfo};
use crate::nn::nodes::NodeType;
use std::collections::HashMap;

impl GraphInner {
    /// 冻结 `output` 的推理子图，输出值命名为 `output_name`
    ///
    /// 所有输入必须已有值（通常先以样例输入执行一次前向传播），
    /// 图输入与输出的形状取自当前的值。
    pub fn freeze(
        &mut self,
        graph_name: &str,
        output: NodeId,
        output_name: &str,
    ) -> Result<FrozenGraph, GraphError> {
        let output_node = self.get_node(output)?;
        if output_node.is_leaf() {
            return Err(GraphError::InvalidOperation(format!(
                "{output_node}不是算子节点，不能作为推理图的输出"
            )));
        }
        // 以 eval 模式前向传播，确保输出形状与推理一致
        self.no_grad_scope(|g| g.forward(output))?;

        let mut frozen = FrozenGraph::new(graph_name);
        // 节点 -> 它在冻结图中的值名称
        let mut value_names: HashMap<NodeId, String> = HashMap::new();

        for node_id in self.topological_order(output)? {
            let node = self.get_node(node_id)?;
            let parent_names = self
                .get_node_parents(node_id)?
                .iter()
                .map(|p| {
                    value_names.get(p).cloned().ok_or_else(|| {
                        GraphError::ComputationError(format!("父节点{p:?}尚未被冻结"))
                    })
                })
                .collect::<Result<Vec<String>, _>>()?;

            let op = match node.node_type() {
                NodeType::Input(_) => {
                    let value = node.value().ok_or_else(|| {
                        GraphError::InvalidOperation(format!("冻结前{node}必须有值"))
                    })?;
                    frozen.inputs.push(TensorInfo {
                        name: node.name().to_string(),
                        dtype: DType::F32,
                        shape: value.shape().to_vec(),
                    });
                    value_names.insert(node_id, node.name().to_string());
                    continue;
                }
                NodeType::EdgeInput(_) => {
                    let edges = node.edges().ok_or_else(|| {
                        GraphError::InvalidOperation(format!("冻结前{node}必须设置边"))
                    })?;
                    frozen.inputs.push(TensorInfo {
                        name: node.name().to_string(),
                        dtype: DType::I64,
                        shape: vec![2, edges.len()],
                    });
                    value_names.insert(node_id, node.name().to_string());
                    continue;
                }
                NodeType::Parameter(_) => {
                    let value = node.value().ok_or_else(|| {
                        GraphError::InvalidOperation(format!("冻结前{node}必须有值"))
                    })?;
                    frozen.initializers.push(Initializer {
                        name: node.name().to_string(),
                        shape: value.shape().to_vec(),
                        data: value.to_vec(),
                    });
                    value_names.insert(node_id, node.name().to_string());
                    continue;
                }
                NodeType::Dropout(_) => {
                    if node_id == output {
                        return Err(GraphError::InvalidOperation(
                            "推理图的输出不能是 Dropout".to_string(),
                        ));
                    }
                    value_names.insert(node_id, parent_names[0].clone());
                    continue;
                }
                NodeType::MatMul(_) => FrozenOp::MatMul,
                NodeType::Add(_) => FrozenOp::Add,
                NodeType::ReLU(_) => FrozenOp::Relu,
                NodeType::Propagate(propagate) => FrozenOp::Propagate {
                    aggr: propagate.aggregation(),
                },
                NodeType::GatAttention(attention) => FrozenOp::GatAttention {
                    negative_slope: attention.negative_slope(),
                },
                NodeType::SoftmaxCrossEntropy(_) => {
                    return Err(GraphError::InvalidOperation(format!(
                        "{node}是训练专用节点，不能冻结"
                    )));
                }
            };

            let value_name = if node_id == output {
                output_name.to_string()
            } else {
                node.name().to_string()
            };
            frozen.nodes.push(FrozenNode {
                name: node.name().to_string(),
                op,
                inputs: parent_names,
                output: value_name.clone(),
            });
            value_names.insert(node_id, value_name);
        }

        let output_node = self.get_node(output)?;
        let output_shape = output_node
            .value()
            .map(|v| v.shape().to_vec())
            .ok_or_else(|| GraphError::ComputationError(format!("{output_node}没有值")))?;
        frozen.outputs.push(TensorInfo {
            name: output_name.to_string(),
            dtype: DType::F32,
            shape: output_shape,
        });
        Ok(frozen)
    }
}
