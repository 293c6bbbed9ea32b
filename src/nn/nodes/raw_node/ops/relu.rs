use super::bad_parent_index;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, value_of};
use crate::nn::nodes::{ForwardContext, NodeHandle};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Default)]
pub(in crate::nn) struct ReLU;

impl ReLU {
    pub(in crate::nn) const fn new() -> Self {
        Self
    }
}

impl TraitNode for ReLU {
    fn type_name(&self) -> &'static str {
        "ReLU"
    }

    fn calc_value_by_parents(
        &mut self,
        parents: &[&NodeHandle],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        Ok(value_of(parents[0])?.map(|x| x.max(0.0)))
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if index != 0 {
            return Err(bad_parent_index(self.type_name(), index));
        }
        let local_grad = value_of(parents[0])?.map(|x| if x > 0.0 { 1.0 } else { 0.0 });
        Ok(upstream_grad * &local_grad)
    }
}
