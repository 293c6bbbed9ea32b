use super::TraitNode;

/// 数据输入节点（节点特征、训练目标等），不接收梯度，值可在每次前向传播前替换
#[derive(Debug, Clone, Default)]
pub(in crate::nn) struct Input;

impl Input {
    pub(in crate::nn) const fn new() -> Self {
        Self
    }
}

impl TraitNode for Input {
    fn type_name(&self) -> &'static str {
        "Input"
    }
}
