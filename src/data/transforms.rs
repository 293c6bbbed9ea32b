//! 数据变换函数
//!
//! 提供常用的特征预处理操作。

use crate::errors::TensorError;
use crate::tensor::Tensor;

/// 按行归一化特征，使每行之和为 1（全零行保持为零），对应 PyG 的 `NormalizeFeatures`
///
/// # 参数
/// - `features`: 输入特征，形状 [node_count, feature_dim]
///
/// # 返回
/// 归一化后的特征，形状不变
pub fn normalize_features(features: &Tensor) -> Result<Tensor, TensorError> {
    let mut out = features.view2()?.to_owned();
    for mut row in out.rows_mut() {
        let sum = row.sum();
        if sum != 0.0 {
            row.mapv_inplace(|x| x / sum);
        }
    }
    Ok(Tensor::from_array2(out))
}

/// 将类别索引转换为 one-hot 编码
///
/// # 参数
/// - `labels`: 类别索引，值为 0..num_classes（越界的标签对应全零行）
/// - `num_classes`: 类别总数
///
/// # 返回
/// one-hot 编码 Tensor，形状 [N, num_classes]
pub fn one_hot(labels: &[usize], num_classes: usize) -> Tensor {
    let n = labels.len();
    let mut data = vec![0.0; n * num_classes];
    for (i, &class_idx) in labels.iter().enumerate() {
        if class_idx < num_classes {
            data[i * num_classes + class_idx] = 1.0;
        }
    }
    Tensor::new(&data, &[n, num_classes])
}

/// 只对掩码选中的节点做 one-hot，未选中的行全为零
///
/// 作为交叉熵损失的目标输入时，全零行不参与损失，从而实现按掩码计算损失。
pub fn masked_one_hot(labels: &[usize], mask: &[bool], num_classes: usize) -> Tensor {
    let n = labels.len();
    let mut data = vec![0.0; n * num_classes];
    for (i, (&class_idx, &selected)) in labels.iter().zip(mask).enumerate() {
        if selected && class_idx < num_classes {
            data[i * num_classes + class_idx] = 1.0;
        }
    }
    Tensor::new(&data, &[n, num_classes])
}
