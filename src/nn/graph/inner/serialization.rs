/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner 底层参数序列化（save_params/load_params）
 *
 * 职责：纯二进制序列化，只处理参数的读写。文件布局（小端）：
 * 魔数 | 版本 u32 | 参数个数 u32 | { 名称长度 u32 | 名称 | 维数 u32 | 各维 u32 | f32 数据 }*
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::tensor::Tensor;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

impl GraphInner {
    /// 参数文件魔数
    const PARAMS_MAGIC: &'static [u8; 4] = b"OGPR";
    /// 参数文件版本
    const PARAMS_VERSION: u32 = 1;

    /// 保存所有可训练参数到二进制文件（按创建顺序）
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        let param_ids = self.get_trainable_nodes();

        writer.write_all(Self::PARAMS_MAGIC)?;
        writer.write_all(&Self::PARAMS_VERSION.to_le_bytes())?;
        writer.write_all(&(param_ids.len() as u32).to_le_bytes())?;

        for id in param_ids {
            let node = self.get_node(id)?;
            let value = node
                .value()
                .ok_or_else(|| GraphError::ComputationError(format!("参数{node}没有值")))?;

            let name_bytes = node.name().as_bytes();
            writer.write_all(&(name_bytes.len() as u32).to_le_bytes())?;
            writer.write_all(name_bytes)?;

            writer.write_all(&(value.dimension() as u32).to_le_bytes())?;
            for &dim in value.shape() {
                writer.write_all(&(dim as u32).to_le_bytes())?;
            }
            for val in value.to_vec() {
                writer.write_all(&val.to_le_bytes())?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// 从二进制文件加载参数
    ///
    /// 文件中的参数必须与图中的参数一一对应（名称与形状都相同），否则报错且不修改任何参数。
    pub fn load_params<P: AsRef<Path>>(&mut self, path: P) -> Result<(), GraphError> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != Self::PARAMS_MAGIC {
            return Err(GraphError::FormatError(
                "这不是 only_gnn 格式的参数文件，请确保使用 save_params() 保存".to_string(),
            ));
        }
        let version = read_u32(&mut reader)?;
        if version != Self::PARAMS_VERSION {
            return Err(GraphError::FormatError(format!(
                "不支持的参数文件版本: {version}"
            )));
        }
        let param_count = read_u32(&mut reader)? as usize;

        let name_to_id: HashMap<String, NodeId> = self
            .get_trainable_nodes()
            .into_iter()
            .filter_map(|id| self.get_node(id).ok().map(|n| (n.name().to_string(), id)))
            .collect();
        if param_count != name_to_id.len() {
            return Err(GraphError::FormatError(format!(
                "参数文件含 {param_count} 个参数，而图中有 {} 个",
                name_to_id.len()
            )));
        }

        let mut loaded = Vec::with_capacity(param_count);
        for _ in 0..param_count {
            let name_len = read_u32(&mut reader)? as usize;
            let mut name_bytes = vec![0u8; name_len];
            reader.read_exact(&mut name_bytes)?;
            let name = String::from_utf8(name_bytes)
                .map_err(|e| GraphError::FormatError(format!("参数名编码无效: {e}")))?;

            let dims = read_u32(&mut reader)? as usize;
            let mut shape = Vec::with_capacity(dims);
            for _ in 0..dims {
                shape.push(read_u32(&mut reader)? as usize);
            }

            let data_len: usize = shape.iter().product();
            let mut data = Vec::with_capacity(data_len);
            let mut val_bytes = [0u8; 4];
            for _ in 0..data_len {
                reader.read_exact(&mut val_bytes)?;
                data.push(f32::from_le_bytes(val_bytes));
            }

            let node_id = *name_to_id
                .get(&name)
                .ok_or_else(|| GraphError::FormatError(format!("图中没有名为 {name} 的参数")))?;
            loaded.push((node_id, Tensor::from_vec(data, &shape)?));
        }

        // 形状全部校验通过后再写入
        for (node_id, tensor) in &loaded {
            let node = self.get_node(*node_id)?;
            if let Some(current) = node.value() {
                if !current.is_same_shape(tensor) {
                    return Err(GraphError::ShapeMismatch {
                        expected: current.shape().to_vec(),
                        got: tensor.shape().to_vec(),
                        message: format!("参数文件中{node}的形状与图中不符"),
                    });
                }
            }
        }
        for (node_id, tensor) in loaded {
            self.set_node_value(node_id, Some(&tensor))?;
        }
        Ok(())
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, GraphError> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}
