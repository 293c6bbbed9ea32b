/*
 * @Author       : 老董
 * @Date         : 2025-12-27
 * @Description  : 冻结图描述（Frozen Graph）
 *                 训练图去掉 dropout、损失等训练专用节点后的推理中间表示（IR），
 *                 参数以初始化器（initializer）的形式内嵌，按名称连接各算子，
 *                 可独立于训练框架加载执行（见 `runtime` 模块）
 */

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::GraphError;
use super::nodes::raw_node::Aggregation;

/// 冻结图文件魔数
const FROZEN_MAGIC: &[u8; 4] = b"OGFG";
/// 冻结图格式版本
pub const FROZEN_FORMAT_VERSION: u32 = 1;

/// 张量元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DType {
    F32,
    I64,
}

/// 图输入/输出的声明：名称、元素类型与固定形状
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorInfo {
    pub name: String,
    pub dtype: DType,
    pub shape: Vec<usize>,
}

/// 内嵌的常量参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    pub name: String,
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// 冻结图支持的算子
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FrozenOp {
    /// `[a, b] -> a @ b`
    MatMul,
    /// `[a, b] -> a + b`，`b` 可为按行广播的 `[1, m]`
    Add,
    /// `[x] -> max(x, 0)`
    Relu,
    /// `[x, edges]`，沿边聚合
    Propagate { aggr: Aggregation },
    /// `[h, att_src, att_dst, edges]`，单头图注意力聚合
    GatAttention { negative_slope: f32 },
}

/// 一个算子实例：按名称引用输入值，产出一个命名的输出值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenNode {
    pub name: String,
    pub op: FrozenOp,
    pub inputs: Vec<String>,
    pub output: String,
}

/// 冻结图：按拓扑顺序排列的算子 + 输入/输出声明 + 初始化器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenGraph {
    /// 格式版本（用于向后兼容）
    pub format_version: u32,
    /// 生成该文件的程序与版本
    pub producer: String,
    /// 图名称
    pub name: String,
    pub inputs: Vec<TensorInfo>,
    pub outputs: Vec<TensorInfo>,
    pub initializers: Vec<Initializer>,
    /// 拓扑顺序：每个算子的输入都由图输入、初始化器或排在它之前的算子提供
    pub nodes: Vec<FrozenNode>,
}

impl FrozenGraph {
    /// 创建空的冻结图
    pub fn new(name: &str) -> Self {
        Self {
            format_version: FROZEN_FORMAT_VERSION,
            producer: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            name: name.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            initializers: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn input(&self, name: &str) -> Option<&TensorInfo> {
        self.inputs.iter().find(|info| info.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&TensorInfo> {
        self.outputs.iter().find(|info| info.name == name)
    }

    /// 获取总参数量（标量个数）
    pub fn total_params(&self) -> usize {
        self.initializers.iter().map(|init| init.data.len()).sum()
    }

    /// 转换为 JSON 字符串（不含大块参数数据时便于人工查看）
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 保存为二进制文件：魔数 | 版本 u32（小端） | bincode 负载
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(FROZEN_MAGIC)?;
        writer.write_all(&self.format_version.to_le_bytes())?;
        bincode::serialize_into(&mut writer, self)
            .map_err(|e| GraphError::FormatError(format!("序列化冻结图失败: {e}")))?;
        writer.flush()?;
        Ok(())
    }

    /// 从二进制文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != FROZEN_MAGIC {
            return Err(GraphError::FormatError(
                "这不是 only_gnn 导出的冻结图文件".to_string(),
            ));
        }
        let mut version = [0u8; 4];
        reader.read_exact(&mut version)?;
        let version = u32::from_le_bytes(version);
        if version != FROZEN_FORMAT_VERSION {
            return Err(GraphError::FormatError(format!(
                "不支持的冻结图版本: {version}"
            )));
        }
        bincode::deserialize_from(reader)
            .map_err(|e| GraphError::FormatError(format!("解析冻结图失败: {e}")))
    }

    /// 可读的结构摘要（不含参数数据）
    pub fn summary(&self) -> String {
        let fmt_infos = |infos: &[TensorInfo]| {
            infos
                .iter()
                .map(|i| format!("{}: {:?}{:?}", i.name, i.dtype, i.shape))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut lines = vec![
            format!("冻结图 {}（{}，格式 v{}）", self.name, self.producer, self.format_version),
            format!("  输入: {}", fmt_infos(&self.inputs)),
            format!("  输出: {}", fmt_infos(&self.outputs)),
            format!(
                "  初始化器: {} 个，共 {} 个参数",
                self.initializers.len(),
                self.total_params()
            ),
        ];
        for node in &self.nodes {
            lines.push(format!(
                "  {} = {:?}({})",
                node.output,
                node.op,
                node.inputs.join(", ")
            ));
        }
        lines.join("\n")
    }
}
