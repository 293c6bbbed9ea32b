//! Cora 引文数据集（LINQS 文本格式）
//!
//! - `cora.content`：每行 `<paper_id> <1433 个 0/1 词特征> <类别名>`
//! - `cora.cites`：每行 `<被引论文 id> <引用论文 id>`
//!
//! 引用关系按无向图处理：去掉自引与重复后，每对论文生成正反两条边
//! （5278 对 → 10556 条边，与 Planetoid 版本一致）。

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::info;

use super::SplitSpec;
use crate::data::dataset::CitationDataset;
use crate::data::edge_index::EdgeIndex;
use crate::data::error::DataError;
use crate::data::split::SplitMasks;
use crate::tensor::Tensor;

const CONTENT_FILE: &str = "cora.content";
const CITES_FILE: &str = "cora.cites";

pub(crate) fn load(
    root: &Path,
    split: &SplitSpec,
    seed: u64,
) -> Result<CitationDataset, DataError> {
    let content_path = existing_file(root, CONTENT_FILE)?;
    let cites_path = existing_file(root, CITES_FILE)?;

    let content = parse_content(&content_path)?;
    let edges = parse_cites(&cites_path, &content.paper_index)?;

    let n = content.labels.len();
    let features = Tensor::from_vec(content.features, &[n, content.feature_dim])?;
    let edges = EdgeIndex::new(edges, n)?;
    let num_classes = content.class_names.len();
    let masks = SplitMasks::random_per_class(&content.labels, num_classes, split, seed)?;

    info!(
        "加载 Cora 完成：{} 个节点，{} 维特征，{} 条边，{} 个类别",
        n,
        content.feature_dim,
        edges.len(),
        num_classes
    );
    CitationDataset::new("cora", features, edges, content.labels, num_classes, masks)
}

fn existing_file(root: &Path, name: &str) -> Result<PathBuf, DataError> {
    let path = root.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(DataError::FileNotFound(path))
    }
}

struct ContentTable {
    features: Vec<f32>,
    feature_dim: usize,
    labels: Vec<usize>,
    class_names: Vec<String>,
    paper_index: HashMap<String, usize>,
}

fn parse_content(path: &Path) -> Result<ContentTable, DataError> {
    let reader = BufReader::new(File::open(path)?);

    let mut rows: Vec<(String, Vec<f32>, String)> = Vec::new();
    let mut feature_dim = None;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 3 {
            return Err(DataError::FormatError(format!(
                "{CONTENT_FILE} 第 {} 行只有 {} 列",
                line_no + 1,
                tokens.len()
            )));
        }
        let words = &tokens[1..tokens.len() - 1];
        match feature_dim {
            None => feature_dim = Some(words.len()),
            Some(dim) if dim != words.len() => {
                return Err(DataError::FormatError(format!(
                    "{CONTENT_FILE} 第 {} 行有 {} 维特征，期望 {dim}",
                    line_no + 1,
                    words.len()
                )));
            }
            Some(_) => {}
        }
        let values = words
            .iter()
            .map(|w| {
                w.parse::<f32>().map_err(|_| {
                    DataError::FormatError(format!(
                        "{CONTENT_FILE} 第 {} 行含非数值特征 `{w}`",
                        line_no + 1
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push((
            tokens[0].to_string(),
            values,
            tokens[tokens.len() - 1].to_string(),
        ));
    }

    let feature_dim = feature_dim
        .ok_or_else(|| DataError::FormatError(format!("{CONTENT_FILE} 为空")))?;

    // 类别名排序后编号，保证多次加载编号一致
    let class_ids: BTreeMap<&str, usize> = rows
        .iter()
        .map(|(_, _, c)| c.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, c)| (c, i))
        .collect();
    let class_names = class_ids.keys().map(|c| c.to_string()).collect();

    let mut features = Vec::with_capacity(rows.len() * feature_dim);
    let mut labels = Vec::with_capacity(rows.len());
    let mut paper_index = HashMap::with_capacity(rows.len());
    for (i, (paper, values, class)) in rows.iter().enumerate() {
        if paper_index.insert(paper.clone(), i).is_some() {
            return Err(DataError::FormatError(format!(
                "{CONTENT_FILE} 中论文 {paper} 重复出现"
            )));
        }
        features.extend_from_slice(values);
        labels.push(class_ids[class.as_str()]);
    }

    Ok(ContentTable {
        features,
        feature_dim,
        labels,
        class_names,
        paper_index,
    })
}

fn parse_cites(
    path: &Path,
    paper_index: &HashMap<String, usize>,
) -> Result<Vec<(usize, usize)>, DataError> {
    let reader = BufReader::new(File::open(path)?);
    let mut pairs = BTreeSet::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() != 2 {
            return Err(DataError::FormatError(format!(
                "{CITES_FILE} 第 {} 行应有 2 列，实际 {} 列",
                line_no + 1,
                tokens.len()
            )));
        }
        let lookup = |paper: &str| {
            paper_index.get(paper).copied().ok_or_else(|| {
                DataError::FormatError(format!(
                    "{CITES_FILE} 第 {} 行引用了未知论文 {paper}",
                    line_no + 1
                ))
            })
        };
        let (a, b) = (lookup(tokens[0])?, lookup(tokens[1])?);
        if a != b {
            pairs.insert((a.min(b), a.max(b)));
        }
    }
    Ok(pairs
        .into_iter()
        .flat_map(|(a, b)| [(a, b), (b, a)])
        .collect())
}
