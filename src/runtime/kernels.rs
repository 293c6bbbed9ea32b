//! 运行时算子：只依赖 `ndarray`，不复用训练图的节点实现

use ndarray::{Array2, ArrayView2, Axis};

use crate::nn::Aggregation;

pub(super) type KernelResult<T> = Result<T, String>;

pub(super) fn matmul(a: ArrayView2<'_, f32>, b: ArrayView2<'_, f32>) -> KernelResult<Array2<f32>> {
    if a.ncols() != b.nrows() {
        return Err(format!("矩阵乘法形状不兼容：{:?} @ {:?}", a.shape(), b.shape()));
    }
    Ok(a.dot(&b))
}

/// 同形状相加，或把 `[1, m]` 的 `b` 广播到每一行
pub(super) fn add(a: ArrayView2<'_, f32>, b: ArrayView2<'_, f32>) -> KernelResult<Array2<f32>> {
    let b = b
        .broadcast(a.raw_dim())
        .ok_or_else(|| format!("无法把 {:?} 广播到 {:?}", b.shape(), a.shape()))?;
    Ok(&a + &b)
}

pub(super) fn relu(x: ArrayView2<'_, f32>) -> Array2<f32> {
    x.mapv(|v| v.max(0.0))
}

/// `[2, E]` 的边矩阵转成 `(源, 目标)` 列表，同时检查下标范围
pub(super) fn edge_pairs(
    edges: ArrayView2<'_, i64>,
    node_count: usize,
) -> Result<Vec<(usize, usize)>, (usize, i64, i64)> {
    let in_range = |v: i64| v >= 0 && (v as u64) < node_count as u64;
    edges
        .axis_iter(Axis(1))
        .enumerate()
        .map(|(k, col)| {
            let (s, t) = (col[0], col[1]);
            if in_range(s) && in_range(t) {
                Ok((s as usize, t as usize))
            } else {
                Err((k, s, t))
            }
        })
        .collect()
}

/// 边端点必须是 `x` 的合法行号
fn check_edge_rows(edges: &[(usize, usize)], rows: usize) -> KernelResult<()> {
    match edges.iter().position(|&(s, t)| s >= rows || t >= rows) {
        Some(k) => Err(format!(
            "第 {k} 条边 {:?} 超出了特征矩阵的行数 {rows}",
            edges[k]
        )),
        None => Ok(()),
    }
}

fn check_attention_shape(att: ArrayView2<'_, f32>, cols: usize) -> KernelResult<()> {
    if att.shape() != [1, cols] {
        return Err(format!(
            "注意力向量形状应为 [1, {cols}]，实际为 {:?}",
            att.shape()
        ));
    }
    Ok(())
}

/// 给还没有自环的节点补上 `(i, i)`
fn add_remaining_self_loops(edges: &[(usize, usize)], node_count: usize) -> Vec<(usize, usize)> {
    let mut looped = vec![false; node_count];
    for &(s, t) in edges {
        if s == t {
            looped[s] = true;
        }
    }
    let mut out = edges.to_vec();
    out.extend((0..node_count).filter(|&i| !looped[i]).map(|i| (i, i)));
    out
}

/// 沿边聚合：`out[t] += w(s, t) * x[s]`
pub(super) fn propagate(
    x: ArrayView2<'_, f32>,
    edges: &[(usize, usize)],
    aggr: Aggregation,
) -> KernelResult<Array2<f32>> {
    let n = x.nrows();
    check_edge_rows(edges, n)?;
    let mut out = Array2::<f32>::zeros(x.raw_dim());
    match aggr {
        Aggregation::Sum => {
            for &(s, t) in edges {
                out.row_mut(t).scaled_add(1.0, &x.row(s));
            }
        }
        Aggregation::GcnNorm => {
            let edges = add_remaining_self_loops(edges, n);
            let mut deg = vec![0.0f32; n];
            for &(_, t) in &edges {
                deg[t] += 1.0;
            }
            let norm: Vec<f32> = deg.iter().map(|d| 1.0 / d.sqrt()).collect();
            for &(s, t) in &edges {
                out.row_mut(t).scaled_add(norm[s] * norm[t], &x.row(s));
            }
        }
    }
    Ok(out)
}

/// 单头图注意力：按目标节点对入边（含自环）做 softmax 后加权求和
pub(super) fn gat_attention(
    h: ArrayView2<'_, f32>,
    att_src: ArrayView2<'_, f32>,
    att_dst: ArrayView2<'_, f32>,
    edges: &[(usize, usize)],
    negative_slope: f32,
) -> KernelResult<Array2<f32>> {
    check_attention_shape(att_src, h.ncols())?;
    check_attention_shape(att_dst, h.ncols())?;
    let n = h.nrows();
    check_edge_rows(edges, n)?;
    let a_src = h.dot(&att_src.row(0));
    let a_dst = h.dot(&att_dst.row(0));
    let edges = add_remaining_self_loops(edges, n);

    let logits: Vec<f32> = edges
        .iter()
        .map(|&(j, i)| {
            let z = a_src[j] + a_dst[i];
            if z > 0.0 { z } else { negative_slope * z }
        })
        .collect();
    let mut max = vec![f32::NEG_INFINITY; n];
    for (&(_, i), &z) in edges.iter().zip(&logits) {
        max[i] = max[i].max(z);
    }
    let weights: Vec<f32> = edges
        .iter()
        .zip(&logits)
        .map(|(&(_, i), &z)| (z - max[i]).exp())
        .collect();
    let mut denom = vec![0.0f32; n];
    for (&(_, i), &w) in edges.iter().zip(&weights) {
        denom[i] += w;
    }

    let mut out = Array2::<f32>::zeros(h.raw_dim());
    for (&(j, i), &w) in edges.iter().zip(&weights) {
        out.row_mut(i).scaled_add(w / denom[i], &h.row(j));
    }
    Ok(out)
}
