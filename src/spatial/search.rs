//! 基于格子下界的剪枝最近点搜索
//!
//! 用 [`GridIndex::min_dist_to_bin`] 作为优先级，从最可能包含最近点的格子开始访问，
//! 一旦剩余格子的下界超过当前最优距离即停止。格子边界与 [`GridIndex::get_bin`]
//! 的舍入一致，下界不会超过格子内任何点的距离，因此结果与 [`GridIndex::nearest`]
//! 完全一致（包括距离相同时的取舍），只是访问的点更少。

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rayon::prelude::*;

use super::grid_index::GridIndex;
use super::point::GridPoint;

/// 优先队列中的格子（按下界升序出队）
#[derive(Debug, Clone, Copy)]
struct CellEntry {
    bound: f64,
    cell: usize,
}

impl PartialEq for CellEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellEntry {}

impl PartialOrd for CellEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap 是最大堆，反转后下界最小的先出队
        other
            .bound
            .total_cmp(&self.bound)
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

/// 当前最优候选点及其在扫描顺序中的位置
#[derive(Debug, Clone, Copy)]
struct Candidate {
    point: GridPoint,
    distance: f64,
    cell: usize,
    position: usize,
}

impl Candidate {
    /// 与全量扫描的取舍规则一致：距离更近，或距离相同但扫描顺序更靠前
    fn precedes(&self, other: &Candidate) -> bool {
        self.distance < other.distance
            || (self.distance == other.distance
                && (self.cell, self.position) < (other.cell, other.position))
    }
}

impl GridIndex {
    /// 剪枝版最近点查询
    ///
    /// 所有非空格子按到查询点的下界放入优先队列；出队格子的下界严格大于当前最优距离时
    /// 结束搜索。下界等于最优距离的格子仍会被访问，以保留扫描顺序上的取舍。
    ///
    /// # 返回值
    /// 与 [`GridIndex::nearest`] 相同的点
    pub fn nearest_pruned(&self, x: f64, y: f64) -> Option<GridPoint> {
        if self.is_empty() || x.is_nan() || y.is_nan() {
            return None;
        }

        let mut queue: BinaryHeap<CellEntry> = (0..self.num_bins())
            .filter(|&cell| self.is_cell_occupied(cell))
            .map(|cell| {
                let (xbin, ybin) = self.cell_coords(cell);
                CellEntry {
                    bound: self.min_dist_to_bin(xbin as isize, ybin as isize, x, y),
                    cell,
                }
            })
            .collect();

        let mut best: Option<Candidate> = None;
        let mut visited = 0usize;

        while let Some(entry) = queue.pop() {
            if let Some(best) = &best {
                if entry.bound > best.distance {
                    break;
                }
            }

            visited += 1;
            for (position, point) in self.chain(entry.cell).enumerate() {
                let candidate = Candidate {
                    point,
                    distance: point.distance_to(x, y),
                    cell: entry.cell,
                    position,
                };
                if best.is_none_or(|best| candidate.precedes(&best)) {
                    best = Some(candidate);
                }
            }
        }

        log::trace!(
            "GridIndex: pruned search at ({}, {}) visited {} bins, skipped {}",
            x,
            y,
            visited,
            queue.len()
        );

        best.map(|candidate| candidate.point)
    }

    /// 并行回答一批最近点查询
    ///
    /// 查询只读取索引，因此可以在多个线程间共享 `&GridIndex`。
    pub fn nearest_batch(&self, queries: &[(f64, f64)]) -> Vec<Option<GridPoint>> {
        queries
            .par_iter()
            .map(|&(x, y)| self.nearest_pruned(x, y))
            .collect()
    }
}
