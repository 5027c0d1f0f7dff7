//! 网格空间索引
//!
//! 将矩形区域划分为均匀的格子，每个格子保存一条点链（最新插入的点在链首）。

use super::config::GridConfig;
use super::error::GridConfigError;
use super::point::GridPoint;

/// 点在存储池中的句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct PointHandle(usize);

/// 存储池中的一个节点
#[derive(Debug, Clone)]
struct Slot {
    point: GridPoint,
    /// 同一格子链中的下一个点
    next: Option<PointHandle>,
}

/// 格子覆盖的矩形范围 `[x_min, x_max) × [y_min, y_max)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinRect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// 索引占用情况统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridOccupancy {
    pub total_points: usize,
    /// 至少包含一个点的格子数
    pub occupied_bins: usize,
    /// 最长的链长度
    pub max_chain_len: usize,
}

/// 网格空间索引
///
/// 区域 `[x_start, x_end) × [y_start, y_end)` 被划分为
/// `num_x_bins × num_y_bins` 个格子。用于：
/// - 插入：O(1)，新点成为所在格子链的链首
/// - 删除：O(链长)，按近似相等匹配第一个点
/// - 最近点查询：按行优先顺序扫描所有格子
///
/// 点存储在一个池（`slots`）中，每个格子只记录链首句柄，
/// 每个节点记录下一个节点的句柄。删除后空出的位置会被后续插入复用。
///
/// # 示例
/// ```
/// use bin_grid::spatial::GridIndex;
///
/// let mut index = GridIndex::configure(0.0, 30.0, 0.0, 30.0, 3, 3);
/// index.insert(5.0, 5.0);
/// index.insert(15.0, 15.0);
/// index.insert(25.0, 25.0);
///
/// let nearest = index.nearest(14.0, 14.0).unwrap();
/// assert_eq!((nearest.x, nearest.y), (15.0, 15.0));
/// ```
#[derive(Debug, Clone)]
pub struct GridIndex {
    config: GridConfig,
    /// 缓存的格子宽度，始终等于 `config.x_bin_width()`
    x_bin_width: f64,
    /// 缓存的格子高度，始终等于 `config.y_bin_width()`
    y_bin_width: f64,
    /// 每个格子的链首（扁平化存储）
    /// heads[xbin * num_y_bins + ybin] = 该格子最新插入的点
    heads: Vec<Option<PointHandle>>,
    slots: Vec<Slot>,
    /// 已释放、可复用的节点
    free: Vec<PointHandle>,
    len: usize,
}

impl GridIndex {
    /// 按给定边界和格子数量构建空索引
    ///
    /// 不做任何校验：调用方需保证 `x_start < x_end`、`y_start < y_end`，
    /// 且格子数量为正。需要校验时使用 [`GridIndex::new`]。
    pub fn configure(
        x_start: f64,
        x_end: f64,
        y_start: f64,
        y_end: f64,
        num_x_bins: usize,
        num_y_bins: usize,
    ) -> Self {
        Self::from_config(GridConfig::new(
            x_start, x_end, y_start, y_end, num_x_bins, num_y_bins,
        ))
    }

    /// 校验配置后构建空索引
    pub fn new(config: GridConfig) -> Result<Self, GridConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// 不校验配置，直接构建空索引
    pub fn from_config(config: GridConfig) -> Self {
        let x_bin_width = config.x_bin_width();
        let y_bin_width = config.y_bin_width();

        log::debug!(
            "GridIndex: {}x{} bins over [{}, {}) x [{}, {}), bin size {} x {}",
            config.num_x_bins,
            config.num_y_bins,
            config.x_start,
            config.x_end,
            config.y_start,
            config.y_end,
            x_bin_width,
            y_bin_width
        );

        Self {
            config,
            x_bin_width,
            y_bin_width,
            heads: vec![None; config.num_bins()],
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// 计算坐标所在的格子
    ///
    /// 不做边界裁剪：区域外的坐标会得到越界（可能为负）的格子编号。
    pub fn get_bin(&self, x: f64, y: f64) -> (isize, isize) {
        (
            axis_bin(x, self.config.x_start, self.x_bin_width),
            axis_bin(y, self.config.y_start, self.y_bin_width),
        )
    }

    /// 计算坐标所在的格子，越界或坐标非有限值时返回 `None`
    pub fn bin_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let (xbin, ybin) = self.get_bin(x, y);
        self.checked_bin(xbin, ybin)
    }

    /// 插入一个点
    ///
    /// 坐标不在任何格子内时返回 `false`，索引不变。不检查重复点。
    pub fn insert(&mut self, x: f64, y: f64) -> bool {
        let Some((xbin, ybin)) = self.locate("insert", x, y) else {
            return false;
        };

        let cell = self.cell_index(xbin, ybin);
        let slot = Slot {
            point: GridPoint::new(x, y),
            next: self.heads[cell],
        };
        let handle = self.alloc(slot);
        self.heads[cell] = Some(handle);
        self.len += 1;

        true
    }

    /// 删除第一个与 `(x, y)` 近似相等的点
    ///
    /// 坐标越界、格子为空或链中没有匹配的点时返回 `false`，索引不变。
    pub fn delete(&mut self, x: f64, y: f64) -> bool {
        let Some((xbin, ybin)) = self.locate("delete", x, y) else {
            return false;
        };

        let cell = self.cell_index(xbin, ybin);
        if self.heads[cell].is_none() {
            log::trace!("GridIndex: delete ({}, {}) from empty bin ({}, {})", x, y, xbin, ybin);
            return false;
        }

        let mut previous: Option<PointHandle> = None;
        let mut current = self.heads[cell];

        while let Some(handle) = current {
            let slot = &self.slots[handle.0];
            let next = slot.next;

            if slot.point.approx_eq(x, y) {
                match previous {
                    None => self.heads[cell] = next,
                    Some(prev) => self.slots[prev.0].next = next,
                }
                self.release(handle);
                self.len -= 1;
                return true;
            }

            previous = current;
            current = next;
        }

        log::trace!("GridIndex: no point near ({}, {}) in bin ({}, {})", x, y, xbin, ybin);
        false
    }

    /// 是否存储了与 `(x, y)` 近似相等的点
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.bin_of(x, y)
            .is_some_and(|(xbin, ybin)| self.bin_points(xbin, ybin).any(|p| p.approx_eq(x, y)))
    }

    /// 查找距离 `(x, y)` 最近的点
    ///
    /// 按行优先顺序（先 x 格子编号，再 y 格子编号）扫描所有格子，
    /// 每个格子内从链首开始遍历。距离相同时保留最先遇到的点。
    /// 查询点不必在区域内。
    ///
    /// # 返回值
    /// 最近的点；索引为空或查询坐标为 NaN 时返回 `None`
    pub fn nearest(&self, x: f64, y: f64) -> Option<GridPoint> {
        if x.is_nan() || y.is_nan() {
            return None;
        }

        let mut best: Option<(GridPoint, f64)> = None;

        for point in self.points() {
            let distance = point.distance_to(x, y);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((point, distance));
            }
        }

        best.map(|(point, _)| point)
    }

    /// 点 `(x, y)` 到格子矩形的最短距离
    ///
    /// 点在格子内（含边界）时为 0。格子编号越界时返回 `f64::NEG_INFINITY`。
    /// 该值不超过格子内任意已存储点的 [`GridPoint::distance_to`]，可用于剪枝搜索。
    /// 格子边界见 [`GridIndex::bin_bounds`]。
    pub fn min_dist_to_bin(&self, xbin: isize, ybin: isize, x: f64, y: f64) -> f64 {
        let Some(rect) = self
            .checked_bin(xbin, ybin)
            .map(|(xbin, ybin)| self.bin_rect(xbin, ybin))
        else {
            return f64::NEG_INFINITY;
        };

        let dx = axis_excess(x, rect.x_min, rect.x_max);
        let dy = axis_excess(y, rect.y_min, rect.y_max);

        (dx * dx + dy * dy).sqrt()
    }

    /// 格子覆盖的矩形，编号越界时返回 `None`
    ///
    /// 边界为 `start + bin * width`。大坐标下 [`GridIndex::get_bin`] 的舍入可能把边界外
    /// 几个 ULP 的坐标分到该格子，此时边界向外移动，直到包含所有会被分到该格子的坐标。
    pub fn bin_bounds(&self, xbin: usize, ybin: usize) -> Option<BinRect> {
        (xbin < self.config.num_x_bins && ybin < self.config.num_y_bins)
            .then(|| self.bin_rect(xbin, ybin))
    }

    /// 遍历格子中的点（最新插入的在前），编号越界时为空
    pub fn bin_points(&self, xbin: usize, ybin: usize) -> Chain<'_> {
        let cursor = if xbin < self.config.num_x_bins && ybin < self.config.num_y_bins {
            self.heads[self.cell_index(xbin, ybin)]
        } else {
            None
        };
        Chain { index: self, cursor }
    }

    /// 格子中的点数
    pub fn bin_len(&self, xbin: usize, ybin: usize) -> usize {
        self.bin_points(xbin, ybin).count()
    }

    /// 按扫描顺序遍历所有点
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.heads.len()).flat_map(move |cell| self.chain(cell))
    }

    /// 清空所有点，保留配置
    pub fn clear(&mut self) {
        log::debug!("GridIndex: clearing {} points", self.len);
        self.heads.fill(None);
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    pub fn occupancy(&self) -> GridOccupancy {
        let mut occupancy = GridOccupancy {
            total_points: self.len,
            ..Default::default()
        };

        for cell in 0..self.heads.len() {
            let chain_len = self.chain(cell).count();
            if chain_len > 0 {
                occupancy.occupied_bins += 1;
                occupancy.max_chain_len = occupancy.max_chain_len.max(chain_len);
            }
        }

        occupancy
    }

    /// 存储的点数
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// 格子数量 `(num_x_bins, num_y_bins)`
    pub fn grid_dimensions(&self) -> (usize, usize) {
        (self.config.num_x_bins, self.config.num_y_bins)
    }

    pub fn num_bins(&self) -> usize {
        self.heads.len()
    }

    pub fn x_bin_width(&self) -> f64 {
        self.x_bin_width
    }

    pub fn y_bin_width(&self) -> f64 {
        self.y_bin_width
    }

    // ========================================================================
    // 内部方法
    // ========================================================================

    /// 扁平化的格子编号（行优先，x 为外层）
    #[inline]
    pub(super) fn cell_index(&self, xbin: usize, ybin: usize) -> usize {
        xbin * self.config.num_y_bins + ybin
    }

    /// [`Self::cell_index`] 的逆运算
    #[inline]
    pub(super) fn cell_coords(&self, cell: usize) -> (usize, usize) {
        (cell / self.config.num_y_bins, cell % self.config.num_y_bins)
    }

    /// 遍历扁平编号为 `cell` 的格子链
    pub(super) fn chain(&self, cell: usize) -> Chain<'_> {
        Chain {
            index: self,
            cursor: self.heads[cell],
        }
    }

    pub(super) fn is_cell_occupied(&self, cell: usize) -> bool {
        self.heads[cell].is_some()
    }

    fn checked_bin(&self, xbin: isize, ybin: isize) -> Option<(usize, usize)> {
        let xbin = usize::try_from(xbin).ok()?;
        let ybin = usize::try_from(ybin).ok()?;
        (xbin < self.config.num_x_bins && ybin < self.config.num_y_bins).then_some((xbin, ybin))
    }

    /// 插入/删除前的定位，拒绝时记录日志
    fn locate(&self, op: &str, x: f64, y: f64) -> Option<(usize, usize)> {
        if !x.is_finite() || !y.is_finite() {
            log::warn!("GridIndex: {} with non-finite coordinates ({}, {})", op, x, y);
            return None;
        }

        let located = self.bin_of(x, y);
        if located.is_none() {
            log::trace!("GridIndex: {} ({}, {}) outside the grid domain", op, x, y);
        }
        located
    }

    fn bin_rect(&self, xbin: usize, ybin: usize) -> BinRect {
        let GridConfig {
            x_start, y_start, ..
        } = self.config;

        let (x_min, x_max) = axis_edges(x_start, self.x_bin_width, xbin);
        let (y_min, y_max) = axis_edges(y_start, self.y_bin_width, ybin);

        BinRect {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    fn alloc(&mut self, slot: Slot) -> PointHandle {
        match self.free.pop() {
            Some(handle) => {
                self.slots[handle.0] = slot;
                handle
            }
            None => {
                self.slots.push(slot);
                PointHandle(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, handle: PointHandle) {
        self.slots[handle.0].next = None;
        self.free.push(handle);
    }
}

/// 单个坐标轴上的格子编号，[`GridIndex::get_bin`] 与格子边界共用这一运算
#[inline]
fn axis_bin(value: f64, start: f64, width: f64) -> isize {
    ((value - start) / width).floor() as isize
}

/// 第 `bin` 个格子在一个坐标轴上的边界 `[min, max]`
///
/// 先取 `start + bin * width`；若 `axis_bin` 把 `min` 以下或 `max` 以上的相邻浮点数
/// 也分到 `bin`，就把该边界移到仍属于 `bin` 的最远浮点数。
fn axis_edges(start: f64, width: f64, bin: usize) -> (f64, f64) {
    let min = start + bin as f64 * width;
    let max = start + (bin + 1) as f64 * width;

    if !(width > 0.0 && min.is_finite() && max.is_finite()) {
        return (min, max);
    }

    let bin = bin as isize;
    let slack =
        (8.0 * f64::EPSILON * (start.abs() + min.abs() + max.abs())).max(f64::MIN_POSITIVE);

    let min = if axis_bin(step_float(min, -1), start, width) >= bin {
        farthest_where(min, -slack, |v| axis_bin(v, start, width) >= bin)
    } else {
        min
    };
    let max = if axis_bin(step_float(max, 1), start, width) <= bin {
        farthest_where(max, slack, |v| axis_bin(v, start, width) <= bin)
    } else {
        max
    };

    (min, max)
}

/// 从满足 `pred` 的 `inside` 出发，沿 `step` 方向找到仍满足 `pred` 的最远浮点数
///
/// `pred` 沿该方向单调（先真后假）。`step` 不够远时逐次加倍，最多 8 次。
fn farthest_where(inside: f64, step: f64, pred: impl Fn(f64) -> bool) -> f64 {
    let mut step = step;
    let mut outside = inside + step;
    for _ in 0..8 {
        if !pred(outside) {
            break;
        }
        step *= 2.0;
        outside = inside + step;
    }
    if pred(outside) {
        return outside;
    }

    // 在浮点数的全序编码上二分
    let mut inside_key = float_key(inside);
    let mut outside_key = float_key(outside);
    while (outside_key - inside_key).abs() > 1 {
        let mid = (inside_key + outside_key) / 2;
        if pred(float_from_key(mid)) {
            inside_key = mid;
        } else {
            outside_key = mid;
        }
    }

    float_from_key(inside_key)
}

/// 与 `f64::total_cmp` 相同的全序编码，相邻浮点数的编码相差 1
#[inline]
fn float_key(value: f64) -> i128 {
    let bits = value.to_bits() as i64;
    (bits ^ ((((bits >> 63) as u64) >> 1) as i64)) as i128
}

#[inline]
fn float_from_key(key: i128) -> f64 {
    let key = key as i64;
    f64::from_bits((key ^ ((((key >> 63) as u64) >> 1) as i64)) as u64)
}

/// 沿全序移动 `steps` 个浮点数
#[inline]
fn step_float(value: f64, steps: i128) -> f64 {
    float_from_key(float_key(value) + steps)
}

/// 坐标在 `[min, max]` 之外的距离，在区间内为 0
#[inline]
fn axis_excess(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    }
}

/// 一个格子的点链迭代器
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    index: &'a GridIndex,
    cursor: Option<PointHandle>,
}

impl Iterator for Chain<'_> {
    type Item = GridPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let slot = &self.index.slots[handle.0];
        self.cursor = slot.next;
        Some(slot.point)
    }
}
