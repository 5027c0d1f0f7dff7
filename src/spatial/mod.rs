//! 空间索引模块
//!
//! 在有界矩形区域上用均匀网格存储点，提供：
//! - 插入与近似相等删除
//! - 最近点查询（全量扫描，以及基于格子下界的剪枝搜索）
//! - 点到格子的距离下界，供上层构建自己的剪枝搜索
//!
//! # 主要类型
//! - [`GridIndex`][]: 基于均匀网格的点索引
//! - [`GridConfig`][]: 区域边界与格子数量
//! - [`GridPoint`][]: 索引中存储的点
//!
//! 索引本身不做任何同步，修改操作需要 `&mut self`；
//! 只读查询可以在多个线程间共享（见 [`GridIndex::nearest_batch`]）。

mod config;
mod error;
mod grid_index;
mod point;
mod search;

pub use config::GridConfig;
pub use error::{Axis, GridConfigError};
pub use grid_index::{BinRect, Chain, GridIndex, GridOccupancy};
pub use point::{approx_equal, GridPoint, APPROX_EPSILON};
