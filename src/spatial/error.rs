//! 网格配置错误
//!
//! 只有配置校验会产生错误值；插入、删除、查询的失败都用 `bool` / `Option` 表达。

use std::fmt;

/// 坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// [`GridConfig::validate`](super::GridConfig::validate) 返回的错误
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridConfigError {
    /// 边界包含 NaN 或无穷大
    NonFiniteBound {
        /// 出错的坐标轴
        axis: Axis,
    },
    /// 区间为空或反向（要求 `start < end`）
    EmptyDomain {
        axis: Axis,
        start: f64,
        end: f64,
    },
    /// 格子数量为 0
    ZeroBins { axis: Axis },
}

impl fmt::Display for GridConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridConfigError::NonFiniteBound { axis } => {
                write!(f, "{} bounds must be finite", axis)
            }
            GridConfigError::EmptyDomain { axis, start, end } => {
                write!(
                    f,
                    "{} domain is empty: start {} must be less than end {}",
                    axis, start, end
                )
            }
            GridConfigError::ZeroBins { axis } => {
                write!(f, "number of {} bins must be positive", axis)
            }
        }
    }
}

impl std::error::Error for GridConfigError {}
