//! 网格中存储的点与近似相等判断

use serde::{Deserialize, Serialize};

/// 近似相等的阈值（每个坐标轴独立比较）
pub const APPROX_EPSILON: f64 = 1e-9;

/// 网格中存储的一个点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl GridPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 到 `(x, y)` 的欧氏距离
    ///
    /// 所有最近点查询都用这一个公式，保证相同的距离比较时严格相等。
    #[inline]
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// 与 `(x, y)` 是否近似相等
    #[inline]
    pub fn approx_eq(&self, x: f64, y: f64) -> bool {
        approx_equal(self.x, self.y, x, y)
    }
}

/// 两个坐标对是否近似相等
///
/// x、y 两个方向的差都不超过 [`APPROX_EPSILON`] 才算相等，
/// 不是合成后的欧氏距离。
#[inline]
pub fn approx_equal(x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
    (x1 - x2).abs() <= APPROX_EPSILON && (y1 - y2).abs() <= APPROX_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_equal_per_axis() {
        assert!(approx_equal(5.0, 5.0, 5.0 + 1e-10, 5.0 - 1e-10));
        assert!(!approx_equal(5.0, 5.0, 5.0 + 1e-8, 5.0));
        assert!(!approx_equal(5.0, 5.0, 5.0, 5.0 - 1e-8));

        // 每个轴都在阈值内，但合成距离超过阈值时仍然相等
        let d = 0.9e-9;
        assert!(approx_equal(0.0, 0.0, d, d));
        assert!((d * d + d * d).sqrt() > APPROX_EPSILON);
    }

    #[test]
    fn test_distance_to() {
        let p = GridPoint::new(15.0, 15.0);
        assert_eq!(p.distance_to(15.0, 15.0), 0.0);
        assert_eq!(GridPoint::new(3.0, 4.0).distance_to(0.0, 0.0), 5.0);
        assert!((p.distance_to(14.0, 14.0) - std::f64::consts::SQRT_2).abs() < 1e-12);
    }
}
