use serde::{Deserialize, Serialize};

use super::error::{Axis, GridConfigError};

/// Configuration of a uniform grid: domain bounds and bin counts.
///
/// The domain is `[x_start, x_end) × [y_start, y_end)`. Bin counts are fixed
/// once an index is built from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,

    /// Number of bins along the x axis
    pub num_x_bins: usize,

    /// Number of bins along the y axis
    pub num_y_bins: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            x_start: 0.0,
            x_end: 100.0,
            y_start: 0.0,
            y_end: 100.0,
            num_x_bins: 10,
            num_y_bins: 10,
        }
    }
}

impl GridConfig {
    pub fn new(
        x_start: f64,
        x_end: f64,
        y_start: f64,
        y_end: f64,
        num_x_bins: usize,
        num_y_bins: usize,
    ) -> Self {
        Self {
            x_start,
            x_end,
            y_start,
            y_end,
            num_x_bins,
            num_y_bins,
        }
    }

    /// Same number of bins on both axes
    pub fn uniform(x_start: f64, x_end: f64, y_start: f64, y_end: f64, bins: usize) -> Self {
        Self::new(x_start, x_end, y_start, y_end, bins, bins)
    }

    pub fn x_bin_width(&self) -> f64 {
        (self.x_end - self.x_start) / self.num_x_bins as f64
    }

    pub fn y_bin_width(&self) -> f64 {
        (self.y_end - self.y_start) / self.num_y_bins as f64
    }

    /// Total number of bins
    pub fn num_bins(&self) -> usize {
        self.num_x_bins * self.num_y_bins
    }

    /// Check the caller contract: finite bounds, `start < end`, positive bin counts.
    pub fn validate(&self) -> Result<(), GridConfigError> {
        check_axis(Axis::X, self.x_start, self.x_end, self.num_x_bins)?;
        check_axis(Axis::Y, self.y_start, self.y_end, self.num_y_bins)?;
        Ok(())
    }
}

fn check_axis(axis: Axis, start: f64, end: f64, bins: usize) -> Result<(), GridConfigError> {
    if !start.is_finite() || !end.is_finite() {
        return Err(GridConfigError::NonFiniteBound { axis });
    }
    if start >= end {
        return Err(GridConfigError::EmptyDomain { axis, start, end });
    }
    if bins == 0 {
        return Err(GridConfigError::ZeroBins { axis });
    }
    Ok(())
}
