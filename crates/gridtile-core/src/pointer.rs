#![forbid(unsafe_code)]

//! Pointer-side vocabulary: resize handles, grid deltas, axis dominance, and
//! the pixel → grid cell transform.
//!
//! Raw DOM or windowing events never reach the engine. A host translates them
//! with [`GridMetrics::to_grid_cell`] (or computes cell deltas itself) and
//! feeds [`PointerDelta`] values into an interaction session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The other axis.
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Resize handle token (`e|w|s|n|se|sw|ne|nw`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    #[serde(rename = "n")]
    North,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "w")]
    West,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "nw")]
    NorthWest,
    #[serde(rename = "se")]
    SouthEast,
    #[serde(rename = "sw")]
    SouthWest,
}

impl ResizeHandle {
    /// All handles, in token order.
    pub const ALL: [Self; 8] = [
        Self::East,
        Self::West,
        Self::South,
        Self::North,
        Self::SouthEast,
        Self::SouthWest,
        Self::NorthEast,
        Self::NorthWest,
    ];

    /// Which horizontal edge this handle drags: `Some(true)` for the right
    /// edge, `Some(false)` for the left edge, `None` if it has no horizontal
    /// component.
    #[must_use]
    pub const fn horizontal_edge(self) -> Option<bool> {
        match self {
            Self::West | Self::NorthWest | Self::SouthWest => Some(false),
            Self::East | Self::NorthEast | Self::SouthEast => Some(true),
            Self::North | Self::South => None,
        }
    }

    /// Which vertical edge this handle drags: `Some(true)` for the bottom
    /// edge, `Some(false)` for the top edge.
    #[must_use]
    pub const fn vertical_edge(self) -> Option<bool> {
        match self {
            Self::North | Self::NorthEast | Self::NorthWest => Some(false),
            Self::South | Self::SouthEast | Self::SouthWest => Some(true),
            Self::East | Self::West => None,
        }
    }

    /// The single axis of an edge handle; `None` for corners.
    #[must_use]
    pub const fn edge_axis(self) -> Option<Axis> {
        match (self.horizontal_edge(), self.vertical_edge()) {
            (Some(_), None) => Some(Axis::Horizontal),
            (None, Some(_)) => Some(Axis::Vertical),
            _ => None,
        }
    }

    /// Wire token.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::South => "s",
            Self::East => "e",
            Self::West => "w",
            Self::NorthEast => "ne",
            Self::NorthWest => "nw",
            Self::SouthEast => "se",
            Self::SouthWest => "sw",
        }
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Unrecognised resize handle token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHandleError {
    pub token: String,
}

impl fmt::Display for ParseHandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown resize handle {:?} (expected one of e, w, s, n, se, sw, ne, nw)",
            self.token
        )
    }
}

impl std::error::Error for ParseHandleError {}

impl FromStr for ResizeHandle {
    type Err = ParseHandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|handle| handle.token() == s)
            .ok_or_else(|| ParseHandleError {
                token: s.to_owned(),
            })
    }
}

/// Pointer displacement in grid cells, measured from the start of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerDelta {
    pub dx: i32,
    pub dy: i32,
}

impl PointerDelta {
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Component along one axis.
    #[must_use]
    pub const fn along(self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.dx,
            Axis::Vertical => self.dy,
        }
    }
}

/// Decide which axis dominates a pointer movement.
///
/// An axis dominates when its absolute delta exceeds the other's multiplied
/// by `factor`. Returns `None` for ambiguous (near-diagonal) or zero motion.
#[must_use]
pub fn dominant_axis(delta: PointerDelta, factor: f32) -> Option<Axis> {
    let ax = f64::from(delta.dx.unsigned_abs());
    let ay = f64::from(delta.dy.unsigned_abs());
    let factor = f64::from(factor.max(1.0));
    if ax == 0.0 && ay == 0.0 {
        return None;
    }
    if ax > ay * factor {
        Some(Axis::Horizontal)
    } else if ay > ax * factor {
        Some(Axis::Vertical)
    } else {
        None
    }
}

/// Pixel geometry of a rendered grid, used to map client coordinates to cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    /// Container's left edge in client pixels.
    pub container_left: f64,
    /// Container's top edge in client pixels.
    pub container_top: f64,
    /// Horizontal container padding.
    pub padding_x: f64,
    /// Vertical container padding.
    pub padding_y: f64,
    /// Horizontal gap between columns.
    pub margin_x: f64,
    /// Vertical gap between rows.
    pub margin_y: f64,
    /// Width of one column, excluding margin.
    pub col_width: f64,
    /// Height of one row, excluding margin.
    pub row_height: f64,
    pub cols: u16,
    pub max_rows: u16,
}

/// Invalid pixel geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridMetricsError {
    NonPositiveCell { col_width: f64, row_height: f64 },
    NegativeSpacing,
    ZeroColumns,
}

impl fmt::Display for GridMetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveCell {
                col_width,
                row_height,
            } => write!(
                f,
                "cell size must be positive (got {col_width}x{row_height})"
            ),
            Self::NegativeSpacing => write!(f, "padding and margins must be >= 0"),
            Self::ZeroColumns => write!(f, "grid must have at least one column"),
        }
    }
}

impl std::error::Error for GridMetricsError {}

impl GridMetrics {
    /// Validate pixel geometry.
    pub fn validate(&self) -> Result<(), GridMetricsError> {
        if !(self.col_width > 0.0 && self.row_height > 0.0) {
            return Err(GridMetricsError::NonPositiveCell {
                col_width: self.col_width,
                row_height: self.row_height,
            });
        }
        if self.padding_x < 0.0 || self.padding_y < 0.0 || self.margin_x < 0.0 || self.margin_y < 0.0
        {
            return Err(GridMetricsError::NegativeSpacing);
        }
        if self.cols == 0 {
            return Err(GridMetricsError::ZeroColumns);
        }
        Ok(())
    }

    /// Map client pixel coordinates to a grid cell.
    ///
    /// `gridX = floor((clientX - containerLeft - paddingX) / (colWidth + marginX))`,
    /// and the same for Y. Returns `None` when the result falls outside
    /// `[0, cols) × [0, max_rows)`.
    #[must_use]
    pub fn to_grid_cell(&self, client_x: f64, client_y: f64) -> Option<(u16, u16)> {
        let gx = ((client_x - self.container_left - self.padding_x)
            / (self.col_width + self.margin_x))
            .floor();
        let gy = ((client_y - self.container_top - self.padding_y)
            / (self.row_height + self.margin_y))
            .floor();
        if !gx.is_finite() || !gy.is_finite() {
            return None;
        }
        if gx < 0.0 || gy < 0.0 || gx >= f64::from(self.cols) || gy >= f64::from(self.max_rows) {
            return None;
        }
        // Bounds were checked above, so both fit in u16.
        Some((gx as u16, gy as u16))
    }

    /// Convert a pixel displacement into whole grid cells (rounded to nearest).
    #[must_use]
    pub fn to_grid_delta(&self, delta_px_x: f64, delta_px_y: f64) -> PointerDelta {
        let dx = (delta_px_x / (self.col_width + self.margin_x)).round();
        let dy = (delta_px_y / (self.row_height + self.margin_y)).round();
        PointerDelta::new(clamp_to_i32(dx), clamp_to_i32(dy))
    }

    /// Number of whole rows that fit in a viewport of `height` pixels.
    ///
    /// Each row costs `row_height + margin_y`; the trailing margin is not
    /// needed, and vertical padding is paid on both sides.
    #[must_use]
    pub fn max_rows_for_height(&self, height: f64) -> u16 {
        let usable = height - 2.0 * self.padding_y + self.margin_y;
        let rows = (usable / (self.row_height + self.margin_y)).floor();
        if !rows.is_finite() || rows < 0.0 {
            return 0;
        }
        rows.min(f64::from(u16::MAX)) as u16
    }
}

fn clamp_to_i32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    value.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> GridMetrics {
        GridMetrics {
            container_left: 100.0,
            container_top: 50.0,
            padding_x: 10.0,
            padding_y: 10.0,
            margin_x: 10.0,
            margin_y: 10.0,
            col_width: 90.0,
            row_height: 40.0,
            cols: 12,
            max_rows: 10,
        }
    }

    #[test]
    fn handle_tokens_round_trip() {
        for handle in ResizeHandle::ALL {
            assert_eq!(handle.token().parse::<ResizeHandle>(), Ok(handle));
        }
        assert!("x".parse::<ResizeHandle>().is_err());
    }

    #[test]
    fn handle_edges() {
        assert_eq!(ResizeHandle::East.edge_axis(), Some(Axis::Horizontal));
        assert_eq!(ResizeHandle::North.edge_axis(), Some(Axis::Vertical));
        assert_eq!(ResizeHandle::SouthWest.edge_axis(), None);
        assert_eq!(ResizeHandle::SouthWest.horizontal_edge(), Some(false));
        assert_eq!(ResizeHandle::SouthWest.vertical_edge(), Some(true));
    }

    #[test]
    fn dominance_requires_factor() {
        assert_eq!(
            dominant_axis(PointerDelta::new(4, 1), 1.5),
            Some(Axis::Horizontal)
        );
        assert_eq!(
            dominant_axis(PointerDelta::new(-1, -5), 1.5),
            Some(Axis::Vertical)
        );
        assert_eq!(dominant_axis(PointerDelta::new(3, 2), 1.5), None);
        assert_eq!(dominant_axis(PointerDelta::new(0, 0), 1.5), None);
    }

    #[test]
    fn grid_cell_floor_division() {
        let m = metrics();
        // First cell starts at container + padding.
        assert_eq!(m.to_grid_cell(110.0, 60.0), Some((0, 0)));
        assert_eq!(m.to_grid_cell(209.0, 109.0), Some((0, 0)));
        assert_eq!(m.to_grid_cell(210.0, 110.0), Some((1, 1)));
        assert_eq!(m.to_grid_cell(109.0, 60.0), None);
        assert_eq!(m.to_grid_cell(110.0 + 12.0 * 100.0, 60.0), None);
        assert_eq!(m.to_grid_cell(110.0, 60.0 + 10.0 * 50.0), None);
    }

    #[test]
    fn grid_delta_rounds() {
        let m = metrics();
        assert_eq!(m.to_grid_delta(149.0, -26.0), PointerDelta::new(1, -1));
        assert_eq!(m.to_grid_delta(151.0, 0.0), PointerDelta::new(2, 0));
    }

    #[test]
    fn rows_for_viewport() {
        let m = metrics();
        // (520 - 20 + 10) / 50 = 10.2
        assert_eq!(m.max_rows_for_height(520.0), 10);
        assert_eq!(m.max_rows_for_height(5.0), 0);
    }

    #[test]
    fn metrics_validation() {
        assert!(metrics().validate().is_ok());
        let bad = GridMetrics {
            col_width: 0.0,
            ..metrics()
        };
        assert!(matches!(
            bad.validate(),
            Err(GridMetricsError::NonPositiveCell { .. })
        ));
    }
}
