//! Engine error taxonomy.
//!
//! Every variant is a *policy outcome*: expected infeasibility is reported
//! through these values, never through panics. Push and swap calculations
//! report infeasibility through their outcome types instead
//! ([`PushOutcome::can_push`](crate::push::PushOutcome),
//! `Option` from [`calculate_swap`](crate::swap::calculate_swap)).

use std::fmt;

use gridtile_core::geometry::Rect;

/// Failure of a layout operation. No partial mutation is ever applied when
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Placement exits `[0, cols) × [0, max_rows)`.
    OutOfBounds {
        id: String,
        rect: Rect,
        cols: u16,
        max_rows: u16,
    },
    /// Placement, push, or swap collides with an item that cannot be displaced.
    Blocked { id: String },
    /// No item can shrink further without dropping below its declared minimum.
    ExceedsMinimum { id: String },
    /// Minimum area of the existing items plus the request exceeds the grid.
    CapacityExceeded { required: u32, capacity: u32 },
    UnknownItem { id: String },
    DuplicateId { id: String },
    /// Size violates the item's own min/max declaration.
    InvalidSize {
        id: String,
        width: u16,
        height: u16,
        reason: &'static str,
    },
    /// Two items of a supplied layout overlap.
    Overlap { first: String, second: String },
    /// The operation is only legal while no interaction session is active.
    SessionActive,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                id,
                rect,
                cols,
                max_rows,
            } => write!(
                f,
                "item {id:?} at {rect} exits the {cols}x{max_rows} grid"
            ),
            Self::Blocked { id } => write!(f, "item {id:?} is blocked by an immovable neighbor"),
            Self::ExceedsMinimum { id } => write!(
                f,
                "cannot make room for {id:?}: every item is already at its minimum size"
            ),
            Self::CapacityExceeded { required, capacity } => write!(
                f,
                "layout needs at least {required} cells but the grid holds {capacity}"
            ),
            Self::UnknownItem { id } => write!(f, "no item with id {id:?}"),
            Self::DuplicateId { id } => write!(f, "duplicate item id {id:?}"),
            Self::InvalidSize {
                id,
                width,
                height,
                reason,
            } => write!(f, "item {id:?} has invalid size {width}x{height}: {reason}"),
            Self::Overlap { first, second } => {
                write!(f, "items {first:?} and {second:?} overlap")
            }
            Self::SessionActive => write!(f, "an interaction session is active"),
        }
    }
}

impl std::error::Error for LayoutError {}
