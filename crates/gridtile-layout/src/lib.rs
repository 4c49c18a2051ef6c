#![forbid(unsafe_code)]

//! Widget placement engine for a fixed-column, bounded-row grid.
//!
//! # Role in gridtile
//! `gridtile-layout` owns every rule about where widgets may sit. Returned
//! layouts never contain overlapping items, never leave the grid, and never
//! shrink an item below its declared minimum.
//!
//! Components, leaves first:
//! - [`occupancy`]: boolean cell matrix built from an item set.
//! - [`fit`]: row-major first-fit and all-fit search.
//! - [`repack`]: greedy re-placement under several orderings.
//! - [`push`] and [`resize`]: directional chain pushes for drops and live
//!   resizes.
//! - [`swap`]: all-or-nothing position exchange.
//! - [`session`]: the drag/resize interaction state machine.
//! - [`adjust`]: repack-then-shrink planning when a new widget needs room.
//! - [`dashboard`]: widgets, snapshots, and viewport changes on top of the
//!   rest.
//!
//! # Logging
//! Components emit `tracing` events under `gridtile.*` targets. No subscriber
//! is installed here.

pub mod adjust;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fit;
pub mod item;
pub mod occupancy;
pub mod push;
pub mod repack;
pub mod resize;
pub mod session;
pub mod snapshot;
pub mod swap;
pub mod widget;

pub use gridtile_core::geometry::Rect;
pub use gridtile_core::pointer::{Axis, GridMetrics, GridMetricsError, PointerDelta, ResizeHandle};

pub use adjust::{AdjustPlan, AdjustStrategy, RefitMode, plan_insertion, refit_layout};
pub use config::{AdjustConfig, ConfigError, EngineConfig, GridConfig, InteractionConfig};
pub use dashboard::{Dashboard, DashboardError, Placement};
pub use error::LayoutError;
pub use fit::{find_all_fits, find_first_fit};
pub use item::{GridDims, GridItem, Layout, validate_items};
pub use occupancy::OccupancyGrid;
pub use push::{PushDirection, PushOutcome, calculate_push};
pub use repack::{RepackResult, RepackStrategy, repack, repack_optimal};
pub use resize::{ResizeOutcome, calculate_resize_space};
pub use session::{
    InteractionSession, PreviewKind, RevertReason, SessionEffect, SessionNoopReason, SessionPhase,
    SessionState, SessionTransition, ViewportChange,
};
pub use snapshot::{LayoutSnapshot, LayoutStore, MemoryStore, SNAPSHOT_VERSION, SnapshotError};
pub use swap::calculate_swap;
pub use widget::{
    DropPayload, SizeRegistry, WidgetError, WidgetInstance, WidgetKind, WidgetSizeSpec,
    WidgetType,
};
