#![forbid(unsafe_code)]

//! Deterministic drag/resize interaction session.
//!
//! ```text
//! Idle -> Dragging -> Idle
//! Idle -> Resizing -> Idle
//! ```
//!
//! Entering a session snapshots the committed layout as the `baseline`.
//! Every pointer update recomputes the preview from that baseline, so
//! relaxing the pointer always restores neighbors to their exact original
//! positions. Ending the session commits the preview when it is legal and
//! reverts to the last valid layout otherwise. Each call returns a
//! [`SessionTransition`] describing what happened.

use gridtile_core::geometry::Rect;
use gridtile_core::pointer::{Axis, GridMetrics, PointerDelta, ResizeHandle, dominant_axis};
use serde::{Deserialize, Serialize};

use crate::adjust::{RefitMode, refit_layout};
use crate::config::{AdjustConfig, InteractionConfig};
use crate::error::LayoutError;
use crate::fit::find_all_fits;
use crate::item::{GridDims, GridItem, Layout, index_of, validate_items};
use crate::occupancy::OccupancyGrid;
use crate::push::calculate_push;
use crate::resize::calculate_resize_space;
use crate::swap::calculate_swap;

/// What the current preview shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "preview", rename_all = "snake_case")]
pub enum PreviewKind {
    /// The item sits at its baseline position and size.
    Unchanged,
    /// The dragged item moves into free space.
    Move,
    /// The dragged item trades places with `target_id`.
    Swap { target_id: String },
    /// The dragged item displaces neighbors.
    Push { pushed_ids: Vec<String> },
    /// The resized item grows, relocating `moved_ids`. `capped` when the
    /// pointer asked for more than the neighbors allow.
    Resize { moved_ids: Vec<String>, capped: bool },
    /// The pointer target is not reachable; the last legal preview is kept.
    Blocked,
}

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Dragging {
        item_id: String,
        delta: PointerDelta,
        preview: PreviewKind,
    },
    Resizing {
        item_id: String,
        handle: ResizeHandle,
        delta: PointerDelta,
        /// Axis a corner handle committed to; only this axis may move while
        /// pointer motion is ambiguous.
        axis_lock: Option<Axis>,
        preview: PreviewKind,
    },
}

impl SessionState {
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        match self {
            Self::Idle => SessionPhase::Idle,
            Self::Dragging { .. } => SessionPhase::Dragging,
            Self::Resizing { .. } => SessionPhase::Resizing,
        }
    }

    /// Id of the item under interaction.
    #[must_use]
    pub fn item_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Dragging { item_id, .. } | Self::Resizing { item_id, .. } => Some(item_id),
        }
    }
}

/// Fieldless view of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Dragging,
    Resizing,
}

/// Explicit no-op diagnostics for inputs that are safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionNoopReason {
    IdleWithoutActiveSession,
    SessionAlreadyActive,
    BelowDragThreshold,
}

/// Why a session ended without committing its preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertReason {
    /// The final pointer target was not reachable.
    Blocked,
    Canceled,
    /// The grid changed under the session.
    ViewportChanged,
    /// The preview failed re-validation.
    InvalidPreview,
}

/// Effect emitted by one lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum SessionEffect {
    Started {
        item_id: String,
    },
    PreviewUpdated {
        item_id: String,
        preview: PreviewKind,
    },
    Committed {
        item_id: String,
        preview: PreviewKind,
    },
    Reverted {
        item_id: String,
        reason: RevertReason,
    },
    Noop {
        reason: SessionNoopReason,
    },
}

/// One deterministic lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTransition {
    pub transition_id: u64,
    pub from: SessionPhase,
    pub to: SessionPhase,
    pub effect: SessionEffect,
}

/// Outcome of [`InteractionSession::set_max_rows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportChange {
    pub mode: RefitMode,
    /// Forced revert of the session that was active, if any.
    pub reverted: Option<SessionTransition>,
}

/// Owner of the committed layout and of the one active interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSession {
    state: SessionState,
    dims: GridDims,
    interaction: InteractionConfig,
    adjust: AdjustConfig,
    last_valid: Layout,
    baseline: Layout,
    preview: Layout,
    transition_counter: u64,
}

impl InteractionSession {
    /// Idle session over `layout`, which must be valid for `dims`.
    pub fn new(
        layout: Layout,
        dims: GridDims,
        interaction: InteractionConfig,
        adjust: AdjustConfig,
    ) -> Result<Self, LayoutError> {
        layout.validate(dims)?;
        Ok(Self {
            state: SessionState::Idle,
            dims,
            interaction,
            adjust,
            baseline: layout.clone(),
            preview: layout.clone(),
            last_valid: layout,
            transition_counter: 0,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, SessionState::Idle)
    }

    /// Layout to render: the preview while a session is active, the
    /// committed layout otherwise.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.preview
    }

    /// Most recent committed layout.
    #[must_use]
    pub const fn last_valid(&self) -> &Layout {
        &self.last_valid
    }

    /// Layout captured when the active session started.
    #[must_use]
    pub const fn baseline(&self) -> &Layout {
        &self.baseline
    }

    #[must_use]
    pub const fn transition_count(&self) -> u64 {
        self.transition_counter
    }

    /// Replace the committed layout (widget add/remove, preset load).
    ///
    /// Only legal while idle.
    pub fn replace_layout(&mut self, layout: Layout) -> Result<(), LayoutError> {
        if self.is_active() {
            return Err(LayoutError::SessionActive);
        }
        layout.validate(self.dims)?;
        self.baseline = layout.clone();
        self.preview = layout.clone();
        self.last_valid = layout;
        Ok(())
    }

    /// Start dragging `item_id`.
    pub fn begin_drag(&mut self, item_id: &str) -> Result<SessionTransition, LayoutError> {
        self.begin(item_id, |item_id| SessionState::Dragging {
            item_id,
            delta: PointerDelta::default(),
            preview: PreviewKind::Unchanged,
        })
    }

    /// Start resizing `item_id` from `handle`.
    pub fn begin_resize(
        &mut self,
        item_id: &str,
        handle: ResizeHandle,
    ) -> Result<SessionTransition, LayoutError> {
        self.begin(item_id, |item_id| SessionState::Resizing {
            item_id,
            handle,
            delta: PointerDelta::default(),
            axis_lock: None,
            preview: PreviewKind::Unchanged,
        })
    }

    fn begin(
        &mut self,
        item_id: &str,
        state: impl FnOnce(String) -> SessionState,
    ) -> Result<SessionTransition, LayoutError> {
        let from = self.state.phase();
        if self.is_active() {
            return Ok(self.noop(from, SessionNoopReason::SessionAlreadyActive));
        }
        if !self.last_valid.contains(item_id) {
            return Err(LayoutError::UnknownItem {
                id: item_id.to_owned(),
            });
        }
        self.baseline = self.last_valid.clone();
        self.preview = self.last_valid.clone();
        self.state = state(item_id.to_owned());
        Ok(self.emit(
            from,
            SessionEffect::Started {
                item_id: item_id.to_owned(),
            },
        ))
    }

    /// Apply the pointer displacement since the session started, in cells.
    pub fn update(&mut self, delta: PointerDelta) -> SessionTransition {
        let from = self.state.phase();
        let (item_id, preview) = match self.state.clone() {
            SessionState::Idle => {
                return self.noop(from, SessionNoopReason::IdleWithoutActiveSession);
            }
            SessionState::Dragging { item_id, .. } => {
                let preview = self.preview_drag(&item_id, delta);
                self.state = SessionState::Dragging {
                    item_id: item_id.clone(),
                    delta,
                    preview: preview.clone(),
                };
                (item_id, preview)
            }
            SessionState::Resizing {
                item_id,
                handle,
                axis_lock,
                ..
            } => {
                let (preview, axis_lock) = self.preview_resize(&item_id, handle, delta, axis_lock);
                self.state = SessionState::Resizing {
                    item_id: item_id.clone(),
                    handle,
                    delta,
                    axis_lock,
                    preview: preview.clone(),
                };
                (item_id, preview)
            }
        };
        self.emit(from, SessionEffect::PreviewUpdated { item_id, preview })
    }

    /// [`update`](Self::update) from a pixel displacement. Movements shorter
    /// than the configured drag threshold are ignored.
    pub fn update_px(&mut self, dx_px: f64, dy_px: f64, metrics: &GridMetrics) -> SessionTransition {
        let from = self.state.phase();
        if !self.is_active() {
            return self.noop(from, SessionNoopReason::IdleWithoutActiveSession);
        }
        if dx_px.hypot(dy_px) < self.interaction.drag_threshold {
            return self.noop(from, SessionNoopReason::BelowDragThreshold);
        }
        self.update(metrics.to_grid_delta(dx_px, dy_px))
    }

    /// Valid drop positions for the dragged item, in scan order.
    #[must_use]
    pub fn drop_targets(&self) -> Vec<Rect> {
        let SessionState::Dragging { item_id, .. } = &self.state else {
            return Vec::new();
        };
        let Some(item) = self.baseline.get(item_id) else {
            return Vec::new();
        };
        let grid = OccupancyGrid::build(
            &self.baseline,
            self.dims.cols,
            self.dims.max_rows,
            Some(item_id),
        );
        find_all_fits(&grid, item.w, item.h)
    }

    /// Finish the session: commit a swap or a legal preview, revert otherwise.
    pub fn end(&mut self) -> SessionTransition {
        let from = self.state.phase();
        let (item_id, preview) = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Idle => {
                return self.noop(from, SessionNoopReason::IdleWithoutActiveSession);
            }
            SessionState::Dragging {
                item_id, preview, ..
            }
            | SessionState::Resizing {
                item_id, preview, ..
            } => (item_id, preview),
        };

        let committed = match &preview {
            PreviewKind::Blocked => Err(RevertReason::Blocked),
            PreviewKind::Swap { target_id } => calculate_swap(
                &self.baseline,
                &item_id,
                target_id,
                self.dims.cols,
                self.dims.max_rows,
            )
            .ok_or(RevertReason::Blocked),
            _ => Ok(self.preview.to_vec()),
        }
        .and_then(|items| {
            Layout::validated(items, self.dims).map_err(|_| RevertReason::InvalidPreview)
        });

        match committed {
            Ok(layout) => {
                self.last_valid = layout;
                self.reset_to_last_valid();
                self.emit(from, SessionEffect::Committed { item_id, preview })
            }
            Err(reason) => {
                self.reset_to_last_valid();
                self.emit(from, SessionEffect::Reverted { item_id, reason })
            }
        }
    }

    /// Abandon the session and restore the last valid layout.
    pub fn cancel(&mut self) -> SessionTransition {
        self.force_revert(RevertReason::Canceled)
            .unwrap_or_else(|| {
                let from = self.state.phase();
                self.noop(from, SessionNoopReason::IdleWithoutActiveSession)
            })
    }

    /// Change the row budget and refit the committed layout.
    ///
    /// An active session survives only when the committed layout fits the
    /// new grid as-is and its preview still validates there. Otherwise it is
    /// force-reverted, including when the refit fails; the grid itself is
    /// left unchanged on error.
    pub fn set_max_rows(&mut self, max_rows: u16) -> Result<ViewportChange, LayoutError> {
        let dims = GridDims::new(self.dims.cols, max_rows);
        if dims == self.dims {
            return Ok(ViewportChange {
                mode: RefitMode::Unchanged,
                reverted: None,
            });
        }
        let refit = refit_layout(&self.last_valid, dims, &self.adjust)
            .and_then(|(items, mode)| Ok((Layout::validated(items, dims)?, mode)));
        let (layout, mode) = match refit {
            Ok(refit) => refit,
            Err(err) => {
                self.force_revert(RevertReason::ViewportChanged);
                return Err(err);
            }
        };

        let preview_fits = mode == RefitMode::Unchanged && self.preview.validate(dims).is_ok();
        let reverted = if preview_fits {
            None
        } else {
            self.force_revert(RevertReason::ViewportChanged)
        };
        self.dims = dims;
        if !self.is_active() {
            self.last_valid = layout;
            self.reset_to_last_valid();
        }
        tracing::debug!(
            target: "gridtile.session",
            max_rows,
            mode = ?mode,
            kept_session = self.is_active(),
            "grid rows changed"
        );
        Ok(ViewportChange { mode, reverted })
    }

    fn force_revert(&mut self, reason: RevertReason) -> Option<SessionTransition> {
        let from = self.state.phase();
        let item_id = self.state.item_id()?.to_owned();
        self.state = SessionState::Idle;
        self.reset_to_last_valid();
        if reason != RevertReason::Canceled {
            tracing::warn!(
                target: "gridtile.session",
                item_id = %item_id,
                reason = ?reason,
                "active session force-reverted"
            );
        }
        Some(self.emit(from, SessionEffect::Reverted { item_id, reason }))
    }

    fn reset_to_last_valid(&mut self) {
        self.baseline = self.last_valid.clone();
        self.preview = self.last_valid.clone();
    }

    fn noop(&mut self, from: SessionPhase, reason: SessionNoopReason) -> SessionTransition {
        self.emit(from, SessionEffect::Noop { reason })
    }

    fn emit(&mut self, from: SessionPhase, effect: SessionEffect) -> SessionTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        let transition = SessionTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state.phase(),
            effect,
        };
        tracing::debug!(
            target: "gridtile.session",
            transition_id = transition.transition_id,
            from = ?transition.from,
            to = ?transition.to,
            effect = ?transition.effect,
            "session transition"
        );
        transition
    }

    fn set_preview(&mut self, items: Vec<GridItem>) {
        if let Ok(layout) = Layout::new(items) {
            self.preview = layout;
        }
    }

    fn preview_drag(&mut self, item_id: &str, delta: PointerDelta) -> PreviewKind {
        let Some(item) = self.baseline.get(item_id) else {
            return PreviewKind::Blocked;
        };
        let origin = item.rect();
        let candidate = drag_target(origin, delta, self.dims);
        let baseline = self.baseline.to_vec();

        if candidate == origin {
            self.preview = self.baseline.clone();
            return PreviewKind::Unchanged;
        }

        let others = OccupancyGrid::build(&baseline, self.dims.cols, self.dims.max_rows, Some(item_id));
        if others.can_fit_rect(candidate) {
            self.set_preview(with_rect(&baseline, item_id, candidate));
            return PreviewKind::Move;
        }

        let swap = largest_overlap(&baseline, item_id, candidate).and_then(|target_id| {
            calculate_swap(&baseline, item_id, &target_id, self.dims.cols, self.dims.max_rows)
                .map(|swapped| (target_id, swapped))
        });
        if let Some((target_id, swapped)) = swap {
            self.set_preview(swapped);
            return PreviewKind::Swap { target_id };
        }

        let pushed = calculate_push(&baseline, candidate, self.dims, Some(item_id));
        if pushed.can_push {
            let items = with_rect(&pushed.items, item_id, candidate);
            if validate_items(&items, self.dims).is_ok() {
                self.set_preview(items);
                return PreviewKind::Push {
                    pushed_ids: pushed.pushed_ids,
                };
            }
        }
        PreviewKind::Blocked
    }

    fn preview_resize(
        &mut self,
        item_id: &str,
        handle: ResizeHandle,
        delta: PointerDelta,
        axis_lock: Option<Axis>,
    ) -> (PreviewKind, Option<Axis>) {
        let Some(item) = self.baseline.get(item_id).cloned() else {
            return (PreviewKind::Blocked, axis_lock);
        };
        let dims = self.dims;
        let origin = item.rect();

        // Edge handles push along their own axis. Corner handles push along
        // the dominant axis and grow the other one into free space only; when
        // neither axis dominates, only the locked axis moves, without pushing.
        let (push_axis, free_axis, axis_lock) = match handle.edge_axis() {
            Some(axis) => (Some(axis), None, None),
            None => match dominant_axis(delta, self.interaction.dominance_factor) {
                Some(axis) => (Some(axis), Some(axis.cross()), Some(axis)),
                None => (None, axis_lock, axis_lock),
            },
        };

        let mut items = self.baseline.to_vec();
        let mut rect = origin;
        let mut moved_ids = Vec::new();

        if let Some(axis) = push_axis {
            for step in toward_zero(delta.along(axis), axis, dims) {
                let candidate = resize_rect(origin, &item, handle, axis, step, dims);
                if candidate == origin {
                    break;
                }
                let outcome = calculate_resize_space(&items, item_id, candidate, dims);
                if outcome.can_resize {
                    items = outcome.items;
                    rect = candidate;
                    moved_ids = outcome.moved_ids;
                    break;
                }
            }
        }

        if let Some(axis) = free_axis {
            let grid = OccupancyGrid::build(&items, dims.cols, dims.max_rows, Some(item_id));
            for step in toward_zero(delta.along(axis), axis, dims) {
                let candidate = resize_rect(rect, &item, handle, axis, step, dims);
                if candidate == rect {
                    break;
                }
                if grid.can_fit_rect(candidate) {
                    rect = candidate;
                    break;
                }
            }
            items = with_rect(&items, item_id, rect);
        }

        let mut wanted = origin;
        for axis in push_axis.into_iter().chain(free_axis) {
            wanted = resize_rect(wanted, &item, handle, axis, delta.along(axis), dims);
        }
        let capped = rect != wanted;

        let preview = if rect == origin && !capped {
            PreviewKind::Unchanged
        } else {
            PreviewKind::Resize { moved_ids, capped }
        };
        self.set_preview(items);
        (preview, axis_lock)
    }
}

/// Drag destination clamped into the grid.
fn drag_target(origin: Rect, delta: PointerDelta, dims: GridDims) -> Rect {
    let max_x = i32::from(dims.cols.saturating_sub(origin.width));
    let max_y = i32::from(dims.max_rows.saturating_sub(origin.height));
    let x = (i32::from(origin.x) + delta.dx).clamp(0, max_x);
    let y = (i32::from(origin.y) + delta.dy).clamp(0, max_y);
    origin.with_position(
        u16::try_from(x).unwrap_or(origin.x),
        u16::try_from(y).unwrap_or(origin.y),
    )
}

/// Item whose footprint shares the most cells with `zone`; ties keep layout
/// order.
fn largest_overlap(items: &[GridItem], exclude: &str, zone: Rect) -> Option<String> {
    items
        .iter()
        .filter(|item| item.id != exclude)
        .filter_map(|item| {
            item.rect()
                .intersection_opt(&zone)
                .map(|shared| (item, shared.area()))
        })
        .fold(None, |best: Option<(&GridItem, u32)>, (item, area)| match best {
            Some((_, best_area)) if best_area >= area => best,
            _ => Some((item, area)),
        })
        .map(|(item, _)| item.id.clone())
}

fn with_rect(items: &[GridItem], id: &str, rect: Rect) -> Vec<GridItem> {
    let mut items = items.to_vec();
    if let Some(index) = index_of(&items, id) {
        items[index].set_rect(rect);
    }
    items
}

/// Deltas from `full` back to zero, bounded by the grid extent along `axis`.
fn toward_zero(full: i32, axis: Axis, dims: GridDims) -> Vec<i32> {
    let extent = i32::from(match axis {
        Axis::Horizontal => dims.cols,
        Axis::Vertical => dims.max_rows,
    });
    let full = full.clamp(-extent, extent);
    if full >= 0 {
        (0..=full).rev().collect()
    } else {
        (full..=0).collect()
    }
}

/// `base` with the handle's edge on `axis` moved by `delta`, clamped to the
/// item's size limits and the grid. The opposite edge stays fixed.
fn resize_rect(
    base: Rect,
    item: &GridItem,
    handle: ResizeHandle,
    axis: Axis,
    delta: i32,
    dims: GridDims,
) -> Rect {
    match axis {
        Axis::Horizontal => match handle.horizontal_edge() {
            Some(true) => {
                let room = dims.cols.saturating_sub(base.x);
                let w = clamp_len(base.width, delta, item.min_w, item.max_w, room);
                base.with_size(w, base.height)
            }
            Some(false) => {
                let right = base.right();
                let w = clamp_len(base.width, -delta, item.min_w, item.max_w, right);
                Rect::new(right - w, base.y, w, base.height)
            }
            None => base,
        },
        Axis::Vertical => match handle.vertical_edge() {
            Some(true) => {
                let room = dims.max_rows.saturating_sub(base.y);
                let h = clamp_len(base.height, delta, item.min_h, item.max_h, room);
                base.with_size(base.width, h)
            }
            Some(false) => {
                let bottom = base.bottom();
                let h = clamp_len(base.height, -delta, item.min_h, item.max_h, bottom);
                Rect::new(base.x, bottom - h, base.width, h)
            }
            None => base,
        },
    }
}

fn clamp_len(current: u16, delta: i32, min: u16, max: Option<u16>, room: u16) -> u16 {
    let upper = max.unwrap_or(u16::MAX).min(room).max(min);
    let wanted = (i32::from(current) + delta).clamp(i32::from(min), i32::from(upper));
    u16::try_from(wanted).unwrap_or(current)
}
