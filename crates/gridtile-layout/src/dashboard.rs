//! Dashboard facade: widgets, their layout, and the interaction session.
//!
//! [`Dashboard`] is the single owner of dashboard state. Widget instances and
//! layout items are kept one-to-one; every mutation goes through a method
//! here so the two never drift apart.

use std::fmt;

use gridtile_core::geometry::Rect;
use gridtile_core::pointer::{GridMetrics, GridMetricsError, PointerDelta, ResizeHandle};

use crate::adjust::{AdjustStrategy, RefitMode, plan_insertion};
use crate::config::{ConfigError, EngineConfig};
use crate::error::LayoutError;
use crate::item::{GridDims, GridItem, Layout};
use crate::occupancy::OccupancyGrid;
use crate::push::calculate_push;
use crate::session::{InteractionSession, SessionTransition, ViewportChange};
use crate::snapshot::{LayoutSnapshot, LayoutStore, SnapshotError};
use crate::widget::{DropPayload, WidgetError, WidgetInstance, WidgetKind};

/// Where a new widget ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub id: String,
    pub rect: Rect,
    /// How room was found for an added widget.
    pub strategy: AdjustStrategy,
    /// Items displaced by a drop.
    pub pushed_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    config: EngineConfig,
    session: InteractionSession,
    widgets: Vec<WidgetInstance>,
    next_id: u64,
}

impl Dashboard {
    /// Empty dashboard on the configured initial grid.
    pub fn new(config: EngineConfig) -> Result<Self, DashboardError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors).into());
        }
        let session = InteractionSession::new(
            Layout::empty(),
            config.grid.initial_dims(),
            config.interaction,
            config.adjust,
        )?;
        Ok(Self {
            config,
            session,
            widgets: Vec::new(),
            next_id: 1,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The interaction session, for reading state and previews.
    #[must_use]
    pub const fn session(&self) -> &InteractionSession {
        &self.session
    }

    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.session.dims()
    }

    /// Layout to render (the live preview during an interaction).
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        self.session.layout()
    }

    #[must_use]
    pub fn widgets(&self) -> &[WidgetInstance] {
        &self.widgets
    }

    #[must_use]
    pub fn widget(&self, id: &str) -> Option<&WidgetInstance> {
        self.widgets.iter().find(|widget| widget.id == id)
    }

    /// Committed grid item of a widget.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&GridItem> {
        self.session.last_valid().get(id)
    }

    /// Add a widget at the first free position, making room through the
    /// auto-adjust planner when there is none.
    pub fn add_widget(
        &mut self,
        kind: WidgetKind,
        title: impl Into<String>,
    ) -> Result<Placement, DashboardError> {
        self.ensure_idle()?;
        let (id, next_id) = self.next_free_id(&kind);
        let request = self.config.widgets.get(kind.widget_type()).item_at(&id, 0, 0);
        let plan = plan_insertion(
            self.session.last_valid(),
            &request,
            self.dims(),
            &self.config.adjust,
        )?;
        self.session.replace_layout(Layout::new(plan.items)?)?;
        self.next_id = next_id;
        self.widgets.push(WidgetInstance {
            id: id.clone(),
            title: title.into(),
            widget: kind,
        });
        tracing::debug!(
            target: "gridtile.dashboard",
            id = %id,
            rect = %plan.placed.rect(),
            strategy = ?plan.strategy,
            shrunk = plan.shrunk_ids.len(),
            "widget added"
        );
        Ok(Placement {
            id,
            rect: plan.placed.rect(),
            strategy: plan.strategy,
            pushed_ids: Vec::new(),
        })
    }

    /// Place a dragged-in widget with its top-left corner at `cell`, pushing
    /// neighbors out of the way when the cell range is occupied.
    pub fn drop_widget(
        &mut self,
        payload: &DropPayload,
        cell: (u16, u16),
    ) -> Result<Placement, DashboardError> {
        self.ensure_idle()?;
        let kind = payload.resolve()?;
        let dims = self.dims();
        let (id, next_id) = self.next_free_id(&kind);
        let spec = self.config.widgets.get(kind.widget_type());
        let x = cell.0.min(dims.cols.saturating_sub(spec.w));
        let y = cell.1.min(dims.max_rows.saturating_sub(spec.h));
        let dropped = spec.item_at(&id, x, y);
        dropped.validate(dims)?;

        let current = self.session.last_valid();
        let grid = OccupancyGrid::build(current, dims.cols, dims.max_rows, None);
        let (mut items, pushed_ids) = if grid.can_fit_rect(dropped.rect()) {
            (current.to_vec(), Vec::new())
        } else {
            let outcome = calculate_push(current, dropped.rect(), dims, None);
            if !outcome.can_push {
                tracing::debug!(
                    target: "gridtile.dashboard",
                    id = %id,
                    zone = %dropped.rect(),
                    "drop blocked"
                );
                return Err(LayoutError::Blocked { id }.into());
            }
            (outcome.items, outcome.pushed_ids)
        };
        let rect = dropped.rect();
        items.push(dropped);
        self.session.replace_layout(Layout::validated(items, dims)?)?;
        self.next_id = next_id;

        let title = if payload.title.is_empty() {
            kind.widget_type().to_string()
        } else {
            payload.title.clone()
        };
        self.widgets.push(WidgetInstance {
            id: id.clone(),
            title,
            widget: kind,
        });
        tracing::debug!(
            target: "gridtile.dashboard",
            id = %id,
            rect = %rect,
            pushed = pushed_ids.len(),
            "widget dropped"
        );
        Ok(Placement {
            id,
            rect,
            strategy: AdjustStrategy::Direct,
            pushed_ids,
        })
    }

    /// Remove a widget and its layout item. Remaining items keep their
    /// positions.
    pub fn remove_widget(&mut self, id: &str) -> Result<WidgetInstance, DashboardError> {
        self.ensure_idle()?;
        let index = self
            .widgets
            .iter()
            .position(|widget| widget.id == id)
            .ok_or_else(|| LayoutError::UnknownItem { id: id.to_owned() })?;
        let mut layout = self.session.last_valid().clone();
        layout.remove(id);
        self.session.replace_layout(layout)?;
        tracing::debug!(target: "gridtile.dashboard", id, "widget removed");
        Ok(self.widgets.remove(index))
    }

    /// Replace the whole dashboard with a preset, refitting it to the
    /// current grid.
    pub fn load_preset(&mut self, preset: LayoutSnapshot) -> Result<RefitMode, DashboardError> {
        self.ensure_idle()?;
        let restored = preset.restore(self.dims(), &self.config.adjust)?;
        self.session.replace_layout(restored.layout)?;
        self.widgets = restored.widgets;
        tracing::debug!(
            target: "gridtile.dashboard",
            widgets = self.widgets.len(),
            mode = ?restored.mode,
            "preset loaded"
        );
        Ok(restored.mode)
    }

    /// Remove every widget.
    pub fn reset(&mut self) -> Result<(), DashboardError> {
        self.ensure_idle()?;
        self.session.replace_layout(Layout::empty())?;
        self.widgets.clear();
        self.next_id = 1;
        Ok(())
    }

    /// Recompute the row budget from the viewport height.
    ///
    /// A shrinking viewport re-fits the committed layout and cancels an
    /// interaction whose preview no longer fits. On error the grid is left
    /// unchanged.
    pub fn set_viewport_height(
        &mut self,
        metrics: &GridMetrics,
        height: f64,
    ) -> Result<ViewportChange, DashboardError> {
        metrics.validate()?;
        let rows = metrics.max_rows_for_height(height).max(1);
        Ok(self.session.set_max_rows(rows)?)
    }

    /// Set the row budget directly.
    pub fn set_max_rows(&mut self, rows: u16) -> Result<ViewportChange, DashboardError> {
        Ok(self.session.set_max_rows(rows.max(1))?)
    }

    /// Serialized form of the committed state.
    #[must_use]
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot::new(self.session.last_valid().to_vec(), self.widgets.clone())
    }

    pub fn save(&self, store: &mut impl LayoutStore) -> Result<(), DashboardError> {
        store.save(&self.snapshot())?;
        Ok(())
    }

    /// Restore from `store`. Returns `None` when the store is empty.
    ///
    /// A stored document that cannot be restored is cleared, and the
    /// dashboard keeps its current state.
    pub fn load(
        &mut self,
        store: &mut impl LayoutStore,
    ) -> Result<Option<RefitMode>, DashboardError> {
        let snapshot = match store.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Ok(None),
            Err(err) => {
                tracing::warn!(target: "gridtile.dashboard", error = %err, "discarding stored layout");
                store.clear()?;
                return Err(err.into());
            }
        };
        match self.load_preset(snapshot) {
            Ok(mode) => Ok(Some(mode)),
            Err(DashboardError::Snapshot(err)) => {
                tracing::warn!(target: "gridtile.dashboard", error = %err, "discarding stored layout");
                store.clear()?;
                Err(err.into())
            }
            Err(err) => Err(err),
        }
    }

    pub fn begin_drag(&mut self, id: &str) -> Result<SessionTransition, DashboardError> {
        Ok(self.session.begin_drag(id)?)
    }

    pub fn begin_resize(
        &mut self,
        id: &str,
        handle: ResizeHandle,
    ) -> Result<SessionTransition, DashboardError> {
        Ok(self.session.begin_resize(id, handle)?)
    }

    /// Pointer displacement in cells since the interaction started.
    pub fn pointer_moved(&mut self, delta: PointerDelta) -> SessionTransition {
        self.session.update(delta)
    }

    /// Pointer displacement in pixels since the interaction started.
    pub fn pointer_moved_px(
        &mut self,
        dx: f64,
        dy: f64,
        metrics: &GridMetrics,
    ) -> SessionTransition {
        self.session.update_px(dx, dy, metrics)
    }

    pub fn end_interaction(&mut self) -> SessionTransition {
        self.session.end()
    }

    pub fn cancel_interaction(&mut self) -> SessionTransition {
        self.session.cancel()
    }

    fn ensure_idle(&self) -> Result<(), LayoutError> {
        if self.session.is_active() {
            Err(LayoutError::SessionActive)
        } else {
            Ok(())
        }
    }

    /// `"{type}-{n}"`, skipping ids already taken, and the counter value
    /// to store once the widget is actually placed.
    fn next_free_id(&self, kind: &WidgetKind) -> (String, u64) {
        let mut n = self.next_id;
        loop {
            let id = format!("{}-{}", kind.widget_type(), n);
            n += 1;
            if self.widget(&id).is_none() && !self.session.last_valid().contains(&id) {
                return (id, n);
            }
        }
    }
}

/// Failure of a dashboard operation. The dashboard is unchanged when one is
/// returned.
#[derive(Debug)]
pub enum DashboardError {
    Config(ConfigError),
    Metrics(GridMetricsError),
    Layout(LayoutError),
    Widget(WidgetError),
    Snapshot(SnapshotError),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Metrics(e) => write!(f, "invalid grid metrics: {e}"),
            Self::Layout(e) => write!(f, "layout error: {e}"),
            Self::Widget(e) => write!(f, "widget error: {e}"),
            Self::Snapshot(e) => write!(f, "snapshot error: {e}"),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Metrics(e) => Some(e),
            Self::Layout(e) => Some(e),
            Self::Widget(e) => Some(e),
            Self::Snapshot(e) => Some(e),
        }
    }
}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<GridMetricsError> for DashboardError {
    fn from(err: GridMetricsError) -> Self {
        Self::Metrics(err)
    }
}

impl From<LayoutError> for DashboardError {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<WidgetError> for DashboardError {
    fn from(err: WidgetError) -> Self {
        Self::Widget(err)
    }
}

impl From<SnapshotError> for DashboardError {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}
