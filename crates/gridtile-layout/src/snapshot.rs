//! Persisted layout schema v1 and restore-time re-validation.
//!
//! The document is `{version, layouts, widgets}`. Storage itself is the
//! host's concern and sits behind [`LayoutStore`]. A snapshot written for a
//! taller viewport is re-fitted to the current grid on restore through
//! [`refit_layout`].

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::adjust::{RefitMode, refit_layout};
use crate::config::AdjustConfig;
use crate::error::LayoutError;
use crate::item::{GridDims, GridItem, Layout};
use crate::widget::WidgetInstance;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Serialized dashboard state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub version: u16,
    pub layouts: Vec<GridItem>,
    pub widgets: Vec<WidgetInstance>,
}

/// A snapshot that satisfies every layout invariant for the current grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub layout: Layout,
    pub widgets: Vec<WidgetInstance>,
    pub mode: RefitMode,
}

impl LayoutSnapshot {
    #[must_use]
    pub fn new(layouts: Vec<GridItem>, widgets: Vec<WidgetInstance>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            layouts,
            widgets,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Json)
    }

    /// Decode and check the schema (not the geometry).
    pub fn from_json(s: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(s).map_err(SnapshotError::Json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Schema checks: version, unique ids, and a one-to-one match between
    /// layout items and widgets.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let mut seen = FxHashSet::default();
        for id in self.widgets.iter().map(|widget| &widget.id) {
            if !seen.insert(id.as_str()) {
                return Err(SnapshotError::Duplicate { id: id.clone() });
            }
        }
        seen.clear();
        for id in self.layouts.iter().map(|item| &item.id) {
            if !seen.insert(id.as_str()) {
                return Err(SnapshotError::Duplicate { id: id.clone() });
            }
        }
        for widget in &self.widgets {
            if !self.layouts.iter().any(|item| item.id == widget.id) {
                return Err(SnapshotError::Orphan {
                    id: widget.id.clone(),
                });
            }
        }
        for item in &self.layouts {
            if !self.widgets.iter().any(|widget| widget.id == item.id) {
                return Err(SnapshotError::Orphan {
                    id: item.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Re-validate against `dims`, refitting when the grid no longer holds
    /// the stored layout.
    pub fn restore(self, dims: GridDims, adjust: &AdjustConfig) -> Result<Restored, SnapshotError> {
        self.validate()?;
        let (items, mode) = refit_layout(&self.layouts, dims, adjust)?;
        if mode != RefitMode::Unchanged {
            tracing::warn!(
                target: "gridtile.dashboard",
                cols = dims.cols,
                max_rows = dims.max_rows,
                mode = ?mode,
                "stored layout did not fit the grid"
            );
        }
        Ok(Restored {
            layout: Layout::validated(items, dims)?,
            widgets: self.widgets,
            mode,
        })
    }
}

/// Key-value persistence of one snapshot.
pub trait LayoutStore {
    fn load(&self) -> Result<Option<LayoutSnapshot>, SnapshotError>;
    fn save(&mut self, snapshot: &LayoutSnapshot) -> Result<(), SnapshotError>;
    fn clear(&mut self) -> Result<(), SnapshotError>;
}

/// Store keeping the serialized document in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Option<String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document, if any.
    #[must_use]
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl LayoutStore for MemoryStore {
    fn load(&self) -> Result<Option<LayoutSnapshot>, SnapshotError> {
        self.document
            .as_deref()
            .map(LayoutSnapshot::from_json)
            .transpose()
    }

    fn save(&mut self, snapshot: &LayoutSnapshot) -> Result<(), SnapshotError> {
        self.document = Some(snapshot.to_json()?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SnapshotError> {
        self.document = None;
        Ok(())
    }
}

/// Snapshot decode or restore failure.
#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    UnsupportedVersion { found: u16, expected: u16 },
    /// A widget without a layout item, or the reverse.
    Orphan { id: String },
    /// The same id appears twice among the widgets or the layout items.
    Duplicate { id: String },
    /// The stored items cannot be made valid for the current grid.
    Layout(LayoutError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "snapshot JSON error: {e}"),
            Self::UnsupportedVersion { found, expected } => {
                write!(f, "unsupported snapshot version {found} (expected {expected})")
            }
            Self::Orphan { id } => write!(f, "{id:?} has no matching widget or layout item"),
            Self::Duplicate { id } => write!(f, "{id:?} is stored more than once"),
            Self::Layout(e) => write!(f, "snapshot layout invalid: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Layout(e) => Some(e),
            Self::UnsupportedVersion { .. } | Self::Orphan { .. } | Self::Duplicate { .. } => None,
        }
    }
}

impl From<LayoutError> for SnapshotError {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}
