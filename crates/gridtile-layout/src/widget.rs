//! Widget model: kinds, default sizes, and drop payload resolution.
//!
//! A widget's kind is decided once, when the widget is created, and carried
//! as a closed [`WidgetKind`] from then on. Nothing downstream derives the
//! kind from an id or title.

use std::fmt;
use std::str::FromStr;

use gridtile_core::geometry::Rect;
use serde::{Deserialize, Serialize};

use crate::item::GridItem;

/// Widget family, the key of the size registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetType {
    Chart,
    Screener,
    Watchlist,
}

impl WidgetType {
    pub const ALL: [Self; 3] = [Self::Chart, Self::Screener, Self::Watchlist];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Screener => "screener",
            Self::Watchlist => "watchlist",
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetType {
    type Err = WidgetError;

    /// Exact match only; `"chart-1"` is not a chart.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| WidgetError::UnknownType {
                found: s.to_owned(),
            })
    }
}

/// Widget kind with its kind-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum WidgetKind {
    Chart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        symbol: Option<String>,
    },
    Screener {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preset: Option<String>,
    },
    Watchlist {
        #[serde(default)]
        symbols: Vec<String>,
    },
}

impl WidgetKind {
    #[must_use]
    pub const fn widget_type(&self) -> WidgetType {
        match self {
            Self::Chart { .. } => WidgetType::Chart,
            Self::Screener { .. } => WidgetType::Screener,
            Self::Watchlist { .. } => WidgetType::Watchlist,
        }
    }

    /// Kind with no parameters set.
    #[must_use]
    pub fn bare(widget_type: WidgetType) -> Self {
        match widget_type {
            WidgetType::Chart => Self::Chart { symbol: None },
            WidgetType::Screener => Self::Screener { preset: None },
            WidgetType::Watchlist => Self::Watchlist {
                symbols: Vec::new(),
            },
        }
    }
}

/// Default and minimum footprint for one widget type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSizeSpec {
    pub w: u16,
    pub h: u16,
    pub min_w: u16,
    pub min_h: u16,
}

impl WidgetSizeSpec {
    #[must_use]
    pub const fn new(w: u16, h: u16, min_w: u16, min_h: u16) -> Self {
        Self { w, h, min_w, min_h }
    }

    /// A grid item with this footprint at `(x, y)`.
    #[must_use]
    pub fn item_at(&self, id: impl Into<String>, x: u16, y: u16) -> GridItem {
        GridItem::new(id, Rect::new(x, y, self.w, self.h)).with_min(self.min_w, self.min_h)
    }
}

/// Read-only mapping from widget type to size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeRegistry {
    pub chart: WidgetSizeSpec,
    pub screener: WidgetSizeSpec,
    pub watchlist: WidgetSizeSpec,
}

impl Default for SizeRegistry {
    fn default() -> Self {
        Self {
            chart: WidgetSizeSpec::new(6, 4, 3, 3),
            screener: WidgetSizeSpec::new(6, 5, 4, 3),
            watchlist: WidgetSizeSpec::new(3, 5, 2, 3),
        }
    }
}

impl SizeRegistry {
    #[must_use]
    pub const fn get(&self, widget_type: WidgetType) -> WidgetSizeSpec {
        match widget_type {
            WidgetType::Chart => self.chart,
            WidgetType::Screener => self.screener,
            WidgetType::Watchlist => self.watchlist,
        }
    }

    /// Problems with the registered sizes; empty when valid.
    #[must_use]
    pub fn validate(&self, cols: u16) -> Vec<String> {
        let mut errors = Vec::new();
        for widget_type in WidgetType::ALL {
            let spec = self.get(widget_type);
            if spec.min_w == 0 || spec.min_h == 0 {
                errors.push(format!("widgets.{widget_type}: minimum size must be >= 1x1"));
            }
            if spec.w < spec.min_w || spec.h < spec.min_h {
                errors.push(format!(
                    "widgets.{widget_type}: default {}x{} is below minimum {}x{}",
                    spec.w, spec.h, spec.min_w, spec.min_h
                ));
            }
            if spec.w > cols {
                errors.push(format!(
                    "widgets.{widget_type}: width {} exceeds {cols} columns",
                    spec.w
                ));
            }
        }
        errors
    }
}

/// A placed widget: identity, caption, and kind. Geometry lives in the
/// matching [`GridItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetInstance {
    pub id: String,
    pub title: String,
    pub widget: WidgetKind,
}

/// Externally serialized drag payload `{type, title, props}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropPayload {
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub props: serde_json::Value,
}

impl DropPayload {
    pub fn from_json(s: &str) -> Result<Self, WidgetError> {
        serde_json::from_str(s).map_err(WidgetError::Json)
    }

    /// Decide the widget kind. Unknown props are ignored; props of the wrong
    /// JSON type are treated as absent.
    pub fn resolve(&self) -> Result<WidgetKind, WidgetError> {
        let widget_type: WidgetType = self.widget_type.parse()?;
        let text = |key: &str| {
            self.props
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        };
        Ok(match widget_type {
            WidgetType::Chart => WidgetKind::Chart {
                symbol: text("symbol"),
            },
            WidgetType::Screener => WidgetKind::Screener {
                preset: text("preset"),
            },
            WidgetType::Watchlist => WidgetKind::Watchlist {
                symbols: self
                    .props
                    .get("symbols")
                    .and_then(serde_json::Value::as_array)
                    .map(|values| {
                        values
                            .iter()
                            .filter_map(serde_json::Value::as_str)
                            .map(str::to_owned)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
    }
}

/// Drop payload failure.
#[derive(Debug)]
pub enum WidgetError {
    UnknownType { found: String },
    Json(serde_json::Error),
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { found } => write!(f, "unknown widget type {found:?}"),
            Self::Json(e) => write!(f, "malformed drop payload: {e}"),
        }
    }
}

impl std::error::Error for WidgetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::UnknownType { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_sizes() {
        let registry = SizeRegistry::default();
        assert_eq!(registry.get(WidgetType::Chart), WidgetSizeSpec::new(6, 4, 3, 3));
        assert_eq!(
            registry.get(WidgetType::Screener),
            WidgetSizeSpec::new(6, 5, 4, 3)
        );
        assert_eq!(
            registry.get(WidgetType::Watchlist),
            WidgetSizeSpec::new(3, 5, 2, 3)
        );
        assert!(registry.validate(12).is_empty());
    }

    #[test]
    fn registry_validation_reports_each_problem() {
        let mut registry = SizeRegistry::default();
        registry.chart = WidgetSizeSpec::new(2, 2, 3, 3);
        registry.watchlist.w = 20;
        let errors = registry.validate(12);
        assert!(errors.iter().any(|e| e.contains("widgets.chart")));
        assert!(errors.iter().any(|e| e.contains("widgets.watchlist")));
    }

    #[test]
    fn item_at_carries_minimums() {
        let item = SizeRegistry::default()
            .get(WidgetType::Chart)
            .item_at("chart-1", 2, 3);
        assert_eq!(item.rect(), Rect::new(2, 3, 6, 4));
        assert_eq!((item.min_w, item.min_h), (3, 3));
    }

    #[test]
    fn type_parse_is_exact() {
        assert_eq!("chart".parse::<WidgetType>().unwrap(), WidgetType::Chart);
        assert!(matches!(
            "chart-1".parse::<WidgetType>(),
            Err(WidgetError::UnknownType { .. })
        ));
        assert!("Chart".parse::<WidgetType>().is_err());
    }

    #[test]
    fn payload_resolves_params() {
        let payload = DropPayload::from_json(
            r#"{"type":"watchlist","title":"Tech","props":{"symbols":["AAPL",3,"MSFT"]}}"#,
        )
        .unwrap();
        assert_eq!(
            payload.resolve().unwrap(),
            WidgetKind::Watchlist {
                symbols: vec!["AAPL".into(), "MSFT".into()]
            }
        );

        let payload = DropPayload::from_json(r#"{"type":"chart","title":"X"}"#).unwrap();
        assert_eq!(
            payload.resolve().unwrap(),
            WidgetKind::Chart { symbol: None }
        );
    }

    #[test]
    fn payload_rejects_unknown_type_and_bad_json() {
        let payload = DropPayload::from_json(r#"{"type":"heatmap","title":"H"}"#).unwrap();
        assert!(matches!(
            payload.resolve(),
            Err(WidgetError::UnknownType { found }) if found == "heatmap"
        ));
        assert!(matches!(
            DropPayload::from_json("{"),
            Err(WidgetError::Json(_))
        ));
    }

    #[test]
    fn kind_is_adjacently_tagged() {
        let kind = WidgetKind::Chart {
            symbol: Some("BTC".into()),
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"kind":"chart","params":{"symbol":"BTC"}}"#);
        let back: WidgetKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back.widget_type(), WidgetType::Chart);
    }
}
