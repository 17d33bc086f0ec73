//! Core types for the graphtrack store
//!
//! This module defines the persisted data model: graphs (named sequences of
//! numeric observations with display configuration) and the auxiliary
//! tap-counter state. The serialized layout is camelCase JSON, kept
//! compatible with documents written by earlier releases: optional fields
//! that older documents lack are backfilled with their defaults at
//! deserialization time, in one place, via the serde attributes below.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chart rendering style for a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
    Bezier,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Bezier => "bezier",
        }
    }
}

impl Default for ChartType {
    fn default() -> Self {
        ChartType::Line
    }
}

/// Counter accumulation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterMode {
    /// Free accumulation
    All,
    /// Accumulation against a denominator that grows by a fixed step per press
    Target,
}

impl Default for CounterMode {
    fn default() -> Self {
        CounterMode::All
    }
}

/// Fixed ten-color palette for graph display, in selection order
pub const GRAPH_COLORS: [&str; 10] = [
    "#FF6B6B", // Red
    "#4ECDC4", // Teal
    "#45B7D1", // Sky Blue
    "#96CEB4", // Sage
    "#FFEEAD", // Pale Yellow
    "#D4A5A5", // Dusty Rose
    "#9B59B6", // Purple
    "#3498DB", // Blue
    "#E67E22", // Orange
    "#2ECC71", // Green
];

/// First palette entry, used when a graph record has no color
pub fn default_color() -> String {
    GRAPH_COLORS[0].to_string()
}

fn default_true() -> bool {
    true
}

fn default_avg_window_size() -> u32 {
    1
}

/// A named, ordered sequence of numeric observations with display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Opaque unique identifier, assigned at creation
    pub id: String,
    /// User-supplied label, immutable after creation
    pub name: String,
    /// Observations in insertion order (the x-axis)
    pub values: Vec<f64>,
    pub chart_type: ChartType,
    /// One of [`GRAPH_COLORS`]; older records lack this field
    #[serde(default = "default_color")]
    pub color: String,
    /// Sign-negate plotted values so lower raw values read as better
    #[serde(default)]
    pub inverted: bool,
    /// Older records lack this field and render with the grid on
    #[serde(default = "default_true")]
    pub show_grid: bool,
    /// Consecutive-window averaging size for display; 1 = no aggregation
    #[serde(default = "default_avg_window_size")]
    pub avg_window_size: u32,
    /// Trailing-window limit, applied in the full-screen chart only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_last_n: Option<u32>,
}

impl Graph {
    /// Create a graph with a fresh unique id and no observations.
    ///
    /// New graphs start with the grid off; this differs from the read-side
    /// default of grid-on that applies to legacy records missing the field.
    pub fn new(name: impl Into<String>, chart_type: ChartType, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            values: Vec::new(),
            chart_type,
            color: color.into(),
            inverted: false,
            show_grid: false,
            avg_window_size: 1,
            show_last_n: None,
        }
    }
}

/// The whole persisted document: graph collection plus counter state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    #[serde(default)]
    pub graphs: Vec<Graph>,
    #[serde(default)]
    pub counter: i64,
    #[serde(default)]
    pub target_max_counter: i64,
    #[serde(default)]
    pub counter_mode: CounterMode,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            graphs: Vec::new(),
            counter: 0,
            target_max_counter: 0,
            counter_mode: CounterMode::All,
        }
    }
}

/// Parse whitespace-separated numeric input from the add/edit dialogs.
///
/// Unparseable and non-finite tokens are dropped; the store never sees them.
pub fn parse_values(input: &str) -> Vec<f64> {
    input
        .split_whitespace()
        .filter_map(|token| token.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect()
}
