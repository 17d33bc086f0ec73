//! Graphtrack - Embedded core for a personal metric-tracking app
//!
//! Users create named graphs, append numeric observations to them, and view
//! them as line/bar/bezier charts; an auxiliary tap-counter accumulates quick
//! increments and commits them into a graph. This crate is the app's state
//! core: the store, its persistence, and the pure display-value derivation
//! the chart surfaces render from. Screens and chart widgets live in the
//! native shells, which drive the store through the Rust API or the C FFI.
//!
//! ## Modules
//!
//! - **store**: single source of truth with subscriber notification and
//!   write-behind persistence
//! - **display**: stateless derivation of plotted values (trailing-window
//!   trim, windowed averaging, inversion)
//! - **persist**: storage backends for the one-document JSON state

pub mod display;
pub mod error;
pub mod persist;
pub mod store;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use display::{derive_display_values, format_y_label, plot_values, ChartView};
pub use error::StoreError;
pub use persist::{JsonFileStorage, MemoryStorage, StorageBackend};
pub use store::{Direction, GraphStore, SubscriberId, TARGET_ACCRUAL_PER_PRESS};
pub use types::{
    default_color, parse_values, ChartType, CounterMode, Graph, StoreState, GRAPH_COLORS,
};

/// Crate version, exposed to embedding shells
pub const GRAPHTRACK_VERSION: &str = env!("CARGO_PKG_VERSION");
