//! The graph store
//!
//! Single source of truth for the graph collection and the counter state.
//! The store owns one [`StoreState`], applies all mutations synchronously on
//! the caller's thread, notifies subscribers with the new snapshot, and then
//! mirrors the full state to its storage backend. Operations referencing an
//! unknown graph id are no-ops, never errors, and a failing backend degrades
//! the session to memory-only instead of surfacing to callers.

use crate::persist::StorageBackend;
use crate::types::{ChartType, CounterMode, Graph, StoreState};

/// Fixed amount added to the target denominator on every increment press in
/// target mode, independent of the pressed amount. Four presses of
/// +2, +2, +3, +1 read as 8/12.
pub const TARGET_ACCRUAL_PER_PRESS: i64 = 3;

/// Neighbor-swap direction for [`GraphStore::reorder_graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the front of the collection
    Up,
    /// Toward the back of the collection
    Down,
}

/// Handle returned by [`GraphStore::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn Fn(&StoreState)>;

/// Owned state container for graphs and counter state
pub struct GraphStore {
    state: StoreState,
    storage: Option<Box<dyn StorageBackend>>,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber_id: u64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// Create a memory-only store with empty state.
    pub fn new() -> Self {
        Self {
            state: StoreState::default(),
            storage: None,
            subscribers: Vec::new(),
            next_subscriber_id: 0,
        }
    }

    /// Create a store backed by durable storage, rehydrating any previously
    /// saved state. A missing document means first launch; an unreadable one
    /// degrades to empty state rather than failing startup.
    pub fn with_storage(storage: Box<dyn StorageBackend>) -> Self {
        let state = match storage.load() {
            Ok(Some(state)) => {
                log::debug!("rehydrated store: {} graphs", state.graphs.len());
                state
            }
            Ok(None) => StoreState::default(),
            Err(e) => {
                log::warn!("could not rehydrate store, starting empty: {e}");
                StoreState::default()
            }
        };

        Self {
            state,
            storage: Some(storage),
            subscribers: Vec::new(),
            next_subscriber_id: 0,
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Current state snapshot
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Graphs in display order
    pub fn graphs(&self) -> &[Graph] {
        &self.state.graphs
    }

    /// Look up a graph by id
    pub fn graph(&self, id: &str) -> Option<&Graph> {
        self.state.graphs.iter().find(|g| g.id == id)
    }

    pub fn counter(&self) -> i64 {
        self.state.counter
    }

    pub fn target_max_counter(&self) -> i64 {
        self.state.target_max_counter
    }

    pub fn counter_mode(&self) -> CounterMode {
        self.state.counter_mode
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Register a callback invoked with the new snapshot after every
    /// mutation. Presentation layers use this to re-render on change.
    pub fn subscribe(&mut self, subscriber: impl Fn(&StoreState) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber_id);
        self.next_subscriber_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a previously registered subscriber; no-op for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    // ------------------------------------------------------------------
    // Graph mutations
    // ------------------------------------------------------------------

    /// Append a new empty graph and return its freshly generated id.
    pub fn add_graph(
        &mut self,
        name: impl Into<String>,
        chart_type: ChartType,
        color: impl Into<String>,
    ) -> String {
        let graph = Graph::new(name, chart_type, color);
        let id = graph.id.clone();
        self.state.graphs.push(graph);
        self.after_mutation();
        id
    }

    /// Remove the graph with the given id.
    pub fn delete_graph(&mut self, id: &str) {
        let before = self.state.graphs.len();
        self.state.graphs.retain(|g| g.id != id);
        if self.state.graphs.len() != before {
            self.after_mutation();
        }
    }

    /// Append one observation to a graph's history.
    pub fn add_value_to_graph(&mut self, id: &str, value: f64) {
        self.with_graph(id, |graph| graph.values.push(value));
    }

    /// Append a run of observations, preserving their order.
    pub fn add_values_to_graph(&mut self, id: &str, values: &[f64]) {
        self.with_graph(id, |graph| graph.values.extend_from_slice(values));
    }

    /// Replace a graph's entire history (the bulk-edit path).
    pub fn update_graph_values(&mut self, id: &str, values: Vec<f64>) {
        self.with_graph(id, |graph| graph.values = values);
    }

    pub fn change_chart_type(&mut self, id: &str, chart_type: ChartType) {
        self.with_graph(id, |graph| graph.chart_type = chart_type);
    }

    pub fn update_graph_color(&mut self, id: &str, color: impl Into<String>) {
        let color = color.into();
        self.with_graph(id, |graph| graph.color = color);
    }

    pub fn toggle_graph_inverted(&mut self, id: &str) {
        self.with_graph(id, |graph| graph.inverted = !graph.inverted);
    }

    pub fn toggle_graph_grid(&mut self, id: &str) {
        self.with_graph(id, |graph| graph.show_grid = !graph.show_grid);
    }

    /// Set the display averaging window; sizes below 1 are raised to 1.
    pub fn update_graph_avg_window_size(&mut self, id: &str, size: u32) {
        self.with_graph(id, |graph| graph.avg_window_size = size.max(1));
    }

    /// Set or clear the trailing-window limit used by the full-screen chart.
    pub fn update_graph_show_last_n(&mut self, id: &str, last_n: Option<u32>) {
        self.with_graph(id, |graph| graph.show_last_n = last_n);
    }

    /// Swap a graph with its immediate neighbor; no-op at either boundary.
    pub fn reorder_graph(&mut self, id: &str, direction: Direction) {
        let Some(index) = self.state.graphs.iter().position(|g| g.id == id) else {
            return;
        };
        let neighbor = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.state.graphs.len() => index + 1,
            _ => return,
        };
        self.state.graphs.swap(index, neighbor);
        self.after_mutation();
    }

    // ------------------------------------------------------------------
    // Counter mutations
    // ------------------------------------------------------------------

    /// Add to the counter. In target mode every press also accrues a fixed
    /// [`TARGET_ACCRUAL_PER_PRESS`] to the denominator, regardless of
    /// `amount` (a +0 press still accrues).
    pub fn increment_counter(&mut self, amount: i64) {
        self.state.counter += amount;
        if self.state.counter_mode == CounterMode::Target {
            self.state.target_max_counter += TARGET_ACCRUAL_PER_PRESS;
        }
        self.after_mutation();
    }

    /// Zero both the counter and the target denominator.
    pub fn reset_counter(&mut self) {
        self.state.counter = 0;
        self.state.target_max_counter = 0;
        self.after_mutation();
    }

    /// Switch counter mode without touching the accumulated values.
    pub fn set_counter_mode(&mut self, mode: CounterMode) {
        self.state.counter_mode = mode;
        self.after_mutation();
    }

    /// The value a commit would append right now. In target mode with
    /// percentage requested this is `ceil(counter / target * 100)`, guarded
    /// against an empty denominator; otherwise the raw counter.
    pub fn counter_commit_value(&self, as_percentage: bool) -> f64 {
        let state = &self.state;
        if state.counter_mode == CounterMode::Target
            && as_percentage
            && state.target_max_counter > 0
        {
            (state.counter as f64 / state.target_max_counter as f64 * 100.0).ceil()
        } else {
            state.counter as f64
        }
    }

    /// Commit the counter's current value into a graph, then reset the
    /// counter state. Returns the committed value for confirmation display.
    pub fn commit_counter_to_graph(&mut self, id: &str, as_percentage: bool) -> f64 {
        let value = self.counter_commit_value(as_percentage);
        self.add_value_to_graph(id, value);
        self.reset_counter();
        value
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn with_graph(&mut self, id: &str, mutate: impl FnOnce(&mut Graph)) {
        let Some(graph) = self.state.graphs.iter_mut().find(|g| g.id == id) else {
            return;
        };
        mutate(graph);
        self.after_mutation();
    }

    fn after_mutation(&mut self) {
        for (_, subscriber) in &self.subscribers {
            subscriber(&self.state);
        }
        if let Some(storage) = self.storage.as_mut() {
            if let Err(e) = storage.save(&self.state) {
                log::warn!("failed to persist state, continuing in memory: {e}");
            }
        }
    }
}
