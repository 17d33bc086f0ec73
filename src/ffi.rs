//! FFI bindings for graphtrack
//!
//! This module provides C-compatible functions so native mobile shells can
//! drive the store from other languages. A store is an opaque handle created
//! with `graphtrack_store_open` and released with `graphtrack_store_free`;
//! all strings are null-terminated, and every returned string must be freed
//! by the caller using `graphtrack_free_string`.
//!
//! Functions that take a graph id inherit the store's idempotent-miss
//! semantics: an unknown id is a no-op, not an error. Errors here only mean
//! invalid pointers or malformed enum strings; call `graphtrack_last_error`
//! for the message after a failed call.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use crate::display::{plot_values, ChartView};
use crate::persist::JsonFileStorage;
use crate::store::{Direction, GraphStore};
use crate::types::{default_color, parse_values, ChartType, CounterMode};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

unsafe fn store_mut<'a>(ptr: *mut GraphStore) -> Option<&'a mut GraphStore> {
    if ptr.is_null() {
        set_last_error("Null store handle");
        return None;
    }
    Some(&mut *ptr)
}

fn chart_type_from_str(s: &str) -> Option<ChartType> {
    match s {
        "line" => Some(ChartType::Line),
        "bar" => Some(ChartType::Bar),
        "bezier" => Some(ChartType::Bezier),
        _ => None,
    }
}

// ============================================================================
// Store lifecycle
// ============================================================================

/// Open a store. With a non-null `path`, state is rehydrated from that JSON
/// file and mirrored back to it after every mutation; with a null `path` the
/// store is memory-only.
///
/// # Safety
/// - `path` must be null or a valid null-terminated C string.
/// - The returned handle must be released with `graphtrack_store_free`.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_store_open(path: *const c_char) -> *mut GraphStore {
    clear_last_error();

    let store = match cstr_to_string(path) {
        Some(path) => GraphStore::with_storage(Box::new(JsonFileStorage::new(path))),
        None => GraphStore::new(),
    };

    Box::into_raw(Box::new(store))
}

/// Release a store handle.
///
/// # Safety
/// - `store` must have been returned by `graphtrack_store_open` and must not
///   be used after this call.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_store_free(store: *mut GraphStore) {
    if !store.is_null() {
        drop(Box::from_raw(store));
    }
}

/// Return the last error message, or NULL if the last call succeeded.
///
/// # Safety
/// The returned pointer is only valid until the next FFI call on this thread
/// and must not be freed.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(msg) => msg.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string returned by this API.
///
/// # Safety
/// - `s` must be a pointer returned by a graphtrack function, freed once.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Reads
// ============================================================================

/// Serialize the full state snapshot to JSON.
///
/// # Safety
/// - `store` must be a valid handle.
/// - Returns a newly allocated string (free with `graphtrack_free_string`),
///   or NULL on error.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_state_json(store: *mut GraphStore) -> *mut c_char {
    clear_last_error();
    let Some(store) = store_mut(store) else {
        return ptr::null_mut();
    };

    match serde_json::to_string(store.state()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Derived display values for one graph as a JSON array, inversion applied.
/// `full_screen != 0` selects the full-screen variant, which honors the
/// graph's trailing-window limit.
///
/// # Safety
/// - `store` must be a valid handle, `id` a valid C string.
/// - Returns NULL for an unknown graph id or invalid arguments.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_plot_values_json(
    store: *mut GraphStore,
    id: *const c_char,
    full_screen: c_int,
) -> *mut c_char {
    clear_last_error();
    let Some(store) = store_mut(store) else {
        return ptr::null_mut();
    };
    let Some(id) = cstr_to_string(id) else {
        set_last_error("Invalid graph id string");
        return ptr::null_mut();
    };

    let view = if full_screen != 0 {
        ChartView::FullScreen
    } else {
        ChartView::Detail
    };

    let Some(graph) = store.graph(&id) else {
        set_last_error("Unknown graph id");
        return ptr::null_mut();
    };

    match serde_json::to_string(&plot_values(graph, view)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Graph mutations
// ============================================================================

/// Create a graph and return its id. `chart_type` is one of
/// "line"/"bar"/"bezier" (null means line); a null `color` selects the
/// palette default.
///
/// # Safety
/// - `store` must be a valid handle, `name` a valid C string.
/// - Returns NULL on invalid arguments.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_add_graph(
    store: *mut GraphStore,
    name: *const c_char,
    chart_type: *const c_char,
    color: *const c_char,
) -> *mut c_char {
    clear_last_error();
    let Some(store) = store_mut(store) else {
        return ptr::null_mut();
    };
    let Some(name) = cstr_to_string(name) else {
        set_last_error("Invalid graph name string");
        return ptr::null_mut();
    };

    let chart_type = match cstr_to_string(chart_type) {
        Some(s) => match chart_type_from_str(&s) {
            Some(t) => t,
            None => {
                set_last_error("Unknown chart type");
                return ptr::null_mut();
            }
        },
        None => ChartType::Line,
    };
    let color = cstr_to_string(color).unwrap_or_else(default_color);

    let id = store.add_graph(name, chart_type, color);
    string_to_cstr(&id)
}

/// Delete a graph. Returns 0 on success (including an unknown id), -1 on
/// invalid arguments.
///
/// # Safety
/// - `store` must be a valid handle, `id` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_delete_graph(
    store: *mut GraphStore,
    id: *const c_char,
) -> c_int {
    with_graph_id(store, id, |store, id| store.delete_graph(id))
}

/// Append values parsed from a whitespace-separated string; unparseable and
/// non-finite tokens are dropped.
///
/// # Safety
/// - `store` must be a valid handle, `id` and `values` valid C strings.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_add_values(
    store: *mut GraphStore,
    id: *const c_char,
    values: *const c_char,
) -> c_int {
    clear_last_error();
    let Some(values) = cstr_to_string(values) else {
        set_last_error("Invalid values string");
        return -1;
    };
    with_graph_id(store, id, |store, id| {
        store.add_values_to_graph(id, &parse_values(&values))
    })
}

/// Replace a graph's entire history with values parsed from a
/// whitespace-separated string (the bulk-edit path).
///
/// # Safety
/// - `store` must be a valid handle, `id` and `values` valid C strings.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_update_values(
    store: *mut GraphStore,
    id: *const c_char,
    values: *const c_char,
) -> c_int {
    clear_last_error();
    let Some(values) = cstr_to_string(values) else {
        set_last_error("Invalid values string");
        return -1;
    };
    with_graph_id(store, id, |store, id| {
        store.update_graph_values(id, parse_values(&values))
    })
}

/// Change a graph's chart type ("line"/"bar"/"bezier").
///
/// # Safety
/// - `store` must be a valid handle, `id` and `chart_type` valid C strings.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_change_chart_type(
    store: *mut GraphStore,
    id: *const c_char,
    chart_type: *const c_char,
) -> c_int {
    clear_last_error();
    let chart_type = match cstr_to_string(chart_type).as_deref().and_then(chart_type_from_str) {
        Some(t) => t,
        None => {
            set_last_error("Unknown chart type");
            return -1;
        }
    };
    with_graph_id(store, id, |store, id| store.change_chart_type(id, chart_type))
}

/// Set a graph's display color.
///
/// # Safety
/// - `store` must be a valid handle, `id` and `color` valid C strings.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_update_color(
    store: *mut GraphStore,
    id: *const c_char,
    color: *const c_char,
) -> c_int {
    clear_last_error();
    let Some(color) = cstr_to_string(color) else {
        set_last_error("Invalid color string");
        return -1;
    };
    with_graph_id(store, id, |store, id| store.update_graph_color(id, color))
}

/// Toggle sign-inverted display.
///
/// # Safety
/// - `store` must be a valid handle, `id` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_toggle_inverted(
    store: *mut GraphStore,
    id: *const c_char,
) -> c_int {
    with_graph_id(store, id, |store, id| store.toggle_graph_inverted(id))
}

/// Toggle grid lines.
///
/// # Safety
/// - `store` must be a valid handle, `id` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_toggle_grid(
    store: *mut GraphStore,
    id: *const c_char,
) -> c_int {
    with_graph_id(store, id, |store, id| store.toggle_graph_grid(id))
}

/// Set the display averaging window size (values below 1 are raised to 1).
///
/// # Safety
/// - `store` must be a valid handle, `id` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_set_avg_window_size(
    store: *mut GraphStore,
    id: *const c_char,
    size: u32,
) -> c_int {
    with_graph_id(store, id, |store, id| {
        store.update_graph_avg_window_size(id, size)
    })
}

/// Set the full-screen trailing-window limit; a negative `n` clears it.
///
/// # Safety
/// - `store` must be a valid handle, `id` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_set_show_last_n(
    store: *mut GraphStore,
    id: *const c_char,
    n: i64,
) -> c_int {
    let last_n = u32::try_from(n).ok();
    with_graph_id(store, id, |store, id| {
        store.update_graph_show_last_n(id, last_n)
    })
}

/// Swap a graph with its neighbor; `direction` is "up" or "down".
///
/// # Safety
/// - `store` must be a valid handle, `id` and `direction` valid C strings.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_reorder_graph(
    store: *mut GraphStore,
    id: *const c_char,
    direction: *const c_char,
) -> c_int {
    clear_last_error();
    let direction = match cstr_to_string(direction).as_deref() {
        Some("up") => Direction::Up,
        Some("down") => Direction::Down,
        _ => {
            set_last_error("Unknown reorder direction");
            return -1;
        }
    };
    with_graph_id(store, id, |store, id| store.reorder_graph(id, direction))
}

// ============================================================================
// Counter
// ============================================================================

/// Add to the counter (target mode also accrues the fixed denominator step).
///
/// # Safety
/// - `store` must be a valid handle.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_increment_counter(
    store: *mut GraphStore,
    amount: i64,
) -> c_int {
    clear_last_error();
    let Some(store) = store_mut(store) else {
        return -1;
    };
    store.increment_counter(amount);
    0
}

/// Zero the counter and the target denominator.
///
/// # Safety
/// - `store` must be a valid handle.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_reset_counter(store: *mut GraphStore) -> c_int {
    clear_last_error();
    let Some(store) = store_mut(store) else {
        return -1;
    };
    store.reset_counter();
    0
}

/// Set the counter mode ("all" or "target") without touching the counters.
///
/// # Safety
/// - `store` must be a valid handle, `mode` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn graphtrack_set_counter_mode(
    store: *mut GraphStore,
    mode: *const c_char,
) -> c_int {
    clear_last_error();
    let Some(store) = store_mut(store) else {
        return -1;
    };
    let mode = match cstr_to_string(mode).as_deref() {
        Some("all") => CounterMode::All,
        Some("target") => CounterMode::Target,
        _ => {
            set_last_error("Unknown counter mode");
            return -1;
        }
    };
    store.set_counter_mode(mode);
    0
}

/// Commit the counter into a graph and reset it. With `as_percentage != 0`
/// in target mode the committed value is the rounded-up percentage of the
/// accrued denominator. Returns the committed value.
///
/// # Safety
/// - `store` must be a valid handle, `id` a valid C string.
/// - Returns -1.0 on invalid arguments (distinguish via
///   `graphtrack_last_error`; a commit can legitimately be negative).
#[no_mangle]
pub unsafe extern "C" fn graphtrack_commit_counter(
    store: *mut GraphStore,
    id: *const c_char,
    as_percentage: c_int,
) -> f64 {
    clear_last_error();
    let Some(store) = store_mut(store) else {
        return -1.0;
    };
    let Some(id) = cstr_to_string(id) else {
        set_last_error("Invalid graph id string");
        return -1.0;
    };
    store.commit_counter_to_graph(&id, as_percentage != 0)
}

// ============================================================================
// Helpers
// ============================================================================

unsafe fn with_graph_id(
    store: *mut GraphStore,
    id: *const c_char,
    op: impl FnOnce(&mut GraphStore, &str),
) -> c_int {
    clear_last_error();
    let Some(store) = store_mut(store) else {
        return -1;
    };
    let Some(id) = cstr_to_string(id) else {
        set_last_error("Invalid graph id string");
        return -1;
    };
    op(store, &id);
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cstr(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    #[test]
    fn test_ffi_round_trip() {
        unsafe {
            let store = graphtrack_store_open(ptr::null());
            assert!(!store.is_null());

            let name = cstr("Pushups");
            let chart_type = cstr("bar");
            let id_ptr = graphtrack_add_graph(store, name.as_ptr(), chart_type.as_ptr(), ptr::null());
            assert!(!id_ptr.is_null());
            let id = CStr::from_ptr(id_ptr).to_owned();

            let values = cstr("10 12 bad 15");
            assert_eq!(graphtrack_add_values(store, id.as_ptr(), values.as_ptr()), 0);

            let json_ptr = graphtrack_plot_values_json(store, id.as_ptr(), 0);
            assert!(!json_ptr.is_null());
            let json = CStr::from_ptr(json_ptr).to_str().unwrap().to_string();
            let plotted: Vec<f64> = serde_json::from_str(&json).unwrap();
            assert_eq!(plotted, vec![10.0, 12.0, 15.0]);

            graphtrack_free_string(json_ptr);
            graphtrack_free_string(id_ptr);
            graphtrack_store_free(store);
        }
    }

    #[test]
    fn test_ffi_counter_commit() {
        unsafe {
            let store = graphtrack_store_open(ptr::null());

            let mode = cstr("target");
            assert_eq!(graphtrack_set_counter_mode(store, mode.as_ptr()), 0);
            for amount in [2, 2, 3, 1] {
                assert_eq!(graphtrack_increment_counter(store, amount), 0);
            }

            let name = cstr("Focus");
            let id_ptr = graphtrack_add_graph(store, name.as_ptr(), ptr::null(), ptr::null());
            let id = CStr::from_ptr(id_ptr).to_owned();

            let committed = graphtrack_commit_counter(store, id.as_ptr(), 1);
            assert_eq!(committed, 67.0);

            graphtrack_free_string(id_ptr);
            graphtrack_store_free(store);
        }
    }

    #[test]
    fn test_ffi_rejects_bad_enum_strings() {
        unsafe {
            let store = graphtrack_store_open(ptr::null());
            let id = cstr("whatever");

            let bad_mode = cstr("sometimes");
            assert_eq!(graphtrack_set_counter_mode(store, bad_mode.as_ptr()), -1);
            assert!(!graphtrack_last_error().is_null());

            let bad_direction = cstr("sideways");
            assert_eq!(
                graphtrack_reorder_graph(store, id.as_ptr(), bad_direction.as_ptr()),
                -1
            );

            // A good call clears the error slot again
            assert_eq!(graphtrack_increment_counter(store, 1), 0);
            assert!(graphtrack_last_error().is_null());

            graphtrack_store_free(store);
        }
    }

    #[test]
    fn test_ffi_null_store_is_an_error() {
        unsafe {
            assert!(graphtrack_state_json(ptr::null_mut()).is_null());
            assert_eq!(graphtrack_increment_counter(ptr::null_mut(), 1), -1);
            assert!(!graphtrack_last_error().is_null());
        }
    }
}
