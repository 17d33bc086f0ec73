//! Display-value derivation
//!
//! Chart surfaces never read a graph's stored values directly; they read a
//! derived sequence recomputed from scratch on every render:
//!
//! 1. In the full-screen view, trim to the trailing `show_last_n` values.
//! 2. An empty sequence becomes `[0.0]` so a chart never has zero points.
//! 3. With `avg_window_size > 1`, consecutive non-overlapping windows are
//!    replaced by their arithmetic means (the last window may be short).
//! 4. Inverted graphs plot negated values; axis labels compensate with the
//!    absolute value, so inversion only flips which direction reads as better.
//!
//! Everything here is stateless and deterministic.

use crate::types::Graph;

/// Which chart surface is asking for values.
///
/// The trailing-window limit (`show_last_n`) applies only to the full-screen
/// landscape chart; the detail view always shows the whole history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartView {
    Detail,
    FullScreen,
}

/// Derive the sequence a chart should display from stored observations.
pub fn derive_display_values(
    values: &[f64],
    avg_window_size: u32,
    show_last_n: Option<u32>,
) -> Vec<f64> {
    let mut values = values;
    if let Some(n) = show_last_n {
        let n = n as usize;
        if n > 0 && values.len() > n {
            values = &values[values.len() - n..];
        }
    }

    if values.is_empty() {
        return vec![0.0];
    }

    if avg_window_size <= 1 {
        return values.to_vec();
    }

    values
        .chunks(avg_window_size as usize)
        .map(|window| window.iter().sum::<f64>() / window.len() as f64)
        .collect()
}

/// Values to hand to the chart widget for a graph, inversion applied.
pub fn plot_values(graph: &Graph, view: ChartView) -> Vec<f64> {
    let show_last_n = match view {
        ChartView::FullScreen => graph.show_last_n,
        ChartView::Detail => None,
    };

    let derived = derive_display_values(&graph.values, graph.avg_window_size, show_last_n);
    if graph.inverted {
        derived.into_iter().map(|v| -v).collect()
    } else {
        derived
    }
}

/// Format a Y-axis tick value. Inverted graphs plot negated values, so their
/// labels take the absolute value to stay readable.
pub fn format_y_label(value: f64, inverted: bool) -> String {
    let value = if inverted { value.abs() } else { value };
    if value == value.trunc() {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// X-axis labels ("1".."n"), suppressed entirely when the chart would be too
/// crowded to read them.
pub fn x_axis_labels(point_count: usize) -> Vec<String> {
    if point_count > 10 {
        return Vec::new();
    }
    (1..=point_count).map(|i| i.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{default_color, ChartType};
    use pretty_assertions::assert_eq;

    fn graph_with_values(values: Vec<f64>) -> Graph {
        let mut graph = Graph::new("test", ChartType::Line, default_color());
        graph.values = values;
        graph
    }

    #[test]
    fn test_window_of_two_averages_pairs() {
        let derived = derive_display_values(&[1.0, 2.0, 3.0, 4.0, 5.0], 2, None);
        assert_eq!(derived, vec![1.5, 3.5, 5.0]);
    }

    #[test]
    fn test_window_of_one_passes_through() {
        let values = vec![1.0, 2.0, 3.0];
        assert_eq!(derive_display_values(&values, 1, None), values);
        assert_eq!(derive_display_values(&values, 0, None), values);
    }

    #[test]
    fn test_empty_values_yield_single_zero_point() {
        assert_eq!(derive_display_values(&[], 1, None), vec![0.0]);
        assert_eq!(derive_display_values(&[], 4, None), vec![0.0]);
    }

    #[test]
    fn test_show_last_n_trims_before_windowing() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(
            derive_display_values(&values, 1, Some(3)),
            vec![3.0, 4.0, 5.0]
        );
        // Trim to [3,4,5], then window: [3.5, 5]
        assert_eq!(
            derive_display_values(&values, 2, Some(3)),
            vec![3.5, 5.0]
        );
    }

    #[test]
    fn test_show_last_n_larger_than_history_is_ignored() {
        let values = [1.0, 2.0];
        assert_eq!(derive_display_values(&values, 1, Some(10)), values.to_vec());
        assert_eq!(derive_display_values(&values, 1, Some(0)), values.to_vec());
    }

    #[test]
    fn test_trimming_until_empty_is_impossible() {
        // A trailing window never empties a non-empty history, and an empty
        // history still renders one point.
        assert_eq!(derive_display_values(&[], 2, Some(3)), vec![0.0]);
    }

    #[test]
    fn test_inverted_plot_negates_values() {
        let mut graph = graph_with_values(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        graph.avg_window_size = 2;
        graph.inverted = true;
        assert_eq!(
            plot_values(&graph, ChartView::Detail),
            vec![-1.5, -3.5, -5.0]
        );
    }

    #[test]
    fn test_show_last_n_only_applies_full_screen() {
        let mut graph = graph_with_values(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        graph.show_last_n = Some(3);
        assert_eq!(
            plot_values(&graph, ChartView::Detail),
            vec![1.0, 2.0, 3.0, 4.0, 5.0]
        );
        assert_eq!(
            plot_values(&graph, ChartView::FullScreen),
            vec![3.0, 4.0, 5.0]
        );
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let values = [2.0, 4.0, 6.0, 8.0];
        let first = derive_display_values(&values, 2, None);
        let second = derive_display_values(&values, 2, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_y_label_absolute_when_inverted() {
        assert_eq!(format_y_label(-3.5, true), "3.5");
        assert_eq!(format_y_label(-5.0, true), "5");
        assert_eq!(format_y_label(-3.5, false), "-3.5");
        assert_eq!(format_y_label(67.0, false), "67");
    }

    #[test]
    fn test_x_labels_hidden_when_crowded() {
        assert_eq!(x_axis_labels(3), vec!["1", "2", "3"]);
        assert_eq!(x_axis_labels(10).len(), 10);
        assert!(x_axis_labels(11).is_empty());
    }
}
