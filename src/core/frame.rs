use std::collections::HashSet;

use ordered_float::OrderedFloat;
use tracing::{trace, warn};

use crate::core::dataset::Dataset;
use crate::core::types::{DataPoint, FrameKey};

/// One dataset point resolved into the active frame. `rank` is the 0-based
/// position after descending-value sort for the race chart; scatter entries
/// carry no rank.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameEntry {
    pub point: DataPoint,
    pub rank: Option<usize>,
}

/// Race selection: filter to the frame, stable-sort descending by value,
/// rank by sorted position, truncate to the `top_n` leaders.
#[must_use]
pub fn select_race_frame(dataset: &Dataset, frame: FrameKey, top_n: usize) -> Vec<FrameEntry> {
    let mut entries = collect_frame_points(dataset, frame, false);
    entries.sort_by(|a, b| OrderedFloat(b.value).cmp(&OrderedFloat(a.value)));
    entries.truncate(top_n);
    let selected: Vec<FrameEntry> = entries
        .into_iter()
        .enumerate()
        .map(|(rank, point)| FrameEntry {
            point,
            rank: Some(rank),
        })
        .collect();
    trace!(frame, selected = selected.len(), "selected race frame");
    selected
}

/// Scatter selection: filter to the frame, no ranking or truncation. Points
/// without both coordinates are skipped.
#[must_use]
pub fn select_scatter_frame(dataset: &Dataset, frame: FrameKey) -> Vec<FrameEntry> {
    let selected: Vec<FrameEntry> = collect_frame_points(dataset, frame, true)
        .into_iter()
        .map(|point| FrameEntry { point, rank: None })
        .collect();
    trace!(frame, selected = selected.len(), "selected scatter frame");
    selected
}

fn collect_frame_points(dataset: &Dataset, frame: FrameKey, require_xy: bool) -> Vec<DataPoint> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut points = Vec::new();
    for point in dataset.points_in_frame(frame) {
        if require_xy && (point.x.is_none() || point.y.is_none()) {
            warn!(key = %point.key, frame, "skipping scatter point without both coordinates");
            continue;
        }
        if !seen.insert(point.key.as_str()) {
            warn!(key = %point.key, frame, "skipping duplicate key within frame");
            continue;
        }
        points.push(point.clone());
    }
    points
}

/// Largest value in the frame; `None` for an empty frame.
#[must_use]
pub fn frame_value_max(entries: &[FrameEntry]) -> Option<f64> {
    entries
        .iter()
        .map(|entry| OrderedFloat(entry.point.value))
        .max()
        .map(OrderedFloat::into_inner)
}

/// Coordinate extents of a scatter frame; `None` for an empty frame.
#[must_use]
pub fn frame_xy_bounds(entries: &[FrameEntry]) -> Option<((f64, f64), (f64, f64))> {
    let mut iter = entries
        .iter()
        .filter_map(|entry| Some((entry.point.x?, entry.point.y?)));
    let (first_x, first_y) = iter.next()?;
    let mut x_bounds = (first_x, first_x);
    let mut y_bounds = (first_y, first_y);
    for (x, y) in iter {
        x_bounds = (x_bounds.0.min(x), x_bounds.1.max(x));
        y_bounds = (y_bounds.0.min(y), y_bounds.1.max(y));
    }
    Some((x_bounds, y_bounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            DataPoint::new("a", 2000, 5000.0),
            DataPoint::new("b", 2000, 9000.0),
            DataPoint::new("c", 2000, 7000.0),
            DataPoint::new("a", 2001, 7000.0),
            DataPoint::new("b", 2001, 8000.0),
        ])
    }

    #[test]
    fn race_selection_sorts_ranks_and_truncates() {
        let entries = select_race_frame(&dataset(), 2000, 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].point.key, "b");
        assert_eq!(entries[0].rank, Some(0));
        assert_eq!(entries[1].point.key, "c");
        assert_eq!(entries[1].rank, Some(1));
    }

    #[test]
    fn race_selection_breaks_ties_by_insertion_order() {
        let dataset = Dataset::new(vec![
            DataPoint::new("first", 1, 10.0),
            DataPoint::new("second", 1, 10.0),
            DataPoint::new("third", 1, 10.0),
        ]);
        let entries = select_race_frame(&dataset, 1, 3);
        let keys: Vec<&str> = entries.iter().map(|e| e.point.key.as_str()).collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
    }

    #[test]
    fn race_selection_keeps_first_duplicate_key() {
        let dataset = Dataset::new(vec![
            DataPoint::new("dup", 1, 3.0),
            DataPoint::new("dup", 1, 9.0),
        ]);
        let entries = select_race_frame(&dataset, 1, 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].point.value, 3.0);
    }

    #[test]
    fn empty_frame_selects_nothing() {
        assert!(select_race_frame(&dataset(), 1990, 5).is_empty());
        assert!(select_scatter_frame(&dataset(), 1990).is_empty());
    }

    #[test]
    fn scatter_selection_requires_both_coordinates() {
        let dataset = Dataset::new(vec![
            DataPoint::new("placed", 1, 1.0).with_xy(2.0, 3.0),
            DataPoint::new("half", 1, 1.0),
        ]);
        let entries = select_scatter_frame(&dataset, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].point.key, "placed");
        assert_eq!(entries[0].rank, None);
    }

    #[test]
    fn frame_bounds_cover_values_and_coordinates() {
        let entries = select_race_frame(&dataset(), 2000, 10);
        assert_eq!(frame_value_max(&entries), Some(9000.0));

        let scatter = Dataset::new(vec![
            DataPoint::new("a", 1, 0.0).with_xy(-2.0, 10.0),
            DataPoint::new("b", 1, 0.0).with_xy(4.0, -1.0),
        ]);
        let entries = select_scatter_frame(&scatter, 1);
        let ((min_x, max_x), (min_y, max_y)) = frame_xy_bounds(&entries).unwrap();
        assert_eq!((min_x, max_x), (-2.0, 4.0));
        assert_eq!((min_y, max_y), (-1.0, 10.0));
    }
}
