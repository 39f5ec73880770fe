use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::types::{DataPoint, FrameKey};
use crate::error::{ChartError, ChartResult};

/// Canonicalized input data plus a sorted frame-key index.
///
/// Points keep ingestion order; race rank ties break on it. Malformed points
/// are skipped at construction, never at render time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    points: Vec<DataPoint>,
    frame_keys: Vec<FrameKey>,
}

impl Dataset {
    #[must_use]
    pub fn new(points: Vec<DataPoint>) -> Self {
        let original_count = points.len();
        let points = canonicalize_points(points);
        let frame_keys = index_frame_keys(&points);
        debug!(
            original_count,
            canonical_count = points.len(),
            frame_count = frame_keys.len(),
            "ingested dataset"
        );
        Self { points, frame_keys }
    }

    /// Parses a JSON array of data points.
    pub fn from_json_str(json: &str) -> ChartResult<Self> {
        let points: Vec<DataPoint> = serde_json::from_str(json)
            .map_err(|err| ChartError::InvalidData(format!("dataset JSON: {err}")))?;
        Ok(Self::new(points))
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self.points)
            .map_err(|err| ChartError::InvalidData(format!("dataset JSON: {err}")))
    }

    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Sorted, deduplicated frame keys present in the data.
    #[must_use]
    pub fn frame_keys(&self) -> &[FrameKey] {
        &self.frame_keys
    }

    #[must_use]
    pub fn min_frame_key(&self) -> Option<FrameKey> {
        self.frame_keys.first().copied()
    }

    #[must_use]
    pub fn max_frame_key(&self) -> Option<FrameKey> {
        self.frame_keys.last().copied()
    }

    /// First frame key strictly after `after`, if any.
    #[must_use]
    pub fn next_frame_key(&self, after: FrameKey) -> Option<FrameKey> {
        match self.frame_keys.binary_search(&after) {
            Ok(index) => self.frame_keys.get(index + 1).copied(),
            Err(index) => self.frame_keys.get(index).copied(),
        }
    }

    pub fn points_in_frame(&self, frame: FrameKey) -> impl Iterator<Item = &DataPoint> {
        self.points.iter().filter(move |point| point.frame == frame)
    }
}

fn canonicalize_points(mut points: Vec<DataPoint>) -> Vec<DataPoint> {
    points.retain(|point| match validate_point(point) {
        Ok(()) => true,
        Err(reason) => {
            warn!(key = %point.key, frame = point.frame, reason, "skipping malformed data point");
            false
        }
    });
    points
}

fn validate_point(point: &DataPoint) -> Result<(), &'static str> {
    if point.key.trim().is_empty() {
        return Err("empty key");
    }
    if !point.value.is_finite() {
        return Err("non-finite value");
    }
    if point.x.is_some_and(|x| !x.is_finite()) {
        return Err("non-finite x");
    }
    if point.y.is_some_and(|y| !y.is_finite()) {
        return Err("non-finite y");
    }
    if point.style.opacity.is_some_and(|o| !(0.0..=1.0).contains(&o)) {
        return Err("opacity outside [0, 1]");
    }
    if point.style.radius.is_some_and(|r| !r.is_finite() || r < 0.0) {
        return Err("invalid radius");
    }
    Ok(())
}

fn index_frame_keys(points: &[DataPoint]) -> Vec<FrameKey> {
    let mut keys: Vec<FrameKey> = points.iter().map(|point| point.frame).collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}
