use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Discrete frame identity: a calendar year or a plain integer index.
pub type FrameKey = i64;

/// Host-supplied monotonic clock reading in milliseconds.
pub type TimestampMs = u64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Per-point visual overrides; unset fields fall through to the chart config,
/// then to the engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub stroke: Option<String>,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub radius: Option<f64>,
}

impl PointStyle {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fill.is_none() && self.stroke.is_none() && self.opacity.is_none() && self.radius.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub key: String,
    pub frame: FrameKey,
    pub value: f64,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub style: PointStyle,
}

impl DataPoint {
    #[must_use]
    pub fn new(key: impl Into<String>, frame: FrameKey, value: f64) -> Self {
        Self {
            key: key.into(),
            frame,
            value,
            x: None,
            y: None,
            style: PointStyle::default(),
        }
    }

    #[must_use]
    pub fn with_xy(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: PointStyle) -> Self {
        self.style = style;
        self
    }

    /// Builds a point whose frame key is the calendar year of `date`.
    ///
    /// Accepts a bare year (`"2000"`), an ISO date (`"2000-05-17"`), or an
    /// RFC 3339 timestamp.
    pub fn from_dated(key: impl Into<String>, date: &str, value: f64) -> ChartResult<Self> {
        Ok(Self::new(key, frame_key_from_date(date)?, value))
    }
}

pub(crate) fn frame_key_from_date(date: &str) -> ChartResult<FrameKey> {
    let trimmed = date.trim();
    if let Ok(year) = trimmed.parse::<FrameKey>() {
        return Ok(year);
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(FrameKey::from(datelike_year(&parsed)));
    }
    if let Ok(parsed) = DateTime::<FixedOffset>::parse_from_rfc3339(trimmed) {
        return Ok(FrameKey::from(datelike_year(&parsed.date_naive())));
    }
    Err(ChartError::InvalidData(format!(
        "unparseable frame date: {trimmed:?}"
    )))
}

fn datelike_year(date: &NaiveDate) -> i32 {
    use chrono::Datelike;
    date.year()
}
