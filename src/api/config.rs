use serde::{Deserialize, Serialize};

use crate::core::ticks::{linear_ticks, stepped_ticks};
use crate::core::types::Margins;
use crate::error::{ChartError, ChartResult};
use crate::reconcile::StyleDefaults;

/// The two modeled chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    BarRace,
    Scatter,
}

/// Tick density policy for one axis.
///
/// Serializes tagged as `{"mode": "count"|"step", "value": n}`; an
/// unrecognized mode fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum TickPolicy {
    /// Approximately this many round-valued ticks across the domain.
    Count(usize),
    /// Explicit ticks at `min, min + step, ..., max` inclusive.
    Step(f64),
}

impl TickPolicy {
    /// Tick values this policy yields over `domain`.
    #[must_use]
    pub fn ticks(&self, domain: (f64, f64)) -> Vec<f64> {
        match *self {
            Self::Count(count) => linear_ticks(domain.0, domain.1, count),
            Self::Step(step) => stepped_ticks(domain.0, domain.1, step),
        }
    }

    fn validate(&self, axis: &str) -> ChartResult<()> {
        if let Self::Step(step) = *self {
            if !step.is_finite() || step <= 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "{axis} step must be finite and positive, got {step}"
                )));
            }
        }
        Ok(())
    }
}

/// Optional per-side domain overrides. A side left `None` is computed from
/// the active frame's bounds. The race chart pins its value domain at
/// `[0, frame max]` and ignores these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    #[serde(default)]
    pub min_x: Option<f64>,
    #[serde(default)]
    pub max_x: Option<f64>,
    #[serde(default)]
    pub min_y: Option<f64>,
    #[serde(default)]
    pub max_y: Option<f64>,
}

impl AxisBounds {
    #[must_use]
    pub(crate) fn apply_x(&self, computed: (f64, f64)) -> (f64, f64) {
        (
            self.min_x.unwrap_or(computed.0),
            self.max_x.unwrap_or(computed.1),
        )
    }

    #[must_use]
    pub(crate) fn apply_y(&self, computed: (f64, f64)) -> (f64, f64) {
        (
            self.min_y.unwrap_or(computed.0),
            self.max_y.unwrap_or(computed.1),
        )
    }

    fn validate(&self) -> ChartResult<()> {
        for (side, bound) in [
            ("min_x", self.min_x),
            ("max_x", self.max_x),
            ("min_y", self.min_y),
            ("max_y", self.max_y),
        ] {
            if bound.is_some_and(|value| !value.is_finite()) {
                return Err(ChartError::InvalidConfig(format!(
                    "bounds.{side} must be finite"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_x, self.max_x) {
            if min > max {
                return Err(ChartError::InvalidConfig(format!(
                    "bounds.min_x {min} exceeds bounds.max_x {max}"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_y, self.max_y) {
            if min > max {
                return Err(ChartError::InvalidConfig(format!(
                    "bounds.min_y {min} exceeds bounds.max_y {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Construction-time chart configuration.
///
/// Set once per engine; changing it means building a new engine. The type is
/// serializable so hosts can load chart setup from JSON, with every field but
/// `title` and `kind` optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub title: String,
    pub kind: ChartKind,
    /// Carried for the host surface; the engine renders no static text.
    #[serde(default)]
    pub description: String,
    /// Fixed at construction; only the width is measured from the container.
    #[serde(default = "default_height")]
    pub height: f64,
    /// `None` picks the per-kind margins the charts were designed around.
    #[serde(default)]
    pub margins: Option<Margins>,
    #[serde(default = "default_transition_duration_ms")]
    pub transition_duration_ms: u64,
    /// Scatter autoplay spacing; deliberately wider than the transition so a
    /// settled frame stays readable.
    #[serde(default = "default_autoplay_delay_ms")]
    pub autoplay_delay_ms: u64,
    /// Race leader count; the band scale carries one extra staging slot.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_fill")]
    pub fill: String,
    #[serde(default)]
    pub stroke: Option<String>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default = "default_tick_policy")]
    pub x_ticks: TickPolicy,
    #[serde(default = "default_tick_policy")]
    pub y_ticks: TickPolicy,
    /// `None` resolves per kind (both kinds default to a visible x grid).
    #[serde(default)]
    pub show_x_grid: Option<bool>,
    /// `None` resolves per kind (scatter on, race off — bands have no y grid).
    #[serde(default)]
    pub show_y_grid: Option<bool>,
    /// `false` applies every transition instantly; autoplay cadence keeps
    /// spacing frames regardless.
    #[serde(default = "default_animated")]
    pub animated: bool,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default)]
    pub bounds: AxisBounds,
    /// Race label values display as `value / label_divisor`.
    #[serde(default = "default_label_divisor")]
    pub label_divisor: f64,
    /// Decimal places for race labels; `None` shows the raw division result.
    #[serde(default)]
    pub label_precision: Option<u8>,
}

impl ChartConfig {
    /// Creates a ranked bar-chart-race configuration with default furniture.
    #[must_use]
    pub fn bar_race(title: impl Into<String>) -> Self {
        Self::new(title, ChartKind::BarRace)
    }

    /// Creates a scatter-plot configuration with default furniture.
    #[must_use]
    pub fn scatter(title: impl Into<String>) -> Self {
        Self::new(title, ChartKind::Scatter)
    }

    fn new(title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            title: title.into(),
            kind,
            description: String::new(),
            height: default_height(),
            margins: None,
            transition_duration_ms: default_transition_duration_ms(),
            autoplay_delay_ms: default_autoplay_delay_ms(),
            top_n: default_top_n(),
            fill: default_fill(),
            stroke: None,
            opacity: default_opacity(),
            radius: default_radius(),
            x_ticks: default_tick_policy(),
            y_ticks: default_tick_policy(),
            show_x_grid: None,
            show_y_grid: None,
            animated: default_animated(),
            autoplay: false,
            bounds: AxisBounds::default(),
            label_divisor: default_label_divisor(),
            label_precision: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = Some(margins);
        self
    }

    #[must_use]
    pub fn with_transition_duration_ms(mut self, duration_ms: u64) -> Self {
        self.transition_duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn with_autoplay_delay_ms(mut self, delay_ms: u64) -> Self {
        self.autoplay_delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = fill.into();
        self
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: impl Into<String>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn with_x_ticks(mut self, policy: TickPolicy) -> Self {
        self.x_ticks = policy;
        self
    }

    #[must_use]
    pub fn with_y_ticks(mut self, policy: TickPolicy) -> Self {
        self.y_ticks = policy;
        self
    }

    #[must_use]
    pub fn with_x_grid(mut self, show: bool) -> Self {
        self.show_x_grid = Some(show);
        self
    }

    #[must_use]
    pub fn with_y_grid(mut self, show: bool) -> Self {
        self.show_y_grid = Some(show);
        self
    }

    #[must_use]
    pub fn with_animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    #[must_use]
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: AxisBounds) -> Self {
        self.bounds = bounds;
        self
    }

    #[must_use]
    pub fn with_label_divisor(mut self, divisor: f64) -> Self {
        self.label_divisor = divisor;
        self
    }

    #[must_use]
    pub fn with_label_precision(mut self, precision: u8) -> Self {
        self.label_precision = Some(precision);
        self
    }

    /// Margins after per-kind resolution: the race reserves headroom for the
    /// top value axis, the scatter reserves room for bottom/left labels.
    #[must_use]
    pub fn resolved_margins(&self) -> Margins {
        self.margins.unwrap_or(match self.kind {
            ChartKind::BarRace => Margins::new(40.0, 20.0, 20.0, 20.0),
            ChartKind::Scatter => Margins::new(20.0, 20.0, 40.0, 40.0),
        })
    }

    #[must_use]
    pub fn x_grid_enabled(&self) -> bool {
        self.show_x_grid.unwrap_or(true)
    }

    #[must_use]
    pub fn y_grid_enabled(&self) -> bool {
        self.show_y_grid
            .unwrap_or(matches!(self.kind, ChartKind::Scatter))
    }

    /// Transition window actually applied to plans; zero when `animated` is
    /// off.
    #[must_use]
    pub fn effective_duration_ms(&self) -> u64 {
        if self.animated {
            self.transition_duration_ms
        } else {
            0
        }
    }

    /// Delay between an applied frame and the next autoplay advance. The race
    /// chains straight off the transition window; the scatter waits the
    /// configured delay.
    #[must_use]
    pub fn autoplay_cadence_ms(&self) -> u64 {
        match self.kind {
            ChartKind::BarRace => self.transition_duration_ms,
            ChartKind::Scatter => self.autoplay_delay_ms,
        }
    }

    pub(crate) fn style_defaults(&self) -> StyleDefaults {
        StyleDefaults {
            fill: self.fill.clone(),
            stroke: self.stroke.clone().unwrap_or_else(|| "none".to_owned()),
            opacity: self.opacity,
            radius: self.radius,
        }
    }

    /// Fail-fast validation; engine construction rejects configs this flags.
    pub fn validate(&self) -> ChartResult<()> {
        if self.title.trim().is_empty() {
            return Err(ChartError::InvalidConfig(
                "title is required and must not be empty".to_owned(),
            ));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ChartError::InvalidConfig(format!(
                "height must be finite and positive, got {}",
                self.height
            )));
        }
        if let Some(margins) = self.margins {
            for (side, value) in [
                ("top", margins.top),
                ("right", margins.right),
                ("bottom", margins.bottom),
                ("left", margins.left),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ChartError::InvalidConfig(format!(
                        "margin {side} must be finite and non-negative, got {value}"
                    )));
                }
            }
        }
        if self.top_n == 0 {
            return Err(ChartError::InvalidConfig(
                "top_n must be at least 1".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ChartError::InvalidConfig(format!(
                "opacity must be within [0, 1], got {}",
                self.opacity
            )));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ChartError::InvalidConfig(format!(
                "radius must be finite and non-negative, got {}",
                self.radius
            )));
        }
        self.x_ticks.validate("x_ticks")?;
        self.y_ticks.validate("y_ticks")?;
        self.bounds.validate()?;
        if !self.label_divisor.is_finite() || self.label_divisor == 0.0 {
            return Err(ChartError::InvalidConfig(format!(
                "label_divisor must be finite and non-zero, got {}",
                self.label_divisor
            )));
        }
        Ok(())
    }

    /// Serializes the config to pretty JSON for debug/config files.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| ChartError::InvalidConfig(format!("failed to serialize config: {err}")))
    }

    /// Deserializes a config from JSON. Callers still run [`Self::validate`]
    /// (engine construction does so automatically).
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|err| ChartError::InvalidConfig(format!("failed to parse config: {err}")))
    }
}

fn default_height() -> f64 {
    400.0
}

fn default_transition_duration_ms() -> u64 {
    200
}

fn default_autoplay_delay_ms() -> u64 {
    500
}

fn default_top_n() -> usize {
    10
}

fn default_fill() -> String {
    "black".to_owned()
}

fn default_opacity() -> f64 {
    1.0
}

fn default_radius() -> f64 {
    5.0
}

fn default_tick_policy() -> TickPolicy {
    TickPolicy::Count(10)
}

fn default_animated() -> bool {
    true
}

fn default_label_divisor() -> f64 {
    1000.0
}
