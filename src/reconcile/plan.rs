use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::frame::FrameEntry;
use crate::core::scale::{BandScale, LinearScale};
use crate::core::ticks::format_scaled_value;
use crate::core::types::{FrameKey, PointStyle, Viewport};
use crate::error::{ChartError, ChartResult};

/// Axis placement relative to the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Top,
    Bottom,
    Left,
}

/// Whether an update draws axis furniture (baseline, tick marks, labels) or
/// grid lines sharing the same tick positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRole {
    Axis,
    Grid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// Absolute pixel position along the axis direction.
    pub position: f64,
    pub label: Option<String>,
}

/// Target state of one axis or grid group after a domain change.
///
/// `offset` is the group's perpendicular placement. `tick_length` follows the
/// usual axis sign conventions: positive lengths point away from the plot,
/// negative lengths span into it (grids). Top/Left ticks end at
/// `offset - tick_length`, Bottom ticks at `offset + tick_length`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisUpdate {
    pub role: AxisRole,
    pub orientation: Orientation,
    pub offset: f64,
    /// Domain baseline span along the axis; `None` drops the baseline
    /// (scatter grids draw bare lines).
    pub baseline: Option<(f64, f64)>,
    pub tick_length: f64,
    pub ticks: Vec<Tick>,
    pub duration_ms: u64,
}

/// Resolved visual attributes after the point → config → engine-default
/// fallthrough.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub fill: String,
    pub stroke: String,
    pub opacity: f64,
}

/// Target pose of one keyed node. Bar coordinates are the group origin; the
/// rect spans `(0, 0, width, height)` locally and the label sits at
/// `(label_x, label_y)` with end anchoring.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeShape {
    Bar {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        label: String,
        label_x: f64,
        label_y: f64,
    },
    Dot {
        cx: f64,
        cy: f64,
        radius: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnterOp {
    pub key: String,
    pub from: NodeShape,
    pub from_opacity: f64,
    pub to: NodeShape,
    pub style: ResolvedStyle,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOp {
    pub key: String,
    pub to: NodeShape,
    /// Scatter re-resolves style every frame; race bars keep their enter
    /// style, matching the original update path.
    pub style: Option<ResolvedStyle>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitOp {
    pub key: String,
    /// Race bars slide their group origin here while fading; `None` fades in
    /// place (scatter).
    pub staging: Option<(f64, f64)>,
    pub duration_ms: u64,
}

/// Interpolation curve a backend applies across every transition in a plan.
/// Plans only ever drive linear ramps today; the enum keeps the contract
/// explicit at the renderer seam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
}

/// Everything one reconciliation asks of the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub frame: FrameKey,
    pub viewport: Viewport,
    /// Resize path: the scene is torn down and rebuilt from this plan.
    pub rebuild: bool,
    pub easing: Easing,
    pub axes: SmallVec<[AxisUpdate; 4]>,
    pub enters: Vec<EnterOp>,
    pub updates: Vec<UpdateOp>,
    pub exits: Vec<ExitOp>,
    /// Transition window; the frame is settled once it elapses.
    pub settle_ms: u64,
}

impl FramePlan {
    #[must_use]
    pub fn op_counts(&self) -> (usize, usize, usize) {
        (self.enters.len(), self.updates.len(), self.exits.len())
    }

    /// Rejects plans carrying non-finite geometry or out-of-range opacity.
    /// Planning code never produces these; backends validate anyway so a
    /// regression surfaces at the seam instead of as corrupt output.
    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidData(format!(
                "plan viewport is degenerate: {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        for axis in &self.axes {
            if !axis.offset.is_finite() {
                return Err(ChartError::InvalidData("axis offset must be finite".to_owned()));
            }
            for tick in &axis.ticks {
                if !tick.position.is_finite() || !tick.value.is_finite() {
                    return Err(ChartError::InvalidData("tick geometry must be finite".to_owned()));
                }
            }
        }
        for enter in &self.enters {
            validate_shape(&enter.from)?;
            validate_shape(&enter.to)?;
            validate_opacity(enter.from_opacity)?;
            validate_opacity(enter.style.opacity)?;
        }
        for update in &self.updates {
            validate_shape(&update.to)?;
            if let Some(style) = &update.style {
                validate_opacity(style.opacity)?;
            }
        }
        for exit in &self.exits {
            if let Some((x, y)) = exit.staging {
                if !x.is_finite() || !y.is_finite() {
                    return Err(ChartError::InvalidData(
                        "exit staging position must be finite".to_owned(),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn validate_shape(shape: &NodeShape) -> ChartResult<()> {
    let finite = match shape {
        NodeShape::Bar {
            x,
            y,
            width,
            height,
            label_x,
            label_y,
            ..
        } => {
            x.is_finite()
                && y.is_finite()
                && width.is_finite()
                && height.is_finite()
                && label_x.is_finite()
                && label_y.is_finite()
        }
        NodeShape::Dot { cx, cy, radius } => cx.is_finite() && cy.is_finite() && radius.is_finite(),
    };
    if finite {
        Ok(())
    } else {
        Err(ChartError::InvalidData(
            "node geometry must be finite".to_owned(),
        ))
    }
}

fn validate_opacity(opacity: f64) -> ChartResult<()> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(())
    } else {
        Err(ChartError::InvalidData(format!(
            "opacity {opacity} outside [0, 1]"
        )))
    }
}

/// Last committed pose basis for one on-screen key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedEntry {
    pub rank: Option<usize>,
    pub value: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Scale domains committed by the previous reconciliation; the empty-frame
/// fallback reuses them instead of inventing geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CommittedDomains {
    pub value: Option<(f64, f64)>,
    pub x: Option<(f64, f64)>,
    pub y: Option<(f64, f64)>,
}

/// The engine's single render-state value: replaced atomically after every
/// applied plan, never mutated in place by planning code.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub frame: FrameKey,
    pub viewport: Viewport,
    pub entries: IndexMap<String, CommittedEntry>,
    pub domains: CommittedDomains,
}

impl RenderState {
    #[must_use]
    pub fn initial(frame: FrameKey, viewport: Viewport) -> Self {
        Self {
            frame,
            viewport,
            entries: IndexMap::new(),
            domains: CommittedDomains::default(),
        }
    }

    #[must_use]
    pub fn key_set(&self) -> IndexSet<String> {
        self.entries.keys().cloned().collect()
    }
}

#[must_use]
pub fn committed_entries(entries: &[FrameEntry]) -> IndexMap<String, CommittedEntry> {
    entries
        .iter()
        .map(|entry| {
            (
                entry.point.key.clone(),
                CommittedEntry {
                    rank: entry.rank,
                    value: entry.point.value,
                    x: entry.point.x,
                    y: entry.point.y,
                },
            )
        })
        .collect()
}

/// Chart-level style defaults, already merged with the engine-internal
/// defaults by the configuration layer.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDefaults {
    pub fill: String,
    pub stroke: String,
    pub opacity: f64,
    pub radius: f64,
}

#[must_use]
pub fn resolve_style(style: &PointStyle, defaults: &StyleDefaults) -> ResolvedStyle {
    ResolvedStyle {
        fill: style.fill.clone().unwrap_or_else(|| defaults.fill.clone()),
        stroke: style
            .stroke
            .clone()
            .unwrap_or_else(|| defaults.stroke.clone()),
        opacity: style.opacity.unwrap_or(defaults.opacity),
    }
}

#[must_use]
pub fn resolve_radius(style: &PointStyle, defaults: &StyleDefaults) -> f64 {
    style.radius.unwrap_or(defaults.radius)
}

/// Race bar pose: group at `(xScale(0), band(rank))`, rect width spanning to
/// the value, label hugging the bar's right edge.
#[must_use]
pub fn bar_shape(
    entry: &FrameEntry,
    rank: usize,
    value_scale: &LinearScale,
    band_scale: &BandScale,
    label: String,
) -> NodeShape {
    let origin_x = value_scale.map(0.0);
    let width = value_scale.map(entry.point.value) - origin_x;
    let height = band_scale.bandwidth();
    NodeShape::Bar {
        x: origin_x,
        y: band_scale.position(rank),
        width,
        height,
        label,
        label_x: width,
        label_y: height / 2.0 + 4.0,
    }
}

/// Same pose parked at the staging slot below the visible ranks.
#[must_use]
pub fn staged(shape: &NodeShape, band_scale: &BandScale, staging_rank: usize) -> NodeShape {
    match shape {
        NodeShape::Bar {
            x,
            width,
            height,
            label,
            label_x,
            label_y,
            ..
        } => NodeShape::Bar {
            x: *x,
            y: band_scale.position(staging_rank),
            width: *width,
            height: *height,
            label: label.clone(),
            label_x: *label_x,
            label_y: *label_y,
        },
        NodeShape::Dot { .. } => shape.clone(),
    }
}

#[must_use]
pub fn dot_shape(entry: &FrameEntry, x_scale: &LinearScale, y_scale: &LinearScale, radius: f64) -> NodeShape {
    NodeShape::Dot {
        cx: x_scale.map(entry.point.x.unwrap_or_default()),
        cy: y_scale.map(entry.point.y.unwrap_or_default()),
        radius,
    }
}

#[must_use]
pub fn race_label(key: &str, value: f64, divisor: f64, precision: Option<u8>) -> String {
    format!("{key} {}", format_scaled_value(value, divisor, precision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DataPoint;
    use approx::assert_relative_eq;

    fn defaults() -> StyleDefaults {
        StyleDefaults {
            fill: "black".to_owned(),
            stroke: "none".to_owned(),
            opacity: 1.0,
            radius: 5.0,
        }
    }

    #[test]
    fn style_resolution_falls_through_to_defaults() {
        let resolved = resolve_style(&PointStyle::default(), &defaults());
        assert_eq!(resolved.fill, "black");
        assert_eq!(resolved.stroke, "none");
        assert_relative_eq!(resolved.opacity, 1.0);
    }

    #[test]
    fn point_overrides_win_over_defaults() {
        let style = PointStyle {
            fill: Some("#aabbcc".to_owned()),
            stroke: None,
            opacity: Some(0.25),
            radius: Some(9.0),
        };
        let resolved = resolve_style(&style, &defaults());
        assert_eq!(resolved.fill, "#aabbcc");
        assert_eq!(resolved.stroke, "none");
        assert_relative_eq!(resolved.opacity, 0.25);
        assert_relative_eq!(resolve_radius(&style, &defaults()), 9.0);
    }

    #[test]
    fn bar_shape_spans_from_zero_to_value() {
        let value_scale = LinearScale::new((0.0, 100.0), (20.0, 220.0));
        let band_scale = BandScale::new(4, (40.0, 400.0), 0.1);
        let entry = FrameEntry {
            point: DataPoint::new("a", 1, 50.0),
            rank: Some(2),
        };
        let shape = bar_shape(&entry, 2, &value_scale, &band_scale, "a 0.05".to_owned());
        let NodeShape::Bar {
            x,
            y,
            width,
            height,
            label_x,
            label_y,
            ..
        } = shape
        else {
            panic!("expected bar");
        };
        assert_relative_eq!(x, 20.0);
        assert_relative_eq!(width, 100.0);
        assert_relative_eq!(y, band_scale.position(2));
        assert_relative_eq!(height, band_scale.bandwidth());
        assert_relative_eq!(label_x, width);
        assert_relative_eq!(label_y, height / 2.0 + 4.0);
    }

    #[test]
    fn staging_only_moves_the_band_position() {
        let value_scale = LinearScale::new((0.0, 10.0), (0.0, 100.0));
        let band_scale = BandScale::new(3, (0.0, 90.0), 0.0);
        let entry = FrameEntry {
            point: DataPoint::new("a", 1, 10.0),
            rank: Some(0),
        };
        let target = bar_shape(&entry, 0, &value_scale, &band_scale, String::new());
        let parked = staged(&target, &band_scale, 2);
        let (NodeShape::Bar { y: target_y, width: target_w, .. }, NodeShape::Bar { y: parked_y, width: parked_w, .. }) =
            (&target, &parked)
        else {
            panic!("expected bars");
        };
        assert_relative_eq!(*parked_y, band_scale.position(2));
        assert_ne!(target_y, parked_y);
        assert_relative_eq!(*target_w, *parked_w);
    }

    #[test]
    fn race_labels_match_the_legacy_format() {
        assert_eq!(race_label("Beirut", 9500.0, 1000.0, None), "Beirut 9.5");
        assert_eq!(race_label("Beirut", 9500.0, 1000.0, Some(2)), "Beirut 9.50");
    }

    #[test]
    fn committed_entries_keep_frame_order() {
        let entries = vec![
            FrameEntry {
                point: DataPoint::new("b", 1, 9.0),
                rank: Some(0),
            },
            FrameEntry {
                point: DataPoint::new("a", 1, 5.0),
                rank: Some(1),
            },
        ];
        let committed = committed_entries(&entries);
        let keys: Vec<&String> = committed.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(committed["a"].rank, Some(1));
    }
}
