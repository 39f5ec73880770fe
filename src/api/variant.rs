//! Per-kind frame planning.
//!
//! Planning is pure: given the config, dataset, viewport and the previously
//! committed render state, it produces the next [`RenderState`] and the
//! [`FramePlan`] that moves the scene there. Applying the plan to a renderer
//! is the engine's job; nothing here mutates shared state or talks to a
//! backend.

use indexmap::IndexSet;
use smallvec::SmallVec;
use tracing::debug;

use crate::api::config::{ChartConfig, ChartKind, TickPolicy};
use crate::core::dataset::Dataset;
use crate::core::frame::{
    FrameEntry, frame_value_max, frame_xy_bounds, select_race_frame, select_scatter_frame,
};
use crate::core::scale::{BandScale, LinearScale};
use crate::core::ticks::format_tick;
use crate::core::types::{FrameKey, Margins, Viewport};
use crate::reconcile::join::partition_keys;
use crate::reconcile::plan::{
    AxisRole, AxisUpdate, CommittedDomains, Easing, EnterOp, ExitOp, FramePlan, Orientation,
    RenderState, Tick, UpdateOp, bar_shape, committed_entries, dot_shape, race_label,
    resolve_radius, resolve_style, staged,
};

/// Inner padding ratio of the race band scale.
const BAND_PADDING: f64 = 0.1;

/// Tick mark length on labeled axes, pointing away from the plot.
const AXIS_TICK_LENGTH: f64 = 6.0;

/// Plot-area frame derived from the viewport and resolved margins.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layout {
    viewport: Viewport,
    margins: Margins,
}

impl Layout {
    pub(crate) fn new(viewport: Viewport, margins: Margins) -> Self {
        Self { viewport, margins }
    }

    fn x_range(&self) -> (f64, f64) {
        (self.margins.left, self.viewport.width - self.margins.right)
    }

    /// Scatter y range, descending so larger values land higher up.
    fn y_range(&self) -> (f64, f64) {
        (self.viewport.height - self.margins.bottom, self.margins.top)
    }

    /// Race band range. Bands run from the top margin to the full height so
    /// the staging slot sits flush with the lower edge.
    fn band_range(&self) -> (f64, f64) {
        (self.margins.top, self.viewport.height)
    }

    fn plot_width(&self) -> f64 {
        self.viewport.width - self.margins.left - self.margins.right
    }

    fn plot_height(&self) -> f64 {
        self.viewport.height - self.margins.top - self.margins.bottom
    }

    fn margins(&self) -> Margins {
        self.margins
    }
}

/// One chart kind's planning strategy. The engine stays generic over the
/// renderer; this trait keeps it generic over the chart semantics too.
pub(crate) trait ChartVariant {
    type Scales;

    fn select_frame(
        &self,
        config: &ChartConfig,
        dataset: &Dataset,
        frame: FrameKey,
    ) -> Vec<FrameEntry>;

    /// Builds this frame's scales and the domains to commit with it.
    /// `previous` carries the last committed domains for the empty-frame
    /// fallback.
    fn scales(
        &self,
        config: &ChartConfig,
        layout: &Layout,
        entries: &[FrameEntry],
        previous: &CommittedDomains,
    ) -> (Self::Scales, CommittedDomains);

    fn axes(
        &self,
        config: &ChartConfig,
        layout: &Layout,
        scales: &Self::Scales,
        duration_ms: u64,
    ) -> SmallVec<[AxisUpdate; 4]>;

    /// Keyed enter/update/exit operations against the previous commit.
    fn ops(
        &self,
        config: &ChartConfig,
        entries: &[FrameEntry],
        previous: &RenderState,
        scales: &Self::Scales,
        duration_ms: u64,
    ) -> (Vec<EnterOp>, Vec<UpdateOp>, Vec<ExitOp>);
}

/// Plans one frame. `rebuild` marks the resize/initial path: the scene is
/// treated as empty (everything enters, nothing exits) and axes draw in
/// place instead of transitioning.
pub(crate) fn plan_frame(
    config: &ChartConfig,
    dataset: &Dataset,
    viewport: Viewport,
    previous: &RenderState,
    frame: FrameKey,
    rebuild: bool,
) -> (RenderState, FramePlan) {
    match config.kind {
        ChartKind::BarRace => {
            run_plan(&BarRaceVariant, config, dataset, viewport, previous, frame, rebuild)
        }
        ChartKind::Scatter => {
            run_plan(&ScatterVariant, config, dataset, viewport, previous, frame, rebuild)
        }
    }
}

fn run_plan<V: ChartVariant>(
    variant: &V,
    config: &ChartConfig,
    dataset: &Dataset,
    viewport: Viewport,
    previous: &RenderState,
    frame: FrameKey,
    rebuild: bool,
) -> (RenderState, FramePlan) {
    let layout = Layout::new(viewport, config.resolved_margins());
    let entries = variant.select_frame(config, dataset, frame);
    let (scales, domains) = variant.scales(config, &layout, &entries, &previous.domains);

    let duration_ms = config.effective_duration_ms();
    let axis_duration_ms = if rebuild { 0 } else { duration_ms };
    let axes = variant.axes(config, &layout, &scales, axis_duration_ms);

    let blank;
    let basis = if rebuild {
        blank = RenderState::initial(previous.frame, viewport);
        &blank
    } else {
        previous
    };
    let (enters, updates, exits) = variant.ops(config, &entries, basis, &scales, duration_ms);

    debug!(
        frame,
        rebuild,
        enters = enters.len(),
        updates = updates.len(),
        exits = exits.len(),
        "planned frame"
    );

    let next = RenderState {
        frame,
        viewport,
        entries: committed_entries(&entries),
        domains,
    };
    let plan = FramePlan {
        frame,
        viewport,
        rebuild,
        easing: Easing::Linear,
        axes,
        enters,
        updates,
        exits,
        settle_ms: duration_ms,
    };
    (next, plan)
}

fn scale_ticks(policy: TickPolicy, scale: &LinearScale, labeled: bool) -> Vec<Tick> {
    policy
        .ticks(scale.domain())
        .into_iter()
        .map(|value| Tick {
            value,
            position: scale.map(value),
            label: labeled.then(|| format_tick(value)),
        })
        .collect()
}

fn current_key_set(entries: &[FrameEntry]) -> IndexSet<String> {
    entries
        .iter()
        .map(|entry| entry.point.key.clone())
        .collect()
}

/// Ranked descending bar race. The value axis hangs from the top margin and
/// bars slide between band slots; churn passes through the staging slot one
/// past the visible ranks.
pub(crate) struct BarRaceVariant;

pub(crate) struct RaceScales {
    pub value: LinearScale,
    pub band: BandScale,
}

impl ChartVariant for BarRaceVariant {
    type Scales = RaceScales;

    fn select_frame(
        &self,
        config: &ChartConfig,
        dataset: &Dataset,
        frame: FrameKey,
    ) -> Vec<FrameEntry> {
        select_race_frame(dataset, frame, config.top_n)
    }

    fn scales(
        &self,
        config: &ChartConfig,
        layout: &Layout,
        entries: &[FrameEntry],
        previous: &CommittedDomains,
    ) -> (Self::Scales, CommittedDomains) {
        // The race always anchors at zero and tracks the frame leader;
        // explicit bounds are a scatter concern.
        let domain = match frame_value_max(entries) {
            Some(max) => (0.0, max),
            None => previous.value.unwrap_or((0.0, 1.0)),
        };
        let scales = RaceScales {
            value: LinearScale::new(domain, layout.x_range()).rounded(),
            band: BandScale::new(config.top_n + 1, layout.band_range(), BAND_PADDING).rounded(),
        };
        let domains = CommittedDomains {
            value: Some(domain),
            ..CommittedDomains::default()
        };
        (scales, domains)
    }

    fn axes(
        &self,
        config: &ChartConfig,
        layout: &Layout,
        scales: &Self::Scales,
        duration_ms: u64,
    ) -> SmallVec<[AxisUpdate; 4]> {
        let margins = layout.margins();
        let mut axes = SmallVec::new();
        if config.x_grid_enabled() {
            axes.push(AxisUpdate {
                role: AxisRole::Grid,
                orientation: Orientation::Top,
                offset: margins.top,
                baseline: Some(layout.x_range()),
                tick_length: -layout.plot_height(),
                ticks: scale_ticks(config.x_ticks, &scales.value, false),
                duration_ms,
            });
        }
        axes.push(AxisUpdate {
            role: AxisRole::Axis,
            orientation: Orientation::Top,
            offset: margins.top,
            baseline: Some(layout.x_range()),
            tick_length: AXIS_TICK_LENGTH,
            ticks: scale_ticks(config.x_ticks, &scales.value, true),
            duration_ms,
        });
        // Bare rank baseline; band slots carry no tick marks or labels.
        axes.push(AxisUpdate {
            role: AxisRole::Axis,
            orientation: Orientation::Left,
            offset: margins.left,
            baseline: Some(layout.band_range()),
            tick_length: 0.0,
            ticks: Vec::new(),
            duration_ms,
        });
        axes
    }

    fn ops(
        &self,
        config: &ChartConfig,
        entries: &[FrameEntry],
        previous: &RenderState,
        scales: &Self::Scales,
        duration_ms: u64,
    ) -> (Vec<EnterOp>, Vec<UpdateOp>, Vec<ExitOp>) {
        let defaults = config.style_defaults();
        let staging_rank = config.top_n;
        let mut enters = Vec::new();
        let mut updates = Vec::new();

        for entry in entries {
            let rank = entry.rank.unwrap_or_default();
            let label = race_label(
                &entry.point.key,
                entry.point.value,
                config.label_divisor,
                config.label_precision,
            );
            let to = bar_shape(entry, rank, &scales.value, &scales.band, label);
            if previous.entries.contains_key(&entry.point.key) {
                // Bars keep the style resolved at enter time; only geometry
                // and label text move on update.
                updates.push(UpdateOp {
                    key: entry.point.key.clone(),
                    to,
                    style: None,
                    duration_ms,
                });
            } else {
                enters.push(EnterOp {
                    key: entry.point.key.clone(),
                    from: staged(&to, &scales.band, staging_rank),
                    from_opacity: 0.0,
                    to,
                    style: resolve_style(&entry.point.style, &defaults),
                    duration_ms,
                });
            }
        }

        let join = partition_keys(&previous.key_set(), &current_key_set(entries));
        let staging = (scales.value.map(0.0), scales.band.position(staging_rank));
        let exits = join
            .exiting
            .into_iter()
            .map(|key| ExitOp {
                key,
                staging: Some(staging),
                duration_ms,
            })
            .collect();
        (enters, updates, exits)
    }
}

/// Frame-indexed scatter plot. Dots tween between coordinates; entering dots
/// fade in at their final position and exiting dots fade out in place.
pub(crate) struct ScatterVariant;

pub(crate) struct ScatterScales {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl ChartVariant for ScatterVariant {
    type Scales = ScatterScales;

    fn select_frame(
        &self,
        _config: &ChartConfig,
        dataset: &Dataset,
        frame: FrameKey,
    ) -> Vec<FrameEntry> {
        select_scatter_frame(dataset, frame)
    }

    fn scales(
        &self,
        config: &ChartConfig,
        layout: &Layout,
        entries: &[FrameEntry],
        previous: &CommittedDomains,
    ) -> (Self::Scales, CommittedDomains) {
        let bounds = frame_xy_bounds(entries);
        let x_computed = bounds
            .map(|(x, _)| x)
            .or(previous.x)
            .unwrap_or((0.0, 1.0));
        let y_computed = bounds
            .map(|(_, y)| y)
            .or(previous.y)
            .unwrap_or((0.0, 1.0));
        let x_domain = config.bounds.apply_x(x_computed);
        let y_domain = config.bounds.apply_y(y_computed);

        let scales = ScatterScales {
            x: LinearScale::new(x_domain, layout.x_range()).rounded(),
            y: LinearScale::new(y_domain, layout.y_range()).rounded(),
        };
        let domains = CommittedDomains {
            x: Some(x_domain),
            y: Some(y_domain),
            ..CommittedDomains::default()
        };
        (scales, domains)
    }

    fn axes(
        &self,
        config: &ChartConfig,
        layout: &Layout,
        scales: &Self::Scales,
        duration_ms: u64,
    ) -> SmallVec<[AxisUpdate; 4]> {
        let margins = layout.margins();
        let x_offset = layout.viewport.height - margins.bottom;
        let mut axes = SmallVec::new();
        // Grids first so axis furniture paints over them.
        if config.x_grid_enabled() {
            axes.push(AxisUpdate {
                role: AxisRole::Grid,
                orientation: Orientation::Bottom,
                offset: x_offset,
                baseline: None,
                tick_length: -layout.plot_height(),
                ticks: scale_ticks(config.x_ticks, &scales.x, false),
                duration_ms,
            });
        }
        if config.y_grid_enabled() {
            axes.push(AxisUpdate {
                role: AxisRole::Grid,
                orientation: Orientation::Left,
                offset: margins.left,
                baseline: None,
                tick_length: -layout.plot_width(),
                ticks: scale_ticks(config.y_ticks, &scales.y, false),
                duration_ms,
            });
        }
        axes.push(AxisUpdate {
            role: AxisRole::Axis,
            orientation: Orientation::Bottom,
            offset: x_offset,
            baseline: Some(layout.x_range()),
            tick_length: AXIS_TICK_LENGTH,
            ticks: scale_ticks(config.x_ticks, &scales.x, true),
            duration_ms,
        });
        axes.push(AxisUpdate {
            role: AxisRole::Axis,
            orientation: Orientation::Left,
            offset: margins.left,
            baseline: Some(layout.y_range()),
            tick_length: AXIS_TICK_LENGTH,
            ticks: scale_ticks(config.y_ticks, &scales.y, true),
            duration_ms,
        });
        axes
    }

    fn ops(
        &self,
        config: &ChartConfig,
        entries: &[FrameEntry],
        previous: &RenderState,
        scales: &Self::Scales,
        duration_ms: u64,
    ) -> (Vec<EnterOp>, Vec<UpdateOp>, Vec<ExitOp>) {
        let defaults = config.style_defaults();
        let mut enters = Vec::new();
        let mut updates = Vec::new();

        for entry in entries {
            let radius = resolve_radius(&entry.point.style, &defaults);
            let to = dot_shape(entry, &scales.x, &scales.y, radius);
            let style = resolve_style(&entry.point.style, &defaults);
            if previous.entries.contains_key(&entry.point.key) {
                // Dots re-resolve style every frame so per-frame overrides
                // land mid-playback.
                updates.push(UpdateOp {
                    key: entry.point.key.clone(),
                    to,
                    style: Some(style),
                    duration_ms,
                });
            } else {
                enters.push(EnterOp {
                    key: entry.point.key.clone(),
                    from: to.clone(),
                    from_opacity: 0.0,
                    to,
                    style,
                    duration_ms,
                });
            }
        }

        let join = partition_keys(&previous.key_set(), &current_key_set(entries));
        let exits = join
            .exiting
            .into_iter()
            .map(|key| ExitOp {
                key,
                staging: None,
                duration_ms,
            })
            .collect();
        (enters, updates, exits)
    }
}
