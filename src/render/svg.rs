use indexmap::IndexMap;

use crate::core::types::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::reconcile::{AxisRole, AxisUpdate, FramePlan, NodeShape, Orientation, ResolvedStyle};
use crate::render::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SvgRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub circles_drawn: usize,
    pub texts_drawn: usize,
}

const GRID_STROKE: &str = "#ddd";
const AXIS_STROKE: &str = "black";

/// A node retained between plans. Exited nodes stay at opacity zero until
/// their removal is finalized, mirroring how a faded DOM node lingers until
/// the transition's remove callback runs.
#[derive(Debug, Clone)]
struct SceneNode {
    shape: NodeShape,
    style: ResolvedStyle,
    opacity: f64,
}

/// SVG renderer backend.
///
/// Plans describe transitions; this backend keeps the settled pose of every
/// retained node and serializes the scene as a standalone SVG document. Hosts
/// that need motion interpolate between documents; hosts that need stills get
/// the end state of whatever was applied last.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    viewport: Option<Viewport>,
    axes: IndexMap<(AxisRole, Orientation), AxisUpdate>,
    nodes: IndexMap<String, SceneNode>,
    last_stats: SvgRenderStats,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "svg"
    }

    #[must_use]
    pub fn last_stats(&self) -> SvgRenderStats {
        self.last_stats
    }

    /// Retained nodes, including exited ones awaiting finalization.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Serializes the settled scene as a complete SVG document and refreshes
    /// the draw stats.
    pub fn document(&mut self) -> ChartResult<String> {
        let viewport = self.viewport.ok_or_else(|| {
            ChartError::RenderBackend("no frame has been applied yet".to_owned())
        })?;

        let mut stats = SvgRenderStats::default();
        let mut out = String::new();
        out.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = viewport.width,
            h = viewport.height,
        ));

        // Grids under axis furniture, nodes on top, matching DOM insertion
        // order in the charts this backend replays.
        for axis in self.axes.values().filter(|axis| axis.role == AxisRole::Grid) {
            push_axis_group(&mut out, axis, &mut stats);
        }
        for axis in self.axes.values().filter(|axis| axis.role == AxisRole::Axis) {
            push_axis_group(&mut out, axis, &mut stats);
        }
        for node in self.nodes.values() {
            push_node(&mut out, node, &mut stats);
        }

        out.push_str("</svg>\n");
        self.last_stats = stats;
        Ok(out)
    }
}

impl Renderer for SvgRenderer {
    fn apply(&mut self, plan: &FramePlan) -> ChartResult<()> {
        plan.validate()?;
        if plan.rebuild {
            self.axes.clear();
            self.nodes.clear();
        }
        self.viewport = Some(plan.viewport);

        for axis in &plan.axes {
            self.axes.insert((axis.role, axis.orientation), axis.clone());
        }
        for enter in &plan.enters {
            self.nodes.insert(
                enter.key.clone(),
                SceneNode {
                    shape: enter.to.clone(),
                    style: enter.style.clone(),
                    opacity: enter.style.opacity,
                },
            );
        }
        for update in &plan.updates {
            let node = self.nodes.get_mut(&update.key).ok_or_else(|| {
                ChartError::RenderBackend(format!(
                    "update targets unknown node '{}'",
                    update.key
                ))
            })?;
            node.shape = update.to.clone();
            if let Some(style) = &update.style {
                node.opacity = style.opacity;
                node.style = style.clone();
            }
        }
        for exit in &plan.exits {
            let node = self.nodes.get_mut(&exit.key).ok_or_else(|| {
                ChartError::RenderBackend(format!("exit targets unknown node '{}'", exit.key))
            })?;
            node.opacity = 0.0;
            if let (Some((x, y)), NodeShape::Bar { .. }) = (exit.staging, &node.shape) {
                node.shape = reposition_bar(&node.shape, x, y);
            }
        }
        Ok(())
    }

    fn finalize_exits(&mut self, keys: &[String]) -> ChartResult<()> {
        // Keys already gone (for instance wiped by an interleaved rebuild)
        // are not an error; removal is idempotent.
        for key in keys {
            self.nodes.shift_remove(key);
        }
        Ok(())
    }

    fn clear(&mut self) -> ChartResult<()> {
        self.axes.clear();
        self.nodes.clear();
        Ok(())
    }
}

fn reposition_bar(shape: &NodeShape, x: f64, y: f64) -> NodeShape {
    match shape {
        NodeShape::Bar {
            width,
            height,
            label,
            label_x,
            label_y,
            ..
        } => NodeShape::Bar {
            x,
            y,
            width: *width,
            height: *height,
            label: label.clone(),
            label_x: *label_x,
            label_y: *label_y,
        },
        NodeShape::Dot { .. } => shape.clone(),
    }
}

fn push_axis_group(out: &mut String, axis: &AxisUpdate, stats: &mut SvgRenderStats) {
    let class = match (axis.role, axis.orientation) {
        (AxisRole::Axis, Orientation::Left) => "axis y-axis",
        (AxisRole::Axis, _) => "axis x-axis",
        (AxisRole::Grid, Orientation::Left) => "grid y-grid",
        (AxisRole::Grid, _) => "grid x-grid",
    };
    let stroke = match axis.role {
        AxisRole::Axis => AXIS_STROKE,
        AxisRole::Grid => GRID_STROKE,
    };
    out.push_str(&format!("  <g class=\"{class}\" stroke=\"{stroke}\">\n"));

    if let Some((from, to)) = axis.baseline {
        let (x1, y1, x2, y2) = match axis.orientation {
            Orientation::Top | Orientation::Bottom => (from, axis.offset, to, axis.offset),
            Orientation::Left => (axis.offset, from, axis.offset, to),
        };
        out.push_str(&format!(
            "    <line class=\"domain\" x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\"/>\n"
        ));
        stats.lines_drawn += 1;
    }

    for tick in &axis.ticks {
        if axis.tick_length != 0.0 {
            let (x1, y1, x2, y2) = match axis.orientation {
                Orientation::Top => (
                    tick.position,
                    axis.offset,
                    tick.position,
                    axis.offset - axis.tick_length,
                ),
                Orientation::Bottom => (
                    tick.position,
                    axis.offset,
                    tick.position,
                    axis.offset + axis.tick_length,
                ),
                Orientation::Left => (
                    axis.offset,
                    tick.position,
                    axis.offset - axis.tick_length,
                    tick.position,
                ),
            };
            out.push_str(&format!(
                "    <line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\"/>\n"
            ));
            stats.lines_drawn += 1;
        }
        if let Some(label) = &tick.label {
            let (x, y, anchor) = match axis.orientation {
                Orientation::Top => (
                    tick.position,
                    axis.offset - axis.tick_length - 4.0,
                    "middle",
                ),
                Orientation::Bottom => (
                    tick.position,
                    axis.offset + axis.tick_length + 12.0,
                    "middle",
                ),
                Orientation::Left => {
                    (axis.offset - axis.tick_length - 4.0, tick.position + 4.0, "end")
                }
            };
            out.push_str(&format!(
                "    <text x=\"{x}\" y=\"{y}\" text-anchor=\"{anchor}\" stroke=\"none\">{}</text>\n",
                xml_escape(label)
            ));
            stats.texts_drawn += 1;
        }
    }
    out.push_str("  </g>\n");
}

fn push_node(out: &mut String, node: &SceneNode, stats: &mut SvgRenderStats) {
    match &node.shape {
        NodeShape::Bar {
            x,
            y,
            width,
            height,
            label,
            label_x,
            label_y,
        } => {
            out.push_str(&format!(
                "  <g transform=\"translate({x} {y})\" opacity=\"{}\">\n",
                node.opacity
            ));
            out.push_str(&format!(
                "    <rect width=\"{}\" height=\"{height}\" fill=\"{}\" stroke=\"{}\"/>\n",
                width.max(0.0),
                xml_escape(&node.style.fill),
                xml_escape(&node.style.stroke),
            ));
            out.push_str(&format!(
                "    <text x=\"{label_x}\" y=\"{label_y}\" text-anchor=\"end\">{}</text>\n",
                xml_escape(label)
            ));
            out.push_str("  </g>\n");
            stats.rects_drawn += 1;
            stats.texts_drawn += 1;
        }
        NodeShape::Dot { cx, cy, radius } => {
            out.push_str(&format!(
                "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"{radius}\" fill=\"{}\" stroke=\"{}\" opacity=\"{}\"/>\n",
                xml_escape(&node.style.fill),
                xml_escape(&node.style.stroke),
                node.opacity,
            ));
            stats.circles_drawn += 1;
        }
    }
}

fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
