//! motion-chart-rs: an animated keyed chart engine.
//!
//! The crate plans animated transitions for two frame-indexed chart kinds, a
//! ranked bar chart race and a scatter plot. Each advance reconciles the new
//! frame against the committed scene by key, producing enter/update/exit
//! operations plus axis and grid updates, and hands the resulting
//! [`reconcile::FramePlan`] to a [`render::Renderer`] backend. Autoplay, exit
//! finalization and resize debouncing run on a host-driven timer queue, so
//! playback is deterministic and testable without threads or wall clocks.
//!
//! ```
//! use motion_chart_rs::{ChartConfig, ChartEngine, DataPoint, Dataset, SvgRenderer, Viewport};
//!
//! # fn main() -> motion_chart_rs::ChartResult<()> {
//! let dataset = Dataset::new(vec![
//!     DataPoint::new("Beirut", 2000, 9500.0),
//!     DataPoint::new("Tripoli", 2000, 4200.0),
//!     DataPoint::new("Beirut", 2001, 9900.0),
//! ]);
//! let config = ChartConfig::bar_race("Population").with_top_n(5);
//! let mut engine = ChartEngine::new(SvgRenderer::new(), config, dataset)?;
//! engine.mount(Viewport::new(640.0, 400.0), 0)?;
//! engine.advance_to(2001, 1_000)?;
//! let svg = engine.renderer_mut().document()?;
//! assert!(svg.contains("<svg"));
//! # Ok(())
//! # }
//! ```

pub mod animate;
pub mod api;
pub mod core;
pub mod error;
pub mod reconcile;
pub mod render;
pub mod telemetry;

pub use animate::DriverPhase;
pub use api::{
    AxisBounds, ChartConfig, ChartEngine, ChartKind, EngineSnapshot, RESIZE_DEBOUNCE_MS,
    TickPolicy,
};
pub use crate::core::{DataPoint, Dataset, FrameKey, Margins, PointStyle, TimestampMs, Viewport};
pub use error::{ChartError, ChartResult};
pub use reconcile::{
    AxisRole, AxisUpdate, Easing, EnterOp, ExitOp, FramePlan, NodeShape, Orientation, RenderState,
    ResolvedStyle, Tick, UpdateOp,
};
pub use render::{RecordingRenderer, Renderer, SvgRenderStats, SvgRenderer};
