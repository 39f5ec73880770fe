mod recording;
mod svg;

pub use recording::RecordingRenderer;
pub use svg::{SvgRenderStats, SvgRenderer};

use crate::error::ChartResult;
use crate::reconcile::FramePlan;

/// Contract implemented by any rendering backend.
///
/// Backends receive fully materialized, deterministic `FramePlan`s: target
/// poses, durations and the linear easing curve. How attributes tween between
/// poses is backend territory; the engine never drives interpolation.
pub trait Renderer {
    /// Applies one reconciled plan: axis/grid updates plus keyed
    /// enter/update/exit transitions.
    fn apply(&mut self, plan: &FramePlan) -> ChartResult<()>;

    /// Physically removes exited nodes once their fade-out window elapsed.
    /// Keys that re-entered since the exit was planned are not passed here.
    fn finalize_exits(&mut self, keys: &[String]) -> ChartResult<()>;

    /// Tears the scene down ahead of a full rebuild (resize path).
    fn clear(&mut self) -> ChartResult<()>;
}
