use crate::error::ChartResult;
use crate::reconcile::FramePlan;
use crate::render::Renderer;

/// Headless backend for tests: retains every applied plan, removal batch and
/// clear so suites can assert on the exact operations the engine emitted.
///
/// Plans are validated on apply so invalid geometry fails at the seam.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub plans: Vec<FramePlan>,
    pub finalized: Vec<Vec<String>>,
    pub clears: usize,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last_plan(&self) -> Option<&FramePlan> {
        self.plans.last()
    }

    /// All keys removed so far, in removal order.
    #[must_use]
    pub fn removed_keys(&self) -> Vec<String> {
        self.finalized.iter().flatten().cloned().collect()
    }
}

impl Renderer for RecordingRenderer {
    fn apply(&mut self, plan: &FramePlan) -> ChartResult<()> {
        plan.validate()?;
        self.plans.push(plan.clone());
        Ok(())
    }

    fn finalize_exits(&mut self, keys: &[String]) -> ChartResult<()> {
        self.finalized.push(keys.to_vec());
        Ok(())
    }

    fn clear(&mut self) -> ChartResult<()> {
        self.clears += 1;
        Ok(())
    }
}
