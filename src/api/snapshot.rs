use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{FrameKey, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::reconcile::{CommittedDomains, CommittedEntry};
use crate::render::Renderer;

use super::engine::ChartEngine;

/// Serializable deterministic state snapshot used by regression tests and
/// debugging tooling. Captures the committed render state only; pending
/// timers and clock-derived phase are deliberately excluded so equal frames
/// snapshot equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub frame: FrameKey,
    pub viewport: Viewport,
    pub entries: IndexMap<String, CommittedEntry>,
    pub domains: CommittedDomains,
}

impl<R: Renderer> ChartEngine<R> {
    /// Builds a deterministic snapshot of the committed render state.
    pub fn snapshot(&self) -> ChartResult<EngineSnapshot> {
        let state = self.state.as_ref().ok_or(ChartError::NotMounted)?;
        Ok(EngineSnapshot {
            frame: state.frame,
            viewport: state.viewport,
            entries: state.entries.clone(),
            domains: state.domains,
        })
    }

    /// Serializes the snapshot as pretty JSON for fixture-based regression
    /// checks.
    pub fn snapshot_json_pretty(&self) -> ChartResult<String> {
        let snapshot = self.snapshot()?;
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }
}
