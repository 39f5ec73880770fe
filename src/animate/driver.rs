use crate::core::types::TimestampMs;

/// Observable animation phase, derived from the host clock rather than held
/// as mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    /// Nothing drawn yet (before mount, or after disposal).
    Idle,
    /// A reconciliation was applied and its transition window is still open.
    Transitioning,
    /// The last applied frame has settled.
    Settled,
}

/// Sequencing state for one chart instance: when the last plan was applied
/// and whether the autoplay chain is armed.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AnimationDriver {
    autoplay: bool,
    last_apply: Option<(TimestampMs, u64)>,
}

impl AnimationDriver {
    pub fn new(autoplay: bool) -> Self {
        Self {
            autoplay,
            last_apply: None,
        }
    }

    pub fn mark_applied(&mut self, now: TimestampMs, settle_ms: u64) {
        self.last_apply = Some((now, settle_ms));
    }

    pub fn phase(&self, now: TimestampMs) -> DriverPhase {
        match self.last_apply {
            None => DriverPhase::Idle,
            Some((applied_at, settle_ms)) if now < applied_at.saturating_add(settle_ms) => {
                DriverPhase::Transitioning
            }
            Some(_) => DriverPhase::Settled,
        }
    }

    pub fn autoplay_enabled(&self) -> bool {
        self.autoplay
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        self.autoplay = enabled;
    }

    pub fn reset(&mut self) {
        self.last_apply = None;
    }
}
