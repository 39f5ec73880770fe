//! Engine facade consumed by host applications.
//!
//! The engine owns the renderer, the canonical dataset, the committed render
//! state and a deterministic timer queue. It never spawns threads or reads a
//! wall clock: hosts feed it timestamps, poll [`ChartEngine::next_deadline`]
//! and call [`ChartEngine::run_due_timers`] once a deadline passes. Autoplay,
//! exit finalization and debounced resize relayout all run through that one
//! pump.

use tracing::{debug, trace};

use crate::animate::driver::{AnimationDriver, DriverPhase};
use crate::animate::scheduler::{TimerQueue, TimerTask};
use crate::api::config::ChartConfig;
use crate::api::variant::plan_frame;
use crate::core::dataset::Dataset;
use crate::core::types::{FrameKey, TimestampMs, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::reconcile::RenderState;
use crate::render::Renderer;

/// Window between a width notification and the relayout it triggers. Burst
/// notifications inside the window coalesce into one rebuild.
pub const RESIZE_DEBOUNCE_MS: u64 = 50;

/// Main orchestration facade for one chart instance.
///
/// Lifecycle: [`ChartEngine::new`] → [`ChartEngine::mount`] →
/// advances/resizes/timer pumps → [`ChartEngine::dispose`]. Configuration and
/// dataset are fixed at construction; a new chart means a new engine.
pub struct ChartEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) config: ChartConfig,
    pub(super) dataset: Dataset,
    pub(super) state: Option<RenderState>,
    pub(super) driver: AnimationDriver,
    pub(super) timers: TimerQueue,
    /// Bumped when pending timers must not outlive a lifecycle edge
    /// (disposal, resize rebuild). Exit finalizations are exempt.
    pub(super) generation: u64,
}

impl<R: Renderer> ChartEngine<R> {
    /// Creates an engine over a validated config and a non-empty dataset.
    pub fn new(renderer: R, config: ChartConfig, dataset: Dataset) -> ChartResult<Self> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(ChartError::InvalidData(
                "dataset has no usable points".to_owned(),
            ));
        }
        debug!(kind = ?config.kind, points = dataset.len(), "chart engine created");
        Ok(Self {
            driver: AnimationDriver::new(config.autoplay),
            renderer,
            config,
            dataset,
            state: None,
            timers: TimerQueue::default(),
            generation: 0,
        })
    }

    /// Mounts at the dataset's earliest frame and returns that frame key.
    pub fn mount(&mut self, viewport: Viewport, now: TimestampMs) -> ChartResult<FrameKey> {
        let first = self
            .dataset
            .min_frame_key()
            .ok_or_else(|| ChartError::InvalidData("dataset has no frames".to_owned()))?;
        self.mount_at(viewport, first, now)?;
        Ok(first)
    }

    /// Mounts at an explicit frame: axes draw in place and every node of the
    /// frame enters. If autoplay is enabled the advance chain arms here.
    pub fn mount_at(
        &mut self,
        viewport: Viewport,
        frame: FrameKey,
        now: TimestampMs,
    ) -> ChartResult<()> {
        if self.state.is_some() {
            return Err(ChartError::AlreadyMounted);
        }
        if !viewport.is_valid() {
            return Err(ChartError::LayoutUnavailable {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let basis = RenderState::initial(frame, viewport);
        let (next, plan) = plan_frame(&self.config, &self.dataset, viewport, &basis, frame, true);
        self.renderer.apply(&plan)?;
        self.driver.mark_applied(now, plan.settle_ms);
        self.state = Some(next);
        debug!(
            frame,
            width = viewport.width,
            height = viewport.height,
            "mounted"
        );
        self.arm_autoplay(now);
        Ok(())
    }

    /// Transitions to `frame`, reconciling by key: churn enters and exits,
    /// survivors tween. A manual advance supersedes any pending autoplay
    /// advance; the chain re-arms from this frame if autoplay stays enabled.
    pub fn advance_to(&mut self, frame: FrameKey, now: TimestampMs) -> ChartResult<()> {
        let viewport = self
            .state
            .as_ref()
            .map(|state| state.viewport)
            .ok_or(ChartError::NotMounted)?;
        let superseded = self
            .timers
            .remove_matching(|task| matches!(task, TimerTask::AdvanceFrame { .. }));
        if superseded > 0 {
            trace!(superseded, frame, "pending autoplay advance superseded");
        }
        self.apply_frame(frame, viewport, now, false)?;
        self.arm_autoplay(now);
        Ok(())
    }

    /// Records a measured container width. The relayout is debounced by
    /// [`RESIZE_DEBOUNCE_MS`]; only the last width notified inside the window
    /// is applied.
    pub fn notify_resize(&mut self, width: f64, now: TimestampMs) -> ChartResult<()> {
        if self.state.is_none() {
            return Err(ChartError::NotMounted);
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(ChartError::LayoutUnavailable {
                width,
                height: self.config.height,
            });
        }
        let coalesced = self
            .timers
            .remove_matching(|task| matches!(task, TimerTask::ApplyResize { .. }));
        if coalesced > 0 {
            trace!(coalesced, width, "resize notification coalesced");
        }
        self.timers.schedule(
            now + RESIZE_DEBOUNCE_MS,
            self.generation,
            TimerTask::ApplyResize { width },
        );
        Ok(())
    }

    /// Enables autoplay and arms the advance chain unless one is already
    /// pending or the dataset has no later frame.
    pub fn play(&mut self, now: TimestampMs) -> ChartResult<()> {
        if self.state.is_none() {
            return Err(ChartError::NotMounted);
        }
        self.driver.set_autoplay(true);
        self.arm_autoplay(now);
        Ok(())
    }

    /// Disables autoplay and drops any pending advance. Queued exit
    /// finalizations stay put so faded nodes still get removed.
    pub fn pause(&mut self) -> ChartResult<()> {
        if self.state.is_none() {
            return Err(ChartError::NotMounted);
        }
        self.driver.set_autoplay(false);
        let dropped = self
            .timers
            .remove_matching(|task| matches!(task, TimerTask::AdvanceFrame { .. }));
        debug!(dropped, "autoplay paused");
        Ok(())
    }

    /// Cancels every pending timer, clears the backend scene and returns the
    /// engine to the unmounted state. Disposing an unmounted engine is a
    /// no-op.
    pub fn dispose(&mut self) -> ChartResult<()> {
        self.generation += 1;
        self.timers.clear();
        self.driver.reset();
        if self.state.take().is_some() {
            self.renderer.clear()?;
            debug!("disposed");
        }
        Ok(())
    }

    /// Fires every timer due at or before `now`, earliest first with FIFO
    /// ties, and returns how many tasks ran. Tasks stamped with an older
    /// generation are discarded unfired; exit finalizations are exempt from
    /// that check so a lifecycle edge never leaks a faded node.
    pub fn run_due_timers(&mut self, now: TimestampMs) -> ChartResult<usize> {
        let mut fired = 0;
        while let Some(entry) = self.timers.pop_due(now) {
            let exempt = matches!(entry.task, TimerTask::FinalizeExits { .. });
            if !exempt && entry.generation != self.generation {
                trace!(due_at = entry.due_at, "stale timer discarded");
                continue;
            }
            match entry.task {
                TimerTask::AdvanceFrame { target } => {
                    let viewport = self
                        .state
                        .as_ref()
                        .map(|state| state.viewport)
                        .ok_or(ChartError::NotMounted)?;
                    self.apply_frame(target, viewport, now, false)?;
                    self.arm_autoplay(now);
                }
                TimerTask::FinalizeExits { keys } => self.finalize_exits(&keys)?,
                TimerTask::ApplyResize { width } => self.apply_resize(width, now)?,
            }
            fired += 1;
        }
        Ok(fired)
    }

    /// Earliest pending deadline, if any. Hosts sleep until it and then pump
    /// [`ChartEngine::run_due_timers`].
    #[must_use]
    pub fn next_deadline(&self) -> Option<TimestampMs> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn phase(&self, now: TimestampMs) -> DriverPhase {
        self.driver.phase(now)
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub fn current_frame(&self) -> Option<FrameKey> {
        self.state.as_ref().map(|state| state.frame)
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.state.as_ref().map(|state| state.viewport)
    }

    #[must_use]
    pub fn autoplay_enabled(&self) -> bool {
        self.driver.autoplay_enabled()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Plans and applies one frame, commits the new render state and queues
    /// the exit finalization for whatever faded out.
    fn apply_frame(
        &mut self,
        frame: FrameKey,
        viewport: Viewport,
        now: TimestampMs,
        rebuild: bool,
    ) -> ChartResult<()> {
        let state = self.state.as_ref().ok_or(ChartError::NotMounted)?;
        let (next, plan) = plan_frame(&self.config, &self.dataset, viewport, state, frame, rebuild);
        self.renderer.apply(&plan)?;
        if !plan.exits.is_empty() {
            let keys: Vec<String> = plan.exits.iter().map(|op| op.key.clone()).collect();
            self.timers.schedule(
                now + plan.settle_ms,
                self.generation,
                TimerTask::FinalizeExits { keys },
            );
        }
        self.driver.mark_applied(now, plan.settle_ms);
        self.state = Some(next);
        Ok(())
    }

    /// Rebuilds the scene at the current frame under the new width. An
    /// unchanged width is a no-op. Pending advances were scheduled against
    /// the old geometry; the generation bump retires them before the chain
    /// re-arms.
    fn apply_resize(&mut self, width: f64, now: TimestampMs) -> ChartResult<()> {
        let state = self.state.as_ref().ok_or(ChartError::NotMounted)?;
        let frame = state.frame;
        let viewport = Viewport::new(width, self.config.height);
        if viewport == state.viewport {
            debug!(width, "resize ignored, width unchanged");
            return Ok(());
        }
        self.generation += 1;
        let retired = self
            .timers
            .remove_matching(|task| matches!(task, TimerTask::AdvanceFrame { .. }));
        if retired > 0 {
            trace!(retired, "advance against the old geometry retired");
        }
        self.renderer.clear()?;
        self.apply_frame(frame, viewport, now, true)?;
        debug!(width, frame, "resize applied");
        self.arm_autoplay(now);
        Ok(())
    }

    /// Physically removes exited nodes whose fade window elapsed. Keys that
    /// re-entered since the exit was planned stay on screen.
    fn finalize_exits(&mut self, keys: &[String]) -> ChartResult<()> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let removable: Vec<String> = keys
            .iter()
            .filter(|key| !state.entries.contains_key(*key))
            .cloned()
            .collect();
        if removable.is_empty() {
            return Ok(());
        }
        trace!(removed = removable.len(), "exit removal finalized");
        self.renderer.finalize_exits(&removable)
    }

    /// Schedules the next autoplay advance one cadence out, unless autoplay
    /// is off, an advance is already pending, or the dataset ends here.
    fn arm_autoplay(&mut self, now: TimestampMs) {
        if !self.driver.autoplay_enabled() {
            return;
        }
        let Some(state) = &self.state else {
            return;
        };
        let Some(target) = self.dataset.next_frame_key(state.frame) else {
            trace!(frame = state.frame, "autoplay reached the final frame");
            return;
        };
        if self
            .timers
            .any_matching(|task| matches!(task, TimerTask::AdvanceFrame { .. }))
        {
            return;
        }
        let due_at = now + self.config.autoplay_cadence_ms();
        self.timers
            .schedule(due_at, self.generation, TimerTask::AdvanceFrame { target });
        trace!(target, due_at, "autoplay advance scheduled");
    }
}
