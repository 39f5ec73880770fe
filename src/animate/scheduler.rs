use crate::core::types::{FrameKey, TimestampMs};

/// Work a scheduled timer carries.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TimerTask {
    AdvanceFrame { target: FrameKey },
    FinalizeExits { keys: Vec<String> },
    ApplyResize { width: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Scheduled {
    pub due_at: TimestampMs,
    /// Engine generation at scheduling time; the engine discards entries
    /// whose generation has moved on by the time they fire.
    pub generation: u64,
    pub task: TimerTask,
}

/// Deterministic timer queue. The host polls `next_deadline` and calls back
/// into the engine once it passes; equal deadlines fire in scheduling order.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    entries: Vec<Scheduled>,
}

impl TimerQueue {
    pub fn schedule(&mut self, due_at: TimestampMs, generation: u64, task: TimerTask) {
        self.entries.push(Scheduled {
            due_at,
            generation,
            task,
        });
    }

    pub fn next_deadline(&self) -> Option<TimestampMs> {
        self.entries.iter().map(|entry| entry.due_at).min()
    }

    /// Removes and returns the earliest entry due at or before `now`.
    pub fn pop_due(&mut self, now: TimestampMs) -> Option<Scheduled> {
        let mut best: Option<usize> = None;
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.due_at > now {
                continue;
            }
            match best {
                Some(current) if self.entries[current].due_at <= entry.due_at => {}
                _ => best = Some(index),
            }
        }
        best.map(|index| self.entries.remove(index))
    }

    /// Drops entries whose task matches; returns how many were removed.
    pub fn remove_matching(&mut self, predicate: impl Fn(&TimerTask) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(&entry.task));
        before - self.entries.len()
    }

    pub fn any_matching(&self, predicate: impl Fn(&TimerTask) -> bool) -> bool {
        self.entries.iter().any(|entry| predicate(&entry.task))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
