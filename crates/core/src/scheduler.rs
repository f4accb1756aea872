//! Redraw batching and debouncing.
//!
//! Hosts drive both types with their own clock and frame callbacks; nothing
//! here spawns timers, which keeps the behavior deterministic under test.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Fires once, `delay` after the most recent trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)start the window; earlier triggers are superseded.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True exactly once when the window has elapsed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Fire immediately if pending.
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

/// Which canvases a redraw pass must cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedrawScope {
    All,
    Timelines(BTreeSet<usize>),
}

impl RedrawScope {
    pub fn timeline(index: usize) -> Self {
        RedrawScope::Timelines(BTreeSet::from([index]))
    }

    /// Union of two scopes; `All` absorbs everything.
    pub fn merge(self, other: RedrawScope) -> RedrawScope {
        match (self, other) {
            (RedrawScope::All, _) | (_, RedrawScope::All) => RedrawScope::All,
            (RedrawScope::Timelines(mut a), RedrawScope::Timelines(b)) => {
                a.extend(b);
                RedrawScope::Timelines(a)
            }
        }
    }

    pub fn covers(&self, index: usize) -> bool {
        match self {
            RedrawScope::All => true,
            RedrawScope::Timelines(set) => set.contains(&index),
        }
    }
}

/// Opaque handle for a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Coalesce onto the next frame callback.
    #[default]
    Batched,
    /// Hand the scope back from `schedule` right away.
    Synchronous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheduled {
    /// Host should request an animation frame and call `on_frame` with this id.
    Frame(FrameId),
    /// Redraw now.
    Now(RedrawScope),
}

/// Coalesces redraw requests onto a single pending frame.
///
/// Each `schedule` supersedes the previously requested frame: its scope is
/// merged into the new one and callbacks for the old id are ignored.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    mode: FlushMode,
    pending: Option<RedrawScope>,
    latest: u64,
}

impl FrameScheduler {
    pub fn new(mode: FlushMode) -> Self {
        Self {
            mode,
            pending: None,
            latest: 0,
        }
    }

    pub fn mode(&self) -> FlushMode {
        self.mode
    }

    pub fn schedule(&mut self, scope: RedrawScope) -> Scheduled {
        let merged = match self.pending.take() {
            Some(prev) => prev.merge(scope),
            None => scope,
        };
        match self.mode {
            FlushMode::Synchronous => Scheduled::Now(merged),
            FlushMode::Batched => {
                self.pending = Some(merged);
                self.latest += 1;
                Scheduled::Frame(FrameId(self.latest))
            }
        }
    }

    /// Frame callback. Only the most recently issued frame yields work.
    pub fn on_frame(&mut self, frame: FrameId) -> Option<RedrawScope> {
        if frame.0 != self.latest {
            return None;
        }
        self.pending.take()
    }

    /// Take whatever is pending, regardless of frames.
    pub fn flush(&mut self) -> Option<RedrawScope> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&RedrawScope> {
        self.pending.as_ref()
    }

    pub fn is_global_pending(&self) -> bool {
        matches!(self.pending, Some(RedrawScope::All))
    }
}
