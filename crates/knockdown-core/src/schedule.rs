//! Frame-based delayed tasks.
//!
//! Delays are counted in simulation frames, so a paused or headless session
//! sees the same ordering as a live one. Loading a level cancels everything
//! still pending.

/// A task waiting for its frame.
#[derive(Debug, Clone, PartialEq)]
struct Pending<T> {
    due: u64,
    seq: u64,
    task: T,
}

/// Queue of tasks keyed by the frame they become due.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    pending: Vec<Pending<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` to run `delay` frames after `now`.
    pub fn schedule(&mut self, now: u64, delay: u64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due: now.saturating_add(delay),
            seq,
            task,
        });
    }

    /// Removes and returns every task due at or before `now`, ordered by due
    /// frame and then by scheduling order.
    pub fn drain_due(&mut self, now: u64) -> Vec<T> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|p| p.due <= now);
        self.pending = rest;
        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.task).collect()
    }

    /// Drops every pending task. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
