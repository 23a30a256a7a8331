//! Per-module virtual clock for delayed and repeating effects.
//!
//! Each module activation owns one `Scheduler`. Clearing it (or dropping the
//! module) discards every pending task, so nothing fires against a module
//! that is no longer current.
use std::time::Duration;

/// Handle returned when a task is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TaskId,
    due: Duration,
    every: Option<Duration>,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once, `delay` from now.
    pub fn after(&mut self, delay: Duration, task: T) -> TaskId {
        self.push(delay, None, task)
    }

    /// Run `task` every `period`, first firing one period from now.
    ///
    /// # Panics
    ///
    /// Panics on a zero period, which would fire forever within one tick.
    pub fn every(&mut self, period: Duration, task: T) -> TaskId {
        assert!(!period.is_zero(), "repeating task needs a non-zero period");
        self.push(period, Some(period), task)
    }

    fn push(&mut self, delay: Duration, every: Option<Duration>, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: self.now + delay,
            every,
            task,
        });
        id
    }

    /// Cancel one task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Cancel every task matching `pred`, returning how many were dropped.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !pred(&entry.task));
        before - self.entries.len()
    }

    /// Drop every pending task, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pop the earliest task due at or before `deadline`.
    ///
    /// The clock moves to the task's due time before it is returned, so a
    /// task scheduled while handling this one is timed from the right
    /// instant and can still come due before `deadline`. Ties fire in
    /// scheduling order. Repeating tasks are re-armed.
    pub fn next_due(&mut self, deadline: Duration) -> Option<T> {
        let position = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= deadline)
            .min_by_key(|(_, entry)| (entry.due, entry.id))
            .map(|(idx, _)| idx)?;
        let due = self.entries[position].due;
        self.now = self.now.max(due);
        match self.entries[position].every {
            Some(period) => {
                let entry = &mut self.entries[position];
                entry.due += period;
                Some(entry.task.clone())
            }
            None => Some(self.entries.remove(position).task),
        }
    }

    /// Move the clock to `deadline` once every due task has been popped.
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<T: Clone>(scheduler: &mut Scheduler<T>, dt: Duration) -> Vec<T> {
        let deadline = scheduler.now() + dt;
        let mut fired = Vec::new();
        while let Some(task) = scheduler.next_due(deadline) {
            fired.push(task);
        }
        scheduler.settle(deadline);
        fired
    }

    #[test]
    fn one_shot_fires_once_at_due_time() {
        let mut s = Scheduler::new();
        s.after(Duration::from_millis(500), "reveal");
        assert!(drain(&mut s, Duration::from_millis(499)).is_empty());
        assert_eq!(drain(&mut s, Duration::from_millis(1)), vec!["reveal"]);
        assert!(drain(&mut s, Duration::from_secs(10)).is_empty());
        assert!(s.is_idle());
    }

    #[test]
    fn repeating_task_fires_each_period() {
        let mut s = Scheduler::new();
        s.every(Duration::from_millis(100), 'x');
        assert_eq!(drain(&mut s, Duration::from_millis(350)).len(), 3);
        assert_eq!(s.now(), Duration::from_millis(350));
        assert_eq!(drain(&mut s, Duration::from_millis(50)).len(), 1);
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let mut s = Scheduler::new();
        s.after(Duration::from_millis(10), 1);
        s.after(Duration::from_millis(5), 0);
        s.after(Duration::from_millis(10), 2);
        assert_eq!(drain(&mut s, Duration::from_millis(10)), vec![0, 1, 2]);
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut s = Scheduler::new();
        let keep = s.after(Duration::from_millis(10), "keep");
        let gone = s.after(Duration::from_millis(10), "gone");
        assert!(s.cancel(gone));
        assert!(!s.cancel(gone));
        assert_eq!(drain(&mut s, Duration::from_millis(20)), vec!["keep"]);
        assert!(!s.cancel(keep));

        s.every(Duration::from_millis(1), "tick");
        s.after(Duration::from_millis(1), "once");
        assert_eq!(s.cancel_where(|task| *task == "tick"), 1);
        assert_eq!(s.clear(), 1);
        assert!(drain(&mut s, Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn tasks_scheduled_while_draining_use_fire_time() {
        let mut s = Scheduler::new();
        s.after(Duration::from_millis(100), 0_u8);
        let deadline = s.now() + Duration::from_millis(300);
        let first = s.next_due(deadline);
        assert_eq!(first, Some(0));
        assert_eq!(s.now(), Duration::from_millis(100));
        s.after(Duration::from_millis(150), 1);
        assert_eq!(s.next_due(deadline), Some(1));
        assert_eq!(s.now(), Duration::from_millis(250));
        assert_eq!(s.next_due(deadline), None);
    }
}
