//! Deferred tasks on a virtual clock.
//!
//! The session never sleeps: the frontend (or a test) advances the clock and
//! the queue hands back due tasks one at a time, in deadline order. Every
//! scheduled task gets a [`TaskHandle`] that can cancel it before it fires.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// Resolve the two face-up cards of game `generation`.
    EvaluateMatch { generation: u64 },
    /// One timer second for game `generation`.
    TimerTick { generation: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Default)]
pub struct TaskQueue {
    now: Duration,
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, task: Task) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((self.now + delay, seq), task);
        TaskHandle(seq)
    }

    /// Returns `true` if the task was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let key = self
            .pending
            .keys()
            .find(|(_, seq)| *seq == handle.0)
            .copied();
        match key {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.keys().any(|(_, seq)| *seq == handle.0)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pops the earliest task due at or before `until`, moving the clock to
    /// its deadline. Ties fire in scheduling order.
    pub fn pop_due(&mut self, until: Duration) -> Option<Task> {
        let (&(due, seq), _) = self.pending.first_key_value()?;
        if due > until {
            return None;
        }
        let task = self.pending.remove(&(due, seq))?;
        self.now = self.now.max(due);
        Some(task)
    }

    /// Moves the clock forward once no more tasks are due before `until`.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVAL: Task = Task::EvaluateMatch { generation: 1 };
    const TICK: Task = Task::TimerTick { generation: 1 };

    #[test]
    fn test_tasks_fire_in_deadline_order() {
        let mut queue = TaskQueue::new();
        queue.schedule(Duration::from_millis(1000), TICK);
        queue.schedule(Duration::from_millis(500), EVAL);

        let until = Duration::from_secs(2);
        assert_eq!(queue.pop_due(until), Some(EVAL));
        assert_eq!(queue.now(), Duration::from_millis(500));
        assert_eq!(queue.pop_due(until), Some(TICK));
        assert_eq!(queue.pop_due(until), None);
    }

    #[test]
    fn test_equal_deadlines_fire_fifo() {
        let mut queue = TaskQueue::new();
        queue.schedule(Duration::from_secs(1), TICK);
        queue.schedule(Duration::from_secs(1), EVAL);
        let until = Duration::from_secs(1);
        assert_eq!(queue.pop_due(until), Some(TICK));
        assert_eq!(queue.pop_due(until), Some(EVAL));
    }

    #[test]
    fn test_not_due_stays_pending() {
        let mut queue = TaskQueue::new();
        let handle = queue.schedule(Duration::from_secs(1), EVAL);
        assert_eq!(queue.pop_due(Duration::from_millis(999)), None);
        assert!(queue.is_pending(handle));
        queue.settle(Duration::from_millis(999));
        assert_eq!(queue.pop_due(Duration::from_secs(1)), Some(EVAL));
    }

    #[test]
    fn test_cancel() {
        let mut queue = TaskQueue::new();
        let handle = queue.schedule(Duration::from_secs(1), EVAL);
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert!(queue.is_empty());
        assert_eq!(queue.pop_due(Duration::from_secs(5)), None);
    }

    #[test]
    fn test_delay_is_relative_to_clock() {
        let mut queue = TaskQueue::new();
        queue.settle(Duration::from_secs(10));
        queue.schedule(Duration::from_secs(1), TICK);
        assert_eq!(queue.pop_due(Duration::from_secs(10)), None);
        assert_eq!(queue.pop_due(Duration::from_secs(11)), Some(TICK));
    }
}
