//! Central task scheduler
//!
//! Timed behavior is recorded as explicit task entries and released by one
//! scheduler pass per frame, so ordering and cancellation stay deterministic
//! and testable without real delays. Due entries are returned to the caller
//! for dispatch; the scheduler itself never touches game state.
//!
//! Ordering: entries fire in due-time order; entries due at the same time
//! fire FIFO by registration. Interval entries fire once per elapsed
//! interval, so a long `advance` catches up instead of dropping pulses.

use serde::{Deserialize, Serialize};

/// Handle to a scheduled task, used for cancellation.
///
/// Cancelling is idempotent and safe on a handle whose one-shot already
/// fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TaskHandle,
    due_at_ms: f64,
    /// Repeat interval; `None` for one-shots
    interval_ms: Option<f32>,
    task: T,
}

/// Deterministic scheduler over task values of type `T`
#[derive(Debug, Clone)]
pub struct Clock<T> {
    now_ms: f64,
    next_handle: u64,
    entries: Vec<Entry<T>>,
}

impl<T: Clone> Clock<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_handle: 1,
            entries: Vec::new(),
        }
    }

    /// Simulated time advanced so far
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule `task` to fire once, `delay_ms` from now
    pub fn after(&mut self, delay_ms: f32, task: T) -> TaskHandle {
        self.push(delay_ms.max(0.0), None, task)
    }

    /// Schedule `task` to fire every `interval_ms`, first firing one
    /// interval from now
    pub fn every(&mut self, interval_ms: f32, task: T) -> TaskHandle {
        let interval = interval_ms.max(1.0);
        self.push(interval, Some(interval), task)
    }

    fn push(&mut self, delay_ms: f32, interval_ms: Option<f32>, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            due_at_ms: self.now_ms + f64::from(delay_ms),
            interval_ms,
            task,
        });
        handle
    }

    /// Remove a pending task. Idempotent; a handle that already fired is
    /// silently ignored.
    pub fn cancel(&mut self, handle: TaskHandle) {
        self.entries.retain(|e| e.handle != handle);
    }

    /// Whether the handle still refers to a pending entry
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Advance simulated time and collect every task due within the window,
    /// in firing order. The caller dispatches them afterwards, which keeps
    /// dispatch free to schedule or cancel further tasks.
    pub fn advance(&mut self, dt_ms: f32) -> Vec<T> {
        self.now_ms += f64::from(dt_ms.max(0.0));
        let mut due = Vec::new();

        loop {
            // Earliest due entry; registration order (handle id) breaks ties.
            let next = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.due_at_ms <= self.now_ms)
                .min_by(|(_, a), (_, b)| {
                    a.due_at_ms
                        .total_cmp(&b.due_at_ms)
                        .then(a.handle.0.cmp(&b.handle.0))
                })
                .map(|(i, _)| i);

            let Some(idx) = next else { break };
            due.push(self.entries[idx].task.clone());
            match self.entries[idx].interval_ms {
                Some(interval) => self.entries[idx].due_at_ms += f64::from(interval),
                None => {
                    self.entries.swap_remove(idx);
                }
            }
        }

        due
    }
}

impl<T: Clone> Default for Clock<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_delay_order() {
        let mut clock: Clock<&str> = Clock::new();
        clock.after(200.0, "late");
        clock.after(100.0, "early");
        assert_eq!(clock.advance(250.0), vec!["early", "late"]);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_same_tick_ties_fire_fifo() {
        let mut clock: Clock<u32> = Clock::new();
        clock.after(100.0, 1);
        clock.after(100.0, 2);
        clock.after(100.0, 3);
        assert_eq!(clock.advance(100.0), vec![1, 2, 3]);
    }

    #[test]
    fn test_nothing_fires_early() {
        let mut clock: Clock<u32> = Clock::new();
        let handle = clock.after(100.0, 7);
        assert!(clock.advance(99.0).is_empty());
        assert!(clock.is_scheduled(handle));
        assert_eq!(clock.advance(1.0), vec![7]);
        assert!(!clock.is_scheduled(handle));
    }

    #[test]
    fn test_cancel_is_idempotent_and_safe_after_fire() {
        let mut clock: Clock<u32> = Clock::new();
        let a = clock.after(50.0, 1);
        let b = clock.after(50.0, 2);
        clock.cancel(a);
        clock.cancel(a);
        assert_eq!(clock.advance(100.0), vec![2]);
        // b already fired; cancelling it again is a no-op
        clock.cancel(b);
        assert!(clock.advance(100.0).is_empty());
    }

    #[test]
    fn test_interval_catches_up_within_one_advance() {
        let mut clock: Clock<&str> = Clock::new();
        clock.every(50.0, "pulse");
        assert_eq!(clock.advance(200.0).len(), 4);
        // Still scheduled, keeps pulsing
        assert_eq!(clock.advance(50.0).len(), 1);
    }

    #[test]
    fn test_interval_cancel_stops_firing() {
        let mut clock: Clock<u32> = Clock::new();
        let h = clock.every(50.0, 9);
        assert_eq!(clock.advance(50.0), vec![9]);
        clock.cancel(h);
        assert!(clock.advance(500.0).is_empty());
    }

    #[test]
    fn test_interval_and_one_shot_interleave_by_due_time() {
        let mut clock: Clock<&str> = Clock::new();
        clock.every(60.0, "pulse");
        clock.after(90.0, "shot");
        assert_eq!(clock.advance(180.0), vec!["pulse", "shot", "pulse", "pulse"]);
    }

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let mut clock: Clock<u32> = Clock::new();
        clock.after(0.0, 1);
        assert_eq!(clock.advance(0.0), vec![1]);
    }
}
