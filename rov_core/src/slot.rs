// rov_core/src/slot.rs

use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug)]
struct Stamped<T> {
    sequence: u64,
    value: Option<T>,
}

/// A single "latest value" cell shared between an I/O writer and the control loop.
///
/// Last write wins, nothing is queued. A writer holds the lock only for the value
/// replacement; the reader clones the current value and never waits for a fresher one.
#[derive(Debug)]
pub struct LatestSlot<T> {
    inner: Arc<Mutex<Stamped<T>>>,
}

impl<T> Clone for LatestSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Stamped {
                sequence: 0,
                value: None,
            })),
        }
    }
}

impl<T: Clone> LatestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored value wholesale.
    pub fn publish(&self, value: T) {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        slot.sequence += 1;
        slot.value = Some(value);
    }

    /// The current value, if anything was ever published.
    pub fn latest(&self) -> Option<T> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .value
            .clone()
    }

    /// The current value with the number of writes so far.
    pub fn latest_with_sequence(&self) -> (u64, Option<T>) {
        let slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        (slot.sequence, slot.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn empty_until_first_publish() {
        let slot: LatestSlot<u32> = LatestSlot::new();
        assert_eq!(slot.latest(), None);
        assert_eq!(slot.latest_with_sequence().0, 0);
    }

    #[test]
    fn last_write_wins() {
        let slot = LatestSlot::new();
        slot.publish(1);
        slot.publish(2);
        slot.publish(3);
        assert_eq!(slot.latest(), Some(3));
        assert_eq!(slot.latest_with_sequence(), (3, Some(3)));
    }

    #[test]
    fn writers_on_other_threads_replace_whole_values() {
        let slot = LatestSlot::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let writer = slot.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        writer.publish([i; 6]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let (sequence, value) = slot.latest_with_sequence();
        assert_eq!(sequence, 400);
        let value = value.unwrap();
        assert!(value.iter().all(|v| *v == value[0]));
    }
}
