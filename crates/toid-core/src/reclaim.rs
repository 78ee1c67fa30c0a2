//! Control-side reclamation of values the audio thread may still hold.
//!
//! Anything published through `ArcSwap` can outlive its replacement inside a
//! render call. If that render call held the last reference, the drop (and
//! the free) would run on the audio thread. [`Retired`] keeps one reference
//! to every replaced value and only lets go of it from the control side,
//! once nobody else holds it.

use parking_lot::Mutex;
use std::sync::Arc;

/// Holding area for replaced values.
pub struct Retired<T: ?Sized> {
    held: Mutex<Vec<Arc<T>>>,
}

impl<T: ?Sized> Default for Retired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Retired<T> {
    pub fn new() -> Self {
        Self {
            held: Mutex::new(Vec::new()),
        }
    }

    /// Take over `old` and free whatever is no longer shared.
    pub fn retire(&self, old: Arc<T>) {
        let mut held = self.held.lock();
        held.push(old);
        held.retain(|value| Arc::strong_count(value) > 1);
    }

    /// Free everything no longer shared. Returns how many are still held.
    pub fn collect(&self) -> usize {
        let mut held = self.held.lock();
        held.retain(|value| Arc::strong_count(value) > 1);
        held.len()
    }

    pub fn len(&self) -> usize {
        self.held.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.lock().is_empty()
    }
}

impl<T: ?Sized> std::fmt::Debug for Retired<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retired").field("held", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unshared_value_is_freed_immediately() {
        let retired = Retired::new();
        retired.retire(Arc::new(1));
        assert!(retired.is_empty());
    }

    #[test]
    fn test_shared_value_waits_for_last_reader() {
        let retired = Retired::new();
        let reader = Arc::new(String::from("version"));
        retired.retire(Arc::clone(&reader));
        assert_eq!(retired.len(), 1);

        drop(reader);
        // The reader let go, but the free happens here, not in its drop.
        assert_eq!(retired.len(), 1);
        assert_eq!(retired.collect(), 0);
    }
}
