//! Stacking-order allocation.
//!
//! One allocator is shared by everything that can bring a node to the
//! front. It is passed into [`Canvas::new`](crate::Canvas::new) rather than
//! living in a global, so separate canvases (and tests) do not interfere.

use std::sync::atomic::{AtomicU32, Ordering};

/// Issues strictly increasing stacking-order values, starting at 1 and
/// holding at `u32::MAX`.
#[derive(Debug, Default)]
pub struct ZOrderAllocator {
    current: AtomicU32,
}

impl ZOrderAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next value. Safe to call from several threads.
    ///
    /// Saturates at `u32::MAX` instead of wrapping back under older values.
    pub fn next(&self) -> u32 {
        let prev = self
            .current
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |z| Some(z.saturating_add(1)))
            .unwrap_or_else(|z| z);
        prev.saturating_add(1)
    }

    /// The most recently issued value (0 if none yet).
    pub fn current(&self) -> u32 {
        self.current.load(Ordering::Relaxed)
    }
}
