//! Identifiers for signals and the slots they own.
//!
//! Slot keys are generational arena keys, so a key that outlives its slot
//! never aliases a slot inserted later into the same signal. Keys from two
//! different signals can compare equal, which is why every cross-reference
//! pairs a [`SlotKey`] with the [`SignalId`] of its owner.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

slotmap::new_key_type! {
    /// Key of one slot inside its owning signal's arena.
    pub struct SlotKey;
}

/// Unique identifier for a signal.
///
/// Each signal gets a fresh ID when it is created, including signals produced
/// by `Clone`, which start out disconnected and are distinct event sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(u64);

impl SignalId {
    /// Generate a new unique signal ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SignalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signal#{}", self.0)
    }
}
