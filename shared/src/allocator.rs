//! Process-wide sequence allocators for entity identities and container lock
//! tokens.
//!
//! Each allocator is a single atomic counter advanced with a compare-and-swap,
//! so concurrent callers always receive distinct values and the order values
//! are handed out in is the order they compare in. `u64::MAX` is never handed
//! out; a counter resting there is exhausted and stays exhausted.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{EntityId, LockToken};

static ENTITY_IDS: SequenceAllocator = SequenceAllocator::new(1);
static LOCK_TOKENS: SequenceAllocator = SequenceAllocator::new(1);

// SequenceAllocator
pub struct SequenceAllocator {
    next: AtomicU64,
}

impl SequenceAllocator {
    pub const fn new(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Returns a value no other caller of this allocator has received or will
    /// receive, larger than every value returned before it.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is exhausted.
    pub fn allocate(&self) -> u64 {
        match self.try_allocate() {
            Some(value) => value,
            None => panic!("SequenceAllocator exhausted!"),
        }
    }

    /// Like [`allocate`](Self::allocate), but returns `None` once the
    /// sequence is exhausted. The counter never wraps.
    pub fn try_allocate(&self) -> Option<u64> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| next.checked_add(1))
            .ok()
    }

    /// Advances the allocator so that `value` is never handed out again.
    /// Used when identities are restored from outside the running process.
    pub fn observe(&self, value: u64) {
        self.next
            .fetch_max(value.saturating_add(1), Ordering::SeqCst);
    }

    /// The value the next call to `allocate` would return, if uncontended.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

pub fn next_entity_id() -> EntityId {
    EntityId::from_raw(ENTITY_IDS.allocate())
}

/// Reserves a restored identity so freshly created entities never collide
/// with it.
pub fn observe_entity_id(id: EntityId) {
    ENTITY_IDS.observe(id.raw());
}

pub fn next_lock_token() -> LockToken {
    LockToken::from_raw(LOCK_TOKENS.allocate())
}
