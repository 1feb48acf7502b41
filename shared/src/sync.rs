use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// Attribute lists and location slots hold only `Arc`/`Weak` values, which stay
// structurally valid even if a writer panicked mid-update.

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
