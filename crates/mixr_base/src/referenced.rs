//! Intrusive reference counting
//!
//! Every [`ObjectBase`](crate::ObjectBase) carries a [`RefCount`]. It starts
//! at one ("pre-referenced"): that first reference belongs to the `Arc`
//! handle the object was created into. Every change happens under a scoped
//! lock.

use parking_lot::Mutex;

use crate::error::{ObjectError, ObjectResult};

/// Lock-guarded reference count, initialized to one.
///
/// Cloning a `RefCount` never copies the count: the clone is a new header
/// starting at one, matching the semantics of copying the owning object.
#[derive(Debug)]
pub struct RefCount {
    count: Mutex<i32>,
}

impl RefCount {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(1),
        }
    }

    /// Increment the count, returning the new value.
    ///
    /// Fails with [`ObjectError::InvalidRefCount`] if the count was already at
    /// or below zero; the count is left untouched in that case.
    pub fn increment(&self) -> ObjectResult<i32> {
        let mut count = self.count.lock();
        if *count <= 0 {
            return Err(ObjectError::InvalidRefCount(*count));
        }
        *count += 1;
        Ok(*count)
    }

    /// Decrement the count, returning the new value.
    pub fn decrement(&self) -> ObjectResult<i32> {
        let mut count = self.count.lock();
        if *count <= 0 {
            return Err(ObjectError::InvalidRefCount(*count));
        }
        *count -= 1;
        Ok(*count)
    }

    /// Snapshot of the current count, for diagnostics only.
    pub fn get(&self) -> i32 {
        *self.count.lock()
    }

    /// Check performed when the owning object is dropped.
    ///
    /// The construction reference belongs to the handle being dropped, so
    /// only references taken with `increment` and never released count as
    /// outstanding.
    pub fn check_release(&self) -> ObjectResult<()> {
        match self.get() {
            n if n > 1 => Err(ObjectError::InvalidRefCountAtDelete(n)),
            _ => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn corrupt(&self, value: i32) {
        *self.count.lock() = value;
    }
}

impl Default for RefCount {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RefCount {
    fn clone(&self) -> Self {
        Self::new()
    }
}
