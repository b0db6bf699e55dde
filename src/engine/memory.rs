// src/engine/memory.rs
//
// Byte budget for pixel buffers.
//
// Every large allocation (decoded source, destination, convolution scratch)
// reserves its size first. A reservation is released when dropped, so an
// aborted resize gives back everything it took.

use crate::error::ScaleError;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

type MemoryResult<T> = std::result::Result<T, ScaleError>;

/// Byte counter with an optional upper bound.
///
/// Shared by reference; concurrent resizes (see `resize_batch`) charge the
/// same budget safely.
#[derive(Debug, Default)]
pub struct MemoryBudget {
    limit: Option<u64>,
    used: AtomicU64,
}

/// Bytes held against a `MemoryBudget` until dropped.
#[derive(Debug)]
#[must_use = "dropping a reservation releases it immediately"]
pub struct Reservation<'a> {
    budget: &'a MemoryBudget,
    bytes: u64,
}

impl MemoryBudget {
    /// No limit; usage is still tracked.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Reject any reservation that would push usage above `limit` bytes.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            used: AtomicU64::new(0),
        }
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Bytes currently reserved.
    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }

    /// Reserve `bytes` for `what`, failing if the limit would be exceeded.
    pub fn reserve(
        &self,
        bytes: u64,
        what: &'static str,
    ) -> MemoryResult<Reservation<'_>> {
        let outcome = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                let wanted = used.saturating_add(bytes);
                match self.limit {
                    Some(limit) if wanted > limit => None,
                    _ => Some(wanted),
                }
            });

        match outcome {
            Ok(before) => {
                debug!(what, bytes, total = before.saturating_add(bytes), "reserved");
                Ok(Reservation {
                    budget: self,
                    bytes,
                })
            }
            Err(used) => {
                let limit = self.limit.unwrap_or(u64::MAX);
                Err(ScaleError::memory_limit_exceeded(
                    what,
                    used.saturating_add(bytes),
                    limit,
                ))
            }
        }
    }

    /// Return bytes previously kept with [`Reservation::persist`].
    pub fn release(&self, bytes: u64) {
        // saturating so a double release cannot wrap the counter
        let (Ok(before) | Err(before)) =
            self.used
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                    Some(used.saturating_sub(bytes))
                });
        debug!(bytes, total = before.saturating_sub(bytes), "released");
    }
}

impl Reservation<'_> {
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Keep the bytes charged after this reservation goes away. The owner
    /// must hand them back with [`MemoryBudget::release`].
    pub fn persist(mut self) -> u64 {
        std::mem::take(&mut self.bytes)
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.bytes > 0 {
            self.budget.release(self.bytes);
        }
    }
}
