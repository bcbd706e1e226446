// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lease-based merging of the platform and raster threads.
//!
//! Native view operations may only run on the platform thread, while the
//! frame is drawn on the raster thread. When a frame contains native views,
//! the host runs both task queues on the platform thread for a bounded
//! number of frame cycles (the *lease*) so that drawing and native display
//! calls can be issued together.
//!
//! [`ThreadMerger`] is the shared state machine behind that arrangement:
//!
//! ```text
//!            merge_with_lease(n)
//!   Split ─────────────────────────► Merged { lease: n }
//!     ▲                                 │ decrement_lease()
//!     └──────── lease reaches 0 ────────┘ extend_lease_to(m), m > lease
//! ```
//!
//! It is shared between threads (typically behind an `Arc`); every
//! transition happens under one lock, so concurrent callers observe a
//! single consistent lease.

use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};

/// Lease granted when threads merge for a frame with native views.
pub const DEFAULT_MERGED_LEASE_FRAMES: u32 = 10;

/// Whether the two threads are merged, and for how long.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeState {
    /// Each thread runs its own queue.
    Split,
    /// The raster queue runs on the platform thread.
    Merged {
        /// Remaining frame cycles. Never zero.
        lease: u32,
    },
}

/// Outcome of a lease operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeaseStatus {
    /// The threads were split before and after the call.
    Split,
    /// The threads became merged.
    MergedNow,
    /// The threads were merged before and after the call.
    RemainsMerged,
    /// The lease ran out and the threads split.
    SplitNow,
}

impl LeaseStatus {
    /// Returns `true` if the threads are merged after the operation.
    #[inline]
    #[must_use]
    pub const fn is_merged(self) -> bool {
        matches!(self, Self::MergedNow | Self::RemainsMerged)
    }
}

/// Shared merge state between a platform thread and a raster thread.
pub struct ThreadMerger {
    platform: ThreadId,
    raster: ThreadId,
    state: Mutex<MergeState>,
}

impl core::fmt::Debug for ThreadMerger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThreadMerger")
            .field("platform", &self.platform)
            .field("raster", &self.raster)
            .field("state", &self.state())
            .finish()
    }
}

impl ThreadMerger {
    /// Creates a split merger for the given threads.
    #[must_use]
    pub fn new(platform: ThreadId, raster: ThreadId) -> Self {
        Self {
            platform,
            raster,
            state: Mutex::new(MergeState::Split),
        }
    }

    /// Creates a split merger whose platform thread is the calling thread.
    #[must_use]
    pub fn with_current_as_platform(raster: ThreadId) -> Self {
        Self::new(thread::current().id(), raster)
    }

    /// Creates a split merger whose raster thread is the calling thread.
    #[must_use]
    pub fn with_current_as_raster(platform: ThreadId) -> Self {
        Self::new(platform, thread::current().id())
    }

    /// Platform thread id.
    #[inline]
    #[must_use]
    pub fn platform_thread(&self) -> ThreadId {
        self.platform
    }

    /// Raster thread id.
    #[inline]
    #[must_use]
    pub fn raster_thread(&self) -> ThreadId {
        self.raster
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> MergeState {
        *self.lock()
    }

    /// Returns `true` while merged.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        matches!(self.state(), MergeState::Merged { .. })
    }

    /// Remaining lease, or `0` when split.
    #[must_use]
    pub fn lease_remaining(&self) -> u32 {
        match self.state() {
            MergeState::Split => 0,
            MergeState::Merged { lease } => lease,
        }
    }

    /// Merges the threads for `frames` cycles.
    ///
    /// When already merged, the lease is reset to `frames` instead of being
    /// added to. A zero lease is ignored.
    pub fn merge_with_lease(&self, frames: u32) -> LeaseStatus {
        let mut state = self.lock();
        let was_merged = matches!(*state, MergeState::Merged { .. });
        if frames == 0 {
            return if was_merged {
                LeaseStatus::RemainsMerged
            } else {
                LeaseStatus::Split
            };
        }
        *state = MergeState::Merged { lease: frames };
        if was_merged {
            LeaseStatus::RemainsMerged
        } else {
            LeaseStatus::MergedNow
        }
    }

    /// Raises the lease to `frames` if merged and the lease is shorter.
    ///
    /// Does nothing while split.
    pub fn extend_lease_to(&self, frames: u32) -> LeaseStatus {
        let mut state = self.lock();
        match &mut *state {
            MergeState::Split => LeaseStatus::Split,
            MergeState::Merged { lease } => {
                if frames > *lease {
                    *lease = frames;
                }
                LeaseStatus::RemainsMerged
            }
        }
    }

    /// Consumes one cycle of the lease; splits when it reaches zero.
    ///
    /// Does nothing while split.
    pub fn decrement_lease(&self) -> LeaseStatus {
        let mut state = self.lock();
        match *state {
            MergeState::Split => LeaseStatus::Split,
            MergeState::Merged { lease } if lease <= 1 => {
                *state = MergeState::Split;
                LeaseStatus::SplitNow
            }
            MergeState::Merged { lease } => {
                *state = MergeState::Merged { lease: lease - 1 };
                LeaseStatus::RemainsMerged
            }
        }
    }

    /// Splits immediately, dropping any remaining lease.
    pub fn split_now(&self) -> LeaseStatus {
        let mut state = self.lock();
        match core::mem::replace(&mut *state, MergeState::Split) {
            MergeState::Split => LeaseStatus::Split,
            MergeState::Merged { .. } => LeaseStatus::SplitNow,
        }
    }

    /// Returns `true` on the platform thread.
    #[must_use]
    pub fn is_on_platform_thread(&self) -> bool {
        thread::current().id() == self.platform
    }

    /// Returns `true` on the thread currently running raster work: the
    /// raster thread while split, the platform thread while merged.
    #[must_use]
    pub fn is_on_raster_thread(&self) -> bool {
        let current = thread::current().id();
        if self.is_merged() {
            current == self.platform
        } else {
            current == self.raster
        }
    }

    /// Returns `true` when native view calls are allowed from the calling
    /// thread.
    ///
    /// That is the case on the platform thread, and anywhere while merged:
    /// the raster work then executes on the platform thread.
    #[must_use]
    pub fn has_platform_privileges(&self) -> bool {
        self.is_on_platform_thread() || self.is_merged()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MergeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
