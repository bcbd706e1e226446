// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinator configuration.

use crate::merger::DEFAULT_MERGED_LEASE_FRAMES;

/// Configuration for the [`FrameCoordinator`](crate::embedder::FrameCoordinator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmbedderConfig {
    /// Lease, in frame cycles, granted when the platform and raster threads
    /// merge, and restored each frame that still has views.
    pub merged_lease_frames: u32,
    /// Largest number of overlay regions kept per view and query. Above it
    /// the regions are joined into their union. `usize::MAX` disables the
    /// cap.
    pub max_overlays_per_view: usize,
    /// Round overlay regions outward to whole pixels.
    pub round_out_overlays: bool,
}

impl EmbedderConfig {
    /// Mobile defaults: ten-frame lease, at most two overlays per view query.
    #[must_use]
    pub const fn android() -> Self {
        Self {
            merged_lease_frames: DEFAULT_MERGED_LEASE_FRAMES,
            max_overlays_per_view: 2,
            round_out_overlays: true,
        }
    }

    /// Exact regions: no overlay cap. Each drawn cluster gets its own overlay.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_overlays_per_view: usize::MAX,
            ..Self::android()
        }
    }
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self::android()
    }
}
