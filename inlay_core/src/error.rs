// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only two situations are reported as errors. Looking up a view that was
//! not registered in the current frame yields [`ViewLookupError`], and a
//! frame whose content could not be finalized, or was already handed over,
//! yields [`SubmitError`].
//! Invalid pooled surfaces and calls made without platform privileges are
//! handled silently by the coordinator.

use core::fmt;

use crate::view::ViewId;

/// A view was not registered in the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewLookupError {
    /// No preroll registration for this id.
    UnknownView(ViewId),
}

impl fmt::Display for ViewLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownView(id) => write!(f, "unknown view {}", id.0),
        }
    }
}

impl core::error::Error for ViewLookupError {}

/// Frame content could not be finalized.
///
/// When returned, no display call has been issued for the region that
/// failed. Display calls for earlier views and regions of the same frame
/// have already been made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The background frame failed to submit.
    Background,
    /// The overlay surface at `slot` could not provide a frame.
    OverlayFrameUnavailable {
        /// Pool slot.
        slot: usize,
    },
    /// The overlay frame at `slot` failed to submit.
    OverlaySubmit {
        /// Pool slot.
        slot: usize,
    },
    /// The surface factory could not create a usable surface, or a surface
    /// could not be bound to the render context.
    SurfaceCreation,
    /// The display API did not provide a native window for a new overlay.
    NativeWindowUnavailable,
    /// The frame was already submitted, successfully or not. Its canvases
    /// are spent; run the frame again from `begin_frame` to retry.
    AlreadySubmitted,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => f.write_str("background frame failed to submit"),
            Self::OverlayFrameUnavailable { slot } => {
                write!(f, "overlay surface {slot} has no frame available")
            }
            Self::OverlaySubmit { slot } => write!(f, "overlay frame {slot} failed to submit"),
            Self::SurfaceCreation => f.write_str("overlay surface creation failed"),
            Self::NativeWindowUnavailable => f.write_str("no native window for overlay surface"),
            Self::AlreadySubmitted => f.write_str("frame was already submitted"),
        }
    }
}

impl core::error::Error for SubmitError {}
