// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the embedding lifecycle.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`FrameCoordinator`](crate::embedder::FrameCoordinator) calls at each
//! lifecycle step. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use std::sync::{Arc, Mutex, PoisonError};

use kurbo::Rect;

use crate::backend::OverlayId;
use crate::canvas::PixelSize;
use crate::embedder::PostPrerollResult;
use crate::merger::LeaseStatus;
use crate::pool::Acquisition;
use crate::view::ViewId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a submitted frame ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmitOutcome {
    /// Background and overlays were presented.
    Presented,
    /// No views: only the background frame was presented.
    BackgroundOnly,
    /// A merge is pending; the frame will be run again.
    Deferred,
    /// Finalization failed.
    Failed,
}

/// Which lease operation the coordinator performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeaseOp {
    /// `merge_with_lease` at the end of a frame that requested a merge.
    Merge,
    /// `extend_lease_to` during post-preroll of a merged frame.
    Extend,
    /// `decrement_lease` at the end of a merged frame.
    Decrement,
}

/// How a view differs from the committed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewChangeKind {
    /// Not present in the committed frame.
    Added,
    /// Rect changed.
    Moved,
    /// Mutators changed.
    Mutated,
    /// Present in the committed frame, absent now.
    Removed,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted by `begin_frame`.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Frame size in device pixels.
    pub frame_size: PixelSize,
    /// Device pixel ratio.
    pub device_pixel_ratio: f64,
    /// Whether the display API was notified.
    pub notified: bool,
}

/// Emitted for each `preroll_composite_embedded_view` call.
#[derive(Clone, Copy, Debug)]
pub struct ViewPrerollEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Registered view.
    pub view: ViewId,
    /// Computed view rect.
    pub rect: Rect,
    /// Composite index of the view.
    pub index: u32,
    /// `false` when the call updated an earlier registration.
    pub first: bool,
}

/// Emitted by `post_preroll_action`.
#[derive(Clone, Copy, Debug)]
pub struct PostPrerollEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Views registered this frame.
    pub view_count: u32,
    /// Result handed back to the caller.
    pub result: PostPrerollResult,
}

/// Emitted when an overlay slot is acquired during submit.
#[derive(Clone, Copy, Debug)]
pub struct OverlayAcquireEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Pool slot.
    pub slot: u32,
    /// Overlay occupying the slot.
    pub overlay: OverlayId,
    /// How the slot was filled.
    pub acquisition: Acquisition,
}

/// Emitted after a native view display call.
#[derive(Clone, Copy, Debug)]
pub struct ViewDisplayEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Displayed view.
    pub view: ViewId,
    /// View rect.
    pub rect: Rect,
}

/// Emitted after an overlay display call.
#[derive(Clone, Copy, Debug)]
pub struct OverlayDisplayEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Pool slot.
    pub slot: u32,
    /// Displayed overlay.
    pub overlay: OverlayId,
    /// View the overlay content belongs to.
    pub view: ViewId,
    /// Overlay rect.
    pub rect: Rect,
}

/// Emitted for each view change detected at submit.
#[derive(Clone, Copy, Debug)]
pub struct ViewChangeEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Changed view.
    pub view: ViewId,
    /// What changed.
    pub kind: ViewChangeKind,
}

/// Emitted when `submit_frame` returns.
#[derive(Clone, Copy, Debug)]
pub struct SubmitEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Views in the frame.
    pub view_count: u32,
    /// Overlays displayed.
    pub overlay_count: u32,
    /// Whether the set or order of views differs from the last presented
    /// frame.
    pub composition_changed: bool,
    /// How the submit ended.
    pub outcome: SubmitOutcome,
}

/// Emitted when the coordinator changes the merge lease.
#[derive(Clone, Copy, Debug)]
pub struct LeaseEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Operation performed.
    pub op: LeaseOp,
    /// Result of the operation.
    pub status: LeaseStatus,
    /// Lease remaining afterwards.
    pub remaining: u32,
}

/// Emitted by `end_frame`.
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Whether the display API was notified.
    pub notified: bool,
    /// Whether the threads are merged after the frame.
    pub merged: bool,
}

/// Emitted by `cancel_frame`.
#[derive(Clone, Copy, Debug)]
pub struct FrameCancelEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Views whose canvases were discarded.
    pub discarded_views: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the coordinator.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame begins.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called when a view is registered.
    fn on_view_preroll(&mut self, e: &ViewPrerollEvent) {
        _ = e;
    }

    /// Called after the post-preroll decision.
    fn on_post_preroll(&mut self, e: &PostPrerollEvent) {
        _ = e;
    }

    /// Called when an overlay slot is acquired.
    fn on_overlay_acquire(&mut self, e: &OverlayAcquireEvent) {
        _ = e;
    }

    /// Called after a native view is displayed.
    fn on_view_display(&mut self, e: &ViewDisplayEvent) {
        _ = e;
    }

    /// Called after an overlay is displayed.
    fn on_overlay_display(&mut self, e: &OverlayDisplayEvent) {
        _ = e;
    }

    /// Called for each view change found at submit.
    fn on_view_change(&mut self, e: &ViewChangeEvent) {
        _ = e;
    }

    /// Called when a submit finishes.
    fn on_submit(&mut self, e: &SubmitEvent) {
        _ = e;
    }

    /// Called when the merge lease changes.
    fn on_lease(&mut self, e: &LeaseEvent) {
        _ = e;
    }

    /// Called when a frame ends.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Called when a frame is canceled.
    fn on_frame_cancel(&mut self, e: &FrameCancelEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// SharedSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] behind an `Arc<Mutex<_>>`.
///
/// The coordinator owns its sink as a boxed trait object. Handing it a
/// clone of a `SharedSink` keeps the concrete sink reachable, e.g. to read
/// a recorder's bytes after the frame loop ends.
#[derive(Debug, Default)]
pub struct SharedSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> SharedSink<S> {
    /// Wraps `sink`.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Runs `f` with exclusive access to the wrapped sink.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }
}

macro_rules! share {
    ($($hook:ident: $event:ty),* $(,)?) => {
        impl<S: TraceSink> TraceSink for SharedSink<S> {
            $(
                fn $hook(&mut self, e: &$event) {
                    self.with(|s| s.$hook(e));
                }
            )*
        }
    };
}

share!(
    on_frame_begin: FrameBeginEvent,
    on_view_preroll: ViewPrerollEvent,
    on_post_preroll: PostPrerollEvent,
    on_overlay_acquire: OverlayAcquireEvent,
    on_view_display: ViewDisplayEvent,
    on_overlay_display: OverlayDisplayEvent,
    on_view_change: ViewChangeEvent,
    on_submit: SubmitEvent,
    on_lease: LeaseEvent,
    on_frame_end: FrameEndEvent,
    on_frame_cancel: FrameCancelEvent,
);

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Generates a `Tracer` method that forwards one event type.
macro_rules! forward {
    ($(#[$doc:meta])* $name:ident, $event:ty, $hook:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    forward!(
        /// Emits a [`FrameBeginEvent`].
        frame_begin, FrameBeginEvent, on_frame_begin
    );
    forward!(
        /// Emits a [`ViewPrerollEvent`].
        view_preroll, ViewPrerollEvent, on_view_preroll
    );
    forward!(
        /// Emits a [`PostPrerollEvent`].
        post_preroll, PostPrerollEvent, on_post_preroll
    );
    forward!(
        /// Emits an [`OverlayAcquireEvent`].
        overlay_acquire, OverlayAcquireEvent, on_overlay_acquire
    );
    forward!(
        /// Emits a [`ViewDisplayEvent`].
        view_display, ViewDisplayEvent, on_view_display
    );
    forward!(
        /// Emits an [`OverlayDisplayEvent`].
        overlay_display, OverlayDisplayEvent, on_overlay_display
    );
    forward!(
        /// Emits a [`ViewChangeEvent`].
        view_change, ViewChangeEvent, on_view_change
    );
    forward!(
        /// Emits a [`SubmitEvent`].
        submit, SubmitEvent, on_submit
    );
    forward!(
        /// Emits a [`LeaseEvent`].
        lease, LeaseEvent, on_lease
    );
    forward!(
        /// Emits a [`FrameEndEvent`].
        frame_end, FrameEndEvent, on_frame_end
    );
    forward!(
        /// Emits a [`FrameCancelEvent`].
        frame_cancel, FrameCancelEvent, on_frame_cancel
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
