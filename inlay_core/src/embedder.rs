// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame view embedding coordinator.
//!
//! [`FrameCoordinator`] drives one frame at a time through:
//!
//! ```text
//! begin_frame ─► preroll_composite_embedded_view* ─► post_preroll_action
//!     ─► composite_embedded_view* / current_canvases
//!     ─► submit_frame | cancel_frame
//!     ─► end_frame
//! ```
//!
//! # Canvases and z-order
//!
//! Views are composited back to front in the order they were first
//! registered. Each view gets one [`RecordingCanvas`] for the scene content
//! that sits *above* it. At submit, content of view `i` that intersects the
//! rect of any view `0..=i` is lifted into overlay surfaces; everything else
//! goes to the background frame, which has those regions clipped out.
//!
//! The display calls then alternate: view 0, the overlays above view 0,
//! view 1, the overlays above view 1, and so on.
//!
//! # Thread merging
//!
//! Native display calls need platform privileges. When a frame has views and
//! the threads are split, [`post_preroll_action`](FrameCoordinator::post_preroll_action)
//! returns [`PostPrerollResult::ResubmitFrame`]; the submit of that frame
//! does nothing and [`end_frame`](FrameCoordinator::end_frame) merges the
//! threads for [`EmbedderConfig::merged_lease_frames`] cycles. The caller
//! then runs the frame again. Each later frame with views restores the
//! lease, and each frame end consumes one cycle, so the threads split again
//! once views have been absent for a full lease.

use std::sync::Arc;

use kurbo::Rect;

use crate::backend::{PlatformViewDisplay, RenderContextId, SurfaceFactory, SurfaceFrame};
use crate::canvas::{Color, Picture, PixelSize, RecordingCanvas};
use crate::config::EmbedderConfig;
use crate::error::{SubmitError, ViewLookupError};
use crate::merger::ThreadMerger;
use crate::pool::SurfacePool;
use crate::trace::{
    FrameBeginEvent, FrameCancelEvent, FrameEndEvent, LeaseEvent, LeaseOp, OverlayAcquireEvent,
    OverlayDisplayEvent, PostPrerollEvent, SubmitEvent, SubmitOutcome, TraceSink, Tracer,
    ViewChangeEvent, ViewChangeKind, ViewDisplayEvent, ViewPrerollEvent,
};
use crate::view::{EmbeddedViewParams, MutatorsStack, ViewId, ViewParamsTracker};

/// What the caller must do after preroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostPrerollResult {
    /// Continue with this frame.
    Success,
    /// Finish this frame (its submit is a no-op) and run it again once the
    /// threads are merged.
    ResubmitFrame,
}

/// Coordinates native views and overlay surfaces for one frame at a time.
pub struct FrameCoordinator {
    config: EmbedderConfig,
    display: Arc<dyn PlatformViewDisplay>,
    factory: Arc<dyn SurfaceFactory>,
    pool: SurfacePool,
    views: ViewParamsTracker,
    canvases: Vec<RecordingCanvas>,
    frame_size: PixelSize,
    root_mutators: MutatorsStack,
    frame_index: u64,
    frame_open: bool,
    submitted: bool,
    merge_requested: bool,
    trace_sink: Option<Box<dyn TraceSink + Send>>,
}

impl core::fmt::Debug for FrameCoordinator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameCoordinator")
            .field("config", &self.config)
            .field("frame_index", &self.frame_index)
            .field("frame_size", &self.frame_size)
            .field("views", &self.views)
            .field("pool", &self.pool)
            .field("merge_requested", &self.merge_requested)
            .finish_non_exhaustive()
    }
}

impl FrameCoordinator {
    /// Creates a coordinator with [`EmbedderConfig::default`].
    #[must_use]
    pub fn new(display: Arc<dyn PlatformViewDisplay>, factory: Arc<dyn SurfaceFactory>) -> Self {
        Self::with_config(EmbedderConfig::default(), display, factory)
    }

    /// Creates a coordinator with `config`.
    #[must_use]
    pub fn with_config(
        config: EmbedderConfig,
        display: Arc<dyn PlatformViewDisplay>,
        factory: Arc<dyn SurfaceFactory>,
    ) -> Self {
        Self {
            config,
            display,
            factory,
            pool: SurfacePool::new(),
            views: ViewParamsTracker::new(),
            canvases: Vec::new(),
            frame_size: PixelSize::default(),
            root_mutators: MutatorsStack::new(),
            frame_index: 0,
            frame_open: false,
            submitted: false,
            merge_requested: false,
            trace_sink: None,
        }
    }

    /// Installs (or removes) the trace sink.
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink + Send>>) {
        self.trace_sink = sink;
    }

    /// Configuration in use.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }

    /// Number of frames begun so far.
    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns `true` between `begin_frame` and `end_frame`.
    #[inline]
    #[must_use]
    pub fn is_frame_open(&self) -> bool {
        self.frame_open
    }

    /// Size of the current frame.
    #[inline]
    #[must_use]
    pub fn frame_size(&self) -> PixelSize {
        self.frame_size
    }

    /// Root mutators passed to `begin_frame`.
    #[must_use]
    pub fn root_mutators(&self) -> &MutatorsStack {
        &self.root_mutators
    }

    /// View bookkeeping for the current frame.
    #[must_use]
    pub fn views(&self) -> &ViewParamsTracker {
        &self.views
    }

    /// The overlay surface pool.
    #[must_use]
    pub fn pool(&self) -> &SurfacePool {
        &self.pool
    }

    /// Opens a frame.
    ///
    /// Per-view state left by an earlier frame is dropped. The display API
    /// is told that a frame begins only when the calling thread has platform
    /// privileges.
    pub fn begin_frame(
        &mut self,
        frame_size: PixelSize,
        mutators: &MutatorsStack,
        device_pixel_ratio: f64,
        merger: &ThreadMerger,
    ) {
        self.canvases.clear();
        self.views.begin_frame(device_pixel_ratio);
        self.frame_index += 1;
        self.frame_size = frame_size;
        self.root_mutators = mutators.clone();
        self.frame_open = true;
        self.submitted = false;

        let notified = merger.has_platform_privileges();
        if notified {
            self.display.on_frame_begin();
        }
        let e = FrameBeginEvent {
            frame_index: self.frame_index,
            frame_size,
            device_pixel_ratio,
            notified,
        };
        tracer(&mut self.trace_sink).frame_begin(&e);
    }

    /// Registers `view` for this frame, or replaces its params.
    ///
    /// The first registration allocates the view's canvas and fixes its
    /// composite position.
    pub fn preroll_composite_embedded_view(&mut self, view: ViewId, params: EmbeddedViewParams) {
        let rect = params.view_rect(self.views.device_pixel_ratio());
        let registration = self.views.register(view, params);
        if registration.is_first() {
            self.canvases.push(RecordingCanvas::new(self.frame_size));
        }
        let e = ViewPrerollEvent {
            frame_index: self.frame_index,
            view,
            rect,
            index: count(registration.index()),
            first: registration.is_first(),
        };
        tracer(&mut self.trace_sink).view_preroll(&e);
    }

    /// Canvas for `view`, or `None` if it was not registered this frame.
    pub fn composite_embedded_view(&mut self, view: ViewId) -> Option<&mut RecordingCanvas> {
        let index = self.views.index_of(view)?;
        self.canvases.get_mut(index)
    }

    /// Canvases of this frame in registration order.
    #[must_use]
    pub fn current_canvases(&self) -> &[RecordingCanvas] {
        &self.canvases
    }

    /// Mutable canvases of this frame in registration order.
    pub fn current_canvases_mut(&mut self) -> &mut [RecordingCanvas] {
        &mut self.canvases
    }

    /// Rect of `view` from its latest registration this frame.
    pub fn view_rect(&self, view: ViewId) -> Result<Rect, ViewLookupError> {
        self.views.view_rect(view)
    }

    /// Returns `true` if any view was registered this frame.
    #[must_use]
    pub fn has_platform_views(&self) -> bool {
        !self.views.is_empty()
    }

    /// Decides whether the threads must merge before this frame can be
    /// finalized.
    ///
    /// With views and split threads, a merge is requested and
    /// [`PostPrerollResult::ResubmitFrame`] returned. With views and merged
    /// threads, the lease is restored. Without views nothing is touched, so
    /// an existing lease runs out.
    pub fn post_preroll_action(&mut self, merger: &ThreadMerger) -> PostPrerollResult {
        let result = if self.views.is_empty() {
            PostPrerollResult::Success
        } else if merger.is_merged() {
            let status = merger.extend_lease_to(self.config.merged_lease_frames);
            let e = LeaseEvent {
                frame_index: self.frame_index,
                op: LeaseOp::Extend,
                status,
                remaining: merger.lease_remaining(),
            };
            tracer(&mut self.trace_sink).lease(&e);
            PostPrerollResult::Success
        } else {
            self.merge_requested = true;
            PostPrerollResult::ResubmitFrame
        };
        let e = PostPrerollEvent {
            frame_index: self.frame_index,
            view_count: count(self.views.len()),
            result,
        };
        tracer(&mut self.trace_sink).post_preroll(&e);
        result
    }

    /// Finalizes the frame.
    ///
    /// Overlay regions are computed from the view canvases and clipped out
    /// of `frame`, which then receives every view's content and is
    /// submitted. Views and overlays are displayed back to front afterwards,
    /// each overlay right after its content was submitted to a pooled
    /// surface.
    ///
    /// Without views, `frame` is submitted as an ordinary frame. While a
    /// merge is pending the call does nothing and succeeds.
    ///
    /// A frame is submitted at most once. Later calls in the same frame drop
    /// `frame` and return [`SubmitError::AlreadySubmitted`] without any
    /// display call.
    pub fn submit_frame(
        &mut self,
        context: Option<RenderContextId>,
        frame: SurfaceFrame,
    ) -> Result<(), SubmitError> {
        let mut e = SubmitEvent {
            frame_index: self.frame_index,
            view_count: count(self.views.len()),
            overlay_count: 0,
            composition_changed: self.views.composition_changed(),
            outcome: SubmitOutcome::Failed,
        };
        if core::mem::replace(&mut self.submitted, true) {
            tracer(&mut self.trace_sink).submit(&e);
            return Err(SubmitError::AlreadySubmitted);
        }
        if self.merge_requested {
            self.canvases.clear();
            e.outcome = SubmitOutcome::Deferred;
            tracer(&mut self.trace_sink).submit(&e);
            return Ok(());
        }

        let result = if self.views.is_empty() {
            if frame.submit() {
                e.outcome = SubmitOutcome::BackgroundOnly;
                Ok(())
            } else {
                Err(SubmitError::Background)
            }
        } else {
            self.present(context, frame).map(|overlays| {
                e.overlay_count = overlays;
                e.outcome = SubmitOutcome::Presented;
            })
        };
        if result.is_ok() {
            self.commit_views();
        }
        tracer(&mut self.trace_sink).submit(&e);
        result
    }

    /// Closes the frame.
    ///
    /// Notifies the display API when the calling thread has platform
    /// privileges, then applies the pending merge or consumes one cycle of
    /// an existing lease.
    pub fn end_frame(&mut self, merger: &ThreadMerger) {
        self.pool.recycle();
        let notified = merger.has_platform_privileges();
        if notified {
            self.display.on_frame_end();
        }

        let lease = if core::mem::take(&mut self.merge_requested) {
            Some((
                LeaseOp::Merge,
                merger.merge_with_lease(self.config.merged_lease_frames),
            ))
        } else if merger.is_merged() {
            Some((LeaseOp::Decrement, merger.decrement_lease()))
        } else {
            None
        };
        if let Some((op, status)) = lease {
            let e = LeaseEvent {
                frame_index: self.frame_index,
                op,
                status,
                remaining: merger.lease_remaining(),
            };
            tracer(&mut self.trace_sink).lease(&e);
        }

        self.canvases.clear();
        self.views.reset();
        self.frame_open = false;
        self.submitted = false;
        let e = FrameEndEvent {
            frame_index: self.frame_index,
            notified,
            merged: merger.is_merged(),
        };
        tracer(&mut self.trace_sink).frame_end(&e);
    }

    /// Drops the canvases and params of the open frame without any display
    /// call. The surface pool is left untouched, its cursor included; a
    /// pending merge request stays pending until `end_frame`.
    pub fn cancel_frame(&mut self) {
        let discarded_views = count(self.canvases.len());
        self.canvases.clear();
        self.views.reset();
        let e = FrameCancelEvent {
            frame_index: self.frame_index,
            discarded_views,
        };
        tracer(&mut self.trace_sink).frame_cancel(&e);
    }

    /// Drops every pooled overlay and destroys their native windows.
    ///
    /// Returns `false`, doing nothing, when the calling thread lacks
    /// platform privileges.
    pub fn destroy_surfaces(&mut self, merger: &ThreadMerger) -> bool {
        if !merger.has_platform_privileges() {
            return false;
        }
        self.pool.destroy(&*self.display);
        true
    }

    /// Draws the background and overlays and issues the display calls.
    /// Returns the number of overlays displayed.
    fn present(
        &mut self,
        context: Option<RenderContextId>,
        mut frame: SurfaceFrame,
    ) -> Result<u32, SubmitError> {
        let pictures: Vec<Arc<Picture>> = self
            .canvases
            .drain(..)
            .map(|canvas| Arc::new(canvas.finish()))
            .collect();
        let order: Vec<ViewId> = self.views.order().collect();
        let rects: Vec<Rect> = self.views.rects().collect();
        let regions = overlay_regions(&self.config, &pictures, &rects);

        let background = frame.canvas();
        background.save();
        for (picture, view_regions) in pictures.iter().zip(&regions) {
            for region in view_regions {
                background.clip_out_rect(*region);
            }
            background.draw_picture(picture);
        }
        background.restore();
        if !frame.submit() {
            return Err(SubmitError::Background);
        }

        let frame_index = self.frame_index;
        let mut displayed = 0;
        let views = order.into_iter().zip(rects).zip(pictures.iter().zip(&regions));
        for ((view, rect), (picture, view_regions)) in views {
            self.display.on_display_platform_view(view, rect);
            tracer(&mut self.trace_sink).view_display(&ViewDisplayEvent {
                frame_index,
                view,
                rect,
            });

            for region in view_regions {
                let acquired = self
                    .pool
                    .acquire(context, &*self.display, &*self.factory)?;
                let slot = acquired.slot;
                let overlay = acquired.layer.id();
                tracer(&mut self.trace_sink).overlay_acquire(&OverlayAcquireEvent {
                    frame_index,
                    slot: count(slot),
                    overlay,
                    acquisition: acquired.acquisition,
                });

                let mut overlay_frame = acquired
                    .layer
                    .surface()
                    .acquire_frame(self.frame_size)
                    .ok_or(SubmitError::OverlayFrameUnavailable { slot })?;
                let canvas = overlay_frame.canvas();
                canvas.clear(Color::TRANSPARENT);
                canvas.translate(-region.x0, -region.y0);
                canvas.draw_picture(picture);
                if !overlay_frame.submit() {
                    return Err(SubmitError::OverlaySubmit { slot });
                }

                self.display.on_display_overlay_surface(overlay, *region);
                displayed += 1;
                tracer(&mut self.trace_sink).overlay_display(&OverlayDisplayEvent {
                    frame_index,
                    slot: count(slot),
                    overlay,
                    view,
                    rect: *region,
                });
            }
        }
        Ok(displayed)
    }

    /// Reports view changes against the committed frame, then commits.
    fn commit_views(&mut self) {
        let changes = self.views.changed_views();
        let frame_index = self.frame_index;
        let mut tracer = tracer(&mut self.trace_sink);
        for (kind, views) in [
            (ViewChangeKind::Added, &changes.added),
            (ViewChangeKind::Moved, &changes.moved),
            (ViewChangeKind::Mutated, &changes.mutated),
            (ViewChangeKind::Removed, &changes.removed),
        ] {
            for &view in views {
                tracer.view_change(&ViewChangeEvent {
                    frame_index,
                    view,
                    kind,
                });
            }
        }
        self.views.commit();
    }
}

/// Overlay regions per view, in display order.
///
/// For view `i`, its drawn content is searched against the rects of views
/// `i` down to `0`.
fn overlay_regions(
    config: &EmbedderConfig,
    pictures: &[Arc<Picture>],
    rects: &[Rect],
) -> Vec<Vec<Rect>> {
    pictures
        .iter()
        .enumerate()
        .map(|(i, picture)| {
            let mut regions = Vec::new();
            for query in rects[..=i].iter().rev() {
                let mut found = picture.drawn_rects().search_non_overlapping(*query);
                if found.len() > config.max_overlays_per_view {
                    found = found.into_iter().reduce(|a, b| a.union(b)).into_iter().collect();
                }
                regions.extend(found.into_iter().map(|region| {
                    if config.round_out_overlays {
                        region.expand()
                    } else {
                        region
                    }
                }));
            }
            regions
        })
        .collect()
}

fn tracer(sink: &mut Option<Box<dyn TraceSink + Send>>) -> Tracer<'_> {
    match sink.as_deref_mut() {
        Some(sink) => Tracer::new(sink),
        None => Tracer::none(),
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use core::ptr;

    use kurbo::{Point, Size, Vec2};

    use super::*;
    use crate::backend::{OverlayId, RenderContextId};
    use crate::canvas::DrawOp;
    use crate::merger::{DEFAULT_MERGED_LEASE_FRAMES, LeaseStatus};
    use crate::testing::{
        DisplayCall, RecordingDisplay, ScriptedSurfaceFactory, capture_frame, merger_on_platform,
        merger_on_raster,
    };

    const CONTEXT: Option<RenderContextId> = Some(RenderContextId(1));

    struct Harness {
        display: Arc<RecordingDisplay>,
        factory: ScriptedSurfaceFactory,
        coordinator: FrameCoordinator,
    }

    fn harness(config: EmbedderConfig) -> Harness {
        let display = RecordingDisplay::shared();
        let factory = ScriptedSurfaceFactory::new();
        let coordinator = FrameCoordinator::with_config(
            config,
            Arc::clone(&display) as Arc<dyn PlatformViewDisplay>,
            Arc::new(factory.clone()),
        );
        Harness {
            display,
            factory,
            coordinator,
        }
    }

    fn xywh(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, x + w, y + h)
    }

    fn params(x: f64, y: f64, w: f64, h: f64) -> EmbeddedViewParams {
        EmbeddedViewParams::new(Point::new(x, y), Size::new(w, h))
    }

    fn fill(coordinator: &mut FrameCoordinator, view: ViewId, rect: Rect) {
        coordinator
            .composite_embedded_view(view)
            .expect("view was prerolled")
            .fill_rect(rect, Color::BLACK);
    }

    // -- Canvas bookkeeping --

    #[test]
    fn canvases_follow_registration_order() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        h.coordinator
            .begin_frame(PixelSize::new(100, 100), &MutatorsStack::new(), 1.0, &merger);
        let ids = [ViewId(7), ViewId(3), ViewId(11)];
        for (x, id) in [0.0, 10.0, 20.0].into_iter().zip(ids) {
            h.coordinator
                .preroll_composite_embedded_view(id, params(x, 0.0, 5.0, 5.0));
        }
        assert_eq!(h.coordinator.current_canvases().len(), ids.len());

        for (i, id) in ids.iter().enumerate() {
            let canvas: *const RecordingCanvas =
                h.coordinator.composite_embedded_view(*id).expect("registered");
            assert!(
                ptr::eq(canvas, &h.coordinator.current_canvases()[i]),
                "view {i} maps to its slot"
            );
        }
    }

    #[test]
    fn composite_before_preroll_is_none() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        h.coordinator
            .begin_frame(PixelSize::new(10, 20), &MutatorsStack::new(), 1.0, &merger);
        assert!(h.coordinator.composite_embedded_view(ViewId(0)).is_none());
        assert!(h.coordinator.current_canvases().is_empty());
    }

    #[test]
    fn preroll_without_begin_frame_allocates_canvas() {
        let mut h = harness(EmbedderConfig::default());
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 1.0, 1.0));
        assert!(h.coordinator.composite_embedded_view(ViewId(0)).is_some());
        assert_eq!(h.coordinator.current_canvases().len(), 1);
    }

    #[test]
    fn cancel_frame_discards_canvases_without_display_calls() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_raster();
        h.coordinator
            .begin_frame(PixelSize::new(100, 100), &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 10.0, 10.0));
        h.coordinator
            .preroll_composite_embedded_view(ViewId(1), params(20.0, 0.0, 10.0, 10.0));
        h.coordinator.cancel_frame();

        assert!(h.coordinator.current_canvases().is_empty());
        assert!(h.coordinator.composite_embedded_view(ViewId(0)).is_none());
        assert!(h.display.calls().is_empty(), "{:?}", h.display.calls());
    }

    #[test]
    fn cancel_frame_leaves_pool_alone() {
        let mut h = harness(EmbedderConfig::default());
        h.factory.fail_frames(true);
        assert!(submit_one_overlay(&mut h).is_err());
        assert_eq!((h.coordinator.pool().len(), h.coordinator.pool().in_use()), (1, 1));

        h.coordinator.cancel_frame();
        assert_eq!(h.coordinator.pool().len(), 1);
        assert_eq!(h.coordinator.pool().in_use(), 1, "cursor rewinds at end_frame");
        assert_eq!(h.display.count(|c| matches!(c, DisplayCall::DestroyOverlays)), 0);

        h.coordinator.end_frame(&merger_on_platform());
        assert_eq!(h.coordinator.pool().in_use(), 0);
    }

    #[test]
    fn begin_frame_clears_previous_frame() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_raster();
        h.coordinator
            .begin_frame(PixelSize::new(100, 100), &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 10.0, 10.0));
        h.coordinator
            .begin_frame(PixelSize::new(100, 100), &MutatorsStack::new(), 1.0, &merger);
        assert!(h.coordinator.current_canvases().is_empty());
        assert_eq!(h.coordinator.frame_index(), 2);
    }

    // -- View rects --

    #[test]
    fn view_rect_scales_size_only() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        h.coordinator
            .begin_frame(PixelSize::new(100, 100), &MutatorsStack::new(), 1.5, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(10.0, 20.0, 30.0, 40.0));
        assert_eq!(
            h.coordinator.view_rect(ViewId(0)),
            Ok(xywh(10.0, 20.0, 45.0, 60.0))
        );
    }

    #[test]
    fn reregistration_updates_rect_and_keeps_order() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        h.coordinator
            .begin_frame(PixelSize::new(100, 100), &MutatorsStack::new(), 1.5, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(10.0, 20.0, 30.0, 40.0));
        h.coordinator
            .preroll_composite_embedded_view(ViewId(1), params(0.0, 0.0, 1.0, 1.0));
        let first: *const RecordingCanvas = &h.coordinator.current_canvases()[0];

        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(50.0, 60.0, 70.0, 80.0));
        assert_eq!(
            h.coordinator.view_rect(ViewId(0)),
            Ok(xywh(50.0, 60.0, 105.0, 120.0))
        );
        assert_eq!(h.coordinator.current_canvases().len(), 2);
        assert!(ptr::eq(first, &h.coordinator.current_canvases()[0]));
        assert_eq!(
            h.coordinator.views().order().collect::<Vec<_>>(),
            [ViewId(0), ViewId(1)]
        );
    }

    #[test]
    fn unknown_view_rect_is_an_error() {
        let h = harness(EmbedderConfig::default());
        assert_eq!(
            h.coordinator.view_rect(ViewId(9)),
            Err(ViewLookupError::UnknownView(ViewId(9)))
        );
    }

    // -- Merging --

    #[test]
    fn no_views_needs_no_merge() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        h.coordinator
            .begin_frame(PixelSize::new(10, 20), &MutatorsStack::new(), 1.0, &merger);
        assert_eq!(
            h.coordinator.post_preroll_action(&merger),
            PostPrerollResult::Success
        );
        h.coordinator.end_frame(&merger);
        assert!(!merger.is_merged());
        assert_eq!(
            h.display.calls(),
            [DisplayCall::FrameBegin, DisplayCall::FrameEnd]
        );
    }

    #[test]
    fn views_on_split_threads_request_resubmit_and_merge() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        h.coordinator
            .begin_frame(PixelSize::new(10, 20), &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 5.0, 5.0));
        assert_eq!(
            h.coordinator.post_preroll_action(&merger),
            PostPrerollResult::ResubmitFrame
        );
        assert!(!merger.is_merged(), "merging waits for end_frame");

        let (frame, background) = capture_frame(PixelSize::new(10, 20), true);
        assert_eq!(h.coordinator.submit_frame(CONTEXT, frame), Ok(()));
        assert!(
            background.lock().unwrap().is_empty(),
            "deferred frame is not drawn"
        );

        h.coordinator.end_frame(&merger);
        assert!(merger.is_merged());
        assert_eq!(
            h.display.calls(),
            [DisplayCall::FrameBegin, DisplayCall::FrameEnd]
        );

        for _ in 0..DEFAULT_MERGED_LEASE_FRAMES {
            merger.decrement_lease();
        }
        assert!(!merger.is_merged());
        assert_eq!(merger.decrement_lease(), LeaseStatus::Split);
    }

    #[test]
    fn split_raster_thread_never_touches_display() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_raster();
        h.coordinator
            .begin_frame(PixelSize::new(10, 20), &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 5.0, 5.0));
        h.coordinator
            .preroll_composite_embedded_view(ViewId(1), params(5.0, 0.0, 5.0, 5.0));
        assert_eq!(h.coordinator.current_canvases().len(), 2);
        assert_eq!(
            h.coordinator.post_preroll_action(&merger),
            PostPrerollResult::ResubmitFrame
        );
        h.coordinator.end_frame(&merger);

        assert!(h.display.calls().is_empty(), "{:?}", h.display.calls());
        assert!(merger.is_merged());
    }

    #[test]
    fn merged_frames_restore_and_consume_lease() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        merger.merge_with_lease(DEFAULT_MERGED_LEASE_FRAMES);
        for _ in 0..4 {
            merger.decrement_lease();
        }

        h.coordinator
            .begin_frame(PixelSize::new(10, 20), &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 5.0, 5.0));
        assert_eq!(
            h.coordinator.post_preroll_action(&merger),
            PostPrerollResult::Success
        );
        assert_eq!(merger.lease_remaining(), DEFAULT_MERGED_LEASE_FRAMES);
        h.coordinator.end_frame(&merger);
        assert_eq!(merger.lease_remaining(), DEFAULT_MERGED_LEASE_FRAMES - 1);
    }

    #[test]
    fn lease_expires_after_frames_without_views() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        merger.merge_with_lease(DEFAULT_MERGED_LEASE_FRAMES);
        for frame in 0..DEFAULT_MERGED_LEASE_FRAMES {
            assert!(merger.is_merged(), "still merged before frame {frame}");
            h.coordinator
                .begin_frame(PixelSize::new(10, 20), &MutatorsStack::new(), 1.0, &merger);
            assert_eq!(
                h.coordinator.post_preroll_action(&merger),
                PostPrerollResult::Success
            );
            h.coordinator.end_frame(&merger);
        }
        assert!(!merger.is_merged());
    }

    #[test]
    fn canceled_frame_still_merges_at_end() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_raster();
        h.coordinator
            .begin_frame(PixelSize::new(10, 20), &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 5.0, 5.0));
        h.coordinator.post_preroll_action(&merger);
        h.coordinator.cancel_frame();
        h.coordinator.end_frame(&merger);
        assert!(merger.is_merged());
        assert!(!h.coordinator.is_frame_open());
    }

    // -- Submit --

    /// Runs one merged frame with view 0 at (100, 100), 200x200 points,
    /// and three scene rects recorded above it.
    fn run_recycle_frame(h: &mut Harness, merger: &ThreadMerger) {
        let size = PixelSize::new(1000, 1000);
        h.coordinator
            .begin_frame(size, &MutatorsStack::new(), 1.5, merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(100.0, 100.0, 200.0, 200.0));
        assert_eq!(
            h.coordinator.post_preroll_action(merger),
            PostPrerollResult::Success
        );
        fill(&mut h.coordinator, ViewId(0), xywh(0.0, 0.0, 50.0, 50.0));
        fill(&mut h.coordinator, ViewId(0), xywh(50.0, 50.0, 200.0, 200.0));
        fill(&mut h.coordinator, ViewId(0), xywh(150.0, 150.0, 100.0, 100.0));
        let (frame, _) = capture_frame(size, true);
        assert_eq!(h.coordinator.submit_frame(CONTEXT, frame), Ok(()));
        h.coordinator.end_frame(merger);
    }

    #[test]
    fn overlay_surfaces_are_recycled_across_frames() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        merger.merge_with_lease(DEFAULT_MERGED_LEASE_FRAMES);

        run_recycle_frame(&mut h, &merger);
        assert_eq!(
            h.display.take_calls(),
            [
                DisplayCall::FrameBegin,
                DisplayCall::PlatformView(ViewId(0), xywh(100.0, 100.0, 300.0, 300.0)),
                DisplayCall::CreateOverlay(OverlayId(0)),
                DisplayCall::OverlaySurface(OverlayId(0), xywh(50.0, 50.0, 200.0, 200.0)),
                DisplayCall::FrameEnd,
            ]
        );

        run_recycle_frame(&mut h, &merger);
        assert_eq!(
            h.display.take_calls(),
            [
                DisplayCall::FrameBegin,
                DisplayCall::PlatformView(ViewId(0), xywh(100.0, 100.0, 300.0, 300.0)),
                DisplayCall::OverlaySurface(OverlayId(0), xywh(50.0, 50.0, 200.0, 200.0)),
                DisplayCall::FrameEnd,
            ]
        );
        assert_eq!(h.factory.created(), 1);
        assert_eq!(
            h.factory.frame_sizes(0),
            [PixelSize::new(1000, 1000), PixelSize::new(1000, 1000)]
        );
        assert!(h.factory.window(0).is_some(), "surface bound to a window");
    }

    #[test]
    fn overlays_follow_their_view_in_display_order() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        merger.merge_with_lease(DEFAULT_MERGED_LEASE_FRAMES);
        let size = PixelSize::new(400, 200);
        h.coordinator
            .begin_frame(size, &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(1), params(0.0, 0.0, 100.0, 100.0));
        h.coordinator
            .preroll_composite_embedded_view(ViewId(2), params(200.0, 0.0, 100.0, 100.0));
        h.coordinator.post_preroll_action(&merger);

        // Above view 1 only.
        fill(&mut h.coordinator, ViewId(1), xywh(50.0, 50.0, 20.0, 20.0));
        // Above view 2, and above view 1 because it was recorded later.
        fill(&mut h.coordinator, ViewId(2), xywh(250.0, 10.0, 10.0, 10.0));
        fill(&mut h.coordinator, ViewId(2), xywh(10.0, 10.0, 5.0, 5.0));
        // Outside every view: background only.
        fill(&mut h.coordinator, ViewId(2), xywh(150.0, 150.0, 10.0, 10.0));

        let (frame, background) = capture_frame(size, true);
        assert_eq!(h.coordinator.submit_frame(CONTEXT, frame), Ok(()));
        assert_eq!(
            h.display.calls()[1..],
            [
                DisplayCall::PlatformView(ViewId(1), xywh(0.0, 0.0, 100.0, 100.0)),
                DisplayCall::CreateOverlay(OverlayId(0)),
                DisplayCall::OverlaySurface(OverlayId(0), xywh(50.0, 50.0, 20.0, 20.0)),
                DisplayCall::PlatformView(ViewId(2), xywh(200.0, 0.0, 100.0, 100.0)),
                DisplayCall::CreateOverlay(OverlayId(1)),
                DisplayCall::OverlaySurface(OverlayId(1), xywh(250.0, 10.0, 10.0, 10.0)),
                DisplayCall::CreateOverlay(OverlayId(2)),
                DisplayCall::OverlaySurface(OverlayId(2), xywh(10.0, 10.0, 5.0, 5.0)),
            ]
        );

        let background = background.lock().unwrap();
        let ops = background[0].ops();
        assert_eq!(ops.len(), 7);
        assert_eq!(ops[0], DrawOp::Save);
        assert_eq!(ops[1], DrawOp::ClipOutRect(xywh(50.0, 50.0, 20.0, 20.0)));
        assert!(matches!(ops[2], DrawOp::DrawPicture(_)));
        assert_eq!(ops[3], DrawOp::ClipOutRect(xywh(250.0, 10.0, 10.0, 10.0)));
        assert_eq!(ops[4], DrawOp::ClipOutRect(xywh(10.0, 10.0, 5.0, 5.0)));
        assert!(matches!(ops[5], DrawOp::DrawPicture(_)));
        assert_eq!(ops[6], DrawOp::Restore);

        let overlay = &h.factory.pictures(0)[0];
        assert_eq!(overlay.ops()[0], DrawOp::Clear(Color::TRANSPARENT));
        assert_eq!(overlay.ops()[1], DrawOp::Translate(Vec2::new(-50.0, -50.0)));
        assert!(matches!(overlay.ops()[2], DrawOp::DrawPicture(_)));
    }

    #[test]
    fn adjacent_views_without_content_need_no_overlay() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        merger.merge_with_lease(DEFAULT_MERGED_LEASE_FRAMES);
        let size = PixelSize::new(200, 100);
        h.coordinator
            .begin_frame(size, &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 100.0, 100.0));
        h.coordinator
            .preroll_composite_embedded_view(ViewId(1), params(100.0, 0.0, 100.0, 100.0));
        h.coordinator.post_preroll_action(&merger);
        let (frame, _) = capture_frame(size, true);
        assert_eq!(h.coordinator.submit_frame(CONTEXT, frame), Ok(()));
        assert_eq!(h.factory.created(), 0);
        assert_eq!(
            h.display
                .count(|c| matches!(c, DisplayCall::PlatformView(..))),
            2
        );
    }

    fn three_clusters(config: EmbedderConfig) -> Vec<DisplayCall> {
        let mut h = harness(config);
        let merger = merger_on_platform();
        merger.merge_with_lease(1);
        let size = PixelSize::new(100, 100);
        h.coordinator
            .begin_frame(size, &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 100.0, 100.0));
        h.coordinator.post_preroll_action(&merger);
        for x in [0.0, 20.0, 40.0] {
            fill(&mut h.coordinator, ViewId(0), xywh(x, 0.0, 10.0, 10.0));
        }
        let (frame, _) = capture_frame(size, true);
        assert_eq!(h.coordinator.submit_frame(CONTEXT, frame), Ok(()));
        h.display
            .calls()
            .into_iter()
            .filter(|c| matches!(c, DisplayCall::OverlaySurface(..)))
            .collect()
    }

    #[test]
    fn regions_above_cap_are_joined() {
        assert_eq!(
            three_clusters(EmbedderConfig::android()),
            [DisplayCall::OverlaySurface(
                OverlayId(0),
                xywh(0.0, 0.0, 50.0, 10.0)
            )]
        );
    }

    #[test]
    fn unbounded_config_keeps_every_region() {
        assert_eq!(three_clusters(EmbedderConfig::unbounded()).len(), 3);
    }

    #[test]
    fn regions_round_out_to_whole_pixels() {
        for (round_out, expected) in [
            (true, Rect::new(10.0, 10.0, 16.0, 16.0)),
            (false, Rect::new(10.5, 10.5, 15.75, 15.75)),
        ] {
            let mut h = harness(EmbedderConfig {
                round_out_overlays: round_out,
                ..EmbedderConfig::default()
            });
            let merger = merger_on_platform();
            merger.merge_with_lease(1);
            h.coordinator
                .begin_frame(PixelSize::new(50, 50), &MutatorsStack::new(), 1.0, &merger);
            h.coordinator
                .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 50.0, 50.0));
            fill(
                &mut h.coordinator,
                ViewId(0),
                Rect::new(10.5, 10.5, 15.75, 15.75),
            );
            let (frame, _) = capture_frame(PixelSize::new(50, 50), true);
            h.coordinator.submit_frame(CONTEXT, frame).unwrap();
            assert_eq!(
                h.display.calls().last(),
                Some(&DisplayCall::OverlaySurface(OverlayId(0), expected)),
                "round_out_overlays = {round_out}"
            );
        }
    }

    #[test]
    fn no_views_submits_background_only() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_raster();
        h.coordinator
            .begin_frame(PixelSize::new(10, 20), &MutatorsStack::new(), 1.0, &merger);
        let (mut frame, background) = capture_frame(PixelSize::new(10, 20), true);
        frame
            .canvas()
            .fill_rect(xywh(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        assert_eq!(h.coordinator.submit_frame(CONTEXT, frame), Ok(()));
        assert_eq!(background.lock().unwrap().len(), 1);
        assert!(h.display.calls().is_empty());
    }

    #[test]
    fn background_failure_is_reported() {
        let mut h = harness(EmbedderConfig::default());
        let merger = merger_on_platform();
        merger.merge_with_lease(1);
        h.coordinator
            .begin_frame(PixelSize::new(10, 20), &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 5.0, 5.0));
        let (frame, _) = capture_frame(PixelSize::new(10, 20), false);
        assert_eq!(
            h.coordinator.submit_frame(CONTEXT, frame),
            Err(SubmitError::Background)
        );
        assert_eq!(h.display.calls(), [DisplayCall::FrameBegin]);
    }

    fn submit_one_overlay(h: &mut Harness) -> Result<(), SubmitError> {
        let merger = merger_on_platform();
        merger.merge_with_lease(1);
        h.coordinator
            .begin_frame(PixelSize::new(50, 50), &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 50.0, 50.0));
        fill(&mut h.coordinator, ViewId(0), xywh(5.0, 5.0, 5.0, 5.0));
        let (frame, _) = capture_frame(PixelSize::new(50, 50), true);
        h.coordinator.submit_frame(CONTEXT, frame)
    }

    #[test]
    fn overlay_frame_failure_skips_overlay_display() {
        let mut h = harness(EmbedderConfig::default());
        h.factory.fail_frames(true);
        assert_eq!(
            submit_one_overlay(&mut h),
            Err(SubmitError::OverlayFrameUnavailable { slot: 0 })
        );
        assert_eq!(
            h.display
                .count(|c| matches!(c, DisplayCall::OverlaySurface(..))),
            0
        );
        assert_eq!(
            h.display
                .count(|c| matches!(c, DisplayCall::PlatformView(..))),
            1
        );
    }

    #[test]
    fn overlay_submit_failure_skips_overlay_display() {
        let mut h = harness(EmbedderConfig::default());
        h.factory.fail_submit(true);
        assert_eq!(
            submit_one_overlay(&mut h),
            Err(SubmitError::OverlaySubmit { slot: 0 })
        );
        assert_eq!(
            h.display
                .count(|c| matches!(c, DisplayCall::OverlaySurface(..))),
            0
        );
    }

    #[test]
    fn failed_submit_is_not_repeated_in_the_same_frame() {
        let mut h = harness(EmbedderConfig::default());
        h.factory.fail_frames(true);
        assert_eq!(
            submit_one_overlay(&mut h),
            Err(SubmitError::OverlayFrameUnavailable { slot: 0 })
        );
        let calls = h.display.calls();

        let (frame, background) = capture_frame(PixelSize::new(50, 50), true);
        assert_eq!(
            h.coordinator.submit_frame(CONTEXT, frame),
            Err(SubmitError::AlreadySubmitted)
        );
        assert_eq!(h.display.calls(), calls, "no display call on the second submit");
        assert!(
            background.lock().unwrap().is_empty(),
            "the second frame is dropped unsubmitted"
        );
    }

    #[test]
    fn successful_submit_is_not_repeated_in_the_same_frame() {
        let mut h = harness(EmbedderConfig::default());
        submit_one_overlay(&mut h).unwrap();
        let calls = h.display.calls();

        let (frame, _) = capture_frame(PixelSize::new(50, 50), true);
        assert_eq!(
            h.coordinator.submit_frame(CONTEXT, frame),
            Err(SubmitError::AlreadySubmitted)
        );
        assert_eq!(h.display.calls(), calls);
    }

    #[test]
    fn frame_after_a_failed_submit_presents_again() {
        let mut h = harness(EmbedderConfig::default());
        h.factory.fail_frames(true);
        assert!(submit_one_overlay(&mut h).is_err());
        h.coordinator.end_frame(&merger_on_platform());

        h.factory.fail_frames(false);
        assert_eq!(submit_one_overlay(&mut h), Ok(()));
        assert_eq!(
            h.display
                .count(|c| matches!(c, DisplayCall::OverlaySurface(..))),
            1
        );
    }

    #[test]
    fn invalid_overlay_is_recreated_next_frame() {
        let mut h = harness(EmbedderConfig::default());
        submit_one_overlay(&mut h).unwrap();
        h.coordinator.end_frame(&merger_on_platform());
        h.factory.invalidate(0);
        h.display.take_calls();

        submit_one_overlay(&mut h).unwrap();
        assert_eq!(h.factory.created(), 2);
        assert_eq!(
            h.display.calls()[2..],
            [
                DisplayCall::CreateOverlay(OverlayId(1)),
                DisplayCall::OverlaySurface(OverlayId(1), xywh(5.0, 5.0, 5.0, 5.0)),
            ]
        );
    }

    #[test]
    fn new_render_context_rebinds_pooled_surface() {
        let mut h = harness(EmbedderConfig::default());
        submit_one_overlay(&mut h).unwrap();
        h.coordinator.end_frame(&merger_on_platform());

        let merger = merger_on_platform();
        merger.merge_with_lease(1);
        let other = Some(RenderContextId(2));
        h.coordinator
            .begin_frame(PixelSize::new(50, 50), &MutatorsStack::new(), 1.0, &merger);
        h.coordinator
            .preroll_composite_embedded_view(ViewId(0), params(0.0, 0.0, 50.0, 50.0));
        fill(&mut h.coordinator, ViewId(0), xywh(5.0, 5.0, 5.0, 5.0));
        let (frame, _) = capture_frame(PixelSize::new(50, 50), true);
        h.coordinator.submit_frame(other, frame).unwrap();
        assert_eq!(h.factory.bindings(0), [CONTEXT, other]);
        assert_eq!(h.factory.created(), 1);
    }

    #[test]
    fn destroy_surfaces_needs_platform_privileges() {
        let mut h = harness(EmbedderConfig::default());
        submit_one_overlay(&mut h).unwrap();
        assert_eq!(h.coordinator.pool().len(), 1);

        assert!(!h.coordinator.destroy_surfaces(&merger_on_raster()));
        assert_eq!(h.coordinator.pool().len(), 1);

        assert!(h.coordinator.destroy_surfaces(&merger_on_platform()));
        assert!(h.coordinator.pool().is_empty());
        assert_eq!(h.display.calls().last(), Some(&DisplayCall::DestroyOverlays));
    }

    #[test]
    fn root_mutators_are_kept_for_the_frame() {
        let mut h = harness(EmbedderConfig::default());
        let mut mutators = MutatorsStack::new();
        mutators.push(crate::view::Mutator::Opacity(0.5));
        h.coordinator
            .begin_frame(PixelSize::new(10, 10), &mutators, 2.0, &merger_on_raster());
        assert_eq!(h.coordinator.root_mutators(), &mutators);
        assert_eq!(h.coordinator.views().device_pixel_ratio(), 2.0);
        assert!(h.coordinator.is_frame_open());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn submit_trace_reports_composition_changes() {
        use crate::trace::SharedSink;

        #[derive(Default)]
        struct Submits(Vec<(bool, SubmitOutcome)>);
        impl TraceSink for Submits {
            fn on_submit(&mut self, e: &SubmitEvent) {
                self.0.push((e.composition_changed, e.outcome));
            }
        }

        let mut h = harness(EmbedderConfig::default());
        let log = SharedSink::new(Submits::default());
        h.coordinator.set_trace_sink(Some(Box::new(log.clone())));
        let merger = merger_on_platform();
        merger.merge_with_lease(DEFAULT_MERGED_LEASE_FRAMES);
        for order in [[0, 1], [0, 1], [1, 0]] {
            h.coordinator
                .begin_frame(PixelSize::new(100, 100), &MutatorsStack::new(), 1.0, &merger);
            for id in order {
                let x = if id == 0 { 0.0 } else { 50.0 };
                h.coordinator
                    .preroll_composite_embedded_view(ViewId(id), params(x, 0.0, 10.0, 10.0));
            }
            let (frame, _) = capture_frame(PixelSize::new(100, 100), true);
            h.coordinator.submit_frame(CONTEXT, frame).unwrap();
            h.coordinator.end_frame(&merger);
        }

        assert_eq!(
            log.with(|l| l.0.clone()),
            [
                (true, SubmitOutcome::Presented),
                (false, SubmitOutcome::Presented),
                (true, SubmitOutcome::Presented),
            ],
            "first frame and reorder recompose"
        );
    }

    #[cfg(feature = "trace")]
    #[test]
    fn lifecycle_is_traced() {
        use crate::trace::SharedSink;

        #[derive(Default)]
        struct Log(Vec<&'static str>);
        impl TraceSink for Log {
            fn on_frame_begin(&mut self, _: &FrameBeginEvent) {
                self.0.push("begin");
            }
            fn on_view_preroll(&mut self, _: &ViewPrerollEvent) {
                self.0.push("preroll");
            }
            fn on_post_preroll(&mut self, _: &PostPrerollEvent) {
                self.0.push("post-preroll");
            }
            fn on_view_display(&mut self, _: &ViewDisplayEvent) {
                self.0.push("view");
            }
            fn on_overlay_acquire(&mut self, _: &OverlayAcquireEvent) {
                self.0.push("acquire");
            }
            fn on_overlay_display(&mut self, _: &OverlayDisplayEvent) {
                self.0.push("overlay");
            }
            fn on_view_change(&mut self, _: &ViewChangeEvent) {
                self.0.push("change");
            }
            fn on_submit(&mut self, _: &SubmitEvent) {
                self.0.push("submit");
            }
            fn on_lease(&mut self, _: &LeaseEvent) {
                self.0.push("lease");
            }
            fn on_frame_end(&mut self, _: &FrameEndEvent) {
                self.0.push("end");
            }
        }

        let mut h = harness(EmbedderConfig::default());
        let log = SharedSink::new(Log::default());
        h.coordinator.set_trace_sink(Some(Box::new(log.clone())));
        let merger = merger_on_platform();
        merger.merge_with_lease(DEFAULT_MERGED_LEASE_FRAMES);
        run_recycle_frame(&mut h, &merger);

        assert_eq!(
            log.with(|l| l.0.clone()),
            [
                "begin",
                "preroll",
                "lease",
                "post-preroll",
                "view",
                "acquire",
                "overlay",
                "change",
                "submit",
                "lease",
                "end",
            ]
        );
    }
}
