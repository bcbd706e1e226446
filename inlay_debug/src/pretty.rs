// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Rects are
//! printed as `x,y wxh` in device pixels.

use std::io::Write;

use inlay_core::trace::{
    FrameBeginEvent, FrameCancelEvent, FrameEndEvent, LeaseEvent, OverlayAcquireEvent,
    OverlayDisplayEvent, PostPrerollEvent, SubmitEvent, TraceSink, ViewChangeEvent,
    ViewDisplayEvent, ViewPrerollEvent,
};
use kurbo::Rect;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

struct Px(Rect);

impl std::fmt::Display for Px {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = self.0;
        write!(f, "{},{} {}x{}", r.x0, r.y0, r.width(), r.height())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:begin] frame={} size={}x{} dpr={} notified={}",
            e.frame_index, e.frame_size.width, e.frame_size.height, e.device_pixel_ratio, e.notified,
        );
    }

    fn on_view_preroll(&mut self, e: &ViewPrerollEvent) {
        let verb = if e.first { "add" } else { "update" };
        let _ = writeln!(
            self.writer,
            "[preroll] frame={} view={} {verb} index={} rect={}",
            e.frame_index,
            e.view.0,
            e.index,
            Px(e.rect),
        );
    }

    fn on_post_preroll(&mut self, e: &PostPrerollEvent) {
        let _ = writeln!(
            self.writer,
            "[post-preroll] frame={} views={} result={:?}",
            e.frame_index, e.view_count, e.result,
        );
    }

    fn on_overlay_acquire(&mut self, e: &OverlayAcquireEvent) {
        let _ = writeln!(
            self.writer,
            "[overlay:acquire] frame={} slot={} overlay={} {:?}",
            e.frame_index, e.slot, e.overlay.0, e.acquisition,
        );
    }

    fn on_view_display(&mut self, e: &ViewDisplayEvent) {
        let _ = writeln!(
            self.writer,
            "[display:view] frame={} view={} rect={}",
            e.frame_index,
            e.view.0,
            Px(e.rect),
        );
    }

    fn on_overlay_display(&mut self, e: &OverlayDisplayEvent) {
        let _ = writeln!(
            self.writer,
            "[display:overlay] frame={} overlay={} view={} rect={}",
            e.frame_index,
            e.overlay.0,
            e.view.0,
            Px(e.rect),
        );
    }

    fn on_view_change(&mut self, e: &ViewChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[change] frame={} view={} {:?}",
            e.frame_index, e.view.0, e.kind,
        );
    }

    fn on_submit(&mut self, e: &SubmitEvent) {
        let _ = writeln!(
            self.writer,
            "[submit] frame={} views={} overlays={} recomposed={} {:?}",
            e.frame_index, e.view_count, e.overlay_count, e.composition_changed, e.outcome,
        );
    }

    fn on_lease(&mut self, e: &LeaseEvent) {
        let _ = writeln!(
            self.writer,
            "[lease] frame={} {:?} -> {:?} remaining={}",
            e.frame_index, e.op, e.status, e.remaining,
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        let merged = if e.merged { "merged" } else { "split" };
        let _ = writeln!(
            self.writer,
            "[frame:end] frame={} notified={} threads={merged}",
            e.frame_index, e.notified,
        );
    }

    fn on_frame_cancel(&mut self, e: &FrameCancelEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:cancel] frame={} discarded={}",
            e.frame_index, e.discarded_views,
        );
    }
}
