// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. Every record starts with a
//! tag byte and a sequence number that orders events across frames, since
//! the coordinator itself carries no clock. [`decode`] reads the records
//! back as an iterator of [`Record`].

use inlay_core::backend::OverlayId;
use inlay_core::canvas::PixelSize;
use inlay_core::embedder::PostPrerollResult;
use inlay_core::merger::LeaseStatus;
use inlay_core::pool::Acquisition;
use inlay_core::trace::{
    FrameBeginEvent, FrameCancelEvent, FrameEndEvent, LeaseEvent, LeaseOp, OverlayAcquireEvent,
    OverlayDisplayEvent, PostPrerollEvent, SubmitEvent, SubmitOutcome, TraceSink,
    ViewChangeEvent, ViewChangeKind, ViewDisplayEvent, ViewPrerollEvent,
};
use inlay_core::view::ViewId;
use kurbo::Rect;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_VIEW_PREROLL: u8 = 2;
const TAG_POST_PREROLL: u8 = 3;
const TAG_OVERLAY_ACQUIRE: u8 = 4;
const TAG_VIEW_DISPLAY: u8 = 5;
const TAG_OVERLAY_DISPLAY: u8 = 6;
const TAG_VIEW_CHANGE: u8 = 7;
const TAG_SUBMIT: u8 = 8;
const TAG_LEASE: u8 = 9;
const TAG_FRAME_END: u8 = 10;
const TAG_FRAME_CANCEL: u8 = 11;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
    sequence: u64,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Number of events recorded so far.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.sequence
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence == 0
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(&mut self, tag: u8, frame_index: u64) {
        self.write_u8(tag);
        self.write_u64(self.sequence);
        self.sequence += 1;
        self.write_u64(frame_index);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_rect(&mut self, r: Rect) {
        self.write_f64(r.x0);
        self.write_f64(r.y0);
        self.write_f64(r.x1);
        self.write_f64(r.y1);
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.begin(TAG_FRAME_BEGIN, e.frame_index);
        self.write_u32(e.frame_size.width);
        self.write_u32(e.frame_size.height);
        self.write_f64(e.device_pixel_ratio);
        self.write_bool(e.notified);
    }

    fn on_view_preroll(&mut self, e: &ViewPrerollEvent) {
        self.begin(TAG_VIEW_PREROLL, e.frame_index);
        self.write_i64(e.view.0);
        self.write_rect(e.rect);
        self.write_u32(e.index);
        self.write_bool(e.first);
    }

    fn on_post_preroll(&mut self, e: &PostPrerollEvent) {
        self.begin(TAG_POST_PREROLL, e.frame_index);
        self.write_u32(e.view_count);
        self.write_u8(match e.result {
            PostPrerollResult::Success => 0,
            PostPrerollResult::ResubmitFrame => 1,
        });
    }

    fn on_overlay_acquire(&mut self, e: &OverlayAcquireEvent) {
        self.begin(TAG_OVERLAY_ACQUIRE, e.frame_index);
        self.write_u32(e.slot);
        self.write_i64(e.overlay.0);
        self.write_u8(match e.acquisition {
            Acquisition::Reused => 0,
            Acquisition::Created => 1,
            Acquisition::Replaced => 2,
        });
    }

    fn on_view_display(&mut self, e: &ViewDisplayEvent) {
        self.begin(TAG_VIEW_DISPLAY, e.frame_index);
        self.write_i64(e.view.0);
        self.write_rect(e.rect);
    }

    fn on_overlay_display(&mut self, e: &OverlayDisplayEvent) {
        self.begin(TAG_OVERLAY_DISPLAY, e.frame_index);
        self.write_u32(e.slot);
        self.write_i64(e.overlay.0);
        self.write_i64(e.view.0);
        self.write_rect(e.rect);
    }

    fn on_view_change(&mut self, e: &ViewChangeEvent) {
        self.begin(TAG_VIEW_CHANGE, e.frame_index);
        self.write_i64(e.view.0);
        self.write_u8(match e.kind {
            ViewChangeKind::Added => 0,
            ViewChangeKind::Moved => 1,
            ViewChangeKind::Mutated => 2,
            ViewChangeKind::Removed => 3,
        });
    }

    fn on_submit(&mut self, e: &SubmitEvent) {
        self.begin(TAG_SUBMIT, e.frame_index);
        self.write_u32(e.view_count);
        self.write_u32(e.overlay_count);
        self.write_bool(e.composition_changed);
        self.write_u8(match e.outcome {
            SubmitOutcome::Presented => 0,
            SubmitOutcome::BackgroundOnly => 1,
            SubmitOutcome::Deferred => 2,
            SubmitOutcome::Failed => 3,
        });
    }

    fn on_lease(&mut self, e: &LeaseEvent) {
        self.begin(TAG_LEASE, e.frame_index);
        self.write_u8(match e.op {
            LeaseOp::Merge => 0,
            LeaseOp::Extend => 1,
            LeaseOp::Decrement => 2,
        });
        self.write_u8(match e.status {
            LeaseStatus::Split => 0,
            LeaseStatus::MergedNow => 1,
            LeaseStatus::RemainsMerged => 2,
            LeaseStatus::SplitNow => 3,
        });
        self.write_u32(e.remaining);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.begin(TAG_FRAME_END, e.frame_index);
        self.write_bool(e.notified);
        self.write_bool(e.merged);
    }

    fn on_frame_cancel(&mut self, e: &FrameCancelEvent) {
        self.begin(TAG_FRAME_CANCEL, e.frame_index);
        self.write_u32(e.discarded_views);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`ViewPrerollEvent`].
    ViewPreroll(ViewPrerollEvent),
    /// A [`PostPrerollEvent`].
    PostPreroll(PostPrerollEvent),
    /// An [`OverlayAcquireEvent`].
    OverlayAcquire(OverlayAcquireEvent),
    /// A [`ViewDisplayEvent`].
    ViewDisplay(ViewDisplayEvent),
    /// An [`OverlayDisplayEvent`].
    OverlayDisplay(OverlayDisplayEvent),
    /// A [`ViewChangeEvent`].
    ViewChange(ViewChangeEvent),
    /// A [`SubmitEvent`].
    Submit(SubmitEvent),
    /// A [`LeaseEvent`].
    Lease(LeaseEvent),
    /// A [`FrameEndEvent`].
    FrameEnd(FrameEndEvent),
    /// A [`FrameCancelEvent`].
    FrameCancel(FrameCancelEvent),
}

impl RecordedEvent {
    /// Frame counter carried by the event.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::FrameBegin(e) => e.frame_index,
            Self::ViewPreroll(e) => e.frame_index,
            Self::PostPreroll(e) => e.frame_index,
            Self::OverlayAcquire(e) => e.frame_index,
            Self::ViewDisplay(e) => e.frame_index,
            Self::OverlayDisplay(e) => e.frame_index,
            Self::ViewChange(e) => e.frame_index,
            Self::Submit(e) => e.frame_index,
            Self::Lease(e) => e.frame_index,
            Self::FrameEnd(e) => e.frame_index,
            Self::FrameCancel(e) => e.frame_index,
        }
    }
}

/// One decoded record.
#[derive(Clone, Copy, Debug)]
pub struct Record {
    /// Position of the event in the recording, starting at 0.
    pub sequence: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded records.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        let [v] = self.take::<1>()?;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_i64(&mut self) -> Option<i64> {
        self.take().map(i64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_rect(&mut self) -> Option<Rect> {
        Some(Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        ))
    }

    fn read_view(&mut self) -> Option<ViewId> {
        self.read_i64().map(ViewId)
    }

    fn read_overlay(&mut self) -> Option<OverlayId> {
        self.read_i64().map(OverlayId)
    }

    fn decode_event(&mut self, tag: u8, frame_index: u64) -> Option<RecordedEvent> {
        Some(match tag {
            TAG_FRAME_BEGIN => RecordedEvent::FrameBegin(FrameBeginEvent {
                frame_index,
                frame_size: PixelSize::new(self.read_u32()?, self.read_u32()?),
                device_pixel_ratio: self.read_f64()?,
                notified: self.read_bool()?,
            }),
            TAG_VIEW_PREROLL => RecordedEvent::ViewPreroll(ViewPrerollEvent {
                frame_index,
                view: self.read_view()?,
                rect: self.read_rect()?,
                index: self.read_u32()?,
                first: self.read_bool()?,
            }),
            TAG_POST_PREROLL => RecordedEvent::PostPreroll(PostPrerollEvent {
                frame_index,
                view_count: self.read_u32()?,
                result: match self.read_u8()? {
                    0 => PostPrerollResult::Success,
                    1 => PostPrerollResult::ResubmitFrame,
                    _ => return None,
                },
            }),
            TAG_OVERLAY_ACQUIRE => RecordedEvent::OverlayAcquire(OverlayAcquireEvent {
                frame_index,
                slot: self.read_u32()?,
                overlay: self.read_overlay()?,
                acquisition: match self.read_u8()? {
                    0 => Acquisition::Reused,
                    1 => Acquisition::Created,
                    2 => Acquisition::Replaced,
                    _ => return None,
                },
            }),
            TAG_VIEW_DISPLAY => RecordedEvent::ViewDisplay(ViewDisplayEvent {
                frame_index,
                view: self.read_view()?,
                rect: self.read_rect()?,
            }),
            TAG_OVERLAY_DISPLAY => RecordedEvent::OverlayDisplay(OverlayDisplayEvent {
                frame_index,
                slot: self.read_u32()?,
                overlay: self.read_overlay()?,
                view: self.read_view()?,
                rect: self.read_rect()?,
            }),
            TAG_VIEW_CHANGE => RecordedEvent::ViewChange(ViewChangeEvent {
                frame_index,
                view: self.read_view()?,
                kind: match self.read_u8()? {
                    0 => ViewChangeKind::Added,
                    1 => ViewChangeKind::Moved,
                    2 => ViewChangeKind::Mutated,
                    3 => ViewChangeKind::Removed,
                    _ => return None,
                },
            }),
            TAG_SUBMIT => RecordedEvent::Submit(SubmitEvent {
                frame_index,
                view_count: self.read_u32()?,
                overlay_count: self.read_u32()?,
                composition_changed: self.read_bool()?,
                outcome: match self.read_u8()? {
                    0 => SubmitOutcome::Presented,
                    1 => SubmitOutcome::BackgroundOnly,
                    2 => SubmitOutcome::Deferred,
                    3 => SubmitOutcome::Failed,
                    _ => return None,
                },
            }),
            TAG_LEASE => RecordedEvent::Lease(LeaseEvent {
                frame_index,
                op: match self.read_u8()? {
                    0 => LeaseOp::Merge,
                    1 => LeaseOp::Extend,
                    2 => LeaseOp::Decrement,
                    _ => return None,
                },
                status: match self.read_u8()? {
                    0 => LeaseStatus::Split,
                    1 => LeaseStatus::MergedNow,
                    2 => LeaseStatus::RemainsMerged,
                    3 => LeaseStatus::SplitNow,
                    _ => return None,
                },
                remaining: self.read_u32()?,
            }),
            TAG_FRAME_END => RecordedEvent::FrameEnd(FrameEndEvent {
                frame_index,
                notified: self.read_bool()?,
                merged: self.read_bool()?,
            }),
            TAG_FRAME_CANCEL => RecordedEvent::FrameCancel(FrameCancelEvent {
                frame_index,
                discarded_views: self.read_u32()?,
            }),
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let sequence = self.read_u64()?;
        let frame_index = self.read_u64()?;
        let event = self.decode_event(tag, frame_index)?;
        Some(Record { sequence, event })
    }
}

/// Feeds every event of a recording to `sink`, in order.
///
/// Useful to pretty-print a recording after the fact, or to fan one
/// recording out to several sinks.
pub fn replay(bytes: &[u8], sink: &mut dyn TraceSink) {
    for record in decode(bytes) {
        match record.event {
            RecordedEvent::FrameBegin(e) => sink.on_frame_begin(&e),
            RecordedEvent::ViewPreroll(e) => sink.on_view_preroll(&e),
            RecordedEvent::PostPreroll(e) => sink.on_post_preroll(&e),
            RecordedEvent::OverlayAcquire(e) => sink.on_overlay_acquire(&e),
            RecordedEvent::ViewDisplay(e) => sink.on_view_display(&e),
            RecordedEvent::OverlayDisplay(e) => sink.on_overlay_display(&e),
            RecordedEvent::ViewChange(e) => sink.on_view_change(&e),
            RecordedEvent::Submit(e) => sink.on_submit(&e),
            RecordedEvent::Lease(e) => sink.on_lease(&e),
            RecordedEvent::FrameEnd(e) => sink.on_frame_end(&e),
            RecordedEvent::FrameCancel(e) => sink.on_frame_cancel(&e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
