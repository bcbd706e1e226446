// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! The recording has no wall clock, so each event's sequence number is used
//! as its timestamp: one microsecond per event. Frames become duration
//! slices, the merge lease becomes a counter track, and everything else is
//! an instant event.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use kurbo::Rect;
use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for record in decode(bytes) {
        let ts = record.sequence;
        match record.event {
            RecordedEvent::FrameBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "width": e.frame_size.width,
                        "height": e.frame_size.height,
                        "device_pixel_ratio": e.device_pixel_ratio,
                        "notified": e.notified,
                    }
                }));
            }
            RecordedEvent::FrameEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "merged": e.merged,
                    }
                }));
            }
            RecordedEvent::ViewPreroll(e) => {
                events.push(instant(
                    "ViewPreroll",
                    "Preroll",
                    ts,
                    json!({
                        "frame_index": e.frame_index,
                        "view": e.view.0,
                        "index": e.index,
                        "first": e.first,
                        "rect": rect_json(e.rect),
                    }),
                ));
            }
            RecordedEvent::PostPreroll(e) => {
                events.push(instant(
                    "PostPreroll",
                    "Preroll",
                    ts,
                    json!({
                        "frame_index": e.frame_index,
                        "view_count": e.view_count,
                        "result": format!("{:?}", e.result),
                    }),
                ));
            }
            RecordedEvent::OverlayAcquire(e) => {
                events.push(instant(
                    "OverlayAcquire",
                    "Pool",
                    ts,
                    json!({
                        "frame_index": e.frame_index,
                        "slot": e.slot,
                        "overlay": e.overlay.0,
                        "acquisition": format!("{:?}", e.acquisition),
                    }),
                ));
            }
            RecordedEvent::ViewDisplay(e) => {
                events.push(instant(
                    "ViewDisplay",
                    "Display",
                    ts,
                    json!({
                        "frame_index": e.frame_index,
                        "view": e.view.0,
                        "rect": rect_json(e.rect),
                    }),
                ));
            }
            RecordedEvent::OverlayDisplay(e) => {
                events.push(instant(
                    "OverlayDisplay",
                    "Display",
                    ts,
                    json!({
                        "frame_index": e.frame_index,
                        "slot": e.slot,
                        "overlay": e.overlay.0,
                        "view": e.view.0,
                        "rect": rect_json(e.rect),
                    }),
                ));
            }
            RecordedEvent::ViewChange(e) => {
                events.push(instant(
                    "ViewChange",
                    "Views",
                    ts,
                    json!({
                        "frame_index": e.frame_index,
                        "view": e.view.0,
                        "kind": format!("{:?}", e.kind),
                    }),
                ));
            }
            RecordedEvent::Submit(e) => {
                events.push(instant(
                    "Submit",
                    "Frame",
                    ts,
                    json!({
                        "frame_index": e.frame_index,
                        "view_count": e.view_count,
                        "overlay_count": e.overlay_count,
                        "composition_changed": e.composition_changed,
                        "outcome": format!("{:?}", e.outcome),
                    }),
                ));
            }
            RecordedEvent::Lease(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "MergeLease",
                    "cat": "Merger",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "remaining": e.remaining,
                    }
                }));
                events.push(instant(
                    "Lease",
                    "Merger",
                    ts,
                    json!({
                        "frame_index": e.frame_index,
                        "op": format!("{:?}", e.op),
                        "status": format!("{:?}", e.status),
                    }),
                ));
            }
            RecordedEvent::FrameCancel(e) => {
                events.push(instant(
                    "FrameCancel",
                    "Frame",
                    ts,
                    json!({
                        "frame_index": e.frame_index,
                        "discarded_views": e.discarded_views,
                    }),
                ));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: u64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn rect_json(r: Rect) -> Value {
    json!([r.x0, r.y0, r.width(), r.height()])
}
