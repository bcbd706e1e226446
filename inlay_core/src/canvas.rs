// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording canvases, finished pictures, and the drawn-rect index.
//!
//! Scene content is never rasterized by the coordinator. It is recorded as a
//! list of [`DrawOp`]s so that the same content can be replayed into the
//! background frame and into any number of overlay surfaces. While
//! recording, every canvas keeps the device-space bounds of what it drew in
//! a [`DrawnRects`] index; overlay regions are computed from that index.

use std::sync::Arc;

use kurbo::{Rect, Size, Vec2};

/// Integer frame dimensions in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size as floating point.
    #[must_use]
    pub fn to_size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Creates a color from its components.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }
}

/// One recorded drawing command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Replace every pixel inside the current clip with `color`.
    Clear(Color),
    /// Fill a rect in local coordinates.
    FillRect {
        /// Rect in local coordinates.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// Translate subsequent commands.
    Translate(Vec2),
    /// Push translation and clip state.
    Save,
    /// Pop translation and clip state.
    Restore,
    /// Exclude a rect, in local coordinates, from subsequent drawing.
    ClipOutRect(Rect),
    /// Replay a picture at the current translation.
    DrawPicture(Arc<Picture>),
}

/// An immutable, replayable recording.
#[derive(Clone, Debug, PartialEq)]
pub struct Picture {
    size: PixelSize,
    ops: Vec<DrawOp>,
    drawn: DrawnRects,
}

impl Picture {
    /// Size of the canvas that recorded this picture.
    #[inline]
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Recorded commands.
    #[inline]
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Device-space bounds of everything drawn.
    #[inline]
    #[must_use]
    pub fn drawn_rects(&self) -> &DrawnRects {
        &self.drawn
    }

    /// Returns `true` if nothing was drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }
}

/// A canvas that records [`DrawOp`]s.
///
/// Bounds of fills and replayed pictures are collected in device space,
/// i.e. with the current translation applied. Clip-outs do not shrink the
/// recorded bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordingCanvas {
    size: PixelSize,
    ops: Vec<DrawOp>,
    drawn: DrawnRects,
    offset: Vec2,
    saved: Vec<Vec2>,
}

impl RecordingCanvas {
    /// Creates an empty canvas of `size`.
    #[must_use]
    pub fn new(size: PixelSize) -> Self {
        Self {
            size,
            ops: Vec::new(),
            drawn: DrawnRects::new(),
            offset: Vec2::ZERO,
            saved: Vec::new(),
        }
    }

    /// Canvas size.
    #[inline]
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Commands recorded so far.
    #[inline]
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Device-space bounds recorded so far.
    #[inline]
    #[must_use]
    pub fn drawn_rects(&self) -> &DrawnRects {
        &self.drawn
    }

    /// Current translation.
    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec2 {
        self.offset
    }

    /// Clears the clip area to `color`.
    pub fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }

    /// Fills `rect`, given in local coordinates.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.drawn.push(rect + self.offset);
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    /// Translates subsequent commands by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let delta = Vec2::new(dx, dy);
        self.offset += delta;
        self.ops.push(DrawOp::Translate(delta));
    }

    /// Saves translation and clip state.
    pub fn save(&mut self) {
        self.saved.push(self.offset);
        self.ops.push(DrawOp::Save);
    }

    /// Restores the last saved state. Unbalanced calls are ignored.
    pub fn restore(&mut self) {
        if let Some(offset) = self.saved.pop() {
            self.offset = offset;
            self.ops.push(DrawOp::Restore);
        }
    }

    /// Excludes `rect`, in local coordinates, from subsequent drawing.
    ///
    /// Clip-outs accumulate until the enclosing [`restore`](Self::restore).
    pub fn clip_out_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::ClipOutRect(rect));
    }

    /// Replays `picture` at the current translation.
    pub fn draw_picture(&mut self, picture: &Arc<Picture>) {
        for rect in picture.drawn.iter() {
            self.drawn.push(rect + self.offset);
        }
        self.ops.push(DrawOp::DrawPicture(Arc::clone(picture)));
    }

    /// Ends recording.
    #[must_use]
    pub fn finish(self) -> Picture {
        Picture {
            size: self.size,
            ops: self.ops,
            drawn: self.drawn,
        }
    }
}

/// Bounds of drawing operations, in recording order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawnRects {
    rects: Vec<Rect>,
}

impl DrawnRects {
    /// Creates an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Records `rect`. Rects without area are skipped.
    pub fn push(&mut self, rect: Rect) {
        let rect = rect.abs();
        if rect.area() > 0.0 {
            self.rects.push(rect);
        }
    }

    /// Recorded bounds.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Rect> + '_ {
        self.rects.iter().copied()
    }

    /// Number of recorded bounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Union of all recorded bounds.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.iter().reduce(|a, b| a.union(b))
    }

    /// Bounds intersecting `query`, with overlapping bounds merged.
    ///
    /// Each recorded rect that intersects `query` is joined into the first
    /// result it intersects; any later result that then intersects the
    /// grown rect is absorbed too. Rects that touch nothing start a new
    /// result. The returned rects are pairwise disjoint. Edge contact does
    /// not count as intersection.
    #[must_use]
    pub fn search_non_overlapping(&self, query: Rect) -> Vec<Rect> {
        let mut results: Vec<Rect> = Vec::new();
        for rect in self.iter().filter(|r| intersects(*r, query)) {
            let Some(first) = results.iter().position(|r| intersects(*r, rect)) else {
                results.push(rect);
                continue;
            };
            results[first] = results[first].union(rect);
            let mut i = first + 1;
            while i < results.len() {
                if intersects(results[i], results[first]) {
                    let absorbed = results.remove(i);
                    results[first] = results[first].union(absorbed);
                } else {
                    i += 1;
                }
            }
        }
        results
    }
}

/// Strict intersection: the overlap must have positive area.
#[must_use]
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0.max(b.x0) < a.x1.min(b.x1) && a.y0.max(b.y0) < a.y1.min(b.y1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
