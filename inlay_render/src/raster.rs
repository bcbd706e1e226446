// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replays recorded draw ops with `vello_cpu`.
//!
//! Fills are anti-aliased: rects on whole pixels cover their pixels exactly,
//! fractional edges get partial coverage. Translation becomes the context
//! transform and each clip-out becomes a clip layer whose path is the canvas
//! bounds with the excluded rect cut out of it. Layers are popped again on
//! `Restore` and at the end of a replayed picture.
//!
//! An unclipped `Clear` discards everything drawn before it. Inside a
//! clip-out it paints over earlier content instead, which only differs for
//! translucent colors.

use std::sync::Arc;

use inlay_core::canvas::{Color, DrawOp, Picture, PixelSize};
use kurbo::{Rect, Vec2};
use vello_cpu::RenderContext;
use vello_cpu::kurbo as vk;
use vello_cpu::peniko::{Fill, ImageQuality, ImageSampler};

use crate::Pixmap;
use crate::pixmap::{dimensions, paint};

/// Draws pictures, solid rects and pixmaps into one image.
pub struct Rasterizer {
    /// `None` for an empty canvas, which has nothing to draw into.
    ctx: Option<RenderContext>,
    size: PixelSize,
    clip_depth: usize,
}

impl core::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("size", &self.size)
            .field("clip_depth", &self.clip_depth)
            .finish_non_exhaustive()
    }
}

impl Rasterizer {
    /// Creates a transparent canvas of `size`.
    #[must_use]
    pub fn new(size: PixelSize) -> Self {
        let (width, height) = dimensions(size);
        let ctx = (width > 0 && height > 0).then(|| RenderContext::new(width, height));
        Self {
            ctx,
            size: PixelSize::new(u32::from(width), u32::from(height)),
            clip_depth: 0,
        }
    }

    /// Canvas dimensions.
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Blends a solid `rect` over the canvas.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill(Vec2::ZERO, rect, color);
    }

    /// Blends the top-left corner of `pixmap` over `rect`.
    ///
    /// `rect` is rounded to whole pixels and the drawn block is cut to the
    /// smaller of `rect` and `pixmap`.
    pub fn draw_pixmap(&mut self, pixmap: &Pixmap, rect: Rect) {
        let Some(ctx) = &mut self.ctx else {
            return;
        };
        let rect = rect.abs().round();
        let source = pixmap.size();
        let width = rect.width().min(f64::from(source.width));
        let height = rect.height().min(f64::from(source.height));
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let image = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap.as_vello().clone())),
            sampler: ImageSampler {
                quality: ImageQuality::Low,
                ..ImageSampler::default()
            },
        };
        ctx.set_transform(vk::Affine::translate(vk::Vec2::new(rect.x0, rect.y0)));
        ctx.set_paint_transform(vk::Affine::IDENTITY);
        ctx.set_paint(image);
        ctx.fill_rect(&vk::Rect::new(0.0, 0.0, width, height));
    }

    /// Replays `picture` untranslated. Clip state set inside the picture
    /// does not outlive it.
    pub fn draw_picture(&mut self, picture: &Picture) {
        self.replay(picture.ops(), Vec2::ZERO);
    }

    /// Renders everything drawn so far.
    #[must_use]
    pub fn finish(mut self) -> Pixmap {
        self.pop_clips(0);
        let mut out = Pixmap::new(self.size);
        if let Some(ctx) = &mut self.ctx {
            ctx.flush();
            ctx.render_to_pixmap(out.as_vello_mut());
        }
        out
    }

    fn replay(&mut self, ops: &[DrawOp], mut offset: Vec2) {
        let base_depth = self.clip_depth;
        let mut saved: Vec<(Vec2, usize)> = Vec::new();
        for op in ops {
            match op {
                DrawOp::Clear(color) => self.clear(*color),
                DrawOp::FillRect { rect, color } => self.fill(offset, *rect, *color),
                DrawOp::Translate(delta) => offset += *delta,
                DrawOp::Save => saved.push((offset, self.clip_depth)),
                DrawOp::Restore => {
                    if let Some((previous, depth)) = saved.pop() {
                        offset = previous;
                        self.pop_clips(depth);
                    }
                }
                DrawOp::ClipOutRect(rect) => self.clip_out(*rect + offset),
                DrawOp::DrawPicture(picture) => self.replay(picture.ops(), offset),
            }
        }
        self.pop_clips(base_depth);
    }

    fn fill(&mut self, offset: Vec2, rect: Rect, color: Color) {
        let Some(ctx) = &mut self.ctx else {
            return;
        };
        if color.a == 0 {
            return;
        }
        let rect = rect.abs();
        ctx.set_transform(vk::Affine::translate(vk::Vec2::new(offset.x, offset.y)));
        ctx.set_paint(paint(color));
        ctx.fill_rect(&vk::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1));
    }

    fn clear(&mut self, color: Color) {
        if self.clip_depth == 0 {
            if let Some(ctx) = &mut self.ctx {
                ctx.reset();
            }
        }
        self.fill(Vec2::ZERO, self.bounds(), color);
    }

    fn clip_out(&mut self, rect: Rect) {
        let bounds = self.bounds().inflate(1.0, 1.0);
        let Some(ctx) = &mut self.ctx else {
            return;
        };
        let hole = rect.abs();
        // The hole winds against the bounds, so it stays out under either
        // fill rule.
        let mut path = vk::BezPath::new();
        path.move_to(vk::Point::new(bounds.x0, bounds.y0));
        path.line_to(vk::Point::new(bounds.x1, bounds.y0));
        path.line_to(vk::Point::new(bounds.x1, bounds.y1));
        path.line_to(vk::Point::new(bounds.x0, bounds.y1));
        path.close_path();
        path.move_to(vk::Point::new(hole.x0, hole.y0));
        path.line_to(vk::Point::new(hole.x0, hole.y1));
        path.line_to(vk::Point::new(hole.x1, hole.y1));
        path.line_to(vk::Point::new(hole.x1, hole.y0));
        path.close_path();

        ctx.set_transform(vk::Affine::IDENTITY);
        ctx.set_fill_rule(Fill::EvenOdd);
        ctx.push_clip_layer(&path);
        self.clip_depth += 1;
    }

    fn pop_clips(&mut self, depth: usize) {
        let Some(ctx) = &mut self.ctx else {
            self.clip_depth = depth.min(self.clip_depth);
            return;
        };
        while self.clip_depth > depth {
            ctx.pop_layer();
            self.clip_depth -= 1;
        }
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.size.width),
            f64::from(self.size.height),
        )
    }
}

/// Rasterizes `picture` into a new pixmap of the picture's size.
#[must_use]
pub fn rasterize(picture: &Picture) -> Pixmap {
    let mut rasterizer = Rasterizer::new(picture.size());
    rasterizer.draw_picture(picture);
    rasterizer.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
