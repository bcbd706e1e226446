// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RGBA8 pixel buffers.

use inlay_core::canvas::{Color, PixelSize};

/// A premultiplied RGBA8 image, row major, top row first.
///
/// Wraps a [`vello_cpu::Pixmap`]. Dimensions are limited to `u16::MAX` on
/// each axis; larger sizes are clamped.
#[derive(Clone)]
pub struct Pixmap {
    inner: vello_cpu::Pixmap,
}

impl core::fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pixmap")
            .field("width", &self.inner.width())
            .field("height", &self.inner.height())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Pixmap {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Pixmap {}

impl Pixmap {
    /// Creates a transparent pixmap.
    #[must_use]
    pub fn new(size: PixelSize) -> Self {
        let (width, height) = dimensions(size);
        Self {
            inner: vello_cpu::Pixmap::new(width, height),
        }
    }

    /// Dimensions.
    #[inline]
    #[must_use]
    pub fn size(&self) -> PixelSize {
        PixelSize::new(u32::from(self.inner.width()), u32::from(self.inner.height()))
    }

    /// Pixel at `(x, y)` with straight alpha, or `None` outside the pixmap.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let [r, g, b, a] = *self.pixels().get(self.index(x, y)?)?;
        Some(unpremultiply(r, g, b, a))
    }

    /// Overwrites every pixel.
    pub fn fill(&mut self, color: Color) {
        let premul = premultiply(color);
        for px in self.inner.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }

    /// Premultiplied pixels as rows of RGBA quadruplets.
    #[must_use]
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(self.as_bytes())
    }

    /// Raw premultiplied RGBA8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.data_as_u8_slice()
    }

    /// Returns `true` if every pixel is fully transparent.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.pixels().iter().all(|p| p[3] == 0)
    }

    pub(crate) fn as_vello(&self) -> &vello_cpu::Pixmap {
        &self.inner
    }

    pub(crate) fn as_vello_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.inner
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        let size = self.size();
        (x < size.width && y < size.height).then(|| y as usize * size.width as usize + x as usize)
    }
}

/// Clamps `size` to the `u16` extent `vello_cpu` works in.
pub(crate) fn dimensions(size: PixelSize) -> (u16, u16) {
    (
        u16::try_from(size.width).unwrap_or(u16::MAX),
        u16::try_from(size.height).unwrap_or(u16::MAX),
    )
}

/// Converts `color` to the paint type `vello_cpu` draws with.
pub(crate) fn paint(color: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn premultiply(color: Color) -> [u8; 4] {
    let a = u16::from(color.a);
    let scale = |c: u8| u8::try_from((u16::from(c) * a + 127) / 255).unwrap_or(u8::MAX);
    [scale(color.r), scale(color.g), scale(color.b), color.a]
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> Color {
    if a == 0 {
        return Color::TRANSPARENT;
    }
    let a16 = u16::from(a);
    let scale =
        |c: u8| u8::try_from((u16::from(c) * 255 + a16 / 2) / a16).unwrap_or(u8::MAX);
    Color::rgba(scale(r), scale(g), scale(b), a)
}
