// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory platform-view display.

use std::sync::{Mutex, MutexGuard, PoisonError};

use inlay_core::backend::{
    NativeWindow, OverlayId, OverlayMetadata, PlatformViewDisplay, SurfaceFrame,
};
use inlay_core::canvas::{Color, PixelSize};
use inlay_core::view::ViewId;
use inlay_render::{Pixmap, Rasterizer, WindowRegistry};
use kurbo::Rect;

/// One display call of a frame, in the order it was received.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Presented {
    /// A native view placed at `rect`.
    View {
        /// View id.
        view: ViewId,
        /// Device-pixel bounds.
        rect: Rect,
    },
    /// An overlay window shown at `rect`.
    Overlay {
        /// Overlay id.
        overlay: OverlayId,
        /// Device-pixel bounds.
        rect: Rect,
    },
}

#[derive(Debug, Default)]
struct State {
    background: Option<NativeWindow>,
    overlays: Vec<OverlayMetadata>,
    next_overlay: i64,
    current: Vec<Presented>,
    last: Vec<Presented>,
    frames_begun: u64,
    frames_ended: u64,
    overlays_created: u64,
}

/// Platform-view display that keeps everything in memory.
///
/// Overlay windows are opened in the shared [`WindowRegistry`], so a
/// [`SoftwareSurfaceFactory`](inlay_render::SoftwareSurfaceFactory) over the
/// same registry can draw into them. Overlay ids increase monotonically and
/// are never reused, even across
/// [`destroy_overlay_surfaces`](PlatformViewDisplay::destroy_overlay_surfaces).
pub struct HeadlessDisplay {
    registry: WindowRegistry,
    state: Mutex<State>,
}

impl core::fmt::Debug for HeadlessDisplay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.lock();
        f.debug_struct("HeadlessDisplay")
            .field("overlays", &state.overlays.len())
            .field("frames_ended", &state.frames_ended)
            .finish_non_exhaustive()
    }
}

impl HeadlessDisplay {
    /// Creates a display whose windows live in `registry`.
    #[must_use]
    pub fn new(registry: WindowRegistry) -> Self {
        Self {
            registry,
            state: Mutex::new(State::default()),
        }
    }

    /// Registry holding the background and overlay windows.
    #[must_use]
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// A frame of `size` for the background window, opening the window on
    /// first use.
    #[must_use]
    pub fn background_frame(&self, size: PixelSize) -> SurfaceFrame {
        let mut state = self.lock();
        let window = match state.background {
            Some(window) if self.registry.contains(window) => window,
            _ => {
                let window = self.registry.open_window(size);
                state.background = Some(window);
                window
            }
        };
        self.registry.frame_for(window, size)
    }

    /// Content last presented into the background window.
    #[must_use]
    pub fn background(&self) -> Option<Pixmap> {
        let window = self.lock().background?;
        self.registry.pixmap(window)
    }

    /// Display calls of the last completed frame.
    #[must_use]
    pub fn presented(&self) -> Vec<Presented> {
        self.lock().last.clone()
    }

    /// Number of `on_frame_begin` calls.
    #[must_use]
    pub fn frames_begun(&self) -> u64 {
        self.lock().frames_begun
    }

    /// Number of `on_frame_end` calls.
    #[must_use]
    pub fn frames_ended(&self) -> u64 {
        self.lock().frames_ended
    }

    /// Number of overlay windows created over the display's lifetime.
    #[must_use]
    pub fn overlays_created(&self) -> u64 {
        self.lock().overlays_created
    }

    /// Number of overlay windows currently alive.
    #[must_use]
    pub fn live_overlays(&self) -> usize {
        self.lock().overlays.len()
    }

    /// Window backing `overlay`, if it is alive.
    #[must_use]
    pub fn overlay_window(&self, overlay: OverlayId) -> Option<NativeWindow> {
        self.lock()
            .overlays
            .iter()
            .find(|m| m.id == overlay)
            .map(|m| m.window)
    }

    /// Flattens the last completed frame into one image of `size`.
    ///
    /// The background window is drawn first. Each presented item is then
    /// stacked in call order: a view as a solid [`placeholder_color`] rect,
    /// an overlay as the top-left corner of its window drawn at its rect.
    /// Overlays whose window is gone are skipped.
    #[must_use]
    pub fn compose(&self, size: PixelSize) -> Pixmap {
        let (background, overlays, presented) = {
            let state = self.lock();
            (state.background, state.overlays.clone(), state.last.clone())
        };

        let mut out = Rasterizer::new(size);
        if let Some(bg) = background.and_then(|w| self.registry.pixmap(w)) {
            let bg_size = bg.size();
            let bounds = Rect::new(
                0.0,
                0.0,
                f64::from(bg_size.width),
                f64::from(bg_size.height),
            );
            out.draw_pixmap(&bg, bounds);
        }
        for item in presented {
            match item {
                Presented::View { view, rect } => out.fill_rect(rect, placeholder_color(view)),
                Presented::Overlay { overlay, rect } => {
                    let content = overlays
                        .iter()
                        .find(|m| m.id == overlay)
                        .and_then(|m| self.registry.pixmap(m.window));
                    if let Some(content) = content {
                        out.draw_pixmap(&content, rect);
                    }
                }
            }
        }
        out.finish()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlatformViewDisplay for HeadlessDisplay {
    fn on_frame_begin(&self) {
        let mut state = self.lock();
        state.current.clear();
        state.frames_begun += 1;
    }

    fn on_frame_end(&self) {
        let mut state = self.lock();
        state.last = core::mem::take(&mut state.current);
        state.frames_ended += 1;
    }

    fn create_overlay_surface(&self) -> Option<OverlayMetadata> {
        let mut state = self.lock();
        let metadata = OverlayMetadata {
            id: OverlayId(state.next_overlay),
            window: self.registry.open_window(PixelSize::default()),
        };
        state.next_overlay += 1;
        state.overlays_created += 1;
        state.overlays.push(metadata);
        Some(metadata)
    }

    fn on_display_platform_view(&self, view: ViewId, rect: Rect) {
        self.lock().current.push(Presented::View { view, rect });
    }

    fn on_display_overlay_surface(&self, overlay: OverlayId, rect: Rect) {
        self.lock().current.push(Presented::Overlay { overlay, rect });
    }

    fn destroy_overlay_surfaces(&self) {
        let overlays = core::mem::take(&mut self.lock().overlays);
        for metadata in overlays {
            self.registry.close_window(metadata.window);
        }
    }
}

/// Solid color standing in for native view `view` in composed frames.
#[must_use]
pub fn placeholder_color(view: ViewId) -> Color {
    const PALETTE: [Color; 6] = [
        Color::rgb(0x1f, 0x77, 0xb4),
        Color::rgb(0xff, 0x7f, 0x0e),
        Color::rgb(0x2c, 0xa0, 0x2c),
        Color::rgb(0xd6, 0x27, 0x28),
        Color::rgb(0x94, 0x67, 0xbd),
        Color::rgb(0x8c, 0x56, 0x4b),
    ];
    let index = usize::try_from(view.get().rem_euclid(6)).unwrap_or(0);
    PALETTE[index]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
