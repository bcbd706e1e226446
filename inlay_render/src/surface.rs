// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software overlay surfaces backed by in-memory windows.
//!
//! A [`WindowRegistry`] stands in for the native window system: it hands out
//! [`NativeWindow`] handles, each owning the [`Pixmap`] last presented into
//! it. [`SoftwareSurface`] draws into those windows by rasterizing the
//! submitted [`Picture`](inlay_core::canvas::Picture) of every frame.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;
use inlay_core::backend::{
    NativeWindow, OverlaySurface, PlatformViewDisplay, RenderContextId, SurfaceFactory,
    SurfaceFrame,
};
use inlay_core::canvas::PixelSize;

use crate::{Pixmap, rasterize};

#[derive(Debug, Default)]
struct Windows {
    next: u64,
    open: HashMap<NativeWindow, Pixmap>,
}

/// Shared table of open in-memory windows.
///
/// Clones refer to the same table.
#[derive(Clone, Debug, Default)]
pub struct WindowRegistry {
    windows: Arc<Mutex<Windows>>,
}

impl WindowRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a transparent window of `size`.
    pub fn open_window(&self, size: PixelSize) -> NativeWindow {
        let mut windows = self.lock();
        let window = NativeWindow(windows.next);
        windows.next += 1;
        windows.open.insert(window, Pixmap::new(size));
        window
    }

    /// Closes `window`. Returns `false` if it was not open.
    pub fn close_window(&self, window: NativeWindow) -> bool {
        self.lock().open.remove(&window).is_some()
    }

    /// Closes every window.
    pub fn close_all(&self) {
        self.lock().open.clear();
    }

    /// Returns `true` if `window` is open.
    #[must_use]
    pub fn contains(&self, window: NativeWindow) -> bool {
        self.lock().open.contains_key(&window)
    }

    /// Number of open windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().open.len()
    }

    /// Returns `true` if no window is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().open.is_empty()
    }

    /// Snapshot of the content last presented into `window`.
    #[must_use]
    pub fn pixmap(&self, window: NativeWindow) -> Option<Pixmap> {
        self.lock().open.get(&window).cloned()
    }

    /// A frame of `size` presenting into `window`.
    ///
    /// Submission rasterizes the picture into a fresh buffer and swaps it in.
    /// It reports failure if the window was closed in the meantime.
    #[must_use]
    pub fn frame_for(&self, window: NativeWindow, size: PixelSize) -> SurfaceFrame {
        let registry = self.clone();
        SurfaceFrame::new(
            size,
            Box::new(move |picture| {
                let buffer = rasterize(&picture);
                match registry.lock().open.get_mut(&window) {
                    Some(slot) => {
                        *slot = buffer;
                        true
                    }
                    None => false,
                }
            }),
        )
    }

    fn lock(&self) -> MutexGuard<'_, Windows> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates [`SoftwareSurface`]s over a [`WindowRegistry`].
#[derive(Clone, Debug)]
pub struct SoftwareSurfaceFactory {
    registry: WindowRegistry,
}

impl SoftwareSurfaceFactory {
    /// Creates a factory whose surfaces draw into windows of `registry`.
    #[must_use]
    pub fn new(registry: WindowRegistry) -> Self {
        Self { registry }
    }

    /// The registry surfaces draw into.
    #[must_use]
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }
}

impl SurfaceFactory for SoftwareSurfaceFactory {
    fn create_surface(
        &self,
        context: Option<RenderContextId>,
        _display: &dyn PlatformViewDisplay,
    ) -> Option<Box<dyn OverlaySurface>> {
        Some(Box::new(SoftwareSurface {
            registry: self.registry.clone(),
            window: None,
            context,
        }))
    }
}

/// Overlay surface rasterizing into a registry window.
#[derive(Debug)]
pub struct SoftwareSurface {
    registry: WindowRegistry,
    window: Option<NativeWindow>,
    context: Option<RenderContextId>,
}

impl SoftwareSurface {
    /// Bound window, if any.
    #[must_use]
    pub fn window(&self) -> Option<NativeWindow> {
        self.window
    }

    /// Bound rendering context, if any.
    #[must_use]
    pub fn context(&self) -> Option<RenderContextId> {
        self.context
    }
}

impl OverlaySurface for SoftwareSurface {
    fn is_valid(&self) -> bool {
        self.window.is_none_or(|w| self.registry.contains(w))
    }

    fn set_native_window(&mut self, window: NativeWindow) -> bool {
        if !self.registry.contains(window) {
            return false;
        }
        self.window = Some(window);
        true
    }

    fn bind_render_context(&mut self, context: Option<RenderContextId>) -> bool {
        // Rasterization is context-free; the binding is only remembered.
        self.context = context;
        true
    }

    fn acquire_frame(&mut self, size: PixelSize) -> Option<SurfaceFrame> {
        let window = self.window.filter(|w| self.registry.contains(*w))?;
        Some(self.registry.frame_for(window, size))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
