// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay surfaces recycled by draw-order slot.
//!
//! Slot `n` is the `n`th overlay needed in a frame, counted in composite
//! order. It is not tied to any view: two adjacent views with no scene
//! content between them need no overlay at all, while one view can need
//! several. Keeping slots stable across frames means that an unchanged
//! scene reuses the same surfaces (and native windows) frame after frame.
//!
//! Within a frame, [`SurfacePool::acquire`] hands out slots in order. At the
//! end of the frame [`SurfacePool::recycle`] rewinds the cursor; surfaces
//! beyond the count needed stay idle in the pool until a later frame wants
//! them or [`SurfacePool::destroy`] releases everything.
//!
//! The display API cannot destroy a single overlay window. A window whose
//! surface fails to bind to it is therefore parked and handed to the next
//! surface the pool creates, instead of asking the display for another.

use crate::backend::{
    NativeWindow, OverlayId, OverlayMetadata, OverlaySurface, PlatformViewDisplay,
    RenderContextId, SurfaceFactory,
};
use crate::error::SubmitError;

/// How a slot was filled by [`SurfacePool::acquire`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Acquisition {
    /// The existing surface was valid and reused.
    Reused,
    /// The slot was new and a surface was created.
    Created,
    /// The existing surface was invalid and replaced.
    Replaced,
}

/// A pooled overlay: a surface plus the native window it draws into.
pub struct OverlayLayer {
    id: OverlayId,
    window: NativeWindow,
    context: Option<RenderContextId>,
    surface: Box<dyn OverlaySurface>,
}

impl core::fmt::Debug for OverlayLayer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverlayLayer")
            .field("id", &self.id)
            .field("window", &self.window)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl OverlayLayer {
    /// Overlay id assigned by the display API.
    #[inline]
    #[must_use]
    pub fn id(&self) -> OverlayId {
        self.id
    }

    /// Native window backing the overlay.
    #[inline]
    #[must_use]
    pub fn window(&self) -> NativeWindow {
        self.window
    }

    /// Render context the surface is bound to.
    #[inline]
    #[must_use]
    pub fn context(&self) -> Option<RenderContextId> {
        self.context
    }

    /// The drawable surface.
    pub fn surface(&mut self) -> &mut dyn OverlaySurface {
        &mut *self.surface
    }
}

/// An acquired slot.
#[derive(Debug)]
pub struct AcquiredLayer<'a> {
    /// Slot index in the pool.
    pub slot: usize,
    /// How the slot was filled.
    pub acquisition: Acquisition,
    /// The overlay occupying the slot.
    pub layer: &'a mut OverlayLayer,
}

/// Overlay surfaces indexed by slot.
#[derive(Debug, Default)]
pub struct SurfacePool {
    layers: Vec<OverlayLayer>,
    available: usize,
    unbound: Vec<OverlayMetadata>,
}

impl SurfacePool {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            layers: Vec::new(),
            available: 0,
            unbound: Vec::new(),
        }
    }

    /// Hands out the next slot, creating or replacing its surface as needed
    /// and binding it to `context`.
    ///
    /// A surface that fails its validity check is discarded and a fresh one
    /// takes its slot. On error the cursor does not advance.
    pub fn acquire(
        &mut self,
        context: Option<RenderContextId>,
        display: &dyn PlatformViewDisplay,
        factory: &dyn SurfaceFactory,
    ) -> Result<AcquiredLayer<'_>, SubmitError> {
        let slot = self.available;
        let acquisition = if slot >= self.layers.len() {
            let layer = self.create_layer(context, display, factory)?;
            self.layers.push(layer);
            Acquisition::Created
        } else if !self.layers[slot].surface.is_valid() {
            let layer = self.create_layer(context, display, factory)?;
            self.layers[slot] = layer;
            Acquisition::Replaced
        } else {
            Acquisition::Reused
        };

        let layer = &mut self.layers[slot];
        if layer.context != context {
            if !layer.surface.bind_render_context(context) {
                return Err(SubmitError::SurfaceCreation);
            }
            layer.context = context;
        }
        self.available += 1;
        Ok(AcquiredLayer {
            slot,
            acquisition,
            layer,
        })
    }

    /// Rewinds the cursor so the next frame starts again at slot 0.
    pub fn recycle(&mut self) {
        self.available = 0;
    }

    /// Drops every pooled overlay and asks the display to destroy their
    /// windows, parked ones included. No display call is made when the pool
    /// owns no window.
    pub fn destroy(&mut self, display: &dyn PlatformViewDisplay) {
        if !self.layers.is_empty() || !self.unbound.is_empty() {
            display.destroy_overlay_surfaces();
        }
        self.layers.clear();
        self.unbound.clear();
        self.available = 0;
    }

    /// Number of pooled overlays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the pool holds no overlays.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of slots handed out since the last [`recycle`](Self::recycle).
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.available
    }

    /// Overlay windows created by the display but held by no surface.
    #[must_use]
    pub fn unbound_windows(&self) -> &[OverlayMetadata] {
        &self.unbound
    }

    /// Overlays not handed out this frame.
    #[must_use]
    pub fn idle(&self) -> &[OverlayLayer] {
        &self.layers[self.available.min(self.layers.len())..]
    }

    fn create_layer(
        &mut self,
        context: Option<RenderContextId>,
        display: &dyn PlatformViewDisplay,
        factory: &dyn SurfaceFactory,
    ) -> Result<OverlayLayer, SubmitError> {
        let mut surface = factory
            .create_surface(context, display)
            .ok_or(SubmitError::SurfaceCreation)?;
        if !surface.is_valid() {
            return Err(SubmitError::SurfaceCreation);
        }
        let metadata = match self.unbound.pop() {
            Some(metadata) => metadata,
            None => display
                .create_overlay_surface()
                .ok_or(SubmitError::NativeWindowUnavailable)?,
        };
        if !surface.set_native_window(metadata.window) {
            self.unbound.push(metadata);
            return Err(SubmitError::NativeWindowUnavailable);
        }
        if !surface.bind_render_context(context) {
            self.unbound.push(metadata);
            return Err(SubmitError::SurfaceCreation);
        }
        Ok(OverlayLayer {
            id: metadata.id,
            window: metadata.window,
            context,
            surface,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
