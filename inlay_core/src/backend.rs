// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator contracts for host integrations.
//!
//! The coordinator never touches native windows or GPU resources itself.
//! A host supplies two pieces:
//!
//! - **Display**: Implements [`PlatformViewDisplay`], the handful of native
//!   view verbs: begin/end a frame, create overlay windows, position a native
//!   view, position an overlay, and tear overlays down. Every call must run
//!   on the platform thread; the coordinator only issues them when the
//!   [`ThreadMerger`](crate::merger::ThreadMerger) grants platform
//!   privileges to the calling thread.
//!
//! - **Surfaces**: Implements [`SurfaceFactory`] and [`OverlaySurface`] to
//!   provide drawable surfaces backed by overlay windows. A surface hands out
//!   one [`SurfaceFrame`] per draw; the frame records into a
//!   [`RecordingCanvas`] and is finalized by [`SurfaceFrame::submit`].
//!
//! # Crate boundaries
//!
//! `inlay_core` owns the frame lifecycle, the pool, and this contract
//! module. `inlay_render` implements the surface side in software and
//! `inlay_backend_headless` implements the display side for offscreen hosts.
//! Application code wires them together in a frame loop:
//!
//! ```rust,ignore
//! fn on_frame(coordinator: &mut FrameCoordinator, merger: &ThreadMerger) {
//!     coordinator.begin_frame(size, &MutatorsStack::new(), 2.0, merger);
//!     coordinator.preroll_composite_embedded_view(video, params);
//!     if coordinator.post_preroll_action(merger) == PostPrerollResult::ResubmitFrame {
//!         coordinator.end_frame(merger);
//!         return; // run the frame again once merged
//!     }
//!     draw_scene(coordinator.composite_embedded_view(video));
//!     coordinator.submit_frame(context, background_frame)?;
//!     coordinator.end_frame(merger);
//! }
//! ```

use kurbo::Rect;

use crate::canvas::{Picture, PixelSize, RecordingCanvas};
use crate::view::ViewId;

/// Identifier the display API assigns to an overlay window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(pub i64);

/// Opaque handle to a native window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeWindow(pub u64);

/// Opaque identity of a rendering context (e.g. a GPU device).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderContextId(pub u64);

/// A newly created overlay window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OverlayMetadata {
    /// Id used for [`PlatformViewDisplay::on_display_overlay_surface`].
    pub id: OverlayId,
    /// Window the overlay surface draws into.
    pub window: NativeWindow,
}

/// Native view display API. All methods are platform-thread only.
///
/// Implementations are shared between the coordinator and the surface
/// factory, so they take `&self` and use interior mutability.
pub trait PlatformViewDisplay: Send + Sync {
    /// A frame containing native views begins.
    fn on_frame_begin(&self);

    /// The current frame is complete.
    fn on_frame_end(&self);

    /// Creates an overlay window. `None` if the host cannot provide one.
    fn create_overlay_surface(&self) -> Option<OverlayMetadata>;

    /// Places native view `view` at `rect`, in device pixels.
    fn on_display_platform_view(&self, view: ViewId, rect: Rect);

    /// Shows overlay `overlay` at `rect`, in device pixels, above every view
    /// displayed before it in this frame.
    fn on_display_overlay_surface(&self, overlay: OverlayId, rect: Rect);

    /// Destroys every overlay window created so far.
    fn destroy_overlay_surfaces(&self);
}

/// Called with the finished picture when a [`SurfaceFrame`] is submitted.
/// Returns `false` if the content could not be presented.
pub type SubmitCallback = Box<dyn FnOnce(Picture) -> bool + Send>;

/// One drawable frame of a surface.
pub struct SurfaceFrame {
    canvas: RecordingCanvas,
    on_submit: SubmitCallback,
}

impl core::fmt::Debug for SurfaceFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurfaceFrame")
            .field("size", &self.canvas.size())
            .field("ops", &self.canvas.ops().len())
            .finish_non_exhaustive()
    }
}

impl SurfaceFrame {
    /// Creates a frame of `size` that hands its picture to `on_submit`.
    #[must_use]
    pub fn new(size: PixelSize, on_submit: SubmitCallback) -> Self {
        Self {
            canvas: RecordingCanvas::new(size),
            on_submit,
        }
    }

    /// Canvas to draw into.
    #[must_use]
    pub fn canvas(&mut self) -> &mut RecordingCanvas {
        &mut self.canvas
    }

    /// Frame size.
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.canvas.size()
    }

    /// Finishes recording and presents the result.
    pub fn submit(self) -> bool {
        (self.on_submit)(self.canvas.finish())
    }
}

/// Drawable surface backing one overlay window.
pub trait OverlaySurface: Send {
    /// Returns `false` once the surface can no longer be drawn to, e.g. its
    /// window went away.
    fn is_valid(&self) -> bool;

    /// Binds the surface to a native window. Returns `false` on failure.
    fn set_native_window(&mut self, window: NativeWindow) -> bool;

    /// Binds the surface to a rendering context. Returns `false` on failure.
    fn bind_render_context(&mut self, context: Option<RenderContextId>) -> bool;

    /// Acquires a frame of `size`.
    fn acquire_frame(&mut self, size: PixelSize) -> Option<SurfaceFrame>;
}

/// Creates overlay surfaces.
pub trait SurfaceFactory: Send + Sync {
    /// Creates an unbound surface for `context`.
    fn create_surface(
        &self,
        context: Option<RenderContextId>,
        display: &dyn PlatformViewDisplay,
    ) -> Option<Box<dyn OverlaySurface>>;
}
