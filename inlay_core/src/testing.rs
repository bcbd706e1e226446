// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording doubles for the collaborator traits.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use kurbo::Rect;

use crate::backend::{
    NativeWindow, OverlayId, OverlayMetadata, OverlaySurface, PlatformViewDisplay,
    RenderContextId, SurfaceFactory, SurfaceFrame,
};
use crate::canvas::{Picture, PixelSize};
use crate::merger::ThreadMerger;
use crate::view::ViewId;

/// One call received by [`RecordingDisplay`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DisplayCall {
    FrameBegin,
    FrameEnd,
    CreateOverlay(OverlayId),
    PlatformView(ViewId, Rect),
    OverlaySurface(OverlayId, Rect),
    DestroyOverlays,
}

/// Display double that logs every call and numbers overlays from 0.
#[derive(Debug, Default)]
pub(crate) struct RecordingDisplay {
    calls: Mutex<Vec<DisplayCall>>,
    next_overlay: AtomicI64,
    refuse_overlays: AtomicBool,
}

impl RecordingDisplay {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub(crate) fn calls(&self) -> Vec<DisplayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn take_calls(&self) -> Vec<DisplayCall> {
        core::mem::take(&mut *self.calls.lock().unwrap())
    }

    pub(crate) fn count(&self, pred: impl Fn(&DisplayCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn refuse_overlays(&self, refuse: bool) {
        self.refuse_overlays.store(refuse, Ordering::Relaxed);
    }

    fn log(&self, call: DisplayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PlatformViewDisplay for RecordingDisplay {
    fn on_frame_begin(&self) {
        self.log(DisplayCall::FrameBegin);
    }

    fn on_frame_end(&self) {
        self.log(DisplayCall::FrameEnd);
    }

    fn create_overlay_surface(&self) -> Option<OverlayMetadata> {
        if self.refuse_overlays.load(Ordering::Relaxed) {
            return None;
        }
        let id = OverlayId(self.next_overlay.fetch_add(1, Ordering::Relaxed));
        self.log(DisplayCall::CreateOverlay(id));
        Some(OverlayMetadata {
            id,
            window: NativeWindow(100 + id.0.unsigned_abs()),
        })
    }

    fn on_display_platform_view(&self, view: ViewId, rect: Rect) {
        self.log(DisplayCall::PlatformView(view, rect));
    }

    fn on_display_overlay_surface(&self, overlay: OverlayId, rect: Rect) {
        self.log(DisplayCall::OverlaySurface(overlay, rect));
    }

    fn destroy_overlay_surfaces(&self) {
        self.log(DisplayCall::DestroyOverlays);
    }
}

#[derive(Debug, Default)]
struct SurfaceRecord {
    valid: bool,
    window: Option<NativeWindow>,
    bindings: Vec<Option<RenderContextId>>,
    frame_sizes: Vec<PixelSize>,
    pictures: Vec<Picture>,
}

#[derive(Debug, Default)]
struct FactoryState {
    surfaces: Vec<SurfaceRecord>,
    fail_creation: bool,
    fail_frames: bool,
    fail_submit: bool,
    fail_native_window: bool,
    fail_context_binding: bool,
}

/// Surface factory double. Surfaces are numbered in creation order.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedSurfaceFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl ScriptedSurfaceFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn created(&self) -> usize {
        self.state.lock().unwrap().surfaces.len()
    }

    pub(crate) fn invalidate(&self, surface: usize) {
        self.state.lock().unwrap().surfaces[surface].valid = false;
    }

    pub(crate) fn bindings(&self, surface: usize) -> Vec<Option<RenderContextId>> {
        self.state.lock().unwrap().surfaces[surface].bindings.clone()
    }

    pub(crate) fn window(&self, surface: usize) -> Option<NativeWindow> {
        self.state.lock().unwrap().surfaces[surface].window
    }

    pub(crate) fn frame_sizes(&self, surface: usize) -> Vec<PixelSize> {
        self.state.lock().unwrap().surfaces[surface].frame_sizes.clone()
    }

    pub(crate) fn pictures(&self, surface: usize) -> Vec<Picture> {
        self.state.lock().unwrap().surfaces[surface].pictures.clone()
    }

    pub(crate) fn fail_creation(&self, fail: bool) {
        self.state.lock().unwrap().fail_creation = fail;
    }

    pub(crate) fn fail_frames(&self, fail: bool) {
        self.state.lock().unwrap().fail_frames = fail;
    }

    pub(crate) fn fail_submit(&self, fail: bool) {
        self.state.lock().unwrap().fail_submit = fail;
    }

    pub(crate) fn fail_native_window(&self, fail: bool) {
        self.state.lock().unwrap().fail_native_window = fail;
    }

    pub(crate) fn fail_context_binding(&self, fail: bool) {
        self.state.lock().unwrap().fail_context_binding = fail;
    }
}

impl SurfaceFactory for ScriptedSurfaceFactory {
    fn create_surface(
        &self,
        _context: Option<RenderContextId>,
        _display: &dyn PlatformViewDisplay,
    ) -> Option<Box<dyn OverlaySurface>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_creation {
            return None;
        }
        state.surfaces.push(SurfaceRecord {
            valid: true,
            ..SurfaceRecord::default()
        });
        Some(Box::new(ScriptedSurface {
            index: state.surfaces.len() - 1,
            state: Arc::clone(&self.state),
        }))
    }
}

struct ScriptedSurface {
    index: usize,
    state: Arc<Mutex<FactoryState>>,
}

impl OverlaySurface for ScriptedSurface {
    fn is_valid(&self) -> bool {
        self.state.lock().unwrap().surfaces[self.index].valid
    }

    fn set_native_window(&mut self, window: NativeWindow) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.fail_native_window {
            return false;
        }
        state.surfaces[self.index].window = Some(window);
        true
    }

    fn bind_render_context(&mut self, context: Option<RenderContextId>) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.fail_context_binding {
            return false;
        }
        state.surfaces[self.index].bindings.push(context);
        true
    }

    fn acquire_frame(&mut self, size: PixelSize) -> Option<SurfaceFrame> {
        let mut state = self.state.lock().unwrap();
        if state.fail_frames {
            return None;
        }
        state.surfaces[self.index].frame_sizes.push(size);
        let index = self.index;
        let shared = Arc::clone(&self.state);
        Some(SurfaceFrame::new(
            size,
            Box::new(move |picture| {
                let mut state = shared.lock().unwrap();
                if state.fail_submit {
                    return false;
                }
                state.surfaces[index].pictures.push(picture);
                true
            }),
        ))
    }
}

/// Pictures submitted through frames made by [`capture_frame`].
pub(crate) type Captured = Arc<Mutex<Vec<Picture>>>;

/// A background frame whose submitted picture lands in the returned log.
/// Submission reports `succeed`.
pub(crate) fn capture_frame(size: PixelSize, succeed: bool) -> (SurfaceFrame, Captured) {
    let captured: Captured = Arc::default();
    let sink = Arc::clone(&captured);
    let frame = SurfaceFrame::new(
        size,
        Box::new(move |picture| {
            sink.lock().unwrap().push(picture);
            succeed
        }),
    );
    (frame, captured)
}

/// A thread id other than the calling thread's.
pub(crate) fn other_thread() -> ThreadId {
    thread::spawn(|| thread::current().id())
        .join()
        .expect("helper thread should not panic")
}

/// A merger whose platform thread is the calling thread.
pub(crate) fn merger_on_platform() -> ThreadMerger {
    ThreadMerger::with_current_as_platform(other_thread())
}

/// A merger whose raster thread is the calling thread.
pub(crate) fn merger_on_raster() -> ThreadMerger {
    ThreadMerger::with_current_as_raster(other_thread())
}
