// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-thread frame loop exercising thread merging and overlay pooling.
//!
//! The main thread plays the platform thread and a spawned thread plays the
//! raster thread. Frames are rasterized on the raster thread until a native
//! view shows up; the coordinator then asks for a merge, and while the lease
//! holds every frame is shipped to the platform thread over a channel. Once
//! the views are gone the lease runs out and frames return to the raster
//! thread.
//!
//! Events are recorded with a [`RecorderSink`], pretty-printed afterwards,
//! and exported as `trace.json` in Chrome Trace Event Format. The last frame
//! that showed views is written as raw premultiplied RGBA8 to `frame.rgba`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded};
use kurbo::{Point, Rect, Size};

use inlay_backend_headless::HeadlessDisplay;
use inlay_core::backend::RenderContextId;
use inlay_core::canvas::{Color, PixelSize};
use inlay_core::embedder::{FrameCoordinator, PostPrerollResult};
use inlay_core::merger::ThreadMerger;
use inlay_core::trace::SharedSink;
use inlay_core::view::{EmbeddedViewParams, MutatorsStack, ViewId};
use inlay_debug::pretty::PrettyPrintSink;
use inlay_debug::recorder::{self, RecorderSink};
use inlay_render::{SoftwareSurfaceFactory, WindowRegistry};

const FRAME_SIZE: PixelSize = PixelSize::new(360, 640);
const DEVICE_PIXEL_RATIO: f64 = 1.5;
const CONTEXT: Option<RenderContextId> = Some(RenderContextId(1));

const VIDEO: ViewId = ViewId(1);
const MAP: ViewId = ViewId(2);

/// Native views shown in one frame, back to front.
#[derive(Clone, Debug, Default)]
struct Scene {
    views: Vec<(ViewId, Point, Size)>,
}

/// A frame shipped to the platform thread while merged.
struct Job {
    coordinator: FrameCoordinator,
    scene: Scene,
}

fn script() -> Vec<Scene> {
    let video = (VIDEO, Point::new(30.0, 120.0), Size::new(200.0, 120.0));
    let map = (MAP, Point::new(60.0, 360.0), Size::new(160.0, 100.0));
    let mut frames = Vec::new();
    frames.extend((0..3).map(|_| Scene::default()));
    frames.extend((0..5).map(|_| Scene {
        views: vec![video],
    }));
    frames.extend((0..3).map(|_| Scene {
        views: vec![video, map],
    }));
    frames.extend((0..12).map(|_| Scene::default()));
    frames
}

/// Runs one frame. A frame that must be resubmitted ends right after
/// preroll.
fn run_frame(
    coordinator: &mut FrameCoordinator,
    display: &HeadlessDisplay,
    merger: &ThreadMerger,
    scene: &Scene,
) -> PostPrerollResult {
    coordinator.begin_frame(FRAME_SIZE, &MutatorsStack::new(), DEVICE_PIXEL_RATIO, merger);
    for &(view, offset, size) in &scene.views {
        coordinator.preroll_composite_embedded_view(view, EmbeddedViewParams::new(offset, size));
    }

    let thread = if merger.is_on_platform_thread() {
        "platform"
    } else {
        "raster"
    };
    let result = coordinator.post_preroll_action(merger);
    println!(
        "frame {:>2} on {thread:<8} views={} lease={:>2} {result:?}",
        coordinator.frame_index(),
        scene.views.len(),
        merger.lease_remaining(),
    );
    if result == PostPrerollResult::ResubmitFrame {
        coordinator.end_frame(merger);
        return result;
    }

    // A badge over each view's top-right corner, and a caption below it.
    for &(view, _, _) in &scene.views {
        let Ok(rect) = coordinator.view_rect(view) else {
            continue;
        };
        if let Some(canvas) = coordinator.composite_embedded_view(view) {
            let badge = Rect::from_origin_size((rect.x1 - 30.0, rect.y0 - 15.0), (45.0, 45.0));
            canvas.fill_rect(badge, Color::rgb(0xe9, 0x1e, 0x63));
            let caption = Rect::new(rect.x0, rect.y1 + 8.0, rect.x1, rect.y1 + 24.0);
            canvas.fill_rect(caption, Color::rgba(0, 0, 0, 0xb0));
        }
    }

    let mut frame = display.background_frame(FRAME_SIZE);
    frame.canvas().clear(Color::rgb(0xfa, 0xfa, 0xfa));
    frame.canvas().fill_rect(
        Rect::new(0.0, 0.0, f64::from(FRAME_SIZE.width), 56.0),
        Color::rgb(0x3f, 0x51, 0xb5),
    );
    if let Err(err) = coordinator.submit_frame(CONTEXT, frame) {
        eprintln!("frame {}: {err}", coordinator.frame_index());
    }
    coordinator.end_frame(merger);
    result
}

fn main() {
    let registry = WindowRegistry::new();
    let display = Arc::new(HeadlessDisplay::new(registry.clone()));
    let factory = Arc::new(SoftwareSurfaceFactory::new(registry));
    let mut coordinator = FrameCoordinator::new(display.clone(), factory);
    let recording = SharedSink::new(RecorderSink::new());
    coordinator.set_trace_sink(Some(Box::new(recording.clone())));

    let (merger_tx, merger_rx) = bounded::<Arc<ThreadMerger>>(1);
    let (job_tx, job_rx) = unbounded::<Job>();
    let (reply_tx, reply_rx) = bounded::<(FrameCoordinator, PostPrerollResult)>(1);

    // -- raster thread -----------------------------------------------------
    let platform = thread::current().id();
    let raster_display = Arc::clone(&display);
    let raster = thread::spawn(move || {
        let merger = Arc::new(ThreadMerger::with_current_as_raster(platform));
        merger_tx
            .send(Arc::clone(&merger))
            .expect("platform thread waits for the merger");

        for scene in script() {
            loop {
                let result = if merger.is_merged() {
                    job_tx
                        .send(Job {
                            coordinator,
                            scene: scene.clone(),
                        })
                        .expect("platform thread accepts jobs");
                    let (back, result) = reply_rx.recv().expect("platform thread replies");
                    coordinator = back;
                    result
                } else {
                    run_frame(&mut coordinator, &raster_display, &merger, &scene)
                };
                if result == PostPrerollResult::Success {
                    break;
                }
            }
        }
        coordinator
    });

    // -- platform thread ---------------------------------------------------
    let merger = merger_rx.recv().expect("raster thread sends the merger");
    let mut snapshot = None;
    for Job {
        mut coordinator,
        scene,
    } in job_rx.iter()
    {
        let result = run_frame(&mut coordinator, &display, &merger, &scene);
        if !display.presented().is_empty() {
            snapshot = Some(display.compose(FRAME_SIZE));
        }
        reply_tx
            .send((coordinator, result))
            .expect("raster thread waits for the frame");
    }

    let mut coordinator = raster.join().expect("raster thread panicked");
    let destroyed = coordinator.destroy_surfaces(&merger);
    println!(
        "overlays created={} destroyed={destroyed} merged={}",
        display.overlays_created(),
        merger.is_merged(),
    );

    // -- diagnostics -------------------------------------------------------
    let bytes = recording.with(|r| r.as_bytes().to_vec());
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    recorder::replay(&bytes, &mut pretty);

    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    inlay_debug::chrome::export(&bytes, &mut writer).expect("failed to write Chrome trace");
    println!("Wrote {path}");

    if let Some(image) = snapshot {
        let path = "frame.rgba";
        let mut file = File::create(path).expect("failed to create frame.rgba");
        file.write_all(image.as_bytes())
            .expect("failed to write frame.rgba");
        println!(
            "Wrote {path} ({}x{} RGBA8)",
            FRAME_SIZE.width, FRAME_SIZE.height
        );
    }
}
