// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame coordination for compositing native platform views with a
//! separately rendered scene.
//!
//! `inlay_core` sits between a scene renderer and a host that owns native
//! views (widgets, video players, web views). Each frame, the renderer
//! declares where native views go; the coordinator hands out one recording
//! canvas per view for the scene content that must appear *above* it, then
//! splits that content into overlay surfaces and issues the native display
//! calls so that both sides of the frame become visible together and in the
//! right order.
//!
//! # Architecture
//!
//! ```text
//!   Renderer (raster thread)
//!       │ begin_frame / preroll_composite_embedded_view
//!       ▼
//!   FrameCoordinator ──► ViewParamsTracker (rects, order, changes)
//!       │ post_preroll_action ──► ThreadMerger (Split ⇄ Merged, lease)
//!       │ submit_frame
//!       ├──► SurfacePool ──► SurfaceFactory / OverlaySurface
//!       └──► PlatformViewDisplay (platform thread only)
//!       │ end_frame / cancel_frame
//! ```
//!
//! **[`embedder`]**: The [`FrameCoordinator`](embedder::FrameCoordinator)
//! and its preroll → composite → submit/cancel → end lifecycle.
//!
//! **[`merger`]**: [`ThreadMerger`](merger::ThreadMerger), the lease-based
//! state machine that fuses the platform and raster threads.
//!
//! **[`pool`]**: [`SurfacePool`](pool::SurfacePool), overlay surfaces
//! recycled by draw-order slot.
//!
//! **[`view`]**: View identity, placement params, and the per-frame
//! [`ViewParamsTracker`](view::ViewParamsTracker).
//!
//! **[`canvas`]**: Recording canvases, finished pictures, and the
//! drawn-rect index used to compute overlay regions.
//!
//! **[`backend`]**: Collaborator contracts: the native display API and the
//! surface factory.
//!
//! **[`config`]**: [`EmbedderConfig`](config::EmbedderConfig) presets.
//!
//! **[`error`]**: Error types returned by the coordinator.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and lifecycle
//! events, with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod backend;
pub mod canvas;
pub mod config;
pub mod dirty;
pub mod embedder;
pub mod error;
pub mod merger;
pub mod pool;
pub mod trace;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;
