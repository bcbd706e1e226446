// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software rendering for inlay.
//!
//! This crate turns the pictures recorded by [`inlay_core`] into pixels and
//! implements the overlay surface contract on top of them. It provides:
//!
//! - [`Pixmap`]: a premultiplied RGBA8 pixel buffer
//! - [`Rasterizer`]: replays [`Picture`](inlay_core::canvas::Picture)s and
//!   blends solid rects and pixmaps with [`vello_cpu`]; [`rasterize`] is the
//!   one-picture shorthand
//! - [`WindowRegistry`]: the shared table of native windows and the pixels
//!   last presented into each of them
//! - [`SoftwareSurfaceFactory`] / [`SoftwareSurface`]: overlay surfaces that
//!   rasterize submitted frames into their window

#![cfg_attr(docsrs, feature(doc_cfg))]

mod pixmap;
mod raster;
mod surface;

pub use pixmap::Pixmap;
pub use raster::{Rasterizer, rasterize};
pub use surface::{SoftwareSurface, SoftwareSurfaceFactory, WindowRegistry};
