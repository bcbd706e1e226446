// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offscreen display backend for inlay.
//!
//! [`HeadlessDisplay`] implements the platform-view display API without a
//! window system. Overlay windows live in an [`inlay_render::WindowRegistry`],
//! native views are represented by solid placeholders, and every completed
//! frame can be flattened into a single [`Pixmap`](inlay_render::Pixmap)
//! with [`HeadlessDisplay::compose`]. This makes it suitable for tests,
//! screenshots, and CI runs where no device is attached.

mod display;

pub use display::{HeadlessDisplay, Presented, placeholder_color};
