// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channels for per-view change detection.
//!
//! The [`ViewParamsTracker`](crate::view::ViewParamsTracker) compares each
//! registration against the last committed frame and marks the view's key on
//! the channel that changed. Both channels are local-only: views have no
//! parent/child relationship, so nothing propagates.
//!
//! - [`GEOMETRY`]: the computed view rect differs from the committed one, or
//!   the view was not present in the committed frame.
//! - [`MUTATORS`]: the mutator stack (transform, clip, opacity) changed.
//!
//! Callers never drain these directly; see
//! [`ViewParamsTracker::changed_views`](crate::view::ViewParamsTracker::changed_views).

use understory_dirty::Channel;

/// View rect changed or the view is new since the committed frame.
pub const GEOMETRY: Channel = Channel::new(0);

/// View mutators changed since the committed frame.
pub const MUTATORS: Channel = Channel::new(1);
