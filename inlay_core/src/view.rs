// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View identity, placement params, and per-frame view bookkeeping.
//!
//! A native view is identified by a [`ViewId`] that stays stable for the
//! lifetime of the session. Each frame the renderer declares every visible
//! view with an [`EmbeddedViewParams`]; the [`ViewParamsTracker`] turns those
//! declarations into view rects and a back-to-front composite order, and
//! compares them against the last committed frame.
//!
//! # View rects
//!
//! The offset is already in device pixels, while the size is in logical
//! points and gets scaled here:
//!
//! ```text
//! rect = (offset.x,
//!         offset.y,
//!         offset.x + size.width  * device_pixel_ratio,
//!         offset.y + size.height * device_pixel_ratio)
//! ```
//!
//! Callers rely on this exact shape, so it is reproduced as is.

use hashbrown::HashMap;
use kurbo::{Affine, Point, Rect, Size};
use understory_dirty::{CycleHandling, DirtyTracker};

use crate::dirty;
use crate::error::ViewLookupError;

/// Identifier of a native view, stable across frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub i64);

impl ViewId {
    /// Returns the raw identifier.
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// One entry of a [`MutatorsStack`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mutator {
    /// Transform applied to the view.
    Transform(Affine),
    /// Axis-aligned clip in the view's coordinate space.
    ClipRect(Rect),
    /// Opacity multiplier in `[0, 1]`.
    Opacity(f32),
}

/// Ordered list of mutations applied to an embedded view, outermost first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutatorsStack {
    entries: Vec<Mutator>,
}

impl MutatorsStack {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Pushes a mutator on top of the stack.
    pub fn push(&mut self, mutator: Mutator) {
        self.entries.push(mutator);
    }

    /// Pops the innermost mutator.
    pub fn pop(&mut self) -> Option<Mutator> {
        self.entries.pop()
    }

    /// Mutators from outermost to innermost.
    #[must_use]
    pub fn iter(&self) -> core::slice::Iter<'_, Mutator> {
        self.entries.iter()
    }

    /// Number of mutators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when there are no mutators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Product of all transforms in the stack.
    #[must_use]
    pub fn final_transform(&self) -> Affine {
        self.entries
            .iter()
            .fold(Affine::IDENTITY, |acc, mutator| match mutator {
                Mutator::Transform(t) => acc * *t,
                _ => acc,
            })
    }

    /// Product of all opacities in the stack.
    #[must_use]
    pub fn final_opacity(&self) -> f32 {
        self.entries.iter().fold(1.0, |acc, mutator| match mutator {
            Mutator::Opacity(o) => acc * o,
            _ => acc,
        })
    }
}

impl<'a> IntoIterator for &'a MutatorsStack {
    type Item = &'a Mutator;
    type IntoIter = core::slice::Iter<'a, Mutator>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Placement request for one view in one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmbeddedViewParams {
    /// Top-left corner in device pixels.
    pub offset_pixels: Point,
    /// Size in logical points.
    pub size_points: Size,
    /// Mutations applied to the view.
    pub mutators: MutatorsStack,
}

impl EmbeddedViewParams {
    /// Creates params without mutators.
    #[must_use]
    pub fn new(offset_pixels: Point, size_points: Size) -> Self {
        Self {
            offset_pixels,
            size_points,
            mutators: MutatorsStack::new(),
        }
    }

    /// Replaces the mutator stack.
    #[must_use]
    pub fn with_mutators(mut self, mutators: MutatorsStack) -> Self {
        self.mutators = mutators;
        self
    }

    /// Computes the view rect for `device_pixel_ratio`.
    #[must_use]
    pub fn view_rect(&self, device_pixel_ratio: f64) -> Rect {
        let origin = self.offset_pixels;
        Rect::new(
            origin.x,
            origin.y,
            origin.x + self.size_points.width * device_pixel_ratio,
            origin.y + self.size_points.height * device_pixel_ratio,
        )
    }
}

/// Result of [`ViewParamsTracker::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// First registration of the view this frame, at the given composite
    /// index.
    First(usize),
    /// The view was already registered this frame; its params were replaced
    /// and its composite index kept.
    Updated(usize),
}

impl Registration {
    /// Composite index of the view.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First(i) | Self::Updated(i) => i,
        }
    }

    /// Returns `true` for [`Registration::First`].
    #[inline]
    #[must_use]
    pub const fn is_first(self) -> bool {
        matches!(self, Self::First(_))
    }
}

#[derive(Clone, Debug)]
struct ViewEntry {
    id: ViewId,
    params: EmbeddedViewParams,
    rect: Rect,
}

#[derive(Clone, Debug)]
struct CommittedView {
    rect: Rect,
    mutators: MutatorsStack,
}

/// Per-frame view params with change detection against the committed frame.
pub struct ViewParamsTracker {
    device_pixel_ratio: f64,
    entries: Vec<ViewEntry>,
    index: HashMap<ViewId, usize>,
    committed: HashMap<ViewId, CommittedView>,
    committed_order: Vec<ViewId>,
    dirty: DirtyTracker<i64>,
}

impl core::fmt::Debug for ViewParamsTracker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewParamsTracker")
            .field("device_pixel_ratio", &self.device_pixel_ratio)
            .field("views", &self.entries.len())
            .field("committed", &self.committed_order.len())
            .finish_non_exhaustive()
    }
}

impl Default for ViewParamsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewParamsTracker {
    /// Creates an empty tracker with a device pixel ratio of `1.0`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            entries: Vec::new(),
            index: HashMap::new(),
            committed: HashMap::new(),
            committed_order: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    /// Starts a new frame: forgets the current registrations and any marks
    /// left by a frame that was never committed.
    pub fn begin_frame(&mut self, device_pixel_ratio: f64) {
        self.reset();
        self.device_pixel_ratio = device_pixel_ratio;
    }

    /// Forgets the current frame's registrations. The committed frame is
    /// kept.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.discard_marks();
    }

    /// Device pixel ratio of the current frame.
    #[inline]
    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Registers or updates `view` for the current frame.
    ///
    /// The first registration appends the view to the composite order;
    /// later ones replace the params in place.
    pub fn register(&mut self, view: ViewId, params: EmbeddedViewParams) -> Registration {
        let rect = params.view_rect(self.device_pixel_ratio);
        self.mark_against_committed(view, rect, &params.mutators);
        match self.index.get(&view) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.params = params;
                entry.rect = rect;
                Registration::Updated(i)
            }
            None => {
                let i = self.entries.len();
                self.entries.push(ViewEntry {
                    id: view,
                    params,
                    rect,
                });
                self.index.insert(view, i);
                Registration::First(i)
            }
        }
    }

    /// Composite index of `view` in the current frame.
    #[must_use]
    pub fn index_of(&self, view: ViewId) -> Option<usize> {
        self.index.get(&view).copied()
    }

    /// Current rect of `view`.
    pub fn view_rect(&self, view: ViewId) -> Result<Rect, ViewLookupError> {
        self.index_of(view)
            .map(|i| self.entries[i].rect)
            .ok_or(ViewLookupError::UnknownView(view))
    }

    /// Current params of `view`.
    #[must_use]
    pub fn params(&self, view: ViewId) -> Option<&EmbeddedViewParams> {
        self.index_of(view).map(|i| &self.entries[i].params)
    }

    /// Views registered this frame, back to front.
    pub fn order(&self) -> impl ExactSizeIterator<Item = ViewId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Rects of the views registered this frame, back to front.
    pub fn rects(&self) -> impl ExactSizeIterator<Item = Rect> + '_ {
        self.entries.iter().map(|e| e.rect)
    }

    /// Number of views registered this frame.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no view was registered this frame.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` when the composite order differs from the committed
    /// frame's.
    #[must_use]
    pub fn composition_changed(&self) -> bool {
        self.committed_order.len() != self.entries.len()
            || self
                .committed_order
                .iter()
                .zip(&self.entries)
                .any(|(committed, entry)| *committed != entry.id)
    }

    /// Drains the views whose rect or mutators differ from the committed
    /// frame, in ascending id order.
    ///
    /// A view re-registered back to its committed params is not reported.
    pub fn changed_views(&mut self) -> ViewChanges {
        let geometry: Vec<i64> = self
            .dirty
            .drain(dirty::GEOMETRY)
            .deterministic()
            .run()
            .collect();
        let mutators: Vec<i64> = self
            .dirty
            .drain(dirty::MUTATORS)
            .deterministic()
            .run()
            .collect();

        let mut changes = ViewChanges::default();
        for view in geometry.into_iter().map(ViewId) {
            let Some(i) = self.index_of(view) else {
                continue;
            };
            match self.committed.get(&view) {
                None => changes.added.push(view),
                Some(c) if c.rect != self.entries[i].rect => changes.moved.push(view),
                Some(_) => {}
            }
        }
        for view in mutators.into_iter().map(ViewId) {
            let Some(i) = self.index_of(view) else {
                continue;
            };
            if self
                .committed
                .get(&view)
                .is_some_and(|c| c.mutators != self.entries[i].params.mutators)
            {
                changes.mutated.push(view);
            }
        }
        changes.removed = self
            .committed_order
            .iter()
            .copied()
            .filter(|v| !self.index.contains_key(v))
            .collect();
        changes
    }

    /// Makes the current frame the baseline for change detection.
    pub fn commit(&mut self) {
        self.discard_marks();
        for removed in &self.committed_order {
            if !self.index.contains_key(removed) {
                self.dirty.remove_key(removed.0);
            }
        }
        self.committed.clear();
        self.committed_order.clear();
        for entry in &self.entries {
            self.committed.insert(
                entry.id,
                CommittedView {
                    rect: entry.rect,
                    mutators: entry.params.mutators.clone(),
                },
            );
            self.committed_order.push(entry.id);
        }
    }

    /// Views of the last committed frame, back to front.
    #[must_use]
    pub fn committed_order(&self) -> &[ViewId] {
        &self.committed_order
    }

    fn mark_against_committed(&mut self, view: ViewId, rect: Rect, mutators: &MutatorsStack) {
        match self.committed.get(&view) {
            None => self.dirty.mark(view.0, dirty::GEOMETRY),
            Some(c) => {
                if c.rect != rect {
                    self.dirty.mark(view.0, dirty::GEOMETRY);
                }
                if c.mutators != *mutators {
                    self.dirty.mark(view.0, dirty::MUTATORS);
                }
            }
        }
    }

    fn discard_marks(&mut self) {
        for channel in [dirty::GEOMETRY, dirty::MUTATORS] {
            let _ = self.dirty.drain(channel).run().count();
        }
    }
}

/// Differences between the current frame and the committed one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewChanges {
    /// Views not present in the committed frame.
    pub added: Vec<ViewId>,
    /// Views whose rect changed.
    pub moved: Vec<ViewId>,
    /// Views whose mutators changed.
    pub mutated: Vec<ViewId>,
    /// Committed views not registered this frame, in committed order.
    pub removed: Vec<ViewId>,
}

impl ViewChanges {
    /// Returns `true` when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.moved.is_empty()
            && self.mutated.is_empty()
            && self.removed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
