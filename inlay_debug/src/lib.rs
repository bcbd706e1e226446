// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for inlay
//! diagnostics.
//!
//! This crate provides [`TraceSink`](inlay_core::trace::TraceSink)
//! implementations for development and post-mortem analysis of the frame
//! coordinator:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from
//!   recorded bytes.
//!
//! Sinks are owned by the coordinator once installed. Wrap one in a
//! [`SharedSink`](inlay_core::trace::SharedSink) to read it back afterwards.

pub mod chrome;
pub mod pretty;
pub mod recorder;
