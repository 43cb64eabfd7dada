// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_visibility --heading-base-level=0

//! Understory Visibility: know when an element scrolls into (or out of) view.
//!
//! Understory Visibility is a reusable building block for lazy loading, impression tracking, and
//! scroll-triggered animation.
//!
//! - Decides whether an element rectangle is visible inside a container rectangle, with an
//!   independent minimum visible fraction per axis.
//! - Tracks the container rectangles of nested scroll regions in an explicit scope tree.
//! - Polls each monitored element on a fixed frequency and reports visibility transitions to a
//!   callback.
//!
//! ## Host-agnostic
//!
//! This crate owns no timers, threads, or views. The host passes the current time in and asks
//! when it should be called next; measuring a node is a request the host fulfils, possibly
//! asynchronously, by handing back a [`Ticket`] with the result. Any number of layout passes,
//! frames, or event-loop turns can happen in between.
//!
//! ## Not an occlusion test
//!
//! Visibility is purely geometric. An element hidden behind an opaque sibling is still visible
//! as far as this crate is concerned.
//!
//! ## API overview
//!
//! - [`is_visible`] and [`Thresholds`]: the pure intersection test.
//! - [`ScopeTree`], [`ScopeId`], [`LayoutSlot`]: nested container rectangles with a
//!   display-surface fallback.
//! - [`Monitor`] and [`MonitorConfig`]: per-element polling state machine.
//! - [`VisibilityTracker`]: scopes plus monitors keyed by the host's node handles.
//! - [`Measurement`], [`MeasureError`], [`Measure`]: what the host reports back.
//!
//! Key operations:
//! - [`VisibilityTracker::provide_scope`] / [`VisibilityTracker::scope_layout`]
//! - [`VisibilityTracker::attach`] / [`VisibilityTracker::detach`]
//! - [`VisibilityTracker::tick`] → [`MeasureRequest`]s, then [`VisibilityTracker::complete`]
//! - [`VisibilityTracker::next_deadline`] to schedule the next wake-up.
//!
//! ## Reporting
//!
//! By default a monitor calls back only when the visibility differs from the previous
//! successful cycle (the first result is always reported). Set
//! [`ReportPolicy::EveryCycle`] to be called after every cycle instead. With
//! [`MonitorConfig::run_once`] the monitor goes dormant after reporting `true`.
//!
//! ## Diagnostics
//!
//! Problems are logged with [`tracing`]: out-of-range configuration and failed measurements at
//! `warn`, rejected scope layouts and reports at `debug`, discarded stale results at `trace`.
//! Nothing here panics or returns an error to the host.
//!
//! # Example
//!
//! ```rust
//! use core::cell::Cell;
//! use core::time::Duration;
//! use std::rc::Rc;
//! use kurbo::Rect;
//! use understory_visibility::{Measurement, MonitorConfig, Thresholds, VisibilityTracker};
//!
//! let mut tracker = VisibilityTracker::new(Rect::new(0.0, 0.0, 390.0, 844.0));
//!
//! // A scroll view publishes its frame.
//! let list = tracker.provide_scope(None);
//! tracker.scope_layout(list, Rect::new(0.0, 100.0, 390.0, 844.0));
//!
//! // A row wants to know when at least 70% of its height is on screen.
//! let seen = Rc::new(Cell::new(None));
//! let sink = seen.clone();
//! let row = tracker.attach(
//!     Duration::ZERO,
//!     "row-4",
//!     Some(list),
//!     MonitorConfig::default()
//!         .with_frequency(Duration::from_millis(300))
//!         .with_thresholds(Thresholds::new(1.0, 0.7)),
//!     move |visible| sink.set(Some(visible)),
//! );
//!
//! // The event loop wakes up and measures what was asked for.
//! let now = tracker.next_deadline().unwrap();
//! for req in tracker.tick(now) {
//!     assert_eq!(req.node, "row-4");
//!     let frame = Measurement::from_page_rect(Rect::new(0.0, 700.0, 390.0, 950.0));
//!     tracker.complete(req.monitor, req.ticket, Ok(frame));
//! }
//! // Only 144 of 250 rows are inside the list.
//! assert_eq!(seen.get(), Some(false));
//!
//! // Unmounting the row cancels everything.
//! tracker.detach(row);
//! assert_eq!(tracker.next_deadline(), None);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod geometry;
pub mod measure;
pub mod monitor;
pub mod scope;
pub mod tracker;

pub use config::{ConfigError, DEFAULT_FREQUENCY, MonitorConfig, ReportPolicy, SETTLE_DELAY};
pub use geometry::{Thresholds, is_visible, visible_fraction};
pub use measure::{Measure, MeasureError, Measurement, Ticket};
pub use monitor::{Monitor, MonitorState};
pub use scope::{LayoutSlot, ScopeId, ScopeTree};
pub use tracker::{MeasureRequest, MonitorId, VisibilityTracker};
