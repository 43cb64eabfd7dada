// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element visibility monitor: a polled state machine that reports visibility changes.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──start──▶ Active ──poll──▶ Measuring ──complete──▶ Active
//!                                                  │
//!                                                  └─ run_once && visible ──▶ Dormant
//! Dormant ──reset──▶ Active
//! any state ──destroy──▶ Destroyed (terminal)
//! ```
//!
//! The monitor owns no timers. The host passes the current time into [`Monitor::poll`] and
//! asks [`Monitor::next_deadline`] when to call it next. A due cycle hands out a [`Ticket`];
//! the host measures the element and returns the ticket with the result through
//! [`Monitor::complete`].
//!
//! ## Ordering
//!
//! At most one measurement is outstanding. A cycle that comes due while one is in flight is
//! skipped, not queued. Results for anything but the latest ticket are dropped, as are
//! results that arrive after [`Monitor::destroy`].
//!
//! ## Container
//!
//! Each cycle resolves the container from the monitor's scope in the [`ScopeTree`]. When the
//! scope has no layout (or is gone) the last rectangle seen from it is reused, and when there
//! is none the tree's display surface is used.

use alloc::boxed::Box;
use core::time::Duration;

use kurbo::Rect;

use crate::config::{MonitorConfig, ReportPolicy, SETTLE_DELAY};
use crate::geometry::is_visible;
use crate::measure::{MeasureError, Measurement, Ticket};
use crate::scope::{ScopeId, ScopeTree};

/// Lifecycle state of a [`Monitor`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MonitorState {
    /// Constructed but not started.
    Idle,
    /// Waiting for the next cycle.
    Active,
    /// A measurement is outstanding.
    Measuring,
    /// Stopped after a `run_once` report; can be [reset](Monitor::reset).
    Dormant,
    /// Torn down; nothing will be reported again.
    Destroyed,
}

/// Polled visibility monitor for one element.
pub struct Monitor {
    config: MonitorConfig,
    on_change: Box<dyn FnMut(bool)>,
    state: MonitorState,
    last_visibility: Option<bool>,
    next_due: Option<Duration>,
    in_flight: Option<Ticket>,
    next_ticket: u64,
    scope: Option<ScopeId>,
    container: Option<Rect>,
    seen_layout: bool,
}

impl core::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("last_visibility", &self.last_visibility)
            .field("next_due", &self.next_due)
            .field("in_flight", &self.in_flight)
            .field("scope", &self.scope)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl Monitor {
    /// Create a monitor that calls `on_change` with each reported visibility.
    ///
    /// Out-of-range configuration values are logged and kept as given. If
    /// [`MonitorConfig::start_immediately`] is set the monitor starts at `now`.
    pub fn new(
        now: Duration,
        config: MonitorConfig,
        on_change: impl FnMut(bool) + 'static,
    ) -> Self {
        for problem in config.problems() {
            tracing::warn!(
                label = ?config.label,
                %problem,
                "invalid visibility monitor configuration"
            );
        }
        let start = config.start_immediately;
        let mut monitor = Self {
            config,
            on_change: Box::new(on_change),
            state: MonitorState::Idle,
            last_visibility: None,
            next_due: None,
            in_flight: None,
            next_ticket: 0,
            scope: None,
            container: None,
            seen_layout: false,
        };
        if start {
            monitor.start(now);
        }
        monitor
    }

    /// Measure against `scope` (the nearest enclosing scope) instead of the display surface.
    pub fn with_scope(mut self, scope: Option<ScopeId>) -> Self {
        self.scope = scope;
        self
    }

    /// Configuration this monitor runs with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Visibility computed by the last successful cycle, reported or not.
    pub fn last_visibility(&self) -> Option<bool> {
        self.last_visibility
    }

    /// When [`Monitor::poll`] next has work to do, if ever.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.next_due
    }

    /// Whether a measurement is outstanding.
    pub fn is_measuring(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The scope this monitor measures against.
    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    /// Move the monitor under another scope, forgetting the container cached from the old one.
    pub fn set_scope(&mut self, scope: Option<ScopeId>) {
        if self.scope != scope {
            self.scope = scope;
            self.container = None;
        }
    }

    /// Activate an idle or dormant monitor.
    ///
    /// The first cycle is due after [`SETTLE_DELAY`], then every
    /// [`frequency`](MonitorConfig::frequency).
    pub fn start(&mut self, now: Duration) {
        if matches!(self.state, MonitorState::Idle | MonitorState::Dormant) {
            self.state = MonitorState::Active;
            self.next_due = Some(now.saturating_add(SETTLE_DELAY));
        }
    }

    /// Notify the monitor that the element was laid out.
    ///
    /// The first layout re-arms the initial cycle so it runs [`SETTLE_DELAY`] after the
    /// element actually has geometry. Later layouts are ignored; polling picks them up.
    pub fn on_layout(&mut self, now: Duration) {
        if self.seen_layout {
            return;
        }
        self.seen_layout = true;
        if matches!(self.state, MonitorState::Active | MonitorState::Measuring) {
            self.next_due = Some(now.saturating_add(SETTLE_DELAY));
        }
    }

    /// Run the scheduler: returns a ticket if a measurement should be started now.
    pub fn poll(&mut self, now: Duration) -> Option<Ticket> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        self.next_due = Some(self.following_deadline(due, now));
        if let Some(ticket) = self.in_flight {
            tracing::trace!(
                label = ?self.config.label,
                ?ticket,
                "measurement in flight, skipping cycle"
            );
            return None;
        }
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        self.state = MonitorState::Measuring;
        Some(ticket)
    }

    /// Apply the result of the measurement identified by `ticket`.
    ///
    /// Returns the value passed to the callback, or `None` if the callback was not invoked
    /// (stale ticket, failed measurement, or unchanged visibility under
    /// [`ReportPolicy::OnChange`]).
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<Measurement, MeasureError>,
        scopes: &ScopeTree,
    ) -> Option<bool> {
        if self.state == MonitorState::Destroyed || self.in_flight != Some(ticket) {
            tracing::trace!(label = ?self.config.label, ?ticket, "discarding stale measurement");
            return None;
        }
        self.in_flight = None;
        self.state = MonitorState::Active;

        let element = match result.and_then(|m| m.page_rect()) {
            Ok(rect) => rect,
            Err(err) => {
                tracing::warn!(label = ?self.config.label, %err, "skipping visibility cycle");
                return None;
            }
        };

        if let Some(rect) = scopes.resolve(self.scope) {
            self.container = Some(rect);
        }
        let container = self.container.unwrap_or_else(|| scopes.surface());
        let visible = is_visible(container, element, self.config.thresholds);

        let changed = self.last_visibility != Some(visible);
        self.last_visibility = Some(visible);
        let report = changed || self.config.report == ReportPolicy::EveryCycle;
        if report {
            tracing::debug!(
                label = ?self.config.label,
                visible,
                ?element,
                ?container,
                "visibility reported"
            );
            (self.on_change)(visible);
        }

        if self.config.run_once && visible {
            self.state = MonitorState::Dormant;
            self.next_due = None;
        }
        report.then_some(visible)
    }

    /// Re-arm the monitor as if freshly started, forgetting the last visibility.
    ///
    /// Any outstanding measurement becomes stale. Has no effect once destroyed.
    pub fn reset(&mut self, now: Duration) {
        if self.state == MonitorState::Destroyed {
            return;
        }
        self.last_visibility = None;
        self.in_flight = None;
        self.state = MonitorState::Active;
        self.next_due = Some(now.saturating_add(SETTLE_DELAY));
    }

    /// Tear down: cancel scheduling and discard any outstanding measurement.
    pub fn destroy(&mut self) {
        self.state = MonitorState::Destroyed;
        self.next_due = None;
        self.in_flight = None;
    }

    fn following_deadline(&self, due: Duration, now: Duration) -> Duration {
        // Missed cycles are dropped rather than replayed.
        let next = due.saturating_add(self.config.frequency);
        if next > now {
            next
        } else {
            now.saturating_add(self.config.frequency)
        }
    }
}
