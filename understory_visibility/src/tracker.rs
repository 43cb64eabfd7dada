// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-facing integration: scopes and monitors for a whole view hierarchy.
//!
//! ## Overview
//!
//! [`VisibilityTracker`] is what a UI toolkit wires into its event loop:
//!
//! - A *scope provider* (a scroll view, say) calls [`VisibilityTracker::provide_scope`] when
//!   mounted, forwards every layout event with [`VisibilityTracker::scope_layout`], and calls
//!   [`VisibilityTracker::remove_scope`] when unmounted.
//! - A *monitored element* calls [`VisibilityTracker::attach`] with its node handle and the
//!   nearest enclosing scope, forwards its own layout events with
//!   [`VisibilityTracker::element_layout`], and calls [`VisibilityTracker::detach`] on unmount.
//! - The event loop calls [`VisibilityTracker::tick`] whenever
//!   [`VisibilityTracker::next_deadline`] passes, measures the requested nodes, and hands the
//!   results back with [`VisibilityTracker::complete`].
//!
//! `K` is the toolkit's node handle; it is only cloned into [`MeasureRequest`]s.
//!
//! ## Synchronous hosts
//!
//! ```
//! use core::time::Duration;
//! use kurbo::Rect;
//! use understory_visibility::{
//!     Measure, MeasureError, Measurement, MonitorConfig, Thresholds, VisibilityTracker,
//! };
//!
//! struct Rows;
//! impl Measure<u32> for Rows {
//!     fn measure(&mut self, row: &u32) -> Result<Measurement, MeasureError> {
//!         let y = f64::from(*row) * 250.0;
//!         Ok(Measurement::from_page_rect(Rect::new(0.0, y, 390.0, y + 250.0)))
//!     }
//! }
//!
//! let mut tracker = VisibilityTracker::new(Rect::new(0.0, 0.0, 390.0, 844.0));
//! let list = tracker.provide_scope(None);
//! tracker.scope_layout(list, Rect::new(0.0, 0.0, 390.0, 600.0));
//!
//! let config = MonitorConfig::default().with_thresholds(Thresholds::new(1.0, 0.7));
//! let row = tracker.attach(Duration::ZERO, 2, Some(list), config, |visible| {
//!     assert!(!visible);
//! });
//!
//! let now = tracker.next_deadline().unwrap();
//! assert_eq!(tracker.run_due(now, &mut Rows), 1);
//! assert_eq!(tracker.monitor(row).unwrap().last_visibility(), Some(false));
//! ```

use alloc::vec::Vec;
use core::time::Duration;

use kurbo::Rect;

use crate::config::MonitorConfig;
use crate::measure::{Measure, MeasureError, Measurement, Ticket};
use crate::monitor::Monitor;
use crate::scope::{ScopeId, ScopeTree};

/// Identifier for a monitor in a [`VisibilityTracker`] (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MonitorId(u32, u32);

impl MonitorId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A measurement the host should perform.
///
/// Return the result with [`VisibilityTracker::complete`], passing `monitor` and `ticket`
/// back unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeasureRequest<K> {
    /// Monitor that asked for the measurement.
    pub monitor: MonitorId,
    /// Ticket identifying this measurement.
    pub ticket: Ticket,
    /// Node to measure.
    pub node: K,
}

#[derive(Debug)]
struct Entry<K> {
    generation: u32,
    node: K,
    monitor: Monitor,
}

/// Scopes and monitors for one view hierarchy.
#[derive(Debug)]
pub struct VisibilityTracker<K> {
    scopes: ScopeTree,
    // Freed slots keep their last generation so the next occupant can bump it.
    entries: Vec<(u32, Option<Entry<K>>)>,
    free_list: Vec<usize>,
}

impl<K> VisibilityTracker<K> {
    /// Create a tracker whose fallback container is `surface`.
    pub fn new(surface: Rect) -> Self {
        Self {
            scopes: ScopeTree::new(surface),
            entries: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// The scope tree.
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// The scope tree, mutably.
    pub fn scopes_mut(&mut self) -> &mut ScopeTree {
        &mut self.scopes
    }

    /// Replace the display-surface fallback.
    pub fn set_surface(&mut self, surface: Rect) {
        self.scopes.set_surface(surface);
    }

    /// Mount a scope provider nested under `parent`.
    pub fn provide_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.insert(parent)
    }

    /// Forward a layout event from a scope provider.
    ///
    /// Returns `false` if the scope is gone or the layout was rejected as degenerate.
    pub fn scope_layout(&mut self, scope: ScopeId, rect: Rect) -> bool {
        self.scopes.write(scope, rect)
    }

    /// Unmount a scope provider and everything nested inside it.
    pub fn remove_scope(&mut self, scope: ScopeId) {
        self.scopes.remove(scope);
    }

    /// Start monitoring `node` against its nearest enclosing `scope`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "MonitorId uses 32-bit indices by design."
    )]
    pub fn attach(
        &mut self,
        now: Duration,
        node: K,
        scope: Option<ScopeId>,
        config: MonitorConfig,
        on_change: impl FnMut(bool) + 'static,
    ) -> MonitorId {
        let monitor = Monitor::new(now, config, on_change).with_scope(scope);
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.entries[idx].0 + 1;
            self.entries[idx] = (
                generation,
                Some(Entry {
                    generation,
                    node,
                    monitor,
                }),
            );
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.entries.push((
                generation,
                Some(Entry {
                    generation,
                    node,
                    monitor,
                }),
            ));
            (self.entries.len() - 1, generation)
        };
        MonitorId::new(idx as u32, generation)
    }

    /// Stop monitoring and return the node handle.
    ///
    /// The monitor is destroyed; results for its outstanding measurement are discarded.
    pub fn detach(&mut self, id: MonitorId) -> Option<K> {
        self.entry(id)?;
        let mut entry = self.entries[id.idx()].1.take()?;
        entry.monitor.destroy();
        self.free_list.push(id.idx());
        Some(entry.node)
    }

    /// The monitor for `id`, if attached.
    pub fn monitor(&self, id: MonitorId) -> Option<&Monitor> {
        Some(&self.entry(id)?.monitor)
    }

    /// The monitor for `id`, mutably.
    pub fn monitor_mut(&mut self, id: MonitorId) -> Option<&mut Monitor> {
        Some(&mut self.entry_mut(id)?.monitor)
    }

    /// The node handle for `id`.
    pub fn node(&self, id: MonitorId) -> Option<&K> {
        Some(&self.entry(id)?.node)
    }

    /// Forward a layout event from a monitored element.
    pub fn element_layout(&mut self, id: MonitorId, now: Duration) {
        if let Some(entry) = self.entry_mut(id) {
            entry.monitor.on_layout(now);
        }
    }

    /// Apply a measurement result.
    ///
    /// Results for detached monitors or stale tickets are dropped. Returns the value passed
    /// to the monitor's callback, if it was invoked.
    pub fn complete(
        &mut self,
        id: MonitorId,
        ticket: Ticket,
        result: Result<Measurement, MeasureError>,
    ) -> Option<bool> {
        let slot = self.entries.get_mut(id.idx())?;
        match slot.1.as_mut() {
            Some(entry) if entry.generation == id.1 => {
                entry.monitor.complete(ticket, result, &self.scopes)
            }
            _ => {
                tracing::trace!(?id, ?ticket, "discarding measurement for detached monitor");
                None
            }
        }
    }

    /// Earliest deadline across all monitors.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.iter().filter_map(|(_, _, m)| m.next_deadline()).min()
    }

    /// Number of attached monitors.
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_list.len()
    }

    /// True if no monitors are attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate attached monitors with their ids and nodes.
    pub fn iter(&self) -> impl Iterator<Item = (MonitorId, &K, &Monitor)> + '_ {
        self.entries.iter().enumerate().filter_map(|(idx, (_, slot))| {
            let entry = slot.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "MonitorId uses 32-bit indices by design."
            )]
            let id = MonitorId::new(idx as u32, entry.generation);
            Some((id, &entry.node, &entry.monitor))
        })
    }

    fn entry(&self, id: MonitorId) -> Option<&Entry<K>> {
        let entry = self.entries.get(id.idx())?.1.as_ref()?;
        (entry.generation == id.1).then_some(entry)
    }

    fn entry_mut(&mut self, id: MonitorId) -> Option<&mut Entry<K>> {
        let entry = self.entries.get_mut(id.idx())?.1.as_mut()?;
        if entry.generation != id.1 {
            return None;
        }
        Some(entry)
    }
}

impl<K: Clone> VisibilityTracker<K> {
    /// Poll every monitor and collect the measurements that are due.
    pub fn tick(&mut self, now: Duration) -> Vec<MeasureRequest<K>> {
        let mut out = Vec::new();
        for (idx, (_, slot)) in self.entries.iter_mut().enumerate() {
            let Some(entry) = slot.as_mut() else {
                continue;
            };
            if let Some(ticket) = entry.monitor.poll(now) {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "MonitorId uses 32-bit indices by design."
                )]
                let monitor = MonitorId::new(idx as u32, entry.generation);
                out.push(MeasureRequest {
                    monitor,
                    ticket,
                    node: entry.node.clone(),
                });
            }
        }
        out
    }

    /// Tick and complete every due measurement synchronously through `host`.
    ///
    /// Returns the number of callbacks invoked.
    pub fn run_due(&mut self, now: Duration, host: &mut impl Measure<K>) -> usize {
        let mut reported = 0;
        for req in self.tick(now) {
            let result = host.measure(&req.node);
            if self.complete(req.monitor, req.ticket, result).is_some() {
                reported += 1;
            }
        }
        reported
    }
}
