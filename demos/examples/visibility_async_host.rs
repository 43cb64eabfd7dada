// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driving monitors from a host whose measurements resolve later.
//!
//! Measurement requests go into a queue and are answered after a latency. Slow answers make
//! the next cycle get skipped, answers for detached monitors are dropped, and a node that
//! cannot be measured never reports.
//!
//! Run:
//! - `RUST_LOG=understory_visibility=trace cargo run -p understory_demos --example visibility_async_host`

use std::collections::VecDeque;

use core::time::Duration;

use kurbo::Rect;
use understory_visibility::{
    MeasureError, MeasureRequest, Measurement, MonitorConfig, Thresholds, VisibilityTracker,
};

/// A measurement that will resolve at `ready_at`.
struct Pending {
    ready_at: Duration,
    request: MeasureRequest<&'static str>,
}

fn measure(node: &str) -> Result<Measurement, MeasureError> {
    match node {
        "banner" => Ok(Measurement::from_page_rect(Rect::new(0.0, 40.0, 320.0, 140.0))),
        "footer" => Ok(Measurement::from_page_rect(Rect::new(0.0, 600.0, 320.0, 700.0))),
        _ => Err(MeasureError::failed("no native view")),
    }
}

fn latency(node: &str) -> Duration {
    match node {
        "banner" => Duration::from_millis(30),
        // Slower than the monitor frequency: every other cycle is skipped.
        "footer" => Duration::from_millis(350),
        _ => Duration::from_millis(10),
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut tracker = VisibilityTracker::new(Rect::new(0.0, 0.0, 320.0, 480.0));
    let config = MonitorConfig::default()
        .with_frequency(Duration::from_millis(250))
        .with_thresholds(Thresholds::ANY);

    for node in ["banner", "footer", "ghost"] {
        tracker.attach(
            Duration::ZERO,
            node,
            None,
            config.clone().with_label(node),
            move |v| println!("{node}: visible={v}"),
        );
    }
    let banner = tracker
        .iter()
        .find(|(_, node, _)| **node == "banner")
        .map(|(id, _, _)| id);

    let mut queue: VecDeque<Pending> = VecDeque::new();
    let mut now = Duration::ZERO;
    let end = Duration::from_secs(2);
    while now <= end {
        for request in tracker.tick(now) {
            tracing::info!(node = request.node, ?now, "measuring");
            queue.push_back(Pending {
                ready_at: now + latency(request.node),
                request,
            });
        }
        queue.make_contiguous().sort_by_key(|p| p.ready_at);

        while let Some(front) = queue.front() {
            if front.ready_at > now {
                break;
            }
            let Some(Pending { request, .. }) = queue.pop_front() else {
                break;
            };
            let result = measure(request.node);
            tracker.complete(request.monitor, request.ticket, result);
        }

        // The banner unmounts after a second while one of its measurements may be in flight.
        if now == Duration::from_secs(1)
            && let Some(id) = banner
        {
            tracker.detach(id);
            println!("banner detached");
        }

        now += Duration::from_millis(10);
    }
}
