// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A vertical list with a horizontal strip nested inside it, scrolled on a timeline.
//!
//! Rows need 70% of their height inside the list; cards need 70% of their width inside
//! the strip. Transitions are printed as they are reported.
//!
//! Run:
//! - `cargo run -p understory_demos --example visibility_scroll_list`
//! - `RUST_LOG=understory_visibility=debug cargo run -p understory_demos --example visibility_scroll_list`

use core::time::Duration;

use kurbo::Rect;
use understory_visibility::{
    Measure, MeasureError, Measurement, MonitorConfig, Thresholds, VisibilityTracker,
};

const SCREEN: Rect = Rect::new(0.0, 0.0, 390.0, 844.0);
const HEADER_H: f64 = 100.0;
const ROWS: usize = 10;
const ROW_H: f64 = 250.0;
const ROW_PITCH: f64 = ROW_H + 24.0;
const CARDS: usize = 10;
const CARD_W: f64 = 200.0;
const CARD_PITCH: f64 = CARD_W + 16.0;
const STRIP_TOP: f64 = ROWS as f64 * ROW_PITCH + 12.0;
const STRIP_H: f64 = 150.0;

#[derive(Clone, Copy, Debug)]
enum Node {
    Row(usize),
    Card(usize),
}

/// Stand-in for the UI toolkit: knows where everything is for a given scroll position.
struct Host {
    scroll_y: f64,
    scroll_x: f64,
}

impl Host {
    fn list_frame(&self) -> Rect {
        Rect::new(0.0, HEADER_H, SCREEN.x1, SCREEN.y1)
    }

    fn strip_frame(&self) -> Rect {
        let y = HEADER_H + STRIP_TOP - self.scroll_y;
        Rect::new(0.0, y, SCREEN.x1, y + STRIP_H)
    }

    fn advance(&mut self, now: Duration) {
        let steps = (now.as_millis() / 300) as f64;
        self.scroll_y = (steps * 200.0).min(STRIP_TOP + STRIP_H - 400.0);
        let strip_steps = (now.as_millis().saturating_sub(4_000) / 300) as f64;
        self.scroll_x = (strip_steps * 150.0).min(CARDS as f64 * CARD_PITCH - SCREEN.x1);
    }
}

impl Measure<Node> for Host {
    fn measure(&mut self, node: &Node) -> Result<Measurement, MeasureError> {
        let rect = match *node {
            Node::Row(i) => {
                let y = HEADER_H + i as f64 * ROW_PITCH - self.scroll_y;
                Rect::new(0.0, y, SCREEN.x1, y + ROW_H)
            }
            Node::Card(i) => {
                let x = 8.0 + i as f64 * CARD_PITCH - self.scroll_x;
                let strip = self.strip_frame();
                Rect::new(x, strip.y0, x + CARD_W, strip.y1)
            }
        };
        Ok(Measurement::from_page_rect(rect))
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut host = Host {
        scroll_y: 0.0,
        scroll_x: 0.0,
    };
    let mut tracker = VisibilityTracker::new(SCREEN);
    let list = tracker.provide_scope(None);
    let strip = tracker.provide_scope(Some(list));
    tracker.scope_layout(list, host.list_frame());
    tracker.scope_layout(strip, host.strip_frame());

    let frequency = Duration::from_millis(300);
    for i in 0..ROWS {
        let config = MonitorConfig::default()
            .with_frequency(frequency)
            .with_thresholds(Thresholds::new(1.0, 0.7))
            .with_label(format!("row-{i}"));
        tracker.attach(Duration::ZERO, Node::Row(i), Some(list), config, move |v| {
            println!("row {i}: {}", if v { "in view" } else { "out of view" });
        });
    }
    for i in 0..CARDS {
        let config = MonitorConfig::default()
            .with_frequency(frequency)
            .with_thresholds(Thresholds::new(0.7, 1.0))
            .with_label(format!("card-{i}"));
        tracker.attach(Duration::ZERO, Node::Card(i), Some(strip), config, move |v| {
            println!("card {i}: {}", if v { "in view" } else { "out of view" });
        });
    }

    let end = Duration::from_secs(8);
    while let Some(now) = tracker.next_deadline() {
        if now > end {
            break;
        }
        host.advance(now);
        // The strip provider republishes its frame as the list scrolls it.
        tracker.scope_layout(strip, host.strip_frame());
        let reported = tracker.run_due(now, &mut host);
        if reported > 0 {
            println!(
                "t={}ms scroll=({:.0}, {:.0}) -> {reported} change(s)",
                now.as_millis(),
                host.scroll_x,
                host.scroll_y
            );
        }
    }
}
