// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Impression tracking: count each ad once, the first time it is fully on screen.
//!
//! Run:
//! - `cargo run -p understory_demos --example visibility_impressions`

use std::cell::RefCell;
use std::rc::Rc;

use core::time::Duration;

use kurbo::Rect;
use understory_visibility::{
    Measure, MeasureError, Measurement, MonitorConfig, MonitorState, VisibilityTracker,
};

const AD_H: f64 = 120.0;
const GAP: f64 = 400.0;

struct Feed {
    scroll: f64,
}

impl Measure<usize> for Feed {
    fn measure(&mut self, ad: &usize) -> Result<Measurement, MeasureError> {
        let y = *ad as f64 * (AD_H + GAP) - self.scroll;
        Ok(Measurement::from_page_rect(Rect::new(0.0, y, 360.0, y + AD_H)))
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let impressions: Rc<RefCell<Vec<usize>>> = Rc::default();
    let mut tracker = VisibilityTracker::new(Rect::new(0.0, 0.0, 360.0, 640.0));
    let feed = tracker.provide_scope(None);
    tracker.scope_layout(feed, Rect::new(0.0, 0.0, 360.0, 640.0));

    let config = MonitorConfig::default()
        .with_frequency(Duration::from_millis(200))
        .with_run_once(true);
    for ad in 0..6 {
        let log = impressions.clone();
        tracker.attach(Duration::ZERO, ad, Some(feed), config.clone(), move |v| {
            if v {
                log.borrow_mut().push(ad);
            }
        });
    }

    // Scroll down and back up again; nothing is counted twice.
    let mut host = Feed { scroll: 0.0 };
    let mut now = Duration::ZERO;
    for scroll in (0..=24).chain((0..24).rev()).map(|s| f64::from(s) * 100.0) {
        host.scroll = scroll;
        now += Duration::from_millis(200);
        tracker.run_due(now, &mut host);
    }

    let dormant = tracker
        .iter()
        .filter(|(_, _, m)| m.state() == MonitorState::Dormant)
        .count();
    println!("impressions: {:?}", impressions.borrow());
    println!("{dormant} of {} monitors are dormant", tracker.len());
}
