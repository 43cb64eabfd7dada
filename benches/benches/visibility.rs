// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Rect;
use understory_visibility::{
    Measure, MeasureError, Measurement, MonitorConfig, Thresholds, VisibilityTracker, is_visible,
};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Random element rectangles scattered around (and partly outside) a 1000×1000 viewport.
fn gen_random_rects(count: usize) -> Vec<Rect> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x0 = rng.next_f64() * 1400.0 - 200.0;
        let y0 = rng.next_f64() * 1400.0 - 200.0;
        let w = rng.next_f64() * 300.0;
        let h = rng.next_f64() * 300.0;
        out.push(Rect::new(x0, y0, x0 + w, y0 + h));
    }
    out
}

/// Rows of a scrolling list; every measurement offsets them by `scroll`.
struct List {
    scroll: f64,
    row_h: f64,
}

impl Measure<usize> for List {
    fn measure(&mut self, row: &usize) -> Result<Measurement, MeasureError> {
        let y = *row as f64 * self.row_h - self.scroll;
        Ok(Measurement::from_page_rect(Rect::new(0.0, y, 400.0, y + self.row_h)))
    }
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");
    let viewport = Rect::new(0.0, 0.0, 1000.0, 1000.0);
    let rects = gen_random_rects(10_000);
    group.throughput(Throughput::Elements(rects.len() as u64));
    for (name, thresholds) in [
        ("any", Thresholds::ANY),
        ("half", Thresholds::new(0.5, 0.5)),
        ("full", Thresholds::FULL),
    ] {
        group.bench_function(format!("is_visible_{name}"), |b| {
            b.iter(|| {
                let visible = rects
                    .iter()
                    .filter(|r| is_visible(viewport, **r, thresholds))
                    .count();
                black_box(visible);
            });
        });
    }
    group.finish();
}

fn bench_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker");
    for &n in &[100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("run_due_scroll_n{n}"), |b| {
            b.iter_batched(
                || {
                    let mut tracker = VisibilityTracker::new(Rect::new(0.0, 0.0, 400.0, 800.0));
                    let list = tracker.provide_scope(None);
                    tracker.scope_layout(list, Rect::new(0.0, 0.0, 400.0, 800.0));
                    let config = MonitorConfig::default()
                        .with_frequency(Duration::from_millis(100))
                        .with_thresholds(Thresholds::new(1.0, 0.5));
                    for row in 0..n {
                        tracker.attach(Duration::ZERO, row, Some(list), config.clone(), |v| {
                            black_box(v);
                        });
                    }
                    tracker
                },
                |mut tracker| {
                    let mut host = List {
                        scroll: 0.0,
                        row_h: 40.0,
                    };
                    let mut reported = 0;
                    for step in 0..10_u32 {
                        host.scroll = f64::from(step) * 120.0;
                        let now = Duration::from_millis(100 + u64::from(step) * 100);
                        reported += tracker.run_due(now, &mut host);
                    }
                    black_box(reported);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_geometry, bench_tracker);
criterion_main!(benches);
