// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Threshold intersection: decide whether an element is visible inside a container.
//!
//! ## Semantics
//!
//! Both rectangles live in the same coordinate space. The element counts as visible when
//! the fraction of its own width inside the container is at least [`Thresholds::width`]
//! and the fraction of its own height inside the container is at least
//! [`Thresholds::height`]. The axes are independent.
//!
//! - Rectangles that do not overlap are never visible, whatever the thresholds (even `0.0`).
//!   Rectangles that only share an edge do not overlap.
//! - A degenerate element (zero or negative width or height) is never visible.
//! - Non-finite coordinates are never visible.
//!
//! ```
//! use kurbo::Rect;
//! use understory_visibility::{Thresholds, is_visible};
//!
//! let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
//! let half_out = Rect::new(50.0, 0.0, 150.0, 100.0);
//! assert!(is_visible(viewport, half_out, Thresholds::new(0.3, 1.0)));
//! assert!(!is_visible(viewport, half_out, Thresholds::new(0.6, 1.0)));
//! ```

use kurbo::{Rect, Vec2};

/// Minimum fraction of an element's own size that must lie inside its container.
///
/// Values are nominally in `[0, 1]`. Out-of-range values are not clamped: a threshold
/// above `1.0` can never be met, and a negative one is met by any overlap.
/// See [`Thresholds::is_in_range`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Thresholds {
    /// Required visible fraction of the element's width.
    pub width: f64,
    /// Required visible fraction of the element's height.
    pub height: f64,
}

impl Thresholds {
    /// The whole element must be inside the container.
    pub const FULL: Self = Self::new(1.0, 1.0);

    /// Any overlap at all is enough.
    pub const ANY: Self = Self::new(f64::MIN_POSITIVE, f64::MIN_POSITIVE);

    /// Create thresholds for the width and height axes.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True if both fractions lie in `[0, 1]`.
    pub fn is_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.width) && (0.0..=1.0).contains(&self.height)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::FULL
    }
}

/// Whether `element` is visible inside `container` for the given thresholds.
///
/// Pure and deterministic; see the [module docs](self) for the exact rules.
pub fn is_visible(container: Rect, element: Rect, thresholds: Thresholds) -> bool {
    match visible_fraction(container, element) {
        Some(frac) => frac.x >= thresholds.width && frac.y >= thresholds.height,
        None => false,
    }
}

/// Per-axis fraction of `element` that lies inside `container`.
///
/// Returns `None` when the rectangles do not overlap, when the element is degenerate,
/// or when any coordinate is not finite. Otherwise `x` is the visible fraction of the
/// element's width and `y` the visible fraction of its height, both in `(0, 1]`.
pub fn visible_fraction(container: Rect, element: Rect) -> Option<Vec2> {
    if !is_finite_rect(container) || !is_finite_rect(element) {
        return None;
    }

    let left = element.x0.max(container.x0);
    let right = element.x1.min(container.x1);
    let top = element.y0.max(container.y0);
    let bottom = element.y1.min(container.y1);

    // The span must be checked for inversion before it is measured: a disjoint pair
    // can still produce a positive absolute difference.
    if right <= left || bottom <= top {
        return None;
    }

    let width = element.width();
    let height = element.height();
    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    Some(Vec2::new((right - left) / width, (bottom - top) / height))
}

fn is_finite_rect(r: Rect) -> bool {
    r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xywh(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, x + w, y + h)
    }

    const SAMPLE_FRACTIONS: [f64; 6] = [0.0, 0.1, 0.3, 0.5, 0.9, 1.0];

    #[test]
    fn identical_rects_are_fully_visible() {
        let c = xywh(0.0, 0.0, 100.0, 100.0);
        assert!(is_visible(c, c, Thresholds::FULL));
    }

    #[test]
    fn disjoint_element_is_never_visible() {
        let c = xywh(0.0, 0.0, 100.0, 100.0);
        let e = xywh(150.0, 0.0, 50.0, 50.0);
        for &w in &SAMPLE_FRACTIONS {
            for &h in &SAMPLE_FRACTIONS {
                assert!(!is_visible(c, e, Thresholds::new(w, h)), "({w}, {h})");
            }
        }
        assert!(!is_visible(c, e, Thresholds::new(-1.0, -1.0)));
    }

    #[test]
    fn gap_equal_to_element_size_is_not_a_false_positive() {
        // |min(200, 100) - max(150, 0)| == 50 == element width, yet there is no overlap.
        let c = xywh(0.0, 0.0, 100.0, 100.0);
        let e = xywh(150.0, 150.0, 50.0, 50.0);
        assert!(!is_visible(c, e, Thresholds::FULL));
        assert_eq!(visible_fraction(c, e), None);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let c = xywh(0.0, 0.0, 100.0, 100.0);
        let right = xywh(100.0, 0.0, 50.0, 50.0);
        let below = xywh(0.0, 100.0, 50.0, 50.0);
        assert!(!is_visible(c, right, Thresholds::new(0.0, 0.0)));
        assert!(!is_visible(c, below, Thresholds::new(0.0, 0.0)));
    }

    #[test]
    fn partial_width_against_threshold() {
        let c = xywh(0.0, 0.0, 100.0, 100.0);
        let e = xywh(50.0, 0.0, 100.0, 100.0);
        assert!(is_visible(c, e, Thresholds::new(0.3, 1.0)));
        assert!(is_visible(c, e, Thresholds::new(0.5, 1.0)));
        assert!(!is_visible(c, e, Thresholds::new(0.6, 1.0)));
        assert_eq!(visible_fraction(c, e), Some(Vec2::new(0.5, 1.0)));
    }

    #[test]
    fn partial_height_against_threshold() {
        let c = xywh(0.0, 0.0, 200.0, 400.0);
        let e = xywh(0.0, 300.0, 200.0, 250.0);
        // 100 of 250 rows visible.
        assert!(is_visible(c, e, Thresholds::new(1.0, 0.4)));
        assert!(!is_visible(c, e, Thresholds::new(1.0, 0.7)));
    }

    #[test]
    fn contained_element_is_visible_up_to_full() {
        let c = xywh(-20.0, -20.0, 300.0, 300.0);
        let inner = [
            xywh(0.0, 0.0, 10.0, 10.0),
            xywh(-20.0, -20.0, 300.0, 300.0),
            xywh(100.0, 5.0, 179.5, 0.5),
        ];
        for e in inner {
            for &w in &SAMPLE_FRACTIONS {
                for &h in &SAMPLE_FRACTIONS {
                    assert!(is_visible(c, e, Thresholds::new(w, h)), "{e:?} ({w}, {h})");
                }
            }
        }
    }

    #[test]
    fn degenerate_element_is_never_visible() {
        let c = xywh(0.0, 0.0, 100.0, 100.0);
        let flat = xywh(10.0, 10.0, 50.0, 0.0);
        let thin = xywh(10.0, 10.0, 0.0, 50.0);
        let point = xywh(10.0, 10.0, 0.0, 0.0);
        for e in [flat, thin, point] {
            assert!(!is_visible(c, e, Thresholds::new(0.0, 0.0)));
            assert!(!is_visible(c, e, Thresholds::new(-1.0, -1.0)));
            assert_eq!(visible_fraction(c, e), None);
        }
    }

    #[test]
    fn degenerate_container_hides_everything() {
        let c = xywh(0.0, 0.0, 0.0, 100.0);
        let e = xywh(0.0, 0.0, 10.0, 10.0);
        assert!(!is_visible(c, e, Thresholds::ANY));
    }

    #[test]
    fn inverted_element_is_rejected() {
        let c = xywh(0.0, 0.0, 100.0, 100.0);
        let inverted = Rect::new(60.0, 60.0, 40.0, 40.0);
        assert!(!is_visible(c, inverted, Thresholds::new(-1.0, -1.0)));
    }

    #[test]
    fn non_finite_input_is_not_visible() {
        let c = xywh(0.0, 0.0, 100.0, 100.0);
        let nan = Rect::new(f64::NAN, 0.0, 10.0, 10.0);
        let inf = Rect::new(0.0, 0.0, f64::INFINITY, 10.0);
        assert!(!is_visible(c, nan, Thresholds::ANY));
        assert!(!is_visible(c, inf, Thresholds::ANY));
        assert!(!is_visible(nan, c, Thresholds::ANY));
    }

    #[test]
    fn repeated_calls_agree() {
        let c = xywh(0.0, 0.0, 100.0, 100.0);
        let e = xywh(70.0, 70.0, 60.0, 60.0);
        let t = Thresholds::new(0.5, 0.5);
        let first = is_visible(c, e, t);
        for _ in 0..8 {
            assert_eq!(is_visible(c, e, t), first);
        }
    }

    #[test]
    fn lowering_thresholds_never_hides() {
        let c = xywh(0.0, 0.0, 100.0, 100.0);
        let cases = [
            xywh(70.0, 40.0, 60.0, 60.0),
            xywh(-30.0, -10.0, 60.0, 40.0),
            xywh(10.0, 10.0, 20.0, 20.0),
            xywh(99.0, 0.0, 10.0, 100.0),
        ];
        for e in cases {
            for &w in &SAMPLE_FRACTIONS {
                for &h in &SAMPLE_FRACTIONS {
                    if !is_visible(c, e, Thresholds::new(w, h)) {
                        continue;
                    }
                    for &w2 in SAMPLE_FRACTIONS.iter().filter(|&&v| v <= w) {
                        for &h2 in SAMPLE_FRACTIONS.iter().filter(|&&v| v <= h) {
                            assert!(
                                is_visible(c, e, Thresholds::new(w2, h2)),
                                "{e:?} visible at ({w}, {h}) but not at ({w2}, {h2})"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn threshold_range_check() {
        assert!(Thresholds::FULL.is_in_range());
        assert!(Thresholds::ANY.is_in_range());
        assert!(Thresholds::new(0.0, 0.7).is_in_range());
        assert!(!Thresholds::new(1.2, 0.5).is_in_range());
        assert!(!Thresholds::new(0.5, -0.1).is_in_range());
        assert!(!Thresholds::new(f64::NAN, 0.5).is_in_range());
        assert_eq!(Thresholds::default(), Thresholds::FULL);
    }
}
