// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host measurement results and the measurement protocol.
//!
//! ## Protocol
//!
//! Measuring a node is asynchronous in most UI hosts. A monitor hands out a [`Ticket`] when
//! a cycle is due; the host measures the node and later passes the ticket back with the
//! result. Only the most recently issued ticket is accepted, so a late result can never
//! overwrite a newer one.
//!
//! Hosts that can measure synchronously implement [`Measure`] and drive everything with
//! [`VisibilityTracker::run_due`](crate::VisibilityTracker::run_due).

use alloc::string::String;

use kurbo::Rect;

/// Token identifying one outstanding measurement of one monitor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Ticket(pub(crate) u64);

/// Raw geometry reported by the host for a node.
///
/// Hosts may leave fields undefined; any undefined field that is needed makes the whole
/// measurement unusable for that cycle. `x`/`y` are relative to the parent and are carried
/// for completeness; visibility uses the absolute `page_x`/`page_y` origin.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Measurement {
    /// Origin x relative to the parent.
    pub x: Option<f64>,
    /// Origin y relative to the parent.
    pub y: Option<f64>,
    /// Width.
    pub width: Option<f64>,
    /// Height.
    pub height: Option<f64>,
    /// Absolute origin x.
    pub page_x: Option<f64>,
    /// Absolute origin y.
    pub page_y: Option<f64>,
}

impl Measurement {
    /// A measurement with every field defined.
    pub const fn new(x: f64, y: f64, width: f64, height: f64, page_x: f64, page_y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            page_x: Some(page_x),
            page_y: Some(page_y),
        }
    }

    /// A measurement whose absolute rectangle is `rect` (parent-relative origin unknown).
    pub fn from_page_rect(rect: Rect) -> Self {
        Self {
            x: None,
            y: None,
            width: Some(rect.width()),
            height: Some(rect.height()),
            page_x: Some(rect.x0),
            page_y: Some(rect.y0),
        }
    }

    /// The absolute on-screen rectangle of the node.
    pub fn page_rect(&self) -> Result<Rect, MeasureError> {
        let (Some(width), Some(height), Some(page_x), Some(page_y)) =
            (self.width, self.height, self.page_x, self.page_y)
        else {
            return Err(MeasureError::Undefined);
        };
        let finite = [width, height, page_x, page_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || width < 0.0 || height < 0.0 {
            return Err(MeasureError::InvalidGeometry);
        }
        Ok(Rect::new(page_x, page_y, page_x + width, page_y + height))
    }
}

/// Why a measurement cycle produced no usable rectangle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MeasureError {
    /// The host measurement facility failed.
    #[error("measurement failed: {0}")]
    Failed(String),
    /// The host returned undefined geometry.
    #[error("measurement returned undefined geometry")]
    Undefined,
    /// The host returned non-finite or negative geometry.
    #[error("measurement returned invalid geometry")]
    InvalidGeometry,
}

impl MeasureError {
    /// A host failure with a message.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Synchronous access to the host measurement facility.
pub trait Measure<K> {
    /// Measure `node`, returning its geometry or the reason it could not be measured.
    fn measure(&mut self, node: &K) -> Result<Measurement, MeasureError>;
}
