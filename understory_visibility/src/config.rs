// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monitor configuration: polling frequency, thresholds, and reporting policy.

use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

use crate::geometry::Thresholds;

/// Default interval between measurement cycles.
pub const DEFAULT_FREQUENCY: Duration = Duration::from_millis(1000);

/// Delay before the first cycle after activation, letting the initial layout pass settle.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// When a monitor invokes its callback.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ReportPolicy {
    /// Only when the computed visibility differs from the last computed value.
    ///
    /// The first successful cycle always reports.
    #[default]
    OnChange,
    /// After every successful cycle, even if the value is unchanged.
    EveryCycle,
}

/// A configuration value outside its documented range.
///
/// These are diagnostics, not hard failures: a [`Monitor`](crate::Monitor) logs them at
/// construction and keeps running with the values it was given.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The polling frequency is zero.
    #[error("frequency must be a positive duration")]
    NonPositiveFrequency,
    /// The width threshold is outside `[0, 1]`.
    #[error("width threshold must be between 0 and 1, got {0}")]
    WidthThresholdOutOfRange(f64),
    /// The height threshold is outside `[0, 1]`.
    #[error("height threshold must be between 0 and 1, got {0}")]
    HeightThresholdOutOfRange(f64),
}

/// Configuration for a [`Monitor`](crate::Monitor).
#[derive(Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    /// Interval between measurement cycles.
    pub frequency: Duration,
    /// Minimum visible fractions of the element's width and height.
    pub thresholds: Thresholds,
    /// Go dormant after the first `true` report.
    pub run_once: bool,
    /// Activate on construction; otherwise wait for [`Monitor::start`](crate::Monitor::start).
    pub start_immediately: bool,
    /// When the callback is invoked.
    pub report: ReportPolicy,
    /// Label attached to diagnostics (a test id or accessibility label, for instance).
    pub label: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            thresholds: Thresholds::FULL,
            run_once: false,
            start_immediately: true,
            report: ReportPolicy::OnChange,
            label: None,
        }
    }
}

impl MonitorConfig {
    /// Set the polling frequency.
    pub fn with_frequency(mut self, frequency: Duration) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the visibility thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set whether the monitor goes dormant after its first `true` report.
    pub fn with_run_once(mut self, run_once: bool) -> Self {
        self.run_once = run_once;
        self
    }

    /// Set whether the monitor activates on construction.
    pub fn with_start_immediately(mut self, start_immediately: bool) -> Self {
        self.start_immediately = start_immediately;
        self
    }

    /// Set the reporting policy.
    pub fn with_report(mut self, report: ReportPolicy) -> Self {
        self.report = report;
        self
    }

    /// Set the diagnostic label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Every out-of-range value in this configuration.
    pub fn problems(&self) -> Vec<ConfigError> {
        let mut out = Vec::new();
        if self.frequency.is_zero() {
            out.push(ConfigError::NonPositiveFrequency);
        }
        if !(0.0..=1.0).contains(&self.thresholds.width) {
            out.push(ConfigError::WidthThresholdOutOfRange(self.thresholds.width));
        }
        if !(0.0..=1.0).contains(&self.thresholds.height) {
            out.push(ConfigError::HeightThresholdOutOfRange(
                self.thresholds.height,
            ));
        }
        out
    }

    /// The first out-of-range value, if any.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.problems().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn defaults() {
        let c = MonitorConfig::default();
        assert_eq!(c.frequency, Duration::from_millis(1000));
        assert_eq!(c.thresholds, Thresholds::new(1.0, 1.0));
        assert!(!c.run_once);
        assert!(c.start_immediately);
        assert_eq!(c.report, ReportPolicy::OnChange);
        assert_eq!(c.label, None);
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn builder_sets_fields() {
        let c = MonitorConfig::default()
            .with_frequency(Duration::from_millis(300))
            .with_thresholds(Thresholds::new(0.7, 1.0))
            .with_run_once(true)
            .with_start_immediately(false)
            .with_report(ReportPolicy::EveryCycle)
            .with_label("row-3");
        assert_eq!(c.frequency, Duration::from_millis(300));
        assert_eq!(c.thresholds.width, 0.7);
        assert!(c.run_once);
        assert!(!c.start_immediately);
        assert_eq!(c.report, ReportPolicy::EveryCycle);
        assert_eq!(c.label.as_deref(), Some("row-3"));
    }

    #[test]
    fn problems_lists_every_out_of_range_value() {
        let c = MonitorConfig::default()
            .with_frequency(Duration::ZERO)
            .with_thresholds(Thresholds::new(1.5, -0.25));
        assert_eq!(
            c.problems(),
            vec![
                ConfigError::NonPositiveFrequency,
                ConfigError::WidthThresholdOutOfRange(1.5),
                ConfigError::HeightThresholdOutOfRange(-0.25),
            ]
        );
        assert_eq!(c.validate(), Err(ConfigError::NonPositiveFrequency));
    }

    #[test]
    fn boundary_thresholds_are_valid() {
        let c = MonitorConfig::default().with_thresholds(Thresholds::new(0.0, 1.0));
        assert!(c.problems().is_empty());
    }

    #[test]
    fn error_messages_name_the_field() {
        assert!(
            ConfigError::WidthThresholdOutOfRange(2.0)
                .to_string()
                .contains("width threshold")
        );
        assert!(
            ConfigError::NonPositiveFrequency
                .to_string()
                .contains("frequency")
        );
    }
}
