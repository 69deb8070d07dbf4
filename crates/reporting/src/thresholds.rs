//! Lab metric threshold table.

use serde::{Deserialize, Serialize};

/// Unit a metric's thresholds are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Milliseconds,
    Seconds,
    /// Unitless ratio on a 0–1 scale.
    RawRatio,
}

/// Three-zone scoring scale: at or below `good` scores 100, `mid` scores 50,
/// at or above `max` scores 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricThreshold {
    pub good: f64,
    pub mid: f64,
    pub max: f64,
    pub unit: MetricUnit,
}

/// The lab metrics with a fixed threshold entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabMetric {
    FirstContentfulPaint,
    SpeedIndex,
    LargestContentfulPaint,
    TimeToInteractive,
    TotalBlockingTime,
    CumulativeLayoutShift,
}

impl LabMetric {
    pub const ALL: [LabMetric; 6] = [
        LabMetric::FirstContentfulPaint,
        LabMetric::SpeedIndex,
        LabMetric::LargestContentfulPaint,
        LabMetric::TimeToInteractive,
        LabMetric::TotalBlockingTime,
        LabMetric::CumulativeLayoutShift,
    ];

    /// Display name, as used for metric keys in lab reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::FirstContentfulPaint => "First Contentful Paint",
            Self::SpeedIndex => "Speed Index",
            Self::LargestContentfulPaint => "Largest Contentful Paint",
            Self::TimeToInteractive => "Time To Interactive",
            Self::TotalBlockingTime => "Total Blocking Time",
            Self::CumulativeLayoutShift => "Cumulative Layout Shift",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Self::FirstContentfulPaint => "FCP",
            Self::SpeedIndex => "SI",
            Self::LargestContentfulPaint => "LCP",
            Self::TimeToInteractive => "TTI",
            Self::TotalBlockingTime => "TBT",
            Self::CumulativeLayoutShift => "CLS",
        }
    }

    /// Lighthouse audit id.
    pub fn audit_id(self) -> &'static str {
        match self {
            Self::FirstContentfulPaint => "first-contentful-paint",
            Self::SpeedIndex => "speed-index",
            Self::LargestContentfulPaint => "largest-contentful-paint",
            Self::TimeToInteractive => "interactive",
            Self::TotalBlockingTime => "total-blocking-time",
            Self::CumulativeLayoutShift => "cumulative-layout-shift",
        }
    }

    /// Resolve a metric name in any of its accepted spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|m| {
            name.eq_ignore_ascii_case(m.name())
                || name.eq_ignore_ascii_case(m.short_name())
                || name.eq_ignore_ascii_case(m.audit_id())
        })
    }

    pub fn threshold(self) -> MetricThreshold {
        let (good, mid, max, unit) = match self {
            Self::FirstContentfulPaint => (1800.0, 2400.0, 3000.0, MetricUnit::Milliseconds),
            Self::SpeedIndex => (3400.0, 4600.0, 5800.0, MetricUnit::Milliseconds),
            Self::LargestContentfulPaint => (2500.0, 3250.0, 4000.0, MetricUnit::Milliseconds),
            Self::TimeToInteractive => (3800.0, 5550.0, 7300.0, MetricUnit::Milliseconds),
            Self::TotalBlockingTime => (200.0, 400.0, 600.0, MetricUnit::Milliseconds),
            Self::CumulativeLayoutShift => (0.1, 0.175, 0.25, MetricUnit::RawRatio),
        };
        MetricThreshold {
            good,
            mid,
            max,
            unit,
        }
    }
}

/// Threshold entry for a metric name, if the name is in the table.
pub fn threshold_for(name: &str) -> Option<MetricThreshold> {
    LabMetric::from_name(name).map(LabMetric::threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_resolution() {
        assert_eq!(
            LabMetric::from_name("Largest Contentful Paint"),
            Some(LabMetric::LargestContentfulPaint)
        );
        assert_eq!(LabMetric::from_name("lcp"), Some(LabMetric::LargestContentfulPaint));
        assert_eq!(
            LabMetric::from_name("interactive"),
            Some(LabMetric::TimeToInteractive)
        );
        assert_eq!(LabMetric::from_name(" cumulative layout shift "), Some(LabMetric::CumulativeLayoutShift));
        assert_eq!(LabMetric::from_name("Server Response Time"), None);
    }

    #[test]
    fn test_thresholds_are_ordered() {
        for metric in LabMetric::ALL {
            let t = metric.threshold();
            assert!(t.good < t.mid && t.mid < t.max, "{}", metric.name());
        }
        assert_eq!(
            threshold_for("CLS").map(|t| t.unit),
            Some(MetricUnit::RawRatio)
        );
    }
}
