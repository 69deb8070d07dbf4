//! Lab metric scoring — raw, unit-ambiguous lab measurements mapped onto a
//! 0–100 scale with per-metric thresholds.
//!
//! Timing metrics arrive in seconds from some lab tools and in milliseconds
//! from others, with no unit flag. A magnitude of 10 or less is read as
//! seconds. Cumulative Layout Shift above 1 is read as a percentage.

use crate::thresholds::{threshold_for, LabMetric, MetricThreshold, MetricUnit};
use campaign_core::lab::{LabReport, LabStrategyReport, Strategy};
use campaign_core::types::MetricValue;
use serde::{Deserialize, Serialize};

/// Timing values at or below this magnitude are taken to be seconds.
pub const SECONDS_CUTOFF: f64 = 10.0;

pub const NOT_AVAILABLE: &str = "N/A";

// ─── Severity ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Good,
    Warning,
    Poor,
}

impl Severity {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::Good,
            50..=89 => Self::Warning,
            _ => Self::Poor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedScore {
    pub value: u8,
    pub severity: Severity,
}

impl NormalizedScore {
    pub fn new(value: u8) -> Self {
        let value = value.min(100);
        Self {
            value,
            severity: Severity::from_score(value),
        }
    }
}

// ─── Scoring ─────────────────────────────────────────────────────────

/// Bring a raw value into the unit its thresholds are expressed in.
pub fn resolve_unit(raw: f64, unit: MetricUnit) -> f64 {
    match unit {
        MetricUnit::Milliseconds if raw.abs() <= SECONDS_CUTOFF => raw * 1000.0,
        MetricUnit::RawRatio if raw > 1.0 => raw / 100.0,
        _ => raw,
    }
}

/// Piecewise-linear score of an already unit-resolved value.
pub fn score_against(value: f64, threshold: &MetricThreshold) -> u8 {
    let MetricThreshold { good, mid, max, .. } = *threshold;
    let score = if value <= good {
        100.0
    } else if value >= max {
        0.0
    } else if value <= mid {
        100.0 - 50.0 * (value - good) / (mid - good)
    } else {
        50.0 - 50.0 * (value - mid) / (max - mid)
    };
    clamp_score(score)
}

/// Score for a metric with no threshold entry. Values inside 0–100 are
/// taken as already scored, which also covers anything on a 0–10 scale;
/// everything else is clamped.
pub fn fallback_score(value: f64) -> u8 {
    clamp_score(value)
}

fn clamp_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

/// Normalize one raw measurement. Missing or non-finite input gives `None`.
pub fn normalize(name: &str, raw: Option<f64>) -> Option<NormalizedScore> {
    let raw = raw.filter(|v| v.is_finite())?;
    let score = match threshold_for(name) {
        Some(threshold) => score_against(resolve_unit(raw, threshold.unit), &threshold),
        None => fallback_score(raw),
    };
    Some(NormalizedScore::new(score))
}

/// Human-readable rendering of a raw measurement.
pub fn display_label(name: &str, raw: Option<f64>) -> String {
    let Some(raw) = raw.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    match threshold_for(name) {
        Some(threshold) => {
            let value = resolve_unit(raw, threshold.unit);
            match threshold.unit {
                MetricUnit::Milliseconds if value < 1000.0 => format!("{} ms", value.round()),
                MetricUnit::Milliseconds => format!("{:.2} s", value / 1000.0),
                MetricUnit::Seconds => format!("{:.2} s", value),
                MetricUnit::RawRatio => format!("{:.2}", value),
            }
        }
        None => raw.to_string(),
    }
}

// ─── Report Scoring ──────────────────────────────────────────────────

/// One scored metric, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricScore {
    pub name: String,
    pub score: Option<u8>,
    pub severity: Option<Severity>,
    pub display_label: String,
}

pub fn score_metric(name: &str, raw: Option<f64>) -> MetricScore {
    let normalized = normalize(name, raw);
    MetricScore {
        name: name.to_string(),
        score: normalized.map(|s| s.value),
        severity: normalized.map(|s| s.severity),
        display_label: display_label(name, raw),
    }
}

/// Upstream category scores for one strategy, coerced to finite numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub performance: Option<f64>,
    pub accessibility: Option<f64>,
    pub best_practices: Option<f64>,
    pub seo: Option<f64>,
    pub overall: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabSummary {
    pub strategy: Strategy,
    pub metrics: Vec<MetricScore>,
    pub categories: CategorySummary,
}

fn raw_metric(report: Option<&LabStrategyReport>, name: &str) -> Option<f64> {
    let report = report?;
    let value = report.metric(name).or_else(|| {
        // Reports keyed by audit id or short name still resolve.
        let metric = LabMetric::from_name(name)?;
        [metric.name(), metric.audit_id(), metric.short_name()]
            .into_iter()
            .find_map(|alias| report.metric(alias))
    })?;
    value.raw_value()
}

/// Score the requested metrics for one strategy, in request order. Metrics
/// absent from the report come back as N/A.
pub fn score_report<S: AsRef<str>>(
    report: &LabReport,
    strategy: Strategy,
    names: &[S],
) -> Vec<MetricScore> {
    let selected = report.strategy(strategy);
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            score_metric(name, raw_metric(selected, name))
        })
        .collect()
}

pub fn category_scores(report: &LabReport, strategy: Strategy) -> CategorySummary {
    let Some(selected) = report.strategy(strategy) else {
        return CategorySummary::default();
    };
    let finite = |v: &Option<MetricValue>| v.as_ref().and_then(MetricValue::as_f64);
    let categories = &selected.categories;
    CategorySummary {
        performance: finite(&categories.performance),
        accessibility: finite(&categories.accessibility),
        best_practices: finite(&categories.best_practices),
        seo: finite(&categories.seo),
        overall: finite(&categories.overall),
    }
}

pub fn overall_score(report: &LabReport, strategy: Strategy) -> Option<f64> {
    category_scores(report, strategy).overall
}

pub fn summarize_lab<S: AsRef<str>>(
    report: &LabReport,
    strategy: Strategy,
    names: &[S],
) -> LabSummary {
    LabSummary {
        strategy,
        metrics: score_report(report, strategy, names),
        categories: category_scores(report, strategy),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LCP: &str = "Largest Contentful Paint";
    const CLS: &str = "Cumulative Layout Shift";

    fn score(name: &str, raw: f64) -> u8 {
        normalize(name, Some(raw)).unwrap().value
    }

    #[test]
    fn test_lcp_threshold_boundaries() {
        assert_eq!(score(LCP, 2500.0), 100);
        assert_eq!(score(LCP, 3250.0), 50);
        assert_eq!(score(LCP, 4000.0), 0);
        assert_eq!(score(LCP, 1200.0), 100);
        assert_eq!(score(LCP, 9000.0), 0);
        assert_eq!(score(LCP, 2875.0), 75);
        assert_eq!(score(LCP, 3625.0), 25);
    }

    #[test]
    fn test_seconds_and_milliseconds_agree() {
        assert_eq!(normalize(LCP, Some(2.5)), normalize(LCP, Some(2500.0)));
        assert_eq!(normalize(LCP, Some(3.25)), normalize(LCP, Some(3250.0)));
        assert_eq!(normalize("FCP", Some(10.0)), normalize("FCP", Some(10_000.0)));
        // Just above the cutoff stays in milliseconds.
        assert_eq!(score("Total Blocking Time", 10.5), 100);
    }

    #[test]
    fn test_cls_percentage_input() {
        assert_eq!(normalize(CLS, Some(5.0)), normalize(CLS, Some(0.05)));
        assert_eq!(score(CLS, 0.1), 100);
        assert_eq!(score(CLS, 0.25), 0);
        assert_eq!(score(CLS, 1.0), 0);
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(normalize(LCP, None), None);
        assert_eq!(normalize(LCP, Some(f64::NAN)), None);
        assert_eq!(normalize("Anything", Some(f64::INFINITY)), None);
        assert_eq!(display_label(LCP, None), "N/A");
    }

    #[test]
    fn test_fallback_for_unknown_metrics() {
        assert_eq!(score("Custom Score", 73.4), 73);
        assert_eq!(score("Custom Score", 7.0), 7);
        assert_eq!(score("Custom Score", 140.0), 100);
        assert_eq!(score("Custom Score", -3.0), 0);
    }

    #[test]
    fn test_severity_buckets() {
        assert_eq!(NormalizedScore::new(90).severity, Severity::Good);
        assert_eq!(NormalizedScore::new(89).severity, Severity::Warning);
        assert_eq!(NormalizedScore::new(50).severity, Severity::Warning);
        assert_eq!(NormalizedScore::new(49).severity, Severity::Poor);
        assert_eq!(NormalizedScore::new(0).severity, Severity::Poor);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(display_label("Total Blocking Time", Some(850.0)), "850 ms");
        assert_eq!(display_label("Total Blocking Time", Some(0.35)), "350 ms");
        assert_eq!(display_label(LCP, Some(2.5)), "2.50 s");
        assert_eq!(display_label(LCP, Some(2512.0)), "2.51 s");
        assert_eq!(display_label(CLS, Some(0.123)), "0.12");
        assert_eq!(display_label(CLS, Some(12.0)), "0.12");
        assert_eq!(display_label("Custom", Some(42.5)), "42.5");
    }

    #[test]
    fn test_score_report_in_request_order() {
        let report: LabReport = serde_json::from_value(json!({
            "mobile": {
                "metrics": {
                    "largest-contentful-paint": {"displayValue": "3.3 s", "numericValue": 3250},
                    "Cumulative Layout Shift": 0.05,
                    "FCP": {"score": "bogus"}
                },
                "categories": {"performance": 0.74, "seo": "98", "overall": null}
            }
        }))
        .unwrap();

        let scores = score_report(&report, Strategy::Mobile, &[LCP, CLS, "FCP", "Speed Index"]);
        let names: Vec<_> = scores.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![LCP, CLS, "FCP", "Speed Index"]);

        assert_eq!(scores[0].score, Some(50));
        assert_eq!(scores[0].severity, Some(Severity::Warning));
        assert_eq!(scores[0].display_label, "3.25 s");
        assert_eq!(scores[1].score, Some(100));
        assert_eq!(scores[2].score, None);
        assert_eq!(scores[2].display_label, "N/A");
        assert_eq!(scores[3].score, None);

        let desktop = score_report(&report, Strategy::Desktop, &[LCP]);
        assert_eq!(desktop[0].score, None);

        let categories = category_scores(&report, Strategy::Mobile);
        assert_eq!(categories.performance, Some(0.74));
        assert_eq!(categories.seo, Some(98.0));
        assert_eq!(categories.overall, None);
        assert_eq!(overall_score(&report, Strategy::Desktop), None);
    }
}
