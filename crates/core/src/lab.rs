//! Performance-lab report shapes: per-strategy metric measurements and the
//! upstream category scores.

use crate::types::MetricValue;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Device context a lab run was measured under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Desktop,
    #[default]
    Mobile,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Desktop => f.write_str("desktop"),
            Self::Mobile => f.write_str("mobile"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

/// One lab metric as reported upstream. Accepted shapes are a plain number,
/// `{score}`, `{value}`, or an audit object with `displayValue` and
/// `numericValue`.
#[derive(Debug, Clone, PartialEq)]
pub enum LabMetricValue {
    Number(f64),
    Audit {
        score: Option<f64>,
        value: Option<f64>,
        numeric_value: Option<f64>,
        display_value: Option<String>,
    },
    Missing,
}

impl LabMetricValue {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map_or(Self::Missing, Self::Number),
            Value::String(s) => Self::Audit {
                score: None,
                value: None,
                numeric_value: None,
                display_value: Some(s),
            },
            Value::Object(map) => {
                let number = |key: &str| {
                    map.get(key)
                        .cloned()
                        .and_then(|v| serde_json::from_value::<MetricValue>(v).ok())
                        .and_then(|v| v.as_f64())
                };
                Self::Audit {
                    score: number("score"),
                    value: number("value"),
                    numeric_value: number("numericValue").or_else(|| number("numeric_value")),
                    display_value: map
                        .get("displayValue")
                        .or_else(|| map.get("display_value"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                }
            }
            _ => Self::Missing,
        }
    }

    /// The raw measurement, before any unit resolution. Numeric fields win
    /// over the display text; the display text is read as a leading number
    /// with an optional `ms` or `s` suffix.
    pub fn raw_value(&self) -> Option<f64> {
        let raw = match self {
            Self::Number(n) => Some(*n),
            Self::Audit {
                score,
                value,
                numeric_value,
                display_value,
            } => numeric_value
                .or(*value)
                .or(*score)
                .or_else(|| display_value.as_deref().and_then(parse_display_value)),
            Self::Missing => None,
        };
        raw.filter(|v| v.is_finite())
    }
}

/// Parse lab display text such as `"2.5 s"`, `"1,230 ms"` or `"0.05"`.
/// Seconds are converted to milliseconds; unitless text is returned as is.
pub fn parse_display_value(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '\u{a0}')
        .collect();
    let end = cleaned
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == '-'))
        .map_or(cleaned.len(), |(i, _)| i);
    let number: f64 = cleaned[..end].parse().ok()?;
    match cleaned[end..].trim() {
        "ms" => Some(number),
        "s" | "sec" => Some(number * 1000.0),
        _ => Some(number),
    }
}

impl<'de> Deserialize<'de> for LabMetricValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

impl Serialize for LabMetricValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Audit {
                score,
                value,
                numeric_value,
                display_value,
            } => {
                let mut map = serde_json::Map::new();
                let mut put = |key: &str, v: Option<f64>| {
                    if let Some(v) = v {
                        map.insert(key.to_string(), Value::from(v));
                    }
                };
                put("score", *score);
                put("value", *value);
                put("numericValue", *numeric_value);
                if let Some(text) = display_value {
                    map.insert("displayValue".to_string(), Value::String(text.clone()));
                }
                Value::Object(map).serialize(serializer)
            }
            Self::Missing => serializer.serialize_none(),
        }
    }
}

/// Category scores computed upstream. Passed through, never recomputed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    #[serde(default)]
    pub performance: Option<MetricValue>,
    #[serde(default)]
    pub accessibility: Option<MetricValue>,
    #[serde(default, alias = "best-practices", alias = "best_practices")]
    pub best_practices: Option<MetricValue>,
    #[serde(default)]
    pub seo: Option<MetricValue>,
    #[serde(default)]
    pub overall: Option<MetricValue>,
}

/// Lab results for one strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabStrategyReport {
    #[serde(default)]
    pub metrics: BTreeMap<String, LabMetricValue>,
    #[serde(default, alias = "scores")]
    pub categories: CategoryScores,
}

impl LabStrategyReport {
    /// Look up a metric by exact name, falling back to a case-insensitive
    /// match.
    pub fn metric(&self, name: &str) -> Option<&LabMetricValue> {
        self.metrics.get(name).or_else(|| {
            self.metrics
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }
}

/// Lab results keyed by strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<LabStrategyReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<LabStrategyReport>,
}

impl LabReport {
    pub fn strategy(&self, strategy: Strategy) -> Option<&LabStrategyReport> {
        match strategy {
            Strategy::Desktop => self.desktop.as_ref(),
            Strategy::Mobile => self.mobile.as_ref(),
        }
    }
}
