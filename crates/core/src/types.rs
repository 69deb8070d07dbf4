use crate::error::{InsightError, InsightResult};
use crate::lab::LabReport;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// A numeric insight field as it arrives on the wire. The ads API sends most
/// counters as decimal strings, some sources send plain numbers, and the
/// occasional malformed payload sends something else entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    /// Any other JSON value. Reads as missing.
    Other(Value),
}

impl MetricValue {
    /// Decimal text in the same representation the ads API uses.
    pub fn from_f64(value: f64) -> Self {
        Self::Text(format_decimal(value))
    }

    /// The finite numeric value, if there is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let parsed = trimmed.parse::<f64>().ok().filter(|n| n.is_finite());
                if parsed.is_none() {
                    debug!(raw = %s, "non-numeric metric text");
                }
                parsed
            }
            Self::Other(v) => {
                debug!(raw = %v, "unexpected metric value type");
                None
            }
        }
    }
}

/// Coerce an optional field to a number, with missing or malformed input
/// reading as 0.
pub fn coerce_or_zero(value: Option<&MetricValue>) -> f64 {
    value.and_then(MetricValue::as_f64).unwrap_or(0.0)
}

/// Shortest decimal text that round-trips to `value`. Non-finite input and
/// negative zero both render as `"0"`.
pub fn format_decimal(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// One measurement window for one ad, or a rollup of several.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reach: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpc: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpm: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctr: Option<MetricValue>,
}

impl InsightRecord {
    pub fn impressions(&self) -> f64 {
        coerce_or_zero(self.impressions.as_ref())
    }

    pub fn clicks(&self) -> f64 {
        coerce_or_zero(self.clicks.as_ref())
    }

    pub fn spend(&self) -> f64 {
        coerce_or_zero(self.spend.as_ref())
    }

    pub fn reach(&self) -> f64 {
        coerce_or_zero(self.reach.as_ref())
    }

    pub fn frequency(&self) -> f64 {
        coerce_or_zero(self.frequency.as_ref())
    }

    /// True when none of the insight fields is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The insight payload attached to an ad, in any of the shapes the ads API
/// has been seen to return. Parsing happens once, here; consumers only ever
/// call [`InsightPayload::record`].
#[derive(Debug, Clone, PartialEq)]
pub enum InsightPayload {
    /// `{ "impressions": "...", ... }`
    Flat(InsightRecord),
    /// `{ "data": [ { ... }, ... ], "paging": { ... } }`
    Wrapped(Vec<InsightRecord>),
    /// `[ { ... }, ... ]`
    List(Vec<InsightRecord>),
    /// Anything else. Treated as no insight for the window.
    Unrecognized,
}

impl InsightPayload {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => {
                    records_from_items(items).map_or(Self::Unrecognized, Self::Wrapped)
                }
                Some(other) => {
                    debug!(data = %other, "insight wrapper without a data list");
                    Self::Unrecognized
                }
                None => record_from_object(map).map_or(Self::Unrecognized, Self::Flat),
            },
            Value::Array(items) => records_from_items(items).map_or(Self::Unrecognized, Self::List),
            Value::Null => Self::Unrecognized,
            other => {
                debug!(payload = %other, "unrecognized insight payload shape");
                Self::Unrecognized
            }
        }
    }

    /// The normalized flat record: the record itself, or the first element
    /// of a wrapped or bare list.
    pub fn record(&self) -> Option<&InsightRecord> {
        match self {
            Self::Flat(record) => Some(record),
            Self::Wrapped(records) | Self::List(records) => records.first(),
            Self::Unrecognized => None,
        }
    }
}

/// An object carrying none of the insight fields (`{}`, a bare `paging`
/// block) is not an insight record.
fn record_from_object(map: Map<String, Value>) -> Option<InsightRecord> {
    match serde_json::from_value::<InsightRecord>(Value::Object(map)) {
        Ok(record) if record.is_empty() => {
            debug!("insight object without any insight field");
            None
        }
        Ok(record) => Some(record),
        Err(e) => {
            debug!(error = %e, "insight record could not be read");
            None
        }
    }
}

/// The first element decides: the list is an insight list only when it
/// opens with a record. Later elements that are not records are skipped.
fn records_from_items(items: Vec<Value>) -> Option<Vec<InsightRecord>> {
    let mut items = items.into_iter();
    let first = match items.next() {
        Some(Value::Object(map)) => record_from_object(map)?,
        _ => return None,
    };
    let rest = items.filter_map(|item| match item {
        Value::Object(map) => record_from_object(map),
        other => {
            debug!(item = %other, "skipping non-record insight list element");
            None
        }
    });
    Some(std::iter::once(first).chain(rest).collect())
}

impl<'de> Deserialize<'de> for InsightPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

impl Serialize for InsightPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Wrapper<'a> {
            data: &'a [InsightRecord],
        }

        match self {
            Self::Flat(record) => record.serialize(serializer),
            Self::Wrapped(records) => Wrapper { data: records }.serialize(serializer),
            Self::List(records) => records.serialize(serializer),
            Self::Unrecognized => serializer.serialize_none(),
        }
    }
}

/// An ad as listed by the ads API, with its optional insight payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdRecord {
    pub id: String,
    #[serde(alias = "campaignId")]
    pub campaign_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<InsightPayload>,
}

impl AdRecord {
    pub fn insight(&self) -> Option<&InsightRecord> {
        self.insights.as_ref().and_then(InsightPayload::record)
    }
}

/// A campaign as listed by the ads API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

/// Everything the dashboard has loaded at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub campaigns: Vec<CampaignRecord>,
    #[serde(default)]
    pub ads: Vec<AdRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab: Option<LabReport>,
}

impl DashboardSnapshot {
    pub fn from_json(raw: &str) -> InsightResult<Self> {
        let snapshot: Self = serde_json::from_str(raw)?;
        if snapshot.campaigns.iter().any(|c| c.id.trim().is_empty()) {
            return Err(InsightError::Snapshot(
                "campaign record with an empty id".to_string(),
            ));
        }
        Ok(snapshot)
    }

    pub fn load(path: impl AsRef<Path>) -> InsightResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}
