//! Insight rollups — ad-level insight records combined into campaign
//! aggregates.
//!
//! Counters (impressions, clicks, spend, reach) are summed, frequency takes
//! the maximum, and the per-ad rates are combined as weighted means: cpc by
//! clicks, cpm and ctr by impressions. Output records use the same decimal
//! text representation as the ads API, so an aggregate can be handed to any
//! consumer of a raw insight record.

use campaign_core::config::FilterConfig;
use campaign_core::types::{AdRecord, CampaignRecord, InsightRecord, MetricValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ─── Weighted Mean ───────────────────────────────────────────────────

/// A running weighted mean, carried together with its accumulated weight.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedMean {
    mean: f64,
    weight: f64,
}

impl WeightedMean {
    pub fn push(&mut self, value: f64, weight: f64) {
        let combined = self.weight + weight;
        self.mean = if combined == 0.0 {
            0.0
        } else {
            (self.mean * self.weight + value * weight) / combined
        };
        self.weight = combined;
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

// ─── Accumulator ─────────────────────────────────────────────────────

/// Folds insight records into a single rollup.
#[derive(Debug, Clone, Default)]
pub struct InsightAccumulator {
    impressions: f64,
    clicks: f64,
    spend: f64,
    reach: f64,
    frequency: f64,
    cpc: WeightedMean,
    cpm: WeightedMean,
    ctr: WeightedMean,
    records: usize,
}

impl InsightAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: &InsightRecord) {
        let impressions = record.impressions();
        let clicks = record.clicks();

        self.impressions += impressions;
        self.clicks += clicks;
        self.spend += record.spend();
        self.reach += record.reach();
        self.frequency = self.frequency.max(record.frequency());

        // An absent rate says nothing about the window; a present but
        // malformed one reads as 0.
        if let Some(cpc) = record.cpc.as_ref() {
            self.cpc.push(rate(cpc), clicks);
        }
        if let Some(cpm) = record.cpm.as_ref() {
            self.cpm.push(rate(cpm), impressions);
        }
        if let Some(ctr) = record.ctr.as_ref() {
            self.ctr.push(rate(ctr), impressions);
        }
        self.records += 1;
    }

    /// Number of records folded in so far.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn finish(&self) -> InsightRecord {
        InsightRecord {
            impressions: Some(MetricValue::from_f64(self.impressions)),
            clicks: Some(MetricValue::from_f64(self.clicks)),
            spend: Some(MetricValue::from_f64(self.spend)),
            reach: Some(MetricValue::from_f64(self.reach)),
            frequency: Some(MetricValue::from_f64(self.frequency)),
            cpc: Some(MetricValue::from_f64(self.cpc.mean())),
            cpm: Some(MetricValue::from_f64(self.cpm.mean())),
            ctr: Some(MetricValue::from_f64(self.ctr.mean())),
        }
    }
}

fn rate(value: &MetricValue) -> f64 {
    value.as_f64().unwrap_or(0.0)
}

/// Roll a group of insight records up into one record. An empty group gives
/// the zero aggregate.
pub fn aggregate_insights<'a, I>(records: I) -> InsightRecord
where
    I: IntoIterator<Item = &'a InsightRecord>,
{
    let mut acc = InsightAccumulator::new();
    for record in records {
        acc.add(record);
    }
    acc.finish()
}

/// Aggregate every ad's insights under its campaign id.
pub fn aggregate_by_campaign(ads: &[AdRecord]) -> BTreeMap<String, InsightRecord> {
    let mut groups: BTreeMap<&str, InsightAccumulator> = BTreeMap::new();
    for ad in ads {
        let acc = groups.entry(ad.campaign_id.as_str()).or_default();
        if let Some(record) = ad.insight() {
            acc.add(record);
        }
    }
    groups
        .into_iter()
        .map(|(id, acc)| (id.to_string(), acc.finish()))
        .collect()
}

// ─── Campaign Aggregates ─────────────────────────────────────────────

/// One campaign with the rollup of all its ads' insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignAggregate {
    pub campaign_id: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub platform: Option<String>,
    /// Ads belonging to the campaign, with or without insights.
    pub ad_count: usize,
    /// Ads that contributed an insight record.
    pub insight_count: usize,
    pub insights: InsightRecord,
}

impl CampaignAggregate {
    pub fn has_insights(&self) -> bool {
        self.insight_count > 0
    }
}

/// Build one aggregate per campaign, in the order the campaigns are given.
/// Ads referring to campaigns outside `campaigns` are ignored.
pub fn aggregate_campaigns<'a, I>(campaigns: I, ads: &[AdRecord]) -> Vec<CampaignAggregate>
where
    I: IntoIterator<Item = &'a CampaignRecord>,
{
    let mut groups: BTreeMap<&str, (usize, InsightAccumulator)> = BTreeMap::new();
    for ad in ads {
        let (count, acc) = groups.entry(ad.campaign_id.as_str()).or_default();
        *count += 1;
        if let Some(record) = ad.insight() {
            acc.add(record);
        }
    }

    campaigns
        .into_iter()
        .map(|campaign| {
            let (ad_count, insight_count, insights) = match groups.get(campaign.id.as_str()) {
                Some((count, acc)) => (*count, acc.records(), acc.finish()),
                None => (0, 0, InsightAccumulator::new().finish()),
            };
            CampaignAggregate {
                campaign_id: campaign.id.clone(),
                name: campaign.name.clone(),
                status: campaign.status.clone(),
                platform: campaign.platform.clone(),
                ad_count,
                insight_count,
                insights,
            }
        })
        .collect()
}

// ─── Filter ──────────────────────────────────────────────────────────

/// The dashboard's current filter selection. Unset fields, empty strings
/// and `"all"` place no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdFilter {
    pub status: Option<String>,
    pub platform: Option<String>,
    #[serde(default)]
    pub campaign_ids: BTreeSet<String>,
}

impl AdFilter {
    pub fn is_empty(&self) -> bool {
        constraint(&self.status).is_none()
            && constraint(&self.platform).is_none()
            && self.campaign_ids.is_empty()
    }

    pub fn matches(&self, campaign: &CampaignRecord) -> bool {
        field_matches(&self.status, &campaign.status)
            && field_matches(&self.platform, &campaign.platform)
            && (self.campaign_ids.is_empty() || self.campaign_ids.contains(&campaign.id))
    }

    /// The campaigns passing the filter, in input order.
    pub fn select<'a>(&self, campaigns: &'a [CampaignRecord]) -> Vec<&'a CampaignRecord> {
        campaigns.iter().filter(|c| self.matches(c)).collect()
    }
}

impl From<&FilterConfig> for AdFilter {
    fn from(config: &FilterConfig) -> Self {
        Self {
            status: config.status.clone(),
            platform: config.platform.clone(),
            campaign_ids: config.campaign_ids.iter().cloned().collect(),
        }
    }
}

fn constraint(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match constraint(wanted) {
        None => true,
        Some(wanted) => actual
            .as_deref()
            .is_some_and(|a| a.trim().eq_ignore_ascii_case(wanted)),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::InsightPayload;
    use serde_json::json;

    fn record(raw: serde_json::Value) -> InsightRecord {
        serde_json::from_value(raw).unwrap()
    }

    fn value(field: &Option<MetricValue>) -> f64 {
        field.as_ref().and_then(MetricValue::as_f64).unwrap()
    }

    fn ad(id: &str, campaign_id: &str, insights: Option<serde_json::Value>) -> AdRecord {
        AdRecord {
            id: id.to_string(),
            campaign_id: campaign_id.to_string(),
            name: None,
            status: Some("ACTIVE".to_string()),
            platform: None,
            insights: insights.map(InsightPayload::from_value),
        }
    }

    fn campaign(id: &str, status: &str, platform: &str) -> CampaignRecord {
        CampaignRecord {
            id: id.to_string(),
            name: Some(format!("Campaign {}", id)),
            status: Some(status.to_string()),
            platform: Some(platform.to_string()),
            objective: None,
        }
    }

    #[test]
    fn test_weighted_mean_tracks_weight() {
        let mut mean = WeightedMean::default();
        mean.push(2.0, 100.0);
        mean.push(1.0, 300.0);
        assert!((mean.mean() - 1.25).abs() < 1e-12);
        assert_eq!(mean.weight(), 400.0);

        let mut zero = WeightedMean::default();
        zero.push(3.0, 0.0);
        zero.push(5.0, 0.0);
        assert_eq!(zero.mean(), 0.0);
    }

    #[test]
    fn test_sums_and_max_frequency() {
        let a = record(json!({"impressions": "1000", "clicks": "10", "spend": "12.5", "reach": "800", "frequency": "1.2"}));
        let b = record(json!({"impressions": 500, "clicks": 5, "spend": 7.5, "reach": 450, "frequency": 3.4}));

        let agg = aggregate_insights([&a, &b]);
        assert_eq!(value(&agg.impressions), 1500.0);
        assert_eq!(value(&agg.clicks), 15.0);
        assert_eq!(value(&agg.spend), 20.0);
        assert_eq!(value(&agg.reach), 1250.0);
        assert_eq!(value(&agg.frequency), 3.4);
    }

    #[test]
    fn test_cpc_is_click_weighted() {
        let a = record(json!({"clicks": "100", "cpc": "2.0"}));
        let b = record(json!({"clicks": "300", "cpc": "1.0"}));

        let agg = aggregate_insights([&a, &b]);
        assert_eq!(agg.cpc, Some(MetricValue::Text("1.25".to_string())));
    }

    #[test]
    fn test_ctr_and_cpm_are_impression_weighted() {
        let a = record(json!({"impressions": "1000", "ctr": "1.0", "cpm": "10"}));
        let b = record(json!({"impressions": "3000", "ctr": "3.0", "cpm": "20"}));

        let agg = aggregate_insights([&a, &b]);
        assert!((value(&agg.ctr) - 2.5).abs() < 1e-9);
        assert!((value(&agg.cpm) - 17.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_weight_rates_are_zero() {
        let a = record(json!({"clicks": "0", "cpc": "2.0"}));
        let b = record(json!({"clicks": "0", "cpc": "4.0"}));

        let agg = aggregate_insights([&a, &b]);
        assert_eq!(agg.cpc, Some(MetricValue::Text("0".to_string())));
    }

    #[test]
    fn test_absent_rate_adds_no_weight() {
        let a = record(json!({"clicks": "100", "cpc": "2.0"}));
        let b = record(json!({"clicks": "300"}));

        let agg = aggregate_insights([&a, &b]);
        assert_eq!(agg.cpc, Some(MetricValue::Text("2".to_string())));
        assert_eq!(value(&agg.clicks), 400.0);
    }

    #[test]
    fn test_malformed_rate_reads_zero_with_weight() {
        let a = record(json!({"clicks": "100", "cpc": "2.0"}));
        let b = record(json!({"clicks": "300", "cpc": "abc"}));

        let agg = aggregate_insights([&a, &b]);
        assert_eq!(agg.cpc, Some(MetricValue::Text("0.5".to_string())));
    }

    #[test]
    fn test_malformed_fields_coerce_to_zero() {
        let a = record(json!({"impressions": "lots", "clicks": "7", "spend": true}));
        let agg = aggregate_insights([&a]);
        assert_eq!(value(&agg.impressions), 0.0);
        assert_eq!(value(&agg.clicks), 7.0);
        assert_eq!(value(&agg.spend), 0.0);
    }

    #[test]
    fn test_empty_group_is_zero_record() {
        let agg = aggregate_insights(std::iter::empty());
        for field in [&agg.impressions, &agg.clicks, &agg.spend, &agg.reach, &agg.frequency, &agg.cpc, &agg.cpm, &agg.ctr] {
            assert_eq!(field, &Some(MetricValue::Text("0".to_string())));
        }
    }

    #[test]
    fn test_aggregate_by_campaign_groups_and_skips_missing() {
        let ads = vec![
            ad("1", "c1", Some(json!({"impressions": "100"}))),
            ad("2", "c1", None),
            ad("3", "c2", Some(json!([{"impressions": "40"}]))),
            ad("4", "c2", Some(json!("garbage"))),
        ];

        let groups = aggregate_by_campaign(&ads);
        assert_eq!(groups.len(), 2);
        assert_eq!(value(&groups["c1"].impressions), 100.0);
        assert_eq!(value(&groups["c2"].impressions), 40.0);
    }

    #[test]
    fn test_aggregate_campaigns_keeps_order_and_counts() {
        let campaigns = vec![
            campaign("b", "ACTIVE", "facebook"),
            campaign("a", "PAUSED", "facebook"),
            campaign("empty", "ACTIVE", "google"),
        ];
        let ads = vec![
            ad("1", "a", Some(json!({"impressions": "10"}))),
            ad("2", "b", Some(json!({"data": [{"impressions": "20"}]}))),
            ad("3", "b", None),
            ad("4", "orphan", Some(json!({"impressions": "99"}))),
        ];

        let aggs = aggregate_campaigns(&campaigns, &ads);
        let ids: Vec<_> = aggs.iter().map(|a| a.campaign_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "empty"]);

        assert_eq!(aggs[0].ad_count, 2);
        assert_eq!(aggs[0].insight_count, 1);
        assert!(aggs[0].has_insights());
        assert_eq!(value(&aggs[0].insights.impressions), 20.0);

        assert_eq!(aggs[2].ad_count, 0);
        assert!(!aggs[2].has_insights());
        assert_eq!(value(&aggs[2].insights.impressions), 0.0);
    }

    #[test]
    fn test_insight_count_skips_payloads_without_records() {
        let campaigns = vec![campaign("c", "ACTIVE", "facebook")];
        let ads = vec![
            ad("1", "c", Some(json!({"paging": {"cursors": {}}}))),
            ad("2", "c", Some(json!({}))),
            ad("3", "c", Some(json!([{"impressions": "10", "clicks": "1"}, 5]))),
            ad("4", "c", Some(json!({"data": [{"impressions": "30"}, null]}))),
        ];

        let aggs = aggregate_campaigns(&campaigns, &ads);
        assert_eq!(aggs[0].ad_count, 4);
        assert_eq!(aggs[0].insight_count, 2);
        assert_eq!(value(&aggs[0].insights.impressions), 40.0);
    }

    #[test]
    fn test_filter_matching() {
        let campaigns = vec![
            campaign("1", "ACTIVE", "facebook"),
            campaign("2", "PAUSED", "facebook"),
            campaign("3", "active", "google"),
        ];

        let all = AdFilter {
            status: Some("All".to_string()),
            ..Default::default()
        };
        assert!(all.is_empty());
        assert_eq!(all.select(&campaigns).len(), 3);

        let active = AdFilter {
            status: Some("ACTIVE".to_string()),
            ..Default::default()
        };
        let ids: Vec<_> = active.select(&campaigns).iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let narrowed = AdFilter {
            platform: Some("Facebook".to_string()),
            campaign_ids: ["2".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let ids: Vec<_> = narrowed.select(&campaigns).iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["2"]);
    }
}
