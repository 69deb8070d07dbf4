//! Portfolio totals and the ratio metrics derived from them.

use crate::insights::CampaignAggregate;
use campaign_core::types::{InsightRecord, MetricValue};
use serde::{Deserialize, Serialize};

/// Counter totals across every campaign in the current view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub impressions: f64,
    pub clicks: f64,
    pub spend: f64,
    pub reach: f64,
    /// Highest campaign frequency. Frequency does not add up.
    pub max_frequency: f64,
}

/// CTR (percent), CPC and CPM derived from totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedRatios {
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
}

pub fn portfolio_totals<'a, I>(aggregates: I) -> PortfolioTotals
where
    I: IntoIterator<Item = &'a CampaignAggregate>,
{
    aggregates
        .into_iter()
        .fold(PortfolioTotals::default(), |mut totals, aggregate| {
            let insights = &aggregate.insights;
            totals.impressions += insights.impressions();
            totals.clicks += insights.clicks();
            totals.spend += insights.spend();
            totals.reach += insights.reach();
            totals.max_frequency = totals.max_frequency.max(insights.frequency());
            totals
        })
}

/// Ratios come from the totals, never from averaging per-campaign rates.
pub fn derive_ratios(totals: &PortfolioTotals) -> DerivedRatios {
    DerivedRatios {
        ctr: if totals.impressions > 0.0 {
            totals.clicks / totals.impressions * 100.0
        } else {
            0.0
        },
        cpc: if totals.clicks > 0.0 {
            totals.spend / totals.clicks
        } else {
            0.0
        },
        cpm: if totals.impressions > 0.0 {
            totals.spend / totals.impressions * 1000.0
        } else {
            0.0
        },
    }
}

impl PortfolioTotals {
    pub fn ratios(&self) -> DerivedRatios {
        derive_ratios(self)
    }

    /// The totals in raw insight-record shape, with the derived ratios in the
    /// rate fields.
    pub fn to_insight_record(&self) -> InsightRecord {
        let ratios = self.ratios();
        InsightRecord {
            impressions: Some(MetricValue::from_f64(self.impressions)),
            clicks: Some(MetricValue::from_f64(self.clicks)),
            spend: Some(MetricValue::from_f64(self.spend)),
            reach: Some(MetricValue::from_f64(self.reach)),
            frequency: Some(MetricValue::from_f64(self.max_frequency)),
            cpc: Some(MetricValue::from_f64(ratios.cpc)),
            cpm: Some(MetricValue::from_f64(ratios.cpm)),
            ctr: Some(MetricValue::from_f64(ratios.ctr)),
        }
    }
}
