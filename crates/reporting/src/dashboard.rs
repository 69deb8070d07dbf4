//! Campaign performance dashboard — campaign rollups, portfolio totals and
//! lab scores for one snapshot and filter selection.

use crate::insights::{aggregate_campaigns, AdFilter, CampaignAggregate};
use crate::lab_score::{summarize_lab, LabSummary};
use crate::totals::{portfolio_totals, DerivedRatios, PortfolioTotals};
use campaign_core::config::ReportConfig;
use campaign_core::types::{DashboardSnapshot, InsightRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_campaigns: u64,
    pub total_active_campaigns: u64,
    pub campaigns_with_insights: u64,
    pub campaigns: Vec<CampaignAggregate>,
    pub totals: PortfolioTotals,
    pub ratios: DerivedRatios,
    /// Totals and ratios in raw insight-record shape.
    pub portfolio: InsightRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub overview: DashboardOverview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab: Option<LabSummary>,
}

pub fn build_overview(snapshot: &DashboardSnapshot, filter: &AdFilter) -> DashboardOverview {
    let selected = filter.select(&snapshot.campaigns);
    debug!(
        selected = selected.len(),
        loaded = snapshot.campaigns.len(),
        "Campaign filter applied"
    );

    let campaigns = aggregate_campaigns(selected, &snapshot.ads);
    let totals = portfolio_totals(&campaigns);
    let active = campaigns
        .iter()
        .filter(|c| {
            c.status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("active"))
        })
        .count();
    let with_insights = campaigns.iter().filter(|c| c.has_insights()).count();

    info!(
        campaigns = campaigns.len(),
        ads = snapshot.ads.len(),
        with_insights,
        "Dashboard overview computed"
    );

    DashboardOverview {
        total_campaigns: campaigns.len() as u64,
        total_active_campaigns: active as u64,
        campaigns_with_insights: with_insights as u64,
        ratios: totals.ratios(),
        portfolio: totals.to_insight_record(),
        totals,
        campaigns,
    }
}

/// The full dashboard: overview plus, when enabled and present, lab scores
/// for the configured strategy.
pub fn build_report(
    snapshot: &DashboardSnapshot,
    filter: &AdFilter,
    config: &ReportConfig,
) -> DashboardReport {
    let overview = build_overview(snapshot, filter);
    let lab = match (&snapshot.lab, config.include_lab) {
        (Some(report), true) => Some(summarize_lab(
            report,
            config.strategy,
            config.metrics.as_slice(),
        )),
        _ => None,
    };
    DashboardReport { overview, lab }
}
