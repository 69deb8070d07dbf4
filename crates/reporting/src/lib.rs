//! Campaign analytics and reporting — insight rollups, portfolio totals,
//! and lab metric scoring for the campaign dashboard.

pub mod dashboard;
pub mod insights;
pub mod lab_score;
pub mod thresholds;
pub mod totals;

pub use dashboard::{build_overview, build_report, DashboardOverview, DashboardReport};
pub use insights::{aggregate_by_campaign, aggregate_campaigns, aggregate_insights, AdFilter, CampaignAggregate};
pub use lab_score::{normalize, score_report, LabSummary, MetricScore, NormalizedScore, Severity};
pub use thresholds::{LabMetric, MetricThreshold, MetricUnit};
pub use totals::{derive_ratios, portfolio_totals, DerivedRatios, PortfolioTotals};
