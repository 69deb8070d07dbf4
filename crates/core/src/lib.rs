pub mod config;
pub mod error;
pub mod lab;
pub mod types;

pub use config::AppConfig;
pub use error::{InsightError, InsightResult};
pub use lab::{LabMetricValue, LabReport, LabStrategyReport, Strategy};
pub use types::{AdRecord, CampaignRecord, DashboardSnapshot, InsightPayload, InsightRecord, MetricValue};
