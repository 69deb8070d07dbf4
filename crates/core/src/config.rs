use crate::lab::Strategy;
use serde::Deserialize;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `CAMPAIGN_INSIGHTS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "default_lab_metrics")]
    pub metrics: Vec<String>,
    #[serde(default = "default_include_lab")]
    pub include_lab: bool,
}

/// The dashboard's filter selection. Empty means "everything".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub campaign_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

// Default functions
fn default_log_filter() -> String {
    "campaign_insights=info,campaign_reporting=info".to_string()
}
fn default_lab_metrics() -> Vec<String> {
    [
        "First Contentful Paint",
        "Speed Index",
        "Largest Contentful Paint",
        "Time To Interactive",
        "Total Blocking Time",
        "Cumulative Layout Shift",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_include_lab() -> bool {
    true
}
fn default_pretty() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            metrics: default_lab_metrics(),
            include_lab: default_include_lab(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            report: ReportConfig::default(),
            filter: FilterConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file (any format the
    /// `config` crate recognizes by extension, `campaign-insights.toml` by
    /// default) and environment variables.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(p) => config::File::with_name(p).required(true),
            None => config::File::with_name("campaign-insights").required(false),
        };
        let builder = config::Config::builder().add_source(file).add_source(
            config::Environment::with_prefix("CAMPAIGN_INSIGHTS")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("report.metrics")
                .with_list_parse_key("filter.campaign_ids"),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
