use crate::domain::chart::OrderPolicy;
use crate::domain::sample::DEFAULT_CALIBRATION;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CloudConfig {
    pub cloud: CloudSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CloudSettings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub device_name: String,
    #[serde(default = "default_event_prefix")]
    pub event_prefix: String,
    #[serde(default = "default_login_timeout_secs")]
    pub login_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    #[serde(default = "default_calibration")]
    pub calibration: f64,
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    #[serde(default = "default_order_policy")]
    pub order_policy: OrderPolicy,
}

fn default_api_url() -> String {
    "https://api.particle.io".to_string()
}

fn default_event_prefix() -> String {
    "weight".to_string()
}

fn default_login_timeout_secs() -> u64 {
    10
}

fn default_calibration() -> f64 {
    DEFAULT_CALIBRATION
}

fn default_tick_secs() -> u64 {
    2
}

fn default_order_policy() -> OrderPolicy {
    OrderPolicy::Reset
}

pub fn load_cloud_config() -> anyhow::Result<CloudConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/cloud"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_chart_config() -> anyhow::Result<ChartConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/chart"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
