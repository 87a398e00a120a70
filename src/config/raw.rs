use duration_str::deserialize_option_duration;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

const DEFAULT_CONFIG_FILE: &str = include_str!("chimeo.default.toml");

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub store: Option<Store>,
    pub geocoding: Option<Geocoding>,
    pub gateway: Option<Gateway>,
    pub reconciliation: Option<Reconciliation>,
}

impl Default for Config {
    fn default() -> Self {
        let cfg: Self = toml::from_str(DEFAULT_CONFIG_FILE).expect("Default configuration");
        cfg
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Store {
    pub dir: PathBuf,
}

impl Default for Store {
    fn default() -> Self {
        Config::default().store.expect("Store configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Geocoding {
    pub gateway: Option<GeocodingGateway>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeocodingGateway {
    Opencage,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Gateway {
    pub opencage: Option<OpenCage>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OpenCage {
    pub api_key: String,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Reconciliation {
    pub drift_threshold_meters: Option<f64>,
    pub max_concurrency: Option<usize>,
    pub retry_max_attempts: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub retry_backoff: Option<Duration>,
}

impl Default for Reconciliation {
    fn default() -> Self {
        Config::default()
            .reconciliation
            .expect("Reconciliation configuration")
    }
}
