use anyhow::{anyhow, Result};
use chimeo_application::prelude::{ReconcilerConfig, RetryPolicy};
use chimeo_core::entities::Distance;
use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "chimeo.toml";

const ENV_NAME_STORE_DIR: &str = "CHIMEO_STORE_DIR";
const ENV_NAME_OPENCAGE_API_KEY: &str = "OPENCAGE_API_KEY";

#[derive(Debug)]
pub struct Config {
    pub store: Store,
    pub geocoding: Geocoding,
    pub reconciliation: ReconcilerConfig,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let file_path: &Path = file_path.as_ref().map(|p| p.as_ref()).unwrap_or_else(|| {
            log::info!("No configuration file specified. load {DEFAULT_CONFIG_FILE_NAME}");
            Path::new(DEFAULT_CONFIG_FILE_NAME)
        });

        let raw_config = match fs::read_to_string(file_path) {
            Ok(cfg_string) => toml::from_str(&cfg_string)?,
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {
                    log::info!(
                        "{} not found => load default configuration.",
                        file_path.display()
                    );
                    Ok(raw::Config::default())
                }
                _ => Err(err),
            }?,
        };
        let mut cfg = Self::try_from(raw_config)?;
        if let Ok(dir) = env::var(ENV_NAME_STORE_DIR) {
            cfg.store.dir = dir.into();
        }
        if let Ok(api_key) = env::var(ENV_NAME_OPENCAGE_API_KEY) {
            cfg.geocoding.gateway = Some(GeocodingGateway::OpenCage { api_key });
        }
        Ok(cfg)
    }
}

#[derive(Debug)]
pub struct Store {
    /// File system directory with the organization documents.
    pub dir: PathBuf,
}

#[derive(Debug)]
pub struct Geocoding {
    pub gateway: Option<GeocodingGateway>,
}

pub enum GeocodingGateway {
    OpenCage { api_key: String },
}

impl std::fmt::Debug for GeocodingGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenCage { .. } => f
                .debug_struct("OpenCage")
                .field("api_key", &"***")
                .finish(),
        }
    }
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            store,
            geocoding,
            gateway,
            reconciliation,
        } = from;

        let raw::Store { dir } = store.unwrap_or_default();
        let store = Store { dir };

        let geo_gateway = match geocoding.and_then(|g| g.gateway) {
            Some(gw_name) => {
                let gateway = gateway.ok_or_else(|| anyhow!("Missing gateway configuration"))?;
                let gw = match gw_name {
                    raw::GeocodingGateway::Opencage => {
                        let raw::OpenCage { api_key } = gateway
                            .opencage
                            .ok_or_else(|| anyhow!("Missing 'opencage' gateway configuration"))?;
                        GeocodingGateway::OpenCage { api_key }
                    }
                };
                Some(gw)
            }
            None => None,
        };
        let geocoding = Geocoding {
            gateway: geo_gateway,
        };

        let raw::Reconciliation {
            drift_threshold_meters,
            max_concurrency,
            retry_max_attempts,
            retry_backoff,
        } = reconciliation.unwrap_or_default();

        let defaults = ReconcilerConfig::default();
        let drift_threshold = drift_threshold_meters
            .map(Distance::from_meters)
            .unwrap_or(defaults.drift_threshold);
        if !drift_threshold.is_valid() {
            return Err(anyhow!("Invalid drift threshold: {drift_threshold}"));
        }
        let max_concurrency = max_concurrency.unwrap_or(defaults.max_concurrency);
        if max_concurrency == 0 {
            return Err(anyhow!("The max. concurrency must be at least 1"));
        }
        let max_attempts = retry_max_attempts.unwrap_or(defaults.retry.max_attempts);
        if max_attempts == 0 {
            return Err(anyhow!("The max. number of attempts must be at least 1"));
        }
        let retry = RetryPolicy {
            max_attempts,
            backoff: retry_backoff.unwrap_or(defaults.retry.backoff),
        };
        let reconciliation = ReconcilerConfig {
            drift_threshold,
            max_concurrency,
            retry,
        };

        Ok(Self {
            store,
            geocoding,
            reconciliation,
        })
    }
}
