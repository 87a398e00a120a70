use crate::config::{self, GeocodingGateway};
use anyhow::{anyhow, Context as _, Result};
use chimeo_gateways::{json_store::JsonFileStore, opencage::OpenCage};

pub fn geocoding_gateway(cfg: &config::Geocoding) -> Result<OpenCage> {
    match &cfg.gateway {
        Some(GeocodingGateway::OpenCage { api_key }) => {
            log::info!("Use OpenCage geocoding gateway");
            Ok(OpenCage::new(api_key.clone()))
        }
        None => Err(anyhow!(
            "No geocoding gateway configured: set OPENCAGE_API_KEY or configure [geocoding]"
        )),
    }
}

pub fn organization_store(cfg: &config::Store) -> Result<JsonFileStore> {
    log::info!("Use organization store in {}", cfg.dir.display());
    JsonFileStore::try_new(&cfg.dir)
        .with_context(|| format!("Unable to open organization store {}", cfg.dir.display()))
}
