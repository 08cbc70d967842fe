pub mod local;
pub mod remote;
pub mod types;

pub use local::LocalOrsProvider;
pub use remote::RemoteOrsProvider;

use crate::sdk::config::OrsConfig;
use crate::sdk::routing::error::ProviderError;
use crate::sdk::routing::service::{GeocodingProvider, RoutingProvider};
use crate::sdk::util::rate_limit::Limiter;
use reqwest::blocking::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// The geocoder/router pair selected by [`OrsConfig`].
pub struct OrsProviders {
    pub geocoder: Box<dyn GeocodingProvider>,
    pub router: Box<dyn RoutingProvider>,
}

impl OrsProviders {
    pub fn from_config(
        config: &OrsConfig,
        timeout: Duration,
        limiter: Limiter,
    ) -> Result<Self, ProviderError> {
        let providers = match config {
            OrsConfig::Remote { api_key } => {
                let remote = RemoteOrsProvider::new(api_key.clone(), limiter, timeout)?;
                Self {
                    geocoder: Box::new(remote.clone()),
                    router: Box::new(remote),
                }
            }
            OrsConfig::Local { base_url } => {
                let local = LocalOrsProvider::new(base_url.clone(), timeout)?;
                Self {
                    geocoder: Box::new(local.clone()),
                    router: Box::new(local),
                }
            }
            OrsConfig::Hybrid { api_key, base_url } => {
                log::debug!("[Hybrid Provider] REMOTE geocode, LOCAL directions");
                Self {
                    geocoder: Box::new(RemoteOrsProvider::new(api_key.clone(), limiter, timeout)?),
                    router: Box::new(LocalOrsProvider::new(base_url.clone(), timeout)?),
                }
            }
        };
        Ok(providers)
    }
}

/// Reads a response body, classifying non-success statuses as ORS errors.
pub(crate) fn read_body<T: DeserializeOwned>(
    response: Response,
    url: &str,
) -> Result<T, ProviderError> {
    let status = response.status();
    let text = response.text()?;

    if !status.is_success() {
        return Err(ProviderError::from_response(status.as_u16(), text));
    }

    serde_json::from_str(&text).map_err(|e| {
        log::error!(
            "Failed to parse ORS response. URL: {}\nError: {}. Body: {}",
            url,
            e,
            text
        );
        ProviderError::ParseError(e)
    })
}
