use super::read_body;
use super::types::{directions_body, zero_route, DirectionsResponse, GeoResponse};
use crate::sdk::routing::error::ProviderError;
use crate::sdk::routing::service::{GeocodingProvider, RoutingProvider};
use crate::sdk::routing::types::{GeoPoint, ProviderRoute};
use crate::sdk::util::rate_limit::{wait_for_permit, Limiter};
use reqwest::blocking::Client;
use std::time::Duration;

pub const ORS_BASE_URL: &str = "https://api.openrouteservice.org";

/// Hosted openrouteservice.org, authenticated by API key and rate limited.
#[derive(Clone)]
pub struct RemoteOrsProvider {
    client: Client,
    api_key: String,
    base_url: String,
    limiter: Limiter,
}

impl RemoteOrsProvider {
    pub fn new(
        api_key: String,
        limiter: Limiter,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, ORS_BASE_URL.to_string(), limiter, timeout)
    }

    pub fn with_base_url(
        api_key: String,
        base_url: String,
        limiter: Limiter,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter,
        })
    }
}

impl GeocodingProvider for RemoteOrsProvider {
    fn geocode(&self, place: &str) -> Result<GeoPoint, ProviderError> {
        wait_for_permit(&self.limiter);
        let url = format!("{}/geocode/search", self.base_url);
        log::debug!("[PROVIDER] Calling remote geocode for place: \"{}\"", place);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("text", place), ("size", "1")])
            .send()?;
        let resp: GeoResponse = read_body(response, &url)?;
        resp.first_point(place)
    }
}

impl RoutingProvider for RemoteOrsProvider {
    fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<ProviderRoute, ProviderError> {
        if start == end {
            log::debug!("Start and end coordinates are identical. Returning zero route.");
            return Ok(zero_route(start, end));
        }

        wait_for_permit(&self.limiter);
        log::debug!(
            "[PROVIDER] Calling remote directions for {:?} -> {:?}",
            start,
            end
        );
        let url = format!("{}/v2/directions/driving-car/geojson", self.base_url);
        let body = directions_body(start, end);

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                log::error!(
                    "Failed to send POST request. URL: {}\nBody: {}\nError: {}",
                    url,
                    body,
                    e
                );
                e
            })?;

        let directions: DirectionsResponse = read_body(response, &url)?;
        directions.into_route()
    }
}
