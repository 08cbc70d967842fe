use super::read_body;
use super::types::{directions_body, zero_route, DirectionsResponse, GeoResponse};
use crate::sdk::routing::error::ProviderError;
use crate::sdk::routing::service::{GeocodingProvider, RoutingProvider};
use crate::sdk::routing::types::{GeoPoint, ProviderRoute};
use reqwest::blocking::Client;
use std::time::Duration;

/// Self-hosted ORS (with its bundled Pelias geocoder). No key, no quota.
#[derive(Clone)]
pub struct LocalOrsProvider {
    client: Client,
    base_url: String,
}

impl LocalOrsProvider {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl GeocodingProvider for LocalOrsProvider {
    fn geocode(&self, place: &str) -> Result<GeoPoint, ProviderError> {
        log::debug!("[PROVIDER] Calling local geocode for place: \"{}\"", place);
        let url = format!("{}/pelias/v1/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("text", place), ("size", "1")])
            .send()?;
        let resp: GeoResponse = read_body(response, &url)?;
        resp.first_point(place)
    }
}

impl RoutingProvider for LocalOrsProvider {
    fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<ProviderRoute, ProviderError> {
        if start == end {
            return Ok(zero_route(start, end));
        }

        log::debug!(
            "[PROVIDER] Calling local directions for {:?} -> {:?}",
            start,
            end
        );
        let url = format!("{}/v2/directions/driving-car/geojson", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&directions_body(start, end))
            .send()
            .map_err(|e| {
                log::error!(
                    "Failed to send POST request to local ORS. URL: {}\nError: {}",
                    url,
                    e
                );
                e
            })?;

        let directions: DirectionsResponse = read_body(response, &url)?;
        directions.into_route()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_unanswered_request_is_timeout() {
        // Connections queue in the backlog but nothing ever replies.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let provider =
            LocalOrsProvider::new(format!("http://{}", addr), Duration::from_millis(50)).unwrap();

        let err = provider.geocode("Rennes").unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)), "got {:?}", err);

        let err = provider
            .route(GeoPoint::new(48.1173, -1.6778), GeoPoint::new(47.2184, -1.5536))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)), "got {:?}", err);
        drop(listener);
    }
}
