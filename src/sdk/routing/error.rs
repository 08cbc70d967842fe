use serde::Deserialize;
use thiserror::Error;

// Helper structs to parse the JSON error response from ORS
#[derive(Deserialize, Debug)]
pub struct OrsErrorDetail {
    pub code: u32,
    pub message: String,
}
#[derive(Deserialize, Debug)]
pub struct OrsErrorPayload {
    pub error: OrsErrorDetail,
}

/// ORS code for "Could not find routable point within a radius".
pub const ORS_UNROUTABLE_POINT: u32 = 2010;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("A point was not routable on the road network")]
    UnroutablePoint,

    #[error("API Error (Code {code}): {message}")]
    ApiError { code: u32, message: String },

    // Non-success status whose body isn't the ORS error shape
    #[error("Unstructured API Error ({status}): {body}")]
    RawApiError { status: u16, body: String },

    #[error("No results for {0}")]
    NotFound(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Underlying request failed: {0}")]
    RequestError(reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else {
            ProviderError::RequestError(err)
        }
    }
}

impl ProviderError {
    /// Classifies a non-success ORS response body.
    pub fn from_response(status: u16, body: String) -> Self {
        match serde_json::from_str::<OrsErrorPayload>(&body) {
            Ok(payload) if payload.error.code == ORS_UNROUTABLE_POINT => {
                ProviderError::UnroutablePoint
            }
            Ok(payload) => ProviderError::ApiError {
                code: payload.error.code,
                message: payload.error.message,
            },
            Err(_) => {
                log::error!(
                    "API returned non-success status: {}. Unparseable Body: {}",
                    status,
                    body
                );
                ProviderError::RawApiError { status, body }
            }
        }
    }
}

/// Why a route estimate could not be produced.
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("Could not geocode \"{query}\": {source}")]
    GeocodeFailure {
        query: String,
        #[source]
        source: ProviderError,
    },

    #[error("Could not find a route: {source}")]
    RouteFailure {
        #[source]
        source: ProviderError,
    },
}
