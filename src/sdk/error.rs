use thiserror::Error;

use crate::sdk::config::ConfigError;
use crate::sdk::metrics::MetricsError;
use crate::sdk::routing::error::{EstimateError, ProviderError};

/// Everything that can stop one user action. None of these are fatal to the process.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] MetricsError),

    #[error("Feature disabled: {0}")]
    ConfigurationMissing(#[from] ConfigError),

    #[error("Could not set up route provider: {0}")]
    Provider(#[from] ProviderError),
}

impl SimulationError {
    /// One-line text suitable for showing to the dashboard user.
    pub fn user_message(&self) -> String {
        match self {
            SimulationError::Estimate(EstimateError::GeocodeFailure { query, .. }) => {
                format!("We couldn't find \"{}\". Try a more specific place name.", query)
            }
            SimulationError::Estimate(EstimateError::RouteFailure { .. }) => {
                "No driving route was found between those places.".to_string()
            }
            SimulationError::Persistence(_) => {
                "Your route was simulated but the impact totals could not be saved.".to_string()
            }
            SimulationError::ConfigurationMissing(_) | SimulationError::Provider(_) => {
                "Route simulation is currently unavailable.".to_string()
            }
        }
    }
}
