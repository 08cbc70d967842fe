use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::sdk::metrics::record::ImpactFactors;
use crate::sdk::metrics::sqlite::DEFAULT_BUSY_TIMEOUT;
use crate::sdk::metrics::store::DEFAULT_MAX_WRITE_ATTEMPTS;
use crate::sdk::routing::types::EMISSION_KG_PER_MILE;
use crate::sdk::util::rate_limit::DEFAULT_REQUESTS_PER_MINUTE;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Configuration missing: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Which openrouteservice deployment answers geocoding and routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrsConfig {
    Remote { api_key: String },
    Local { base_url: String },
    /// Hosted geocoding, self-hosted directions.
    Hybrid { api_key: String, base_url: String },
}

/// Settings read once at startup and handed to each component.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub ors: Option<OrsConfig>,
    pub database_path: PathBuf,
    pub geo_cache_path: Option<PathBuf>,
    pub http_timeout: Duration,
    pub db_busy_timeout: Duration,
    pub requests_per_minute: u32,
    pub emission_kg_per_mile: f64,
    pub factors: ImpactFactors,
    pub max_write_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ors: None,
            database_path: PathBuf::from("greenroute.db"),
            geo_cache_path: None,
            http_timeout: Duration::from_secs(15),
            db_busy_timeout: DEFAULT_BUSY_TIMEOUT,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            emission_kg_per_mile: EMISSION_KG_PER_MILE,
            factors: ImpactFactors::default(),
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let ors = match (get("ORS_API_KEY"), get("ORS_LOCAL_URL")) {
            (Some(api_key), Some(base_url)) => Some(OrsConfig::Hybrid { api_key, base_url }),
            (Some(api_key), None) => Some(OrsConfig::Remote { api_key }),
            (None, Some(base_url)) => Some(OrsConfig::Local { base_url }),
            (None, None) => None,
        };

        let factors = ImpactFactors {
            fuel_liters_per_km: read_factor(&get, "GREENROUTE_FUEL_LITERS_PER_KM")?
                .unwrap_or(defaults.factors.fuel_liters_per_km),
            cost_usd_per_route: read_factor(&get, "GREENROUTE_COST_USD_PER_ROUTE")?
                .unwrap_or(defaults.factors.cost_usd_per_route),
        };

        Ok(Self {
            ors,
            database_path: get("GREENROUTE_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            geo_cache_path: get("GREENROUTE_GEO_CACHE").map(PathBuf::from),
            http_timeout: read_number(&get, "GREENROUTE_HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            db_busy_timeout: read_number(&get, "GREENROUTE_DB_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.db_busy_timeout),
            requests_per_minute: read_number(&get, "ORS_REQUESTS_PER_MINUTE")?
                .unwrap_or(defaults.requests_per_minute),
            emission_kg_per_mile: read_factor(&get, "GREENROUTE_EMISSION_KG_PER_MILE")?
                .unwrap_or(defaults.emission_kg_per_mile),
            factors,
            max_write_attempts: read_number(&get, "GREENROUTE_MAX_WRITE_ATTEMPTS")?
                .unwrap_or(defaults.max_write_attempts),
        })
    }

    /// The ORS deployment, or `ConfigurationMissing` when routing is disabled.
    pub fn ors(&self) -> Result<&OrsConfig, ConfigError> {
        self.ors
            .as_ref()
            .ok_or(ConfigError::Missing("ORS_API_KEY or ORS_LOCAL_URL"))
    }
}

fn read_number<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|value| value.parse().map_err(|_| ConfigError::Invalid { key, value }))
        .transpose()
}

/// A multiplier applied to every route: finite and not negative.
fn read_factor<G>(get: &G, key: &'static str) -> Result<Option<f64>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match read_number::<f64, G>(get, key)? {
        Some(factor) if !factor.is_finite() || factor < 0.0 => Err(ConfigError::Invalid {
            key,
            value: get(key).unwrap_or_default(),
        }),
        factor => Ok(factor),
    }
}
