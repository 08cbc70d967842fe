use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder fuel saving per km simulated; overridable via config.
pub const FUEL_LITERS_PER_KM: f64 = 0.1;
/// Placeholder cost saving per simulated route; overridable via config.
pub const COST_USD_PER_ROUTE: f64 = 50.0;

/// Conversion factors for the derived totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactFactors {
    pub fuel_liters_per_km: f64,
    pub cost_usd_per_route: f64,
}

impl Default for ImpactFactors {
    fn default() -> Self {
        Self {
            fuel_liters_per_km: FUEL_LITERS_PER_KM,
            cost_usd_per_route: COST_USD_PER_ROUTE,
        }
    }
}

/// Running totals across every route simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub total_distance_km: f64,
    pub total_emissions_kg: f64,
    pub fuel_savings_liters: f64,
    pub cost_savings_usd: f64,
    pub route_count: u64,
    pub updated_at: DateTime<Utc>,
}

impl MetricsRecord {
    pub fn zero(now: DateTime<Utc>) -> Self {
        Self {
            total_distance_km: 0.0,
            total_emissions_kg: 0.0,
            fuel_savings_liters: 0.0,
            cost_savings_usd: 0.0,
            route_count: 0,
            updated_at: now,
        }
    }

    /// Adds one simulated route to the totals and recomputes derived fields.
    pub fn accumulate(
        &self,
        distance_km: f64,
        emissions_kg: f64,
        factors: &ImpactFactors,
        now: DateTime<Utc>,
    ) -> Self {
        let total_distance_km = self.total_distance_km + distance_km;
        let route_count = self.route_count + 1;
        Self {
            total_distance_km,
            total_emissions_kg: self.total_emissions_kg + emissions_kg,
            fuel_savings_liters: total_distance_km * factors.fuel_liters_per_km,
            cost_savings_usd: route_count as f64 * factors.cost_usd_per_route,
            route_count,
            updated_at: now,
        }
    }
}

/// A record as stored, with the row id and the version used for conditional writes.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMetrics {
    pub id: i64,
    pub version: i64,
    pub record: MetricsRecord,
}
