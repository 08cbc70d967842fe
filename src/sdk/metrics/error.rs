use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Metrics storage failed: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Metrics row kept changing underneath us; gave up after {attempts} attempts")]
    Contention { attempts: u32 },

    #[error("Refusing to add {field} = {value}; deltas must be finite and non-negative")]
    InvalidDelta { field: &'static str, value: f64 },

    #[error("Metrics row missing right after it was created")]
    MissingRecord,
}

pub type Result<T> = std::result::Result<T, MetricsError>;
