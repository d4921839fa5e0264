use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid billing period '{value}': expected YYYY-MM")]
    InvalidPeriod { value: String },

    #[error("No units to bill")]
    NoUnits,

    #[error("Invalid reading for unit {unit_label}: previous {previous}, current {current}")]
    InvalidReading {
        unit_label: String,
        previous:   f64,
        current:    f64,
    },

    #[error("Invalid floor area for unit {unit_label}: {area}")]
    InvalidArea { unit_label: String, area: f64 },

    #[error("Unit '{unit_label}' is not part of the roster")]
    UnknownUnit { unit_label: String },

    #[error("No calculated bills to save")]
    NothingToSave,

    #[error("No history record for period {period}")]
    RecordNotFound { period: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type BillingResult<T> = Result<T, BillingError>;
