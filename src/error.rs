//! Crate-wide error type

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HousingError {
    /// Two monthly tables that must line up row-for-row do not
    #[error("Shape mismatch: expected {expected} rows, found {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Extra payment schedule is empty")]
    EmptyExtraPayments,

    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Unable to fetch {key}: {reason}")]
    Fetch { key: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HousingError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HousingError>;

/// Reject NaN/infinite values and anything outside `[min, max]`
pub(crate) fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(HousingError::invalid(field, format!("must be finite, got {value}")));
    }
    if value < min || value > max {
        return Err(HousingError::invalid(
            field,
            format!("must be within [{min}, {max}], got {value}"),
        ));
    }
    Ok(())
}
