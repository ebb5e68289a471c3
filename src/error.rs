// src/error.rs

use thiserror::Error;

/// Errors raised by the validation tooling.
///
/// Device and transport faults are non-fatal: the poller reports them and keeps
/// its previous samples. Row and parameter faults abort the operation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// No USB device with the expected ids is attached.
    #[error("device {vendor_id:04x}:{product_id:04x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// A bulk transfer did not complete within the transfer timeout.
    #[error("timeout while {0}")]
    TransportTimeout(&'static str),

    /// Any other USB transfer failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// A data row of a measurement log could not be parsed.
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Rejected configuration, e.g. a non-positive discretization ratio.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ValidationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    /// Whether the poller degrades to stale data instead of surfacing the error.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotFound { .. } | Self::TransportTimeout(_) | Self::Transport(_)
        )
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ValidationError::DeviceNotFound {
            vendor_id: 0x0F44,
            product_id: 0xFF20,
        };
        assert_eq!(err.to_string(), "device 0f44:ff20 not found");
        assert_eq!(
            ValidationError::malformed(12, "expected 3 values").to_string(),
            "malformed row at line 12: expected 3 values"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(ValidationError::TransportTimeout("reading").is_transient());
        assert!(!ValidationError::invalid("ratio").is_transient());
        assert!(!ValidationError::malformed(1, "x").is_transient());
    }
}
