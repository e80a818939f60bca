//! Indicator error type.
//!
//! Short history and zero denominators are not errors: they surface as `None`
//! entries in the output series. Only caller mistakes end up here.

use thiserror::Error;

/// Errors raised by the technical indicator functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// A parameter the caller controls is out of its domain (e.g. a zero
    /// period). Fatal to the call; retrying with the same input cannot help.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl IndicatorError {
    /// Creates an `InvalidArgument` error with a message.
    #[must_use]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        IndicatorError::InvalidArgument(msg.into())
    }
}

/// Reject a zero look-back window for the parameter named `param`.
pub(crate) fn ensure_period(param: &str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::invalid_argument(format!(
            "{param} must be at least 1, got 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_period_is_rejected_with_param_name() {
        let err = ensure_period("rsi period", 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: rsi period must be at least 1, got 0"
        );
    }

    #[test]
    fn positive_period_is_accepted() {
        assert!(ensure_period("period", 1).is_ok());
    }
}
