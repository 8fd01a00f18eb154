use snafu::Snafu;

/// Errors raised while parsing, encoding or decoding ARC-4 values.
#[derive(Debug, Snafu)]
pub enum ABIError {
    #[snafu(display("ABI validation failed: {message}"))]
    ValidationError { message: String },

    #[snafu(display("ABI encoding failed: {message}"))]
    EncodingError { message: String },

    #[snafu(display("ABI decoding failed: {message}"))]
    DecodingError { message: String },

    #[snafu(display("Unable to find method {method} in {contract} app"))]
    UnknownMethod { method: String, contract: String },
}

impl ABIError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ABIError::ValidationError {
            message: message.into(),
        }
    }

    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        ABIError::EncodingError {
            message: message.into(),
        }
    }

    pub(crate) fn decoding(message: impl Into<String>) -> Self {
        ABIError::DecodingError {
            message: message.into(),
        }
    }
}
