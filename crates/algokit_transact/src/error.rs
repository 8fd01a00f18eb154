//! Error types for the transact crate.
//!
//! Covers msgpack encoding/decoding failures, address parsing and the input checks applied
//! when fees or groups are assigned.

use snafu::Snafu;

/// Represents errors that can occur while creating, encoding or grouping transactions.
#[derive(Debug, Snafu)]
pub enum AlgoKitTransactError {
    #[snafu(display("Error ocurred during encoding: {source}"))]
    EncodingError { source: rmp_serde::encode::Error },

    #[snafu(display("Error ocurred during decoding: {source}"))]
    DecodingError { source: rmp_serde::decode::Error },

    #[snafu(display("Error ocurred during msgpack encoding: {source}"))]
    MsgpackEncodingError { source: rmpv::encode::Error },

    #[snafu(display("Error ocurred during msgpack decoding: {source}"))]
    MsgpackDecodingError { source: rmpv::decode::Error },

    #[snafu(display("Unknown transaction type: {message}"))]
    UnknownTransactionType { message: String },

    #[snafu(display("Transaction fee {fee} µALGO is greater than max fee {max_fee} µALGO"))]
    FeeExceedsMax { fee: u64, max_fee: u64 },

    #[snafu(display("{message}"))]
    InputError { message: String },

    #[snafu(display("{message}"))]
    InvalidAddress { message: String },
}

impl From<rmp_serde::encode::Error> for AlgoKitTransactError {
    fn from(source: rmp_serde::encode::Error) -> Self {
        AlgoKitTransactError::EncodingError { source }
    }
}

impl From<rmp_serde::decode::Error> for AlgoKitTransactError {
    fn from(source: rmp_serde::decode::Error) -> Self {
        AlgoKitTransactError::DecodingError { source }
    }
}

impl From<rmpv::encode::Error> for AlgoKitTransactError {
    fn from(source: rmpv::encode::Error) -> Self {
        AlgoKitTransactError::MsgpackEncodingError { source }
    }
}

impl From<rmpv::decode::Error> for AlgoKitTransactError {
    fn from(source: rmpv::decode::Error) -> Self {
        AlgoKitTransactError::MsgpackDecodingError { source }
    }
}
