use super::common::CommonParams;
use super::composer::ComposerError;
use algokit_transact::{KeyRegistrationTransactionBuilder, Transaction, TransactionHeader};

/// Registers participation keys, bringing the sender online for consensus.
///
/// Every participation field is required here; only the state proof key may be left out.
#[derive(Debug, Default, Clone)]
pub struct OnlineKeyRegistrationParams {
    pub common_params: CommonParams,
    pub vote_key: [u8; 32],
    pub selection_key: [u8; 32],
    pub vote_first: u64,
    pub vote_last: u64,
    pub vote_key_dilution: u64,
    pub state_proof_key: Option<[u8; 64]>,
}

/// Takes the sender offline. No participation keys are sent.
#[derive(Debug, Default, Clone)]
pub struct OfflineKeyRegistrationParams {
    pub common_params: CommonParams,
}

/// Permanently marks the sender as non-participating.
#[derive(Debug, Default, Clone)]
pub struct NonParticipationKeyRegistrationParams {
    pub common_params: CommonParams,
}

fn key_registration_error(e: impl std::fmt::Display) -> ComposerError {
    ComposerError::TransactionError {
        message: e.to_string(),
    }
}

pub fn build_online_key_registration(
    params: &OnlineKeyRegistrationParams,
    header: TransactionHeader,
) -> Result<Transaction, ComposerError> {
    let mut builder = KeyRegistrationTransactionBuilder::default();
    builder
        .header(header)
        .vote_key(params.vote_key)
        .selection_key(params.selection_key)
        .vote_first(params.vote_first)
        .vote_last(params.vote_last)
        .vote_key_dilution(params.vote_key_dilution);

    if let Some(state_proof_key) = params.state_proof_key {
        builder.state_proof_key(state_proof_key);
    }

    builder.build().map_err(key_registration_error)
}

pub fn build_offline_key_registration(
    _params: &OfflineKeyRegistrationParams,
    header: TransactionHeader,
) -> Result<Transaction, ComposerError> {
    KeyRegistrationTransactionBuilder::default()
        .header(header)
        .build()
        .map_err(key_registration_error)
}

pub fn build_non_participation_key_registration(
    _params: &NonParticipationKeyRegistrationParams,
    header: TransactionHeader,
) -> Result<Transaction, ComposerError> {
    KeyRegistrationTransactionBuilder::default()
        .header(header)
        .non_participation(true)
        .build()
        .map_err(key_registration_error)
}
