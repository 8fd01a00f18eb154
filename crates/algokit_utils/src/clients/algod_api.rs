use algod_client::{
    AlgodClient,
    apis::Error as AlgodError,
    models::{Application, PendingTransactionResponse, TransactionParams},
};
use algokit_transact::{Byte32, SignedTransaction};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use log::debug;
use snafu::Snafu;
use std::sync::Arc;

/// Network parameters every transaction in a group is built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedParams {
    pub fee_per_byte: u64,
    pub min_fee: u64,
    /// Latest round seen by the node, used as the first valid round.
    pub first_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: Byte32,
    pub consensus_version: String,
}

impl TryFrom<TransactionParams> for SuggestedParams {
    type Error = AlgodApiError;

    fn try_from(params: TransactionParams) -> Result<Self, Self::Error> {
        let genesis_hash = general_purpose::STANDARD
            .decode(&params.genesis_hash)
            .map_err(|e| AlgodApiError::InvalidParams {
                message: format!("Genesis hash is not valid base64: {}", e),
            })?
            .try_into()
            .map_err(|bytes: Vec<u8>| AlgodApiError::InvalidParams {
                message: format!("Genesis hash must be 32 bytes, got {}", bytes.len()),
            })?;

        Ok(SuggestedParams {
            fee_per_byte: params.fee,
            min_fee: params.min_fee,
            first_valid: params.last_round,
            genesis_id: params.genesis_id,
            genesis_hash,
            consensus_version: params.consensus_version,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum AlgodApiError {
    #[snafu(display("Algod client error: {source}"))]
    ClientError { source: AlgodError },

    #[snafu(display("Invalid suggested params: {message}"))]
    InvalidParams { message: String },

    #[snafu(display("Transaction {tx_id} was rejected; pool error: {message}"))]
    PoolError { tx_id: String, message: String },

    #[snafu(display("Transaction {tx_id} unconfirmed after {rounds} rounds"))]
    MaxWaitRoundExpired { tx_id: String, rounds: u64 },
}

impl From<AlgodError> for AlgodApiError {
    fn from(source: AlgodError) -> Self {
        AlgodApiError::ClientError { source }
    }
}

/// The node operations the composer and deployer depend on.
#[async_trait]
pub trait AlgodApi: Send + Sync {
    async fn suggested_params(&self) -> Result<SuggestedParams, AlgodApiError>;

    /// Submits a signed group and returns the id of its first transaction.
    async fn submit_group(
        &self,
        transactions: &[SignedTransaction],
    ) -> Result<String, AlgodApiError>;

    async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<PendingTransactionResponse, AlgodApiError>;

    /// `None` when the app does not exist (or has been deleted).
    async fn application_info(&self, app_id: u64) -> Result<Option<Application>, AlgodApiError>;
}

#[async_trait]
impl<T: AlgodApi + ?Sized> AlgodApi for Arc<T> {
    async fn suggested_params(&self) -> Result<SuggestedParams, AlgodApiError> {
        (**self).suggested_params().await
    }

    async fn submit_group(
        &self,
        transactions: &[SignedTransaction],
    ) -> Result<String, AlgodApiError> {
        (**self).submit_group(transactions).await
    }

    async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<PendingTransactionResponse, AlgodApiError> {
        (**self).wait_for_confirmation(tx_id, max_rounds).await
    }

    async fn application_info(&self, app_id: u64) -> Result<Option<Application>, AlgodApiError> {
        (**self).application_info(app_id).await
    }
}

#[async_trait]
impl AlgodApi for AlgodClient {
    async fn suggested_params(&self) -> Result<SuggestedParams, AlgodApiError> {
        self.transaction_params().await?.try_into()
    }

    async fn submit_group(
        &self,
        transactions: &[SignedTransaction],
    ) -> Result<String, AlgodApiError> {
        Ok(self.raw_transaction(transactions).await?.tx_id)
    }

    async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<PendingTransactionResponse, AlgodApiError> {
        let status = self.status().await?;
        let start_round = status.last_round + 1;
        let mut current_round = start_round;

        while current_round < start_round + max_rounds {
            match self.pending_transaction_information(tx_id).await {
                Ok(response) => {
                    // Kicked out of the pool, it will never confirm
                    if !response.pool_error.is_empty() {
                        return Err(AlgodApiError::PoolError {
                            tx_id: tx_id.to_string(),
                            message: response.pool_error,
                        });
                    }
                    if response.confirmed_round.is_some() {
                        return Ok(response);
                    }
                }
                Err(error) if error.is_not_found() => {
                    debug!("Transaction {} is not known to the node yet", tx_id);
                }
                Err(error) => return Err(error.into()),
            }

            self.status_after_block(current_round).await?;
            current_round += 1;
        }

        Err(AlgodApiError::MaxWaitRoundExpired {
            tx_id: tx_id.to_string(),
            rounds: max_rounds,
        })
    }

    async fn application_info(&self, app_id: u64) -> Result<Option<Application>, AlgodApiError> {
        match self.get_application_by_id(app_id).await {
            Ok(app) => Ok(Some(app)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error.into()),
        }
    }
}
