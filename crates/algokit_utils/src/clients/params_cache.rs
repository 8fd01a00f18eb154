use super::algod_api::{AlgodApi, AlgodApiError, SuggestedParams};
use algod_client::models::{Application, PendingTransactionResponse};
use algokit_transact::SignedTransaction;
use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_PARAMS_FRESHNESS: Duration = Duration::from_secs(3);

/// Wraps an [`AlgodApi`] and reuses suggested params for a short freshness window.
///
/// Callers always receive their own copy of the cached params. All other calls go straight
/// through to the wrapped client.
pub struct ParamsCache<A> {
    inner: A,
    freshness: Duration,
    cached: Mutex<Option<(Instant, SuggestedParams)>>,
}

impl<A: AlgodApi> ParamsCache<A> {
    pub fn new(inner: A) -> Self {
        Self::with_freshness(inner, DEFAULT_PARAMS_FRESHNESS)
    }

    pub fn with_freshness(inner: A, freshness: Duration) -> Self {
        Self {
            inner,
            freshness,
            cached: Mutex::new(None),
        }
    }

    /// Drops the cached params so the next call fetches fresh ones.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

#[async_trait]
impl<A: AlgodApi> AlgodApi for ParamsCache<A> {
    async fn suggested_params(&self) -> Result<SuggestedParams, AlgodApiError> {
        let mut cached = self.cached.lock().await;
        if let Some((fetched_at, params)) = cached.as_ref() {
            if fetched_at.elapsed() < self.freshness {
                return Ok(params.clone());
            }
        }

        debug!("Fetching suggested params");
        let params = self.inner.suggested_params().await?;
        *cached = Some((Instant::now(), params.clone()));
        Ok(params)
    }

    async fn submit_group(
        &self,
        transactions: &[SignedTransaction],
    ) -> Result<String, AlgodApiError> {
        self.inner.submit_group(transactions).await
    }

    async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<PendingTransactionResponse, AlgodApiError> {
        self.inner.wait_for_confirmation(tx_id, max_rounds).await
    }

    async fn application_info(&self, app_id: u64) -> Result<Option<Application>, AlgodApiError> {
        self.inner.application_info(app_id).await
    }
}
