use crate::models::{
    Application, NodeStatus, PendingTransactionResponse, RawTransactionResponse,
    TransactionParams,
};
use algokit_http_client::{HttpClient, HttpError, HttpMethod};
use algokit_transact::{AlgoKitTransactError, AlgorandMsgpack, SignedTransaction};
use serde::de::DeserializeOwned;
use snafu::Snafu;
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "default_client")]
use algokit_http_client::DefaultHttpClient;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Algod request failed: {source}"))]
    Http { source: HttpError },

    #[snafu(display("Failed to parse algod response: {message}"))]
    Serde { message: String },

    #[snafu(display("Failed to encode transactions for algod: {source}"))]
    Encode { source: AlgoKitTransactError },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Http { source } if source.is_not_found())
    }
}

impl From<HttpError> for Error {
    fn from(source: HttpError) -> Self {
        Error::Http { source }
    }
}

impl From<AlgoKitTransactError> for Error {
    fn from(source: AlgoKitTransactError) -> Self {
        Error::Encode { source }
    }
}

pub struct AlgodClient {
    http_client: Arc<dyn HttpClient>,
}

impl AlgodClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        AlgodClient { http_client }
    }

    #[cfg(feature = "default_client")]
    pub fn testnet() -> Self {
        Self::new(Arc::new(DefaultHttpClient::new(
            "https://testnet-api.4160.nodely.dev",
        )))
    }

    #[cfg(feature = "default_client")]
    pub fn localnet() -> Result<Self, Error> {
        let http_client = DefaultHttpClient::with_header(
            "http://localhost:4001",
            "X-Algo-API-Token",
            &"a".repeat(64),
        )?;
        Ok(Self::new(Arc::new(http_client)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: String,
        query: Option<HashMap<String, String>>,
    ) -> Result<T, Error> {
        let response = self
            .http_client
            .request(HttpMethod::Get, path, query, None, None)
            .await?;
        parse(&response.body)
    }

    pub async fn transaction_params(&self) -> Result<TransactionParams, Error> {
        self.get_json("/v2/transactions/params".to_string(), None)
            .await
    }

    /// Submits a signed group as concatenated msgpack.
    pub async fn raw_transaction(
        &self,
        transactions: &[SignedTransaction],
    ) -> Result<RawTransactionResponse, Error> {
        let mut body = Vec::new();
        for transaction in transactions {
            body.extend(transaction.encode()?);
        }
        let headers = HashMap::from([(
            "Content-Type".to_string(),
            "application/x-binary".to_string(),
        )]);
        let response = self
            .http_client
            .request(
                HttpMethod::Post,
                "/v2/transactions".to_string(),
                None,
                Some(body),
                Some(headers),
            )
            .await?;
        parse(&response.body)
    }

    pub async fn pending_transaction_information(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionResponse, Error> {
        let query = HashMap::from([("format".to_string(), "json".to_string())]);
        self.get_json(format!("/v2/transactions/pending/{}", tx_id), Some(query))
            .await
    }

    pub async fn status(&self) -> Result<NodeStatus, Error> {
        self.get_json("/v2/status".to_string(), None).await
    }

    /// Blocks on the node until `round` has passed.
    pub async fn status_after_block(&self, round: u64) -> Result<NodeStatus, Error> {
        self.get_json(format!("/v2/status/wait-for-block-after/{}", round), None)
            .await
    }

    pub async fn get_application_by_id(&self, app_id: u64) -> Result<Application, Error> {
        self.get_json(format!("/v2/applications/{}", app_id), None)
            .await
    }
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| Error::Serde {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use algokit_http_client::HttpResponse;
    use algokit_transact::test_utils::TransactionMother;
    use async_trait::async_trait;
    use std::sync::Mutex;

    type Request = (HttpMethod, String, Option<Vec<u8>>);

    #[derive(Default)]
    struct RecordingHttpClient {
        requests: Mutex<Vec<Request>>,
        status: Option<u16>,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClient for RecordingHttpClient {
        async fn request(
            &self,
            http_method: HttpMethod,
            path: String,
            _query: Option<HashMap<String, String>>,
            body: Option<Vec<u8>>,
            _headers: Option<HashMap<String, String>>,
        ) -> Result<HttpResponse, HttpError> {
            self.requests.lock().unwrap().push((http_method, path, body));
            if let Some(status) = self.status {
                return Err(HttpError::StatusError {
                    status,
                    message: self.body.to_string(),
                });
            }
            Ok(HttpResponse {
                body: self.body.as_bytes().to_vec(),
                headers: HashMap::new(),
            })
        }
    }

    #[tokio::test]
    async fn submits_concatenated_msgpack() {
        let http = Arc::new(RecordingHttpClient {
            body: r#"{"txId": "ABC"}"#,
            ..Default::default()
        });
        let client = AlgodClient::new(http.clone());
        let signed = SignedTransaction {
            transaction: TransactionMother::simple_payment().build().unwrap(),
            signature: Some([0u8; 64]),
            auth_address: None,
        };

        let response = client
            .raw_transaction(&[signed.clone(), signed.clone()])
            .await
            .unwrap();

        assert_eq!(response.tx_id, "ABC");
        let requests = http.requests.lock().unwrap();
        let (method, path, body) = &requests[0];
        assert_eq!(*method, HttpMethod::Post);
        assert_eq!(path, "/v2/transactions");
        let single = signed.encode().unwrap();
        assert_eq!(body.as_ref().unwrap().len(), single.len() * 2);
    }

    #[tokio::test]
    async fn not_found_is_detectable() {
        let http = Arc::new(RecordingHttpClient {
            status: Some(404),
            body: "application does not exist",
            ..Default::default()
        });
        let client = AlgodClient::new(http);
        let err = client.get_application_by_id(99).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn malformed_body_is_a_serde_error() {
        let http = Arc::new(RecordingHttpClient {
            body: "not json",
            ..Default::default()
        });
        let client = AlgodClient::new(http);
        let err = client.status().await.unwrap_err();
        assert!(matches!(err, Error::Serde { .. }));
    }
}
