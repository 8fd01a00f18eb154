use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

/// Suggested parameters for building transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionParams {
    pub consensus_version: String,
    /// Fee per byte in µALGO.
    pub fee: u64,
    pub last_round: u64,
    pub genesis_id: String,
    /// Base64 encoded.
    pub genesis_hash: String,
    pub min_fee: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransactionResponse {
    #[serde(rename = "txId")]
    pub tx_id: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransactionResponse {
    #[serde(default)]
    pub confirmed_round: Option<u64>,
    #[serde(default)]
    pub pool_error: String,
    #[serde(default)]
    pub application_index: Option<u64>,
    #[serde(default)]
    pub asset_index: Option<u64>,
    #[serde_as(as = "Option<Vec<Base64>>")]
    #[serde(default)]
    pub logs: Option<Vec<Vec<u8>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeStatus {
    pub last_round: u64,
    #[serde(default)]
    pub time_since_last_round: u64,
    #[serde(default)]
    pub catchup_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationStateSchema {
    #[serde(default)]
    pub num_uint: u64,
    #[serde(default)]
    pub num_byte_slice: u64,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationParams {
    pub creator: String,
    #[serde_as(as = "Base64")]
    pub approval_program: Vec<u8>,
    #[serde_as(as = "Base64")]
    pub clear_state_program: Vec<u8>,
    #[serde(default)]
    pub extra_program_pages: Option<u32>,
    #[serde(default)]
    pub global_state_schema: Option<ApplicationStateSchema>,
    #[serde(default)]
    pub local_state_schema: Option<ApplicationStateSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: u64,
    pub params: ApplicationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transaction_params() {
        let params: TransactionParams = serde_json::from_str(
            r#"{
                "consensus-version": "https://github.com/algorandfoundation/specs/tree/236dcc18c9c507d794813ab768e467ea42d1b4d9",
                "fee": 0,
                "genesis-hash": "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=",
                "genesis-id": "testnet-v1.0",
                "last-round": 50753309,
                "min-fee": 1000
            }"#,
        )
        .unwrap();
        assert_eq!(params.genesis_id, "testnet-v1.0");
        assert_eq!(params.last_round, 50753309);
        assert_eq!(params.min_fee, 1000);
    }

    #[test]
    fn parses_pending_transaction_with_logs() {
        let pending: PendingTransactionResponse = serde_json::from_str(
            r#"{"confirmed-round": 12, "pool-error": "", "logs": ["FR98dQAAAAAAAAAD"], "application-index": 1001}"#,
        )
        .unwrap();
        assert_eq!(pending.confirmed_round, Some(12));
        assert_eq!(pending.application_index, Some(1001));
        assert_eq!(
            pending.logs.unwrap()[0],
            vec![0x15, 0x1f, 0x7c, 0x75, 0, 0, 0, 0, 0, 0, 0, 3]
        );
    }

    #[test]
    fn parses_application() {
        let app: Application = serde_json::from_str(
            r#"{"id": 1234, "params": {
                "creator": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ",
                "approval-program": "CoEBQw==",
                "clear-state-program": "CoEBQw==",
                "global-state-schema": {"num-uint": 2}
            }}"#,
        )
        .unwrap();
        assert_eq!(app.params.approval_program, vec![0x0a, 0x81, 0x01, 0x43]);
        assert_eq!(app.params.global_state_schema.unwrap().num_uint, 2);
        assert!(app.params.local_state_schema.is_none());
    }
}
