use crate::clients::genesis_id_is_localnet;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Lifecycle event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Emitted after a transaction group is accepted by the node
    TxnGroupSubmitted,
    /// Emitted after an app deployment finishes, whatever action was taken
    AppDeployed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxnGroupSubmittedEventData {
    pub group_id: Option<String>,
    pub transaction_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDeployedEventData {
    pub app_name: String,
    pub app_id: u64,
    pub action: String,
}

#[derive(Debug, Clone)]
pub enum EventData {
    TxnGroupSubmitted(TxnGroupSubmittedEventData),
    AppDeployed(AppDeployedEventData),
}

/// Async event emitter using Tokio broadcast
#[derive(Clone)]
pub struct AsyncEventEmitter {
    sender: broadcast::Sender<(EventType, EventData)>,
}

impl AsyncEventEmitter {
    pub fn new(buffer: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(buffer);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<(EventType, EventData)> {
        self.sender.subscribe()
    }

    pub async fn emit(&self, event_type: EventType, data: EventData) {
        // No subscribers is not an error
        let _ = self.sender.send((event_type, data));
    }
}

static DEBUG: AtomicBool = AtomicBool::new(false);
static TRACE_ALL: AtomicBool = AtomicBool::new(false);
static EVENTS: Lazy<AsyncEventEmitter> = Lazy::new(|| AsyncEventEmitter::new(32));

/// Global runtime config singleton
pub struct Config;

impl Config {
    pub fn debug() -> bool {
        DEBUG.load(Ordering::Relaxed)
    }

    pub fn trace_all() -> bool {
        TRACE_ALL.load(Ordering::Relaxed)
    }

    pub fn events() -> AsyncEventEmitter {
        EVENTS.clone()
    }

    pub fn configure(new_debug: Option<bool>, new_trace_all: Option<bool>) {
        if let Some(d) = new_debug {
            DEBUG.store(d, Ordering::Relaxed);
        }
        if let Some(t) = new_trace_all {
            TRACE_ALL.store(t, Ordering::Relaxed);
        }
    }
}

/// Validity windows applied when an intent does not set its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerConfig {
    pub default_validity_window: u64,
    /// Used instead of the default on LocalNet, where blocks are only produced on demand.
    pub localnet_validity_window: u64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            default_validity_window: 10,
            localnet_validity_window: 1000,
        }
    }
}

impl ComposerConfig {
    pub fn validity_window_for(&self, genesis_id: &str) -> u64 {
        if genesis_id_is_localnet(genesis_id) {
            self.localnet_validity_window
        } else {
            self.default_validity_window
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("testnet-v1.0", 10)]
    #[case("mainnet-v1.0", 10)]
    #[case("dockernet-v1", 1000)]
    #[case("sandnet-v1", 1000)]
    fn validity_window_depends_on_network(#[case] genesis_id: &str, #[case] expected: u64) {
        assert_eq!(
            ComposerConfig::default().validity_window_for(genesis_id),
            expected
        );
    }

    #[tokio::test]
    async fn emitted_events_reach_subscribers() {
        let emitter = AsyncEventEmitter::new(4);
        let mut receiver = emitter.subscribe();
        emitter
            .emit(
                EventType::TxnGroupSubmitted,
                EventData::TxnGroupSubmitted(TxnGroupSubmittedEventData {
                    group_id: None,
                    transaction_ids: vec!["TXID".to_string()],
                }),
            )
            .await;

        let (event_type, data) = receiver.recv().await.unwrap();
        assert_eq!(event_type, EventType::TxnGroupSubmitted);
        match data {
            EventData::TxnGroupSubmitted(data) => assert_eq!(data.transaction_ids, ["TXID"]),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_silent() {
        AsyncEventEmitter::new(1)
            .emit(
                EventType::AppDeployed,
                EventData::AppDeployed(AppDeployedEventData {
                    app_name: "app".to_string(),
                    app_id: 1,
                    action: "create".to_string(),
                }),
            )
            .await;
    }
}
