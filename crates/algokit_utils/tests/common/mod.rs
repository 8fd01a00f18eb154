#![allow(dead_code)]

use algod_client::models::{
    Application, ApplicationParams, ApplicationStateSchema, PendingTransactionResponse,
};
use algokit_transact::{
    OnApplicationComplete, SignedTransaction, Transaction, TransactionId,
};
use algokit_utils::{AlgodApi, AlgodApiError, SuggestedParams};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call multiple times.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .format_target(true)
            .format_module_path(false)
            .try_init();
    });
}

pub const TESTNET_GENESIS_ID: &str = "testnet-v1.0";

/// An in-memory node. Submitted transactions confirm on the next round and app calls are
/// applied to a simple app table so deployments can be observed.
pub struct MockAlgod {
    params: Mutex<SuggestedParams>,
    pub param_requests: AtomicUsize,
    submitted: Mutex<Vec<Vec<SignedTransaction>>>,
    pending: Mutex<HashMap<String, Transaction>>,
    wait_bounds: Mutex<Vec<(String, u64)>>,
    apps: Mutex<HashMap<u64, Application>>,
    next_app_id: AtomicU64,
    return_log: Mutex<Option<Vec<u8>>>,
}

impl MockAlgod {
    pub fn new() -> Self {
        Self::with_genesis_id(TESTNET_GENESIS_ID)
    }

    pub fn with_genesis_id(genesis_id: &str) -> Self {
        Self {
            params: Mutex::new(SuggestedParams {
                fee_per_byte: 0,
                min_fee: 1000,
                first_valid: 1000,
                genesis_id: genesis_id.to_string(),
                genesis_hash: [4; 32],
                consensus_version: "v40".to_string(),
            }),
            param_requests: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            pending: Mutex::new(HashMap::new()),
            wait_bounds: Mutex::new(Vec::new()),
            apps: Mutex::new(HashMap::new()),
            next_app_id: AtomicU64::new(1001),
            return_log: Mutex::new(None),
        }
    }

    pub fn set_first_valid(&self, round: u64) {
        self.params.lock().unwrap().first_valid = round;
    }

    pub fn set_fee_per_byte(&self, fee_per_byte: u64) {
        self.params.lock().unwrap().fee_per_byte = fee_per_byte;
    }

    pub fn set_return_log(&self, log: Vec<u8>) {
        *self.return_log.lock().unwrap() = Some(log);
    }

    pub fn param_requests(&self) -> usize {
        self.param_requests.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<Vec<SignedTransaction>> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn wait_bounds(&self) -> Vec<(String, u64)> {
        self.wait_bounds.lock().unwrap().clone()
    }

    pub fn insert_app(&self, app: Application) {
        self.apps.lock().unwrap().insert(app.id, app);
    }

    pub fn app(&self, app_id: u64) -> Option<Application> {
        self.apps.lock().unwrap().get(&app_id).cloned()
    }

    fn apply(&self, transaction: &Transaction) -> PendingTransactionResponse {
        let confirmed_round = Some(self.params.lock().unwrap().first_valid + 1);
        let Transaction::ApplicationCall(call) = transaction else {
            return PendingTransactionResponse {
                confirmed_round,
                ..Default::default()
            };
        };

        let mut apps = self.apps.lock().unwrap();
        let mut application_index = None;
        let schema = |s: &Option<algokit_transact::StateSchema>| {
            s.as_ref().map(|s| ApplicationStateSchema {
                num_uint: s.num_uints,
                num_byte_slice: s.num_byte_slices,
            })
        };
        if call.app_id == 0 {
            let app_id = self.next_app_id.fetch_add(1, Ordering::SeqCst);
            apps.insert(
                app_id,
                Application {
                    id: app_id,
                    params: ApplicationParams {
                        creator: call.header.sender.to_string(),
                        approval_program: call.approval_program.clone().unwrap_or_default(),
                        clear_state_program: call.clear_state_program.clone().unwrap_or_default(),
                        extra_program_pages: call.extra_program_pages,
                        global_state_schema: schema(&call.global_state_schema),
                        local_state_schema: schema(&call.local_state_schema),
                    },
                },
            );
            application_index = Some(app_id);
        } else if call.on_complete == OnApplicationComplete::UpdateApplication {
            if let Some(app) = apps.get_mut(&call.app_id) {
                app.params.approval_program = call.approval_program.clone().unwrap_or_default();
                app.params.clear_state_program =
                    call.clear_state_program.clone().unwrap_or_default();
            }
        } else if call.on_complete == OnApplicationComplete::DeleteApplication {
            apps.remove(&call.app_id);
        }

        PendingTransactionResponse {
            confirmed_round,
            application_index,
            logs: self.return_log.lock().unwrap().clone().map(|log| vec![log]),
            ..Default::default()
        }
    }
}

#[async_trait]
impl AlgodApi for MockAlgod {
    async fn suggested_params(&self) -> Result<SuggestedParams, AlgodApiError> {
        self.param_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.params.lock().unwrap().clone())
    }

    async fn submit_group(
        &self,
        transactions: &[SignedTransaction],
    ) -> Result<String, AlgodApiError> {
        let mut pending = self.pending.lock().unwrap();
        for stx in transactions {
            pending.insert(stx.id().unwrap(), stx.transaction.clone());
        }
        self.submitted.lock().unwrap().push(transactions.to_vec());
        Ok(transactions[0].id().unwrap())
    }

    async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<PendingTransactionResponse, AlgodApiError> {
        self.wait_bounds
            .lock()
            .unwrap()
            .push((tx_id.to_string(), max_rounds));
        let transaction = self.pending.lock().unwrap().remove(tx_id);
        match transaction {
            Some(transaction) => Ok(self.apply(&transaction)),
            None => Err(AlgodApiError::MaxWaitRoundExpired {
                tx_id: tx_id.to_string(),
                rounds: max_rounds,
            }),
        }
    }

    async fn application_info(&self, app_id: u64) -> Result<Option<Application>, AlgodApiError> {
        Ok(self.app(app_id))
    }
}
