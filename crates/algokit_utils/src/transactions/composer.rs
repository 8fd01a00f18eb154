use super::app_call::{
    AppCallParams, AppCreateParams, AppDeleteParams, AppMethodCallArg, AppMethodCallParams,
    AppUpdateParams, build_app_call, build_app_method_call,
};
use super::asset_config::{
    AssetConfigParams, AssetCreateParams, AssetDestroyParams, build_asset_config,
    build_asset_create, build_asset_destroy,
};
use super::asset_freeze::{AssetFreezeParams, build_asset_freeze, build_asset_unfreeze};
use super::asset_transfer::{
    AssetClawbackParams, AssetOptInParams, AssetOptOutParams, AssetTransferParams,
    build_asset_clawback, build_asset_opt_in, build_asset_opt_out, build_asset_transfer,
};
use super::common::{
    CommonParams, TransactionSigner, TransactionSignerGetter, TransactionWithSigner,
};
use super::key_registration::{
    NonParticipationKeyRegistrationParams, OfflineKeyRegistrationParams,
    OnlineKeyRegistrationParams, build_non_participation_key_registration,
    build_offline_key_registration, build_online_key_registration,
};
use super::method_call::{nested_intents, resolve_method_args};
use super::payment::{AccountCloseParams, PaymentParams, build_account_close, build_payment};
use crate::clients::{AlgodApi, AlgodApiError, SuggestedParams};
use crate::config::{
    ComposerConfig, Config, EventData, EventType, TxnGroupSubmittedEventData,
};
use algod_client::models::PendingTransactionResponse;
use algokit_abi::{ABIError, ABIMethod, ABIReturn};
use algokit_transact::{
    AlgoKitTransactError, OnApplicationComplete, SignedTransaction, Transaction,
    TransactionHeader, TransactionId, Transactions,
};
use base64::{Engine, prelude::BASE64_STANDARD};
use derive_more::Debug;
use log::{debug, info};
use snafu::Snafu;
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Snafu)]
pub enum ComposerError {
    #[snafu(display("Only one of {first} or {second} may be set"))]
    ConfigurationError { first: String, second: String },
    #[snafu(display("Transaction fee {fee} is greater than max fee {max_fee}"))]
    FeeLimitExceeded { fee: u64, max_fee: u64 },
    #[snafu(display("App creation requires both programs, missing the {program}"))]
    MissingProgram { program: String },
    #[snafu(display("Unsupported method argument at index {index}: {message}"))]
    UnsupportedMethodArgument { index: usize, message: String },
    #[snafu(display("AlgoKit Transact error: {source}"))]
    TransactError { source: AlgoKitTransactError },
    #[snafu(display("Algod client error: {source}"))]
    AlgodClientError { source: AlgodApiError },
    #[snafu(display("ABI error: {source}"))]
    AbiError { source: ABIError },
    #[snafu(display("Transaction Error: {message}"))]
    TransactionError { message: String },
    #[snafu(display("Signing Error: {message}"))]
    SigningError { message: String },
    #[snafu(display("Composer State Error: {message}"))]
    StateError { message: String },
}

impl From<AlgoKitTransactError> for ComposerError {
    fn from(e: AlgoKitTransactError) -> Self {
        Self::TransactError { source: e }
    }
}

impl From<AlgodApiError> for ComposerError {
    fn from(e: AlgodApiError) -> Self {
        Self::AlgodClientError { source: e }
    }
}

impl From<ABIError> for ComposerError {
    fn from(e: ABIError) -> Self {
        Self::AbiError { source: e }
    }
}

/// A transaction intent. Each variant is turned into one or more transactions when the
/// group is built.
#[derive(Debug, Clone)]
pub enum ComposerTransaction {
    Transaction(Transaction),
    TransactionWithSigner(TransactionWithSigner),
    /// A group built elsewhere. Its transactions are added individually.
    Group(Vec<TransactionWithSigner>),
    Payment(PaymentParams),
    AccountClose(AccountCloseParams),
    AssetTransfer(AssetTransferParams),
    AssetOptIn(AssetOptInParams),
    AssetOptOut(AssetOptOutParams),
    AssetClawback(AssetClawbackParams),
    AssetCreate(AssetCreateParams),
    AssetConfig(AssetConfigParams),
    AssetDestroy(AssetDestroyParams),
    AssetFreeze(AssetFreezeParams),
    AssetUnfreeze(AssetFreezeParams),
    AppCall(AppCallParams),
    AppMethodCall(AppMethodCallParams),
    OnlineKeyRegistration(OnlineKeyRegistrationParams),
    OfflineKeyRegistration(OfflineKeyRegistrationParams),
    NonParticipationKeyRegistration(NonParticipationKeyRegistrationParams),
}

impl ComposerTransaction {
    /// `None` for transactions that were built outside the composer.
    pub fn common_params(&self) -> Option<&CommonParams> {
        match self {
            ComposerTransaction::Transaction(_)
            | ComposerTransaction::TransactionWithSigner(_)
            | ComposerTransaction::Group(_) => None,
            ComposerTransaction::Payment(p) => Some(&p.common_params),
            ComposerTransaction::AccountClose(p) => Some(&p.common_params),
            ComposerTransaction::AssetTransfer(p) => Some(&p.common_params),
            ComposerTransaction::AssetOptIn(p) => Some(&p.common_params),
            ComposerTransaction::AssetOptOut(p) => Some(&p.common_params),
            ComposerTransaction::AssetClawback(p) => Some(&p.common_params),
            ComposerTransaction::AssetCreate(p) => Some(&p.common_params),
            ComposerTransaction::AssetConfig(p) => Some(&p.common_params),
            ComposerTransaction::AssetDestroy(p) => Some(&p.common_params),
            ComposerTransaction::AssetFreeze(p) => Some(&p.common_params),
            ComposerTransaction::AssetUnfreeze(p) => Some(&p.common_params),
            ComposerTransaction::AppCall(p) => Some(&p.common_params),
            ComposerTransaction::AppMethodCall(p) => Some(&p.common_params),
            ComposerTransaction::OnlineKeyRegistration(p) => Some(&p.common_params),
            ComposerTransaction::OfflineKeyRegistration(p) => Some(&p.common_params),
            ComposerTransaction::NonParticipationKeyRegistration(p) => Some(&p.common_params),
        }
    }

    pub fn signer(&self) -> Option<Arc<dyn TransactionSigner>> {
        match self {
            ComposerTransaction::TransactionWithSigner(t) => Some(t.signer.clone()),
            other => other.common_params().and_then(|c| c.signer.clone()),
        }
    }

    /// Number of transactions this intent adds to the group.
    pub fn transaction_count(&self) -> usize {
        match self {
            ComposerTransaction::Group(group) => group.len(),
            ComposerTransaction::AppMethodCall(params) => {
                let arg_transactions: usize = params
                    .args
                    .iter()
                    .map(|arg| match arg {
                        AppMethodCallArg::Transaction(intent) => intent.transaction_count(),
                        AppMethodCallArg::TransactionWithSigner(_) => 1,
                        _ => 0,
                    })
                    .sum();
                arg_transactions + 1
            }
            _ => 1,
        }
    }

    /// Checks that need no network parameters. Nested method call arguments are included.
    fn validate(&self) -> Result<(), ComposerError> {
        if let Some(common_params) = self.common_params() {
            common_params.validate_fee_policy()?;
        }
        match self {
            ComposerTransaction::AppCall(params) => params.check_programs(),
            ComposerTransaction::AppMethodCall(params) => {
                params.check_programs()?;
                nested_intents(params).try_for_each(ComposerTransaction::validate)
            }
            _ => Ok(()),
        }
    }
}

/// A transaction in the making, with the signer and method that produced it.
#[derive(Debug, Clone)]
pub(crate) struct BuiltTransaction {
    pub transaction: Transaction,
    #[debug(skip)]
    pub signer: Arc<dyn TransactionSigner>,
    pub method: Option<ABIMethod>,
}

impl BuiltTransaction {
    /// Any group the transaction was part of is dropped; the composer assigns its own.
    pub fn from_prebuilt(txn_with_signer: &TransactionWithSigner) -> Self {
        let mut transaction = txn_with_signer.transaction.clone();
        transaction.header_mut().group = None;
        Self {
            transaction,
            signer: txn_with_signer.signer.clone(),
            method: None,
        }
    }
}

/// Everything a build needs, shared by every intent in the group.
pub(crate) struct BuildContext<'a> {
    pub suggested_params: &'a SuggestedParams,
    pub default_validity_window: u64,
    pub signer_getter: &'a dyn TransactionSignerGetter,
}

impl BuildContext<'_> {
    fn header(&self, common_params: &CommonParams) -> TransactionHeader {
        common_params.build_header(self.suggested_params, self.default_validity_window)
    }

    /// Explicit signer first, then the one inherited from an enclosing method call, then the
    /// signer getter.
    pub(crate) fn resolve_signer(
        &self,
        common_params: &CommonParams,
        default_signer: Option<&Arc<dyn TransactionSigner>>,
    ) -> Result<Arc<dyn TransactionSigner>, ComposerError> {
        common_params
            .signer
            .clone()
            .or_else(|| default_signer.cloned())
            .or_else(|| self.signer_getter.get_signer(&common_params.sender))
            .ok_or_else(|| ComposerError::SigningError {
                message: format!("No signer found for address {}", common_params.sender),
            })
    }

    fn finish(
        &self,
        common_params: &CommonParams,
        transaction: Transaction,
        default_signer: Option<&Arc<dyn TransactionSigner>>,
        method: Option<ABIMethod>,
    ) -> Result<BuiltTransaction, ComposerError> {
        common_params.validate_fee_policy()?;
        let transaction = common_params.apply_fee(transaction, self.suggested_params)?;
        Ok(BuiltTransaction {
            transaction,
            signer: self.resolve_signer(common_params, default_signer)?,
            method,
        })
    }

    fn build_method_call(
        &self,
        params: &AppMethodCallParams,
        default_signer: Option<&Arc<dyn TransactionSigner>>,
    ) -> Result<Vec<BuiltTransaction>, ComposerError> {
        let resolved = resolve_method_args(self, params, default_signer)?;
        let header = self.header(&params.common_params);
        let transaction = build_app_method_call(params, &resolved.args, header)?;
        let call = self.finish(
            &params.common_params,
            transaction,
            default_signer,
            Some(params.method.clone()),
        )?;

        debug!(
            "Method {} expanded to {} argument transactions, offset {}",
            params.method.name,
            resolved.transactions.len(),
            resolved.offset
        );
        let mut built = resolved.transactions;
        built.push(call);
        Ok(built)
    }

    /// Builds an intent into the transactions it occupies, in group order.
    pub(crate) fn build_intent(
        &self,
        intent: &ComposerTransaction,
        default_signer: Option<&Arc<dyn TransactionSigner>>,
    ) -> Result<Vec<BuiltTransaction>, ComposerError> {
        let (common_params, transaction) = match intent {
            ComposerTransaction::Transaction(transaction) => {
                let sender = &transaction.header().sender;
                let signer = default_signer
                    .cloned()
                    .or_else(|| self.signer_getter.get_signer(sender))
                    .ok_or_else(|| ComposerError::SigningError {
                        message: format!("No signer found for address {}", sender),
                    })?;
                let mut transaction = transaction.clone();
                transaction.header_mut().group = None;
                return Ok(vec![BuiltTransaction {
                    transaction,
                    signer,
                    method: None,
                }]);
            }
            ComposerTransaction::TransactionWithSigner(txn_with_signer) => {
                return Ok(vec![BuiltTransaction::from_prebuilt(txn_with_signer)]);
            }
            ComposerTransaction::Group(group) => {
                return Ok(group.iter().map(BuiltTransaction::from_prebuilt).collect());
            }
            ComposerTransaction::AppMethodCall(params) => {
                return self.build_method_call(params, default_signer);
            }
            ComposerTransaction::Payment(p) => {
                (&p.common_params, build_payment(p, self.header(&p.common_params)))
            }
            ComposerTransaction::AccountClose(p) => (
                &p.common_params,
                build_account_close(p, self.header(&p.common_params)),
            ),
            ComposerTransaction::AssetTransfer(p) => (
                &p.common_params,
                build_asset_transfer(p, self.header(&p.common_params)),
            ),
            ComposerTransaction::AssetOptIn(p) => (
                &p.common_params,
                build_asset_opt_in(p, self.header(&p.common_params)),
            ),
            ComposerTransaction::AssetOptOut(p) => (
                &p.common_params,
                build_asset_opt_out(p, self.header(&p.common_params)),
            ),
            ComposerTransaction::AssetClawback(p) => (
                &p.common_params,
                build_asset_clawback(p, self.header(&p.common_params)),
            ),
            ComposerTransaction::AssetCreate(p) => (
                &p.common_params,
                build_asset_create(p, self.header(&p.common_params))?,
            ),
            ComposerTransaction::AssetConfig(p) => (
                &p.common_params,
                build_asset_config(p, self.header(&p.common_params))?,
            ),
            ComposerTransaction::AssetDestroy(p) => (
                &p.common_params,
                build_asset_destroy(p, self.header(&p.common_params))?,
            ),
            ComposerTransaction::AssetFreeze(p) => (
                &p.common_params,
                build_asset_freeze(p, self.header(&p.common_params)),
            ),
            ComposerTransaction::AssetUnfreeze(p) => (
                &p.common_params,
                build_asset_unfreeze(p, self.header(&p.common_params)),
            ),
            ComposerTransaction::AppCall(p) => (
                &p.common_params,
                build_app_call(p, self.header(&p.common_params))?,
            ),
            ComposerTransaction::OnlineKeyRegistration(p) => (
                &p.common_params,
                build_online_key_registration(p, self.header(&p.common_params))?,
            ),
            ComposerTransaction::OfflineKeyRegistration(p) => (
                &p.common_params,
                build_offline_key_registration(p, self.header(&p.common_params))?,
            ),
            ComposerTransaction::NonParticipationKeyRegistration(p) => (
                &p.common_params,
                build_non_participation_key_registration(p, self.header(&p.common_params))?,
            ),
        };

        Ok(vec![self.finish(
            common_params,
            transaction,
            default_signer,
            None,
        )?])
    }
}

/// The result of building a group: signer-attached transactions plus the ABI method behind
/// each method call, keyed by transaction id.
#[derive(Debug, Clone)]
pub struct BuiltGroup {
    pub transactions: Vec<TransactionWithSigner>,
    pub method_calls: HashMap<String, ABIMethod>,
}

#[derive(Debug, Clone, Default)]
pub struct SendParams {
    /// Defaults to the number of rounds until the last transaction of the group expires.
    pub max_rounds_to_wait: Option<u64>,
}

#[derive(Debug)]
pub struct ComposerResults {
    /// Base64 group id. `None` for a single transaction.
    pub group_id: Option<String>,
    pub tx_ids: Vec<String>,
    pub confirmations: Vec<PendingTransactionResponse>,
    /// One entry per method call, in group order.
    pub abi_returns: Vec<Result<ABIReturn, ComposerError>>,
}

#[derive(Debug)]
pub struct Composer {
    transactions: Vec<ComposerTransaction>,
    #[debug(skip)]
    algod: Arc<dyn AlgodApi>,
    #[debug(skip)]
    signer_getter: Arc<dyn TransactionSignerGetter>,
    config: ComposerConfig,
    built_group: Option<Vec<TransactionWithSigner>>,
    method_calls: HashMap<String, ABIMethod>,
    signed_group: Option<Vec<SignedTransaction>>,
}

impl Composer {
    pub fn new(algod: Arc<dyn AlgodApi>, signer_getter: Arc<dyn TransactionSignerGetter>) -> Self {
        Composer {
            transactions: Vec::new(),
            algod,
            signer_getter,
            config: ComposerConfig::default(),
            built_group: None,
            method_calls: HashMap::new(),
            signed_group: None,
        }
    }

    #[cfg(feature = "default_http_client")]
    pub fn testnet() -> Self {
        use super::common::EmptySigner;
        use crate::clients::ParamsCache;
        use algod_client::AlgodClient;

        Self::new(
            Arc::new(ParamsCache::new(AlgodClient::testnet())),
            Arc::new(EmptySigner),
        )
    }

    pub fn with_config(mut self, config: ComposerConfig) -> Self {
        self.config = config;
        self
    }

    fn push(&mut self, txn: ComposerTransaction) -> Result<&mut Self, ComposerError> {
        if self.built_group.is_some() {
            return Err(ComposerError::StateError {
                message: "Cannot add transactions after the group has been built".to_string(),
            });
        }
        self.transactions.push(txn);
        Ok(self)
    }

    pub fn add_transaction(
        &mut self,
        transaction: Transaction,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::Transaction(transaction))
    }

    pub fn add_transaction_with_signer(
        &mut self,
        txn_with_signer: TransactionWithSigner,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::TransactionWithSigner(txn_with_signer))
    }

    pub fn add_group(
        &mut self,
        group: Vec<TransactionWithSigner>,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::Group(group))
    }

    pub fn add_payment(&mut self, params: PaymentParams) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::Payment(params))
    }

    pub fn add_account_close(
        &mut self,
        params: AccountCloseParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AccountClose(params))
    }

    pub fn add_asset_transfer(
        &mut self,
        params: AssetTransferParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AssetTransfer(params))
    }

    pub fn add_asset_opt_in(
        &mut self,
        params: AssetOptInParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AssetOptIn(params))
    }

    pub fn add_asset_opt_out(
        &mut self,
        params: AssetOptOutParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AssetOptOut(params))
    }

    pub fn add_asset_clawback(
        &mut self,
        params: AssetClawbackParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AssetClawback(params))
    }

    pub fn add_asset_create(
        &mut self,
        params: AssetCreateParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AssetCreate(params))
    }

    pub fn add_asset_config(
        &mut self,
        params: AssetConfigParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AssetConfig(params))
    }

    pub fn add_asset_destroy(
        &mut self,
        params: AssetDestroyParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AssetDestroy(params))
    }

    pub fn add_asset_freeze(
        &mut self,
        params: AssetFreezeParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AssetFreeze(params))
    }

    pub fn add_asset_unfreeze(
        &mut self,
        params: AssetFreezeParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AssetUnfreeze(params))
    }

    pub fn add_online_key_registration(
        &mut self,
        params: OnlineKeyRegistrationParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::OnlineKeyRegistration(params))
    }

    pub fn add_offline_key_registration(
        &mut self,
        params: OfflineKeyRegistrationParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::OfflineKeyRegistration(params))
    }

    pub fn add_non_participation_key_registration(
        &mut self,
        params: NonParticipationKeyRegistrationParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::NonParticipationKeyRegistration(params))
    }

    pub fn add_app_call(&mut self, params: AppCallParams) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AppCall(params))
    }

    pub fn add_app_create(&mut self, params: AppCreateParams) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AppCall(params.into()))
    }

    pub fn add_app_update(&mut self, params: AppUpdateParams) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AppCall(params.into()))
    }

    pub fn add_app_delete(&mut self, params: AppDeleteParams) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AppCall(params.into()))
    }

    pub fn add_app_method_call(
        &mut self,
        params: AppMethodCallParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AppMethodCall(params))
    }

    pub fn add_app_create_method_call(
        &mut self,
        params: AppMethodCallParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AppMethodCall(AppMethodCallParams {
            app_id: 0,
            ..params
        }))
    }

    pub fn add_app_update_method_call(
        &mut self,
        params: AppMethodCallParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AppMethodCall(AppMethodCallParams {
            on_complete: OnApplicationComplete::UpdateApplication,
            ..params
        }))
    }

    pub fn add_app_delete_method_call(
        &mut self,
        params: AppMethodCallParams,
    ) -> Result<&mut Self, ComposerError> {
        self.push(ComposerTransaction::AppMethodCall(AppMethodCallParams {
            on_complete: OnApplicationComplete::DeleteApplication,
            ..params
        }))
    }

    /// Number of transactions the group will contain once built.
    pub fn count(&self) -> usize {
        self.transactions
            .iter()
            .map(ComposerTransaction::transaction_count)
            .sum()
    }

    /// ABI methods of the built group's method calls, keyed by transaction id.
    pub fn method_calls(&self) -> &HashMap<String, ABIMethod> {
        &self.method_calls
    }

    /// Builds the group from the current intents without caching it. Network parameters
    /// are fetched once and shared by every transaction, so building again later may
    /// produce different fees and rounds.
    pub async fn build_group(&self) -> Result<BuiltGroup, ComposerError> {
        if self.transactions.is_empty() {
            return Err(ComposerError::StateError {
                message: "Cannot build an empty transaction group".to_string(),
            });
        }
        for intent in &self.transactions {
            intent.validate()?;
        }

        let suggested_params = self.algod.suggested_params().await?;
        let ctx = BuildContext {
            suggested_params: &suggested_params,
            default_validity_window: self
                .config
                .validity_window_for(&suggested_params.genesis_id),
            signer_getter: self.signer_getter.as_ref(),
        };
        debug!(
            "Building {} intents at round {}",
            self.transactions.len(),
            suggested_params.first_valid
        );

        let mut built = Vec::new();
        for intent in &self.transactions {
            built.extend(ctx.build_intent(intent, None)?);
        }

        let transactions: Vec<Transaction> =
            built.iter().map(|b| b.transaction.clone()).collect();
        let transactions = if transactions.len() > 1 {
            transactions.assign_group()?
        } else {
            transactions
        };

        let mut method_calls = HashMap::new();
        let mut group = Vec::with_capacity(built.len());
        for (built, transaction) in built.into_iter().zip(transactions) {
            if let Some(method) = built.method {
                method_calls.insert(transaction.id()?, method);
            }
            group.push(TransactionWithSigner {
                transaction,
                signer: built.signer,
            });
        }
        debug!("Built group of {} transactions", group.len());

        Ok(BuiltGroup {
            transactions: group,
            method_calls,
        })
    }

    /// Builds the group once. Later calls return the same group and no more intents can
    /// be added.
    pub async fn build(&mut self) -> Result<&[TransactionWithSigner], ComposerError> {
        if self.built_group.is_none() {
            let built = self.build_group().await?;
            self.method_calls = built.method_calls;
            self.built_group = Some(built.transactions);
        }
        self.built_group
            .as_deref()
            .ok_or_else(|| ComposerError::StateError {
                message: "Transaction group was not built".to_string(),
            })
    }

    /// Signs the built group, invoking each distinct signer once.
    pub async fn sign(&mut self) -> Result<&[SignedTransaction], ComposerError> {
        self.build().await?;
        if self.signed_group.is_none() {
            let signed = self.gather_signatures().await?;
            self.signed_group = Some(signed);
        }
        self.signed_group
            .as_deref()
            .ok_or_else(|| ComposerError::StateError {
                message: "Transaction group was not signed".to_string(),
            })
    }

    async fn gather_signatures(&self) -> Result<Vec<SignedTransaction>, ComposerError> {
        let transactions_with_signers =
            self.built_group.as_ref().ok_or(ComposerError::StateError {
                message: "Cannot gather signatures before building the transaction group"
                    .to_string(),
            })?;

        let mut transactions = Vec::new();
        let mut signer_groups: HashMap<*const dyn TransactionSigner, Vec<usize>> = HashMap::new();
        for (group_index, txn_with_signer) in transactions_with_signers.iter().enumerate() {
            signer_groups
                .entry(Arc::as_ptr(&txn_with_signer.signer))
                .or_default()
                .push(group_index);
            transactions.push(txn_with_signer.transaction.clone());
        }

        let mut signed_transactions: Vec<Option<SignedTransaction>> =
            vec![None; transactions_with_signers.len()];

        for indices in signer_groups.into_values() {
            let signer = &transactions_with_signers[indices[0]].signer;
            let signed = signer
                .sign_transactions(&transactions, &indices)
                .await
                .map_err(|message| ComposerError::SigningError { message })?;
            if signed.len() != indices.len() {
                return Err(ComposerError::SigningError {
                    message: format!(
                        "Signer returned {} transactions for {} requested",
                        signed.len(),
                        indices.len()
                    ),
                });
            }
            for (stx, index) in signed.into_iter().zip(indices) {
                signed_transactions[index] = Some(stx);
            }
        }

        let unsigned_indexes: Vec<usize> = signed_transactions
            .iter()
            .enumerate()
            .filter_map(|(i, stx)| stx.is_none().then_some(i))
            .collect();
        if !unsigned_indexes.is_empty() {
            return Err(ComposerError::SigningError {
                message: format!(
                    "Transactions at indexes {:?} were not signed",
                    unsigned_indexes
                ),
            });
        }

        Ok(signed_transactions.into_iter().flatten().collect())
    }

    /// Builds, signs and submits the group, then waits for every transaction to confirm.
    pub async fn send(
        &mut self,
        params: Option<SendParams>,
    ) -> Result<ComposerResults, ComposerError> {
        self.sign().await?;
        let signed_transactions =
            self.signed_group
                .as_deref()
                .ok_or_else(|| ComposerError::StateError {
                    message: "No signed transactions to send".to_string(),
                })?;

        let wait_rounds = match params.and_then(|p| p.max_rounds_to_wait) {
            Some(rounds) => rounds,
            None => {
                let current_round = self.algod.suggested_params().await?.first_valid;
                let last_valid = signed_transactions
                    .iter()
                    .map(|stx| stx.transaction.header().last_valid)
                    .max()
                    .ok_or_else(|| ComposerError::StateError {
                        message: "No transactions to send".to_string(),
                    })?;
                last_valid.saturating_sub(current_round)
            }
        };

        let group_id = signed_transactions
            .first()
            .and_then(|stx| stx.transaction.header().group)
            .map(|group| BASE64_STANDARD.encode(group));
        let tx_ids = signed_transactions
            .iter()
            .map(|stx| stx.id())
            .collect::<Result<Vec<String>, _>>()?;

        info!(
            "Sending group of {} transactions, waiting up to {} rounds",
            tx_ids.len(),
            wait_rounds
        );
        if Config::trace_all() {
            debug!("Submitting group:\n{}", describe_group(signed_transactions));
        }
        if let Err(e) = self.algod.submit_group(signed_transactions).await {
            log_failed_group(signed_transactions, &e);
            return Err(e.into());
        }
        Config::events()
            .emit(
                EventType::TxnGroupSubmitted,
                EventData::TxnGroupSubmitted(TxnGroupSubmittedEventData {
                    group_id: group_id.clone(),
                    transaction_ids: tx_ids.clone(),
                }),
            )
            .await;

        let mut confirmations = Vec::with_capacity(tx_ids.len());
        for tx_id in &tx_ids {
            let confirmation = match self.algod.wait_for_confirmation(tx_id, wait_rounds).await {
                Ok(confirmation) => confirmation,
                Err(e) => {
                    log_failed_group(signed_transactions, &e);
                    return Err(e.into());
                }
            };
            debug!(
                "Transaction {} confirmed in round {:?}",
                tx_id, confirmation.confirmed_round
            );
            confirmations.push(confirmation);
        }

        let abi_returns = tx_ids
            .iter()
            .zip(&confirmations)
            .filter_map(|(tx_id, confirmation)| {
                let method = self.method_calls.get(tx_id)?;
                let log = confirmation
                    .logs
                    .as_ref()
                    .and_then(|logs| logs.last())
                    .map(Vec::as_slice);
                Some(ABIReturn::from_log(method, log).map_err(ComposerError::from))
            })
            .collect();

        Ok(ComposerResults {
            group_id,
            tx_ids,
            confirmations,
            abi_returns,
        })
    }
}

/// One line per transaction: position, id, type, sender, validity range and fee.
fn describe_group(transactions: &[SignedTransaction]) -> String {
    transactions
        .iter()
        .enumerate()
        .map(|(index, stx)| {
            let header = stx.transaction.header();
            let id = stx.id().unwrap_or_else(|_| "<unknown>".to_string());
            format!(
                "[{}] {} {} from {} rounds {}..{} fee {}",
                index,
                id,
                stx.transaction.type_name(),
                header.sender,
                header.first_valid,
                header.last_valid,
                header.fee.unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn log_failed_group(transactions: &[SignedTransaction], error: &AlgodApiError) {
    if Config::debug() {
        debug!(
            "Group of {} transactions failed: {}\n{}",
            transactions.len(),
            error,
            describe_group(transactions)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::common::EmptySigner;
    use algokit_transact::test_utils::{AccountMother, TransactionMother};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves fixed params and counts how often they were requested.
    #[derive(Default)]
    struct FixedParamsAlgod {
        param_requests: AtomicUsize,
    }

    #[async_trait]
    impl AlgodApi for FixedParamsAlgod {
        async fn suggested_params(&self) -> Result<SuggestedParams, AlgodApiError> {
            self.param_requests.fetch_add(1, Ordering::SeqCst);
            Ok(SuggestedParams {
                fee_per_byte: 0,
                min_fee: 1000,
                first_valid: 1000,
                genesis_id: "testnet-v1.0".to_string(),
                genesis_hash: [9; 32],
                consensus_version: "v40".to_string(),
            })
        }

        async fn submit_group(
            &self,
            signed_transactions: &[SignedTransaction],
        ) -> Result<String, AlgodApiError> {
            Err(AlgodApiError::PoolError {
                tx_id: signed_transactions[0].id().unwrap(),
                message: "overspend".to_string(),
            })
        }

        async fn wait_for_confirmation(
            &self,
            _tx_id: &str,
            _max_rounds: u64,
        ) -> Result<PendingTransactionResponse, AlgodApiError> {
            unimplemented!()
        }

        async fn application_info(
            &self,
            _app_id: u64,
        ) -> Result<Option<algod_client::models::Application>, AlgodApiError> {
            unimplemented!()
        }
    }

    fn composer() -> (Composer, Arc<FixedParamsAlgod>) {
        let algod = Arc::new(FixedParamsAlgod::default());
        (Composer::new(algod.clone(), Arc::new(EmptySigner)), algod)
    }

    fn payment() -> PaymentParams {
        PaymentParams {
            common_params: CommonParams::new(AccountMother::account()),
            receiver: AccountMother::neil(),
            amount: 100,
        }
    }

    #[tokio::test]
    async fn adding_after_build_is_a_state_error() {
        let (mut composer, _) = composer();
        composer.add_payment(payment()).unwrap();
        composer.build().await.unwrap();

        let err = composer.add_payment(payment()).unwrap_err();
        assert!(matches!(err, ComposerError::StateError { .. }));
    }

    #[tokio::test]
    async fn build_is_cached() {
        let (mut composer, algod) = composer();
        composer.add_payment(payment()).unwrap();

        composer.build().await.unwrap();
        composer.build().await.unwrap();

        assert_eq!(algod.param_requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn params_are_fetched_once_per_build() {
        let (mut composer, algod) = composer();
        composer
            .add_payment(payment())
            .unwrap()
            .add_payment(payment())
            .unwrap()
            .add_asset_opt_in(AssetOptInParams {
                common_params: CommonParams::new(AccountMother::account()),
                asset_id: 5,
            })
            .unwrap();

        let group = composer.build_group().await.unwrap();

        assert_eq!(group.transactions.len(), 3);
        assert_eq!(algod.param_requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_group_error_is_returned_with_debug_enabled() {
        Config::configure(Some(true), Some(true));
        let (mut composer, _) = composer();
        composer.add_payment(payment()).unwrap();

        let err = composer.send(None).await.unwrap_err();
        Config::configure(Some(false), Some(false));

        assert!(matches!(
            err,
            ComposerError::AlgodClientError {
                source: AlgodApiError::PoolError { ref message, .. }
            } if message == "overspend"
        ));
    }

    #[tokio::test]
    async fn group_description_lists_each_transaction() {
        let (mut composer, _) = composer();
        composer
            .add_payment(payment())
            .unwrap()
            .add_asset_opt_in(AssetOptInParams {
                common_params: CommonParams::new(AccountMother::account()),
                asset_id: 5,
            })
            .unwrap();
        let signed = composer.sign().await.unwrap();

        let description = describe_group(signed);
        let lines: Vec<&str> = description.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(&format!("[0] {} pay from", signed[0].id().unwrap())));
        assert!(lines[1].starts_with(&format!("[1] {} axfer from", signed[1].id().unwrap())));
        assert!(lines[1].ends_with("rounds 1000..1010 fee 1000"));
    }

    #[tokio::test]
    async fn empty_group_cannot_be_built() {
        let (composer, _) = composer();
        let err = composer.build_group().await.unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Composer State Error: Cannot build an empty transaction group");
    }

    #[tokio::test]
    async fn prebuilt_transactions_lose_their_group() {
        let (mut composer, _) = composer();
        let mut transaction = TransactionMother::simple_payment().build().unwrap();
        transaction.header_mut().group = Some([3; 32]);
        composer.add_transaction(transaction).unwrap();

        let group = composer.build().await.unwrap();

        assert_eq!(group[0].transaction.header().group, None);
    }

    #[tokio::test]
    async fn missing_signer_is_reported() {
        struct NoSigners;
        impl TransactionSignerGetter for NoSigners {
            fn get_signer(
                &self,
                _address: &algokit_transact::Address,
            ) -> Option<Arc<dyn TransactionSigner>> {
                None
            }
        }

        let composer_algod = Arc::new(FixedParamsAlgod::default());
        let mut composer = Composer::new(composer_algod, Arc::new(NoSigners));
        composer.add_payment(payment()).unwrap();

        let err = composer.build_group().await.unwrap_err();
        assert!(err.to_string().contains("No signer found for address"));
    }

    #[test]
    fn count_includes_nested_transactions() {
        let (mut composer, _) = composer();
        let inner = AppMethodCallParams {
            app_id: 1,
            method: "pay(pay)void".parse().unwrap(),
            args: vec![ComposerTransaction::Payment(payment()).into()],
            ..Default::default()
        };
        let outer = AppMethodCallParams {
            app_id: 2,
            method: "call(appl,uint64)void".parse().unwrap(),
            args: vec![
                ComposerTransaction::AppMethodCall(inner).into(),
                AppMethodCallArg::ABIValue(7u64.into()),
            ],
            ..Default::default()
        };
        composer
            .add_payment(payment())
            .unwrap()
            .add_app_method_call(outer)
            .unwrap();

        assert_eq!(composer.count(), 4);
    }
}
