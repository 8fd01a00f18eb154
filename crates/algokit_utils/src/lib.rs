pub mod applications;
pub mod clients;
pub mod config;
pub mod transactions;

pub use applications::{
    AppDeployError, AppDeployMetadata, AppDeployParams, AppDeployResult, AppDeployer, AppLookup,
    AppMetadata, AppState, CreateParams, DeleteParams, DeployAction, OnSchemaBreak, OnUpdate,
    UpdateParams,
};
pub use clients::{
    AlgodApi, AlgodApiError, DEFAULT_PARAMS_FRESHNESS, ParamsCache, SuggestedParams,
    genesis_id_is_localnet,
};
pub use config::{ComposerConfig, Config, EventData, EventType};
pub use transactions::{
    AccountCloseParams, AppCallParams, AppCreateParams, AppDeleteParams, AppMethodCallArg,
    AppMethodCallParams, AppUpdateParams, AssetClawbackParams, AssetConfigParams,
    AssetCreateParams, AssetDestroyParams, AssetFreezeParams, AssetOptInParams,
    AssetOptOutParams, AssetTransferParams, BuiltGroup, CommonParams, Composer, ComposerError,
    ComposerResults, ComposerTransaction, EmptySigner, KeyPairSigner,
    NonParticipationKeyRegistrationParams, OfflineKeyRegistrationParams,
    OnlineKeyRegistrationParams, PaymentParams, SendParams, SignerMap, TransactionSigner,
    TransactionSignerGetter, TransactionWithSigner,
};
