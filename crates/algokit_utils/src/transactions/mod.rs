pub mod app_call;
pub mod asset_config;
pub mod asset_freeze;
pub mod asset_transfer;
pub mod common;
pub mod composer;
pub mod key_registration;
mod method_call;
pub mod payment;
pub mod signers;

// Re-export commonly used transaction types
pub use app_call::{
    AppCallParams, AppCreateParams, AppDeleteParams, AppMethodCallArg, AppMethodCallParams,
    AppUpdateParams, calculate_extra_program_pages,
};
pub use asset_config::{AssetConfigParams, AssetCreateParams, AssetDestroyParams};
pub use asset_freeze::AssetFreezeParams;
pub use asset_transfer::{
    AssetClawbackParams, AssetOptInParams, AssetOptOutParams, AssetTransferParams,
};
pub use common::{
    CommonParams, EmptySigner, TransactionSigner, TransactionSignerGetter, TransactionWithSigner,
};
pub use composer::{
    BuiltGroup, Composer, ComposerError, ComposerResults, ComposerTransaction, SendParams,
};
pub use key_registration::{
    NonParticipationKeyRegistrationParams, OfflineKeyRegistrationParams,
    OnlineKeyRegistrationParams,
};
pub use payment::{AccountCloseParams, PaymentParams};
pub use signers::{KeyPairSigner, SignerMap};
