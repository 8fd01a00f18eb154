mod address;
pub mod constants;
mod error;
mod traits;
mod transactions;
mod utils;

pub use address::Address;
pub use constants::*;
pub use error::AlgoKitTransactError;
pub use traits::{AlgorandMsgpack, EstimateTransactionSize, TransactionId, Transactions, Validate};
pub use transactions::{
    ApplicationCallTransactionBuilder, ApplicationCallTransactionBuilderError,
    ApplicationCallTransactionFields, AssetConfigTransactionBuilder,
    AssetConfigTransactionBuilderError, AssetConfigTransactionFields,
    AssetFreezeTransactionBuilder, AssetFreezeTransactionBuilderError,
    AssetFreezeTransactionFields, AssetParams, AssetParamsBuilder,
    AssetTransferTransactionBuilder, AssetTransferTransactionBuilderError,
    AssetTransferTransactionFields, BoxReference, FeeParams, KeyRegistrationTransactionBuilder,
    KeyRegistrationTransactionBuilderError, KeyRegistrationTransactionFields,
    OnApplicationComplete, PaymentTransactionBuilder, PaymentTransactionBuilderError,
    PaymentTransactionFields, SignedTransaction, StateSchema, Transaction, TransactionHeader,
    TransactionHeaderBuilder, TransactionHeaderBuilderError, TransactionValidationError,
};
pub use utils::{compute_group_id, hash};

#[cfg(test)]
mod tests;

#[cfg(feature = "test_utils")]
pub mod test_utils;
