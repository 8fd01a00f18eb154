//! Transaction types, fee assignment, signing envelope and group assignment.

mod application_call;
mod asset_config;
mod asset_freeze;
mod asset_transfer;
mod common;
mod key_registration;
mod payment;

use application_call::{application_call_deserializer, application_call_serializer};
pub use application_call::{
    ApplicationCallTransactionBuilder, ApplicationCallTransactionBuilderError,
    ApplicationCallTransactionFields, BoxReference, OnApplicationComplete, StateSchema,
};
pub use asset_config::{
    AssetConfigTransactionBuilder, AssetConfigTransactionBuilderError,
    AssetConfigTransactionFields, AssetParams, AssetParamsBuilder,
};
pub use asset_freeze::{
    AssetFreezeTransactionBuilder, AssetFreezeTransactionBuilderError,
    AssetFreezeTransactionFields,
};
pub use asset_transfer::{
    AssetTransferTransactionBuilder, AssetTransferTransactionBuilderError,
    AssetTransferTransactionFields,
};
pub use common::{
    TransactionHeader, TransactionHeaderBuilder, TransactionHeaderBuilderError,
    TransactionValidationError,
};
pub use key_registration::{
    KeyRegistrationTransactionBuilder, KeyRegistrationTransactionBuilderError,
    KeyRegistrationTransactionFields,
};
pub use payment::{
    PaymentTransactionBuilder, PaymentTransactionBuilderError, PaymentTransactionFields,
};

use crate::Address;
use crate::constants::{ALGORAND_SIGNATURE_BYTE_LENGTH, ALGORAND_SIGNATURE_ENCODING_INCR};
use crate::error::AlgoKitTransactError;
use crate::traits::{AlgorandMsgpack, EstimateTransactionSize, TransactionId, Transactions};
use crate::utils::{compute_group_id, is_zero_addr_opt};
use serde::{Deserialize, Serialize};
use serde_with::{Bytes, serde_as, skip_serializing_none};

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(tag = "type")]
pub enum Transaction {
    #[serde(rename = "pay")]
    Payment(PaymentTransactionFields),

    #[serde(rename = "axfer")]
    AssetTransfer(AssetTransferTransactionFields),

    #[serde(rename = "acfg")]
    AssetConfig(AssetConfigTransactionFields),

    #[serde(rename = "afrz")]
    AssetFreeze(AssetFreezeTransactionFields),

    #[serde(rename = "keyreg")]
    KeyRegistration(KeyRegistrationTransactionFields),

    #[serde(serialize_with = "application_call_serializer")]
    #[serde(deserialize_with = "application_call_deserializer")]
    #[serde(rename = "appl")]
    ApplicationCall(ApplicationCallTransactionFields),
}

/// Inputs for computing a transaction fee from the network's suggested parameters.
#[derive(Debug, Clone, Default)]
pub struct FeeParams {
    pub fee_per_byte: u64,
    pub min_fee: u64,
    pub extra_fee: Option<u64>,
    pub max_fee: Option<u64>,
}

impl Transaction {
    pub fn header(&self) -> &TransactionHeader {
        match self {
            Transaction::Payment(p) => &p.header,
            Transaction::AssetTransfer(a) => &a.header,
            Transaction::AssetConfig(a) => &a.header,
            Transaction::AssetFreeze(a) => &a.header,
            Transaction::KeyRegistration(k) => &k.header,
            Transaction::ApplicationCall(a) => &a.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut TransactionHeader {
        match self {
            Transaction::Payment(p) => &mut p.header,
            Transaction::AssetTransfer(a) => &mut a.header,
            Transaction::AssetConfig(a) => &mut a.header,
            Transaction::AssetFreeze(a) => &mut a.header,
            Transaction::KeyRegistration(k) => &mut k.header,
            Transaction::ApplicationCall(a) => &mut a.header,
        }
    }

    /// Wire name of the transaction type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Transaction::Payment(_) => "pay",
            Transaction::AssetTransfer(_) => "axfer",
            Transaction::AssetConfig(_) => "acfg",
            Transaction::AssetFreeze(_) => "afrz",
            Transaction::KeyRegistration(_) => "keyreg",
            Transaction::ApplicationCall(_) => "appl",
        }
    }

    /// Returns a copy of the transaction with its fee computed as
    /// `max(size * fee_per_byte, min_fee) + extra_fee`, checked against `max_fee`.
    pub fn assign_fee(&self, request: FeeParams) -> Result<Transaction, AlgoKitTransactError> {
        let mut tx = self.clone();
        let mut calculated_fee: u64 = 0;

        if request.fee_per_byte > 0 {
            let estimated_size = tx.estimate_size()?;
            calculated_fee = request.fee_per_byte.saturating_mul(estimated_size as u64);
        }

        if calculated_fee < request.min_fee {
            calculated_fee = request.min_fee;
        }

        if let Some(extra_fee) = request.extra_fee {
            calculated_fee = calculated_fee.saturating_add(extra_fee);
        }

        if let Some(max_fee) = request.max_fee {
            if calculated_fee > max_fee {
                return Err(AlgoKitTransactError::FeeExceedsMax {
                    fee: calculated_fee,
                    max_fee,
                });
            }
        }

        tx.header_mut().fee = Some(calculated_fee);
        Ok(tx)
    }
}

impl AlgorandMsgpack for Transaction {
    const PREFIX: &'static [u8] = b"TX";
}

impl TransactionId for Transaction {}

impl EstimateTransactionSize for Transaction {
    fn estimate_size(&self) -> Result<usize, AlgoKitTransactError> {
        Ok(self.encode_raw()?.len() + ALGORAND_SIGNATURE_ENCODING_INCR)
    }
}

#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct SignedTransaction {
    #[serde(rename = "txn")]
    pub transaction: Transaction,

    /// Ed25519 signature over the prefixed transaction bytes.
    #[serde(rename = "sig")]
    #[serde_as(as = "Option<Bytes>")]
    #[serde(default)]
    pub signature: Option<[u8; ALGORAND_SIGNATURE_BYTE_LENGTH]>,

    /// Set when the sender has been rekeyed to another account.
    #[serde(rename = "sgnr")]
    #[serde(skip_serializing_if = "is_zero_addr_opt")]
    #[serde(default)]
    pub auth_address: Option<Address>,
}

impl AlgorandMsgpack for SignedTransaction {
    // Every transaction field has a serde default, so the variant must be decoded through
    // `Transaction::decode`, which checks the `type` key.
    fn decode(bytes: &[u8]) -> Result<Self, AlgoKitTransactError> {
        let value = rmpv::decode::read_value(&mut &bytes[..])?;

        let rmpv::Value::Map(map) = value else {
            return Err(AlgoKitTransactError::InputError {
                message: "Expected signed transaction to be a msgpack map".to_string(),
            });
        };

        let txn_value = map
            .iter()
            .find(|(k, _)| k.as_str() == Some("txn"))
            .map(|(_, v)| v)
            .ok_or_else(|| AlgoKitTransactError::InputError {
                message: "Signed transaction is missing the txn field".to_string(),
            })?;

        let mut txn_buf = Vec::new();
        rmpv::encode::write_value(&mut txn_buf, txn_value)?;

        Ok(SignedTransaction {
            transaction: Transaction::decode(&txn_buf)?,
            ..rmp_serde::from_slice(bytes)?
        })
    }
}

impl TransactionId for SignedTransaction {
    fn id_raw(&self) -> Result<[u8; 32], AlgoKitTransactError> {
        self.transaction.id_raw()
    }
}

impl EstimateTransactionSize for SignedTransaction {
    fn estimate_size(&self) -> Result<usize, AlgoKitTransactError> {
        Ok(self.encode()?.len())
    }
}

impl Transactions for &[Transaction] {
    fn assign_group(self) -> Result<Vec<Transaction>, AlgoKitTransactError> {
        let group_id = compute_group_id(self)?;
        Ok(self
            .iter()
            .map(|tx| {
                let mut tx = tx.clone();
                tx.header_mut().group = Some(group_id);
                tx
            })
            .collect())
    }
}

impl Transactions for Vec<Transaction> {
    fn assign_group(self) -> Result<Vec<Transaction>, AlgoKitTransactError> {
        self.as_slice().assign_group()
    }
}
