//! Asset transfer transactions move units of an Algorand Standard Asset.
//!
//! The same wire type covers opt-in (a zero amount transfer to self), opt-out (close-to the
//! creator) and clawback (an `asset_sender` other than the sender).

use crate::traits::Validate;
use crate::transactions::common::{TransactionHeader, TransactionValidationError};
use crate::utils::{is_zero, is_zero_addr, is_zero_addr_opt};
use crate::{Address, Transaction};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none};

#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Builder)]
#[builder(
    name = "AssetTransferTransactionBuilder",
    setter(strip_option),
    build_fn(name = "build_fields")
)]
pub struct AssetTransferTransactionFields {
    #[serde(flatten)]
    pub header: TransactionHeader,

    #[serde(rename = "xaid")]
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    pub asset_id: u64,

    /// Amount in base units. Decimals are not applied here.
    #[serde(rename = "aamt")]
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    pub amount: u64,

    #[serde(rename = "arcv")]
    #[serde(skip_serializing_if = "is_zero_addr")]
    #[serde(default)]
    pub receiver: Address,

    /// The account the units are clawed back from. Only the clawback account may set it.
    #[serde(rename = "asnd")]
    #[serde(skip_serializing_if = "is_zero_addr_opt")]
    #[serde(default)]
    #[builder(default)]
    pub asset_sender: Option<Address>,

    /// Closes the sender's holding, sending any remaining units here.
    #[serde(rename = "aclose")]
    #[serde(skip_serializing_if = "is_zero_addr_opt")]
    #[serde(default)]
    #[builder(default)]
    pub close_remainder_to: Option<Address>,
}

impl AssetTransferTransactionBuilder {
    pub fn build(&self) -> Result<Transaction, AssetTransferTransactionBuilderError> {
        let fields = self.build_fields()?;
        fields.validate().map_err(|errors| {
            AssetTransferTransactionBuilderError::ValidationError(format!(
                "Asset transfer validation failed: {}",
                errors.join("\n")
            ))
        })?;
        Ok(Transaction::AssetTransfer(fields))
    }
}

impl Validate for AssetTransferTransactionFields {
    fn validate(&self) -> Result<(), Vec<String>> {
        if self.asset_id == 0 {
            return Err(vec![
                TransactionValidationError::ZeroValueField {
                    field: "Asset ID".to_string(),
                }
                .to_string(),
            ]);
        }
        Ok(())
    }
}
