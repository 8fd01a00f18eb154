//! Asset freeze transactions freeze or unfreeze one account's holding of an asset.

use crate::Transaction;
use crate::address::Address;
use crate::traits::Validate;
use crate::transactions::common::{TransactionHeader, TransactionValidationError};
use crate::utils::{is_zero, is_zero_addr};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none};

/// Sent by the asset's freeze account.
#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Builder)]
#[builder(
    name = "AssetFreezeTransactionBuilder",
    setter(strip_option),
    build_fn(name = "build_fields")
)]
pub struct AssetFreezeTransactionFields {
    #[serde(flatten)]
    pub header: TransactionHeader,

    #[serde(rename = "faid")]
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    pub asset_id: u64,

    /// The account whose holding is affected.
    #[serde(rename = "fadd")]
    #[serde(skip_serializing_if = "is_zero_addr")]
    #[serde(default)]
    pub freeze_target: Address,

    #[serde(rename = "afrz")]
    #[serde(default)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[builder(default)]
    pub frozen: bool,
}

impl AssetFreezeTransactionBuilder {
    pub fn build(&self) -> Result<Transaction, AssetFreezeTransactionBuilderError> {
        let fields = self.build_fields()?;
        fields.validate().map_err(|errors| {
            AssetFreezeTransactionBuilderError::ValidationError(format!(
                "Asset freeze validation failed: {}",
                errors.join("\n")
            ))
        })?;
        Ok(Transaction::AssetFreeze(fields))
    }
}

impl Validate for AssetFreezeTransactionFields {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AlgorandMsgpack;
    use crate::test_utils::{AccountMother, TransactionHeaderMother};

    #[test]
    fn test_unfreeze_omits_flag() {
        let freeze = AssetFreezeTransactionBuilder::default()
            .header(TransactionHeaderMother::example().build().unwrap())
            .asset_id(77)
            .freeze_target(AccountMother::neil())
            .frozen(true)
            .build()
            .unwrap();
        let unfreeze = AssetFreezeTransactionBuilder::default()
            .header(TransactionHeaderMother::example().build().unwrap())
            .asset_id(77)
            .freeze_target(AccountMother::neil())
            .build()
            .unwrap();

        // "afrz" key (5 bytes) plus the boolean
        assert_eq!(
            freeze.encode_raw().unwrap().len(),
            unfreeze.encode_raw().unwrap().len() + 6
        );
        assert_eq!(Transaction::decode(&unfreeze.encode().unwrap()).unwrap(), unfreeze);
    }

    #[test]
    fn test_zero_asset_id_is_rejected() {
        let result = AssetFreezeTransactionBuilder::default()
            .header(TransactionHeaderMother::example().build().unwrap())
            .freeze_target(AccountMother::neil())
            .build();
        assert!(result.is_err());
    }
}
