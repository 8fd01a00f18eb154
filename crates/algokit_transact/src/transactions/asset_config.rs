//! Asset configuration transactions create, reconfigure or destroy Algorand Standard Assets.
//!
//! The three operations share a wire type and are told apart by the asset id and the
//! presence of asset parameters:
//! * creation: asset id 0, parameters present;
//! * reconfiguration: asset id set, only the four role addresses present;
//! * destroy: asset id set, no parameters.

use crate::traits::Validate;
use crate::transactions::common::{TransactionHeader, TransactionValidationError};
use crate::utils::{
    is_empty_bytes32_opt, is_empty_string_opt, is_false_opt, is_zero, is_zero_addr_opt,
    is_zero_opt,
};
use crate::{Address, Transaction};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_with::{Bytes, serde_as, skip_serializing_none};

const MAX_DECIMALS: u32 = 19;
const MAX_UNIT_NAME_BYTES: usize = 8;
const MAX_ASSET_NAME_BYTES: usize = 32;
const MAX_URL_BYTES: usize = 96;

/// Asset parameters as carried in the `apar` map.
#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default, Builder)]
#[builder(name = "AssetParamsBuilder", setter(strip_option), default)]
pub struct AssetParams {
    /// Total supply in base units. Required on creation.
    #[serde(rename = "t")]
    #[serde(skip_serializing_if = "is_zero_opt")]
    #[serde(default)]
    pub total: Option<u64>,

    #[serde(rename = "dc")]
    #[serde(skip_serializing_if = "is_zero_opt")]
    #[serde(default)]
    pub decimals: Option<u32>,

    #[serde(rename = "df")]
    #[serde(skip_serializing_if = "is_false_opt")]
    #[serde(default)]
    pub default_frozen: Option<bool>,

    #[serde(rename = "an")]
    #[serde(skip_serializing_if = "is_empty_string_opt")]
    #[serde(default)]
    pub asset_name: Option<String>,

    #[serde(rename = "un")]
    #[serde(skip_serializing_if = "is_empty_string_opt")]
    #[serde(default)]
    pub unit_name: Option<String>,

    #[serde(rename = "au")]
    #[serde(skip_serializing_if = "is_empty_string_opt")]
    #[serde(default)]
    pub url: Option<String>,

    #[serde(rename = "am")]
    #[serde_as(as = "Option<Bytes>")]
    #[serde(skip_serializing_if = "is_empty_bytes32_opt")]
    #[serde(default)]
    pub metadata_hash: Option<[u8; 32]>,

    /// May reconfigure the role addresses and destroy the asset. Unset makes it immutable.
    #[serde(rename = "m")]
    #[serde(skip_serializing_if = "is_zero_addr_opt")]
    #[serde(default)]
    pub manager: Option<Address>,

    #[serde(rename = "r")]
    #[serde(skip_serializing_if = "is_zero_addr_opt")]
    #[serde(default)]
    pub reserve: Option<Address>,

    #[serde(rename = "f")]
    #[serde(skip_serializing_if = "is_zero_addr_opt")]
    #[serde(default)]
    pub freeze: Option<Address>,

    #[serde(rename = "c")]
    #[serde(skip_serializing_if = "is_zero_addr_opt")]
    #[serde(default)]
    pub clawback: Option<Address>,
}

impl AssetParams {
    fn has_creation_only_fields(&self) -> bool {
        self.total.is_some()
            || self.decimals.is_some()
            || self.default_frozen.is_some()
            || self.asset_name.is_some()
            || self.unit_name.is_some()
            || self.url.is_some()
            || self.metadata_hash.is_some()
    }
}

#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Builder)]
#[builder(
    name = "AssetConfigTransactionBuilder",
    setter(strip_option),
    build_fn(name = "build_fields")
)]
pub struct AssetConfigTransactionFields {
    #[serde(flatten)]
    pub header: TransactionHeader,

    /// 0 when creating.
    #[serde(rename = "caid")]
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    #[builder(default)]
    pub asset_id: u64,

    #[serde(rename = "apar")]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    #[builder(default)]
    pub params: Option<AssetParams>,
}

impl AssetConfigTransactionBuilder {
    pub fn build(&self) -> Result<Transaction, AssetConfigTransactionBuilderError> {
        let fields = self.build_fields()?;
        fields.validate().map_err(|errors| {
            AssetConfigTransactionBuilderError::ValidationError(format!(
                "Asset config validation failed: {}",
                errors.join("\n")
            ))
        })?;
        Ok(Transaction::AssetConfig(fields))
    }
}

fn check_len(
    errors: &mut Vec<TransactionValidationError>,
    field: &str,
    value: &Option<String>,
    max: usize,
) {
    if let Some(value) = value {
        if value.len() > max {
            errors.push(TransactionValidationError::ArbitraryConstraint {
                message: format!(
                    "{} cannot exceed {} bytes, got {}",
                    field,
                    max,
                    value.len()
                ),
            });
        }
    }
}

impl Validate for AssetConfigTransactionFields {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match (self.asset_id, &self.params) {
            (0, None) => errors.push(TransactionValidationError::RequiredField {
                field: "Asset params".to_string(),
            }),
            (0, Some(params)) => {
                if params.total.is_none() {
                    errors.push(TransactionValidationError::RequiredField {
                        field: "Total".to_string(),
                    });
                }
                if params.decimals.is_some_and(|d| d > MAX_DECIMALS) {
                    errors.push(TransactionValidationError::ArbitraryConstraint {
                        message: format!("Decimals cannot exceed {}", MAX_DECIMALS),
                    });
                }
                check_len(&mut errors, "Unit name", &params.unit_name, MAX_UNIT_NAME_BYTES);
                check_len(&mut errors, "Asset name", &params.asset_name, MAX_ASSET_NAME_BYTES);
                check_len(&mut errors, "URL", &params.url, MAX_URL_BYTES);
            }
            (_, Some(params)) if params.has_creation_only_fields() => {
                errors.push(TransactionValidationError::ArbitraryConstraint {
                    message: "Only the manager, reserve, freeze and clawback addresses can be reconfigured"
                        .to_string(),
                });
            }
            _ => {}
        }

        match errors.is_empty() {
            true => Ok(()),
            false => Err(errors.into_iter().map(|e| e.to_string()).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AlgorandMsgpack;
    use crate::test_utils::{AccountMother, TransactionHeaderMother};

    fn creation_params() -> AssetParams {
        AssetParamsBuilder::default()
            .total(1_000_000)
            .decimals(2)
            .unit_name("TST".to_string())
            .asset_name("Test".to_string())
            .manager(AccountMother::account())
            .build()
            .unwrap()
    }

    #[test]
    fn test_asset_create_round_trip() {
        let tx = AssetConfigTransactionBuilder::default()
            .header(TransactionHeaderMother::example().build().unwrap())
            .params(creation_params())
            .build()
            .unwrap();

        assert_eq!(Transaction::decode(&tx.encode().unwrap()).unwrap(), tx);
    }

    #[test]
    fn test_asset_create_requires_total() {
        let result = AssetConfigTransactionBuilder::default()
            .header(TransactionHeaderMother::example().build().unwrap())
            .params(AssetParams {
                total: None,
                ..creation_params()
            })
            .build();

        assert!(result.unwrap_err().to_string().contains("Total is required"));
    }

    #[test]
    fn test_reconfigure_rejects_immutable_fields() {
        let result = AssetConfigTransactionBuilder::default()
            .header(TransactionHeaderMother::example().build().unwrap())
            .asset_id(1234)
            .params(creation_params())
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_destroy_has_no_params() {
        let tx = AssetConfigTransactionBuilder::default()
            .header(TransactionHeaderMother::example().build().unwrap())
            .asset_id(1234)
            .build()
            .unwrap();

        match tx {
            Transaction::AssetConfig(fields) => assert!(fields.params.is_none()),
            other => panic!("unexpected transaction {:?}", other),
        }
    }
}
