//! Key registration transactions bring an account online for consensus participation, take
//! it offline, or mark it as permanently non-participating.

use crate::Transaction;
use crate::traits::Validate;
use crate::transactions::common::{TransactionHeader, TransactionValidationError};
use crate::utils::{is_false_opt, is_zero_opt};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_with::{Bytes, serde_as, skip_serializing_none};

#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Builder)]
#[builder(
    name = "KeyRegistrationTransactionBuilder",
    setter(strip_option),
    build_fn(name = "build_fields")
)]
pub struct KeyRegistrationTransactionFields {
    #[serde(flatten)]
    pub header: TransactionHeader,

    /// Root participation public key.
    #[serde(rename = "votekey")]
    #[serde_as(as = "Option<Bytes>")]
    #[serde(default)]
    #[builder(default)]
    pub vote_key: Option<[u8; 32]>,

    /// VRF public key.
    #[serde(rename = "selkey")]
    #[serde_as(as = "Option<Bytes>")]
    #[serde(default)]
    #[builder(default)]
    pub selection_key: Option<[u8; 32]>,

    #[serde(rename = "sprfkey")]
    #[serde_as(as = "Option<Bytes>")]
    #[serde(default)]
    #[builder(default)]
    pub state_proof_key: Option<[u8; 64]>,

    #[serde(rename = "votefst")]
    #[serde(skip_serializing_if = "is_zero_opt")]
    #[serde(default)]
    #[builder(default)]
    pub vote_first: Option<u64>,

    #[serde(rename = "votelst")]
    #[serde(skip_serializing_if = "is_zero_opt")]
    #[serde(default)]
    #[builder(default)]
    pub vote_last: Option<u64>,

    #[serde(rename = "votekd")]
    #[serde(skip_serializing_if = "is_zero_opt")]
    #[serde(default)]
    #[builder(default)]
    pub vote_key_dilution: Option<u64>,

    /// Permanently opts the account out of rewards and participation.
    #[serde(rename = "nonpart")]
    #[serde(skip_serializing_if = "is_false_opt")]
    #[serde(default)]
    #[builder(default)]
    pub non_participation: Option<bool>,
}

impl KeyRegistrationTransactionFields {
    pub fn is_online(&self) -> bool {
        self.vote_key.is_some()
            || self.selection_key.is_some()
            || self.state_proof_key.is_some()
            || self.vote_first.is_some()
            || self.vote_last.is_some()
            || self.vote_key_dilution.is_some()
    }

    /// Online registrations must carry every participation field. The state proof key is
    /// optional.
    pub fn validate_for_online(&self) -> Result<(), Vec<TransactionValidationError>> {
        let mut errors = Vec::new();
        let mut require = |present: bool, field: &str| {
            if !present {
                errors.push(TransactionValidationError::RequiredField {
                    field: field.to_string(),
                });
            }
        };

        require(self.vote_key.is_some(), "Vote key");
        require(self.selection_key.is_some(), "Selection key");
        require(self.vote_first.is_some(), "Vote first");
        require(self.vote_last.is_some(), "Vote last");
        require(self.vote_key_dilution.is_some(), "Vote key dilution");

        if let (Some(first), Some(last)) = (self.vote_first, self.vote_last) {
            if first >= last {
                errors.push(TransactionValidationError::ArbitraryConstraint {
                    message: "Vote first must be less than vote last".to_string(),
                });
            }
        }

        if self.non_participation.is_some_and(|v| v) {
            errors.push(TransactionValidationError::ArbitraryConstraint {
                message: "Online key registration cannot have non participation flag set"
                    .to_string(),
            });
        }

        match errors.is_empty() {
            true => Ok(()),
            false => Err(errors),
        }
    }
}

impl KeyRegistrationTransactionBuilder {
    pub fn build(&self) -> Result<Transaction, KeyRegistrationTransactionBuilderError> {
        let fields = self.build_fields()?;
        fields.validate().map_err(|errors| {
            KeyRegistrationTransactionBuilderError::ValidationError(format!(
                "Key registration validation failed: {}",
                errors.join("\n")
            ))
        })?;
        Ok(Transaction::KeyRegistration(fields))
    }
}

impl Validate for KeyRegistrationTransactionFields {
    fn validate(&self) -> Result<(), Vec<String>> {
        match self.is_online() {
            true => self
                .validate_for_online()
                .map_err(|errors| errors.iter().map(|e| e.to_string()).collect()),
            false => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TransactionHeaderMother;

    fn online() -> KeyRegistrationTransactionBuilder {
        KeyRegistrationTransactionBuilder::default()
            .header(TransactionHeaderMother::example().build().unwrap())
            .vote_key([1u8; 32])
            .selection_key([2u8; 32])
            .vote_first(100)
            .vote_last(200)
            .vote_key_dilution(10)
            .to_owned()
    }

    #[test]
    fn test_online_without_state_proof_key_is_valid() {
        assert!(online().build().is_ok());
    }

    #[test]
    fn test_offline_is_valid() {
        let result = KeyRegistrationTransactionBuilder::default()
            .header(TransactionHeaderMother::example().build().unwrap())
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_online_missing_fields_are_reported() {
        let fields = KeyRegistrationTransactionFields {
            vote_key: None,
            vote_key_dilution: None,
            ..online().build_fields().unwrap()
        };

        let errors = fields.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Vote key is required".to_string(),
                "Vote key dilution is required".to_string()
            ]
        );
    }

    #[test]
    fn test_vote_round_range() {
        let errors = online()
            .vote_first(300)
            .build_fields()
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(errors.iter().any(|e| e == "Vote first must be less than vote last"));
    }

    #[test]
    fn test_online_with_non_participation_flag() {
        let result = online().non_participation(true).build();
        assert!(result.unwrap_err().to_string().contains(
            "Online key registration cannot have non participation flag set"
        ));
    }
}
