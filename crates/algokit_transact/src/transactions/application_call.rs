//! Application call transactions create, call, update and delete smart contracts.

use crate::address::Address;
use crate::traits::Validate;
use crate::transactions::common::{TransactionHeader, TransactionValidationError};
use crate::utils::{is_empty_vec_opt, is_zero, is_zero_opt};
use crate::{MAX_ACCOUNT_REFERENCES, MAX_APP_ARGS, MAX_EXTRA_PROGRAM_PAGES, Transaction};
use derive_builder::Builder;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_repr::{Deserialize_repr, Serialize_repr};
use serde_with::{Bytes, serde_as, skip_serializing_none};

/// What happens to the sender's relationship with the application once the call completes.
#[derive(Serialize_repr, Deserialize_repr, Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[repr(u8)]
pub enum OnApplicationComplete {
    #[default]
    NoOp = 0,

    /// Allocates local state for the sender.
    OptIn = 1,

    /// Deallocates the sender's local state.
    CloseOut = 2,

    /// Like `CloseOut` but cannot be rejected by the application.
    ClearState = 3,

    /// Replaces the approval and clear state programs.
    UpdateApplication = 4,

    DeleteApplication = 5,
}

/// Upper bounds on the state an application may hold. Fixed at creation.
#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct StateSchema {
    #[serde(rename = "nui")]
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    pub num_uints: u64,

    #[serde(rename = "nbs")]
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    pub num_byte_slices: u64,
}

/// A box made available to the program. An app id of 0 means the called application.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct BoxReference {
    #[serde(rename = "i")]
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    pub app_id: u64,

    #[serde(rename = "n")]
    #[serde_as(as = "Bytes")]
    pub name: Vec<u8>,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Builder)]
#[builder(
    name = "ApplicationCallTransactionBuilder",
    setter(strip_option),
    build_fn(name = "build_fields")
)]
pub struct ApplicationCallTransactionFields {
    #[serde(flatten)]
    pub header: TransactionHeader,

    /// 0 creates a new application.
    #[serde(rename = "apid")]
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    #[builder(default)]
    pub app_id: u64,

    #[serde(rename = "apan")]
    #[serde(skip_serializing_if = "is_default_on_complete")]
    #[serde(default)]
    #[builder(default)]
    pub on_complete: OnApplicationComplete,

    #[serde(rename = "apap")]
    #[serde_as(as = "Option<Bytes>")]
    #[serde(skip_serializing_if = "is_empty_vec_opt")]
    #[serde(default)]
    #[builder(default)]
    pub approval_program: Option<Vec<u8>>,

    #[serde(rename = "apsu")]
    #[serde_as(as = "Option<Bytes>")]
    #[serde(skip_serializing_if = "is_empty_vec_opt")]
    #[serde(default)]
    #[builder(default)]
    pub clear_state_program: Option<Vec<u8>>,

    #[serde(rename = "apgs")]
    #[serde(default)]
    #[builder(default)]
    pub global_state_schema: Option<StateSchema>,

    #[serde(rename = "apls")]
    #[serde(default)]
    #[builder(default)]
    pub local_state_schema: Option<StateSchema>,

    /// Each extra page adds 2048 bytes to the combined program size limit.
    #[serde(rename = "apep")]
    #[serde(skip_serializing_if = "is_zero_opt")]
    #[serde(default)]
    #[builder(default)]
    pub extra_program_pages: Option<u32>,

    #[serde(rename = "apaa")]
    #[serde_as(as = "Option<Vec<Bytes>>")]
    #[serde(skip_serializing_if = "is_empty_vec_opt")]
    #[serde(default)]
    #[builder(default)]
    pub args: Option<Vec<Vec<u8>>>,

    #[serde(rename = "apat")]
    #[serde(skip_serializing_if = "is_empty_vec_opt")]
    #[serde(default)]
    #[builder(default)]
    pub account_references: Option<Vec<Address>>,

    #[serde(rename = "apfa")]
    #[serde(skip_serializing_if = "is_empty_vec_opt")]
    #[serde(default)]
    #[builder(default)]
    pub app_references: Option<Vec<u64>>,

    #[serde(rename = "apas")]
    #[serde(skip_serializing_if = "is_empty_vec_opt")]
    #[serde(default)]
    #[builder(default)]
    pub asset_references: Option<Vec<u64>>,

    #[serde(rename = "apbx")]
    #[serde(skip_serializing_if = "is_empty_vec_opt")]
    #[serde(default)]
    #[builder(default)]
    pub box_references: Option<Vec<BoxReference>>,
}

impl ApplicationCallTransactionBuilder {
    pub fn build(&self) -> Result<Transaction, ApplicationCallTransactionBuilderError> {
        let fields = self.build_fields()?;
        fields.validate().map_err(|errors| {
            ApplicationCallTransactionBuilderError::ValidationError(format!(
                "Application call validation failed: {}",
                errors.join("\n")
            ))
        })?;
        Ok(Transaction::ApplicationCall(fields))
    }
}

impl ApplicationCallTransactionFields {
    pub fn is_create(&self) -> bool {
        self.app_id == 0
    }
}

impl Validate for ApplicationCallTransactionFields {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.is_create() {
            if self.approval_program.is_none() {
                errors.push(TransactionValidationError::RequiredField {
                    field: "Approval program".to_string(),
                });
            }
            if self.clear_state_program.is_none() {
                errors.push(TransactionValidationError::RequiredField {
                    field: "Clear state program".to_string(),
                });
            }
        }

        if self.extra_program_pages.is_some_and(|p| p > MAX_EXTRA_PROGRAM_PAGES) {
            errors.push(TransactionValidationError::ArbitraryConstraint {
                message: format!("Extra program pages cannot exceed {}", MAX_EXTRA_PROGRAM_PAGES),
            });
        }

        if self.args.as_ref().is_some_and(|a| a.len() > MAX_APP_ARGS) {
            errors.push(TransactionValidationError::ArbitraryConstraint {
                message: format!("Cannot have more than {} app args", MAX_APP_ARGS),
            });
        }

        if self
            .account_references
            .as_ref()
            .is_some_and(|a| a.len() > MAX_ACCOUNT_REFERENCES)
        {
            errors.push(TransactionValidationError::ArbitraryConstraint {
                message: format!(
                    "Cannot have more than {} account references",
                    MAX_ACCOUNT_REFERENCES
                ),
            });
        }

        match errors.is_empty() {
            true => Ok(()),
            false => Err(errors.into_iter().map(|e| e.to_string()).collect()),
        }
    }
}

fn is_default_on_complete(on_complete: &OnApplicationComplete) -> bool {
    matches!(on_complete, OnApplicationComplete::NoOp)
}

/// Box references are sent with the app id replaced by its 1-based position in the foreign
/// apps list, 0 standing for the called application.
pub fn application_call_serializer<S>(
    fields: &ApplicationCallTransactionFields,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let Some(box_references) = fields.box_references.as_ref().filter(|b| !b.is_empty()) else {
        return fields.serialize(serializer);
    };

    let app_references = fields.app_references.as_deref().unwrap_or(&[]);
    let positional = box_references
        .iter()
        .map(|box_ref| {
            let index = if box_ref.app_id == 0 || box_ref.app_id == fields.app_id {
                0
            } else {
                app_references
                    .iter()
                    .position(|&id| id == box_ref.app_id)
                    .map(|pos| (pos + 1) as u64)
                    .ok_or_else(|| {
                        format!(
                            "Box reference with app id {} not found in app references",
                            box_ref.app_id
                        )
                    })?
            };
            Ok(BoxReference {
                app_id: index,
                name: box_ref.name.clone(),
            })
        })
        .collect::<Result<Vec<_>, String>>()
        .map_err(serde::ser::Error::custom)?;

    let mut fields = fields.clone();
    fields.box_references = Some(positional);
    fields.serialize(serializer)
}

pub fn application_call_deserializer<'de, D>(
    deserializer: D,
) -> Result<ApplicationCallTransactionFields, D::Error>
where
    D: Deserializer<'de>,
{
    let mut fields = ApplicationCallTransactionFields::deserialize(deserializer)?;

    if let Some(box_references) = fields.box_references.take() {
        let app_references = fields.app_references.as_deref().unwrap_or(&[]);
        let resolved = box_references
            .into_iter()
            .map(|box_ref| {
                let app_id = match box_ref.app_id {
                    0 => 0,
                    index => app_references
                        .get(index as usize - 1)
                        .copied()
                        .ok_or_else(|| format!("Cannot find app reference index {}", index))?,
                };
                Ok(BoxReference {
                    app_id,
                    name: box_ref.name,
                })
            })
            .collect::<Result<Vec<_>, String>>()
            .map_err(serde::de::Error::custom)?;
        fields.box_references = Some(resolved);
    }

    Ok(fields)
}
