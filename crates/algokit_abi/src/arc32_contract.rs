//! ARC-32 application specifications and their conversion to ARC-56.
//!
//! Only the parts of ARC-32 that carry over into [`Arc56Contract`] are modelled.

use crate::arc56_contract::{
    AVM_BYTES, AVM_STRING, AVM_UINT64, Actions, Arc56Contract, CallOnApplicationComplete,
    CreateOnApplicationComplete, Keys, Method, MethodArg, Network, Returns, Schema, Source,
    State, StateSchema, StorageKey,
};
use crate::error::ABIError;
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallConfigValue {
    #[default]
    Never,
    Call,
    Create,
    All,
}

impl CallConfigValue {
    fn allows_call(self) -> bool {
        matches!(self, CallConfigValue::Call | CallConfigValue::All)
    }

    fn allows_create(self) -> bool {
        matches!(self, CallConfigValue::Create | CallConfigValue::All)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallConfig {
    #[serde(default)]
    pub no_op: CallConfigValue,
    #[serde(default)]
    pub opt_in: CallConfigValue,
    #[serde(default)]
    pub close_out: CallConfigValue,
    #[serde(default)]
    pub update_application: CallConfigValue,
    #[serde(default)]
    pub delete_application: CallConfigValue,
}

impl CallConfig {
    fn to_actions(&self) -> Actions {
        let mut actions = Actions::default();
        let calls = [
            (self.no_op, CallOnApplicationComplete::NoOp),
            (self.opt_in, CallOnApplicationComplete::OptIn),
            (self.close_out, CallOnApplicationComplete::CloseOut),
            (self.update_application, CallOnApplicationComplete::UpdateApplication),
            (self.delete_application, CallOnApplicationComplete::DeleteApplication),
        ];
        for (value, action) in calls {
            if value.allows_call() {
                actions.call.push(action);
            }
        }
        // close out and update cannot happen at creation time
        let creates = [
            (self.no_op, CreateOnApplicationComplete::NoOp),
            (self.opt_in, CreateOnApplicationComplete::OptIn),
            (self.delete_application, CreateOnApplicationComplete::DeleteApplication),
        ];
        for (value, action) in creates {
            if value.allows_create() {
                actions.create.push(action);
            }
        }
        actions
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    #[serde(default)]
    pub call_config: CallConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc32StateSchema {
    #[serde(default)]
    pub num_uints: u32,
    #[serde(default)]
    pub num_byte_slices: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc32State {
    pub global: Arc32StateSchema,
    pub local: Arc32StateSchema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredValue {
    /// `uint64` or `bytes`.
    #[serde(rename = "type")]
    pub value_type: String,
    pub key: String,
    #[serde(default)]
    pub descr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredSchema {
    #[serde(default)]
    pub declared: HashMap<String, DeclaredValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc32Schema {
    #[serde(default)]
    pub global: DeclaredSchema,
    #[serde(default)]
    pub local: DeclaredSchema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc32Network {
    #[serde(rename = "appID")]
    pub app_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc4Contract {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    pub methods: Vec<Arc4Method>,
    #[serde(default)]
    pub networks: HashMap<String, Arc32Network>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc4Method {
    pub name: String,
    pub args: Vec<MethodArg>,
    pub returns: Returns,
    #[serde(default)]
    pub desc: Option<String>,
}

impl Arc4Method {
    fn signature(&self) -> String {
        let args = self
            .args
            .iter()
            .map(|arg| arg.arg_type.as_str())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({}){}", self.name, args, self.returns.return_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc32Contract {
    #[serde(default)]
    pub hints: HashMap<String, Hint>,
    pub source: Source,
    pub state: Arc32State,
    #[serde(default)]
    pub schema: Arc32Schema,
    pub contract: Arc4Contract,
    #[serde(default)]
    pub bare_call_config: CallConfig,
}

impl Arc32Contract {
    pub fn from_json(json: &str) -> Result<Self, ABIError> {
        serde_json::from_str(json)
            .map_err(|e| ABIError::validation(format!("Failed to parse ARC-32 JSON: {}", e)))
    }
}

fn storage_keys(schema: &DeclaredSchema) -> Result<HashMap<String, StorageKey>, ABIError> {
    schema
        .declared
        .iter()
        .map(|(name, declared)| {
            let value_type = match declared.value_type.as_str() {
                "uint64" => AVM_UINT64,
                "bytes" => AVM_BYTES,
                other => {
                    return Err(ABIError::validation(format!(
                        "Declared state {} has unsupported type {}",
                        name, other
                    )));
                }
            };
            Ok((
                name.clone(),
                StorageKey {
                    key: general_purpose::STANDARD.encode(declared.key.as_bytes()),
                    key_type: AVM_STRING.to_string(),
                    value_type: value_type.to_string(),
                    desc: declared.descr.clone().filter(|d| !d.is_empty()),
                },
            ))
        })
        .collect()
}

impl Arc56Contract {
    /// Converts an ARC-32 application specification into ARC-56 form.
    pub fn from_arc32(arc32: &Arc32Contract) -> Result<Self, ABIError> {
        let methods = arc32
            .contract
            .methods
            .iter()
            .map(|method| Method {
                name: method.name.clone(),
                args: method.args.clone(),
                returns: method.returns.clone(),
                actions: arc32
                    .hints
                    .get(&method.signature())
                    .map(|hint| hint.call_config.to_actions())
                    .unwrap_or_default(),
                readonly: None,
                desc: method.desc.clone(),
            })
            .collect();

        let state = State {
            schema: Schema {
                global: StateSchema {
                    ints: arc32.state.global.num_uints,
                    bytes: arc32.state.global.num_byte_slices,
                },
                local: StateSchema {
                    ints: arc32.state.local.num_uints,
                    bytes: arc32.state.local.num_byte_slices,
                },
            },
            keys: Keys {
                global: storage_keys(&arc32.schema.global)?,
                local: storage_keys(&arc32.schema.local)?,
                box_keys: HashMap::new(),
            },
        };

        let networks = arc32
            .contract
            .networks
            .iter()
            .map(|(genesis_hash, network)| {
                (
                    genesis_hash.clone(),
                    Network {
                        app_id: network.app_id,
                    },
                )
            })
            .collect();

        Ok(Arc56Contract {
            arcs: vec![4, 56],
            name: arc32.contract.name.clone(),
            desc: arc32.contract.desc.clone(),
            methods,
            bare_actions: arc32.bare_call_config.to_actions(),
            state,
            networks,
            source: Some(arc32.source.clone()),
        })
    }
}
