use crate::abi_type::ABIType;
use crate::constants::VOID_RETURN_TYPE;
use crate::error::ABIError;
use crate::method::{ABIMethod, ABIMethodArg};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Raw byteslice without the ARC-4 length prefix.
pub const AVM_BYTES: &str = "AVMBytes";
/// A utf-8 string without the ARC-4 length prefix.
pub const AVM_STRING: &str = "AVMString";
pub const AVM_UINT64: &str = "AVMUint64";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOnApplicationComplete {
    NoOp,
    OptIn,
    CloseOut,
    UpdateApplication,
    DeleteApplication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateOnApplicationComplete {
    NoOp,
    OptIn,
    DeleteApplication,
}

/// On-completion actions a method or bare call is allowed with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions {
    #[serde(default)]
    pub create: Vec<CreateOnApplicationComplete>,
    #[serde(default)]
    pub call: Vec<CallOnApplicationComplete>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSchema {
    pub ints: u32,
    pub bytes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub global: StateSchema,
    pub local: StateSchema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageKey {
    /// Base64 encoded key.
    pub key: String,
    pub key_type: String,
    pub value_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keys {
    #[serde(default)]
    pub global: HashMap<String, StorageKey>,
    #[serde(default)]
    pub local: HashMap<String, StorageKey>,
    #[serde(rename = "box", default)]
    pub box_keys: HashMap<String, StorageKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub schema: Schema,
    #[serde(default)]
    pub keys: Keys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub app_id: u64,
}

/// Base64 encoded TEAL sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub approval: String,
    pub clear: String,
}

impl Source {
    pub fn decoded_approval(&self) -> Result<String, ABIError> {
        decode_source(&self.approval, "approval")
    }

    pub fn decoded_clear(&self) -> Result<String, ABIError> {
        decode_source(&self.clear, "clear")
    }
}

fn decode_source(encoded: &str, which: &str) -> Result<String, ABIError> {
    let bytes = general_purpose::STANDARD.decode(encoded).map_err(|e| {
        ABIError::decoding(format!("Failed to decode {} program source: {}", which, e))
    })?;
    String::from_utf8(bytes).map_err(|e| {
        ABIError::decoding(format!("{} program source is not valid utf-8: {}", which, e))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodArg {
    #[serde(rename = "type")]
    pub arg_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Returns {
    #[serde(rename = "type")]
    pub return_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub args: Vec<MethodArg>,
    pub returns: Returns,
    #[serde(default)]
    pub actions: Actions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl Method {
    pub fn signature(&self) -> String {
        let args = self
            .args
            .iter()
            .map(|arg| arg.arg_type.as_str())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({}){}", self.name, args, self.returns.return_type)
    }

    pub fn to_abi_method(&self) -> Result<ABIMethod, ABIError> {
        let args = self
            .args
            .iter()
            .map(|arg| {
                Ok(ABIMethodArg::new(
                    arg.arg_type.parse()?,
                    arg.name.clone(),
                    arg.desc.clone(),
                ))
            })
            .collect::<Result<Vec<_>, ABIError>>()?;
        let returns = match self.returns.return_type.as_str() {
            VOID_RETURN_TYPE => None,
            other => Some(ABIType::from_str(other)?),
        };
        Ok(ABIMethod::new(
            self.name.clone(),
            args,
            returns,
            self.desc.clone(),
        ))
    }
}

/// ARC-56 application specification, limited to the parts needed to build calls
/// and deploy the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc56Contract {
    pub arcs: Vec<u32>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub methods: Vec<Method>,
    #[serde(default)]
    pub bare_actions: Actions,
    pub state: State,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub networks: HashMap<String, Network>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl Arc56Contract {
    pub fn from_json(json: &str) -> Result<Self, ABIError> {
        serde_json::from_str(json)
            .map_err(|e| ABIError::validation(format!("Failed to parse ARC-56 JSON: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, ABIError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ABIError::encoding(format!("Failed to serialize ARC-56 JSON: {}", e)))
    }

    /// Looks a method up by bare name, or by full signature when the input contains `(`.
    pub fn get_method(&self, name_or_signature: &str) -> Result<&Method, ABIError> {
        let unknown = || ABIError::UnknownMethod {
            method: name_or_signature.to_string(),
            contract: self.name.clone(),
        };
        if name_or_signature.contains('(') {
            return self
                .methods
                .iter()
                .find(|m| m.signature() == name_or_signature)
                .ok_or_else(unknown);
        }
        let mut matches = self.methods.iter().filter(|m| m.name == name_or_signature);
        let first = matches.next().ok_or_else(unknown)?;
        let rest: Vec<&Method> = matches.collect();
        if !rest.is_empty() {
            let signatures = std::iter::once(first)
                .chain(rest)
                .map(Method::signature)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ABIError::validation(format!(
                "Method {} in {} is overloaded; pass one of the signatures instead: {}",
                name_or_signature, self.name, signatures
            )));
        }
        Ok(first)
    }

    pub fn get_abi_method(&self, name_or_signature: &str) -> Result<ABIMethod, ABIError> {
        self.get_method(name_or_signature)?.to_abi_method()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract() -> Arc56Contract {
        Arc56Contract::from_json(
            r#"{
                "arcs": [4, 56],
                "name": "Calculator",
                "methods": [
                    {"name": "add", "args": [{"type": "uint64"}, {"type": "uint64"}], "returns": {"type": "uint64"}},
                    {"name": "add", "args": [{"type": "uint32"}, {"type": "uint32"}], "returns": {"type": "uint32"}},
                    {"name": "hello", "args": [{"type": "string", "name": "name"}], "returns": {"type": "string"},
                     "actions": {"create": ["NoOp"], "call": ["NoOp"]}}
                ],
                "state": {"schema": {"global": {"ints": 1, "bytes": 0}, "local": {"ints": 0, "bytes": 0}}}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn finds_method_by_name() {
        let method = contract().get_abi_method("hello").unwrap();
        assert_eq!(method.signature().unwrap(), "hello(string)string");
        assert_eq!(method.args[0].name.as_deref(), Some("name"));
    }

    #[test]
    fn overloaded_name_requires_signature() {
        let contract = contract();
        assert!(contract.get_method("add").is_err());
        let method = contract.get_method("add(uint32,uint32)uint32").unwrap();
        assert_eq!(method.returns.return_type, "uint32");
    }

    #[test]
    fn unknown_method() {
        let err = contract().get_method("sub").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Unable to find method sub in Calculator app");
    }

    #[test]
    fn decodes_sources() {
        let source = Source {
            approval: "I3ByYWdtYSB2ZXJzaW9uIDEw".to_string(),
            clear: "!!".to_string(),
        };
        assert_eq!(source.decoded_approval().unwrap(), "#pragma version 10");
        assert!(source.decoded_clear().is_err());
    }
}
