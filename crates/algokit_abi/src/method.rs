use crate::abi_type::{ABIType, parse_tuple_content};
use crate::abi_value::ABIValue;
use crate::constants::{ABI_RETURN_PREFIX, METHOD_SELECTOR_LENGTH, VOID_RETURN_TYPE};
use crate::error::ABIError;
use sha2::{Digest, Sha512_256};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Transaction kinds a method argument may require in the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ABITransactionType {
    /// Any transaction kind.
    Txn,
    Payment,
    KeyRegistration,
    AssetConfig,
    AssetTransfer,
    AssetFreeze,
    ApplicationCall,
}

const TRANSACTION_TYPE_NAMES: [(ABITransactionType, &str); 7] = [
    (ABITransactionType::Txn, "txn"),
    (ABITransactionType::Payment, "pay"),
    (ABITransactionType::KeyRegistration, "keyreg"),
    (ABITransactionType::AssetConfig, "acfg"),
    (ABITransactionType::AssetTransfer, "axfer"),
    (ABITransactionType::AssetFreeze, "afrz"),
    (ABITransactionType::ApplicationCall, "appl"),
];

impl ABITransactionType {
    /// Whether a transaction whose wire `type` is `type_name` satisfies this argument.
    pub fn accepts(&self, type_name: &str) -> bool {
        *self == ABITransactionType::Txn || self.to_string() == type_name
    }
}

impl FromStr for ABITransactionType {
    type Err = ABIError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TRANSACTION_TYPE_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(kind, _)| *kind)
            .ok_or_else(|| ABIError::validation(format!("Invalid transaction type: {}", s)))
    }
}

impl Display for ABITransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = TRANSACTION_TYPE_NAMES
            .iter()
            .find(|(kind, _)| kind == self)
            .map_or("txn", |(_, name)| *name);
        write!(f, "{}", name)
    }
}

/// Reference argument kinds, encoded as a `uint8` index into a foreign array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ABIReferenceType {
    Account,
    Application,
    Asset,
}

impl FromStr for ABIReferenceType {
    type Err = ABIError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "account" => Ok(ABIReferenceType::Account),
            "application" => Ok(ABIReferenceType::Application),
            "asset" => Ok(ABIReferenceType::Asset),
            _ => Err(ABIError::validation(format!("Invalid reference type: {}", s))),
        }
    }
}

impl Display for ABIReferenceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ABIReferenceType::Account => write!(f, "account"),
            ABIReferenceType::Application => write!(f, "application"),
            ABIReferenceType::Asset => write!(f, "asset"),
        }
    }
}

/// A value passed for a reference argument, resolved to a foreign array index at call time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ABIReferenceValue {
    /// Base32 account address.
    Account(String),
    Application(u64),
    Asset(u64),
}

impl ABIReferenceValue {
    pub fn reference_type(&self) -> ABIReferenceType {
        match self {
            ABIReferenceValue::Account(_) => ABIReferenceType::Account,
            ABIReferenceValue::Application(_) => ABIReferenceType::Application,
            ABIReferenceValue::Asset(_) => ABIReferenceType::Asset,
        }
    }
}

/// The declared type of a method argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ABIMethodArgType {
    /// Encoded into the application args.
    Value(ABIType),
    /// Placed in the group immediately before the application call.
    Transaction(ABITransactionType),
    Reference(ABIReferenceType),
}

impl ABIMethodArgType {
    pub fn is_transaction(&self) -> bool {
        matches!(self, ABIMethodArgType::Transaction(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, ABIMethodArgType::Reference(_))
    }
}

impl FromStr for ABIMethodArgType {
    type Err = ABIError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(kind) = ABITransactionType::from_str(s) {
            return Ok(ABIMethodArgType::Transaction(kind));
        }
        if let Ok(kind) = ABIReferenceType::from_str(s) {
            return Ok(ABIMethodArgType::Reference(kind));
        }
        Ok(ABIMethodArgType::Value(ABIType::from_str(s)?))
    }
}

impl Display for ABIMethodArgType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ABIMethodArgType::Value(abi_type) => write!(f, "{}", abi_type),
            ABIMethodArgType::Transaction(kind) => write!(f, "{}", kind),
            ABIMethodArgType::Reference(kind) => write!(f, "{}", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ABIMethodArg {
    pub arg_type: ABIMethodArgType,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ABIMethodArg {
    pub fn new(
        arg_type: ABIMethodArgType,
        name: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            arg_type,
            name,
            description,
        }
    }
}

/// An ARC-4 method descriptor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ABIMethod {
    pub name: String,
    pub args: Vec<ABIMethodArg>,
    /// `None` for `void` methods.
    pub returns: Option<ABIType>,
    pub description: Option<String>,
}

impl ABIMethod {
    pub fn new(
        name: String,
        args: Vec<ABIMethodArg>,
        returns: Option<ABIType>,
        description: Option<String>,
    ) -> Self {
        Self {
            name,
            args,
            returns,
            description,
        }
    }

    pub fn transaction_arg_count(&self) -> usize {
        self.args
            .iter()
            .filter(|arg| arg.arg_type.is_transaction())
            .count()
    }

    pub fn signature(&self) -> Result<String, ABIError> {
        if self.name.is_empty() {
            return Err(ABIError::validation("Method name cannot be empty"));
        }
        let args = self
            .args
            .iter()
            .map(|arg| arg.arg_type.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let returns = self
            .returns
            .as_ref()
            .map_or_else(|| VOID_RETURN_TYPE.to_string(), ToString::to_string);
        Ok(format!("{}({}){}", self.name, args, returns))
    }

    /// First four bytes of the SHA-512/256 digest of the signature.
    pub fn selector(&self) -> Result<Vec<u8>, ABIError> {
        let digest = Sha512_256::digest(self.signature()?.as_bytes());
        Ok(digest[..METHOD_SELECTOR_LENGTH].to_vec())
    }
}

impl FromStr for ABIMethod {
    type Err = ABIError;

    fn from_str(signature: &str) -> Result<Self, Self::Err> {
        if signature.chars().any(char::is_whitespace) {
            return Err(ABIError::validation(
                "Method signature cannot contain whitespace",
            ));
        }
        let open = signature.find('(').ok_or_else(|| {
            ABIError::validation("Method signature must contain opening parenthesis")
        })?;
        if open == 0 {
            return Err(ABIError::validation("Method name cannot be empty"));
        }

        let mut depth = 0;
        let mut close = None;
        for (i, ch) in signature[open..].char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(open + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(|| {
            ABIError::validation("Mismatched parentheses in method signature")
        })?;

        let args = parse_tuple_content(&signature[open + 1..close])?
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                Ok(ABIMethodArg::new(
                    arg.parse()?,
                    Some(format!("arg{}", i)),
                    None,
                ))
            })
            .collect::<Result<Vec<_>, ABIError>>()?;

        let returns = match &signature[close + 1..] {
            "" | VOID_RETURN_TYPE => None,
            other => Some(ABIType::from_str(other)?),
        };

        Ok(ABIMethod::new(
            signature[..open].to_string(),
            args,
            returns,
            None,
        ))
    }
}

/// A method return value recovered from an application call's last log.
#[derive(Debug, Clone)]
pub struct ABIReturn {
    pub method: ABIMethod,
    pub raw_return_value: Vec<u8>,
    /// `None` for void methods.
    pub return_value: Option<ABIValue>,
}

impl ABIReturn {
    /// Decodes the return of `method` from `log`, which must carry the `0x151f7c75` prefix
    /// unless the method is void.
    pub fn from_log(method: &ABIMethod, log: Option<&[u8]>) -> Result<Self, ABIError> {
        let Some(return_type) = &method.returns else {
            return Ok(Self {
                method: method.clone(),
                raw_return_value: Vec::new(),
                return_value: None,
            });
        };
        let log = log.ok_or_else(|| {
            ABIError::decoding(format!(
                "App call for {} produced no logs to decode a return from",
                method.name
            ))
        })?;
        let raw = log.strip_prefix(&ABI_RETURN_PREFIX[..]).ok_or_else(|| {
            ABIError::decoding(format!(
                "Last log of {} does not start with the ABI return prefix",
                method.name
            ))
        })?;
        Ok(Self {
            method: method.clone(),
            raw_return_value: raw.to_vec(),
            return_value: Some(return_type.decode(raw)?),
        })
    }
}
