//! Traits shared by every encodable Algorand structure.

use crate::constants::Byte32;
use crate::error::AlgoKitTransactError;
use crate::utils::{hash, sort_msgpack_value};
use serde::{Deserialize, Serialize};

/// Canonical msgpack encoding as the node expects it: empty fields omitted, map keys sorted
/// and, for signable structures, a domain separation prefix.
pub trait AlgorandMsgpack: Serialize + for<'de> Deserialize<'de> {
    const PREFIX: &'static [u8] = b"";

    /// Encodes without the prefix.
    fn encode_raw(&self) -> Result<Vec<u8>, AlgoKitTransactError> {
        let named = rmp_serde::to_vec_named(self)?;
        let value = rmpv::decode::read_value(&mut named.as_slice())?;

        let mut sorted = Vec::with_capacity(named.len());
        rmpv::encode::write_value(&mut sorted, &sort_msgpack_value(value))?;
        Ok(sorted)
    }

    /// Encodes with the prefix. These are the bytes that get signed and hashed.
    fn encode(&self) -> Result<Vec<u8>, AlgoKitTransactError> {
        let raw = self.encode_raw()?;
        let mut bytes = Vec::with_capacity(Self::PREFIX.len() + raw.len());
        bytes.extend_from_slice(Self::PREFIX);
        bytes.extend_from_slice(&raw);
        Ok(bytes)
    }

    /// Decodes either prefixed or raw bytes.
    fn decode(bytes: &[u8]) -> Result<Self, AlgoKitTransactError> {
        let payload = match Self::PREFIX.is_empty() {
            true => bytes,
            false => bytes.strip_prefix(Self::PREFIX).unwrap_or(bytes),
        };
        Ok(rmp_serde::from_slice(payload)?)
    }
}

pub trait TransactionId: AlgorandMsgpack {
    fn id_raw(&self) -> Result<Byte32, AlgoKitTransactError> {
        Ok(hash(&self.encode()?))
    }

    fn id(&self) -> Result<String, AlgoKitTransactError> {
        Ok(base32::encode(
            base32::Alphabet::Rfc4648 { padding: false },
            &self.id_raw()?,
        ))
    }
}

pub trait EstimateTransactionSize {
    fn estimate_size(&self) -> Result<usize, AlgoKitTransactError>;
}

pub trait Transactions {
    /// Computes the group id of the supplied transactions and writes it into each of them.
    fn assign_group(self) -> Result<Vec<crate::Transaction>, AlgoKitTransactError>;
}

pub trait Validate {
    fn validate(&self) -> Result<(), Vec<String>>;
}
