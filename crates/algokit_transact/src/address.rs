//! Algorand account and application addresses.
//!
//! An address is 32 bytes (an ed25519 public key, or a digest for multisig, logic signature
//! and application accounts) shown as a 58-character base32 string that ends in a 4-byte
//! checksum.

use crate::constants::Byte32;
use crate::error::AlgoKitTransactError;
use crate::utils::{hash, pub_key_to_checksum};
use crate::{
    ALGORAND_ADDRESS_LENGTH, ALGORAND_CHECKSUM_BYTE_LENGTH, ALGORAND_PUBLIC_KEY_BYTE_LENGTH,
};
use serde::{Deserialize, Serialize};
use serde_with::{Bytes, serde_as};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const APP_ID_PREFIX: &[u8] = b"appID";

/// The decoded 32 bytes of an Algorand address, without the checksum.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Address(#[serde_as(as = "Bytes")] pub Byte32);

impl Address {
    /// The all-zero address, used on the wire to mean "not set".
    pub fn zero() -> Self {
        Address([0; ALGORAND_PUBLIC_KEY_BYTE_LENGTH])
    }

    pub fn as_bytes(&self) -> &Byte32 {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ALGORAND_PUBLIC_KEY_BYTE_LENGTH]
    }

    /// Escrow address of an application.
    pub fn from_app_id(app_id: &u64) -> Self {
        let mut to_hash = APP_ID_PREFIX.to_vec();
        to_hash.extend_from_slice(&app_id.to_be_bytes());
        Address(hash(&to_hash))
    }

    /// Base32 string of the address bytes followed by the checksum.
    pub fn as_str(&self) -> String {
        let mut buffer = [0u8; ALGORAND_PUBLIC_KEY_BYTE_LENGTH + ALGORAND_CHECKSUM_BYTE_LENGTH];
        buffer[..ALGORAND_PUBLIC_KEY_BYTE_LENGTH].copy_from_slice(&self.0);
        buffer[ALGORAND_PUBLIC_KEY_BYTE_LENGTH..].copy_from_slice(&self.checksum());

        base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &buffer)
    }

    pub fn checksum(&self) -> [u8; ALGORAND_CHECKSUM_BYTE_LENGTH] {
        pub_key_to_checksum(&self.0)
    }
}

impl From<Byte32> for Address {
    fn from(bytes: Byte32) -> Self {
        Address(bytes)
    }
}

impl FromStr for Address {
    type Err = AlgoKitTransactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ALGORAND_ADDRESS_LENGTH {
            return Err(AlgoKitTransactError::InvalidAddress {
                message: format!(
                    "Algorand address must be exactly {} characters",
                    ALGORAND_ADDRESS_LENGTH
                ),
            });
        }
        let decoded = base32::decode(base32::Alphabet::Rfc4648 { padding: false }, s)
            .ok_or_else(|| AlgoKitTransactError::InvalidAddress {
                message: "Invalid base32 encoding for Algorand address".to_string(),
            })?;

        if decoded.len() != ALGORAND_PUBLIC_KEY_BYTE_LENGTH + ALGORAND_CHECKSUM_BYTE_LENGTH {
            return Err(AlgoKitTransactError::InvalidAddress {
                message: format!("Decoded address has unexpected length {}", decoded.len()),
            });
        }

        let (key_bytes, checksum) = decoded.split_at(ALGORAND_PUBLIC_KEY_BYTE_LENGTH);
        let mut key = [0u8; ALGORAND_PUBLIC_KEY_BYTE_LENGTH];
        key.copy_from_slice(key_bytes);

        if pub_key_to_checksum(&key) != checksum {
            return Err(AlgoKitTransactError::InvalidAddress {
                message: "Checksum is invalid".to_string(),
            });
        }
        Ok(Address(key))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
