use crate::constants::{ADDRESS_BYTE_LENGTH, ADDRESS_CHECKSUM_LENGTH, ADDRESS_STRING_LENGTH};
use crate::error::ABIError;
use num_bigint::BigUint;
use sha2::{Digest, Sha512_256};

/// Left-pads the big-endian bytes of `value` to `len`, failing when it does not fit.
pub fn big_uint_to_bytes(value: &BigUint, len: usize) -> Result<Vec<u8>, ABIError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > len {
        return Err(ABIError::encoding(format!(
            "{} does not fit in {} bytes",
            value, len
        )));
    }
    let mut result = vec![0u8; len - bytes.len()];
    result.extend_from_slice(&bytes);
    Ok(result)
}

fn checksum(public_key: &[u8]) -> [u8; ADDRESS_CHECKSUM_LENGTH] {
    let digest = Sha512_256::digest(public_key);
    let mut out = [0u8; ADDRESS_CHECKSUM_LENGTH];
    out.copy_from_slice(&digest[digest.len() - ADDRESS_CHECKSUM_LENGTH..]);
    out
}

pub fn address_to_public_key(address: &str) -> Result<[u8; ADDRESS_BYTE_LENGTH], ABIError> {
    if address.len() != ADDRESS_STRING_LENGTH {
        return Err(ABIError::validation(format!(
            "Address {} must be exactly {} characters",
            address, ADDRESS_STRING_LENGTH
        )));
    }
    let decoded = base32::decode(base32::Alphabet::Rfc4648 { padding: false }, address)
        .ok_or_else(|| ABIError::validation(format!("Address {} is not valid base32", address)))?;
    if decoded.len() != ADDRESS_BYTE_LENGTH + ADDRESS_CHECKSUM_LENGTH {
        return Err(ABIError::validation(format!(
            "Address {} decodes to {} bytes",
            address,
            decoded.len()
        )));
    }
    let (key, sum) = decoded.split_at(ADDRESS_BYTE_LENGTH);
    if checksum(key) != sum {
        return Err(ABIError::validation(format!(
            "Address {} has an invalid checksum",
            address
        )));
    }
    let mut public_key = [0u8; ADDRESS_BYTE_LENGTH];
    public_key.copy_from_slice(key);
    Ok(public_key)
}

pub fn public_key_to_address(public_key: &[u8]) -> Result<String, ABIError> {
    if public_key.len() != ADDRESS_BYTE_LENGTH {
        return Err(ABIError::decoding(format!(
            "Address must be {} bytes, got {}",
            ADDRESS_BYTE_LENGTH,
            public_key.len()
        )));
    }
    let mut bytes = public_key.to_vec();
    bytes.extend_from_slice(&checksum(public_key));
    Ok(base32::encode(
        base32::Alphabet::Rfc4648 { padding: false },
        &bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_address_round_trip() {
        let address = public_key_to_address(&[0u8; 32]).unwrap();
        assert_eq!(
            address,
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"
        );
        assert_eq!(address_to_public_key(&address).unwrap(), [0u8; 32]);
    }

    #[test]
    fn rejects_bad_checksum() {
        let result =
            address_to_public_key("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKA");
        assert!(result.is_err());
    }

    #[test]
    fn uint_that_does_not_fit_is_rejected() {
        assert!(big_uint_to_bytes(&BigUint::from(256u32), 1).is_err());
        assert_eq!(big_uint_to_bytes(&BigUint::from(255u32), 2).unwrap(), vec![0, 255]);
    }
}
