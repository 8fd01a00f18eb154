use crate::abi_value::ABIValue;
use crate::constants::{
    ADDRESS_BYTE_LENGTH, BOOL_FALSE_BYTE, BOOL_TRUE_BYTE, BOOLS_PER_BYTE, LENGTH_ENCODE_BYTE_SIZE,
    MAX_BIT_SIZE, MAX_PRECISION, STATIC_ARRAY_REGEX, UFIXED_REGEX,
};
use crate::error::ABIError;
use crate::utils::{address_to_public_key, big_uint_to_bytes, public_key_to_address};
use num_bigint::BigUint;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// An ARC-4 type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ABIType {
    /// `uintN`, N in 8..=512 and divisible by 8.
    Uint(u16),
    /// `ufixedNxM`, with M in 1..=160.
    UFixed(u16, u8),
    Bool,
    Byte,
    String,
    Address,
    StaticArray(Box<ABIType>, usize),
    DynamicArray(Box<ABIType>),
    Tuple(Vec<ABIType>),
}

impl ABIType {
    pub fn is_dynamic(&self) -> bool {
        match self {
            ABIType::String | ABIType::DynamicArray(_) => true,
            ABIType::StaticArray(child, _) => child.is_dynamic(),
            ABIType::Tuple(children) => children.iter().any(ABIType::is_dynamic),
            _ => false,
        }
    }

    /// Encoded size in bytes of a static type.
    pub fn static_size(&self) -> Result<usize, ABIError> {
        match self {
            ABIType::Uint(bits) | ABIType::UFixed(bits, _) => Ok(*bits as usize / 8),
            ABIType::Bool | ABIType::Byte => Ok(1),
            ABIType::Address => Ok(ADDRESS_BYTE_LENGTH),
            ABIType::StaticArray(child, len) if **child == ABIType::Bool => {
                Ok(len.div_ceil(BOOLS_PER_BYTE))
            }
            ABIType::StaticArray(child, len) => Ok(child.static_size()? * len),
            ABIType::Tuple(children) => {
                let mut size = 0;
                let mut i = 0;
                while i < children.len() {
                    if children[i] == ABIType::Bool {
                        i += bool_run_length(children, i);
                        size += 1;
                    } else {
                        size += children[i].static_size()?;
                        i += 1;
                    }
                }
                Ok(size)
            }
            ABIType::String | ABIType::DynamicArray(_) => Err(ABIError::validation(format!(
                "Dynamic type {} has no static size",
                self
            ))),
        }
    }

    pub fn encode(&self, value: &ABIValue) -> Result<Vec<u8>, ABIError> {
        match (self, value) {
            (ABIType::Uint(bits), ABIValue::Uint(n))
            | (ABIType::UFixed(bits, _), ABIValue::Uint(n)) => {
                big_uint_to_bytes(n, *bits as usize / 8)
            }
            (ABIType::Bool, ABIValue::Bool(b)) => Ok(vec![if *b {
                BOOL_TRUE_BYTE
            } else {
                BOOL_FALSE_BYTE
            }]),
            (ABIType::Byte, ABIValue::Byte(b)) => Ok(vec![*b]),
            (ABIType::Byte, ABIValue::Uint(n)) => big_uint_to_bytes(n, 1),
            (ABIType::Address, ABIValue::Address(address)) => {
                Ok(address_to_public_key(address)?.to_vec())
            }
            (ABIType::String, ABIValue::String(s)) => {
                let mut encoded = length_prefix(s.len())?;
                encoded.extend_from_slice(s.as_bytes());
                Ok(encoded)
            }
            (ABIType::StaticArray(child, len), ABIValue::Array(values)) => {
                if values.len() != *len {
                    return Err(ABIError::encoding(format!(
                        "Value has {} elements but {} expects {}",
                        values.len(),
                        self,
                        len
                    )));
                }
                encode_tuple(&vec![(**child).clone(); *len], values)
            }
            (ABIType::DynamicArray(child), ABIValue::Array(values)) => {
                let mut encoded = length_prefix(values.len())?;
                encoded.extend(encode_tuple(&vec![(**child).clone(); values.len()], values)?);
                Ok(encoded)
            }
            (ABIType::Tuple(children), ABIValue::Array(values)) => encode_tuple(children, values),
            _ => Err(ABIError::encoding(format!(
                "Cannot encode {:?} as {}",
                value, self
            ))),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<ABIValue, ABIError> {
        match self {
            ABIType::Uint(_) | ABIType::UFixed(_, _) => {
                expect_len(self, bytes, self.static_size()?)?;
                Ok(ABIValue::Uint(BigUint::from_bytes_be(bytes)))
            }
            ABIType::Bool => {
                expect_len(self, bytes, 1)?;
                match bytes[0] {
                    BOOL_TRUE_BYTE => Ok(ABIValue::Bool(true)),
                    BOOL_FALSE_BYTE => Ok(ABIValue::Bool(false)),
                    other => Err(ABIError::decoding(format!(
                        "Byte {:#04x} is not a valid bool",
                        other
                    ))),
                }
            }
            ABIType::Byte => {
                expect_len(self, bytes, 1)?;
                Ok(ABIValue::Byte(bytes[0]))
            }
            ABIType::Address => {
                expect_len(self, bytes, ADDRESS_BYTE_LENGTH)?;
                Ok(ABIValue::Address(public_key_to_address(bytes)?))
            }
            ABIType::String => {
                let len = read_length(bytes, 0)?;
                let body = &bytes[LENGTH_ENCODE_BYTE_SIZE..];
                if body.len() != len {
                    return Err(ABIError::decoding(format!(
                        "String declares {} bytes but {} remain",
                        len,
                        body.len()
                    )));
                }
                String::from_utf8(body.to_vec())
                    .map(ABIValue::String)
                    .map_err(|e| ABIError::decoding(format!("String is not valid utf-8: {}", e)))
            }
            ABIType::StaticArray(child, len) => {
                decode_tuple(&vec![(**child).clone(); *len], bytes).map(ABIValue::Array)
            }
            ABIType::DynamicArray(child) => {
                let len = read_length(bytes, 0)?;
                decode_tuple(
                    &vec![(**child).clone(); len],
                    &bytes[LENGTH_ENCODE_BYTE_SIZE..],
                )
                .map(ABIValue::Array)
            }
            ABIType::Tuple(children) => decode_tuple(children, bytes).map(ABIValue::Array),
        }
    }
}

fn bool_run_length(types: &[ABIType], start: usize) -> usize {
    types[start..]
        .iter()
        .take(BOOLS_PER_BYTE)
        .take_while(|t| **t == ABIType::Bool)
        .count()
}

fn length_prefix(len: usize) -> Result<Vec<u8>, ABIError> {
    let len = u16::try_from(len)
        .map_err(|_| ABIError::encoding(format!("Length {} exceeds {}", len, u16::MAX)))?;
    Ok(len.to_be_bytes().to_vec())
}

fn read_length(bytes: &[u8], at: usize) -> Result<usize, ABIError> {
    match bytes.get(at..at + LENGTH_ENCODE_BYTE_SIZE) {
        Some([hi, lo]) => Ok(u16::from_be_bytes([*hi, *lo]) as usize),
        _ => Err(ABIError::decoding(format!(
            "Expected a 2 byte length at offset {}",
            at
        ))),
    }
}

fn expect_len(abi_type: &ABIType, bytes: &[u8], expected: usize) -> Result<(), ABIError> {
    if bytes.len() != expected {
        return Err(ABIError::decoding(format!(
            "{} expects {} bytes, got {}",
            abi_type,
            expected,
            bytes.len()
        )));
    }
    Ok(())
}

fn encode_tuple(types: &[ABIType], values: &[ABIValue]) -> Result<Vec<u8>, ABIError> {
    if types.len() != values.len() {
        return Err(ABIError::encoding(format!(
            "Expected {} values, got {}",
            types.len(),
            values.len()
        )));
    }

    let mut heads: Vec<Vec<u8>> = Vec::new();
    let mut tails: Vec<Vec<u8>> = Vec::new();
    let mut dynamic: Vec<bool> = Vec::new();

    let mut i = 0;
    while i < types.len() {
        if types[i] == ABIType::Bool {
            let run = bool_run_length(types, i);
            let mut packed = 0u8;
            for (bit, value) in values[i..i + run].iter().enumerate() {
                match value {
                    ABIValue::Bool(true) => packed |= BOOL_TRUE_BYTE >> bit,
                    ABIValue::Bool(false) => {}
                    other => {
                        return Err(ABIError::encoding(format!(
                            "Cannot encode {:?} as bool",
                            other
                        )));
                    }
                }
            }
            heads.push(vec![packed]);
            tails.push(Vec::new());
            dynamic.push(false);
            i += run;
        } else if types[i].is_dynamic() {
            heads.push(vec![0; LENGTH_ENCODE_BYTE_SIZE]);
            tails.push(types[i].encode(&values[i])?);
            dynamic.push(true);
            i += 1;
        } else {
            heads.push(types[i].encode(&values[i])?);
            tails.push(Vec::new());
            dynamic.push(false);
            i += 1;
        }
    }

    let mut offset: usize = heads.iter().map(Vec::len).sum();
    for (k, head) in heads.iter_mut().enumerate() {
        if dynamic[k] {
            *head = length_prefix(offset)?;
        }
        offset += tails[k].len();
    }

    Ok(heads.into_iter().chain(tails).flatten().collect())
}

fn decode_tuple(types: &[ABIType], bytes: &[u8]) -> Result<Vec<ABIValue>, ABIError> {
    let mut values: Vec<Option<ABIValue>> = Vec::with_capacity(types.len());
    // (value index, type index, tail offset)
    let mut tails: Vec<(usize, usize, usize)> = Vec::new();
    let mut cursor = 0;

    let mut i = 0;
    while i < types.len() {
        if types[i] == ABIType::Bool {
            let run = bool_run_length(types, i);
            let packed = *bytes
                .get(cursor)
                .ok_or_else(|| ABIError::decoding("Ran out of bytes decoding bool"))?;
            for bit in 0..run {
                values.push(Some(ABIValue::Bool(packed & (BOOL_TRUE_BYTE >> bit) != 0)));
            }
            cursor += 1;
            i += run;
        } else if types[i].is_dynamic() {
            tails.push((values.len(), i, read_length(bytes, cursor)?));
            values.push(None);
            cursor += LENGTH_ENCODE_BYTE_SIZE;
            i += 1;
        } else {
            let size = types[i].static_size()?;
            let slice = bytes.get(cursor..cursor + size).ok_or_else(|| {
                ABIError::decoding(format!("Ran out of bytes decoding {}", types[i]))
            })?;
            values.push(Some(types[i].decode(slice)?));
            cursor += size;
            i += 1;
        }
    }

    if tails.is_empty() && cursor != bytes.len() {
        return Err(ABIError::decoding(format!(
            "Expected {} bytes, got {}",
            cursor,
            bytes.len()
        )));
    }

    for (k, &(value_index, type_index, start)) in tails.iter().enumerate() {
        let end = tails.get(k + 1).map_or(bytes.len(), |next| next.2);
        if start < cursor || start > end || end > bytes.len() {
            return Err(ABIError::decoding(format!(
                "Invalid tail offset {} for {}",
                start, types[type_index]
            )));
        }
        values[value_index] = Some(types[type_index].decode(&bytes[start..end])?);
    }

    values
        .into_iter()
        .map(|v| v.ok_or_else(|| ABIError::decoding("Tuple element was not decoded")))
        .collect()
}

/// Splits the inside of a tuple on top-level commas.
pub(crate) fn parse_tuple_content(content: &str) -> Result<Vec<String>, ABIError> {
    if content.is_empty() {
        return Ok(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut current = String::new();
    for ch in content.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                if current.is_empty() {
                    return Err(ABIError::validation(format!(
                        "Tuple {} has an empty element",
                        content
                    )));
                }
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        if depth < 0 {
            return Err(ABIError::validation(format!(
                "Tuple {} has mismatched parentheses",
                content
            )));
        }
        current.push(ch);
    }
    if depth != 0 {
        return Err(ABIError::validation(format!(
            "Tuple {} has mismatched parentheses",
            content
        )));
    }
    if current.is_empty() {
        return Err(ABIError::validation(format!(
            "Tuple {} has an empty element",
            content
        )));
    }
    parts.push(current);
    Ok(parts)
}

impl FromStr for ABIType {
    type Err = ABIError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(child) = s.strip_suffix("[]") {
            return Ok(ABIType::DynamicArray(Box::new(child.parse()?)));
        }
        if let Some(captures) = STATIC_ARRAY_REGEX.captures(s) {
            let len = captures[2]
                .parse::<usize>()
                .map_err(|e| {
                    ABIError::validation(format!("Invalid array length in {}: {}", s, e))
                })?;
            return Ok(ABIType::StaticArray(Box::new(captures[1].parse()?), len));
        }
        if let Some(bits) = s.strip_prefix("uint") {
            let bits = parse_bit_size(s, bits)?;
            return Ok(ABIType::Uint(bits));
        }
        if let Some(captures) = UFIXED_REGEX.captures(s) {
            let bits = parse_bit_size(s, &captures[1])?;
            let precision = captures[2]
                .parse::<u8>()
                .ok()
                .filter(|p| (1..=MAX_PRECISION).contains(p))
                .ok_or_else(|| {
                    ABIError::validation(format!(
                        "Precision of {} must be between 1 and {}",
                        s, MAX_PRECISION
                    ))
                })?;
            return Ok(ABIType::UFixed(bits, precision));
        }
        if let Some(content) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
            let children = parse_tuple_content(content)?
                .iter()
                .map(|child| child.parse())
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(ABIType::Tuple(children));
        }
        match s {
            "bool" => Ok(ABIType::Bool),
            "byte" => Ok(ABIType::Byte),
            "string" => Ok(ABIType::String),
            "address" => Ok(ABIType::Address),
            _ => Err(ABIError::validation(format!("Unknown ABI type {}", s))),
        }
    }
}

fn parse_bit_size(type_str: &str, bits: &str) -> Result<u16, ABIError> {
    bits.parse::<u16>()
        .ok()
        .filter(|b| *b >= 8 && *b <= MAX_BIT_SIZE && b % 8 == 0)
        .ok_or_else(|| {
            ABIError::validation(format!(
                "Bit size of {} must be a multiple of 8 between 8 and {}",
                type_str, MAX_BIT_SIZE
            ))
        })
}

impl Display for ABIType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ABIType::Uint(bits) => write!(f, "uint{}", bits),
            ABIType::UFixed(bits, precision) => write!(f, "ufixed{}x{}", bits, precision),
            ABIType::Bool => write!(f, "bool"),
            ABIType::Byte => write!(f, "byte"),
            ABIType::String => write!(f, "string"),
            ABIType::Address => write!(f, "address"),
            ABIType::StaticArray(child, len) => write!(f, "{}[{}]", child, len),
            ABIType::DynamicArray(child) => write!(f, "{}[]", child),
            ABIType::Tuple(children) => {
                let inner = children
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "({})", inner)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn t(s: &str) -> ABIType {
        ABIType::from_str(s).unwrap()
    }

    #[rstest]
    #[case("uint64")]
    #[case("ufixed128x10")]
    #[case("bool[3]")]
    #[case("byte[]")]
    #[case("(uint64,(string,bool),address)[2]")]
    #[case("()")]
    #[case("string[][4]")]
    fn parse_display_round_trip(#[case] input: &str) {
        assert_eq!(t(input).to_string(), input);
    }

    #[rstest]
    #[case("uint7")]
    #[case("uint520")]
    #[case("ufixed64x0")]
    #[case("ufixed64x161")]
    #[case("(uint64,)")]
    #[case("(uint64")]
    #[case("float")]
    fn invalid_types(#[case] input: &str) {
        assert!(ABIType::from_str(input).is_err());
    }

    #[rstest]
    #[case("uint64", 8)]
    #[case("bool", 1)]
    #[case("bool[9]", 2)]
    #[case("(bool,bool,uint8,bool)", 3)]
    #[case("address[2]", 64)]
    fn static_sizes(#[case] input: &str, #[case] size: usize) {
        assert_eq!(t(input).static_size().unwrap(), size);
    }

    #[test]
    fn dynamic_detection() {
        assert!(t("(uint64,string)").is_dynamic());
        assert!(t("uint8[][2]").is_dynamic());
        assert!(!t("(uint64,bool[2])").is_dynamic());
        assert!(t("string").static_size().is_err());
    }

    #[rstest]
    #[case("uint64", ABIValue::from(1u64), "0000000000000001")]
    #[case("uint8", ABIValue::from(255u8), "ff")]
    #[case("bool", ABIValue::from(true), "80")]
    #[case("string", ABIValue::from("hi"), "00026869")]
    #[case(
        "bool[3]",
        ABIValue::Array(vec![true.into(), false.into(), true.into()]),
        "a0"
    )]
    #[case(
        "uint16[]",
        ABIValue::Array(vec![1u16.into(), 2u16.into()]),
        "000200010002"
    )]
    #[case(
        "(uint16,string,bool,bool)",
        ABIValue::Array(vec![7u16.into(), "ab".into(), true.into(), true.into()]),
        "00070005c000026162"
    )]
    #[case(
        "(string,string)",
        ABIValue::Array(vec!["a".into(), "bc".into()]),
        "00040007000161000262 63"
    )]
    fn encode_and_decode_vectors(
        #[case] type_str: &str,
        #[case] value: ABIValue,
        #[case] expected_hex: &str,
    ) {
        let abi_type = t(type_str);
        let expected = hex::decode(expected_hex.replace(' ', "")).unwrap();
        let encoded = abi_type.encode(&value).unwrap();
        assert_eq!(encoded, expected);
        assert_eq!(abi_type.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn bool_packing_in_tuple() {
        let abi_type = t("(bool,bool,uint8,bool)");
        let value = ABIValue::Array(vec![true.into(), true.into(), 3u8.into(), false.into()]);
        assert_eq!(abi_type.encode(&value).unwrap(), vec![0xc0, 0x03, 0x00]);
    }

    #[test]
    fn address_encodes_to_public_key() {
        let zero = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";
        let encoded = ABIType::Address
            .encode(&ABIValue::from_address(zero))
            .unwrap();
        assert_eq!(encoded, vec![0u8; 32]);
    }

    #[test]
    fn mismatched_value_fails() {
        let err = ABIType::Uint(64).encode(&ABIValue::from("x")).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @r#"ABI encoding failed: Cannot encode String("x") as uint64"#);
    }

    #[test]
    fn uint_overflow_fails() {
        assert!(ABIType::Uint(8).encode(&ABIValue::from(256u32)).is_err());
    }

    #[test]
    fn truncated_input_fails() {
        assert!(t("(uint64,uint64)").decode(&[0u8; 15]).is_err());
        assert!(t("string").decode(&[0, 5, b'a']).is_err());
    }
}
