use regex::Regex;
use std::sync::LazyLock;

pub const LENGTH_ENCODE_BYTE_SIZE: usize = 2;
pub const ADDRESS_BYTE_LENGTH: usize = 32;
pub const ADDRESS_CHECKSUM_LENGTH: usize = 4;
pub const ADDRESS_STRING_LENGTH: usize = 58;

pub const BOOL_TRUE_BYTE: u8 = 0x80;
pub const BOOL_FALSE_BYTE: u8 = 0x00;
pub const BOOLS_PER_BYTE: usize = 8;

pub const MAX_BIT_SIZE: u16 = 512;
pub const MAX_PRECISION: u8 = 160;

pub const VOID_RETURN_TYPE: &str = "void";
pub const METHOD_SELECTOR_LENGTH: usize = 4;

/// Prefix of the log line carrying an ARC-4 method return value.
pub const ABI_RETURN_PREFIX: [u8; 4] = [0x15, 0x1f, 0x7c, 0x75];

/// Application args left for method arguments once the selector is counted.
/// Arguments beyond this are packed into a tuple in the final slot.
pub const MAX_METHOD_ARGS: usize = 15;

pub static STATIC_ARRAY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z\d\[\](),]+)\[(0|[1-9][\d]*)]$").expect("Invalid static array regex")
});

pub static UFIXED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ufixed([1-9][\d]*)x([1-9][\d]*)$").expect("Invalid ufixed regex")
});
