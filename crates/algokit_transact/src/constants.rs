pub const HASH_BYTES_LENGTH: usize = 32;
pub const ALGORAND_CHECKSUM_BYTE_LENGTH: usize = 4;
pub const ALGORAND_ADDRESS_LENGTH: usize = 58;
pub const ALGORAND_PUBLIC_KEY_BYTE_LENGTH: usize = 32;
pub const ALGORAND_SIGNATURE_BYTE_LENGTH: usize = 64;
pub const ALGORAND_SIGNATURE_ENCODING_INCR: usize = 75;
pub type Byte32 = [u8; 32];
pub const MAX_TX_GROUP_SIZE: usize = 16;

pub const EMPTY_SIGNATURE: [u8; ALGORAND_SIGNATURE_BYTE_LENGTH] =
    [0; ALGORAND_SIGNATURE_BYTE_LENGTH];

// Application program size constraints
pub const MAX_EXTRA_PROGRAM_PAGES: u32 = 3;
pub const PROGRAM_PAGE_SIZE: usize = 2048; // In bytes

// Application reference limits
pub const MAX_APP_ARGS: usize = 16;
pub const MAX_ACCOUNT_REFERENCES: usize = 4;
pub const MAX_OVERALL_REFERENCES: usize = 8;
