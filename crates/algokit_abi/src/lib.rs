//! Encoding and decoding of Algorand ABI values as defined in [ARC-4](https://arc.algorand.foundation/ARCs/arc-0004),
//! plus the ARC-32 and ARC-56 application specifications.
pub mod abi_type;
pub mod abi_value;
pub mod arc32_contract;
pub mod arc56_contract;
pub mod constants;
pub mod error;
pub mod method;
pub mod utils;

pub use abi_type::ABIType;
pub use abi_value::ABIValue;
pub use arc32_contract::Arc32Contract;
pub use arc56_contract::*;
pub use error::ABIError;

pub use method::{
    ABIMethod, ABIMethodArg, ABIMethodArgType, ABIReferenceType, ABIReferenceValue, ABIReturn,
    ABITransactionType,
};
