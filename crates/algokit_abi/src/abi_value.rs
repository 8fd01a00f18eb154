use num_bigint::BigUint;

/// A decoded or to-be-encoded ARC-4 value.
///
/// Tuples, static arrays and dynamic arrays all share the `Array` variant; the
/// [`ABIType`](crate::ABIType) used alongside the value decides the layout.
#[derive(Debug, Clone, PartialEq)]
pub enum ABIValue {
    Bool(bool),
    /// Also carries `ufixed` values as their raw integer.
    Uint(BigUint),
    String(String),
    Byte(u8),
    Array(Vec<ABIValue>),
    /// Base32 Algorand address.
    Address(String),
}

macro_rules! uint_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ABIValue {
                fn from(value: $ty) -> Self {
                    ABIValue::Uint(BigUint::from(value))
                }
            }
        )*
    };
}

uint_from!(u8, u16, u32, u64, u128, usize);

impl From<bool> for ABIValue {
    fn from(value: bool) -> Self {
        ABIValue::Bool(value)
    }
}

impl From<BigUint> for ABIValue {
    fn from(value: BigUint) -> Self {
        ABIValue::Uint(value)
    }
}

impl From<String> for ABIValue {
    fn from(value: String) -> Self {
        ABIValue::String(value)
    }
}

impl From<&str> for ABIValue {
    fn from(value: &str) -> Self {
        ABIValue::String(value.to_string())
    }
}

impl From<Vec<ABIValue>> for ABIValue {
    fn from(value: Vec<ABIValue>) -> Self {
        ABIValue::Array(value)
    }
}

impl ABIValue {
    pub fn from_address<S: Into<String>>(value: S) -> Self {
        ABIValue::Address(value.into())
    }

    /// Builds a `byte[]` / `byte[N]` value from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        ABIValue::Array(bytes.iter().copied().map(ABIValue::Byte).collect())
    }

    /// Returns the value as a `u64` when it is a `Uint` that fits.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ABIValue::Uint(value) => u64::try_from(value).ok(),
            _ => None,
        }
    }
}
