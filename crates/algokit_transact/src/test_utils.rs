//! Fixtures built from real TestNet transactions.

use crate::{
    Address, AssetTransferTransactionBuilder, PaymentTransactionBuilder, Transaction,
    TransactionHeaderBuilder,
};
use base64::{Engine, prelude::BASE64_STANDARD};

fn genesis_hash(encoded: &str) -> [u8; 32] {
    BASE64_STANDARD
        .decode(encoded)
        .unwrap()
        .try_into()
        .unwrap()
}

pub struct TransactionHeaderMother {}
impl TransactionHeaderMother {
    pub fn testnet() -> TransactionHeaderBuilder {
        TransactionHeaderBuilder::default()
            .genesis_id(String::from("testnet-v1.0"))
            .genesis_hash(genesis_hash("SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI="))
            .fee(1000)
            .to_owned()
    }

    pub fn simple_testnet() -> TransactionHeaderBuilder {
        Self::testnet()
            .sender(AccountMother::account())
            .first_valid(50659540)
            .last_valid(50660540)
            .to_owned()
    }

    pub fn example() -> TransactionHeaderBuilder {
        TransactionHeaderBuilder::default()
            .genesis_id(String::from("example"))
            .genesis_hash(genesis_hash("3r2+nRwL99aTROTiOtPEeUQarv2fATkmNliHqfGxNJA="))
            .first_valid(1)
            .last_valid(999)
            .fee(1000)
            .sender(AccountMother::example())
            .to_owned()
    }
}

pub struct TransactionMother {}
impl TransactionMother {
    pub fn simple_payment() -> PaymentTransactionBuilder {
        PaymentTransactionBuilder::default()
            .header(TransactionHeaderMother::simple_testnet().build().unwrap())
            .amount(101000)
            .receiver(
                "VXH5UP6JLU2CGIYPUFZ4Z5OTLJCLMA5EXD3YHTMVNDE5P7ILZ324FSYSPQ"
                    .parse()
                    .unwrap(),
            )
            .to_owned()
    }

    pub fn payment_with_note() -> PaymentTransactionBuilder {
        Self::simple_payment()
            .header(
                TransactionHeaderMother::simple_testnet()
                    .note(
                        BASE64_STANDARD
                            .decode("MGFhNTBkMjctYjhmNy00ZDc3LWExZmItNTUxZmQ1NWRmMmJj")
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            )
            .to_owned()
    }

    pub fn simple_asset_transfer() -> AssetTransferTransactionBuilder {
        AssetTransferTransactionBuilder::default()
            .header(
                TransactionHeaderMother::simple_testnet()
                    .sender(AccountMother::neil())
                    .first_valid(51183672)
                    .last_valid(51183872)
                    .build()
                    .unwrap(),
            )
            .asset_id(107686045)
            .amount(1000)
            .receiver(AccountMother::account())
            .to_owned()
    }

    pub fn opt_in_asset_transfer() -> AssetTransferTransactionBuilder {
        Self::simple_asset_transfer()
            .amount(0)
            .receiver(AccountMother::neil())
            .to_owned()
    }
}

pub struct AccountMother {}
impl AccountMother {
    pub fn account() -> Address {
        "RIMARGKZU46OZ77OLPDHHPUJ7YBSHRTCYMQUC64KZCCMESQAFQMYU6SL2Q"
            .parse()
            .unwrap()
    }

    pub fn neil() -> Address {
        "JB3K6HTAXODO4THESLNYTSG6GQUFNEVIQG7A6ZYVDACR6WA3ZF52TKU5NA"
            .parse()
            .unwrap()
    }

    pub fn example() -> Address {
        "ALGOC4J2BCZ33TCKSSAMV5GAXQBMV3HDCHDBSPRBZRNSR7BM2FFDZRFGXA"
            .parse()
            .unwrap()
    }
}

pub struct TransactionGroupMother {}
impl TransactionGroupMother {
    /// A real TestNet group of two payments.
    pub fn testnet_payment_group() -> Vec<Transaction> {
        let header_builder = TransactionHeaderMother::testnet()
            .sender(AccountMother::neil())
            .first_valid(51532821)
            .last_valid(51533021)
            .to_owned();

        [("VGVzdCAx", 1000000), ("VGVzdCAy", 200000)]
            .into_iter()
            .map(|(note, amount)| {
                PaymentTransactionBuilder::default()
                    .header(
                        header_builder
                            .clone()
                            .note(BASE64_STANDARD.decode(note).unwrap())
                            .build()
                            .unwrap(),
                    )
                    .receiver(AccountMother::neil())
                    .amount(amount)
                    .build()
                    .unwrap()
            })
            .collect()
    }

    pub fn group_of(number_of_transactions: usize) -> Vec<Transaction> {
        let header_builder = TransactionHeaderMother::testnet()
            .sender(AccountMother::neil())
            .first_valid(51532821)
            .last_valid(51533021)
            .to_owned();

        (0..number_of_transactions)
            .map(|i| {
                PaymentTransactionBuilder::default()
                    .header(
                        header_builder
                            .clone()
                            .note(format!("tx:{}", i).as_bytes().to_vec())
                            .build()
                            .unwrap(),
                    )
                    .receiver(AccountMother::neil())
                    .amount(200000)
                    .build()
                    .unwrap()
            })
            .collect()
    }
}
