use crate::{
    ALGORAND_SIGNATURE_BYTE_LENGTH, ALGORAND_SIGNATURE_ENCODING_INCR, AlgoKitTransactError,
    AlgorandMsgpack, EstimateTransactionSize, MAX_TX_GROUP_SIZE, SignedTransaction, Transaction,
    TransactionId, Transactions,
    test_utils::{TransactionGroupMother, TransactionHeaderMother, TransactionMother},
    transactions::FeeParams,
};
use base64::{Engine, prelude::BASE64_STANDARD};
use pretty_assertions::assert_eq;

fn decode_group(encoded: &str) -> [u8; 32] {
    BASE64_STANDARD
        .decode(encoded)
        .unwrap()
        .try_into()
        .unwrap()
}

#[test]
fn test_payment_transaction_encoding() {
    let payment_tx = TransactionMother::simple_payment().build().unwrap();

    let encoded = payment_tx.encode().unwrap();
    let decoded = Transaction::decode(&encoded).unwrap();
    assert_eq!(decoded, payment_tx);

    let raw_encoded = payment_tx.encode_raw().unwrap();
    assert_eq!(&encoded[..2], b"TX");
    assert_eq!(encoded[2..], raw_encoded);
    assert_eq!(encoded.len(), 174);
}

#[test]
fn test_signed_transaction_encoding() {
    let payment_tx = TransactionMother::simple_payment().build().unwrap();
    let signed_tx = SignedTransaction {
        transaction: payment_tx.clone(),
        signature: Some([0; ALGORAND_SIGNATURE_BYTE_LENGTH]),
        auth_address: None,
    };

    let encoded_stx = signed_tx.encode().unwrap();
    assert_eq!(encoded_stx.len(), 247);
    let decoded_stx = SignedTransaction::decode(&encoded_stx).unwrap();
    assert_eq!(decoded_stx, signed_tx);
}

#[test]
fn test_pay_transaction_id() {
    let expected_tx_id_raw = [
        35, 93, 0, 170, 96, 221, 1, 74, 119, 147, 131, 116, 7, 31, 225, 40, 215, 47, 44, 120, 128,
        245, 41, 65, 116, 255, 147, 64, 90, 80, 147, 223,
    ];
    let expected_tx_id = "ENOQBKTA3UAUU54TQN2AOH7BFDLS6LDYQD2SSQLU76JUAWSQSPPQ";

    let payment_tx = TransactionMother::payment_with_note().build().unwrap();
    let signed_tx = SignedTransaction {
        transaction: payment_tx.clone(),
        signature: Some([0; ALGORAND_SIGNATURE_BYTE_LENGTH]),
        auth_address: None,
    };

    assert_eq!(payment_tx.id().unwrap(), expected_tx_id);
    assert_eq!(payment_tx.id_raw().unwrap(), expected_tx_id_raw);
    assert_eq!(signed_tx.id().unwrap(), expected_tx_id);
}

#[test]
fn test_estimate_transaction_size() {
    let payment_tx = TransactionMother::simple_payment().build().unwrap();
    let estimation = payment_tx.estimate_size().unwrap();

    let signed_tx = SignedTransaction {
        transaction: payment_tx.clone(),
        signature: Some([0; ALGORAND_SIGNATURE_BYTE_LENGTH]),
        auth_address: None,
    };

    assert_eq!(
        estimation,
        payment_tx.encode_raw().unwrap().len() + ALGORAND_SIGNATURE_ENCODING_INCR
    );
    assert_eq!(estimation, signed_tx.encode().unwrap().len());
}

#[test]
fn test_min_fee() {
    let txn = TransactionMother::simple_payment().build().unwrap();

    let updated = txn
        .assign_fee(FeeParams {
            fee_per_byte: 0,
            min_fee: 1000,
            extra_fee: None,
            max_fee: None,
        })
        .unwrap();
    assert_eq!(updated.header().fee, Some(1000));
}

#[test]
fn test_extra_fee() {
    let txn = TransactionMother::simple_payment().build().unwrap();

    let updated = txn
        .assign_fee(FeeParams {
            fee_per_byte: 1,
            min_fee: 1000,
            extra_fee: Some(500),
            max_fee: None,
        })
        .unwrap();
    assert_eq!(updated.header().fee, Some(1500));
}

#[test]
fn test_calculate_fee() {
    let txn = TransactionMother::simple_payment().build().unwrap();

    let updated = txn
        .assign_fee(FeeParams {
            fee_per_byte: 5,
            min_fee: 1000,
            extra_fee: None,
            max_fee: None,
        })
        .unwrap();

    assert_eq!(updated.header().fee, Some(1235));
}

#[test]
fn test_max_fee() {
    let txn = TransactionMother::simple_payment().build().unwrap();

    let err = txn
        .assign_fee(FeeParams {
            fee_per_byte: 10,
            min_fee: 500,
            extra_fee: None,
            max_fee: Some(1000),
        })
        .unwrap_err();

    assert!(matches!(
        err,
        AlgoKitTransactError::FeeExceedsMax {
            fee: 2470,
            max_fee: 1000
        }
    ));
    assert_eq!(
        err.to_string(),
        "Transaction fee 2470 µALGO is greater than max fee 1000 µALGO"
    );
}

#[test]
fn test_multi_transaction_group() {
    let expected_group = decode_group("uJA6BWzZ5g7Ve0FersqCLWsrEstt6p0+F3bNGEKH3I4=");
    let txs = TransactionGroupMother::testnet_payment_group();

    let grouped_txs = txs.as_slice().assign_group().unwrap();

    assert_eq!(grouped_txs.len(), txs.len());
    for grouped_tx in grouped_txs.iter() {
        assert_eq!(grouped_tx.header().group.unwrap(), expected_group);
    }
    assert_eq!(
        &grouped_txs[0].id().unwrap(),
        "6SIXGV2TELA2M5RHZ72CVKLBSJ2OPUAKYFTUUE27O23RN6TFMGHQ"
    );
    assert_eq!(
        &grouped_txs[1].id().unwrap(),
        "7OY3VQXJCDSKPMGEFJMNJL2L3XIOMRM2U7DM2L54CC7QM5YBFQEA"
    );
}

#[test]
fn test_single_transaction_group() {
    let expected_group = decode_group("LLW3AwgyXbwoMMBNfLSAGHtqoKtj/c7MjNMR0MGW6sg=");

    let grouped_txs = TransactionGroupMother::group_of(1).assign_group().unwrap();

    assert_eq!(grouped_txs.len(), 1);
    assert_eq!(grouped_txs[0].header().group.unwrap(), expected_group);
}

#[test]
fn test_transaction_group_too_big() {
    let error = TransactionGroupMother::group_of(MAX_TX_GROUP_SIZE + 1)
        .assign_group()
        .unwrap_err();

    assert!(
        error
            .to_string()
            .starts_with("Transaction group size exceeds the max limit")
    );
}

#[test]
fn test_transaction_group_too_small() {
    let error = TransactionGroupMother::group_of(0)
        .assign_group()
        .unwrap_err();

    assert!(
        error
            .to_string()
            .starts_with("Transaction group size cannot be 0")
    );
}

#[test]
fn test_transaction_group_already_set() {
    let tx = TransactionMother::simple_payment()
        .header(
            TransactionHeaderMother::simple_testnet()
                .group(decode_group("y1Hz6KZhHJI4TZLwZqXO3TFgXVQdD/1+c6BLk3wTW6Q="))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let error = vec![tx].assign_group().unwrap_err();

    assert!(
        error
            .to_string()
            .starts_with("Transactions must not already be grouped")
    );
}

#[test]
fn test_signed_transaction_group_encoding() {
    let signed_group = TransactionGroupMother::testnet_payment_group()
        .assign_group()
        .unwrap()
        .into_iter()
        .map(|tx| SignedTransaction {
            transaction: tx,
            signature: Some([0; ALGORAND_SIGNATURE_BYTE_LENGTH]),
            auth_address: None,
        })
        .collect::<Vec<_>>();

    for signed in signed_group.iter() {
        let encoded = signed.encode().unwrap();
        assert_eq!(&SignedTransaction::decode(&encoded).unwrap(), signed);
    }
}
