use algokit_transact::{Address, PaymentTransactionFields, Transaction, TransactionHeader};

use super::common::CommonParams;

/// Parameters for a payment of ALGO.
#[derive(Debug, Default, Clone)]
pub struct PaymentParams {
    pub common_params: CommonParams,
    pub receiver: Address,
    /// In µALGO (1 ALGO = 1,000,000 µALGO).
    pub amount: u64,
}

/// Parameters for closing an account, sending its whole remaining balance elsewhere.
#[derive(Debug, Default, Clone)]
pub struct AccountCloseParams {
    pub common_params: CommonParams,
    pub close_remainder_to: Address,
}

pub fn build_payment(params: &PaymentParams, header: TransactionHeader) -> Transaction {
    Transaction::Payment(PaymentTransactionFields {
        header,
        receiver: params.receiver.clone(),
        amount: params.amount,
        close_remainder_to: None,
    })
}

/// A zero payment to self that closes out to `close_remainder_to`.
pub fn build_account_close(params: &AccountCloseParams, header: TransactionHeader) -> Transaction {
    let sender = header.sender.clone();
    Transaction::Payment(PaymentTransactionFields {
        header,
        receiver: sender,
        amount: 0,
        close_remainder_to: Some(params.close_remainder_to.clone()),
    })
}
