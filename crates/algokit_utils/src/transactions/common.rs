use super::composer::ComposerError;
use crate::clients::SuggestedParams;
use algokit_transact::{
    Address, AlgoKitTransactError, FeeParams, SignedTransaction, Transaction, TransactionHeader,
};
use async_trait::async_trait;
use derive_more::Debug;
use std::sync::Arc;

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Signs the transactions at `indices`, returning them in the same order.
    async fn sign_transactions(
        &self,
        transactions: &[Transaction],
        indices: &[usize],
    ) -> Result<Vec<SignedTransaction>, String>;

    async fn sign_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<SignedTransaction, String> {
        let mut signed = self
            .sign_transactions(std::slice::from_ref(transaction), &[0])
            .await?;
        signed
            .pop()
            .ok_or_else(|| "Signer returned no transactions".to_string())
    }
}

/// Resolves the signer for a sender when an intent does not carry one.
pub trait TransactionSignerGetter: Send + Sync {
    fn get_signer(&self, address: &Address) -> Option<Arc<dyn TransactionSigner>>;
}

/// Attaches an all-zero signature. Useful for simulation and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySigner;

#[async_trait]
impl TransactionSigner for EmptySigner {
    async fn sign_transactions(
        &self,
        transactions: &[Transaction],
        indices: &[usize],
    ) -> Result<Vec<SignedTransaction>, String> {
        indices
            .iter()
            .map(|&idx| {
                transactions
                    .get(idx)
                    .map(|transaction| SignedTransaction {
                        transaction: transaction.clone(),
                        signature: Some([0; 64]),
                        auth_address: None,
                    })
                    .ok_or_else(|| format!("Index {} out of bounds for transactions", idx))
            })
            .collect()
    }
}

impl TransactionSignerGetter for EmptySigner {
    fn get_signer(&self, _address: &Address) -> Option<Arc<dyn TransactionSigner>> {
        Some(Arc::new(EmptySigner))
    }
}

#[derive(Debug, Clone)]
pub struct TransactionWithSigner {
    pub transaction: Transaction,
    #[debug(skip)]
    pub signer: Arc<dyn TransactionSigner>,
}

/// Fields shared by every transaction intent.
#[derive(Debug, Default, Clone)]
pub struct CommonParams {
    pub sender: Address,
    #[debug(skip)]
    pub signer: Option<Arc<dyn TransactionSigner>>,
    pub rekey_to: Option<Address>,
    pub note: Option<Vec<u8>>,
    pub lease: Option<[u8; 32]>,
    /// Exact fee in µALGO. Cannot be combined with `extra_fee`.
    pub static_fee: Option<u64>,
    /// Added on top of the network fee.
    pub extra_fee: Option<u64>,
    /// Ceiling for the final fee.
    pub max_fee: Option<u64>,
    /// Number of rounds after the first valid round the transaction stays valid for.
    pub validity_window: Option<u64>,
    pub first_valid_round: Option<u64>,
    pub last_valid_round: Option<u64>,
}

impl CommonParams {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            ..Default::default()
        }
    }

    pub(crate) fn validate_fee_policy(&self) -> Result<(), ComposerError> {
        if self.static_fee.is_some() && self.extra_fee.is_some() {
            return Err(ComposerError::ConfigurationError {
                first: "static_fee".to_string(),
                second: "extra_fee".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn build_header(
        &self,
        suggested_params: &SuggestedParams,
        default_validity_window: u64,
    ) -> TransactionHeader {
        let first_valid = self
            .first_valid_round
            .unwrap_or(suggested_params.first_valid);
        let last_valid = self.last_valid_round.unwrap_or_else(|| {
            first_valid + self.validity_window.unwrap_or(default_validity_window)
        });

        TransactionHeader {
            sender: self.sender.clone(),
            fee: None,
            first_valid,
            last_valid,
            genesis_hash: Some(suggested_params.genesis_hash),
            genesis_id: Some(suggested_params.genesis_id.clone()),
            note: self.note.clone(),
            rekey_to: self.rekey_to.clone(),
            lease: self.lease,
            group: None,
        }
    }

    /// A static fee is used verbatim; otherwise the fee is derived from the size of the
    /// transaction. Both are checked against `max_fee`.
    pub(crate) fn apply_fee(
        &self,
        mut transaction: Transaction,
        suggested_params: &SuggestedParams,
    ) -> Result<Transaction, ComposerError> {
        if let Some(fee) = self.static_fee {
            if let Some(max_fee) = self.max_fee.filter(|max_fee| fee > *max_fee) {
                return Err(ComposerError::FeeLimitExceeded { fee, max_fee });
            }
            transaction.header_mut().fee = Some(fee);
            return Ok(transaction);
        }

        transaction
            .assign_fee(FeeParams {
                fee_per_byte: suggested_params.fee_per_byte,
                min_fee: suggested_params.min_fee,
                extra_fee: self.extra_fee,
                max_fee: self.max_fee,
            })
            .map_err(|e| match e {
                AlgoKitTransactError::FeeExceedsMax { fee, max_fee } => {
                    ComposerError::FeeLimitExceeded { fee, max_fee }
                }
                other => other.into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algokit_transact::test_utils::{AccountMother, TransactionMother};
    use rstest::rstest;

    fn suggested_params() -> SuggestedParams {
        SuggestedParams {
            fee_per_byte: 0,
            min_fee: 1000,
            first_valid: 500,
            genesis_id: "testnet-v1.0".to_string(),
            genesis_hash: [7; 32],
            consensus_version: "v40".to_string(),
        }
    }

    fn payment() -> Transaction {
        TransactionMother::simple_payment().build().unwrap()
    }

    #[rstest]
    #[case(None, None, None, 500, 510)]
    #[case(None, None, Some(20), 500, 520)]
    #[case(Some(600), None, None, 600, 610)]
    #[case(Some(600), Some(650), Some(20), 600, 650)]
    #[case(None, Some(505), None, 500, 505)]
    fn validity_window_is_resolved(
        #[case] first_valid_round: Option<u64>,
        #[case] last_valid_round: Option<u64>,
        #[case] validity_window: Option<u64>,
        #[case] first_valid: u64,
        #[case] last_valid: u64,
    ) {
        let params = CommonParams {
            first_valid_round,
            last_valid_round,
            validity_window,
            ..CommonParams::new(AccountMother::account())
        };

        let header = params.build_header(&suggested_params(), 10);

        assert_eq!(header.first_valid, first_valid);
        assert_eq!(header.last_valid, last_valid);
    }

    #[test]
    fn header_carries_optional_fields() {
        let params = CommonParams {
            note: Some(b"hello".to_vec()),
            lease: Some([1; 32]),
            rekey_to: Some(AccountMother::neil()),
            ..CommonParams::new(AccountMother::account())
        };

        let header = params.build_header(&suggested_params(), 10);

        assert_eq!(header.note.as_deref(), Some(&b"hello"[..]));
        assert_eq!(header.lease, Some([1; 32]));
        assert_eq!(header.rekey_to, Some(AccountMother::neil()));
        assert_eq!(header.genesis_hash, Some([7; 32]));
        assert_eq!(header.genesis_id.as_deref(), Some("testnet-v1.0"));
        assert_eq!(header.fee, None);
        assert_eq!(header.group, None);
    }

    #[test]
    fn static_and_extra_fee_are_exclusive() {
        let params = CommonParams {
            static_fee: Some(0),
            extra_fee: Some(5),
            ..Default::default()
        };

        let err = params.validate_fee_policy().unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Only one of static_fee or extra_fee may be set");
    }

    #[rstest]
    #[case(None, None, 1000)]
    #[case(None, Some(500), 1500)]
    #[case(Some(2500), None, 2500)]
    #[case(Some(0), None, 0)]
    fn fee_policy(
        #[case] static_fee: Option<u64>,
        #[case] extra_fee: Option<u64>,
        #[case] fee: u64,
    ) {
        let params = CommonParams {
            static_fee,
            extra_fee,
            ..Default::default()
        };

        let transaction = params.apply_fee(payment(), &suggested_params()).unwrap();

        assert_eq!(transaction.header().fee, Some(fee));
    }

    #[rstest]
    #[case(None, Some(500), 1500)]
    #[case(Some(3000), None, 3000)]
    fn fee_over_max_is_rejected(
        #[case] static_fee: Option<u64>,
        #[case] extra_fee: Option<u64>,
        #[case] expected_fee: u64,
    ) {
        let params = CommonParams {
            static_fee,
            extra_fee,
            max_fee: Some(1200),
            ..Default::default()
        };

        let err = params
            .apply_fee(payment(), &suggested_params())
            .unwrap_err();

        assert!(matches!(
            err,
            ComposerError::FeeLimitExceeded { fee, max_fee: 1200 } if fee == expected_fee
        ));
    }

    #[tokio::test]
    async fn empty_signer_rejects_out_of_range_index() {
        let transactions = vec![payment()];

        let signed = EmptySigner
            .sign_transactions(&transactions, &[0])
            .await
            .unwrap();
        assert_eq!(signed[0].signature, Some([0; 64]));

        let err = EmptySigner
            .sign_transactions(&transactions, &[1])
            .await
            .unwrap_err();
        assert_eq!(err, "Index 1 out of bounds for transactions");
    }
}
