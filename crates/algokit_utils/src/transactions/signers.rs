use super::common::{TransactionSigner, TransactionSignerGetter};
use algokit_transact::{Address, AlgorandMsgpack, SignedTransaction, Transaction};
use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::sync::Arc;

/// Signs with a single ed25519 key.
///
/// Transactions whose sender is not the key's own address are treated as signed on behalf
/// of a rekeyed account and carry the key's address as the auth address.
#[derive(Clone)]
pub struct KeyPairSigner {
    signing_key: SigningKey,
    address: Address,
}

impl KeyPairSigner {
    pub fn new(signing_key: SigningKey) -> Self {
        let address = Address(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            address,
        }
    }

    pub fn generate() -> Self {
        Self::new(SigningKey::generate(&mut OsRng))
    }

    pub fn from_secret_key(secret_key: &[u8; 32]) -> Self {
        Self::new(SigningKey::from_bytes(secret_key))
    }

    pub fn address(&self) -> Address {
        self.address.clone()
    }
}

impl std::fmt::Debug for KeyPairSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPairSigner")
            .field("address", &self.address.to_string())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TransactionSigner for KeyPairSigner {
    async fn sign_transactions(
        &self,
        transactions: &[Transaction],
        indices: &[usize],
    ) -> Result<Vec<SignedTransaction>, String> {
        indices
            .iter()
            .map(|&idx| {
                let transaction = transactions
                    .get(idx)
                    .ok_or_else(|| format!("Index {} out of bounds for transactions", idx))?;
                let bytes = transaction.encode().map_err(|e| e.to_string())?;
                let signature = self.signing_key.sign(&bytes);
                let auth_address =
                    (transaction.header().sender != self.address).then(|| self.address.clone());

                Ok(SignedTransaction {
                    transaction: transaction.clone(),
                    signature: Some(signature.to_bytes()),
                    auth_address,
                })
            })
            .collect()
    }
}

/// Looks signers up by address, falling back to an optional default.
#[derive(Clone, Default)]
pub struct SignerMap {
    signers: HashMap<Address, Arc<dyn TransactionSigner>>,
    default_signer: Option<Arc<dyn TransactionSigner>>,
}

impl SignerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default_signer: Arc<dyn TransactionSigner>) -> Self {
        Self {
            signers: HashMap::new(),
            default_signer: Some(default_signer),
        }
    }

    pub fn insert(&mut self, address: Address, signer: Arc<dyn TransactionSigner>) -> &mut Self {
        self.signers.insert(address, signer);
        self
    }

    /// Registers the key pair under its own address and returns that address.
    pub fn add_key_pair(&mut self, key_pair: KeyPairSigner) -> Address {
        let address = key_pair.address();
        self.signers.insert(address.clone(), Arc::new(key_pair));
        address
    }
}

impl TransactionSignerGetter for SignerMap {
    fn get_signer(&self, address: &Address) -> Option<Arc<dyn TransactionSigner>> {
        self.signers
            .get(address)
            .or(self.default_signer.as_ref())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::common::EmptySigner;
    use algokit_transact::test_utils::{AccountMother, TransactionMother};
    use ed25519_dalek::{Signature, Verifier};

    fn payment_from(sender: Address) -> Transaction {
        let mut transaction = TransactionMother::simple_payment().build().unwrap();
        transaction.header_mut().sender = sender;
        transaction
    }

    #[tokio::test]
    async fn signature_verifies_against_prefixed_bytes() {
        let signer = KeyPairSigner::from_secret_key(&[9; 32]);
        let transaction = payment_from(signer.address());

        let signed = signer.sign_transaction(&transaction).await.unwrap();

        let signature = Signature::from_bytes(&signed.signature.unwrap());
        signer
            .signing_key
            .verifying_key()
            .verify(&transaction.encode().unwrap(), &signature)
            .unwrap();
        assert_eq!(signed.auth_address, None);
    }

    #[tokio::test]
    async fn signing_for_another_sender_sets_auth_address() {
        let signer = KeyPairSigner::generate();
        let transaction = payment_from(AccountMother::neil());

        let signed = signer.sign_transaction(&transaction).await.unwrap();

        assert_eq!(signed.auth_address, Some(signer.address()));
    }

    #[test]
    fn signer_map_falls_back_to_default() {
        let mut signers = SignerMap::new();
        let address = signers.add_key_pair(KeyPairSigner::generate());

        assert!(signers.get_signer(&address).is_some());
        assert!(signers.get_signer(&AccountMother::neil()).is_none());

        let with_default = SignerMap::with_default(Arc::new(EmptySigner));
        assert!(with_default.get_signer(&AccountMother::neil()).is_some());
    }
}
