//! Unsigned and signed transactions in their borsh wire form.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use borsh::{BorshDeserialize, BorshSerialize};
use near_account_id::AccountId;

use super::{Action, CryptoHash, PublicKey, SecretKey, Signature};
use crate::error::Error;

fn encode<T: BorshSerialize>(value: &T) -> Result<Vec<u8>, Error> {
    borsh::to_vec(value)
        .map_err(|e| Error::InvalidTransaction(format!("failed to serialize: {e}")))
}

/// A transaction before signing.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Transaction {
    pub signer_id: AccountId,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub receiver_id: AccountId,
    /// Recent block hash bounding the transaction's validity.
    pub block_hash: CryptoHash,
    pub actions: Vec<Action>,
}

impl Transaction {
    /// SHA-256 of the borsh encoding; the transaction hash.
    pub fn hash(&self) -> Result<CryptoHash, Error> {
        Ok(CryptoHash::hash(&encode(self)?))
    }

    /// Sign the transaction hash with `key`.
    pub fn sign(self, key: &SecretKey) -> Result<SignedTransaction, Error> {
        let signature = key.sign(self.hash()?.as_bytes());
        Ok(SignedTransaction {
            transaction: self,
            signature,
        })
    }
}

/// A transaction with its signature, as submitted to `broadcast_tx_async`.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Hash of the inner transaction.
    pub fn hash(&self) -> Result<CryptoHash, Error> {
        self.transaction.hash()
    }

    /// Borsh bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        encode(self)
    }

    /// Standard base64 of the borsh bytes.
    pub fn to_base64(&self) -> Result<String, Error> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    /// Decode borsh bytes. Trailing bytes are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        borsh::from_slice(bytes).map_err(|e| {
            Error::InvalidTransaction(format!("failed to deserialize signed transaction: {e}"))
        })
    }

    /// Decode standard base64 of the borsh bytes.
    pub fn from_base64(s: &str) -> Result<Self, Error> {
        let bytes = STANDARD
            .decode(s.trim())
            .map_err(|e| Error::InvalidTransaction(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Returns true if the signature matches the signer's public key.
    pub fn verify(&self) -> bool {
        self.hash().is_ok_and(|hash| {
            self.transaction
                .public_key
                .verify(hash.as_bytes(), &self.signature)
        })
    }
}
