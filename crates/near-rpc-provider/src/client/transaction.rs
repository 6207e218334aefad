//! Broadcast transactions and their receipts.

use std::time::Duration;

use super::provider::NearRpcProvider;
use super::retry::retry;
use crate::error::Error;
use crate::types::{AccountId, Action, CryptoHash, ExecutionStatus, NearGas, Transaction};

/// A transaction accepted by `broadcast_tx_async` but not yet known to be
/// included.
#[derive(Clone, Debug)]
pub struct TransactionResponse {
    provider: NearRpcProvider,
    /// Hash the node returned for the broadcast.
    pub hash: String,
    pub from: AccountId,
    pub to: AccountId,
    pub nonce: u64,
    pub actions: Vec<Action>,
    pub chain_id: u64,
    /// Final block height observed right after broadcasting.
    pub block_number: u64,
    /// Always zero; inclusion is learned through [`TransactionResponse::wait`].
    pub confirmations: usize,
}

/// Outcome of an included transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    /// Block the transaction was included in.
    pub block_hash: CryptoHash,
    /// Height observed at broadcast time.
    pub block_number: u64,
    pub from: AccountId,
    pub to: AccountId,
    /// Number of receipt outcomes the transaction produced.
    pub confirmations: usize,
    /// Gas burnt converting the transaction to a receipt.
    pub gas_used: NearGas,
    pub status: ExecutionStatus,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl TransactionResponse {
    pub(crate) fn new(
        provider: NearRpcProvider,
        hash: String,
        transaction: Transaction,
        chain_id: u64,
        block_number: u64,
    ) -> Self {
        Self {
            provider,
            hash,
            from: transaction.signer_id,
            to: transaction.receiver_id,
            nonce: transaction.nonce,
            actions: transaction.actions,
            chain_id,
            block_number,
            confirmations: 0,
        }
    }

    /// Fetch the execution outcome once.
    ///
    /// Fails with the node's error if the transaction is not yet known.
    pub async fn wait(&self) -> Result<TransactionReceipt, Error> {
        let outcome = self
            .provider
            .get_transaction_status(&self.hash, &self.from)
            .await?;

        Ok(TransactionReceipt {
            transaction_hash: self.hash.clone(),
            block_hash: outcome.transaction_outcome.block_hash,
            block_number: self.block_number,
            from: self.from.clone(),
            to: self.to.clone(),
            confirmations: outcome.receipts_outcome.len(),
            gas_used: NearGas::from_gas(outcome.transaction_outcome.outcome.gas_burnt),
            status: outcome.status,
        })
    }

    /// Poll [`wait`](Self::wait) until it succeeds, retrying up to
    /// `max_attempts` times with a fixed `delay`.
    pub async fn wait_with_retry(
        &self,
        max_attempts: u32,
        delay: Duration,
    ) -> Result<TransactionReceipt, Error> {
        retry(|()| self.wait(), max_attempts, move |_| delay)
            .call(())
            .await
    }
}
