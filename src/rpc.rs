//! Chain RPC capability
//!
//! The core depends on two capability groups only: account-data fetch and
//! transaction send/confirm. They are expressed as a trait so composer and
//! registry tests can substitute call-counting fakes, the same seam the
//! transaction pipeline uses for broadcasting.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};

use crate::error::{OrbitError, Result};

/// Read/submit capabilities the orchestrator needs from the chain
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Fetch raw account data; `None` when the account does not exist
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// Latest block reference for transaction construction
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Submit a signed transaction and await confirmation at the
    /// "confirmed" commitment level
    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature>;
}

/// Production implementation over the nonblocking Solana RPC client
pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    /// Connect at "confirmed" commitment: a small rollback probability is
    /// traded for lower confirmation latency
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url.into(), CommitmentConfig::confirmed()),
        }
    }

    /// Endpoint URL this client talks to
    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .map_err(|e| OrbitError::registry(format!("account fetch for {address}: {e}")))?;
        Ok(response.value.map(|account| account.data))
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| OrbitError::submission(format!("failed to fetch blockhash: {e}")))
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        // Surfaced verbatim: simulation failures and program errors carry
        // their full context in the client error display
        self.client
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(|e| OrbitError::submission(e.to_string()))
    }
}
