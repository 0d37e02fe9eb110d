//! Explicit call context threaded into every composer routine
//!
//! No ambient shared state: the signer capability, the RPC capability, and
//! the chain configuration travel together as one object, so tests can
//! substitute fakes at the single seam.

use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};

use crate::config::ChainConfig;
use crate::error::Result;
use crate::rpc::ChainRpc;

/// Everything one invocation needs to compose and submit a call
pub struct CallContext<'a, R: ChainRpc> {
    pub signer: &'a Keypair,
    pub rpc: &'a R,
    pub chain: &'a ChainConfig,
}

impl<'a, R: ChainRpc> CallContext<'a, R> {
    pub fn new(signer: &'a Keypair, rpc: &'a R, chain: &'a ChainConfig) -> Self {
        Self { signer, rpc, chain }
    }

    /// The sender address (fee payer and usual authority)
    pub fn sender(&self) -> Pubkey {
        self.signer.pubkey()
    }

    /// Configured address of a named contract; `ConfigurationError` when
    /// absent, raised before any network access
    pub fn contract(&self, name: &str) -> Result<Pubkey> {
        self.chain.contract(name)
    }
}
