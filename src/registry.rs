//! Registry resolution: reading mutable on-chain protocol state
//!
//! The registry accounts (xcall-manager state, xcall config) mutate
//! externally between invocations, so they are fetched fresh on every call
//! and never cached. Their layouts are an external schema contract: an
//! 8-byte account discriminator (sha256 of `account:<Name>`) followed by a
//! borsh payload.
//!
//! Resolution failures signal misconfiguration, not transient faults; they
//! surface as `RegistryUnavailable` and are never retried.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

use crate::derive::{pda, Seed};
use crate::error::{OrbitError, Result};
use crate::rpc::ChainRpc;

/// xcall program config account: fee handler, protocol fee, and the global
/// sequence counter used to derive the next rollback record
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct XcallConfig {
    pub admin: Pubkey,
    pub fee_handler: Pubkey,
    pub network_id: String,
    pub protocol_fee: u64,
    pub sequence_no: u128,
    pub last_req_id: u128,
}

/// xcall-manager state account: the connection registry and action whitelist
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct ManagerState {
    pub admin: Pubkey,
    pub xcall: Pubkey,
    pub icon_governance: String,
    /// Registered connection programs, in stored registry order
    pub sources: Vec<Pubkey>,
    pub destinations: Vec<String>,
    pub whitelisted_actions: Vec<Vec<u8>>,
}

/// balanced-dollar state account; read for the token mint used by
/// cross-chain transfers
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct BalancedDollarState {
    pub admin: Pubkey,
    pub xcall: Pubkey,
    pub icon_bn_usd: String,
    pub bn_usd_token: Pubkey,
    pub xcall_manager: Pubkey,
}

/// One registered connection with its separately derived per-program
/// config address and per-network fee record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub program: Pubkey,
    pub config: Pubkey,
    pub fee_record: Pubkey,
}

/// Registry data needed to assemble a remaining-accounts suffix
#[derive(Debug, Clone)]
pub struct ResolvedRegistry {
    /// The xcall config PDA itself (first outer protocol account)
    pub xcall_config_pda: Pubkey,
    pub xcall_config: XcallConfig,
    /// Connection triples in stored registry order
    pub connections: Vec<ConnectionEntry>,
}

/// Anchor account discriminator: first 8 bytes of sha256("account:<Name>")
fn account_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("account:{name}").as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

/// Decode an Anchor account payload, verifying the discriminator
fn decode_account<T: BorshDeserialize>(name: &str, data: &[u8]) -> Result<T> {
    if data.len() < 8 || data[..8] != account_discriminator(name) {
        return Err(OrbitError::registry(format!(
            "account data does not look like a '{name}' account"
        )));
    }
    let mut payload = &data[8..];
    T::deserialize(&mut payload)
        .map_err(|e| OrbitError::registry(format!("failed to decode '{name}' account: {e}")))
}

/// Encode an Anchor account payload with its discriminator
///
/// Test-fixture counterpart of [`decode_account`]; exposed so integration
/// tests can build registry fixtures byte-for-byte.
pub fn encode_account<T: BorshSerialize>(name: &str, value: &T) -> Vec<u8> {
    let mut data = account_discriminator(name).to_vec();
    value.serialize(&mut data).expect("borsh encoding is infallible for in-memory buffers");
    data
}

/// Resolver over a chain RPC capability
pub struct RegistryResolver<'a, R: ChainRpc> {
    rpc: &'a R,
}

impl<'a, R: ChainRpc> RegistryResolver<'a, R> {
    pub fn new(rpc: &'a R) -> Self {
        Self { rpc }
    }

    async fn fetch_decoded<T: BorshDeserialize>(
        &self,
        name: &str,
        address: &Pubkey,
    ) -> Result<T> {
        let data = self.rpc.account_data(address).await?.ok_or_else(|| {
            OrbitError::registry(format!("'{name}' account {address} not found"))
        })?;
        decode_account(name, &data)
    }

    /// Fetch and decode the xcall config account, returning its PDA too
    pub async fn xcall_config(&self, xcall: &Pubkey) -> Result<(Pubkey, XcallConfig)> {
        let config_pda = pda(&[Seed::Str("config")], xcall)?;
        let config = self.fetch_decoded("Config", &config_pda).await?;
        Ok((config_pda, config))
    }

    /// Fetch and decode the xcall-manager state account
    pub async fn manager_state(&self, manager: &Pubkey) -> Result<ManagerState> {
        let state_pda = pda(&[Seed::Str("state")], manager)?;
        self.fetch_decoded("XmState", &state_pda).await
    }

    /// Fetch and decode the balanced-dollar state account
    pub async fn balanced_dollar_state(&self, program: &Pubkey) -> Result<BalancedDollarState> {
        let state_pda = pda(&[Seed::Str("state")], program)?;
        self.fetch_decoded("State", &state_pda).await
    }

    /// Build connection triples for a target network from the stored
    /// registry order; derivation of the per-connection addresses is pure
    pub fn connection_entries(
        state: &ManagerState,
        network_id: &str,
    ) -> Result<Vec<ConnectionEntry>> {
        state
            .sources
            .iter()
            .map(|program| {
                Ok(ConnectionEntry {
                    program: *program,
                    config: pda(&[Seed::Str("config")], program)?,
                    fee_record: pda(&[Seed::Str("fee"), Seed::Str(network_id)], program)?,
                })
            })
            .collect()
    }

    /// Resolve everything a remaining-accounts suffix needs for one call
    ///
    /// The two backing fetches are independent read-only reads and run
    /// concurrently; the connection list is always assembled from the
    /// stored registry order, so concurrency cannot reorder the output.
    pub async fn resolve(
        &self,
        xcall: &Pubkey,
        manager: &Pubkey,
        network_id: &str,
    ) -> Result<ResolvedRegistry> {
        let (xcall_result, state) = futures::future::try_join(
            self.xcall_config(xcall),
            self.manager_state(manager),
        )
        .await?;
        let (xcall_config_pda, xcall_config) = xcall_result;
        let connections = Self::connection_entries(&state, network_id)?;

        Ok(ResolvedRegistry {
            xcall_config_pda,
            xcall_config,
            connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use solana_sdk::{hash::Hash, signature::Signature, transaction::Transaction};
    use std::collections::HashMap;

    struct FixtureRpc {
        accounts: HashMap<Pubkey, Vec<u8>>,
    }

    #[async_trait]
    impl ChainRpc for FixtureRpc {
        async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
            Ok(self.accounts.get(address).cloned())
        }

        async fn latest_blockhash(&self) -> Result<Hash> {
            Ok(Hash::default())
        }

        async fn send_and_confirm(&self, _tx: &Transaction) -> Result<Signature> {
            Ok(Signature::default())
        }
    }

    fn manager_state(sources: Vec<Pubkey>) -> ManagerState {
        ManagerState {
            admin: Pubkey::new_unique(),
            xcall: Pubkey::new_unique(),
            icon_governance: "0x2.icon/cx0000000000000000000000000000000000000000".to_string(),
            sources,
            destinations: vec!["0x2.icon/cx1111".to_string()],
            whitelisted_actions: vec![b"withdraw".to_vec()],
        }
    }

    #[test]
    fn test_discriminator_mismatch_is_registry_error() {
        let state = manager_state(vec![]);
        let data = encode_account("XmState", &state);

        assert!(decode_account::<ManagerState>("XmState", &data).is_ok());
        assert!(matches!(
            decode_account::<ManagerState>("Config", &data),
            Err(OrbitError::RegistryUnavailable(_))
        ));
    }

    #[test]
    fn test_truncated_account_is_registry_error() {
        let state = manager_state(vec![Pubkey::new_unique()]);
        let data = encode_account("XmState", &state);

        let truncated = &data[..data.len() - 4];
        assert!(matches!(
            decode_account::<ManagerState>("XmState", truncated),
            Err(OrbitError::RegistryUnavailable(_))
        ));
    }

    #[test]
    fn test_connection_entries_preserve_registry_order() {
        let sources = vec![Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique()];
        let state = manager_state(sources.clone());

        let entries =
            RegistryResolver::<FixtureRpc>::connection_entries(&state, "0x2.icon").unwrap();

        assert_eq!(entries.len(), 3);
        for (entry, program) in entries.iter().zip(&sources) {
            assert_eq!(entry.program, *program);
            assert_eq!(entry.config, pda(&[Seed::Str("config")], program).unwrap());
            assert_eq!(
                entry.fee_record,
                pda(&[Seed::Str("fee"), Seed::Str("0x2.icon")], program).unwrap()
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_against_fixture() {
        let xcall = Pubkey::new_unique();
        let manager = Pubkey::new_unique();
        let connection = Pubkey::new_unique();

        let config = XcallConfig {
            admin: Pubkey::new_unique(),
            fee_handler: Pubkey::new_unique(),
            network_id: "solana-test".to_string(),
            protocol_fee: 100,
            sequence_no: 41,
            last_req_id: 7,
        };
        let state = manager_state(vec![connection]);

        let mut accounts = HashMap::new();
        accounts.insert(
            pda(&[Seed::Str("config")], &xcall).unwrap(),
            encode_account("Config", &config),
        );
        accounts.insert(
            pda(&[Seed::Str("state")], &manager).unwrap(),
            encode_account("XmState", &state),
        );
        let rpc = FixtureRpc { accounts };

        let resolver = RegistryResolver::new(&rpc);
        let resolved = resolver.resolve(&xcall, &manager, "0x2.icon").await.unwrap();

        assert_eq!(resolved.xcall_config.sequence_no, 41);
        assert_eq!(resolved.connections.len(), 1);
        assert_eq!(resolved.connections[0].program, connection);
    }

    #[tokio::test]
    async fn test_missing_account_is_registry_error() {
        let rpc = FixtureRpc { accounts: HashMap::new() };
        let resolver = RegistryResolver::new(&rpc);

        let result = resolver.manager_state(&Pubkey::new_unique()).await;
        assert!(matches!(result, Err(OrbitError::RegistryUnavailable(_))));
    }
}
