//! Remaining-accounts assembly
//!
//! The variable-length suffix appended after an instruction's fixed account
//! set is ordered by schema, not convenience: outer protocol accounts
//! first, then one triple per registered connection in registry order, then
//! operation-specific trailing accounts. The builder keeps the sections
//! named so the ordering invariant is enforced structurally instead of by
//! ad hoc concatenation.

use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey};

use crate::derive::{pda, Seed};
use crate::error::Result;
use crate::registry::{ConnectionEntry, ResolvedRegistry};

/// Ordered remaining-accounts suffix with named sections
#[derive(Debug, Default)]
pub struct RemainingAccounts {
    outer: Vec<AccountMeta>,
    per_connection: Vec<AccountMeta>,
    trailing: Vec<AccountMeta>,
}

impl RemainingAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outer protocol accounts, in schema order: xcall config, rollback
    /// record for the next sequence number, the instruction-introspection
    /// sysvar, and the fee handler
    pub fn outer_protocol(mut self, xcall: &Pubkey, registry: &ResolvedRegistry) -> Result<Self> {
        let rollback = pda(
            &[
                Seed::Str("rollback"),
                Seed::U128(registry.xcall_config.sequence_no + 1),
            ],
            xcall,
        )?;
        self.outer = vec![
            AccountMeta::new(registry.xcall_config_pda, false),
            AccountMeta::new(rollback, false),
            AccountMeta::new_readonly(solana_sdk::sysvar::instructions::id(), false),
            AccountMeta::new(registry.xcall_config.fee_handler, false),
        ];
        Ok(self)
    }

    /// One (program, config, fee-record) triple per registered connection,
    /// appended in the order the registry stores them
    pub fn connections(mut self, entries: &[ConnectionEntry]) -> Self {
        for entry in entries {
            self.per_connection.push(AccountMeta::new(entry.program, false));
            self.per_connection.push(AccountMeta::new(entry.config, false));
            self.per_connection.push(AccountMeta::new(entry.fee_record, false));
        }
        self
    }

    /// Operation-specific trailing accounts (e.g. dapp accounts for an
    /// inbound execute)
    pub fn trailing(mut self, metas: impl IntoIterator<Item = AccountMeta>) -> Self {
        self.trailing.extend(metas);
        self
    }

    /// Total suffix length across all sections
    pub fn len(&self) -> usize {
        self.outer.len() + self.per_connection.len() + self.trailing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into the final schema order: outer ++ per-connection ++ trailing
    pub fn into_metas(self) -> Vec<AccountMeta> {
        let mut metas = self.outer;
        metas.extend(self.per_connection);
        metas.extend(self.trailing);
        metas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::XcallConfig;

    fn registry_fixture(xcall: &Pubkey, connections: usize) -> ResolvedRegistry {
        let entries = (0..connections)
            .map(|_| {
                let program = Pubkey::new_unique();
                ConnectionEntry {
                    program,
                    config: pda(&[Seed::Str("config")], &program).unwrap(),
                    fee_record: pda(&[Seed::Str("fee"), Seed::Str("0x2.icon")], &program).unwrap(),
                }
            })
            .collect();
        ResolvedRegistry {
            xcall_config_pda: pda(&[Seed::Str("config")], xcall).unwrap(),
            xcall_config: XcallConfig {
                admin: Pubkey::new_unique(),
                fee_handler: Pubkey::new_unique(),
                network_id: "solana-test".to_string(),
                protocol_fee: 0,
                sequence_no: 10,
                last_req_id: 3,
            },
            connections: entries,
        }
    }

    #[test]
    fn test_sections_flatten_in_schema_order() {
        let xcall = Pubkey::new_unique();
        let registry = registry_fixture(&xcall, 2);
        let trailing_account = Pubkey::new_unique();

        let suffix = RemainingAccounts::new()
            .outer_protocol(&xcall, &registry)
            .unwrap()
            .connections(&registry.connections)
            .trailing([AccountMeta::new(trailing_account, false)]);

        assert_eq!(suffix.len(), 4 + 3 * 2 + 1);
        let metas = suffix.into_metas();

        assert_eq!(metas[0].pubkey, registry.xcall_config_pda);
        assert_eq!(metas[2].pubkey, solana_sdk::sysvar::instructions::id());
        assert!(!metas[2].is_writable);
        assert_eq!(metas[3].pubkey, registry.xcall_config.fee_handler);

        // connection triples in registry order
        assert_eq!(metas[4].pubkey, registry.connections[0].program);
        assert_eq!(metas[5].pubkey, registry.connections[0].config);
        assert_eq!(metas[6].pubkey, registry.connections[0].fee_record);
        assert_eq!(metas[7].pubkey, registry.connections[1].program);

        assert_eq!(metas[10].pubkey, trailing_account);
    }

    #[test]
    fn test_rollback_uses_next_sequence_number() {
        let xcall = Pubkey::new_unique();
        let registry = registry_fixture(&xcall, 0);

        let metas = RemainingAccounts::new()
            .outer_protocol(&xcall, &registry)
            .unwrap()
            .into_metas();

        let expected = pda(&[Seed::Str("rollback"), Seed::U128(11)], &xcall).unwrap();
        assert_eq!(metas[1].pubkey, expected);
    }
}
