//! End-to-end composition tests against an in-memory chain fixture
//!
//! A two-connection registry fixture backs the remaining-accounts checks:
//! the composed account sequences are compared entry by entry (address,
//! signer flag, writable flag) against the schema order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Keypair, signature::Signature, signer::Signer,
    system_program, transaction::Transaction,
};
use spl_associated_token_account::get_associated_token_address;

use orbit::compose;
use orbit::config::{ChainConfig, ContractConfig};
use orbit::context::CallContext;
use orbit::derive::{pda, Seed};
use orbit::error::Result;
use orbit::registry::{encode_account, BalancedDollarState, ManagerState, XcallConfig};
use orbit::rpc::ChainRpc;
use orbit::submit;

struct FixtureRpc {
    accounts: HashMap<Pubkey, Vec<u8>>,
    account_calls: AtomicUsize,
    send_calls: AtomicUsize,
}

impl FixtureRpc {
    fn new(accounts: HashMap<Pubkey, Vec<u8>>) -> Self {
        Self {
            accounts,
            account_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ChainRpc for FixtureRpc {
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.get(address).cloned())
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm(&self, _tx: &Transaction) -> Result<Signature> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Signature::default())
    }
}

struct Fixture {
    chain: ChainConfig,
    rpc: FixtureRpc,
    asset_manager: Pubkey,
    balanced_dollar: Pubkey,
    xcall: Pubkey,
    connections: Vec<Pubkey>,
    fee_handler: Pubkey,
    sequence_no: u128,
    mint: Pubkey,
}

fn fixture() -> Fixture {
    let asset_manager = Pubkey::new_unique();
    let balanced_dollar = Pubkey::new_unique();
    let xcall = Pubkey::new_unique();
    let xcall_manager = Pubkey::new_unique();
    let connections = vec![Pubkey::new_unique(), Pubkey::new_unique()];
    let fee_handler = Pubkey::new_unique();
    let mint = Pubkey::new_unique();
    let sequence_no = 41u128;

    let mut chain = ChainConfig::default();
    chain.network_id = Some("solana-test".to_string());
    for (name, key) in [
        ("asset-manager", asset_manager),
        ("balanced-dollar", balanced_dollar),
        ("xcall", xcall),
        ("xcall-manager", xcall_manager),
    ] {
        chain.contracts.insert(
            name.to_string(),
            ContractConfig { contract_address: key.to_string() },
        );
    }

    let config = XcallConfig {
        admin: Pubkey::new_unique(),
        fee_handler,
        network_id: "solana-test".to_string(),
        protocol_fee: 100,
        sequence_no,
        last_req_id: 7,
    };
    let state = ManagerState {
        admin: Pubkey::new_unique(),
        xcall,
        icon_governance: "0x2.icon/cx0000000000000000000000000000000000000000".to_string(),
        sources: connections.clone(),
        destinations: vec!["0x2.icon/cx1111".to_string()],
        whitelisted_actions: vec![b"withdraw_to".to_vec()],
    };
    let bnusd_state = BalancedDollarState {
        admin: Pubkey::new_unique(),
        xcall,
        icon_bn_usd: "0x2.icon/cx2222".to_string(),
        bn_usd_token: mint,
        xcall_manager,
    };

    let mut accounts = HashMap::new();
    accounts.insert(
        pda(&[Seed::Str("config")], &xcall).unwrap(),
        encode_account("Config", &config),
    );
    accounts.insert(
        pda(&[Seed::Str("state")], &xcall_manager).unwrap(),
        encode_account("XmState", &state),
    );
    accounts.insert(
        pda(&[Seed::Str("state")], &balanced_dollar).unwrap(),
        encode_account("State", &bnusd_state),
    );

    Fixture {
        chain,
        rpc: FixtureRpc::new(accounts),
        asset_manager,
        balanced_dollar,
        xcall,
        connections,
        fee_handler,
        sequence_no,
        mint,
    }
}

/// Expected remaining-accounts suffix for the fixture: outer protocol
/// accounts then one triple per connection, as (address, writable)
fn expected_suffix(f: &Fixture) -> Vec<(Pubkey, bool)> {
    let mut expected = vec![
        (pda(&[Seed::Str("config")], &f.xcall).unwrap(), true),
        (
            pda(
                &[Seed::Str("rollback"), Seed::U128(f.sequence_no + 1)],
                &f.xcall,
            )
            .unwrap(),
            true,
        ),
        (solana_sdk::sysvar::instructions::id(), false),
        (f.fee_handler, true),
    ];
    for connection in &f.connections {
        expected.push((*connection, true));
        expected.push((pda(&[Seed::Str("config")], connection).unwrap(), true));
        expected.push((
            pda(&[Seed::Str("fee"), Seed::Str("0x2.icon")], connection).unwrap(),
            true,
        ));
    }
    expected
}

#[tokio::test]
async fn test_deposit_native_end_to_end_shape() {
    let f = fixture();
    let signer = Keypair::new();
    let ctx = CallContext::new(&signer, &f.rpc, &f.chain);

    let params = json!({
        "amount": 5_000_000_000u64,
        "to": "0x2.icon/hxea3635f7495653d8596a7f23a78514b6ad1470e8",
        "data": "0x",
    });
    let composed = compose::asset_manager::deposit_native(&ctx, &params)
        .await
        .unwrap();

    assert_eq!(composed.instruction.program_id, f.asset_manager);
    assert!(composed.compute_budget);

    // fixed prefix of 13 accounts, then outer + per-connection suffix
    let accounts = &composed.instruction.accounts;
    assert_eq!(accounts.len(), 13 + 4 + 3 * f.connections.len());
    assert_eq!(accounts[1].pubkey, signer.pubkey());
    assert!(accounts[1].is_signer && accounts[1].is_writable);
    assert_eq!(
        accounts[4].pubkey,
        pda(&[Seed::Str("vault_native")], &f.asset_manager).unwrap()
    );

    // the unused token-path slots hold program-id placeholders so the
    // later accounts keep their declared positions
    for index in [0, 2, 3, 10] {
        assert_eq!(accounts[index].pubkey, f.asset_manager);
        assert!(!accounts[index].is_writable && !accounts[index].is_signer);
    }
    assert_eq!(accounts[11].pubkey, system_program::id());

    let suffix: Vec<(Pubkey, bool)> = accounts[13..]
        .iter()
        .map(|meta| (meta.pubkey, meta.is_writable))
        .collect();
    assert_eq!(suffix, expected_suffix(&f));
    for meta in &accounts[13..] {
        assert!(!meta.is_signer);
    }

    // one compute-budget instruction in front of the deposit
    let tx = submit::build_transaction(&ctx, &composed, Hash::default());
    assert_eq!(tx.message.instructions.len(), 2);
    let budget_program =
        tx.message.account_keys[tx.message.instructions[0].program_id_index as usize];
    assert_eq!(budget_program, solana_sdk::compute_budget::id());
}

#[tokio::test]
async fn test_deposit_token_fills_native_vault_slot() {
    let f = fixture();
    let signer = Keypair::new();
    let ctx = CallContext::new(&signer, &f.rpc, &f.chain);

    let mint = Pubkey::new_unique();
    let params = json!({
        "asset_token": mint.to_string(),
        "amount": 1_000_000u64,
        "to": "0x2.icon/hxea3635f7495653d8596a7f23a78514b6ad1470e8",
    });
    let composed = compose::asset_manager::deposit_token(&ctx, &params)
        .await
        .unwrap();

    let accounts = &composed.instruction.accounts;
    assert_eq!(accounts.len(), 13 + 4 + 3 * f.connections.len());

    let vault_authority =
        pda(&[Seed::Str("vault"), Seed::Address(mint)], &f.asset_manager).unwrap();
    assert_eq!(
        accounts[0].pubkey,
        get_associated_token_address(&signer.pubkey(), &mint)
    );
    assert_eq!(accounts[1].pubkey, signer.pubkey());
    assert_eq!(
        accounts[2].pubkey,
        get_associated_token_address(&vault_authority, &mint)
    );
    assert_eq!(accounts[3].pubkey, vault_authority);
    // the native-vault slot is unused on the token path
    assert_eq!(accounts[4].pubkey, f.asset_manager);
    assert!(!accounts[4].is_writable);
    assert_eq!(accounts[10].pubkey, spl_token::id());
}

#[test]
fn test_set_network_fees_targets_network_fee_record() {
    let connection_program = Pubkey::new_unique();
    let mut chain = ChainConfig::default();
    chain.network_id = Some("solana-test".to_string());
    chain.contracts.insert(
        "centralized-connection".to_string(),
        ContractConfig { contract_address: connection_program.to_string() },
    );

    let rpc = FixtureRpc::new(HashMap::new());
    let signer = Keypair::new();
    let ctx = CallContext::new(&signer, &rpc, &chain);

    let params = json!({
        "network_id": "0x2.icon",
        "message_fee": 100,
        "response_fee": 200,
    });
    let composed = compose::connection::set_network_fees(&ctx, &params).unwrap();

    let accounts = &composed.instruction.accounts;
    assert_eq!(
        accounts[0].pubkey,
        pda(&[Seed::Str("config")], &connection_program).unwrap()
    );
    // the written record is seeded "network_fee"; the "fee" record the
    // resolver reads is a different account
    let written = accounts[1].pubkey;
    assert_eq!(
        written,
        pda(
            &[Seed::Str("network_fee"), Seed::Str("0x2.icon")],
            &connection_program
        )
        .unwrap()
    );
    assert_ne!(
        written,
        pda(&[Seed::Str("fee"), Seed::Str("0x2.icon")], &connection_program).unwrap()
    );
    assert_eq!(rpc.account_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_send_call_account_sequence() {
    let f = fixture();
    let signer = Keypair::new();
    let ctx = CallContext::new(&signer, &f.rpc, &f.chain);

    let params = json!({
        "to": "0x2.icon/cx9999999999999999999999999999999999999999",
        "data": "0xdeadbeef",
    });
    let composed = compose::xcall::send_call(&ctx, &params).await.unwrap();

    assert_eq!(composed.instruction.program_id, f.xcall);
    let accounts = &composed.instruction.accounts;

    // fixed prefix: signer, config, rollback, fee handler, sysvar, system
    assert_eq!(accounts.len(), 6 + 3 * f.connections.len());
    assert_eq!(accounts[0].pubkey, signer.pubkey());
    assert!(accounts[0].is_signer);
    assert_eq!(
        accounts[2].pubkey,
        pda(
            &[Seed::Str("rollback"), Seed::U128(f.sequence_no + 1)],
            &f.xcall
        )
        .unwrap()
    );
    assert_eq!(accounts[3].pubkey, f.fee_handler);
    assert_eq!(accounts[5].pubkey, system_program::id());

    // connection triples only, registry order
    let suffix: Vec<Pubkey> = accounts[6..].iter().map(|meta| meta.pubkey).collect();
    assert_eq!(suffix[0], f.connections[0]);
    assert_eq!(suffix[1], pda(&[Seed::Str("config")], &f.connections[0]).unwrap());
    assert_eq!(suffix[3], f.connections[1]);

    // payload: discriminator, then the raw chain-qualified address and data
    let data = &composed.instruction.data;
    let to = "0x2.icon/cx9999999999999999999999999999999999999999";
    assert_eq!(&data[8..8 + to.len()], to.as_bytes());
    assert_eq!(&data[8 + to.len()..], &[0xde, 0xad, 0xbe, 0xef]);
}

#[tokio::test]
async fn test_cross_transfer_uses_state_mint() {
    let f = fixture();
    let signer = Keypair::new();
    let ctx = CallContext::new(&signer, &f.rpc, &f.chain);

    let params = json!({
        "amount": "18000000000000000000",
        "to": "0x2.icon/hxea3635f7495653d8596a7f23a78514b6ad1470e8",
    });
    let composed = compose::balanced_dollar::cross_transfer(&ctx, &params)
        .await
        .unwrap();

    assert_eq!(composed.instruction.program_id, f.balanced_dollar);
    let accounts = &composed.instruction.accounts;

    // the mint and the sender's associated token account come from the
    // on-chain state, not from caller parameters
    assert_eq!(
        accounts[0].pubkey,
        get_associated_token_address(&signer.pubkey(), &f.mint)
    );
    assert_eq!(accounts[1].pubkey, f.mint);
    assert_eq!(accounts[2].pubkey, signer.pubkey());

    let suffix: Vec<(Pubkey, bool)> = accounts[10..]
        .iter()
        .map(|meta| (meta.pubkey, meta.is_writable))
        .collect();
    assert_eq!(suffix, expected_suffix(&f));
}

#[tokio::test]
async fn test_execute_call_appends_dapp_accounts() {
    let f = fixture();
    let signer = Keypair::new();
    let ctx = CallContext::new(&signer, &f.rpc, &f.chain);

    let dapp = Pubkey::new_unique();
    let params = json!({
        "req_id": 8,
        "from": "0x2.icon/cx9999999999999999999999999999999999999999",
        "data": "0x00",
        "dapp_accounts": [dapp.to_string()],
    });
    let composed = compose::xcall::execute_call(&ctx, &params).await.unwrap();

    let accounts = &composed.instruction.accounts;
    assert_eq!(accounts.len(), 4 + 4 + 3 * f.connections.len() + 1);
    assert_eq!(
        accounts[2].pubkey,
        pda(&[Seed::Str("proxy"), Seed::U128(8)], &f.xcall).unwrap()
    );
    let last = accounts.last().unwrap();
    assert_eq!(last.pubkey, dapp);
    assert!(last.is_writable);
}

#[tokio::test]
async fn test_composition_is_stable_across_retries() {
    // A failed submission must not change what a re-invocation composes:
    // same fixture state, same bytes, same account sequence.
    let f = fixture();
    let signer = Keypair::new();
    let ctx = CallContext::new(&signer, &f.rpc, &f.chain);

    let params = json!({
        "amount": 1000,
        "to": "0x2.icon/hxea3635f7495653d8596a7f23a78514b6ad1470e8",
    });

    let first = compose::asset_manager::deposit_native(&ctx, &params)
        .await
        .unwrap();
    let second = compose::asset_manager::deposit_native(&ctx, &params)
        .await
        .unwrap();

    assert_eq!(first.instruction.data, second.instruction.data);
    assert_eq!(first.instruction.accounts, second.instruction.accounts);
    // registry state was re-fetched, not cached
    assert_eq!(f.rpc.account_calls.load(Ordering::SeqCst), 4);
    assert_eq!(f.rpc.send_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_admin_operations_skip_registry_and_budget() {
    let f = fixture();
    let signer = Keypair::new();
    let ctx = CallContext::new(&signer, &f.rpc, &f.chain);

    let params = json!({ "new_admin": Pubkey::new_unique().to_string() });
    let composed = compose::xcall::set_admin(&ctx, &params).unwrap();

    assert!(!composed.compute_budget);
    assert_eq!(composed.instruction.accounts.len(), 2);
    assert_eq!(f.rpc.account_calls.load(Ordering::SeqCst), 0);

    let tx = submit::build_transaction(&ctx, &composed, Hash::default());
    assert_eq!(tx.message.instructions.len(), 1);
}
