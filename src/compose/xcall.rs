//! xcall operations: initialization, outbound sends, inbound executes,
//! fee administration

use serde_json::Value;
use solana_sdk::{instruction::AccountMeta, instruction::Instruction, system_program};

use crate::context::CallContext;
use crate::derive::{pda, Seed};
use crate::error::Result;
use crate::params;
use crate::registry::RegistryResolver;
use crate::rpc::ChainRpc;

use super::accounts::RemainingAccounts;
use super::args::InstructionData;
use super::Composed;

/// initialize: creates the xcall config with this chain's network id
pub fn initialize<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let xcall = params::req_pubkey(p, "xcall")?;
    let network_id = params::req_str(p, "network_id")?;

    let config = pda(&[Seed::Str("config")], &xcall)?;

    let instruction = Instruction {
        program_id: xcall,
        accounts: vec![
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new(config, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: InstructionData::method("initialize").string(network_id).build(),
    };
    Ok(Composed::plain(instruction))
}

/// send_call: outbound message to a remote network
///
/// The outer protocol accounts (config, rollback, introspection sysvar,
/// fee handler) are part of this program's own fixed schema; only the
/// connection triples travel in the remaining-accounts suffix.
pub async fn send_call<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let to = params::req_str(p, "to")?;
    let data = params::hex_payload(p, "data")?;
    let to_network = params::network_of(to)?;

    let xcall = ctx.contract("xcall")?;
    let xcall_manager = ctx.contract("xcall-manager")?;

    let registry = RegistryResolver::new(ctx.rpc)
        .resolve(&xcall, &xcall_manager, to_network)
        .await?;

    let rollback = pda(
        &[
            Seed::Str("rollback"),
            Seed::U128(registry.xcall_config.sequence_no + 1),
        ],
        &xcall,
    )?;

    let mut accounts = vec![
        AccountMeta::new(ctx.sender(), true),
        AccountMeta::new(registry.xcall_config_pda, false),
        AccountMeta::new(rollback, false),
        AccountMeta::new(registry.xcall_config.fee_handler, false),
        AccountMeta::new_readonly(solana_sdk::sysvar::instructions::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(
        RemainingAccounts::new()
            .connections(&registry.connections)
            .into_metas(),
    );

    let instruction = Instruction {
        program_id: xcall,
        accounts,
        data: InstructionData::method("send_call")
            .raw(to.as_bytes())
            .raw(&data)
            .build(),
    };
    Ok(Composed::compute_heavy(instruction))
}

/// execute_call: executes an inbound request that the connections have
/// already delivered; trailing accounts are the target dapp's own
pub async fn execute_call<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let req_id = params::req_u128(p, "req_id")?;
    let from = params::req_str(p, "from")?;
    let data = params::hex_payload(p, "data")?;
    let from_network = params::network_of(from)?;
    let dapp_accounts = if p.get("dapp_accounts").is_some() {
        params::req_pubkey_list(p, "dapp_accounts")?
    } else {
        Vec::new()
    };

    let xcall = ctx.contract("xcall")?;
    let xcall_manager = ctx.contract("xcall-manager")?;

    let proxy_request = pda(&[Seed::Str("proxy"), Seed::U128(req_id)], &xcall)?;

    let registry = RegistryResolver::new(ctx.rpc)
        .resolve(&xcall, &xcall_manager, from_network)
        .await?;

    let mut accounts = vec![
        AccountMeta::new(ctx.sender(), true),
        AccountMeta::new(registry.xcall_config_pda, false),
        AccountMeta::new(proxy_request, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(
        RemainingAccounts::new()
            .outer_protocol(&xcall, &registry)?
            .connections(&registry.connections)
            .trailing(dapp_accounts.iter().map(|key| AccountMeta::new(*key, false)))
            .into_metas(),
    );

    let instruction = Instruction {
        program_id: xcall,
        accounts,
        data: InstructionData::method("execute_call")
            .u128_le(req_id)
            .raw(&data)
            .build(),
    };
    Ok(Composed::compute_heavy(instruction))
}

/// set_protocol_fee: flat fee charged per outbound message
pub fn set_protocol_fee<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let fee = params::req_u64(p, "fee")?;
    let xcall = ctx.contract("xcall")?;
    let config = pda(&[Seed::Str("config")], &xcall)?;

    let instruction = Instruction {
        program_id: xcall,
        accounts: vec![
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new(config, false),
        ],
        data: InstructionData::method("set_protocol_fee").u64_le(fee).build(),
    };
    Ok(Composed::plain(instruction))
}

/// set_fee_handler: account that collects protocol fees
pub fn set_fee_handler<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let fee_handler = params::req_pubkey(p, "fee_handler")?;
    let xcall = ctx.contract("xcall")?;
    let config = pda(&[Seed::Str("config")], &xcall)?;

    let instruction = Instruction {
        program_id: xcall,
        accounts: vec![
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new(config, false),
        ],
        data: InstructionData::method("set_protocol_fee_handler")
            .pubkey(&fee_handler)
            .build(),
    };
    Ok(Composed::plain(instruction))
}

/// set_admin: admin handover on the `["config"]` account
pub fn set_admin<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let new_admin = params::req_pubkey(p, "new_admin")?;
    let xcall = ctx.contract("xcall")?;
    super::set_admin_config(&xcall, &ctx.sender(), &new_admin)
}
