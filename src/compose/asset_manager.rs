//! asset-manager operations: initialization, deposits, rate limits

use serde_json::Value;
use solana_sdk::{instruction::AccountMeta, instruction::Instruction, system_program};
use spl_associated_token_account::get_associated_token_address;

use crate::context::CallContext;
use crate::derive::{pda, Seed};
use crate::error::Result;
use crate::params;
use crate::registry::RegistryResolver;
use crate::rpc::ChainRpc;

use super::accounts::RemainingAccounts;
use super::args::InstructionData;
use super::Composed;

/// initialize: binds the asset manager to the xcall stack and its remote
/// counterpart; program addresses come from params since this runs before
/// the configuration is complete
pub fn initialize<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let asset_manager = params::req_pubkey(p, "asset_manager")?;
    let xcall = params::req_pubkey(p, "xcall")?;
    let icon_asset_manager = params::req_str(p, "icon_asset_manager")?;
    let xcall_manager = params::req_pubkey(p, "xcall_manager")?;

    let xcall_manager_state = pda(&[Seed::Str("state")], &xcall_manager)?;
    let state = pda(&[Seed::Str("state")], &asset_manager)?;

    let instruction = Instruction {
        program_id: asset_manager,
        accounts: vec![
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new(state, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: InstructionData::method("initialize")
            .pubkey(&xcall)
            .string(icon_asset_manager)
            .pubkey(&xcall_manager)
            .pubkey(&xcall_manager_state)
            .build(),
    };
    Ok(Composed::plain(instruction))
}

/// deposit_native: wrap native funds and relay a deposit message
///
/// The deposit schema declares the token-path accounts (depositor token
/// account, vault token account, vault authority, token program) as
/// optional; for the native path they are passed as program-id
/// placeholders so every later account keeps its declared position.
pub async fn deposit_native<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    // caller input and configuration first; nothing below may touch the
    // network until these pass
    let amount = params::req_u64(p, "amount")?;
    let to = params::req_str(p, "to")?;
    let data = params::hex_payload(p, "data")?;
    let to_network = params::network_of(to)?;

    let asset_manager = ctx.contract("asset-manager")?;
    let xcall = ctx.contract("xcall")?;
    let xcall_manager = ctx.contract("xcall-manager")?;

    let vault_native = pda(&[Seed::Str("vault_native")], &asset_manager)?;
    let state = pda(&[Seed::Str("state")], &asset_manager)?;
    let xcall_manager_state = pda(&[Seed::Str("state")], &xcall_manager)?;
    let xcall_config = pda(&[Seed::Str("config")], &xcall)?;
    let xcall_authority = pda(&[Seed::Str("dapp_authority")], &asset_manager)?;

    let registry = RegistryResolver::new(ctx.rpc)
        .resolve(&xcall, &xcall_manager, to_network)
        .await?;

    let mut accounts = vec![
        AccountMeta::new_readonly(asset_manager, false), // from (unused)
        AccountMeta::new(ctx.sender(), true),
        AccountMeta::new_readonly(asset_manager, false), // vault token account (unused)
        AccountMeta::new_readonly(asset_manager, false), // vault authority (unused)
        AccountMeta::new(vault_native, false),
        AccountMeta::new(state, false),
        AccountMeta::new_readonly(xcall_manager_state, false),
        AccountMeta::new(xcall_config, false),
        AccountMeta::new_readonly(xcall, false),
        AccountMeta::new_readonly(xcall_manager, false),
        AccountMeta::new_readonly(asset_manager, false), // token program (unused)
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(xcall_authority, false),
    ];
    accounts.extend(
        RemainingAccounts::new()
            .outer_protocol(&xcall, &registry)?
            .connections(&registry.connections)
            .into_metas(),
    );

    let instruction = Instruction {
        program_id: asset_manager,
        accounts,
        data: InstructionData::method("deposit_native")
            .u64_le(amount)
            .raw(to.as_bytes())
            .raw(&data)
            .build(),
    };
    Ok(Composed::compute_heavy(instruction))
}

/// deposit_token: move SPL tokens into the vault and relay a deposit message
pub async fn deposit_token<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let mint = params::req_pubkey(p, "asset_token")?;
    let amount = params::req_u64(p, "amount")?;
    let to = params::req_str(p, "to")?;
    let data = params::hex_payload(p, "data")?;
    let to_network = params::network_of(to)?;

    let asset_manager = ctx.contract("asset-manager")?;
    let xcall = ctx.contract("xcall")?;
    let xcall_manager = ctx.contract("xcall-manager")?;

    let vault_authority = pda(&[Seed::Str("vault"), Seed::Address(mint)], &asset_manager)?;
    let state = pda(&[Seed::Str("state")], &asset_manager)?;
    let xcall_manager_state = pda(&[Seed::Str("state")], &xcall_manager)?;
    let xcall_config = pda(&[Seed::Str("config")], &xcall)?;
    let xcall_authority = pda(&[Seed::Str("dapp_authority")], &asset_manager)?;

    let depositor_token_account = get_associated_token_address(&ctx.sender(), &mint);
    let vault_token_account = get_associated_token_address(&vault_authority, &mint);

    let registry = RegistryResolver::new(ctx.rpc)
        .resolve(&xcall, &xcall_manager, to_network)
        .await?;

    let mut accounts = vec![
        AccountMeta::new(depositor_token_account, false),
        AccountMeta::new(ctx.sender(), true),
        AccountMeta::new(vault_token_account, false),
        AccountMeta::new(vault_authority, false),
        AccountMeta::new_readonly(asset_manager, false), // native vault (unused)
        AccountMeta::new(state, false),
        AccountMeta::new_readonly(xcall_manager_state, false),
        AccountMeta::new(xcall_config, false),
        AccountMeta::new_readonly(xcall, false),
        AccountMeta::new_readonly(xcall_manager, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(xcall_authority, false),
    ];
    accounts.extend(
        RemainingAccounts::new()
            .outer_protocol(&xcall, &registry)?
            .connections(&registry.connections)
            .into_metas(),
    );

    let instruction = Instruction {
        program_id: asset_manager,
        accounts,
        data: InstructionData::method("deposit_token")
            .u64_le(amount)
            .raw(to.as_bytes())
            .raw(&data)
            .build(),
    };
    Ok(Composed::compute_heavy(instruction))
}

/// configure_rate_limit: per-token withdrawal rate limiting; the native
/// asset is keyed by the system program id
pub fn configure_rate_limit<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let asset_token = match params::opt_str(p, "asset_token") {
        Some(_) => params::req_pubkey(p, "asset_token")?,
        None => system_program::id(),
    };
    let period = params::req_u64(p, "period")?;
    let percentage = params::req_u64(p, "percentage")?;

    let asset_manager = ctx.contract("asset-manager")?;
    let state = pda(&[Seed::Str("state")], &asset_manager)?;
    let token_state = pda(
        &[Seed::Str("token_state"), Seed::Address(asset_token)],
        &asset_manager,
    )?;

    let instruction = Instruction {
        program_id: asset_manager,
        accounts: vec![
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new(state, false),
            AccountMeta::new(token_state, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: InstructionData::method("configure_rate_limit")
            .pubkey(&asset_token)
            .u64_le(period)
            .u64_le(percentage)
            .build(),
    };
    Ok(Composed::plain(instruction))
}

/// set_admin: admin handover on the `["state"]` account
pub fn set_admin<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let new_admin = params::req_pubkey(p, "new_admin")?;
    let asset_manager = ctx.contract("asset-manager")?;
    super::set_admin_state(&asset_manager, &ctx.sender(), &new_admin)
}
