//! balanced-dollar operations: initialization and cross-chain transfers

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

/// initialize: binds the token contract to the xcall stack and its remote
/// counterpart
pub fn initialize<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let balanced_dollar = params::req_pubkey(p, "balanced_dollar")?;
    let xcall = params::req_pubkey(p, "xcall")?;
    let icon_bnusd = params::req_str(p, "icon_bnusd")?;
    let bnusd_token = params::req_pubkey(p, "bnusd_token")?;
    let xcall_manager = params::req_pubkey(p, "xcall_manager")?;

    let xcall_manager_state = pda(&[Seed::Str("state")], &xcall_manager)?;
    let state = pda(&[Seed::Str("state")], &balanced_dollar)?;

    let instruction = Instruction {
        program_id: balanced_dollar,
        accounts: vec![
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new(state, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: InstructionData::method("initialize")
            .pubkey(&xcall)
            .string(icon_bnusd)
            .pubkey(&xcall_manager)
            .pubkey(&bnusd_token)
            .pubkey(&xcall_manager_state)
            .build(),
    };
    Ok(Composed::plain(instruction))
}

/// cross_transfer: burn on this chain, mint on the remote one
///
/// The token mint is not a parameter; it is read from the balanced-dollar
/// state account so the composed transfer can never target a different mint
/// than the program itself holds.
pub async fn cross_transfer<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let amount = params::req_u64(p, "amount")?;
    let to = params::req_str(p, "to")?;
    let data = params::hex_payload(p, "data")?;
    let to_network = params::network_of(to)?;

    let balanced_dollar = ctx.contract("balanced-dollar")?;
    let xcall = ctx.contract("xcall")?;
    let xcall_manager = ctx.contract("xcall-manager")?;

    let resolver = RegistryResolver::new(ctx.rpc);
    let bnusd_state = resolver.balanced_dollar_state(&balanced_dollar).await?;
    let mint = bnusd_state.bn_usd_token;

    let state = pda(&[Seed::Str("state")], &balanced_dollar)?;
    let xcall_manager_state = pda(&[Seed::Str("state")], &xcall_manager)?;
    let xcall_config = pda(&[Seed::Str("config")], &xcall)?;
    let xcall_authority = pda(&[Seed::Str("dapp_authority")], &balanced_dollar)?;
    let sender_token_account = get_associated_token_address(&ctx.sender(), &mint);

    let registry = resolver.resolve(&xcall, &xcall_manager, to_network).await?;

    let mut accounts = vec![
        AccountMeta::new(sender_token_account, false),
        AccountMeta::new(mint, false),
        AccountMeta::new(ctx.sender(), true),
        AccountMeta::new(state, false),
        AccountMeta::new_readonly(xcall_manager_state, false),
        AccountMeta::new(xcall_config, false),
        AccountMeta::new_readonly(xcall, false),
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
        program_id: balanced_dollar,
        accounts,
        data: InstructionData::method("cross_transfer")
            .raw(to.as_bytes())
            .u64_le(amount)
            .raw(&data)
            .build(),
    };
    Ok(Composed::compute_heavy(instruction))
}

/// set_admin: admin handover on the `["state"]` account
pub fn set_admin<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let new_admin = params::req_pubkey(p, "new_admin")?;
    let balanced_dollar = ctx.contract("balanced-dollar")?;
    super::set_admin_state(&balanced_dollar, &ctx.sender(), &new_admin)
}
