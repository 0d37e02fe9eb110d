//! xcall-manager operations: protocol registry and action whitelist
//! administration

use serde_json::Value;
use solana_sdk::{instruction::AccountMeta, instruction::Instruction, system_program};

use crate::context::CallContext;
use crate::derive::{pda, Seed};
use crate::error::Result;
use crate::params;
use crate::rpc::ChainRpc;

use super::args::InstructionData;
use super::Composed;

/// initialize: seeds the manager with its governance counterpart and the
/// initial source/destination protocol lists
pub fn initialize<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let xcall_manager = params::req_pubkey(p, "xcall_manager")?;
    let xcall = params::req_pubkey(p, "xcall")?;
    let icon_governance = params::req_str(p, "icon_governance")?;
    let sources = params::req_pubkey_list(p, "sources")?;
    let destinations = params::req_str_list(p, "destinations")?;

    let state = pda(&[Seed::Str("state")], &xcall_manager)?;

    let instruction = Instruction {
        program_id: xcall_manager,
        accounts: vec![
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new(state, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: InstructionData::method("initialize")
            .pubkey(&xcall)
            .string(icon_governance)
            .pubkey_list(&sources)
            .string_list(&destinations)
            .build(),
    };
    Ok(Composed::plain(instruction))
}

fn action_instruction<R: ChainRpc>(
    ctx: &CallContext<'_, R>,
    p: &Value,
    method: &str,
) -> Result<Composed> {
    let action = params::req_str(p, "action")?;
    let xcall_manager = ctx.contract("xcall-manager")?;
    let state = pda(&[Seed::Str("state")], &xcall_manager)?;

    let instruction = Instruction {
        program_id: xcall_manager,
        accounts: vec![
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new(state, false),
        ],
        data: InstructionData::method(method).bytes(action.as_bytes()).build(),
    };
    Ok(Composed::plain(instruction))
}

/// whitelist_action: permits an inbound governance action payload
pub fn whitelist_action<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    action_instruction(ctx, p, "whitelist_action")
}

/// remove_action: revokes a previously whitelisted action payload
pub fn remove_action<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    action_instruction(ctx, p, "remove_action")
}

/// set_protocols: replaces the source/destination protocol lists
pub fn set_protocols<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let sources = params::req_pubkey_list(p, "sources")?;
    let destinations = params::req_str_list(p, "destinations")?;

    let xcall_manager = ctx.contract("xcall-manager")?;
    let state = pda(&[Seed::Str("state")], &xcall_manager)?;

    let instruction = Instruction {
        program_id: xcall_manager,
        accounts: vec![
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new(state, false),
        ],
        data: InstructionData::method("set_protocols")
            .pubkey_list(&sources)
            .string_list(&destinations)
            .build(),
    };
    Ok(Composed::plain(instruction))
}

/// set_admin: admin handover on the `["state"]` account
pub fn set_admin<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let new_admin = params::req_pubkey(p, "new_admin")?;
    let xcall_manager = ctx.contract("xcall-manager")?;
    super::set_admin_state(&xcall_manager, &ctx.sender(), &new_admin)
}
