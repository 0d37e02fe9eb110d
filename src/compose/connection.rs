//! centralized-connection operations: initialization and per-network fees

use serde_json::Value;
use solana_sdk::{instruction::AccountMeta, instruction::Instruction, system_program};

use crate::context::CallContext;
use crate::derive::{pda, Seed};
use crate::error::Result;
use crate::params;
use crate::rpc::ChainRpc;

use super::args::InstructionData;
use super::Composed;

/// initialize: creates the connection config and its signing authority
pub fn initialize<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let connection = params::req_pubkey(p, "connection")?;
    let xcall = params::req_pubkey(p, "xcall")?;
    let relayer = params::req_pubkey(p, "relayer")?;

    let config = pda(&[Seed::Str("config")], &connection)?;
    let authority = pda(&[Seed::Str("connection_authority")], &connection)?;

    let instruction = Instruction {
        program_id: connection,
        accounts: vec![
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new(config, false),
            AccountMeta::new(authority, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: InstructionData::method("initialize")
            .pubkey(&xcall)
            .pubkey(&relayer)
            .build(),
    };
    Ok(Composed::plain(instruction))
}

/// set_network_fees: message and response fee for one remote network
///
/// The fee record written here is seeded `["network_fee", nid]`; the
/// `["fee", nid]` records the resolver appends to remaining-accounts
/// suffixes are a separate per-connection schema.
pub fn set_network_fees<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let network_id = params::req_str(p, "network_id")?;
    let message_fee = params::req_u64(p, "message_fee")?;
    let response_fee = params::req_u64(p, "response_fee")?;

    let connection = ctx.contract("centralized-connection")?;
    let config = pda(&[Seed::Str("config")], &connection)?;
    let fee_record = pda(&[Seed::Str("network_fee"), Seed::Str(network_id)], &connection)?;

    let instruction = Instruction {
        program_id: connection,
        accounts: vec![
            AccountMeta::new(config, false),
            AccountMeta::new(fee_record, false),
            AccountMeta::new(ctx.sender(), true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: InstructionData::method("set_fee")
            .string(network_id)
            .u64_le(message_fee)
            .u64_le(response_fee)
            .build(),
    };
    Ok(Composed::plain(instruction))
}

/// set_admin: admin handover on the `["config"]` account
pub fn set_admin<R: ChainRpc>(ctx: &CallContext<'_, R>, p: &Value) -> Result<Composed> {
    let new_admin = params::req_pubkey(p, "new_admin")?;
    let connection = ctx.contract("centralized-connection")?;
    super::set_admin_config(&connection, &ctx.sender(), &new_admin)
}
