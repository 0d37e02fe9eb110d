//! Instruction composition
//!
//! One routine per logical operation. Each routine validates caller
//! parameters and configuration first (fail fast, before any network
//! access), derives the fixed-order account prefix, resolves registry
//! state where the operation needs a remaining-accounts suffix, and
//! returns the composed instruction together with its compute-budget
//! requirement.

pub mod accounts;
pub mod args;

pub mod asset_manager;
pub mod balanced_dollar;
pub mod connection;
pub mod xcall;
pub mod xcall_manager;

use solana_sdk::{instruction::AccountMeta, instruction::Instruction, pubkey::Pubkey};

use crate::derive::{pda, Seed};
use crate::error::Result;

use self::args::InstructionData;

/// A composed program instruction plus its submission policy
#[derive(Debug, Clone)]
pub struct Composed {
    /// The program instruction to submit
    pub instruction: Instruction,
    /// Whether the transaction needs a compute-budget prefix
    pub compute_budget: bool,
}

impl Composed {
    fn plain(instruction: Instruction) -> Self {
        Self { instruction, compute_budget: false }
    }

    fn compute_heavy(instruction: Instruction) -> Self {
        Self { instruction, compute_budget: true }
    }
}

/// set_admin against a program whose admin lives in a `["state"]` account
pub(crate) fn set_admin_state(
    program: &Pubkey,
    sender: &Pubkey,
    new_admin: &Pubkey,
) -> Result<Composed> {
    let state = pda(&[Seed::Str("state")], program)?;
    let instruction = Instruction {
        program_id: *program,
        accounts: vec![
            AccountMeta::new(*sender, true),
            AccountMeta::new(state, false),
        ],
        data: InstructionData::method("set_admin").pubkey(new_admin).build(),
    };
    Ok(Composed::plain(instruction))
}

/// set_admin against a program whose admin lives in a `["config"]` account
pub(crate) fn set_admin_config(
    program: &Pubkey,
    sender: &Pubkey,
    new_admin: &Pubkey,
) -> Result<Composed> {
    let config = pda(&[Seed::Str("config")], program)?;
    let instruction = Instruction {
        program_id: *program,
        accounts: vec![
            AccountMeta::new(*sender, true),
            AccountMeta::new(config, false),
        ],
        data: InstructionData::method("set_admin").pubkey(new_admin).build(),
    };
    Ok(Composed::plain(instruction))
}
