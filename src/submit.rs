//! Transaction assembly and submission
//!
//! One composed instruction becomes one atomic transaction, optionally
//! prefixed with a compute-budget directive. Submission waits for
//! "confirmed" commitment and surfaces failures verbatim; a failed
//! submission is never retried here.

use solana_sdk::{
    compute_budget::ComputeBudgetInstruction, hash::Hash, signature::Signature,
    transaction::Transaction,
};
use tracing::info;

use crate::compose::Composed;
use crate::context::CallContext;
use crate::error::Result;
use crate::rpc::ChainRpc;

/// Compute-unit ceiling for the registry-suffix operations. The default
/// 200k budget is not enough for a CPI fan-out across several connection
/// programs.
pub const COMPUTE_UNIT_LIMIT: u32 = 1_000_000;

/// Build the signed transaction for a composed instruction
pub fn build_transaction<R: ChainRpc>(
    ctx: &CallContext<'_, R>,
    composed: &Composed,
    blockhash: Hash,
) -> Transaction {
    let mut instructions = Vec::with_capacity(2);
    if composed.compute_budget {
        instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(
            COMPUTE_UNIT_LIMIT,
        ));
    }
    instructions.push(composed.instruction.clone());

    Transaction::new_signed_with_payer(
        &instructions,
        Some(&ctx.sender()),
        &[ctx.signer],
        blockhash,
    )
}

/// Sign and submit a composed instruction, waiting for confirmation
pub async fn submit<R: ChainRpc>(
    ctx: &CallContext<'_, R>,
    composed: &Composed,
) -> Result<Signature> {
    let blockhash = ctx.rpc.latest_blockhash().await?;
    let transaction = build_transaction(ctx, composed, blockhash);

    info!(
        program = %composed.instruction.program_id,
        accounts = composed.instruction.accounts.len(),
        compute_budget = composed.compute_budget,
        "submitting transaction"
    );
    let signature = ctx.rpc.send_and_confirm(&transaction).await?;
    info!(%signature, "transaction confirmed");
    Ok(signature)
}
