//! Dispatch switchboard: the closed (contract, method) operation matrix
//!
//! Every supported operation is a variant of [`Operation`], so the routing
//! match is exhaustive at build time and adding an operation without wiring
//! it up fails to compile. Resolution happens before any derivation or
//! network access; an unknown pair never costs an RPC round trip.

use serde_json::Value;
use tracing::debug;

use crate::compose::{self, Composed};
use crate::context::CallContext;
use crate::derive::{pda, Seed};
use crate::error::{OrbitError, Result};
use crate::params;
use crate::registry::RegistryResolver;
use crate::rpc::ChainRpc;

/// The contracts the orchestrator knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
    AssetManager,
    BalancedDollar,
    Xcall,
    XcallManager,
    CentralizedConnection,
}

impl Contract {
    /// All known contracts, for error messages
    pub const ALL: [Contract; 5] = [
        Contract::AssetManager,
        Contract::BalancedDollar,
        Contract::Xcall,
        Contract::XcallManager,
        Contract::CentralizedConnection,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "asset-manager" => Some(Self::AssetManager),
            "balanced-dollar" => Some(Self::BalancedDollar),
            "xcall" => Some(Self::Xcall),
            "xcall-manager" => Some(Self::XcallManager),
            "centralized-connection" => Some(Self::CentralizedConnection),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AssetManager => "asset-manager",
            Self::BalancedDollar => "balanced-dollar",
            Self::Xcall => "xcall",
            Self::XcallManager => "xcall-manager",
            Self::CentralizedConnection => "centralized-connection",
        }
    }

    /// Methods this contract supports, in help-text order
    pub fn methods(&self) -> &'static [&'static str] {
        match self {
            Self::AssetManager => &[
                "initialize",
                "deposit_native",
                "deposit_token",
                "configure_rate_limit",
                "set_admin",
            ],
            Self::BalancedDollar => &[
                "initialize",
                "get_bnusd_token_authority",
                "cross_transfer",
                "set_admin",
            ],
            Self::Xcall => &[
                "initialize",
                "send_call",
                "execute_call",
                "set_protocol_fee",
                "set_fee_handler",
                "set_admin",
            ],
            Self::XcallManager => &[
                "initialize",
                "whitelist_action",
                "remove_action",
                "set_protocols",
                "get_whitelisted_actions",
                "set_admin",
            ],
            Self::CentralizedConnection => &["initialize", "set_network_fees", "set_admin"],
        }
    }
}

/// One fully resolved operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AssetManagerInitialize,
    AssetManagerDepositNative,
    AssetManagerDepositToken,
    AssetManagerConfigureRateLimit,
    AssetManagerSetAdmin,
    BalancedDollarInitialize,
    BalancedDollarGetTokenAuthority,
    BalancedDollarCrossTransfer,
    BalancedDollarSetAdmin,
    XcallInitialize,
    XcallSendCall,
    XcallExecuteCall,
    XcallSetProtocolFee,
    XcallSetFeeHandler,
    XcallSetAdmin,
    XcallManagerInitialize,
    XcallManagerWhitelistAction,
    XcallManagerRemoveAction,
    XcallManagerSetProtocols,
    XcallManagerGetWhitelistedActions,
    XcallManagerSetAdmin,
    ConnectionInitialize,
    ConnectionSetNetworkFees,
    ConnectionSetAdmin,
}

/// What a resolved operation produces
#[derive(Debug)]
pub enum Plan {
    /// An instruction to confirm and submit
    Transaction(Composed),
    /// A read-only report, printed without touching the signer
    Report(String),
}

/// Resolve a (contract, method) pair to an operation, before anything else
pub fn resolve(contract: &str, method: &str) -> Result<Operation> {
    let Some(contract) = Contract::parse(contract) else {
        return Err(OrbitError::configuration(format!(
            "unknown contract '{contract}'. Known contracts: {}",
            Contract::ALL.map(|c| c.name()).join(", ")
        )));
    };

    use Operation::*;
    let operation = match (contract, method) {
        (Contract::AssetManager, "initialize") => AssetManagerInitialize,
        (Contract::AssetManager, "deposit_native") => AssetManagerDepositNative,
        (Contract::AssetManager, "deposit_token") => AssetManagerDepositToken,
        (Contract::AssetManager, "configure_rate_limit") => AssetManagerConfigureRateLimit,
        (Contract::AssetManager, "set_admin") => AssetManagerSetAdmin,
        (Contract::BalancedDollar, "initialize") => BalancedDollarInitialize,
        (Contract::BalancedDollar, "get_bnusd_token_authority") => {
            BalancedDollarGetTokenAuthority
        }
        (Contract::BalancedDollar, "cross_transfer") => BalancedDollarCrossTransfer,
        (Contract::BalancedDollar, "set_admin") => BalancedDollarSetAdmin,
        (Contract::Xcall, "initialize") => XcallInitialize,
        (Contract::Xcall, "send_call") => XcallSendCall,
        (Contract::Xcall, "execute_call") => XcallExecuteCall,
        (Contract::Xcall, "set_protocol_fee") => XcallSetProtocolFee,
        (Contract::Xcall, "set_fee_handler") => XcallSetFeeHandler,
        (Contract::Xcall, "set_admin") => XcallSetAdmin,
        (Contract::XcallManager, "initialize") => XcallManagerInitialize,
        (Contract::XcallManager, "whitelist_action") => XcallManagerWhitelistAction,
        (Contract::XcallManager, "remove_action") => XcallManagerRemoveAction,
        (Contract::XcallManager, "set_protocols") => XcallManagerSetProtocols,
        (Contract::XcallManager, "get_whitelisted_actions") => {
            XcallManagerGetWhitelistedActions
        }
        (Contract::XcallManager, "set_admin") => XcallManagerSetAdmin,
        (Contract::CentralizedConnection, "initialize") => ConnectionInitialize,
        (Contract::CentralizedConnection, "set_network_fees") => ConnectionSetNetworkFees,
        (Contract::CentralizedConnection, "set_admin") => ConnectionSetAdmin,
        (contract, method) => {
            return Err(OrbitError::UnsupportedOperation {
                contract: contract.name().to_string(),
                method: method.to_string(),
                valid: contract.methods().to_vec(),
            });
        }
    };
    Ok(operation)
}

/// Compose the plan for a resolved operation
pub async fn plan<R: ChainRpc>(
    operation: Operation,
    ctx: &CallContext<'_, R>,
    params: &Value,
) -> Result<Plan> {
    debug!(?operation, "composing");
    use Operation::*;
    let composed = match operation {
        AssetManagerInitialize => compose::asset_manager::initialize(ctx, params)?,
        AssetManagerDepositNative => compose::asset_manager::deposit_native(ctx, params).await?,
        AssetManagerDepositToken => compose::asset_manager::deposit_token(ctx, params).await?,
        AssetManagerConfigureRateLimit => {
            compose::asset_manager::configure_rate_limit(ctx, params)?
        }
        AssetManagerSetAdmin => compose::asset_manager::set_admin(ctx, params)?,
        BalancedDollarInitialize => compose::balanced_dollar::initialize(ctx, params)?,
        BalancedDollarGetTokenAuthority => {
            return bnusd_token_authority_report(ctx, params);
        }
        BalancedDollarCrossTransfer => {
            compose::balanced_dollar::cross_transfer(ctx, params).await?
        }
        BalancedDollarSetAdmin => compose::balanced_dollar::set_admin(ctx, params)?,
        XcallInitialize => compose::xcall::initialize(ctx, params)?,
        XcallSendCall => compose::xcall::send_call(ctx, params).await?,
        XcallExecuteCall => compose::xcall::execute_call(ctx, params).await?,
        XcallSetProtocolFee => compose::xcall::set_protocol_fee(ctx, params)?,
        XcallSetFeeHandler => compose::xcall::set_fee_handler(ctx, params)?,
        XcallSetAdmin => compose::xcall::set_admin(ctx, params)?,
        XcallManagerInitialize => compose::xcall_manager::initialize(ctx, params)?,
        XcallManagerWhitelistAction => compose::xcall_manager::whitelist_action(ctx, params)?,
        XcallManagerRemoveAction => compose::xcall_manager::remove_action(ctx, params)?,
        XcallManagerSetProtocols => compose::xcall_manager::set_protocols(ctx, params)?,
        XcallManagerGetWhitelistedActions => {
            return whitelisted_actions_report(ctx).await;
        }
        XcallManagerSetAdmin => compose::xcall_manager::set_admin(ctx, params)?,
        ConnectionInitialize => compose::connection::initialize(ctx, params)?,
        ConnectionSetNetworkFees => compose::connection::set_network_fees(ctx, params)?,
        ConnectionSetAdmin => compose::connection::set_admin(ctx, params)?,
    };
    Ok(Plan::Transaction(composed))
}

/// Read-only query: print the balanced-dollar token mint/burn authority.
/// Pure derivation, no account fetch; the program address comes from the
/// `balanced_dollar` parameter, falling back to the configured contract.
fn bnusd_token_authority_report<R: ChainRpc>(
    ctx: &CallContext<'_, R>,
    params: &Value,
) -> Result<Plan> {
    let balanced_dollar = match params::opt_str(params, "balanced_dollar") {
        Some(_) => params::req_pubkey(params, "balanced_dollar")?,
        None => ctx.contract("balanced-dollar")?,
    };
    let authority = pda(&[Seed::Str("bnusd_authority")], &balanced_dollar)?;
    Ok(Plan::Report(format!("BNUSD token authority: {authority}\n")))
}

/// Read-only query: print the xcall-manager action whitelist
async fn whitelisted_actions_report<R: ChainRpc>(ctx: &CallContext<'_, R>) -> Result<Plan> {
    let xcall_manager = ctx.contract("xcall-manager")?;
    let state = RegistryResolver::new(ctx.rpc)
        .manager_state(&xcall_manager)
        .await?;

    let mut report = format!("{} whitelisted action(s)\n", state.whitelisted_actions.len());
    for action in &state.whitelisted_actions {
        match std::str::from_utf8(action) {
            Ok(text) => report.push_str(&format!("  {text}\n")),
            Err(_) => report.push_str(&format!("  0x{}\n", hex::encode(action))),
        }
    }
    Ok(Plan::Report(report))
}
