//! Orbit - cross-chain call orchestrator for Solana
//!
//! Translates logical cross-chain operations into deterministically derived
//! addresses and binary instruction payloads matching the deployed
//! programs' account-layout schemas, then submits them as single atomic
//! transactions.

pub mod compose;
pub mod config;
pub mod context;
pub mod derive;
pub mod dispatch;
pub mod error;
pub mod params;
pub mod registry;
pub mod rpc;
pub mod submit;
pub mod wallet;

pub use error::{OrbitError, Result};
