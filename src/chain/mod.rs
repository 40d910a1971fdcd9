//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! ChainConfig (network, RPC URL, failovers)
//!     → client.rs (JSON-RPC with timeouts + failover)
//!     → transaction.rs (transfer message, unsigned wire form)
//!     → gateway.rs (balance, build, confirm, telemetry)
//! ```
//!
//! # Constraints
//! - Build is pure given the chain tip; confirm only polls
//! - Confirmation is bounded by `lastValidBlockHeight`, never open-ended
//! - Informational reads degrade to empty/`None` instead of failing

pub mod client;
pub mod gateway;
pub mod transaction;
pub mod types;

pub use client::RpcClient;
pub use gateway::{Chain, ChainGateway};
pub use transaction::UnsignedTransaction;
pub use types::{ChainError, ChainResult, Cluster, PendingTransaction};
