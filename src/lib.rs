//! Solana wallet connection and payment library

pub mod chain;
pub mod codec;
pub mod config;
pub mod observability;
pub mod resilience;
pub mod session;
pub mod wallet;

pub use config::WalletConfig;
pub use wallet::{WalletError, WalletRuntime};
