//! Injected wallet extension detection.
//!
//! Extensions announce themselves by placing a provider object on the host
//! global scope. Detection is synchronous and only ever runs on web.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::chain::UnsignedTransaction;
use crate::wallet::providers::{find_provider, ExtensionFlag, WalletProviderDescriptor};

/// Error code extensions use when the user declines a request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Error raised by an injected provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCallError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderCallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { code: None, message: message.into() }
    }

    pub fn rejected() -> Self {
        Self {
            code: Some(USER_REJECTED_CODE),
            message: "User rejected the request.".to_string(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }
}

impl fmt::Display for ProviderCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProviderCallError {}

/// Provider object injected by a browser extension.
#[async_trait]
pub trait InjectedProvider: Send + Sync {
    fn is_phantom(&self) -> bool {
        false
    }

    fn is_solflare(&self) -> bool {
        false
    }

    /// Prompt the user and return the approved public key.
    async fn connect(&self) -> Result<String, ProviderCallError>;

    async fn disconnect(&self) -> Result<(), ProviderCallError>;

    /// Sign and broadcast; returns the base-58 signature.
    async fn sign_and_send_transaction(
        &self,
        transaction: &UnsignedTransaction,
    ) -> Result<String, ProviderCallError>;
}

/// The environment extensions inject into.
pub trait ProviderHost: Send + Sync {
    fn is_web(&self) -> bool;

    /// Object at a dotted global path such as `phantom.solana`.
    fn global(&self, path: &str) -> Option<Arc<dyn InjectedProvider>>;
}

/// Host for native builds: never web, nothing injected.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeHost;

impl ProviderHost for NativeHost {
    fn is_web(&self) -> bool {
        false
    }

    fn global(&self, _path: &str) -> Option<Arc<dyn InjectedProvider>> {
        None
    }
}

impl ExtensionFlag {
    /// Global paths checked in order.
    pub fn global_paths(self) -> &'static [&'static str] {
        match self {
            ExtensionFlag::Phantom => &["phantom.solana", "solana"],
            ExtensionFlag::Solflare => &["solflare"],
        }
    }

    pub fn matches(self, provider: &dyn InjectedProvider) -> bool {
        match self {
            ExtensionFlag::Phantom => provider.is_phantom(),
            ExtensionFlag::Solflare => provider.is_solflare(),
        }
    }
}

#[derive(Clone)]
pub struct ProviderDetector {
    host: Arc<dyn ProviderHost>,
}

impl ProviderDetector {
    pub fn new(host: Arc<dyn ProviderHost>) -> Self {
        Self { host }
    }

    pub fn is_web(&self) -> bool {
        self.host.is_web()
    }

    /// Injected provider for a wallet, if present and correctly flagged.
    pub fn detect(&self, descriptor: &WalletProviderDescriptor) -> Option<Arc<dyn InjectedProvider>> {
        if !self.host.is_web() {
            return None;
        }
        let flag = descriptor.extension?;
        flag.global_paths()
            .iter()
            .filter_map(|path| self.host.global(path))
            .find(|provider| flag.matches(provider.as_ref()))
    }

    /// First detected wallet in priority order.
    pub fn detect_first(
        &self,
        priority: &[String],
    ) -> Option<(&'static WalletProviderDescriptor, Arc<dyn InjectedProvider>)> {
        priority
            .iter()
            .filter_map(|name| find_provider(name))
            .find_map(|descriptor| self.detect(descriptor).map(|p| (descriptor, p)))
    }
}

impl fmt::Debug for ProviderDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDetector")
            .field("is_web", &self.host.is_web())
            .finish()
    }
}
