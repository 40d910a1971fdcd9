//! Deep-link URL construction and callback parsing.
//!
//! # Data Flow
//! ```text
//! outbound: descriptor + AppConfig → connect / sign URL → Linker::open_url
//! inbound:  <scheme>://onConnect?public_key=…        → Address
//!           <scheme>://onSignTransaction?signature=… → signature
//! ```
//!
//! Every value read from a callback is untrusted and passes through the
//! codec before it is used.

use async_trait::async_trait;
use std::collections::HashSet;
use std::io::{self, Write};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::chain::Cluster;
use crate::codec::{decode_base58, Address, CodecError};
use crate::config::AppConfig;
use crate::wallet::providers::{LinkStyle, WalletProviderDescriptor};

pub const CONNECT_CALLBACK_PATH: &str = "onConnect";
pub const SIGN_CALLBACK_PATH: &str = "onSignTransaction";

/// Callback parameters carrying the approved public key, in lookup order.
const PUBLIC_KEY_PARAMS: [&str; 2] = ["phantom_encryption_public_key", "public_key"];

const SIGNATURE_BYTES: usize = 64;

/// Opens URLs in the OS or another app.
#[async_trait]
pub trait Linker: Send + Sync {
    /// Whether some installed app handles this URL.
    async fn can_open_url(&self, url: &str) -> bool;

    async fn open_url(&self, url: &str) -> io::Result<()>;
}

/// Why a callback URL produced no address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    #[error("malformed callback URL")]
    Malformed,

    /// Not a connect callback; nothing to act on.
    #[error("callback carries no public key")]
    MissingKey,

    #[error("invalid wallet public key: {0}")]
    InvalidKey(#[from] CodecError),
}

/// `<scheme>://<path>`
pub fn create_redirect_url(scheme: &str, path: &str) -> String {
    format!("{}://{}", scheme, path)
}

/// Connect link for a wallet app.
pub fn build_connect_url(
    provider: &WalletProviderDescriptor,
    app: &AppConfig,
    cluster: Cluster,
) -> Result<String, url::ParseError> {
    match provider.link_style {
        LinkStyle::DappBrowser => Ok(provider.connect_base_url.to_string()),
        LinkStyle::UniversalLink => {
            let redirect = create_redirect_url(&app.app_scheme, CONNECT_CALLBACK_PATH);
            let url = Url::parse_with_params(
                provider.connect_base_url,
                &[
                    ("app_url", app.app_url.as_str()),
                    ("dapp_encryption_public_key", ""),
                    ("redirect_link", redirect.as_str()),
                    ("cluster", cluster.as_str()),
                ],
            )?;
            Ok(url.to_string())
        }
    }
}

/// Sign-and-send link carrying a base64 unsigned transaction.
pub fn build_sign_url(
    sign_base_url: &str,
    transaction_b64: &str,
    app_scheme: &str,
) -> Result<String, url::ParseError> {
    let redirect = create_redirect_url(app_scheme, SIGN_CALLBACK_PATH);
    let url = Url::parse_with_params(
        sign_base_url,
        &[
            ("transaction", transaction_b64),
            ("redirect_link", redirect.as_str()),
        ],
    )?;
    Ok(url.to_string())
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == name && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

/// Extract and validate the public key from a connect callback.
pub fn parse_connect_callback(raw: &str) -> Result<Address, CallbackError> {
    let url = Url::parse(raw).map_err(|_| CallbackError::Malformed)?;
    let key = PUBLIC_KEY_PARAMS
        .iter()
        .find_map(|name| query_param(&url, name))
        .ok_or(CallbackError::MissingKey)?;
    Ok(Address::parse(&key)?)
}

/// Whether `raw` is a sign callback, judged by the URL host only.
pub fn is_sign_callback(raw: &str) -> bool {
    Url::parse(raw)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.eq_ignore_ascii_case(SIGN_CALLBACK_PATH)))
        .unwrap_or(false)
}

/// Signature from a sign callback, if present and well-formed.
pub fn parse_signature_callback(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let signature = query_param(&url, "signature")?;
    match decode_base58(&signature) {
        Ok(bytes) if bytes.len() == SIGNATURE_BYTES => Some(signature),
        _ => None,
    }
}

/// Linker for terminal use: prints URLs instead of launching them.
///
/// Installed wallet apps are declared up front by URI scheme.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLinker {
    installed_schemes: HashSet<String>,
}

impl ConsoleLinker {
    pub fn new<I, S>(installed_schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            installed_schemes: installed_schemes
                .into_iter()
                .map(|s| s.into().to_ascii_lowercase())
                .collect(),
        }
    }
}

#[async_trait]
impl Linker for ConsoleLinker {
    async fn can_open_url(&self, url: &str) -> bool {
        let scheme = url.split("://").next().unwrap_or_default();
        match scheme {
            "http" | "https" => true,
            other => self.installed_schemes.contains(&other.to_ascii_lowercase()),
        }
    }

    async fn open_url(&self, url: &str) -> io::Result<()> {
        info!(url = %url, "Opening link");
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "Open this link to continue:\n  {}", url)
    }
}
