//! Shared utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use soltix_wallet::chain::{Chain, ChainError, ChainResult, PendingTransaction, UnsignedTransaction};
use soltix_wallet::codec::Address;
use soltix_wallet::config::ChainConfig;
use soltix_wallet::wallet::deeplink::Linker;
use soltix_wallet::wallet::detector::{InjectedProvider, ProviderCallError, ProviderHost};

pub const ALICE: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const BOB: &str = "GHtXQBsoZHVnNFa9YevAzFr17DJjgHXk3ycTKD5xD3Zi";
pub const BLOCKHASH: &str = "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N";
pub const SIGNATURE: &str =
    "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";

/// Reply from a programmable JSON-RPC backend.
pub enum RpcReply {
    Result(Value),
    Error(i64, &'static str),
    /// Answer with HTTP 503.
    Unavailable,
}

/// Start a JSON-RPC backend on an ephemeral port.
///
/// The handler sees the method name and params of each request. Every
/// method called is recorded in the returned log.
pub async fn start_rpc_backend<F>(handler: F) -> (SocketAddr, Arc<Mutex<Vec<String>>>)
where
    F: Fn(&str, &Value) -> RpcReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let log = Arc::new(Mutex::new(Vec::new()));
    let calls = log.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    let calls = calls.clone();
                    tokio::spawn(async move {
                        let _ = serve_one(socket, handler.as_ref(), &calls).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

async fn serve_one<F>(mut socket: TcpStream, handler: &F, calls: &Mutex<Vec<String>>) -> io::Result<()>
where
    F: Fn(&str, &Value) -> RpcReply,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request: Value = serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    calls.lock().unwrap().push(method.clone());

    let (status, body) = match handler(&method, &request["params"]) {
        RpcReply::Result(result) => (
            "200 OK",
            json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }).to_string(),
        ),
        RpcReply::Error(code, message) => (
            "200 OK",
            json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": code, "message": message },
            })
            .to_string(),
        ),
        RpcReply::Unavailable => ("503 Service Unavailable", String::new()),
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

/// An address nothing listens on.
pub async fn dead_endpoint() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Chain config pointed at a local backend with fast polling.
pub fn chain_config(addr: SocketAddr) -> ChainConfig {
    ChainConfig {
        rpc_url: Some(format!("http://{}", addr)),
        rpc_timeout_secs: 2,
        confirm_poll_base_ms: 5,
        confirm_poll_max_ms: 20,
        ..Default::default()
    }
}

pub fn with_context(value: Value) -> RpcReply {
    RpcReply::Result(json!({ "context": { "slot": 1 }, "value": value }))
}

/// A well-behaved node: balance 2.5 SOL, tip at height 100.
pub fn healthy_node(method: &str, _params: &Value) -> RpcReply {
    match method {
        "getBalance" => with_context(json!(2_500_000_000u64)),
        "getLatestBlockhash" => with_context(json!({
            "blockhash": BLOCKHASH,
            "lastValidBlockHeight": 150,
        })),
        "getSignatureStatuses" => with_context(json!([{
            "slot": 99,
            "confirmations": 1,
            "err": null,
            "confirmationStatus": "confirmed",
        }])),
        "getBlockHeight" => RpcReply::Result(json!(100)),
        "getSlot" => RpcReply::Result(json!(120)),
        "getEpochInfo" => RpcReply::Result(json!({
            "epoch": 7,
            "slotIndex": 20,
            "slotsInEpoch": 432000,
            "absoluteSlot": 120,
            "blockHeight": 100,
        })),
        _ => RpcReply::Error(-32601, "Method not found"),
    }
}

/// In-memory chain that counts every call.
pub struct MockChain {
    pub balance: ChainResult<f64>,
    pub confirms: bool,
    pub calls: AtomicUsize,
    pub confirmed_with: Mutex<Option<(String, String, u64)>>,
}

impl MockChain {
    pub fn new(balance: f64) -> Self {
        Self {
            balance: Ok(balance),
            confirms: true,
            calls: AtomicUsize::new(0),
            confirmed_with: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Chain for MockChain {
    async fn get_balance(&self, _address: &Address) -> ChainResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.balance {
            Ok(balance) => Ok(*balance),
            Err(_) => Err(ChainError::Rpc("node unavailable".into())),
        }
    }

    async fn build_transfer(&self, from: &Address, to: &Address, amount: f64) -> ChainResult<PendingTransaction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lamports = soltix_wallet::chain::types::sol_to_lamports(amount)?;
        Ok(PendingTransaction {
            attempt_id: uuid::Uuid::new_v4(),
            transaction: UnsignedTransaction::transfer(from, to, lamports, BLOCKHASH, 150)?,
            blockhash: BLOCKHASH.to_string(),
            last_valid_block_height: 150,
        })
    }

    async fn confirm_transaction(&self, signature: &str, blockhash: &str, last_valid_block_height: u64) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.confirmed_with.lock().unwrap() =
            Some((signature.to_string(), blockhash.to_string(), last_valid_block_height));
        self.confirms
    }
}

/// Scripted browser extension.
pub struct MockExtension {
    pub phantom: bool,
    pub public_key: Result<String, ProviderCallError>,
    pub signature: Result<String, ProviderCallError>,
    pub disconnect_result: Result<(), ProviderCallError>,
    pub signed: Mutex<Vec<UnsignedTransaction>>,
    pub disconnects: AtomicUsize,
}

impl MockExtension {
    pub fn phantom() -> Self {
        Self {
            phantom: true,
            public_key: Ok(ALICE.to_string()),
            signature: Ok(SIGNATURE.to_string()),
            disconnect_result: Ok(()),
            signed: Mutex::new(Vec::new()),
            disconnects: AtomicUsize::new(0),
        }
    }

    pub fn solflare() -> Self {
        Self {
            phantom: false,
            public_key: Ok(BOB.to_string()),
            ..Self::phantom()
        }
    }

    pub fn signed_count(&self) -> usize {
        self.signed.lock().unwrap().len()
    }
}

#[async_trait]
impl InjectedProvider for MockExtension {
    fn is_phantom(&self) -> bool {
        self.phantom
    }

    fn is_solflare(&self) -> bool {
        !self.phantom
    }

    async fn connect(&self) -> Result<String, ProviderCallError> {
        self.public_key.clone()
    }

    async fn disconnect(&self) -> Result<(), ProviderCallError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.disconnect_result.clone()
    }

    async fn sign_and_send_transaction(
        &self,
        transaction: &UnsignedTransaction,
    ) -> Result<String, ProviderCallError> {
        self.signed.lock().unwrap().push(transaction.clone());
        self.signature.clone()
    }
}

/// Browser host exposing extensions at global paths.
pub struct MockHost {
    pub globals: Vec<(&'static str, Arc<MockExtension>)>,
    pub lookups: AtomicUsize,
}

impl MockHost {
    pub fn with(path: &'static str, provider: Arc<MockExtension>) -> Self {
        Self::with_many(vec![(path, provider)])
    }

    pub fn with_many(globals: Vec<(&'static str, Arc<MockExtension>)>) -> Self {
        Self { globals, lookups: AtomicUsize::new(0) }
    }

    pub fn empty() -> Self {
        Self::with_many(Vec::new())
    }
}

impl ProviderHost for MockHost {
    fn is_web(&self) -> bool {
        true
    }

    fn global(&self, path: &str) -> Option<Arc<dyn InjectedProvider>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.globals
            .iter()
            .find(|(global, _)| *global == path)
            .map(|(_, provider)| provider.clone() as Arc<dyn InjectedProvider>)
    }
}

/// Linker that records opened URLs.
#[derive(Default)]
pub struct RecordingLinker {
    pub installed: Vec<&'static str>,
    pub opened: Mutex<Vec<String>>,
}

impl RecordingLinker {
    pub fn with_apps(installed: Vec<&'static str>) -> Self {
        Self { installed, opened: Mutex::new(Vec::new()) }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl Linker for RecordingLinker {
    async fn can_open_url(&self, url: &str) -> bool {
        self.installed.iter().any(|scheme| url.starts_with(scheme))
    }

    async fn open_url(&self, url: &str) -> io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
