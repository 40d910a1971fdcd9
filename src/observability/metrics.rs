//! Metrics collection.
//!
//! # Metrics
//! - `wallet_connect_total` (counter): connect attempts by provider, outcome
//! - `wallet_payment_total` (counter): payments by channel, outcome
//! - `wallet_rpc_errors_total` (counter): failed RPC calls by method
//! - `wallet_rpc_healthy` (gauge): 1=reachable, 0=unreachable
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use metrics::{counter, gauge};

pub fn record_connect(provider: &str, outcome: &'static str) {
    counter!("wallet_connect_total", "provider" => provider.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_payment(channel: &'static str, outcome: &'static str) {
    counter!("wallet_payment_total", "channel" => channel, "outcome" => outcome).increment(1);
}

pub fn record_rpc_error(method: &str) {
    counter!("wallet_rpc_errors_total", "method" => method.to_string()).increment(1);
}

pub fn record_rpc_health(healthy: bool) {
    gauge!("wallet_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}
