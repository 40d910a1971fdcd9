//! Resilience helpers.
//!
//! # Design Decisions
//! - Every RPC call has a deadline (see `chain::client`)
//! - Confirmation polling backs off exponentially instead of hammering the node
//! - No automatic retries of user-visible actions; retry is caller-initiated

pub mod backoff;
