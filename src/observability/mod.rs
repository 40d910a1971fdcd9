//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON optional) for machine parsing
//! - Payment attempts carry an `attempt_id` through every log line
//! - Addresses may be logged; transaction bytes and key material never are

pub mod logging;
pub mod metrics;
