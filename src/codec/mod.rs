//! Address codec subsystem.
//!
//! # Data Flow
//! ```text
//! untrusted string (deep link, storage, user input)
//!     → base58.rs (alphabet check, base conversion via bs58)
//!     → address.rs (fixed-length check, canonical round-trip)
//!     → Address (validated, immutable)
//! ```
//!
//! # Security Constraints
//! - A string only becomes an `Address` after decode → encode round-trips
//! - Malformed input fails closed; nothing is partially accepted

pub mod address;
pub mod base58;

pub use address::{is_valid_address, Address, PUBKEY_BYTES};
pub use base58::{decode_base58, encode_base58};

use thiserror::Error;

/// Errors produced while decoding or validating base-58 data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input was empty.
    #[error("empty input")]
    Empty,

    /// Input contained a character outside the base-58 alphabet.
    #[error("invalid base-58 character {ch:?} at index {index}")]
    InvalidCharacter { ch: char, index: usize },

    /// Decoded byte length did not match the expected size.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Input decoded but is not the canonical encoding of its bytes.
    #[error("non-canonical encoding")]
    NonCanonical,

    #[error("base-58 decode failed: {0}")]
    Decode(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
