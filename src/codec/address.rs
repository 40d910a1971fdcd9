//! Validated account addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::base58::{decode_base58, encode_base58};
use crate::codec::{CodecError, CodecResult};

/// Size of an ed25519 public key in bytes.
pub const PUBKEY_BYTES: usize = 32;

/// Canonical base-58 encoding of a 32-byte public key.
///
/// The only constructors go through [`Address::parse`] or
/// [`Address::from_bytes`], so every value held by the program has passed
/// the decode → encode round trip.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    encoded: String,
    bytes: [u8; PUBKEY_BYTES],
}

impl Address {
    /// Validate an untrusted string and build an address from it.
    pub fn parse(candidate: &str) -> CodecResult<Self> {
        let decoded = decode_base58(candidate)?;
        let bytes: [u8; PUBKEY_BYTES] =
            decoded
                .as_slice()
                .try_into()
                .map_err(|_| CodecError::InvalidLength {
                    expected: PUBKEY_BYTES,
                    actual: decoded.len(),
                })?;

        let encoded = encode_base58(&bytes);
        if encoded != candidate {
            return Err(CodecError::NonCanonical);
        }

        Ok(Self { encoded, bytes })
    }

    /// Build an address from raw key bytes.
    pub fn from_bytes(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self {
            encoded: encode_base58(&bytes),
            bytes,
        }
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// The raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBKEY_BYTES] {
        &self.bytes
    }
}

/// Returns true only if `candidate` is a canonical 32-byte base-58 key.
pub fn is_valid_address(candidate: &str) -> bool {
    Address::parse(candidate).is_ok()
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.encoded
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encoded)
    }
}
