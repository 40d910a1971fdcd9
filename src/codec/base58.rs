//! Base-58 over the Bitcoin/Solana alphabet, backed by `bs58`.
//!
//! Each leading zero byte maps to one leading `'1'` and back, so the
//! encoding is a bijection between byte strings and canonical text.

use crate::codec::{CodecError, CodecResult};

/// Encode bytes as a base-58 string.
pub fn encode_base58(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a base-58 string into bytes.
///
/// Rejects empty input and any character outside the alphabet. Reported
/// indices are byte offsets into `input`.
pub fn decode_base58(input: &str) -> CodecResult<Vec<u8>> {
    if input.is_empty() {
        return Err(CodecError::Empty);
    }

    bs58::decode(input).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter { character, index } => CodecError::InvalidCharacter {
            ch: character,
            index,
        },
        bs58::decode::Error::NonAsciiCharacter { index } => CodecError::InvalidCharacter {
            ch: input
                .get(index..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
            index,
        },
        other => CodecError::Decode(other.to_string()),
    })
}
