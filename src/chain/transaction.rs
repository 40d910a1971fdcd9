//! Transfer transaction construction and wire serialization.
//!
//! # Responsibilities
//! - Build a system-program transfer message (legacy format)
//! - Stamp the fee payer and recent blockhash
//! - Serialize with placeholder signatures for out-of-process signing

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::chain::types::{ChainError, ChainResult};
use crate::codec::{decode_base58, Address, PUBKEY_BYTES};

/// System program id (all-zero key).
pub const SYSTEM_PROGRAM_ID: [u8; PUBKEY_BYTES] = [0u8; PUBKEY_BYTES];

/// System program `Transfer` instruction discriminant.
const SYSTEM_TRANSFER: u32 = 2;

const SIGNATURE_BYTES: usize = 64;

/// A system transfer awaiting its fee payer's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub fee_payer: Address,
    pub recipient: Address,
    pub lamports: u64,
    pub recent_blockhash: [u8; 32],
    pub last_valid_block_height: u64,
}

impl UnsignedTransaction {
    /// Build a transfer anchored at `blockhash`.
    pub fn transfer(
        from: &Address,
        to: &Address,
        lamports: u64,
        blockhash: &str,
        last_valid_block_height: u64,
    ) -> ChainResult<Self> {
        let decoded = decode_base58(blockhash)
            .map_err(|e| ChainError::InvalidResponse(format!("blockhash: {}", e)))?;
        let recent_blockhash: [u8; 32] = decoded.as_slice().try_into().map_err(|_| {
            ChainError::InvalidResponse(format!(
                "blockhash must be 32 bytes, got {}",
                decoded.len()
            ))
        })?;

        Ok(Self {
            fee_payer: from.clone(),
            recipient: to.clone(),
            lamports,
            recent_blockhash,
            last_valid_block_height,
        })
    }

    /// Number of signatures the message requires (the fee payer only).
    pub fn required_signatures(&self) -> usize {
        1
    }

    /// Serialize the message that signers sign over.
    pub fn message_bytes(&self) -> Vec<u8> {
        let self_transfer = self.fee_payer == self.recipient;

        let mut keys: Vec<&[u8; PUBKEY_BYTES]> = vec![self.fee_payer.as_bytes()];
        if !self_transfer {
            keys.push(self.recipient.as_bytes());
        }
        keys.push(&SYSTEM_PROGRAM_ID);
        let program_index = (keys.len() - 1) as u8;
        let recipient_index = if self_transfer { 0u8 } else { 1u8 };

        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
        data.extend_from_slice(&self.lamports.to_le_bytes());

        let mut out = Vec::with_capacity(3 + 1 + keys.len() * PUBKEY_BYTES + 32 + 20);
        // Header: required signatures, read-only signed, read-only unsigned.
        out.extend_from_slice(&[1, 0, 1]);
        encode_compact_u16(keys.len(), &mut out);
        for key in &keys {
            out.extend_from_slice(&key[..]);
        }
        out.extend_from_slice(&self.recent_blockhash);

        encode_compact_u16(1, &mut out);
        out.push(program_index);
        encode_compact_u16(2, &mut out);
        out.extend_from_slice(&[0, recipient_index]);
        encode_compact_u16(data.len(), &mut out);
        out.extend_from_slice(&data);
        out
    }

    /// Serialize the full transaction, filling missing signatures with zeros.
    pub fn serialize_unsigned(&self) -> Vec<u8> {
        let message = self.message_bytes();
        let signatures = self.required_signatures();
        let mut out = Vec::with_capacity(3 + signatures * SIGNATURE_BYTES + message.len());
        encode_compact_u16(signatures, &mut out);
        out.resize(out.len() + signatures * SIGNATURE_BYTES, 0);
        out.extend_from_slice(&message);
        out
    }

    /// Transport-safe encoding for deep links.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.serialize_unsigned())
    }
}

/// Solana "short vec" length prefix: 7 bits per byte, high bit continues.
fn encode_compact_u16(value: usize, out: &mut Vec<u8>) {
    let mut rem = value as u16;
    loop {
        let mut byte = (rem & 0x7F) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            return;
        }
        byte |= 0x80;
        out.push(byte);
    }
}
