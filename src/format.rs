//! Formatting of the blocks that seed the MAC and the keystream.
//!
//! ```text
//! B0    = [FLAGS | nonce | length(payload)]
//! Ctr_i = [L - 1 | nonce | i]
//! ```
//! `nonce` is `N` bytes, the length and counter fields are `L = 15 - N`
//! bytes, big-endian. The byte FLAGS of B0 is composed by the following bits:
//! ```text
//!   0-2 bits: L - 1
//!   3-5 bits: mac length (encoded as: (mlen-2)/2)
//!   6: Adata (0 if alen == 0, and 1 otherwise)
//!   7: always 0
//! ```

use crate::block::{Block, BLOCK_SIZE};
use crate::config::{self, CcmConfig};
use crate::error::{ConfigError, Result};

// Associated data shorter than 2^16 - 2^8 gets a plain 2-byte length
const AAD_SHORT_LIMIT: u64 = 0xFF00;

/// Checks that a payload of `len` bytes fits the configured length field.
pub(crate) fn check_payload_len(config: &CcmConfig, len: u64) -> Result<()> {
    let max = config.max_payload_len();
    if len > max {
        return Err(ConfigError::PayloadTooLong { len, max }.into());
    }
    Ok(())
}

pub(crate) fn check_nonce(config: &CcmConfig, nonce: &[u8]) -> Result<()> {
    config::check_nonce_len(nonce.len())?;
    if nonce.len() != config.nonce_len() {
        return Err(ConfigError::NonceMismatch {
            expected: config.nonce_len(),
            got: nonce.len(),
        }
        .into());
    }
    Ok(())
}

/// Builds the first MAC input block.
pub(crate) fn b0(
    config: &CcmConfig,
    nonce: &[u8],
    has_aad: bool,
    payload_len: u64,
) -> Result<Block> {
    check_nonce(config, nonce)?;
    check_payload_len(config, payload_len)?;

    let l = config.length_field_len();
    let mut b = [0u8; BLOCK_SIZE];
    b[0] = if has_aad { 0x40 } else { 0 }
        | ((config.tag_len() as u8 - 2) / 2) << 3
        | (l as u8 - 1);
    b[1..=nonce.len()].copy_from_slice(nonce);
    write_field(&mut b, l, payload_len);

    Ok(b)
}

/// Builds counter block `counter` for `nonce`. Counter 0 is Ctr0.
///
/// The caller guarantees `counter` fits in the `15 - nonce.len()` byte field.
pub(crate) fn ctr_block(nonce: &[u8], counter: u64) -> Block {
    let l = BLOCK_SIZE - 1 - nonce.len();
    let mut b = [0u8; BLOCK_SIZE];
    b[0] = l as u8 - 1;
    b[1..=nonce.len()].copy_from_slice(nonce);
    write_field(&mut b, l, counter);
    b
}

// Big-endian `value` into the last `l` bytes of `b`
fn write_field(b: &mut Block, l: usize, value: u64) {
    let bytes = value.to_be_bytes();
    b[BLOCK_SIZE - l..].copy_from_slice(&bytes[bytes.len() - l..]);
}

/// Encoded length prefix of the associated data.
pub(crate) struct AadHeader {
    buf: [u8; 10],
    len: usize,
}

impl AadHeader {
    /// Encodes `aad_len`, which must be non-zero.
    ///
    /// ```text
    /// 0 < a < 2^16 - 2^8   2 bytes: a
    /// a < 2^32             6 bytes: 0xFF 0xFE a
    /// otherwise           10 bytes: 0xFF 0xFF a
    /// ```
    pub(crate) fn new(aad_len: u64) -> Self {
        let mut buf = [0u8; 10];
        let len = if aad_len < AAD_SHORT_LIMIT {
            buf[..2].copy_from_slice(&(aad_len as u16).to_be_bytes());
            2
        } else if aad_len <= u64::from(u32::MAX) {
            buf[0] = 0xFF;
            buf[1] = 0xFE;
            buf[2..6].copy_from_slice(&(aad_len as u32).to_be_bytes());
            6
        } else {
            buf[0] = 0xFF;
            buf[1] = 0xFF;
            buf[2..10].copy_from_slice(&aad_len.to_be_bytes());
            10
        };
        AadHeader { buf, len }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}
