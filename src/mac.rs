//! Variation of CBC-MAC used in CCM.

use zeroize::Zeroize;

use crate::block::{Block, BlockCipher, BLOCK_SIZE};
use crate::format::AadHeader;

/// Running CBC-MAC state.
///
/// Bytes are XORed into the accumulator as they arrive and the cipher is
/// applied at every block boundary, so zero padding never needs to be
/// materialised: [`CbcMac::pad`] just closes a partially filled block.
pub(crate) struct CbcMac<'c, C: ?Sized> {
    cipher: &'c C,
    y: Block,
    pos: usize,
}

impl<'c, C: BlockCipher + ?Sized> CbcMac<'c, C> {
    /// Starts the chain with Y0 = E(B0).
    pub(crate) fn new(cipher: &'c C, b0: &Block) -> Self {
        let mut y = *b0;
        cipher.encrypt_block(&mut y);
        CbcMac { cipher, y, pos: 0 }
    }

    /// Absorbs the length header and the associated data, then pads.
    pub(crate) fn absorb_aad(&mut self, aad: &[u8]) {
        if aad.is_empty() {
            return;
        }
        let header = AadHeader::new(aad.len() as u64);
        self.update(header.as_bytes());
        self.update(aad);
        self.pad();
    }

    /// Absorbs the payload, then pads.
    pub(crate) fn absorb_payload(&mut self, payload: &[u8]) {
        self.update(payload);
        self.pad();
    }

    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.y[self.pos] ^= byte;
            self.pos += 1;
            if self.pos == BLOCK_SIZE {
                self.cipher.encrypt_block(&mut self.y);
                self.pos = 0;
            }
        }
    }

    // Closes a partial block as if it were zero padded
    fn pad(&mut self) {
        if self.pos != 0 {
            self.cipher.encrypt_block(&mut self.y);
            self.pos = 0;
        }
    }

    /// Returns the unmasked MAC value.
    pub(crate) fn finish(mut self) -> Block {
        self.pad();
        let y = self.y;
        self.y.zeroize();
        y
    }
}

impl<C: ?Sized> Drop for CbcMac<'_, C> {
    fn drop(&mut self) {
        self.y.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Algorithm, KeyedCipher};
    use crate::config::CcmConfig;
    use crate::format;

    // Plain CBC-MAC over pre-padded blocks
    fn reference(cipher: &KeyedCipher, blocks: &[u8]) -> Block {
        assert_eq!(0, blocks.len() % BLOCK_SIZE);
        let mut y = [0u8; BLOCK_SIZE];
        for chunk in blocks.chunks(BLOCK_SIZE) {
            for (a, b) in y.iter_mut().zip(chunk) {
                *a ^= b;
            }
            cipher.encrypt_block(&mut y);
        }
        y
    }

    #[test]
    fn matches_explicit_padding() {
        let cipher = KeyedCipher::new(Algorithm::Aes128, &[0x42; 16]).unwrap();
        let config = CcmConfig::new(8, 13).unwrap();
        let nonce = [0x24u8; 13];
        let aad = [0x11u8; 21];
        let payload = [0x22u8; 35];

        let b0 = format::b0(&config, &nonce, true, payload.len() as u64).unwrap();
        let mut mac = CbcMac::new(&cipher, &b0);
        mac.absorb_aad(&aad);
        mac.absorb_payload(&payload);
        let y = mac.finish();

        let mut stream = b0.to_vec();
        stream.extend_from_slice(&[0, 21]);
        stream.extend_from_slice(&aad);
        stream.resize(BLOCK_SIZE * 3, 0);
        stream.extend_from_slice(&payload);
        stream.resize(BLOCK_SIZE * 6, 0);
        assert_eq!(reference(&cipher, &stream), y);
    }

    #[test]
    fn empty_regions_add_no_blocks() {
        let cipher = KeyedCipher::new(Algorithm::Sm4, &[0x01; 16]).unwrap();
        let b0 = [0x5Au8; BLOCK_SIZE];

        let mut mac = CbcMac::new(&cipher, &b0);
        mac.absorb_aad(&[]);
        mac.absorb_payload(&[]);
        assert_eq!(reference(&cipher, &b0), mac.finish());
    }

    #[test]
    fn block_aligned_payload_is_not_padded() {
        let cipher = KeyedCipher::new(Algorithm::Aes128, &[0x03; 16]).unwrap();
        let b0 = [0u8; BLOCK_SIZE];
        let payload = [0x77u8; 32];

        let mut mac = CbcMac::new(&cipher, &b0);
        mac.absorb_payload(&payload);

        let mut stream = b0.to_vec();
        stream.extend_from_slice(&payload);
        assert_eq!(reference(&cipher, &stream), mac.finish());
    }
}
