//! Variation of CTR mode used in CCM.
//!
//! Counter 0 is reserved for masking the MAC, so the payload keystream starts
//! at counter 1. Every keystream block depends only on its own counter, which
//! lets the payload be processed in any order; with the `parallel` feature
//! the blocks are spread over the rayon thread pool.

use zeroize::Zeroize;

use crate::block::{Block, BlockCipher, BLOCK_SIZE};
use crate::config::max_for_field;
use crate::error::{ConfigError, Result};
use crate::format;

pub(crate) struct Keystream<'c, 'n, C: ?Sized> {
    cipher: &'c C,
    nonce: &'n [u8],
}

impl<'c, 'n, C: BlockCipher + ?Sized> Keystream<'c, 'n, C> {
    pub(crate) fn new(cipher: &'c C, nonce: &'n [u8]) -> Self {
        Keystream { cipher, nonce }
    }

    /// Fails if `len` payload bytes need more counter values than the
    /// counter field can hold. Makes no cipher call.
    pub(crate) fn check_len(&self, len: usize) -> Result<()> {
        let blocks = (len as u64).div_ceil(BLOCK_SIZE as u64);
        let max = max_for_field(BLOCK_SIZE - 1 - self.nonce.len());
        if blocks > max {
            return Err(ConfigError::CounterOverflow { blocks, max }.into());
        }
        Ok(())
    }

    /// Masks a MAC value with S0 and returns the first `tag_len` bytes.
    pub(crate) fn mask_tag(&self, mac: &Block, tag_len: usize) -> Block {
        let mut s0 = format::ctr_block(self.nonce, 0);
        self.cipher.encrypt_block(&mut s0);
        let mut tag = [0u8; BLOCK_SIZE];
        for (t, (m, s)) in tag.iter_mut().zip(mac.iter().zip(&s0)).take(tag_len) {
            *t = m ^ s;
        }
        s0.zeroize();
        tag
    }

    /// XORs the payload keystream into `buf`, encrypting or decrypting it.
    ///
    /// [`Keystream::check_len`] must have accepted `buf.len()`.
    #[cfg(not(feature = "parallel"))]
    pub(crate) fn apply(&self, buf: &mut [u8]) {
        for (i, chunk) in buf.chunks_mut(BLOCK_SIZE).enumerate() {
            self.apply_block(i as u64 + 1, chunk);
        }
    }

    /// XORs the payload keystream into `buf` on the rayon thread pool.
    ///
    /// [`Keystream::check_len`] must have accepted `buf.len()`.
    #[cfg(feature = "parallel")]
    pub(crate) fn apply(&self, buf: &mut [u8]) {
        use rayon::prelude::*;

        buf.par_chunks_mut(BLOCK_SIZE)
            .enumerate()
            .for_each(|(i, chunk)| self.apply_block(i as u64 + 1, chunk));
    }

    fn apply_block(&self, counter: u64, chunk: &mut [u8]) {
        let mut s = format::ctr_block(self.nonce, counter);
        self.cipher.encrypt_block(&mut s);
        for (b, k) in chunk.iter_mut().zip(&s) {
            *b ^= k;
        }
        s.zeroize();
    }
}
