//! The block cipher capability the CCM engine is built on.

use alloc::boxed::Box;
use alloc::sync::Arc;

use cipher::generic_array::GenericArray;
use cipher::{BlockEncrypt, KeyInit};

use crate::error::{Error, Result};

/// Block size in bytes of every cipher usable with CCM.
pub const BLOCK_SIZE: usize = 16;

/// One 128-bit block.
pub type Block = [u8; BLOCK_SIZE];

/// A keyed 128-bit block cipher, used in the forward direction only.
///
/// `encrypt_block` must be a pure function of the key and the input block.
/// Implementors must tolerate concurrent calls through a shared reference,
/// which is what the `Sync` bound expresses.
pub trait BlockCipher: Sync {
    /// Encrypts `block` in place.
    fn encrypt_block(&self, block: &mut Block);
}

impl<T: BlockCipher + ?Sized> BlockCipher for &T {
    fn encrypt_block(&self, block: &mut Block) {
        (**self).encrypt_block(block)
    }
}

impl<T: BlockCipher + Send + ?Sized> BlockCipher for Arc<T> {
    fn encrypt_block(&self, block: &mut Block) {
        (**self).encrypt_block(block)
    }
}

impl<T: BlockCipher + ?Sized> BlockCipher for Box<T> {
    fn encrypt_block(&self, block: &mut Block) {
        (**self).encrypt_block(block)
    }
}

macro_rules! impl_block_cipher {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl BlockCipher for $ty {
                fn encrypt_block(&self, block: &mut Block) {
                    BlockEncrypt::encrypt_block(
                        self,
                        GenericArray::from_mut_slice(block),
                    );
                }
            }
        )+
    };
}

impl_block_cipher!(aes::Aes128, aes::Aes192, aes::Aes256, sm4::Sm4);

/// Block ciphers a [`KeyedCipher`] can be built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Aes128,
    Aes192,
    Aes256,
    Sm4,
}

impl Algorithm {
    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            Algorithm::Aes128 | Algorithm::Sm4 => 16,
            Algorithm::Aes192 => 24,
            Algorithm::Aes256 => 32,
        }
    }

    /// Picks the AES variant for a key of `len` bytes.
    pub fn aes_for_key_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(Algorithm::Aes128),
            24 => Ok(Algorithm::Aes192),
            32 => Ok(Algorithm::Aes256),
            got => Err(Error::InvalidKeyLength { expected: 16, got }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Aes128 => "AES-128",
            Algorithm::Aes192 => "AES-192",
            Algorithm::Aes256 => "AES-256",
            Algorithm::Sm4 => "SM4",
        }
    }
}

/// A block cipher chosen at runtime and keyed from a byte slice.
///
/// The key schedule is owned here; the key bytes themselves are not kept.
#[derive(Clone)]
pub struct KeyedCipher {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    Aes128(aes::Aes128),
    Aes192(aes::Aes192),
    Aes256(aes::Aes256),
    Sm4(sm4::Sm4),
}

impl KeyedCipher {
    /// Expands `key` for `algorithm`.
    pub fn new(algorithm: Algorithm, key: &[u8]) -> Result<Self> {
        let expected = algorithm.key_len();
        if key.len() != expected {
            return Err(Error::InvalidKeyLength {
                expected,
                got: key.len(),
            });
        }

        let inner = match algorithm {
            Algorithm::Aes128 => Inner::Aes128(expand(key)?),
            Algorithm::Aes192 => Inner::Aes192(expand(key)?),
            Algorithm::Aes256 => Inner::Aes256(expand(key)?),
            Algorithm::Sm4 => Inner::Sm4(expand(key)?),
        };
        tracing::debug!(algorithm = algorithm.name(), "block cipher keyed");

        Ok(KeyedCipher { inner })
    }

    pub fn algorithm(&self) -> Algorithm {
        match self.inner {
            Inner::Aes128(_) => Algorithm::Aes128,
            Inner::Aes192(_) => Algorithm::Aes192,
            Inner::Aes256(_) => Algorithm::Aes256,
            Inner::Sm4(_) => Algorithm::Sm4,
        }
    }
}

fn expand<C: KeyInit>(key: &[u8]) -> Result<C> {
    C::new_from_slice(key).map_err(|_| Error::InvalidKeyLength {
        expected: C::key_size(),
        got: key.len(),
    })
}

impl BlockCipher for KeyedCipher {
    fn encrypt_block(&self, block: &mut Block) {
        match &self.inner {
            Inner::Aes128(c) => BlockCipher::encrypt_block(c, block),
            Inner::Aes192(c) => BlockCipher::encrypt_block(c, block),
            Inner::Aes256(c) => BlockCipher::encrypt_block(c, block),
            Inner::Sm4(c) => BlockCipher::encrypt_block(c, block),
        }
    }
}

impl core::fmt::Debug for KeyedCipher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyedCipher")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes128_fips197_block() {
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let cipher = KeyedCipher::new(Algorithm::Aes128, &key).unwrap();
        let mut block = hex!("00112233445566778899aabbccddeeff");
        cipher.encrypt_block(&mut block);
        assert_eq!(block, hex!("69c4e0d86a7b0430d8cdb78070b4c55a"));
    }

    #[test]
    fn sm4_standard_block() {
        // GB/T 32907-2016 example 1
        let key = hex!("0123456789abcdeffedcba9876543210");
        let cipher = KeyedCipher::new(Algorithm::Sm4, &key).unwrap();
        let mut block = key;
        cipher.encrypt_block(&mut block);
        assert_eq!(block, hex!("681edf34d206965e86b3e94f536e4246"));
    }

    #[test]
    fn key_length_checked() {
        assert_eq!(
            Error::InvalidKeyLength {
                expected: 32,
                got: 16
            },
            KeyedCipher::new(Algorithm::Aes256, &[0u8; 16]).unwrap_err()
        );
        assert_eq!(Algorithm::Aes192, Algorithm::aes_for_key_len(24).unwrap());
        assert!(Algorithm::aes_for_key_len(20).is_err());
    }

    #[test]
    fn references_share_the_key_schedule() {
        let cipher = KeyedCipher::new(Algorithm::Aes128, &[7u8; 16]).unwrap();
        let shared = Arc::new(cipher.clone());

        let mut a = [1u8; BLOCK_SIZE];
        let mut b = [1u8; BLOCK_SIZE];
        let mut c = [1u8; BLOCK_SIZE];
        cipher.encrypt_block(&mut a);
        (&cipher).encrypt_block(&mut b);
        shared.encrypt_block(&mut c);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }
}
