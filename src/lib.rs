//! A pure-Rust CCM engine that runs over any 128-bit block cipher, with
//! [RustCrypto's AES] and SM4 wired in.
//! The fixed-size [`Ccm`] type implements the [`Aead`] trait, so it can be
//! used together with other implementations.
//!
//! ## Overview
//! CCM (for "Counter with CBC-MAC") mode is a NIST approved mode of operation
//! defined in [SP 800-38C].
//!
//! Both the payload and the associated data may be empty. With an empty
//! payload CCM degenerates to a MAC over the associated data.
//!
//! Tag lengths are any even number between 4 and 16 bytes, nonce lengths
//! any number between 7 and 13 bytes. The payload is limited by the
//! `15 - nonce length` byte length field; associated data of any length is
//! accepted.
//!
//! ## Usage
//! [`CcmContext`] drives one message at a time through an explicit call
//! sequence: configure, key and nonce, associated data, payload, finalize.
//!
//! ```rust
//! use ccm_engine::{Algorithm, CcmConfig, CcmContext};
//!
//! let key: [u8; 16] = [0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47,
//!                       0x48, 0x49, 0x4a, 0x4b, 0x4c, 0x4d, 0x4e, 0x4f];
//! let nonce: [u8; 7] = [0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16];
//! let config = CcmConfig::new(4, nonce.len()).unwrap();
//!
//! let mut ccm = CcmContext::for_algorithm(Algorithm::Aes128, &key, config).unwrap();
//! ccm.set_nonce(&nonce).unwrap();
//! ccm.update_aad(&[0, 1, 2, 3, 4, 5, 6, 7]).unwrap();
//! let ciphertext = ccm.encrypt(&[0x20, 0x21, 0x22, 0x23]).unwrap();
//! ccm.finalize().unwrap();
//! assert_eq!(&[0x71u8, 0x62, 0x01, 0x5b], &ciphertext[..]);
//! assert_eq!(&[0x4du8, 0xac, 0x25, 0x5d], ccm.tag().unwrap());
//!
//! // Same key schedule, next message
//! let tag = ccm.tag().unwrap().to_vec();
//! ccm.reset(&nonce).unwrap();
//! ccm.set_expected_tag(&tag).unwrap();
//! ccm.update_aad(&[0, 1, 2, 3, 4, 5, 6, 7]).unwrap();
//! let plaintext = ccm.decrypt(&ciphertext).unwrap();
//! ccm.finalize().unwrap();
//! assert_eq!(&[0x20u8, 0x21, 0x22, 0x23], &plaintext[..]);
//! ```
//!
//! The same construction through the [`Aead`] trait:
//!
//! ```rust
//! use ccm_engine::{
//!     aead::{consts::{U13, U8}, Aead, KeyInit, Payload},
//!     Ccm,
//! };
//!
//! let key = [
//!     0xC0, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA,
//!     0xCB, 0xCC, 0xCD, 0xCE, 0xCF,
//! ];
//!
//! // `U8` is the tag size and `U13` the nonce size, as `typenum` unsigned
//! let ccm = Ccm::<aes::Aes128, U8, U13>::new(&key.into());
//!
//! let nonce = [
//!     0x00, 0x00, 0x00, 0x03, 0x02, 0x01, 0x00, 0xA0, 0xA1, 0xA2, 0xA3,
//!     0xA4, 0xA5,
//! ];
//! let msg = [0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F];
//! let associated_data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
//!
//! let ciphertext = ccm
//!     .encrypt(
//!         &nonce.into(),
//!         Payload {
//!             aad: &associated_data,
//!             msg: &msg,
//!         },
//!     )
//!     .unwrap();
//!
//! let plaintext = ccm
//!     .decrypt(
//!         &nonce.into(),
//!         Payload {
//!             aad: &associated_data,
//!             msg: &ciphertext,
//!         },
//!     )
//!     .unwrap();
//!
//! assert_eq!(&msg[..], plaintext.as_slice());
//! ```
//!
//! ## Features
//! * `std` (default): `std` support in `aead` and `tracing`.
//! * `parallel`: generate the payload keystream on the rayon thread pool.
//!
//! ## Security
//! The tag length bounds the resistance against forgeries: a tag of `M`
//! bytes is guessed with probability `2^-8M`. [RFC 3610] recommends more
//! than 8 bytes for most applications.
//!
//! A nonce must never be used twice under the same key. Nonce reuse in CCM
//! leaks the XOR of the two plaintexts and is not detected by this crate.
//!
//! A failed decryption never releases plaintext: the buffer is zeroed before
//! [`Error::AuthenticationFailed`] is returned.
//!
//! [RustCrypto's AES]: https://github.com/RustCrypto/block-ciphers
//! [`Aead`]: https://docs.rs/aead/latest/aead/trait.Aead.html
//! [SP 800-38C]: https://csrc.nist.gov/publications/detail/sp/800-38c/final
//! [RFC 3610]: https://tools.ietf.org/html/rfc3610

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

mod block;
mod ccm;
mod config;
mod ctr;
mod error;
mod format;
mod mac;
mod mode;

#[cfg(test)]
mod test;

pub use aead;
pub use block::{Algorithm, Block, BlockCipher, KeyedCipher, BLOCK_SIZE};
pub use ccm::{CcmContext, Direction, State};
pub use config::{
    CcmConfig, DEFAULT_NONCE_LEN, DEFAULT_TAG_LEN, MAX_NONCE_LEN, MIN_NONCE_LEN,
};
pub use error::{ConfigError, Error, Result};
pub use mode::{Aes128Ccm, Aes256Ccm, Ccm, CcmNonceSize, CcmTagSize, Sm4Ccm};
