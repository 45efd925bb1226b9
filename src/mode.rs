//! One-shot CCM as an [`aead`] algorithm.

use core::marker::PhantomData;

use aead::consts::{U0, U10, U11, U12, U13, U14, U16, U4, U6, U7, U8, U9};
use aead::generic_array::typenum::Unsigned;
use aead::generic_array::ArrayLength;
use aead::{AeadCore, AeadInPlace, Key, KeyInit, KeySizeUser, Nonce, Tag};

use crate::block::BlockCipher;
use crate::ccm::{CcmContext, Direction};
use crate::config::CcmConfig;
use crate::error::Error;

/// CCM over the block cipher `C` with an `M`-byte tag and an `N`-byte nonce.
///
/// Every call runs a fresh [`CcmContext`], so a `Ccm` can be shared between
/// threads. On a failed decryption the buffer is zeroed.
#[derive(Clone)]
pub struct Ccm<C, M, N> {
    cipher: C,
    sizes: PhantomData<(M, N)>,
}

/// AES-128-CCM with a 16-byte tag and a 12-byte nonce.
pub type Aes128Ccm = Ccm<aes::Aes128, U16, U12>;
/// AES-256-CCM with a 16-byte tag and a 12-byte nonce.
pub type Aes256Ccm = Ccm<aes::Aes256, U16, U12>;
/// SM4-CCM with a 16-byte tag and a 12-byte nonce.
pub type Sm4Ccm = Ccm<sm4::Sm4, U16, U12>;

mod private {
    pub trait SealedTag {}
    pub trait SealedNonce {}
}

/// Tag sizes CCM allows: 4, 6, 8, 10, 12, 14 and 16 bytes.
pub trait CcmTagSize: ArrayLength<u8> + private::SealedTag {}

/// Nonce sizes CCM allows: 7 to 13 bytes.
pub trait CcmNonceSize: ArrayLength<u8> + private::SealedNonce {}

macro_rules! sizes {
    ($sealed:ident, $size:ident: $($n:ty),+) => {
        $(
            impl private::$sealed for $n {}
            impl $size for $n {}
        )+
    };
}

sizes!(SealedTag, CcmTagSize: U4, U6, U8, U10, U12, U14, U16);
sizes!(SealedNonce, CcmNonceSize: U7, U8, U9, U10, U11, U12, U13);

impl<C, M, N> Ccm<C, M, N>
where
    C: BlockCipher,
    M: CcmTagSize,
    N: CcmNonceSize,
{
    /// Wraps an already keyed cipher.
    pub fn from_cipher(cipher: C) -> Self {
        Ccm {
            cipher,
            sizes: PhantomData,
        }
    }

    fn context(&self, nonce: &[u8], associated_data: &[u8]) -> Result<CcmContext<&C>, Error> {
        let config = CcmConfig::new(M::USIZE, N::USIZE)?;
        let mut ccm = CcmContext::with_config(&self.cipher, config);
        ccm.set_nonce(nonce)?;
        ccm.update_aad(associated_data)?;
        Ok(ccm)
    }
}

impl<C, M, N> KeySizeUser for Ccm<C, M, N>
where
    C: KeySizeUser,
{
    type KeySize = C::KeySize;
}

impl<C, M, N> KeyInit for Ccm<C, M, N>
where
    C: BlockCipher + KeyInit,
    M: CcmTagSize,
    N: CcmNonceSize,
{
    fn new(key: &Key<Self>) -> Self {
        Ccm::from_cipher(C::new(key))
    }
}

impl<C, M, N> AeadCore for Ccm<C, M, N>
where
    M: CcmTagSize,
    N: CcmNonceSize,
{
    type NonceSize = N;
    type TagSize = M;
    type CiphertextOverhead = U0;
}

impl<C, M, N> AeadInPlace for Ccm<C, M, N>
where
    C: BlockCipher,
    M: CcmTagSize,
    N: CcmNonceSize,
{
    fn encrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> aead::Result<Tag<Self>> {
        let mut ccm = self.context(nonce, associated_data)?;
        ccm.process_payload_in_place(Direction::Encrypt, buffer)?;
        ccm.finalize()?;
        Ok(Tag::<Self>::clone_from_slice(ccm.tag()?))
    }

    fn decrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &Tag<Self>,
    ) -> aead::Result<()> {
        let mut ccm = self.context(nonce, associated_data)?;
        ccm.set_expected_tag(tag)?;
        ccm.process_payload_in_place(Direction::Decrypt, buffer)?;
        ccm.finalize()?;
        Ok(())
    }
}

impl From<Error> for aead::Error {
    fn from(_: Error) -> Self {
        aead::Error
    }
}
