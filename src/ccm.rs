//! The CCM context: configuration, per-message state and call ordering.

use alloc::vec::Vec;
use core::fmt;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::block::{Algorithm, Block, BlockCipher, KeyedCipher, BLOCK_SIZE};
use crate::config::{CcmConfig, MAX_NONCE_LEN};
use crate::ctr::Keystream;
use crate::error::{ConfigError, Error, Result};
use crate::format;
use crate::mac::CbcMac;

/// Whether a payload is being encrypted or decrypted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Lifecycle of a [`CcmContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Created, default parameters not yet confirmed.
    Uninitialized,
    /// Tag and nonce lengths set.
    Configured,
    /// Nonce set, accepting associated data.
    Keyed,
    /// The one payload call for this message has been made.
    PayloadProcessed,
    /// The message is complete; the tag can be read after encryption.
    Finalized,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Uninitialized => "Uninitialized",
            State::Configured => "Configured",
            State::Keyed => "Keyed",
            State::PayloadProcessed => "PayloadProcessed",
            State::Finalized => "Finalized",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Zeroize)]
struct TagBuf {
    bytes: Block,
    len: usize,
}

impl TagBuf {
    fn new(tag: &[u8]) -> Self {
        let mut bytes = [0u8; BLOCK_SIZE];
        bytes[..tag.len()].copy_from_slice(tag);
        TagBuf {
            bytes,
            len: tag.len(),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// A CCM encryption or decryption context over the block cipher `C`.
///
/// Each message goes through the following calls, in order:
///
/// 1. [`configure`](Self::configure) (optional, defaults to a 16-byte tag
///    and a 12-byte nonce),
/// 2. [`set_nonce`](Self::set_nonce),
/// 3. [`update_aad`](Self::update_aad) any number of times,
/// 4. [`set_expected_tag`](Self::set_expected_tag) when decrypting, at any
///    point before the payload call,
/// 5. exactly one [`process_payload`](Self::process_payload) (or
///    [`encrypt`](Self::encrypt) / [`decrypt`](Self::decrypt)) with the
///    whole payload,
/// 6. [`finalize`](Self::finalize), after which [`tag`](Self::tag) returns
///    the tag of an encrypted message,
/// 7. [`reset`](Self::reset) with a fresh nonce for the next message.
///
/// Calls out of this order fail with [`Error::SequenceError`].
///
/// The same nonce must never be used for two different messages under the
/// same key. This is not detected, and doing so destroys the security of
/// CCM.
///
/// `C` may be an owned cipher, a reference or an `Arc`, so one key schedule
/// can back many contexts.
pub struct CcmContext<C> {
    cipher: C,
    config: CcmConfig,
    state: State,
    nonce: [u8; MAX_NONCE_LEN],
    aad: Vec<u8>,
    expected_tag: Option<TagBuf>,
    tag: Option<TagBuf>,
    direction: Option<Direction>,
}

impl CcmContext<KeyedCipher> {
    /// Builds a configured context keyed for `algorithm`.
    pub fn for_algorithm(
        algorithm: Algorithm,
        key: &[u8],
        config: CcmConfig,
    ) -> Result<Self> {
        let cipher = KeyedCipher::new(algorithm, key)?;
        Ok(CcmContext::with_config(cipher, config))
    }
}

impl<C: BlockCipher> CcmContext<C> {
    /// Creates an unconfigured context. Setting a nonce without configuring
    /// first uses [`CcmConfig::default`].
    pub fn new(cipher: C) -> Self {
        CcmContext {
            cipher,
            config: CcmConfig::default(),
            state: State::Uninitialized,
            nonce: [0u8; MAX_NONCE_LEN],
            aad: Vec::new(),
            expected_tag: None,
            tag: None,
            direction: None,
        }
    }

    /// Creates a context with the given parameters.
    pub fn with_config(cipher: C, config: CcmConfig) -> Self {
        let mut ccm = CcmContext::new(cipher);
        ccm.config = config;
        ccm.state = State::Configured;
        ccm
    }

    pub fn config(&self) -> &CcmConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Direction of the payload processed for the current message, if any.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Sets the tag and nonce lengths. Only allowed before a nonce is set.
    pub fn configure(&mut self, config: CcmConfig) -> Result<()> {
        self.expect("configure", &[State::Uninitialized, State::Configured])?;
        self.config = config;
        self.transition(State::Configured);
        Ok(())
    }

    /// Sets the tag length, keeping the nonce length.
    pub fn set_tag_len(&mut self, tag_len: usize) -> Result<()> {
        self.expect("set_tag_len", &[State::Uninitialized, State::Configured])?;
        let config = self.config.with_tag_len(tag_len)?;
        self.configure(config)
    }

    /// Sets the nonce length, keeping the tag length.
    pub fn set_nonce_len(&mut self, nonce_len: usize) -> Result<()> {
        self.expect("set_nonce_len", &[State::Uninitialized, State::Configured])?;
        let config = self.config.with_nonce_len(nonce_len)?;
        self.configure(config)
    }

    /// Sets the tag a following decryption must match. Its length must be
    /// the configured tag length.
    pub fn set_expected_tag(&mut self, tag: &[u8]) -> Result<()> {
        self.expect(
            "set_expected_tag",
            &[State::Uninitialized, State::Configured, State::Keyed],
        )?;
        check_tag(&self.config, tag)?;
        self.expected_tag.zeroize();
        self.expected_tag = Some(TagBuf::new(tag));
        Ok(())
    }

    /// Sets the nonce of the next message.
    ///
    /// From [`State::Finalized`] this starts a new message like
    /// [`reset`](Self::reset) does.
    pub fn set_nonce(&mut self, nonce: &[u8]) -> Result<()> {
        self.expect(
            "set_nonce",
            &[State::Uninitialized, State::Configured, State::Finalized],
        )?;
        format::check_nonce(&self.config, nonce)?;
        if self.state == State::Finalized {
            self.clear_message();
        }
        self.store_nonce(nonce);
        Ok(())
    }

    /// Replaces the cipher, and with it the key, then sets the nonce.
    pub fn set_key_and_nonce(&mut self, cipher: C, nonce: &[u8]) -> Result<()> {
        self.expect(
            "set_key_and_nonce",
            &[State::Uninitialized, State::Configured, State::Finalized],
        )?;
        format::check_nonce(&self.config, nonce)?;
        self.cipher = cipher;
        tracing::debug!("ccm context rekeyed");
        if self.state == State::Finalized {
            self.clear_message();
        }
        self.store_nonce(nonce);
        Ok(())
    }

    /// Drops all per-message state and starts a new message under the same
    /// key.
    pub fn reset(&mut self, nonce: &[u8]) -> Result<()> {
        self.expect(
            "reset",
            &[State::Keyed, State::PayloadProcessed, State::Finalized],
        )?;
        format::check_nonce(&self.config, nonce)?;
        self.clear_message();
        self.store_nonce(nonce);
        Ok(())
    }

    /// Appends associated data. It is authenticated but not encrypted.
    pub fn update_aad(&mut self, aad: &[u8]) -> Result<()> {
        self.expect("update_aad", &[State::Keyed])?;
        self.aad.extend_from_slice(aad);
        tracing::trace!(aad_len = self.aad.len(), "associated data appended");
        Ok(())
    }

    /// Encrypts the whole plaintext and returns the ciphertext. The tag is
    /// available through [`tag`](Self::tag) after [`finalize`](Self::finalize).
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.process_payload(Direction::Encrypt, plaintext)
    }

    /// Decrypts the whole ciphertext and checks it against the expected tag.
    ///
    /// The plaintext is only returned when the tag matches.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.process_payload(Direction::Decrypt, ciphertext)
    }

    /// Processes the complete payload of the current message.
    ///
    /// This can be called once per message; the payload length is part of
    /// the authenticated data.
    pub fn process_payload(
        &mut self,
        direction: Direction,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        self.expect("process_payload", &[State::Keyed])?;
        let mut out = data.to_vec();
        self.process_payload_in_place(direction, &mut out)?;
        Ok(out)
    }

    /// Processes the complete payload of the current message in place.
    ///
    /// When decryption fails to authenticate, `buf` is zeroed and
    /// [`Error::AuthenticationFailed`] is returned.
    pub fn process_payload_in_place(
        &mut self,
        direction: Direction,
        buf: &mut [u8],
    ) -> Result<()> {
        self.expect("process_payload", &[State::Keyed])?;
        let tag_len = self.config.tag_len();
        let expected = match direction {
            Direction::Encrypt => None,
            Direction::Decrypt => match self.expected_tag {
                Some(tag) if tag.len != tag_len => {
                    return Err(ConfigError::ExpectedTagMismatch {
                        expected: tag_len,
                        got: tag.len,
                    }
                    .into())
                }
                Some(tag) => Some(tag),
                None => return Err(self.sequence_error("decrypt without expected tag")),
            },
        };

        tracing::debug!(
            ?direction,
            payload_len = buf.len(),
            aad_len = self.aad.len(),
            tag_len,
            "processing ccm payload"
        );

        let mut tag = {
            let nonce = &self.nonce[..self.config.nonce_len()];
            let b0 = format::b0(
                &self.config,
                nonce,
                !self.aad.is_empty(),
                buf.len() as u64,
            )?;
            let keystream = Keystream::new(&self.cipher, nonce);
            keystream.check_len(buf.len())?;

            let mut mac = CbcMac::new(&self.cipher, &b0);
            mac.absorb_aad(&self.aad);
            match direction {
                Direction::Encrypt => {
                    mac.absorb_payload(buf);
                    keystream.apply(buf);
                }
                Direction::Decrypt => {
                    keystream.apply(buf);
                    mac.absorb_payload(buf);
                }
            }
            let mut y = mac.finish();
            let tag = keystream.mask_tag(&y, tag_len);
            y.zeroize();
            tag
        };

        self.direction = Some(direction);
        self.transition(State::PayloadProcessed);

        let result = match expected {
            None => {
                self.tag = Some(TagBuf::new(&tag[..tag_len]));
                Ok(())
            }
            Some(expected) => {
                if bool::from(expected.as_bytes().ct_eq(&tag[..tag_len])) {
                    Ok(())
                } else {
                    buf.zeroize();
                    tracing::debug!("ccm tag verification failed");
                    Err(Error::AuthenticationFailed)
                }
            }
        };
        tag.zeroize();
        result
    }

    /// Completes the current message. Produces no output.
    pub fn finalize(&mut self) -> Result<()> {
        self.expect("finalize", &[State::PayloadProcessed])?;
        self.transition(State::Finalized);
        Ok(())
    }

    /// The tag of the finalized encrypted message.
    pub fn tag(&self) -> Result<&[u8]> {
        match (&self.tag, self.state) {
            (Some(tag), State::Finalized) => Ok(tag.as_bytes()),
            _ => Err(self.sequence_error("tag")),
        }
    }

    fn store_nonce(&mut self, nonce: &[u8]) {
        if self.state == State::Uninitialized {
            tracing::trace!("using default ccm parameters");
        }
        self.nonce = [0u8; MAX_NONCE_LEN];
        self.nonce[..nonce.len()].copy_from_slice(nonce);
        self.transition(State::Keyed);
    }

    fn clear_message(&mut self) {
        self.aad.zeroize();
        self.expected_tag.zeroize();
        self.tag.zeroize();
        self.direction = None;
    }

    fn expect(&self, operation: &'static str, allowed: &[State]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.sequence_error(operation))
        }
    }

    fn sequence_error(&self, operation: &'static str) -> Error {
        tracing::debug!(operation, state = self.state.name(), "ccm call out of sequence");
        Error::SequenceError {
            operation,
            state: self.state.name(),
        }
    }

    fn transition(&mut self, to: State) {
        tracing::trace!(from = self.state.name(), to = to.name(), "ccm state change");
        self.state = to;
    }
}

fn check_tag(config: &CcmConfig, tag: &[u8]) -> Result<()> {
    if tag.len() != config.tag_len() {
        return Err(ConfigError::ExpectedTagMismatch {
            expected: config.tag_len(),
            got: tag.len(),
        }
        .into());
    }
    Ok(())
}

impl<C> Drop for CcmContext<C> {
    fn drop(&mut self) {
        self.aad.zeroize();
        self.expected_tag.zeroize();
        self.tag.zeroize();
    }
}

impl<C> fmt::Debug for CcmContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CcmContext")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}
