//! CCM parameters.

use crate::error::{ConfigError, Result};

/// Tag length used when none is configured.
pub const DEFAULT_TAG_LEN: usize = 16;
/// Nonce length used when none is configured.
pub const DEFAULT_NONCE_LEN: usize = 12;

pub const MIN_NONCE_LEN: usize = 7;
pub const MAX_NONCE_LEN: usize = 13;

/// Tag length `M` and nonce length `N` of a CCM instance.
///
/// The length field of every formatted block takes the remaining
/// `L = 15 - N` bytes, so a shorter nonce allows longer payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CcmConfig {
    tag_len: usize,
    nonce_len: usize,
}

impl CcmConfig {
    /// Creates a new `CcmConfig`.
    ///
    /// Valid `tag_len` values are: 4, 6, 8, 10, 12, 14, 16.
    /// Valid `nonce_len` values are 7 to 13.
    pub fn new(tag_len: usize, nonce_len: usize) -> Result<Self> {
        check_tag_len(tag_len)?;
        check_nonce_len(nonce_len)?;

        Ok(CcmConfig { tag_len, nonce_len })
    }

    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    pub fn nonce_len(&self) -> usize {
        self.nonce_len
    }

    /// Returns a copy with another tag length.
    pub fn with_tag_len(self, tag_len: usize) -> Result<Self> {
        CcmConfig::new(tag_len, self.nonce_len)
    }

    /// Returns a copy with another nonce length.
    pub fn with_nonce_len(self, nonce_len: usize) -> Result<Self> {
        CcmConfig::new(self.tag_len, nonce_len)
    }

    /// Size `L` in bytes of the length/counter field.
    pub fn length_field_len(&self) -> usize {
        15 - self.nonce_len
    }

    /// Largest payload in bytes that fits the length field: 2^(8L) - 1.
    pub fn max_payload_len(&self) -> u64 {
        max_for_field(self.length_field_len())
    }
}

impl Default for CcmConfig {
    fn default() -> Self {
        CcmConfig {
            tag_len: DEFAULT_TAG_LEN,
            nonce_len: DEFAULT_NONCE_LEN,
        }
    }
}

/// Largest value an `l`-byte big-endian field can hold.
pub(crate) fn max_for_field(l: usize) -> u64 {
    if l >= 8 {
        u64::MAX
    } else {
        (1u64 << (8 * l)) - 1
    }
}

pub(crate) fn check_tag_len(tag_len: usize) -> Result<()> {
    if !(4..=16).contains(&tag_len) || tag_len & 1 != 0 {
        return Err(ConfigError::TagLength(tag_len).into());
    }
    Ok(())
}

pub(crate) fn check_nonce_len(nonce_len: usize) -> Result<()> {
    if !(MIN_NONCE_LEN..=MAX_NONCE_LEN).contains(&nonce_len) {
        return Err(ConfigError::NonceLength(nonce_len).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn tag_len() {
        // Check that only even tags in [4, 16] are allowed
        for i in 0..=18 {
            let config = CcmConfig::new(i, DEFAULT_NONCE_LEN);
            if i % 2 == 0 && (4..=16).contains(&i) {
                assert_eq!(i, config.unwrap().tag_len());
            } else {
                assert_eq!(
                    Error::InvalidConfiguration(ConfigError::TagLength(i)),
                    config.unwrap_err()
                );
            }
        }
    }

    #[test]
    fn nonce_len() {
        for i in 0..=16 {
            let config = CcmConfig::new(DEFAULT_TAG_LEN, i);
            assert_eq!((7..=13).contains(&i), config.is_ok(), "nonce {}", i);
        }
    }

    #[test]
    fn defaults() {
        let config = CcmConfig::default();
        assert_eq!(16, config.tag_len());
        assert_eq!(12, config.nonce_len());
        assert_eq!(3, config.length_field_len());
        assert_eq!(0xFF_FFFF, config.max_payload_len());
    }

    #[test]
    fn length_field_bounds() {
        let short = CcmConfig::new(8, 13).unwrap();
        assert_eq!(2, short.length_field_len());
        assert_eq!(0xFFFF, short.max_payload_len());

        let long = CcmConfig::new(8, 7).unwrap();
        assert_eq!(8, long.length_field_len());
        assert_eq!(u64::MAX, long.max_payload_len());
    }

    #[test]
    fn with_setters_validate() {
        let config = CcmConfig::default();
        assert_eq!(8, config.with_tag_len(8).unwrap().tag_len());
        assert!(config.with_tag_len(5).is_err());
        assert_eq!(13, config.with_nonce_len(13).unwrap().nonce_len());
        assert!(config.with_nonce_len(14).is_err());
    }
}
