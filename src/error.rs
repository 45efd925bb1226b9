//! CCM errors.

use thiserror::Error;

/// The error type for the CCM engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A length or size parameter is out of range. Raised before any block
    /// cipher call is made.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// The key handed to a cipher factory has the wrong size.
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    /// An operation was called in a state that does not allow it.
    #[error("`{operation}` is not allowed in state {state}")]
    SequenceError {
        operation: &'static str,
        state: &'static str,
    },
    /// The tag did not match. No plaintext has been released.
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Which configuration rule was broken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("bad tag length {0}, allowed sizes are: 4, 6, 8, 10, 12, 14, 16")]
    TagLength(usize),
    #[error("bad nonce length {0}, allowed sizes are 7 to 13")]
    NonceLength(usize),
    #[error("nonce is {got} bytes but the context expects {expected}")]
    NonceMismatch { expected: usize, got: usize },
    #[error("expected tag is {got} bytes but the tag length is {expected}")]
    ExpectedTagMismatch { expected: usize, got: usize },
    #[error("payload of {len} bytes exceeds the maximum of {max} bytes")]
    PayloadTooLong { len: u64, max: u64 },
    #[error("payload needs {blocks} counter blocks, the counter field holds {max}")]
    CounterOverflow { blocks: u64, max: u64 },
}

/// Shorthand for results returned by this crate.
pub type Result<T> = core::result::Result<T, Error>;
