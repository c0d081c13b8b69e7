//! Error types for signature handling.

use thiserror::Error;

/// Failures on the signature recovery path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// R or S outside the valid scalar range, or a malformed signature body.
    #[error("invalid signature format")]
    InvalidFormat,

    /// S in the upper half of the curve order.
    #[error("malleable signature: S not in lower half of curve order")]
    MalleableSignature,

    /// Recovery id outside {0, 1, 27, 28}.
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// The curve library could not recover a public key.
    #[error("public key recovery failed")]
    RecoveryFailed,

    /// A concatenated signature blob whose length is not a positive
    /// multiple of 65.
    #[error("invalid signature blob: {0} bytes is not a positive multiple of 65")]
    InvalidBlobLength(usize),
}
