//! Peer identifiers.
//!
//! A [`PeerId`] is the public key of a node on the payment network. The byte
//! length is fixed per deployment (33 for compressed secp256k1 keys) and is
//! passed in at parse time rather than baked into the type, so tests and
//! alternative networks can use shorter identifiers.

use std::{fmt, sync::Arc};

use crate::PeerIdError;

/// Identifier length used by the payment network (compressed public key).
pub const DEFAULT_PEER_ID_LEN: usize = 33;

/// Number of leading bytes shown in the short form.
const SHORT_LEN: usize = 4;

/// Opaque, fixed-length peer identifier.
///
/// Cheap to clone: the bytes are shared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(Arc<[u8]>);

impl PeerId {
    /// Build an identifier from raw bytes.
    ///
    /// Fails unless `bytes` is exactly `expected_len` long.
    pub fn from_bytes(bytes: &[u8], expected_len: usize) -> Result<Self, PeerIdError> {
        if bytes.len() != expected_len {
            return Err(PeerIdError::Length { expected: expected_len, actual: bytes.len() });
        }
        Ok(Self(Arc::from(bytes)))
    }

    /// Parse the hex text form.
    pub fn parse_hex(input: &str, expected_len: usize) -> Result<Self, PeerIdError> {
        let bytes = hex::decode(input)?;
        Self::from_bytes(&bytes, expected_len)
    }

    /// Raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Full lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Hex of the first four bytes, used for titles and sender tags.
    pub fn short(&self) -> String {
        let end = self.0.len().min(SHORT_LEN);
        hex::encode(&self.0[..end])
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.short())
    }
}
