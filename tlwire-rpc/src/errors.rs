//! Error type for method invocation.

use std::fmt;

// ─── InvokeError ──────────────────────────────────────────────────────────────

/// Why a [`crate::MethodCall`] failed.
#[derive(Debug)]
pub enum InvokeError {
    /// No transport was supplied; nothing was serialized or sent.
    MissingTransport,
    /// The request could not be built or encoded.
    Encode(tlwire_codec::Error),
    /// The transport failed to deliver the request or the response.
    Transport(Box<dyn std::error::Error + Send + Sync>),
    /// The response could not be decoded.
    Decode(tlwire_codec::Error),
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTransport => write!(f, "no transport supplied"),
            Self::Encode(e)        => write!(f, "encode error: {e}"),
            Self::Transport(e)     => write!(f, "transport error: {e}"),
            Self::Decode(e)        => write!(f, "decode error: {e}"),
        }
    }
}

impl std::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingTransport => None,
            Self::Encode(e) | Self::Decode(e) => Some(e),
            Self::Transport(e) => Some(&**e),
        }
    }
}
