//! The transport collaborator.
//!
//! Implement [`Transport`] over TCP, WebSocket, an in-process channel or
//! anything else that can carry a complete request and return a complete
//! response.

use std::future::Future;

/// Exchanges one serialized request for one serialized response.
///
/// Implementations own their framing and buffering; the payload they see is
/// exactly the TL encoding of the request. `send` takes `&self` so one
/// transport can carry several calls at once.
pub trait Transport {
    /// The error type returned when the exchange fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send `request` and resolve to the raw response bytes.
    fn send(&self, request: Vec<u8>) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;
}
