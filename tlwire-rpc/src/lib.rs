//! Method invocation over a pluggable transport.
//!
//! This crate couples a compiled [`MethodDef`](tlwire_codec::MethodDef) to
//! anything that can exchange one request buffer for one response buffer:
//!
//! * [`Transport`]: the byte-buffer-in, byte-buffer-out collaborator;
//! * [`MethodCall`]: builds the request, sends it and decodes the answer.
//!
//! It is intentionally runtime-agnostic: bring your own TCP/WebSocket and
//! executor. Framing, sessions and encryption live below the transport.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod call;
pub mod errors;
pub mod transport;

pub use call::{MethodCall, Response};
pub use errors::InvokeError;
pub use transport::Transport;
