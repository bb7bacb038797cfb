//! The invocation wrapper: request builder, send, response decoding.

use std::time::{Duration, Instant};

use log::debug;
use tlwire_codec::{Instance, MethodDef, Registry, Value, decode_response};

use crate::errors::InvokeError;
use crate::transport::Transport;

/// A decoded answer.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    /// The decoded result.
    pub value: Value,
    /// Time spent in the transport.
    pub elapsed: Duration,
}

/// One call of a compiled method.
///
/// ```rust,no_run
/// # use tlwire_codec::{MethodDef, Registry, Value};
/// # use tlwire_rpc::{MethodCall, Transport};
/// # async fn run<T: Transport>(registry: &Registry, req_pq: &MethodDef, transport: &T) {
/// let response = MethodCall::new(registry, req_pq)
///     .arg("nonce", Value::big("0x3e0549828cca27e966b301a48fece2fc"))
///     .transport(transport)
///     .invoke()
///     .await
///     .unwrap();
/// println!("{:?} after {:?}", response.value, response.elapsed);
/// # }
/// ```
pub struct MethodCall<'a, T> {
    registry: &'a Registry,
    method: &'a MethodDef,
    request: Instance,
    transport: Option<&'a T>,
    error: Option<tlwire_codec::Error>,
}

impl<'a, T: Transport> MethodCall<'a, T> {
    /// Start building a call of `method`, resolving responses through `registry`.
    pub fn new(registry: &'a Registry, method: &'a MethodDef) -> Self {
        Self { registry, method, request: method.request(), transport: None, error: None }
    }

    /// Set a request parameter. The first failure is kept and reported by
    /// [`MethodCall::invoke`].
    pub fn arg(mut self, name: &str, value: impl Into<Value>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.request.set(name, value) {
                self.error = Some(e);
            }
        }
        self
    }

    /// The transport that will carry the request.
    pub fn transport(mut self, transport: &'a T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Serialize, send and decode.
    ///
    /// Fails with [`InvokeError::MissingTransport`] before encoding anything
    /// if no transport was given.
    pub async fn invoke(self) -> Result<Response, InvokeError> {
        let Some(transport) = self.transport else {
            return Err(InvokeError::MissingTransport);
        };
        if let Some(e) = self.error {
            return Err(InvokeError::Encode(e));
        }

        let mut request = self.request;
        let bytes = request.serialize(false).map_err(InvokeError::Encode)?;
        debug!("[tlwire] invoking {} ({} bytes)", self.method.name, bytes.len());

        let started = Instant::now();
        let reply = transport
            .send(bytes.to_vec())
            .await
            .map_err(|e| InvokeError::Transport(Box::new(e)))?;
        let elapsed = started.elapsed();
        debug!("[tlwire] {} answered {} bytes in {elapsed:?}", self.method.name, reply.len());

        let value = decode_response(self.registry, self.method, reply).map_err(InvokeError::Decode)?;
        Ok(Response { value, elapsed })
    }
}
