use std::error::Error as _;
use std::future::Future;
use std::io;
use std::sync::Mutex;

use tlwire_codec::{Compiler, MethodDef, Registry, Value};
use tlwire_rpc::{InvokeError, MethodCall, Transport};
use tlwire_schema::SchemaEntry;

const RES_PQ_HEX: &str = "632416053e0549828cca27e966b301a48fece2fca5cf4d33f4a11ea877ba4aa5\
                          739073300817ed48941a08f98100000015c4b51c01000000216be86c022bb4c3";

fn unhex(s: &str) -> Vec<u8> {
    (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap()).collect()
}

fn setup() -> (Registry, MethodDef) {
    let mut registry = Registry::new();
    let mut compiler = Compiler::new(&mut registry);
    compiler
        .compile(
            "mtproto",
            &SchemaEntry::constructor("resPQ", Some(0x05162463), "ResPQ")
                .param("nonce", "int128")
                .param("server_nonce", "int128")
                .param("pq", "bytes")
                .param("server_public_key_fingerprints", "Vector<long>"),
        )
        .unwrap();
    let req_pq = compiler
        .compile_method("mtproto", &SchemaEntry::method("req_pq", Some(0x60469778), "ResPQ").param("nonce", "int128"))
        .unwrap();
    registry.seal();
    (registry, req_pq)
}

// ── In-memory transports ──────────────────────────────────────────────────────

struct Canned {
    reply: Vec<u8>,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl Canned {
    fn new(reply: Vec<u8>) -> Self {
        Self { reply, sent: Mutex::new(Vec::new()) }
    }

    fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for Canned {
    type Error = io::Error;

    fn send(&self, request: Vec<u8>) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send {
        self.sent.lock().unwrap().push(request);
        let reply = self.reply.clone();
        async move { Ok(reply) }
    }
}

struct Offline;

impl Transport for Offline {
    type Error = io::Error;

    fn send(&self, _request: Vec<u8>) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send {
        async { Err(io::Error::new(io::ErrorKind::NotConnected, "offline")) }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn req_pq_round_trip() {
    let (registry, req_pq) = setup();
    let transport = Canned::new(unhex(RES_PQ_HEX));

    let response = MethodCall::new(&registry, &req_pq)
        .arg("nonce", Value::big("0x3e0549828cca27e966b301a48fece2fc"))
        .transport(&transport)
        .invoke()
        .await
        .unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].len(), 4 + 16);
    assert_eq!(&sent[0][..4], &[0x78, 0x97, 0x46, 0x60]);

    let res_pq = response.value.as_object().unwrap();
    assert_eq!(res_pq.type_name(), "mtproto.ResPQ");
    assert_eq!(res_pq.get("pq"), Some(&Value::Bytes(unhex("17ed48941a08f981"))));
}

#[tokio::test]
async fn missing_transport_fails_first() {
    let (registry, req_pq) = setup();
    let err = MethodCall::<Canned>::new(&registry, &req_pq)
        .arg("nonce", Value::big("0x1"))
        .invoke()
        .await
        .unwrap_err();
    assert!(matches!(err, InvokeError::MissingTransport));
}

#[tokio::test]
async fn bad_arguments_are_not_sent() {
    let (registry, req_pq) = setup();
    let transport = Canned::new(unhex(RES_PQ_HEX));

    let err = MethodCall::new(&registry, &req_pq)
        .arg("nonse", Value::big("0x1"))
        .transport(&transport)
        .invoke()
        .await
        .unwrap_err();
    assert!(matches!(err, InvokeError::Encode(_)));

    let err = MethodCall::new(&registry, &req_pq).transport(&transport).invoke().await.unwrap_err();
    assert!(matches!(err, InvokeError::Encode(tlwire_codec::Error::MissingField { .. })));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn transport_errors_keep_their_source() {
    let (registry, req_pq) = setup();
    let err = MethodCall::new(&registry, &req_pq)
        .arg("nonce", Value::big("0x1"))
        .transport(&Offline)
        .invoke()
        .await
        .unwrap_err();
    assert!(matches!(err, InvokeError::Transport(_)));
    assert_eq!(err.source().unwrap().to_string(), "offline");
}

#[tokio::test]
async fn undecodable_replies_are_decode_errors() {
    let (registry, req_pq) = setup();
    let transport = Canned::new(vec![1, 2, 3, 4]);
    let err = MethodCall::new(&registry, &req_pq)
        .arg("nonce", Value::big("0x1"))
        .transport(&transport)
        .invoke()
        .await
        .unwrap_err();
    assert!(matches!(err, InvokeError::Decode(tlwire_codec::Error::TypeNotFoundById { id: 0x04030201 })));
}
