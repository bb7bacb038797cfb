//! The binary primitive layer: TL scalar encodings over a linear buffer.
//!
//! Encoding follows the [MTProto Binary Serialization] rules:
//!
//! * integers are little-endian, `int` is 4 bytes;
//! * `long`/`int128`/`int256` are 8/16/32 raw little-endian bytes;
//! * `bytes`/`string` are length-prefixed and zero-padded to 4-byte alignment.
//!
//! [`Writer`] accumulates chunks until it is finished; [`Cursor`] reads from
//! an immutable slice and never goes past its end.
//!
//! [MTProto Binary Serialization]: https://core.telegram.org/mtproto/serialize

use std::sync::Arc;

use crate::bigint;
use crate::error::{Error, Result};

/// `vector#1cb5c415 {t:Type} # [ t ] = Vector t`
pub const VECTOR_ID: u32 = 0x1cb5c415;
/// `boolTrue#997275b5 = Bool`
pub const BOOL_TRUE_ID: u32 = 0x997275b5;
/// `boolFalse#bc799737 = Bool`
pub const BOOL_FALSE_ID: u32 = 0xbc799737;

/// Short-form limit and long-form marker of the byte-counted prefix.
const BYTES_LONG_MARKER: u8 = 0xfe;
/// Short-form limit and long-form marker of the word-counted prefix.
const WORDS_LONG_MARKER: u8 = 0x7f;
/// Counts are stored in 3 bytes in the long form.
const MAX_COUNT: usize = 0x00ff_ffff;

/// Render a constructor id the way it appears on the wire (`05162463` → `63241605`).
pub fn id_hex(id: u32) -> String {
    id.to_le_bytes().iter().map(|b| format!("{b:02x}")).collect()
}

// ─── Writer ───────────────────────────────────────────────────────────────────

/// An append-only encoder.
///
/// Every write fails with [`Error::ReadOnly`] once [`Writer::finish`] has been
/// called; `finish` itself is idempotent and hands back the same buffer.
#[derive(Debug, Default)]
pub struct Writer {
    chunks: Vec<Vec<u8>>,
    len: usize,
    finished: Option<Arc<[u8]>>,
}

impl Writer {
    /// An empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` once [`Writer::finish`] has been called.
    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    fn push(&mut self, chunk: Vec<u8>) -> Result<()> {
        if self.finished.is_some() {
            return Err(Error::ReadOnly { type_name: "finished writer".into() });
        }
        self.len += chunk.len();
        self.chunks.push(chunk);
        Ok(())
    }

    /// Append `bytes` verbatim.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.push(bytes.to_vec())
    }

    /// 4 bytes, little-endian.
    pub fn write_int32(&mut self, value: u32) -> Result<()> {
        self.push(value.to_le_bytes().to_vec())
    }

    /// 8 bytes, little-endian IEEE-754.
    pub fn write_double(&mut self, value: f64) -> Result<()> {
        self.push(value.to_le_bytes().to_vec())
    }

    /// Boxed `Bool`: the `boolTrue`/`boolFalse` constructor id.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_int32(if value { BOOL_TRUE_ID } else { BOOL_FALSE_ID })
    }

    /// Exactly `width` bytes holding `value` (`0x…` hex or decimal).
    pub fn write_fixed_bigint(&mut self, value: &str, width: usize) -> Result<()> {
        let bytes = bigint::to_le_bytes(value, width)?;
        self.push(bytes)
    }

    /// A length-prefixed byte string.
    ///
    /// * byte-counted: `[len][data][pad]` if `len < 0xfe`, otherwise
    ///   `[0xfe][len as 3 LE bytes][data][pad]`, padded so the field is a
    ///   multiple of 4 bytes long;
    /// * word-counted (`word_length`): the count is `len / 4`, the
    ///   short-form limit and marker are `0x7f`, and no padding follows.
    pub fn write_length_prefixed_bytes(&mut self, bytes: &[u8], word_length: bool) -> Result<()> {
        let (count, marker) = if word_length {
            if bytes.len() % 4 != 0 {
                return Err(Error::MalformedLength { len: bytes.len() });
            }
            (bytes.len() / 4, WORDS_LONG_MARKER)
        } else {
            (bytes.len(), BYTES_LONG_MARKER)
        };
        if count > MAX_COUNT {
            return Err(Error::MalformedLength { len: bytes.len() });
        }

        let header: Vec<u8> = if count < usize::from(marker) {
            vec![count as u8]
        } else {
            vec![
                marker,
                (count & 0xff) as u8,
                ((count >> 8) & 0xff) as u8,
                ((count >> 16) & 0xff) as u8,
            ]
        };
        let total = header.len() + bytes.len();

        self.push(header)?;
        self.write_raw(bytes)?;
        if !word_length {
            let padding = (4 - total % 4) % 4;
            if padding > 0 {
                self.push(vec![0u8; padding])?;
            }
        }
        Ok(())
    }

    /// UTF-8 text through the byte-counted prefix.
    pub fn write_utf8_string(&mut self, value: &str) -> Result<()> {
        self.write_length_prefixed_bytes(value.as_bytes(), false)
    }

    /// Concatenate all chunks into the final image.
    ///
    /// Calling it again returns the same buffer without re-encoding.
    pub fn finish(&mut self) -> Arc<[u8]> {
        if let Some(buf) = &self.finished {
            return Arc::clone(buf);
        }
        let mut out = Vec::with_capacity(self.len);
        for chunk in self.chunks.drain(..) {
            out.extend_from_slice(&chunk);
        }
        let buf: Arc<[u8]> = out.into();
        self.finished = Some(Arc::clone(&buf));
        buf
    }
}

// ─── Cursor ───────────────────────────────────────────────────────────────────

/// A zero-copy read cursor over an in-memory byte slice.
///
/// The offset only moves forward; a read that would cross the end fails with
/// [`Error::UnexpectedEof`] and leaves the offset where it was.
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor positioned at the start of `buf`.
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte offset.
    pub fn pos(&self) -> usize { self.pos }

    /// Remaining bytes.
    pub fn remaining(&self) -> usize { self.buf.len() - self.pos }

    /// Total length of the underlying slice.
    pub fn len(&self) -> usize { self.buf.len() }

    /// `true` if the underlying slice is empty.
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::UnexpectedEof { needed: n, remaining: self.remaining() });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Advance past `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_exact(n).map(|_| ())
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_exact(1)?[0])
    }

    /// Consume all remaining bytes.
    pub fn read_to_end(&mut self) -> &'a [u8] {
        let out = &self.buf[self.pos..];
        self.pos = self.buf.len();
        out
    }

    /// Look at the next 4 bytes as a constructor id without advancing.
    pub fn peek_id(&self) -> Result<u32> {
        let bytes = self.buf.get(self.pos..self.pos + 4).ok_or(Error::UnexpectedEof {
            needed: 4,
            remaining: self.remaining(),
        })?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// 4 bytes, little-endian.
    pub fn read_int32(&mut self) -> Result<u32> {
        let b = self.read_exact(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// 8 bytes, little-endian IEEE-754.
    pub fn read_double(&mut self) -> Result<f64> {
        let b = self.read_exact(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(f64::from_le_bytes(arr))
    }

    /// Boxed `Bool`.
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_int32()? {
            BOOL_TRUE_ID => Ok(true),
            BOOL_FALSE_ID => Ok(false),
            id => Err(Error::InvalidBool { id }),
        }
    }

    /// `width` bytes as a `0x`-prefixed big-endian hex string.
    pub fn read_fixed_bigint(&mut self, width: usize) -> Result<String> {
        if width % 4 != 0 {
            return Err(Error::InvalidWidth { width });
        }
        Ok(bigint::from_le_bytes(self.read_exact(width)?))
    }

    /// Mirror of [`Writer::write_length_prefixed_bytes`], padding included.
    pub fn read_length_prefixed_bytes(&mut self, word_length: bool) -> Result<Vec<u8>> {
        let start = self.pos;
        let marker = if word_length { WORDS_LONG_MARKER } else { BYTES_LONG_MARKER };

        let first = self.read_byte()?;
        let count = if first < marker {
            usize::from(first)
        } else if first == marker {
            let b = self.read_exact(3)?;
            usize::from(b[0]) | usize::from(b[1]) << 8 | usize::from(b[2]) << 16
        } else {
            self.pos = start;
            return Err(Error::MalformedLength { len: usize::from(first) });
        };

        let len = if word_length { count * 4 } else { count };
        let data = match self.read_exact(len) {
            Ok(d) => d.to_vec(),
            Err(e) => {
                self.pos = start;
                return Err(e);
            }
        };

        if !word_length {
            let padding = (4 - (self.pos - start) % 4) % 4;
            if let Err(e) = self.skip(padding) {
                self.pos = start;
                return Err(e);
            }
        }
        Ok(data)
    }

    /// UTF-8 text through the byte-counted prefix.
    pub fn read_utf8_string(&mut self) -> Result<String> {
        String::from_utf8(self.read_length_prefixed_bytes(false)?).map_err(|_| Error::InvalidUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(bytes: &[u8]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_length_prefixed_bytes(bytes, false).unwrap();
        w.finish().to_vec()
    }

    #[test]
    fn padding_counts_the_prefix() {
        // 1-byte prefix + payload, rounded up to a multiple of 4.
        assert_eq!(encoded(&[]), [0, 0, 0, 0]);
        assert_eq!(encoded(&[1, 2, 3]), [3, 1, 2, 3]);
        assert_eq!(encoded(&[1, 2, 3, 4]), [4, 1, 2, 3, 4, 0, 0, 0]);
        assert_eq!(encoded(&[1, 2, 3, 4, 5]), [5, 1, 2, 3, 4, 5, 0, 0]);
    }

    #[test]
    fn long_form_switches_at_254() {
        let short = encoded(&[7u8; 253]);
        assert_eq!(short[0], 253);
        assert_eq!(short.len(), 256);

        let long = encoded(&[7u8; 254]);
        assert_eq!(&long[..4], &[0xfe, 254, 0, 0]);
        assert_eq!(long.len(), 260);
        assert_eq!(Cursor::from_slice(&long).read_length_prefixed_bytes(false).unwrap(), vec![7u8; 254]);
    }

    #[test]
    fn word_length_form() {
        let mut w = Writer::new();
        w.write_length_prefixed_bytes(&[9u8; 8], true).unwrap();
        let buf = w.finish();
        assert_eq!(&buf[..], &[2, 9, 9, 9, 9, 9, 9, 9, 9]);

        let mut w = Writer::new();
        w.write_length_prefixed_bytes(&[1u8; 4 * 0x7f], true).unwrap();
        let buf = w.finish();
        assert_eq!(&buf[..4], &[0x7f, 0x7f, 0, 0]);
        let mut c = Cursor::from_slice(&buf);
        assert_eq!(c.read_length_prefixed_bytes(true).unwrap().len(), 4 * 0x7f);
        assert_eq!(c.remaining(), 0);

        let mut w = Writer::new();
        assert!(matches!(w.write_length_prefixed_bytes(&[1, 2, 3], true), Err(Error::MalformedLength { .. })));
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let mut c = Cursor::from_slice(&[8, 1, 2, 3]);
        assert!(matches!(c.read_length_prefixed_bytes(false), Err(Error::UnexpectedEof { .. })));
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn reserved_prefix_byte_is_malformed() {
        let mut c = Cursor::from_slice(&[0xff, 0, 0, 0]);
        assert_eq!(c.read_length_prefixed_bytes(false), Err(Error::MalformedLength { len: 0xff }));
    }

    #[test]
    fn finished_writer_refuses_writes() {
        let mut w = Writer::new();
        w.write_int32(1).unwrap();
        let a = w.finish();
        let b = w.finish();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(matches!(w.write_int32(2), Err(Error::ReadOnly { .. })));
    }

    #[test]
    fn peek_does_not_advance() {
        let c = Cursor::from_slice(&[0x63, 0x24, 0x16, 0x05, 0xff]);
        assert_eq!(c.peek_id().unwrap(), 0x05162463);
        assert_eq!(c.pos(), 0);
        assert_eq!(id_hex(0x05162463), "63241605");
    }
}
