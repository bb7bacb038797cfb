use tlwire_codec::{Cursor, Error, Writer};

fn written(f: impl FnOnce(&mut Writer) -> Result<(), Error>) -> Vec<u8> {
    let mut w = Writer::new();
    f(&mut w).unwrap();
    w.finish().to_vec()
}

// ── Integers ──────────────────────────────────────────────────────────────────

#[test]
fn roundtrip_int32() {
    for v in [0i32, -1, i32::MAX, i32::MIN, 42] {
        let bytes = written(|w| w.write_int32(v as u32));
        assert_eq!(bytes, v.to_le_bytes());
        assert_eq!(Cursor::from_slice(&bytes).read_int32().unwrap() as i32, v);
    }
}

#[test]
fn roundtrip_double() {
    for v in [0.0f64, -1.5, f64::MAX, 3.25] {
        let bytes = written(|w| w.write_double(v));
        assert_eq!(Cursor::from_slice(&bytes).read_double().unwrap(), v);
    }
}

#[test]
fn bool_ids() {
    assert_eq!(written(|w| w.write_bool(true)), 0x997275b5u32.to_le_bytes());
    assert_eq!(written(|w| w.write_bool(false)), 0xbc799737u32.to_le_bytes());
    let err = Cursor::from_slice(&[0, 0, 0, 0]).read_bool().unwrap_err();
    assert_eq!(err, Error::InvalidBool { id: 0 });
}

// ── Big integers ──────────────────────────────────────────────────────────────

#[test]
fn roundtrip_int128() {
    let hex = "0x0102030405060708090a0b0c0d0e0f10";
    let bytes = written(|w| w.write_fixed_bigint(hex, 16));
    assert_eq!(bytes[0], 0x10);
    assert_eq!(bytes[15], 0x01);
    assert_eq!(Cursor::from_slice(&bytes).read_fixed_bigint(16).unwrap(), hex);
}

#[test]
fn roundtrip_int256() {
    let hex = format!("0x{}", "ab".repeat(32));
    let bytes = written(|w| w.write_fixed_bigint(&hex, 32));
    assert_eq!(bytes, [0xab; 32]);
    assert_eq!(Cursor::from_slice(&bytes).read_fixed_bigint(32).unwrap(), hex);
}

#[test]
fn negative_decimal_long() {
    let bytes = written(|w| w.write_fixed_bigint("-2", 8));
    assert_eq!(bytes, (-2i64).to_le_bytes());
    assert_eq!(Cursor::from_slice(&bytes).read_fixed_bigint(8).unwrap(), "0xfffffffffffffffe");
}

// ── String / bytes ────────────────────────────────────────────────────────────

#[test]
fn roundtrip_empty_string() {
    let bytes = written(|w| w.write_utf8_string(""));
    assert_eq!(bytes, [0, 0, 0, 0]);
    assert_eq!(Cursor::from_slice(&bytes).read_utf8_string().unwrap(), "");
}

#[test]
fn roundtrip_short_string() {
    let bytes = written(|w| w.write_utf8_string("hello world"));
    assert_eq!(bytes.len() % 4, 0, "must be 4-byte aligned");
    assert_eq!(Cursor::from_slice(&bytes).read_utf8_string().unwrap(), "hello world");
}

#[test]
fn roundtrip_long_string() {
    // >253 bytes triggers the 4-byte length header path
    let s = "x".repeat(300);
    let bytes = written(|w| w.write_utf8_string(&s));
    assert_eq!(&bytes[..4], &[0xfe, 0x2c, 0x01, 0x00]);
    assert_eq!(bytes.len() % 4, 0);
    assert_eq!(Cursor::from_slice(&bytes).read_utf8_string().unwrap(), s);
}

#[test]
fn roundtrip_bytes_vec() {
    let v: Vec<u8> = (0u8..=255).collect();
    let bytes = written(|w| w.write_length_prefixed_bytes(&v, false));
    assert_eq!(Cursor::from_slice(&bytes).read_length_prefixed_bytes(false).unwrap(), v);
}

#[test]
fn padding_lands_next_field_on_a_word() {
    for len in 0..12usize {
        let payload = vec![0x5a; len];
        let bytes = written(|w| {
            w.write_length_prefixed_bytes(&payload, false)?;
            w.write_int32(0xdead_beef)
        });
        let mut c = Cursor::from_slice(&bytes);
        c.read_length_prefixed_bytes(false).unwrap();
        assert_eq!(c.pos() % 4, 0, "len {len}");
        assert_eq!(c.read_int32().unwrap(), 0xdead_beef);
    }
}

#[test]
fn invalid_utf8_is_reported() {
    let bytes = written(|w| w.write_length_prefixed_bytes(&[0xff, 0xfe], false));
    assert_eq!(Cursor::from_slice(&bytes).read_utf8_string(), Err(Error::InvalidUtf8));
}

// ── Cursor EOF detection ──────────────────────────────────────────────────────

#[test]
fn truncated_int_returns_eof() {
    let result = Cursor::from_slice(&[0x01, 0x02]).read_int32();
    assert_eq!(result, Err(Error::UnexpectedEof { needed: 4, remaining: 2 }));
}

#[test]
fn read_to_end_takes_the_rest() {
    let mut c = Cursor::from_slice(&[1, 2, 3, 4, 5]);
    c.skip(2).unwrap();
    assert_eq!(c.read_to_end(), &[3, 4, 5]);
    assert_eq!(c.remaining(), 0);
}
