#[path = "../common/mod.rs"]
mod common;

use librfcl::Error;
use librfcl::protocol::length::{LengthDecoder, decode_len, encode_len, encoded_len};

fn enc(len: usize) -> Vec<u8> {
    let mut v = Vec::new();
    encode_len(len, &mut v);
    v
}

#[test]
fn boundaries_around_one_continuation() {
    assert_eq!(enc(127), vec![0x7F]);
    assert_eq!(enc(128), vec![0x80, 0x00]);
    assert_eq!(enc(255), vec![0x80, 0x7F]);
    assert_eq!(enc(256), vec![0x80, 0x80, 0x00]);
    assert_eq!(encoded_len(256), 3);
}

#[test]
fn continuation_low_bits_are_ignored() {
    // Any byte >= 0x80 counts as exactly 0x80.
    assert_eq!(decode_len(&[0xFF, 0x05]).unwrap(), (0x85, 2));
    assert_eq!(decode_len(&[0x81, 0x83, 0x00]).unwrap(), (0x100, 3));
}

#[test]
fn incremental_decoder_matches_slice_decoder() {
    let field = enc(300);
    let mut decoder = LengthDecoder::new();
    let mut result = None;
    for &b in &field {
        result = decoder.push(b).unwrap();
    }
    assert_eq!(result, Some(300));
    assert_eq!(decode_len(&field).unwrap(), (300, field.len()));
}

#[test]
fn runaway_length_field_rejected() {
    let field = vec![0x80u8; 64];
    assert!(matches!(decode_len(&field), Err(Error::FrameFormat(_))));
}

#[test]
fn truncated_field_rejected() {
    assert!(matches!(decode_len(&[0x80, 0x80]), Err(Error::FrameFormat(_))));
}
