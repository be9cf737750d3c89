#[path = "../common/mod.rs"]
mod common;

use librfcl::Error;
use librfcl::constants::MAX_PAYLOAD_LEN;
use librfcl::protocol::Frame;

#[test]
fn ppse_select_frame_layout() {
    let apdu = common::fixtures::select_ppse();
    let frame = Frame::new(0x03, 0x96, &apdu).expect("frame");
    let content = frame.content();
    assert_eq!(&content[..3], &[0x03, 0x96, apdu.len() as u8]);
    assert_eq!(&content[3..], apdu.as_slice());

    let wire = frame.content_with_checksum();
    let parsed = Frame::parse_checked(&wire).expect("parse");
    assert_eq!(parsed, frame);
}

#[test]
fn long_payload_round_trip_uses_two_continuations() {
    let payload = vec![0xA5u8; 260];
    let frame = Frame::new(0x00, 0x00, &payload).unwrap();
    let content = frame.content();
    assert_eq!(&content[2..5], &[0x80, 0x80, 0x04]);
    assert_eq!(Frame::parse_content(&content).unwrap().payload, payload);
}

#[test]
fn checksum_mismatch_reported_with_both_values() {
    let mut wire = Frame::new(0x01, 0x00, &common::fixtures::sw_ok())
        .unwrap()
        .content_with_checksum();
    let last = wire.len() - 1;
    let good = wire[last];
    wire[last] ^= 0xFF;
    match Frame::parse_checked(&wire) {
        Err(Error::ChecksumMismatch { expected, actual }) => {
            assert_eq!(expected, good);
            assert_eq!(actual, good ^ 0xFF);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn length_must_cover_every_byte() {
    assert!(matches!(
        Frame::parse_content(&[0x01, 0x00, 0x02, 0xAA]),
        Err(Error::FrameFormat(_))
    ));
    assert!(matches!(
        Frame::parse_content(&[0x01, 0x00, 0x01, 0xAA, 0xBB]),
        Err(Error::FrameFormat(_))
    ));
}

#[test]
fn oversized_payload_rejected() {
    let payload = vec![0u8; MAX_PAYLOAD_LEN + 1];
    assert!(matches!(
        Frame::new(0, 0, &payload),
        Err(Error::PayloadTooLarge { .. })
    ));
}

#[test]
fn time_extension_is_empty_fe_status() {
    assert!(Frame::new(4, 0xFE, &[]).unwrap().is_time_extension());
    assert!(!Frame::new(4, 0xFE, &[0x00]).unwrap().is_time_extension());
}
