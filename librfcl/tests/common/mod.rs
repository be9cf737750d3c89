// Shared helpers for the integration tests. Each test crate includes this
// module through a `#[path]` attribute, so not every helper is used
// everywhere.
#![allow(dead_code)]


use librfcl::protocol::codec::BinaryCodec;
use librfcl::protocol::Frame;
use librfcl::transport::mock::MockTransport;

/// Initialise logging once; `RUST_LOG=trace` shows the wire traffic.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Queue Binary-encoded reader answers on a mock.
pub fn seed_binary_replies(mock: &mut MockTransport, replies: &[(u8, u8, &[u8])]) {
    for &(seq, status, payload) in replies {
        let frame = Frame::new(seq, status, payload).expect("reply frame");
        mock.push_response(BinaryCodec::encode(&frame));
    }
}
