#[path = "../common/mod.rs"]
mod common;

use librfcl::Error;
use librfcl::transport::Transport;
use librfcl::transport::mock::MockTransport;
use librfcl::types::{InterfaceKind, Timeouts};

#[test]
fn mock_transport_send_and_receive() {
    let mut m = MockTransport::new();
    m.push_response(vec![0x01, 0x02]);
    m.send(&[0xAA]).unwrap();
    assert_eq!(m.sent, vec![vec![0xAA]]);

    let mut buf = [0u8; 2];
    m.receive(&mut buf, 250).unwrap();
    assert_eq!(buf, [0x01, 0x02]);
    assert_eq!(m.reads, vec![(2, 250)]);
}

#[test]
fn partial_read_times_out() {
    let mut m = MockTransport::new();
    m.push_response(vec![0x01]);
    let mut buf = [0u8; 2];
    assert!(matches!(m.receive(&mut buf, 10), Err(Error::Timeout)));
}

#[test]
fn timeouts_and_interface_are_reported() {
    let mut m = MockTransport::with_interface(InterfaceKind::UsbSerial);
    m.set_timeouts(Timeouts::new(500, 20)).unwrap();
    assert_eq!(m.timeouts(), Timeouts::new(500, 20));
    assert_eq!(m.interface(), InterfaceKind::UsbSerial);

    m.set_baudrate(9_600).unwrap();
    m.set_baudrate(115_200).unwrap();
    assert_eq!(m.baudrates, vec![9_600, 115_200]);
}

#[test]
fn purge_leaves_later_bursts_alone() {
    let mut m = MockTransport::new();
    m.push_response(vec![0xEE, 0xEE]);
    m.push_silence();
    m.push_response(vec![0x42]);
    m.purge().unwrap();
    assert!(matches!(m.receive_byte(10), Err(Error::Timeout)));
    assert_eq!(m.receive_byte(10).unwrap(), 0x42);
}
