#[path = "../common/mod.rs"]
mod common;

use librfcl::protocol::Command;
use librfcl::protocol::commands::{CMD_SET_RF_MODE, CMD_TCL_DESELECT, CMD_TCL_EXCHANGE};
use librfcl::types::{Cid, Nad, RfMode};

#[test]
fn tcl_exchange_carries_cid_nad_and_message() {
    let apdu = common::fixtures::select_ppse();
    let cmd = Command::TclExchange {
        cid: Some(Cid::new(1)),
        nad: Some(Nad::new(0x12)),
        message: apdu.clone(),
    };
    assert_eq!(cmd.command_code(), CMD_TCL_EXCHANGE);

    let payload = cmd.encode();
    assert_eq!(&payload[..3], &[0x03, 0x01, 0x12]);
    assert_eq!(&payload[3..], apdu.as_slice());
}

#[test]
fn tcl_exchange_without_addressing() {
    let cmd = Command::TclExchange {
        cid: None,
        nad: None,
        message: common::fixtures::sw_ok(),
    };
    assert_eq!(cmd.encode(), vec![0x00, 0x00, 0x00, 0x90, 0x00]);
}

#[test]
fn deselect_and_rf_mode() {
    let deselect = Command::TclDeselect {
        cid: Some(Cid::new(4)),
    };
    assert_eq!(deselect.command_code(), CMD_TCL_DESELECT);
    assert_eq!(deselect.encode(), vec![0x01, 0x04]);
    assert_eq!(Command::TclDeselect { cid: None }.encode(), vec![0x00, 0x00]);

    let rf = Command::SetRfMode { mode: RfMode::TypeB };
    assert_eq!(rf.command_code(), CMD_SET_RF_MODE);
    assert_eq!(rf.encode(), vec![0x02]);
}

#[test]
fn raw_command_passes_through() {
    let cmd = Command::Raw {
        code: 0x4C,
        payload: vec![0x26],
    };
    assert_eq!(cmd.command_code(), 0x4C);
    assert_eq!(cmd.encode(), vec![0x26]);
}
