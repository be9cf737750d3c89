// librfcl/src/reader/negotiate.rs

//! Connect-time discovery of the reader's baud rate and wire encoding.

use log::{debug, info};

use crate::error::ErrorKind;
use crate::protocol::codec::codec_for;
use crate::protocol::commands::Command;
use crate::protocol::Dialog;
use crate::reader::builder::LinkConfig;
use crate::transport::Transport;
use crate::types::{FirmwareInfo, WireProtocol};
use crate::{Error, Result};

/// Outcome of a successful negotiation.
pub struct Negotiated {
    pub dialog: Dialog,
    pub baudrate: u32,
    pub firmware: FirmwareInfo,
}

/// Encodings allowed by `config`, in probing order.
pub fn candidate_protocols(config: &LinkConfig) -> Vec<WireProtocol> {
    WireProtocol::NEGOTIATION_ORDER
        .into_iter()
        .filter(|p| config.protocols.contains(p.mask()))
        .collect()
}

/// Probe every allowed (baud rate, encoding) pair with `GetFirmware`; the
/// first pair that gets an answer is kept.
///
/// Link failures (I/O, missing device) abort at once. Anything else only
/// means the reader did not understand this combination.
pub fn negotiate(mut transport: Box<dyn Transport>, config: &LinkConfig) -> Result<Negotiated> {
    transport.set_timeouts(config.timeouts)?;
    let protocols = candidate_protocols(config);
    let probe = Command::GetFirmware;
    let mut first_error: Option<Error> = None;

    for baudrate in config.candidate_baudrates() {
        transport.set_baudrate(baudrate)?;
        for &protocol in &protocols {
            debug!("probing {protocol} at {baudrate} baud");
            let mut dialog = Dialog::new(transport, codec_for(protocol, config.bus_address));
            match dialog.transceive(probe.command_code(), &probe.encode()) {
                Ok(reply) => {
                    let firmware = FirmwareInfo::parse(&reply.payload);
                    info!(
                        "reader '{}' answers {protocol} at {baudrate} baud, capabilities {:?}",
                        firmware.version, firmware.capabilities
                    );
                    return Ok(Negotiated {
                        dialog,
                        baudrate,
                        firmware,
                    });
                }
                Err(e) if is_link_failure(&e) => return Err(e),
                Err(e) => {
                    debug!("{protocol} at {baudrate} baud: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                    transport = dialog.into_transport();
                }
            }
        }
    }

    Err(match first_error {
        Some(e) if e.is_silence() => Error::NoResponse,
        Some(e) => e,
        None => Error::NoResponse,
    })
}

fn is_link_failure(err: &Error) -> bool {
    match err {
        Error::Io(_) | Error::DeviceNotFound => true,
        #[cfg(feature = "serial")]
        Error::Serial(_) => true,
        e => e.kind() == ErrorKind::Contract,
    }
}
