// librfcl/src/prelude.rs

pub use crate::protocol::{Command, Dialog, Frame};
pub use crate::reader::{Connected, LinkConfig, Reader, ReaderBuilder, Unconnected};
pub use crate::tcl::{BlockChannel, Layer3, SoftwareChannel, TclSession};
pub use crate::transport::Transport;
pub use crate::{
    Capabilities, CardFamily, Cid, Error, ErrorKind, FirmwareInfo, InterfaceKind, Nad,
    ProtocolMask, Result, RfMode, Timeouts, WireProtocol,
};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, ms};
