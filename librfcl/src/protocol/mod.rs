// librfcl/src/protocol/mod.rs

pub mod checksum;
pub mod codec;
pub mod commands;
pub mod dialog;
pub mod frame;
pub mod length;

pub use checksum::{crc_a, crc_b, xor};
pub use codec::{FrameCodec, Inbound, codec_for};
pub use commands::Command;
pub use dialog::{Dialog, DialogState};
pub use frame::Frame;
