// librfcl/src/tcl/mod.rs

//! ISO/IEC 14443-4 ("T=CL") block transport for readers that cannot run
//! it themselves.

pub mod block;
pub mod channel;
pub(crate) mod engine;
pub mod session;

pub use block::{Block, SBlockKind};
pub use channel::{BlockChannel, Layer3, SoftwareChannel};
pub use session::{TclSession, frame_size};
