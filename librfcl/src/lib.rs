// librfcl/src/lib.rs

//! librfcl
//!
//! Pure Rust host-side driver core for contactless smartcard readers:
//! multi-encoding framing, the retried command dialog, and the
//! ISO/IEC 14443-4 (T=CL) block protocol.

pub mod constants;
pub mod error;
pub mod prelude;
pub mod protocol;
pub mod reader;
pub mod tcl;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
