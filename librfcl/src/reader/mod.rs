// librfcl/src/reader/mod.rs

//! Reader session: connection settings, negotiation and the connected
//! handle through which every reader command is routed.

pub mod builder;
pub mod handle;
pub mod negotiate;

pub use builder::{LinkConfig, ReaderBuilder};
pub use handle::{Connected, Reader, Unconnected};
