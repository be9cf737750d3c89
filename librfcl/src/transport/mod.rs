// librfcl/src/transport/mod.rs

pub mod mock;
#[cfg(feature = "serial")]
pub mod serial;
pub mod tcp;
pub mod traits;

pub use mock::MockTransport;
#[cfg(feature = "serial")]
pub use serial::SerialTransport;
pub use tcp::TcpTransport;
pub use traits::Transport;
