//! Graceful shutdown handling.

pub mod coordinator;
pub mod signal;

pub use coordinator::ShutdownCoordinator;
pub use signal::shutdown_signal;
