//! Runtime wiring and lifecycle management.
//!
//! - [`SyncSystem`] starts the state store, connects it to a dispatcher and shuts it down.
//! - [`setup_tracing`] initializes logging.

pub mod sync_system;
pub mod tracing;

pub use self::tracing::setup_tracing;
pub use sync_system::SyncSystem;
