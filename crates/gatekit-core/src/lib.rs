//! Gatekit Core — shared error type, domain models, and the narrow
//! trait interfaces behind which persistence and the ephemeral token
//! store sit.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{GatekitError, GatekitResult};
