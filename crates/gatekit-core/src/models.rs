//! Domain models for Gatekit.
//!
//! These are the core types shared across crates. Company records and
//! their persistence live entirely behind the repository interfaces.

pub mod user;

pub use user::{CreateUser, User};
