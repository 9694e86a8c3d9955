//! Gatekit Auth — password verification, signed token pair
//! issuance/verification, and the store-backed session lifecycle
//! (sign-in, request authentication, refresh rotation, logout).

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod session;
pub mod store;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::AuthService;
pub use session::{AccessContext, SessionManager};
pub use store::MemoryTokenStore;
pub use token::{AccessClaims, RefreshClaims, TokenPair};
