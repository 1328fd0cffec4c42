pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod types;

pub use error::{ContactsError, GateError};
pub use gate::{AccessGate, CredentialVerifier, GatePolicy};
