//! Business logic services layer

pub mod auth_service;
pub mod session_store;

pub use auth_service::AuthService;
pub use session_store::{SessionError, SessionRecordStore};
