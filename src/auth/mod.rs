//! Authentication module

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod role;

pub use jwt::{Claims, IssuedToken, TokenError, TokenService};
pub use middleware::{extract_token, session_auth_middleware, AuthContext};
pub use password::{PasswordError, PasswordHasher};
pub use role::{RoleError, RoleResolver};
