//! 数据模型模块

pub mod auth;
pub mod session;
pub mod user;

pub use auth::{AdminSignUpRequest, LicenseKey, RoleCode, SignInRequest, SignInResponse, SignUpRequest};
pub use session::{RevokeOutcome, SessionRecord, SessionStatus};
pub use user::{NewAccount, Role, Secret, User, UserResponse};
