//! Registration-time role resolution
//!
//! Members present a role code that must exist in the reference table;
//! administrators present a license key that must be outstanding.

use crate::models::{LicenseKey, Role, RoleCode};
use thiserror::Error;

/// Registration eligibility errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("role code not recognised")]
    InvalidRoleCode,

    #[error("license key not recognised")]
    InvalidLicenseKey,
}

/// Stateless resolver over reference data supplied by the caller
pub struct RoleResolver;

impl RoleResolver {
    /// Resolve a member role code. No match is a terminal failure.
    pub fn resolve_member_role(code: &str, table: &[RoleCode]) -> Result<Role, RoleError> {
        if code.is_empty() {
            return Err(RoleError::InvalidRoleCode);
        }

        table
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.role)
            .ok_or(RoleError::InvalidRoleCode)
    }

    /// Check that a license key is outstanding. Eligible callers always get `Role::Admin`.
    pub fn resolve_admin_eligibility(license_key: &str, table: &[LicenseKey]) -> Result<Role, RoleError> {
        if license_key.is_empty() {
            return Err(RoleError::InvalidLicenseKey);
        }

        if table
            .iter()
            .any(|entry| entry.license_key == license_key && entry.is_outstanding())
        {
            Ok(Role::Admin)
        } else {
            Err(RoleError::InvalidLicenseKey)
        }
    }
}
