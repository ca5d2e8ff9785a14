//! # Identity Newtypes
//!
//! Newtype wrappers for every identifier the portal passes around. These
//! prevent accidental identifier confusion: a `TenantId` cannot be passed
//! where a `UserId` is expected, and a `LineItemId` is never confused with
//! a list position.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LfpError;

/// Stable identity of one row in a repeating group.
///
/// Generated when the row is appended and never reused. Removal of
/// other rows does not change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineItemId(pub Uuid);

/// Identity of one mounted form instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormInstanceId(pub Uuid);

/// Form-type identifier from the catalog, e.g. `bill_of_lading`.
///
/// Lowercase ASCII letters, digits, and underscores; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormType(String);

/// Tenant (trucking company) the submitting user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

/// Submitting user as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl LineItemId {
    /// Generate a new random line-item identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LineItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl FormInstanceId {
    /// Generate a new random form-instance identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FormInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl FormType {
    /// Validate and wrap a form-type identifier.
    ///
    /// # Errors
    ///
    /// Returns `LfpError::InvalidIdentifier` if the input is empty or
    /// contains anything other than `[a-z0-9_]`.
    pub fn new(value: impl Into<String>) -> Result<Self, LfpError> {
        let value = value.into();
        let well_formed = !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !well_formed {
            return Err(LfpError::InvalidIdentifier {
                kind: "form type",
                value,
            });
        }
        Ok(Self(value))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FormType {
    type Error = LfpError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FormType> for String {
    fn from(value: FormType) -> Self {
        value.0
    }
}

impl TenantId {
    /// Wrap a tenant identifier, rejecting blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, LfpError> {
        non_blank("tenant", value.into()).map(Self)
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl UserId {
    /// Wrap a user identifier, rejecting blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, LfpError> {
        non_blank("user", value.into()).map(Self)
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn non_blank(kind: &'static str, value: String) -> Result<String, LfpError> {
    if value.trim().is_empty() {
        Err(LfpError::InvalidIdentifier { kind, value })
    } else {
        Ok(value)
    }
}

impl std::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item:{}", self.0)
    }
}

impl std::fmt::Display for FormInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "form:{}", self.0)
    }
}

impl std::fmt::Display for FormType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tenant:{}", self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.0)
    }
}
