//! Caller principal for artifact ownership

use crate::error::StorageError;
use serde::Serialize;
use std::fmt;

/// Opaque identifier of the principal an operation runs on behalf of.
///
/// Supplied by the upstream authentication layer. When no principal is
/// available the id falls back to the shared `"anonymous"` namespace —
/// all unauthenticated writes collapse into one directory. Treat that
/// fallback as a hazard, not a feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OwnerId(String);

pub const ANONYMOUS: &str = "anonymous";

impl OwnerId {
    /// Build an owner id from a raw principal string.
    ///
    /// The id becomes a directory component under the uploads root, so
    /// anything that could escape it is rejected outright.
    pub fn new(principal: &str) -> Result<Self, StorageError> {
        if principal.is_empty() {
            return Err(StorageError::InvalidOwner("empty principal".into()));
        }
        if principal == "." || principal == ".." {
            return Err(StorageError::InvalidOwner(principal.into()));
        }
        if principal
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0')
        {
            return Err(StorageError::InvalidOwner(format!(
                "principal contains a path separator: {principal:?}"
            )));
        }
        Ok(Self(principal.to_string()))
    }

    /// Resolve an optional principal, falling back to [`ANONYMOUS`].
    pub fn from_principal(principal: Option<&str>) -> Result<Self, StorageError> {
        match principal {
            Some(p) if !p.is_empty() => Self::new(p),
            _ => Self::new(ANONYMOUS),
        }
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
