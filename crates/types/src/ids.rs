//! Opaque identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a registering principal (e.g. a public-key-derived
/// address). The registry never inspects its structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Create a new principal id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied opaque content key (e.g. a storage content address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Create a new content id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-readable, globally unique name chosen at registration.
///
/// Handles are compared case-sensitively. The only normalization the
/// registry performs is trimming surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle(String);

impl Handle {
    /// Create a handle, trimming surrounding whitespace.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into().trim().to_string())
    }

    /// Get the handle as string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A handle is valid when it is non-empty after trimming.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_trims_whitespace() {
        let handle = Handle::new("  sachin  ");
        assert_eq!(handle.as_str(), "sachin");
        assert!(handle.is_valid());
    }

    #[test]
    fn test_handle_empty_after_trim_is_invalid() {
        assert!(!Handle::new("").is_valid());
        assert!(!Handle::new("   ").is_valid());
        assert!(Handle::new("a").is_valid());
    }

    #[test]
    fn test_handle_comparison_is_case_sensitive() {
        assert_ne!(Handle::new("Sachin"), Handle::new("sachin"));
    }

    #[test]
    fn test_ids_round_trip_through_json() {
        let principal = PrincipalId::new("addrA");
        let json = serde_json::to_string(&principal).unwrap();
        assert_eq!(json, "\"addrA\"");
        let back: PrincipalId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, principal);
    }
}
