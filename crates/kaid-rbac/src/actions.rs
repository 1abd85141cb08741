//! # Operations
//!
//! The kinds of operation a caller can request on another user's resource.
//! The hierarchy engine only distinguishes reading from mutating.

use serde::{Deserialize, Serialize};

/// Kind of operation being authorized.
///
/// - **Read**: View the resource
/// - **Mutate**: Update or delete the resource
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Read/view resource.
    Read,

    /// Update or delete resource.
    Mutate,
}

impl OperationKind {
    /// Get the string representation of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Read => "read",
            OperationKind::Mutate => "mutate",
        }
    }

    /// Parse operation from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Example
    ///
    /// ```
    /// use kaid_rbac::OperationKind;
    ///
    /// assert_eq!(OperationKind::parse("get"), Some(OperationKind::Read));
    /// assert_eq!(OperationKind::parse("delete"), Some(OperationKind::Mutate));
    /// assert_eq!(OperationKind::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" | "view" | "get" | "list" => Some(OperationKind::Read),
            "mutate" | "update" | "edit" | "write" | "delete" | "remove" => {
                Some(OperationKind::Mutate)
            }
            _ => None,
        }
    }

    /// Check if this operation modifies the resource.
    pub fn is_mutating(&self) -> bool {
        matches!(self, OperationKind::Mutate)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_parsing() {
        assert_eq!(OperationKind::parse("read"), Some(OperationKind::Read));
        assert_eq!(OperationKind::parse("VIEW"), Some(OperationKind::Read));
        assert_eq!(OperationKind::parse("update"), Some(OperationKind::Mutate));
        assert_eq!(OperationKind::parse("remove"), Some(OperationKind::Mutate));
        assert_eq!(OperationKind::parse(""), None);
    }

    #[test]
    fn test_is_mutating() {
        assert!(OperationKind::Mutate.is_mutating());
        assert!(!OperationKind::Read.is_mutating());
    }
}
