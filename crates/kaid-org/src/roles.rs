//! Project role catalog
//!
//! This module defines the fixed set of project roles and the immutable
//! catalog the hierarchy engine is built on. Roles are ranked numerically:
//! a lower rank carries more authority.

use serde::{Deserialize, Serialize};

/// User role within a project.
///
/// The hierarchy is: Admin (1) > Manager (2) > Member (3).
///
/// # Permission Model
///
/// - **Admin**: Project administrator, may act on every resource in the project
/// - **Manager**: Team manager, may act on resources owned by Members
/// - **Member**: Team member, may act on their own resources only
///
/// # Examples
///
/// ```
/// use kaid_org::Role;
///
/// assert_eq!(Role::Admin.rank(), 1);
/// assert!(Role::Manager.outranks(Role::Member));
/// assert!(!Role::Member.outranks(Role::Member));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Project administrator
    Admin = 1,

    /// Team manager
    Manager = 2,

    /// Team member
    Member = 3,
}

impl Role {
    /// Numeric rank of the role. Lower rank means more authority.
    pub fn rank(&self) -> i32 {
        *self as i32
    }

    /// Look up a role by its numeric rank.
    ///
    /// # Returns
    ///
    /// `Some(Role)` for ranks 1 to 3, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use kaid_org::Role;
    ///
    /// assert_eq!(Role::from_rank(2), Some(Role::Manager));
    /// assert_eq!(Role::from_rank(4), None);
    /// ```
    pub fn from_rank(rank: i32) -> Option<Self> {
        match rank {
            1 => Some(Self::Admin),
            2 => Some(Self::Manager),
            3 => Some(Self::Member),
            _ => None,
        }
    }

    /// Whether this role carries at least as much authority as `other`.
    pub fn is_at_least_as_powerful_as(&self, other: Role) -> bool {
        self.rank() <= other.rank()
    }

    /// Whether this role carries strictly more authority than `other`.
    pub fn outranks(&self, other: Role) -> bool {
        self.rank() < other.rank()
    }

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use kaid_org::Role;
    ///
    /// assert_eq!(Role::parse("admin"), Some(Role::Admin));
    /// assert_eq!(Role::parse("MANAGER"), Some(Role::Manager));
    /// assert_eq!(Role::parse("owner"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "member" => Some(Self::Member),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Member => "member",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Member => "Member",
        }
    }

    /// Catalog description of the role.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Admin => "Project Administrator",
            Self::Manager => "Team Manager",
            Self::Member => "Team Member",
        }
    }

    /// All roles, strongest first.
    pub fn all() -> [Role; 3] {
        [Self::Admin, Self::Manager, Self::Member]
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Member
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row of the role catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    /// The role this entry describes
    pub role: Role,

    /// Numeric rank (1 = strongest)
    pub rank: i32,

    /// Display name
    pub name: String,

    /// Catalog description
    pub description: String,
}

/// Immutable role catalog.
///
/// Built once at process start and shared (usually behind an `Arc`) with
/// every component that compares roles. Nothing mutates it after
/// construction.
///
/// # Examples
///
/// ```
/// use kaid_org::{Role, RoleCatalog};
///
/// let catalog = RoleCatalog::standard();
/// assert_eq!(catalog.rank_of(Role::Manager), 2);
/// assert!(catalog.is_at_least_as_powerful_as(Role::Admin, Role::Member));
/// assert_eq!(catalog.lookup(3).map(|e| e.name.as_str()), Some("Member"));
/// ```
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    entries: Vec<RoleEntry>,
}

impl RoleCatalog {
    /// The standard three-role catalog.
    pub fn standard() -> Self {
        let entries = Role::all()
            .into_iter()
            .map(|role| RoleEntry {
                role,
                rank: role.rank(),
                name: role.display_name().to_string(),
                description: role.description().to_string(),
            })
            .collect();

        Self { entries }
    }

    /// All catalog entries, strongest first.
    pub fn entries(&self) -> &[RoleEntry] {
        &self.entries
    }

    /// Get the catalog entry for a role.
    pub fn entry(&self, role: Role) -> Option<&RoleEntry> {
        self.entries.iter().find(|e| e.role == role)
    }

    /// Get the catalog entry for a numeric rank.
    pub fn lookup(&self, rank: i32) -> Option<&RoleEntry> {
        self.entries.iter().find(|e| e.rank == rank)
    }

    /// Rank of a role according to this catalog.
    pub fn rank_of(&self, role: Role) -> i32 {
        self.entry(role).map(|e| e.rank).unwrap_or_else(|| role.rank())
    }

    /// `rank(a) <= rank(b)`
    pub fn is_at_least_as_powerful_as(&self, a: Role, b: Role) -> bool {
        self.rank_of(a) <= self.rank_of(b)
    }

    /// `rank(a) < rank(b)`
    pub fn is_strictly_more_powerful(&self, a: Role, b: Role) -> bool {
        self.rank_of(a) < self.rank_of(b)
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
