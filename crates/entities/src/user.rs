//! User-related entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role-free discriminant of [`Role`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    /// A student.
    Student,
    /// An administrator.
    Admin,
}

impl RoleKind {
    /// Returns the wire label of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Student => "Student",
            RoleKind::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a user, carrying the fields only that role has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Role {
    /// A student, identified by a university id.
    Student {
        /// University identifier, unique among students.
        university_id: i64,
    },
    /// An administrator who owns projects.
    Admin,
}

impl Role {
    /// Returns the role discriminant.
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Student { .. } => RoleKind::Student,
            Role::Admin => RoleKind::Admin,
        }
    }

    /// Returns the university id for students.
    pub fn university_id(&self) -> Option<i64> {
        match self {
            Role::Student { university_id } => Some(*university_id),
            Role::Admin => None,
        }
    }

    /// Returns true for students.
    pub fn is_student(&self) -> bool {
        matches!(self, Role::Student { .. })
    }

    /// Returns true for admins.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique display and login name.
    pub name: String,
    /// Password hash in PHC string format.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Role with role-specific fields.
    #[serde(flatten)]
    pub role: Role,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user.
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            password_hash: password_hash.into(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new student.
    pub fn student(name: impl Into<String>, password_hash: impl Into<String>, university_id: i64) -> Self {
        Self::new(name, password_hash, Role::Student { university_id })
    }

    /// Creates a new admin.
    pub fn admin(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self::new(name, password_hash, Role::Admin)
    }
}
