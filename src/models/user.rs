//! User model.

use serde::{Deserialize, Serialize};

/// A person issues can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Database identifier.
    pub id: i64,
    /// Display name; unique across users.
    pub name: String,
    /// Free-text role such as "Developer".
    pub role: String,
}

/// Fields required to create a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Free-text role.
    pub role: String,
}
