//! Accounts under management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Organization status of an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Account is in service and gets scanned
    #[default]
    Active,
    /// Account is suspended; inventory scans skip it
    Suspended,
}

/// One account of the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Security contact receiving the account-wide notification
    pub email: String,

    /// Organization status
    #[serde(default)]
    pub status: AccountStatus,
}

impl Account {
    /// Create an active account
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            status: AccountStatus::Active,
        }
    }

    /// Set the organization status
    #[must_use]
    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Check if inventory scans include this account
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.name)
    }
}
