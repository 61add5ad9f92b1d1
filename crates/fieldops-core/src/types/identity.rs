//! Stable user identity keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A stable user key, unique per staff member and constant across sessions.
///
/// In practice this is the sign-in email address; it doubles as the
/// presence record's document key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Create an identity, rejecting blank keys.
    pub fn new(key: impl Into<String>) -> Result<Self, AppError> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("Identity must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label shown in the UI: the part before `@`, or the whole key.
    pub fn display_name(&self) -> &str {
        match self.0.split_once('@') {
            Some((local, _)) if !local.is_empty() => local,
            _ => &self.0,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
