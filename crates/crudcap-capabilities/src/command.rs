//! Token commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;

/// The five operations a capability token can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudCommand {
    /// Create a new record.
    Create,
    /// Read fields of one record.
    Read,
    /// Update fields of one record.
    Update,
    /// Delete one record.
    Delete,
    /// Copy one record, optionally overriding fields.
    Duplicate,
}

impl CrudCommand {
    /// All commands, in issuance order.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Duplicate,
        Self::Delete,
    ];

    /// Wire name of the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Duplicate => "duplicate",
        }
    }

    /// Whether the command addresses one existing record by id.
    #[must_use]
    pub const fn targets_record(self) -> bool {
        !matches!(self, Self::Create)
    }
}

impl fmt::Display for CrudCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrudCommand {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "duplicate" => Ok(Self::Duplicate),
            other => Err(CapabilityError::InvalidFormat(format!(
                "unknown command {other}"
            ))),
        }
    }
}

/// A command name plus its ordered string parameters, as encoded into a
/// token.
///
/// Converts from a bare name (`"read"`), a [`CrudCommand`], or a sequence
/// whose first element is the name and the rest are parameters
/// (`["read", "42"]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    name: String,
    parameters: Vec<String>,
}

impl CommandSpec {
    /// A command without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl ToString) -> Self {
        self.parameters.push(parameter.to_string());
        self
    }

    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command parameters, in order.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = parts.into_iter().map(Into::into);
        let name = parts.next().unwrap_or_default();
        Self {
            name,
            parameters: parts.collect(),
        }
    }
}

impl From<&str> for CommandSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CommandSpec {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<CrudCommand> for CommandSpec {
    fn from(command: CrudCommand) -> Self {
        Self::new(command.as_str())
    }
}

impl<const N: usize> From<[&str; N]> for CommandSpec {
    fn from(parts: [&str; N]) -> Self {
        Self::from_parts(parts)
    }
}

impl From<&[&str]> for CommandSpec {
    fn from(parts: &[&str]) -> Self {
        Self::from_parts(parts.iter().copied())
    }
}

impl From<Vec<String>> for CommandSpec {
    fn from(parts: Vec<String>) -> Self {
        Self::from_parts(parts)
    }
}
