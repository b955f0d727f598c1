//! Field allow-lists.

use crate::error::{CapabilityError, CapabilityResult};

/// The exact set of field names a token authorizes.
///
/// Membership is case-sensitive string equality. There are no wildcards or
/// prefixes, and an empty set allows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    fields: Vec<String>,
}

impl PermissionSet {
    /// Build a set from field names, keeping their order.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `field` is allowed.
    #[must_use]
    pub fn allows(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// The first name in `requested` that is not allowed.
    pub fn first_denied<'a, I>(&self, requested: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        requested.into_iter().find(|name| !self.allows(name))
    }

    /// Require every name in `requested` to be allowed.
    ///
    /// Names are checked in iteration order and the first failure is
    /// reported.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::FieldNotAllowed`] naming the first
    /// disallowed field.
    pub fn check<'a, I>(&self, requested: I) -> CapabilityResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self.first_denied(requested) {
            Some(field) => Err(CapabilityError::FieldNotAllowed {
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Number of allowed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether nothing is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Allowed field names, in token order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}
