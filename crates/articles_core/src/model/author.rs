//! Author domain model.

use super::{check_text, require_text, AuthorId, ValidationError};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "author";

/// A writer who owns zero or more articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    id: Option<AuthorId>,
    name: String,
}

impl Author {
    /// Creates an unpersisted author.
    ///
    /// # Errors
    /// - `ValidationError::EmptyField` when `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            name: require_text(ENTITY, "name", name.into())?,
        })
    }

    /// Rebuilds a persisted author from stored values.
    pub fn with_id(id: AuthorId, name: impl Into<String>) -> Result<Self, ValidationError> {
        let mut author = Self::new(name)?;
        author.id = Some(id);
        Ok(author)
    }

    pub fn id(&self) -> Option<AuthorId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = require_text(ENTITY, "name", name.into())?;
        Ok(())
    }

    /// Whether the repository has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Re-checks field invariants, e.g. after deserialization.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text(ENTITY, "name", &self.name)
    }

    pub(crate) fn assign_id(&mut self, id: AuthorId) {
        self.id = Some(id);
    }
}
