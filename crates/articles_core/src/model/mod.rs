//! Catalog domain model.
//!
//! # Responsibility
//! - Define the value types persisted by the repository layer.
//! - Enforce text-field invariants at construction time.
//!
//! # Invariants
//! - `name`, `title` and `category` are never empty.
//! - `id` is `None` until the repository assigns it and never changes after.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod article;
pub mod author;
pub mod magazine;

/// Row id of an `authors` record.
pub type AuthorId = i64;
/// Row id of a `magazines` record.
pub type MagazineId = i64;
/// Row id of an `articles` record.
pub type ArticleId = i64;

/// Construction-time validation failure. Never reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty.
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => {
                write!(f, "{entity} {field} must be a non-empty string")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: String,
) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(value)
}

pub(crate) fn check_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}
