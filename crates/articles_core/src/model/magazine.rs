//! Magazine domain model.

use super::{check_text, require_text, MagazineId, ValidationError};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "magazine";

/// A publication grouping articles under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Magazine {
    id: Option<MagazineId>,
    name: String,
    category: String,
}

impl Magazine {
    /// Creates an unpersisted magazine.
    ///
    /// # Errors
    /// - `ValidationError::EmptyField` when `name` or `category` is empty.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            name: require_text(ENTITY, "name", name.into())?,
            category: require_text(ENTITY, "category", category.into())?,
        })
    }

    pub fn with_id(
        id: MagazineId,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let mut magazine = Self::new(name, category)?;
        magazine.id = Some(id);
        Ok(magazine)
    }

    pub fn id(&self) -> Option<MagazineId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = require_text(ENTITY, "name", name.into())?;
        Ok(())
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> Result<(), ValidationError> {
        self.category = require_text(ENTITY, "category", category.into())?;
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text(ENTITY, "name", &self.name)?;
        check_text(ENTITY, "category", &self.category)
    }

    pub(crate) fn assign_id(&mut self, id: MagazineId) {
        self.id = Some(id);
    }
}
