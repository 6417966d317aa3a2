//! Article domain model.
//!
//! # Invariants
//! - `title` is non-empty.
//! - `author_id` / `magazine_id` express referential intent only; whether the
//!   referenced rows must exist is decided by the store's foreign-key mode.
//! - Both references are nullable in storage. Articles built in memory always
//!   carry them; articles read back may not.

use super::{check_text, require_text, ArticleId, AuthorId, MagazineId, ValidationError};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "article";

/// One piece written by an author for a magazine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    id: Option<ArticleId>,
    title: String,
    author_id: Option<AuthorId>,
    magazine_id: Option<MagazineId>,
}

impl Article {
    /// Creates an unpersisted article.
    ///
    /// # Errors
    /// - `ValidationError::EmptyField` when `title` is empty.
    pub fn new(
        title: impl Into<String>,
        author_id: AuthorId,
        magazine_id: MagazineId,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            title: require_text(ENTITY, "title", title.into())?,
            author_id: Some(author_id),
            magazine_id: Some(magazine_id),
        })
    }

    /// Rebuilds a stored article. Missing references stay `None`.
    pub fn with_id(
        id: ArticleId,
        title: impl Into<String>,
        author_id: Option<AuthorId>,
        magazine_id: Option<MagazineId>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Some(id),
            title: require_text(ENTITY, "title", title.into())?,
            author_id,
            magazine_id,
        })
    }

    pub fn id(&self) -> Option<ArticleId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author_id(&self) -> Option<AuthorId> {
        self.author_id
    }

    pub fn magazine_id(&self) -> Option<MagazineId> {
        self.magazine_id
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ValidationError> {
        self.title = require_text(ENTITY, "title", title.into())?;
        Ok(())
    }

    pub fn set_author_id(&mut self, author_id: AuthorId) {
        self.author_id = Some(author_id);
    }

    pub fn set_magazine_id(&mut self, magazine_id: MagazineId) {
        self.magazine_id = Some(magazine_id);
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text(ENTITY, "title", &self.title)
    }

    pub(crate) fn assign_id(&mut self, id: ArticleId) {
        self.id = Some(id);
    }
}
