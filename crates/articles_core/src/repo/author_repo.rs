//! Author repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `authors` storage.
//! - Traverse author → articles / magazines relationships.
//!
//! # Invariants
//! - `save` inserts when `id` is absent and updates by `id` otherwise.
//! - List results are ordered by row id.

use crate::model::article::Article;
use crate::model::author::Author;
use crate::model::magazine::Magazine;
use crate::model::AuthorId;
use crate::repo::article_repo::{parse_article_row, ArticleRepository, SqliteArticleRepository};
use crate::repo::magazine_repo::parse_magazine_row;
use crate::repo::raw_row::{parse_raw_row, RawRow};
use crate::repo::{invalid_row, query_list, query_optional, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ENTITY: &str = "author";

/// Repository interface for author operations.
pub trait AuthorRepository {
    /// Inserts or updates `author`; returns it with its id populated.
    fn save(&self, author: Author) -> RepoResult<Author>;
    fn find_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    /// All authors with exactly this name.
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Author>>;
    fn all(&self) -> RepoResult<Vec<Author>>;
    /// Deletes the author row only; articles are left in place.
    fn delete(&self, id: AuthorId) -> RepoResult<()>;
    fn articles(&self, author_id: AuthorId) -> RepoResult<Vec<Article>>;
    /// Distinct magazines the author has written for.
    fn magazines(&self, author_id: AuthorId) -> RepoResult<Vec<Magazine>>;
    /// `articles` as column maps.
    fn article_rows(&self, author_id: AuthorId) -> RepoResult<Vec<RawRow>>;
    /// `magazines` as column maps.
    fn magazine_rows(&self, author_id: AuthorId) -> RepoResult<Vec<RawRow>>;
    /// Saves a new article by `author` in `magazine`.
    fn add_article(
        &self,
        author: &Author,
        magazine: &Magazine,
        title: &str,
    ) -> RepoResult<Article>;
    /// Distinct categories of the magazines the author has written for.
    fn topic_areas(&self, author_id: AuthorId) -> RepoResult<Vec<String>>;
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn save(&self, mut author: Author) -> RepoResult<Author> {
        author.validate()?;

        match author.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO authors (name) VALUES (?1);",
                    [author.name()],
                )?;
                author.assign_id(self.conn.last_insert_rowid());
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE authors SET name = ?1 WHERE id = ?2;",
                    params![author.name(), id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound { entity: ENTITY, id });
                }
            }
        }

        Ok(author)
    }

    fn find_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        query_optional(
            self.conn,
            "SELECT id, name FROM authors WHERE id = ?1;",
            [id],
            parse_author_row,
        )
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Author>> {
        query_list(
            self.conn,
            "SELECT id, name FROM authors WHERE name = ?1 ORDER BY id ASC;",
            [name],
            parse_author_row,
        )
    }

    fn all(&self) -> RepoResult<Vec<Author>> {
        query_list(
            self.conn,
            "SELECT id, name FROM authors ORDER BY id ASC;",
            params![],
            parse_author_row,
        )
    }

    fn delete(&self, id: AuthorId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM authors WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn articles(&self, author_id: AuthorId) -> RepoResult<Vec<Article>> {
        query_list(
            self.conn,
            "SELECT id, title, author_id, magazine_id
             FROM articles
             WHERE author_id = ?1
             ORDER BY id ASC;",
            [author_id],
            parse_article_row,
        )
    }

    fn magazines(&self, author_id: AuthorId) -> RepoResult<Vec<Magazine>> {
        query_list(
            self.conn,
            "SELECT DISTINCT m.id, m.name, m.category
             FROM magazines m
             INNER JOIN articles a ON a.magazine_id = m.id
             WHERE a.author_id = ?1
             ORDER BY m.id ASC;",
            [author_id],
            parse_magazine_row,
        )
    }

    fn article_rows(&self, author_id: AuthorId) -> RepoResult<Vec<RawRow>> {
        query_list(
            self.conn,
            "SELECT * FROM articles WHERE author_id = ?1 ORDER BY id ASC;",
            [author_id],
            parse_raw_row,
        )
    }

    fn magazine_rows(&self, author_id: AuthorId) -> RepoResult<Vec<RawRow>> {
        query_list(
            self.conn,
            "SELECT DISTINCT m.*
             FROM magazines m
             INNER JOIN articles a ON a.magazine_id = m.id
             WHERE a.author_id = ?1
             ORDER BY m.id ASC;",
            [author_id],
            parse_raw_row,
        )
    }

    fn add_article(
        &self,
        author: &Author,
        magazine: &Magazine,
        title: &str,
    ) -> RepoResult<Article> {
        let author_id = author.id().ok_or(RepoError::Unpersisted("author"))?;
        let magazine_id = magazine.id().ok_or(RepoError::Unpersisted("magazine"))?;
        let article = Article::new(title, author_id, magazine_id)?;
        SqliteArticleRepository::new(self.conn).save(article)
    }

    fn topic_areas(&self, author_id: AuthorId) -> RepoResult<Vec<String>> {
        query_list(
            self.conn,
            "SELECT DISTINCT m.category
             FROM magazines m
             INNER JOIN articles a ON a.magazine_id = m.id
             WHERE a.author_id = ?1
             ORDER BY m.category ASC;",
            [author_id],
            |row| Ok(row.get::<_, String>("category")?),
        )
    }
}

pub(crate) fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    let id: AuthorId = row.get("id")?;
    let name: String = row.get("name")?;
    Author::with_id(id, name).map_err(|err| invalid_row("authors", err))
}
