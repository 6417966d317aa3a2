//! Magazine repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `magazines` storage.
//! - Answer contributor and publication-count aggregate queries.
//!
//! # Invariants
//! - `contributing_authors` means strictly more than
//!   `CONTRIBUTING_AUTHOR_MIN_ARTICLES` articles in the magazine.
//! - `top_publisher` breaks count ties by lowest magazine id.

use crate::model::article::Article;
use crate::model::author::Author;
use crate::model::magazine::Magazine;
use crate::model::MagazineId;
use crate::repo::article_repo::parse_article_row;
use crate::repo::author_repo::parse_author_row;
use crate::repo::raw_row::{parse_raw_row, RawRow};
use crate::repo::{invalid_row, query_list, query_optional, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ENTITY: &str = "magazine";

/// Article count an author must exceed to be a contributing author.
pub const CONTRIBUTING_AUTHOR_MIN_ARTICLES: i64 = 2;

/// Repository interface for magazine operations.
pub trait MagazineRepository {
    fn save(&self, magazine: Magazine) -> RepoResult<Magazine>;
    fn find_by_id(&self, id: MagazineId) -> RepoResult<Option<Magazine>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Magazine>>;
    fn find_by_category(&self, category: &str) -> RepoResult<Vec<Magazine>>;
    fn all(&self) -> RepoResult<Vec<Magazine>>;
    fn delete(&self, id: MagazineId) -> RepoResult<()>;
    fn articles(&self, magazine_id: MagazineId) -> RepoResult<Vec<Article>>;
    fn article_rows(&self, magazine_id: MagazineId) -> RepoResult<Vec<RawRow>>;
    /// Distinct authors with at least one article in the magazine.
    fn contributors(&self, magazine_id: MagazineId) -> RepoResult<Vec<Author>>;
    fn article_titles(&self, magazine_id: MagazineId) -> RepoResult<Vec<String>>;
    /// Authors with more than two articles in the magazine.
    fn contributing_authors(&self, magazine_id: MagazineId) -> RepoResult<Vec<Author>>;
    /// Magazine with the most articles across the store.
    fn top_publisher(&self) -> RepoResult<Option<Magazine>>;
}

/// SQLite-backed magazine repository.
pub struct SqliteMagazineRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMagazineRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MagazineRepository for SqliteMagazineRepository<'_> {
    fn save(&self, mut magazine: Magazine) -> RepoResult<Magazine> {
        magazine.validate()?;

        match magazine.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO magazines (name, category) VALUES (?1, ?2);",
                    params![magazine.name(), magazine.category()],
                )?;
                magazine.assign_id(self.conn.last_insert_rowid());
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE magazines SET name = ?1, category = ?2 WHERE id = ?3;",
                    params![magazine.name(), magazine.category(), id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound { entity: ENTITY, id });
                }
            }
        }

        Ok(magazine)
    }

    fn find_by_id(&self, id: MagazineId) -> RepoResult<Option<Magazine>> {
        query_optional(
            self.conn,
            "SELECT id, name, category FROM magazines WHERE id = ?1;",
            [id],
            parse_magazine_row,
        )
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Magazine>> {
        query_list(
            self.conn,
            "SELECT id, name, category FROM magazines WHERE name = ?1 ORDER BY id ASC;",
            [name],
            parse_magazine_row,
        )
    }

    fn find_by_category(&self, category: &str) -> RepoResult<Vec<Magazine>> {
        query_list(
            self.conn,
            "SELECT id, name, category FROM magazines WHERE category = ?1 ORDER BY id ASC;",
            [category],
            parse_magazine_row,
        )
    }

    fn all(&self) -> RepoResult<Vec<Magazine>> {
        query_list(
            self.conn,
            "SELECT id, name, category FROM magazines ORDER BY id ASC;",
            params![],
            parse_magazine_row,
        )
    }

    fn delete(&self, id: MagazineId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM magazines WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn articles(&self, magazine_id: MagazineId) -> RepoResult<Vec<Article>> {
        query_list(
            self.conn,
            "SELECT id, title, author_id, magazine_id
             FROM articles
             WHERE magazine_id = ?1
             ORDER BY id ASC;",
            [magazine_id],
            parse_article_row,
        )
    }

    fn article_rows(&self, magazine_id: MagazineId) -> RepoResult<Vec<RawRow>> {
        query_list(
            self.conn,
            "SELECT * FROM articles WHERE magazine_id = ?1 ORDER BY id ASC;",
            [magazine_id],
            parse_raw_row,
        )
    }

    fn contributors(&self, magazine_id: MagazineId) -> RepoResult<Vec<Author>> {
        query_list(
            self.conn,
            "SELECT DISTINCT au.id, au.name
             FROM authors au
             INNER JOIN articles ar ON ar.author_id = au.id
             WHERE ar.magazine_id = ?1
             ORDER BY au.id ASC;",
            [magazine_id],
            parse_author_row,
        )
    }

    fn article_titles(&self, magazine_id: MagazineId) -> RepoResult<Vec<String>> {
        query_list(
            self.conn,
            "SELECT title FROM articles WHERE magazine_id = ?1 ORDER BY id ASC;",
            [magazine_id],
            |row| Ok(row.get::<_, String>("title")?),
        )
    }

    fn contributing_authors(&self, magazine_id: MagazineId) -> RepoResult<Vec<Author>> {
        query_list(
            self.conn,
            "SELECT au.id, au.name
             FROM authors au
             INNER JOIN articles ar ON ar.author_id = au.id
             WHERE ar.magazine_id = ?1
             GROUP BY au.id, au.name
             HAVING COUNT(ar.id) > ?2
             ORDER BY au.id ASC;",
            params![magazine_id, CONTRIBUTING_AUTHOR_MIN_ARTICLES],
            parse_author_row,
        )
    }

    fn top_publisher(&self) -> RepoResult<Option<Magazine>> {
        query_optional(
            self.conn,
            "SELECT m.id, m.name, m.category
             FROM magazines m
             INNER JOIN articles ar ON ar.magazine_id = m.id
             GROUP BY m.id, m.name, m.category
             ORDER BY COUNT(ar.id) DESC, m.id ASC
             LIMIT 1;",
            params![],
            parse_magazine_row,
        )
    }
}

pub(crate) fn parse_magazine_row(row: &Row<'_>) -> RepoResult<Magazine> {
    let id: MagazineId = row.get("id")?;
    let name: String = row.get("name")?;
    let category: String = row.get("category")?;
    Magazine::with_id(id, name, category).map_err(|err| invalid_row("magazines", err))
}
