//! Read-only catalog reports.
//!
//! # Responsibility
//! - Aggregate counts across authors, magazines and articles.
//!
//! # Invariants
//! - Reports never write.
//! - Ties are broken by lowest id so output is deterministic.

use crate::model::author::Author;
use crate::model::magazine::Magazine;
use crate::repo::author_repo::parse_author_row;
use crate::repo::magazine_repo::parse_magazine_row;
use crate::repo::{query_list, query_optional, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

/// Row totals for the three catalog tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub authors: u64,
    pub magazines: u64,
    pub articles: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MagazineArticleCount {
    pub magazine: Magazine,
    pub article_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MagazineAuthorCount {
    pub magazine: Magazine,
    pub author_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorArticleCount {
    pub author: Author,
    pub article_count: u64,
}

/// Repository interface for aggregate reports.
pub trait ReportRepository {
    fn store_summary(&self) -> RepoResult<StoreSummary>;
    /// Every magazine with its article count, most articles first.
    fn article_counts_by_magazine(&self) -> RepoResult<Vec<MagazineArticleCount>>;
    /// Magazines with at least `min_authors` distinct authors.
    fn magazines_with_min_authors(&self, min_authors: u32)
        -> RepoResult<Vec<MagazineAuthorCount>>;
    /// Author with the most articles. `None` when there are no authors.
    fn most_prolific_author(&self) -> RepoResult<Option<AuthorArticleCount>>;
}

/// SQLite-backed report repository.
pub struct SqliteReportRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReportRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn store_summary(&self) -> RepoResult<StoreSummary> {
        let summary = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM authors),
                (SELECT COUNT(*) FROM magazines),
                (SELECT COUNT(*) FROM articles);",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?)),
        )?;
        let to_count = |value: i64| {
            u64::try_from(value)
                .map_err(|_| RepoError::InvalidData(format!("negative row count `{value}`")))
        };
        Ok(StoreSummary {
            authors: to_count(summary.0)?,
            magazines: to_count(summary.1)?,
            articles: to_count(summary.2)?,
        })
    }

    fn article_counts_by_magazine(&self) -> RepoResult<Vec<MagazineArticleCount>> {
        query_list(
            self.conn,
            "SELECT m.id, m.name, m.category, COUNT(ar.id) AS article_count
             FROM magazines m
             LEFT JOIN articles ar ON ar.magazine_id = m.id
             GROUP BY m.id, m.name, m.category
             ORDER BY article_count DESC, m.id ASC;",
            params![],
            |row| {
                Ok(MagazineArticleCount {
                    magazine: parse_magazine_row(row)?,
                    article_count: count_column(row, "article_count")?,
                })
            },
        )
    }

    fn magazines_with_min_authors(
        &self,
        min_authors: u32,
    ) -> RepoResult<Vec<MagazineAuthorCount>> {
        query_list(
            self.conn,
            "SELECT m.id, m.name, m.category, COUNT(DISTINCT ar.author_id) AS author_count
             FROM magazines m
             INNER JOIN articles ar ON ar.magazine_id = m.id
             GROUP BY m.id, m.name, m.category
             HAVING author_count >= ?1
             ORDER BY m.id ASC;",
            [i64::from(min_authors)],
            |row| {
                Ok(MagazineAuthorCount {
                    magazine: parse_magazine_row(row)?,
                    author_count: count_column(row, "author_count")?,
                })
            },
        )
    }

    fn most_prolific_author(&self) -> RepoResult<Option<AuthorArticleCount>> {
        query_optional(
            self.conn,
            "SELECT au.id, au.name, COUNT(ar.id) AS article_count
             FROM authors au
             LEFT JOIN articles ar ON ar.author_id = au.id
             GROUP BY au.id, au.name
             ORDER BY article_count DESC, au.id ASC
             LIMIT 1;",
            params![],
            |row| {
                Ok(AuthorArticleCount {
                    author: parse_author_row(row)?,
                    article_count: count_column(row, "article_count")?,
                })
            },
        )
    }
}

fn count_column(row: &Row<'_>, column: &str) -> RepoResult<u64> {
    let value: i64 = row.get(column)?;
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative count `{value}` in {column}")))
}
