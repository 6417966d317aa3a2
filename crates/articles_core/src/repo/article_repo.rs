//! Article repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `articles` storage.
//! - Resolve an article's author and magazine as typed entities.

use crate::model::article::Article;
use crate::model::author::Author;
use crate::model::magazine::Magazine;
use crate::model::{ArticleId, AuthorId, MagazineId};
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::magazine_repo::{MagazineRepository, SqliteMagazineRepository};
use crate::repo::{invalid_row, query_list, query_optional, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ENTITY: &str = "article";

const ARTICLE_SELECT_SQL: &str = "SELECT id, title, author_id, magazine_id FROM articles";

/// Repository interface for article operations.
pub trait ArticleRepository {
    fn save(&self, article: Article) -> RepoResult<Article>;
    fn find_by_id(&self, id: ArticleId) -> RepoResult<Option<Article>>;
    fn find_by_title(&self, title: &str) -> RepoResult<Vec<Article>>;
    fn find_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Article>>;
    fn find_by_magazine(&self, magazine_id: MagazineId) -> RepoResult<Vec<Article>>;
    fn all(&self) -> RepoResult<Vec<Article>>;
    fn delete(&self, id: ArticleId) -> RepoResult<()>;
    /// `None` when the reference is NULL or the author row does not exist.
    fn author(&self, article: &Article) -> RepoResult<Option<Author>>;
    /// `None` when the reference is NULL or the magazine row does not exist.
    fn magazine(&self, article: &Article) -> RepoResult<Option<Magazine>>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn save(&self, mut article: Article) -> RepoResult<Article> {
        article.validate()?;

        match article.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO articles (title, author_id, magazine_id) VALUES (?1, ?2, ?3);",
                    params![article.title(), article.author_id(), article.magazine_id()],
                )?;
                article.assign_id(self.conn.last_insert_rowid());
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE articles
                     SET title = ?1, author_id = ?2, magazine_id = ?3
                     WHERE id = ?4;",
                    params![
                        article.title(),
                        article.author_id(),
                        article.magazine_id(),
                        id
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound { entity: ENTITY, id });
                }
            }
        }

        Ok(article)
    }

    fn find_by_id(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        query_optional(
            self.conn,
            &format!("{ARTICLE_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_article_row,
        )
    }

    fn find_by_title(&self, title: &str) -> RepoResult<Vec<Article>> {
        query_list(
            self.conn,
            &format!("{ARTICLE_SELECT_SQL} WHERE title = ?1 ORDER BY id ASC;"),
            [title],
            parse_article_row,
        )
    }

    fn find_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Article>> {
        query_list(
            self.conn,
            &format!("{ARTICLE_SELECT_SQL} WHERE author_id = ?1 ORDER BY id ASC;"),
            [author_id],
            parse_article_row,
        )
    }

    fn find_by_magazine(&self, magazine_id: MagazineId) -> RepoResult<Vec<Article>> {
        query_list(
            self.conn,
            &format!("{ARTICLE_SELECT_SQL} WHERE magazine_id = ?1 ORDER BY id ASC;"),
            [magazine_id],
            parse_article_row,
        )
    }

    fn all(&self) -> RepoResult<Vec<Article>> {
        query_list(
            self.conn,
            &format!("{ARTICLE_SELECT_SQL} ORDER BY id ASC;"),
            params![],
            parse_article_row,
        )
    }

    fn delete(&self, id: ArticleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM articles WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn author(&self, article: &Article) -> RepoResult<Option<Author>> {
        match article.author_id() {
            Some(author_id) => SqliteAuthorRepository::new(self.conn).find_by_id(author_id),
            None => Ok(None),
        }
    }

    fn magazine(&self, article: &Article) -> RepoResult<Option<Magazine>> {
        match article.magazine_id() {
            Some(magazine_id) => SqliteMagazineRepository::new(self.conn).find_by_id(magazine_id),
            None => Ok(None),
        }
    }
}

pub(crate) fn parse_article_row(row: &Row<'_>) -> RepoResult<Article> {
    let id: ArticleId = row.get("id")?;
    let title: String = row.get("title")?;
    let author_id: Option<AuthorId> = row.get("author_id")?;
    let magazine_id: Option<MagazineId> = row.get("magazine_id")?;
    Article::with_id(id, title, author_id, magazine_id).map_err(|err| invalid_row("articles", err))
}
