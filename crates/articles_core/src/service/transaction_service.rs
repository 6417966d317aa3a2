//! Multi-statement catalog transactions.
//!
//! # Responsibility
//! - Run composite writes that must apply all-or-nothing.
//! - Convert every failure into a rolled-back `TxOutcome` instead of an
//!   error, logging the reason.
//!
//! # Invariants
//! - Each operation acquires its own connection and closes it before
//!   returning, on success and failure alike.
//! - A failure in any statement rolls back every write made by the call.
//! - "Zero rows affected" on a guarded statement is a failure, not a no-op.

use crate::db::{ConnectionFactory, DbError};
use crate::model::article::Article;
use crate::model::author::Author;
use crate::model::{ArticleId, AuthorId, MagazineId, ValidationError};
use crate::repo::article_repo::{ArticleRepository, SqliteArticleRepository};
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::RepoError;
use log::{error, info, warn};
use rusqlite::{params, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// One article to create alongside a new author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub magazine_id: MagazineId,
}

impl NewArticle {
    pub fn new(title: impl Into<String>, magazine_id: MagazineId) -> Self {
        Self {
            title: title.into(),
            magazine_id,
        }
    }
}

/// Reason a transaction was rolled back.
#[derive(Debug)]
pub enum TransactionFailure {
    /// No connection could be acquired; nothing was started.
    Connection(DbError),
    Validation(ValidationError),
    /// The store rejected a statement (constraint violation, I/O, ...).
    Storage(RepoError),
    /// A transfer matched no row for this article in the source magazine.
    ArticleNotInMagazine {
        article_id: ArticleId,
        magazine_id: MagazineId,
    },
    /// The author delete matched no row.
    AuthorNotFound(AuthorId),
}

impl Display for TransactionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::ArticleNotInMagazine { article_id, .. } => write!(
                f,
                "Article {article_id} not found in source magazine or doesn't exist"
            ),
            Self::AuthorNotFound(id) => write!(f, "Author with ID {id} not found"),
        }
    }
}

impl Error for TransactionFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::ArticleNotInMagazine { .. } => None,
            Self::AuthorNotFound(_) => None,
        }
    }
}

impl From<ValidationError> for TransactionFailure {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TransactionFailure {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Storage(other),
        }
    }
}

impl From<rusqlite::Error> for TransactionFailure {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(RepoError::from(value))
    }
}

/// Final state of a transaction operation.
#[derive(Debug)]
pub enum TxOutcome {
    Committed { summary: String },
    RolledBack { failure: TransactionFailure },
}

impl TxOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// Human-readable result line.
    pub fn message(&self) -> String {
        match self {
            Self::Committed { summary } => summary.clone(),
            Self::RolledBack { failure } => format!("Transaction failed: {failure}"),
        }
    }

    pub fn failure(&self) -> Option<&TransactionFailure> {
        match self {
            Self::Committed { .. } => None,
            Self::RolledBack { failure } => Some(failure),
        }
    }
}

/// Entry points for the catalog's atomic multi-statement writes.
pub struct TransactionService {
    factory: ConnectionFactory,
}

impl TransactionService {
    pub fn new(factory: ConnectionFactory) -> Self {
        Self { factory }
    }

    /// Inserts one author and all `articles` bound to it.
    ///
    /// Any validation or storage failure, e.g. an unknown magazine id under
    /// foreign-key enforcement, leaves neither the author nor any article.
    pub fn add_author_with_articles(&self, author_name: &str, articles: &[NewArticle]) -> TxOutcome {
        self.run_atomic("add_author_with_articles", |tx| {
            let author = SqliteAuthorRepository::new(tx).save(Author::new(author_name)?)?;
            let author_id = author.id().ok_or(RepoError::Unpersisted("author"))?;

            let article_repo = SqliteArticleRepository::new(tx);
            for entry in articles {
                article_repo.save(Article::new(
                    entry.title.as_str(),
                    author_id,
                    entry.magazine_id,
                )?)?;
            }

            Ok(format!(
                "Successfully added author '{}' with {} articles",
                author.name(),
                articles.len()
            ))
        })
    }

    /// Moves every article in `article_ids` from `from_magazine` to
    /// `to_magazine`.
    ///
    /// Strict: if any article is missing or not currently in `from_magazine`,
    /// no article is moved.
    pub fn transfer_articles_between_magazines(
        &self,
        from_magazine: MagazineId,
        to_magazine: MagazineId,
        article_ids: &[ArticleId],
    ) -> TxOutcome {
        self.run_atomic("transfer_articles_between_magazines", |tx| {
            for article_id in article_ids {
                let changed = tx.execute(
                    "UPDATE articles SET magazine_id = ?1 WHERE id = ?2 AND magazine_id = ?3;",
                    params![to_magazine, article_id, from_magazine],
                )?;
                if changed == 0 {
                    return Err(TransactionFailure::ArticleNotInMagazine {
                        article_id: *article_id,
                        magazine_id: from_magazine,
                    });
                }
            }

            Ok(format!(
                "Successfully transferred {} articles between magazines",
                article_ids.len()
            ))
        })
    }

    /// Deletes the author's articles, then the author.
    ///
    /// Fails and restores the articles when the author row does not exist.
    pub fn delete_author_and_articles(&self, author_id: AuthorId) -> TxOutcome {
        self.run_atomic("delete_author_and_articles", |tx| {
            let articles_deleted =
                tx.execute("DELETE FROM articles WHERE author_id = ?1;", [author_id])?;
            let authors_deleted = tx.execute("DELETE FROM authors WHERE id = ?1;", [author_id])?;
            if authors_deleted == 0 {
                return Err(TransactionFailure::AuthorNotFound(author_id));
            }

            Ok(format!(
                "Successfully deleted author and {articles_deleted} articles"
            ))
        })
    }

    fn run_atomic<F>(&self, operation: &'static str, body: F) -> TxOutcome
    where
        F: FnOnce(&Transaction<'_>) -> Result<String, TransactionFailure>,
    {
        let started_at = Instant::now();

        let mut conn = match self.factory.acquire() {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=tx_begin module=transactions status=error op={} duration_ms={} error_code=connection_failed error={}",
                    operation,
                    started_at.elapsed().as_millis(),
                    err
                );
                return TxOutcome::RolledBack {
                    failure: TransactionFailure::Connection(err),
                };
            }
        };

        let outcome = match conn.transaction_with_behavior(TransactionBehavior::Immediate) {
            Ok(tx) => match body(&tx) {
                Ok(summary) => match tx.commit() {
                    Ok(()) => TxOutcome::Committed { summary },
                    // A failed commit is rolled back when the transaction drops.
                    Err(err) => TxOutcome::RolledBack {
                        failure: err.into(),
                    },
                },
                Err(failure) => {
                    if let Err(err) = tx.rollback() {
                        error!(
                            "event=tx_rollback module=transactions status=error op={} error_code=rollback_failed error={}",
                            operation, err
                        );
                    }
                    TxOutcome::RolledBack { failure }
                }
            },
            Err(err) => TxOutcome::RolledBack {
                failure: err.into(),
            },
        };

        if let Err((_, err)) = conn.close() {
            warn!(
                "event=tx_close module=transactions status=error op={} error={}",
                operation, err
            );
        }

        match &outcome {
            TxOutcome::Committed { summary } => info!(
                "event=tx_commit module=transactions status=ok op={} duration_ms={} summary={}",
                operation,
                started_at.elapsed().as_millis(),
                summary
            ),
            TxOutcome::RolledBack { failure } => warn!(
                "event=tx_rollback module=transactions status=rolled_back op={} duration_ms={} reason={}",
                operation,
                started_at.elapsed().as_millis(),
                failure
            ),
        }
        outcome
    }
}
