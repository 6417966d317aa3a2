//! Core data access for the articles catalog.
//! Authors, magazines and articles over SQLite, plus the catalog's atomic
//! multi-statement operations.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{DbConfig, ExecutionMode};
pub use db::{ConnectionFactory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::article::Article;
pub use model::author::Author;
pub use model::magazine::Magazine;
pub use model::{ArticleId, AuthorId, MagazineId, ValidationError};
pub use repo::article_repo::{ArticleRepository, SqliteArticleRepository};
pub use repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
pub use repo::magazine_repo::{MagazineRepository, SqliteMagazineRepository};
pub use repo::raw_row::RawRow;
pub use repo::report_repo::{ReportRepository, SqliteReportRepository, StoreSummary};
pub use repo::{RepoError, RepoResult};
pub use service::transaction_service::{
    NewArticle, TransactionFailure, TransactionService, TxOutcome,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
