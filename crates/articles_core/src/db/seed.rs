//! Sample data loader.
//!
//! # Responsibility
//! - Populate an empty store with a small demo catalog through the
//!   repository save paths.
//!
//! # Invariants
//! - Seeding is all-or-nothing.
//! - A store that already has authors is left untouched.

use crate::model::article::Article;
use crate::model::author::Author;
use crate::model::magazine::Magazine;
use crate::repo::article_repo::{ArticleRepository, SqliteArticleRepository};
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::magazine_repo::{MagazineRepository, SqliteMagazineRepository};
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};

const SAMPLE_AUTHORS: &[&str] = &["John Doe", "Jane Smith", "Mike Johnson"];

const SAMPLE_MAGAZINES: &[(&str, &str)] = &[
    ("Tech Weekly", "Technology"),
    ("Science Today", "Science"),
    ("Health & Wellness", "Health"),
];

/// `(title, author index, magazine index)` into the sample tables above.
const SAMPLE_ARTICLES: &[(&str, usize, usize)] = &[
    ("The Future of AI", 0, 0),
    ("Machine Learning Basics", 1, 0),
    ("Quantum Computing Explained", 0, 1),
    ("Climate Change Solutions", 2, 1),
    ("Healthy Living Tips", 1, 2),
    ("Exercise and Mental Health", 0, 2),
    ("Advanced Python Techniques", 1, 0),
    ("Data Science Trends", 2, 0),
    ("Nutrition Fundamentals", 2, 2),
];

/// Rows written by one seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub authors: usize,
    pub magazines: usize,
    pub articles: usize,
    /// `true` when the store already held data and nothing was written.
    pub skipped: bool,
}

/// Loads the sample catalog in one transaction.
pub fn seed_sample_data(conn: &Connection) -> RepoResult<SeedSummary> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))?;
    if existing > 0 {
        info!("event=db_seed module=db status=skipped existing_authors={existing}");
        return Ok(SeedSummary {
            skipped: true,
            ..SeedSummary::default()
        });
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let summary = insert_sample_rows(&tx)?;
    tx.commit()?;

    info!(
        "event=db_seed module=db status=ok authors={} magazines={} articles={}",
        summary.authors, summary.magazines, summary.articles
    );
    Ok(summary)
}

fn insert_sample_rows(conn: &Connection) -> RepoResult<SeedSummary> {
    let authors_repo = SqliteAuthorRepository::new(conn);
    let magazines_repo = SqliteMagazineRepository::new(conn);
    let articles_repo = SqliteArticleRepository::new(conn);

    let mut author_ids = Vec::with_capacity(SAMPLE_AUTHORS.len());
    for name in SAMPLE_AUTHORS {
        let author = authors_repo.save(Author::new(*name)?)?;
        author_ids.push(author.id().ok_or(RepoError::Unpersisted("author"))?);
    }

    let mut magazine_ids = Vec::with_capacity(SAMPLE_MAGAZINES.len());
    for (name, category) in SAMPLE_MAGAZINES {
        let magazine = magazines_repo.save(Magazine::new(*name, *category)?)?;
        magazine_ids.push(magazine.id().ok_or(RepoError::Unpersisted("magazine"))?);
    }

    for (title, author_index, magazine_index) in SAMPLE_ARTICLES {
        articles_repo.save(Article::new(
            *title,
            author_ids[*author_index],
            magazine_ids[*magazine_index],
        )?)?;
    }

    Ok(SeedSummary {
        authors: author_ids.len(),
        magazines: magazine_ids.len(),
        articles: SAMPLE_ARTICLES.len(),
        skipped: false,
    })
}
