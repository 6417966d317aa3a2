use articles_core::{
    Article, ArticleRepository, Author, AuthorRepository, ConnectionFactory, DbConfig,
    ExecutionMode, Magazine, MagazineRepository, NewArticle, SqliteArticleRepository,
    SqliteAuthorRepository, SqliteMagazineRepository, TransactionFailure, TransactionService,
};
use rusqlite::Connection;
use std::time::Duration;
use tempfile::TempDir;

fn factory(dir: &TempDir) -> ConnectionFactory {
    ConnectionFactory::new(DbConfig::new(dir.path(), ExecutionMode::Testing))
}

fn seed_magazines(factory: &ConnectionFactory) -> (i64, i64) {
    let conn = factory.acquire().unwrap();
    let repo = SqliteMagazineRepository::new(&conn);
    let tech = repo
        .save(Magazine::new("Tech Weekly", "Technology").unwrap())
        .unwrap();
    let science = repo
        .save(Magazine::new("Science Today", "Science").unwrap())
        .unwrap();
    (tech.id().unwrap(), science.id().unwrap())
}

fn seed_author_with_articles(
    factory: &ConnectionFactory,
    name: &str,
    magazine_id: i64,
    titles: &[&str],
) -> (i64, Vec<i64>) {
    let conn = factory.acquire().unwrap();
    let author = SqliteAuthorRepository::new(&conn)
        .save(Author::new(name).unwrap())
        .unwrap();
    let author_id = author.id().unwrap();
    let articles = SqliteArticleRepository::new(&conn);
    let ids = titles
        .iter()
        .map(|title| {
            articles
                .save(Article::new(*title, author_id, magazine_id).unwrap())
                .unwrap()
                .id()
                .unwrap()
        })
        .collect();
    (author_id, ids)
}

fn count(factory: &ConnectionFactory, table: &str) -> i64 {
    let conn = factory.acquire().unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn assert_write_lock_free(factory: &ConnectionFactory) {
    let conn = Connection::open(factory.config().db_path()).unwrap();
    conn.busy_timeout(Duration::from_millis(50)).unwrap();
    conn.execute_batch("BEGIN IMMEDIATE; ROLLBACK;").unwrap();
}

#[test]
fn add_author_with_articles_commits_all_rows() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(&dir);
    let (tech, _) = seed_magazines(&factory);

    let outcome = TransactionService::new(factory.clone()).add_author_with_articles(
        "Transaction Author",
        &[NewArticle::new("Transaction Article", tech)],
    );

    assert!(outcome.is_committed(), "{}", outcome.message());
    assert_eq!(
        outcome.message(),
        "Successfully added author 'Transaction Author' with 1 articles"
    );

    let conn = factory.acquire().unwrap();
    let authors = SqliteAuthorRepository::new(&conn)
        .find_by_name("Transaction Author")
        .unwrap();
    assert_eq!(authors.len(), 1);
    let articles = SqliteAuthorRepository::new(&conn)
        .articles(authors[0].id().unwrap())
        .unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title(), "Transaction Article");
    assert_eq!(articles[0].magazine_id(), Some(tech));
}

#[test]
fn add_author_rolls_back_on_unknown_magazine() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(&dir);
    let (tech, _) = seed_magazines(&factory);

    let outcome = TransactionService::new(factory.clone()).add_author_with_articles(
        "Ghost Writer",
        &[
            NewArticle::new("Valid Article", tech),
            NewArticle::new("Dangling Article", 999),
        ],
    );

    assert!(!outcome.is_committed());
    assert!(matches!(
        outcome.failure(),
        Some(TransactionFailure::Storage(_))
    ));
    assert!(outcome.message().starts_with("Transaction failed: "));
    assert_eq!(count(&factory, "authors"), 0);
    assert_eq!(count(&factory, "articles"), 0);
}

#[test]
fn add_author_rolls_back_on_invalid_title() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(&dir);
    let (tech, _) = seed_magazines(&factory);

    let outcome = TransactionService::new(factory.clone())
        .add_author_with_articles("Careless Writer", &[NewArticle::new("", tech)]);

    assert!(matches!(
        outcome.failure(),
        Some(TransactionFailure::Validation(_))
    ));
    assert_eq!(
        outcome.message(),
        "Transaction failed: article title must be a non-empty string"
    );
    assert_eq!(count(&factory, "authors"), 0);
}

#[test]
fn add_author_rejects_empty_name() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(&dir);

    let outcome = TransactionService::new(factory.clone()).add_author_with_articles("", &[]);

    assert!(matches!(
        outcome.failure(),
        Some(TransactionFailure::Validation(_))
    ));
    assert_eq!(count(&factory, "authors"), 0);
}

#[test]
fn transfer_moves_every_listed_article() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(&dir);
    let (tech, science) = seed_magazines(&factory);
    let (_, ids) = seed_author_with_articles(&factory, "John Doe", tech, &["One", "Two"]);

    let outcome = TransactionService::new(factory.clone())
        .transfer_articles_between_magazines(tech, science, &ids);

    assert!(outcome.is_committed(), "{}", outcome.message());
    assert_eq!(
        outcome.message(),
        "Successfully transferred 2 articles between magazines"
    );
    let conn = factory.acquire().unwrap();
    let moved = SqliteArticleRepository::new(&conn)
        .find_by_magazine(science)
        .unwrap();
    assert_eq!(moved.len(), 2);
}

#[test]
fn transfer_rolls_back_earlier_moves_on_missing_article() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(&dir);
    let (tech, science) = seed_magazines(&factory);
    let (_, ids) = seed_author_with_articles(&factory, "John Doe", tech, &["Stays Put"]);

    let outcome = TransactionService::new(factory.clone())
        .transfer_articles_between_magazines(tech, science, &[ids[0], 999]);

    assert!(!outcome.is_committed());
    assert!(matches!(
        outcome.failure(),
        Some(TransactionFailure::ArticleNotInMagazine {
            article_id: 999,
            ..
        })
    ));
    assert_eq!(
        outcome.message(),
        "Transaction failed: Article 999 not found in source magazine or doesn't exist"
    );

    let conn = factory.acquire().unwrap();
    let article = SqliteArticleRepository::new(&conn)
        .find_by_id(ids[0])
        .unwrap()
        .unwrap();
    assert_eq!(article.magazine_id(), Some(tech));
}

#[test]
fn transfer_rejects_article_from_other_magazine() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(&dir);
    let (tech, science) = seed_magazines(&factory);
    let (_, ids) = seed_author_with_articles(&factory, "John Doe", science, &["Elsewhere"]);

    let outcome = TransactionService::new(factory.clone())
        .transfer_articles_between_magazines(tech, science, &ids);

    assert!(!outcome.is_committed());
    let conn = factory.acquire().unwrap();
    let article = SqliteArticleRepository::new(&conn)
        .find_by_id(ids[0])
        .unwrap()
        .unwrap();
    assert_eq!(article.magazine_id(), Some(science));
}

#[test]
fn transfer_of_empty_list_commits() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(&dir);
    let (tech, science) = seed_magazines(&factory);

    let outcome = TransactionService::new(factory)
        .transfer_articles_between_magazines(tech, science, &[]);

    assert!(outcome.is_committed());
    assert_eq!(
        outcome.message(),
        "Successfully transferred 0 articles between magazines"
    );
}

#[test]
fn delete_author_removes_author_and_articles() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(&dir);
    let (tech, _) = seed_magazines(&factory);
    let (author_id, _) = seed_author_with_articles(&factory, "John Doe", tech, &["A", "B", "C"]);
    seed_author_with_articles(&factory, "Jane Smith", tech, &["Survivor"]);

    let outcome = TransactionService::new(factory.clone()).delete_author_and_articles(author_id);

    assert!(outcome.is_committed(), "{}", outcome.message());
    assert_eq!(
        outcome.message(),
        "Successfully deleted author and 3 articles"
    );
    assert_eq!(count(&factory, "authors"), 1);
    assert_eq!(count(&factory, "articles"), 1);
}

#[test]
fn delete_missing_author_restores_orphan_articles() {
    let dir = tempfile::tempdir().unwrap();
    let factory = ConnectionFactory::new(
        DbConfig::new(dir.path(), ExecutionMode::Testing).with_foreign_keys(false),
    );
    let (tech, _) = seed_magazines(&factory);
    {
        let conn = factory.acquire().unwrap();
        conn.execute(
            "INSERT INTO articles (title, author_id, magazine_id) VALUES ('Orphan', 42, ?1);",
            [tech],
        )
        .unwrap();
    }

    let outcome = TransactionService::new(factory.clone()).delete_author_and_articles(42);

    assert!(matches!(
        outcome.failure(),
        Some(TransactionFailure::AuthorNotFound(42))
    ));
    assert_eq!(
        outcome.message(),
        "Transaction failed: Author with ID 42 not found"
    );
    assert_eq!(count(&factory, "articles"), 1);
}

#[test]
fn unreachable_store_reports_connection_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let factory = ConnectionFactory::new(DbConfig::new(
        blocker.join("nested"),
        ExecutionMode::Testing,
    ));

    let outcome = TransactionService::new(factory).add_author_with_articles("Nobody", &[]);

    assert!(matches!(
        outcome.failure(),
        Some(TransactionFailure::Connection(_))
    ));
}

#[test]
fn write_lock_is_released_after_commit_and_rollback() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(&dir);
    let (tech, science) = seed_magazines(&factory);
    let (_, ids) = seed_author_with_articles(&factory, "John Doe", tech, &["Mover"]);
    let service = TransactionService::new(factory.clone());

    let rolled_back = service.transfer_articles_between_magazines(tech, science, &[ids[0], 999]);
    assert!(!rolled_back.is_committed());
    assert_write_lock_free(&factory);

    let committed = service.transfer_articles_between_magazines(tech, science, &ids);
    assert!(committed.is_committed(), "{}", committed.message());
    assert_write_lock_free(&factory);

    let failed_delete = service.delete_author_and_articles(4242);
    assert!(!failed_delete.is_committed());
    assert_write_lock_free(&factory);
}
