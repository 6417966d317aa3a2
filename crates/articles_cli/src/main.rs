//! `articles` command-line driver.
//!
//! # Responsibility
//! - Resolve the store from flags/environment and hand it to core APIs.
//! - Print human-readable results; exit non-zero on failure.

use anyhow::{anyhow, bail, Context, Result};
use articles_core::db::seed::seed_sample_data;
use articles_core::{
    default_log_level, init_logging, ArticleId, AuthorId, AuthorRepository, ConnectionFactory,
    DbConfig, ExecutionMode, MagazineId, MagazineRepository, NewArticle, ReportRepository,
    SqliteAuthorRepository, SqliteMagazineRepository, SqliteReportRepository, TransactionService,
    TxOutcome,
};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

/// Minimum distinct authors for the "shared magazines" report section.
const SHARED_MAGAZINE_MIN_AUTHORS: u32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "articles",
    version,
    about = "Manage a catalog of authors, magazines and articles"
)]
struct Cli {
    /// Directory holding the store file
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,

    /// Use the test store (defaults to the TESTING environment variable)
    #[arg(long, global = true)]
    testing: bool,

    /// Absolute directory for rotated log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level used with --log-dir
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the schema (idempotent)
    Setup,
    /// Load the sample catalog into an empty store
    Seed,
    /// Show row counts and a few sample records
    Summary,
    /// Run the relationship and aggregate reports
    Report,
    /// Add an author and their articles in one transaction
    AddAuthor {
        name: String,
        /// Article as `<title>:<magazine_id>`; repeatable
        #[arg(long = "article", value_parser = parse_new_article)]
        articles: Vec<NewArticle>,
    },
    /// Move articles from one magazine to another in one transaction
    Transfer {
        from: MagazineId,
        to: MagazineId,
        #[arg(required = true)]
        article_ids: Vec<ArticleId>,
    },
    /// Delete an author and all of their articles in one transaction
    DeleteAuthor { author_id: AuthorId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(|err| anyhow!(err))?;
    }

    let mode = if cli.testing {
        ExecutionMode::Testing
    } else {
        ExecutionMode::from_env()
    };
    let factory = ConnectionFactory::new(DbConfig::new(cli.data_dir.clone(), mode));
    info!(
        "event=cli_start module=cli status=ok target={} command={:?}",
        mode.as_str(),
        cli.command
    );

    match cli.command {
        Commands::Setup => cmd_setup(&factory),
        Commands::Seed => cmd_seed(&factory),
        Commands::Summary => cmd_summary(&factory),
        Commands::Report => cmd_report(&factory),
        Commands::AddAuthor { name, articles } => finish(
            TransactionService::new(factory).add_author_with_articles(&name, &articles),
        ),
        Commands::Transfer {
            from,
            to,
            article_ids,
        } => finish(
            TransactionService::new(factory).transfer_articles_between_magazines(
                from,
                to,
                &article_ids,
            ),
        ),
        Commands::DeleteAuthor { author_id } => {
            finish(TransactionService::new(factory).delete_author_and_articles(author_id))
        }
    }
}

fn cmd_setup(factory: &ConnectionFactory) -> Result<()> {
    factory.acquire().with_context(|| {
        format!(
            "failed to set up store at {}",
            factory.config().db_path().display()
        )
    })?;
    println!("Database setup completed successfully!");
    println!("Tables created: authors, magazines, articles");
    Ok(())
}

fn cmd_seed(factory: &ConnectionFactory) -> Result<()> {
    let conn = factory.acquire().context("failed to open store")?;
    let summary = seed_sample_data(&conn).context("failed to seed store")?;
    if summary.skipped {
        println!("Store already contains authors; seeding skipped.");
    } else {
        println!(
            "Seeded {} authors, {} magazines, {} articles.",
            summary.authors, summary.magazines, summary.articles
        );
    }
    Ok(())
}

fn cmd_summary(factory: &ConnectionFactory) -> Result<()> {
    let conn = factory.acquire().context("failed to open store")?;
    let summary = SqliteReportRepository::new(&conn).store_summary()?;
    println!("Authors: {}", summary.authors);
    println!("Magazines: {}", summary.magazines);
    println!("Articles: {}", summary.articles);

    let authors_repo = SqliteAuthorRepository::new(&conn);
    let authors = authors_repo.all()?;
    if !authors.is_empty() {
        println!("\nSample authors:");
    }
    for author in authors.iter().take(3) {
        println!("  - {} (ID: {})", author.name(), display_id(author.id()));
        let Some(author_id) = author.id() else {
            continue;
        };
        let rows = authors_repo.article_rows(author_id)?;
        if rows.is_empty() {
            continue;
        }
        println!("    Articles: {}", rows.len());
        for row in rows.iter().take(2) {
            println!("      * {}", row.text("title").unwrap_or("<untitled>"));
        }
    }

    let magazines_repo = SqliteMagazineRepository::new(&conn);
    let magazines = magazines_repo.all()?;
    if !magazines.is_empty() {
        println!("\nSample magazines:");
    }
    for magazine in magazines.iter().take(3) {
        println!(
            "  - {} ({}) (ID: {})",
            magazine.name(),
            magazine.category(),
            display_id(magazine.id())
        );
    }
    Ok(())
}

fn cmd_report(factory: &ConnectionFactory) -> Result<()> {
    let conn = factory.acquire().context("failed to open store")?;
    let authors_repo = SqliteAuthorRepository::new(&conn);
    let magazines_repo = SqliteMagazineRepository::new(&conn);
    let reports = SqliteReportRepository::new(&conn);

    if let Some(author) = authors_repo.all()?.into_iter().next() {
        let author_id = author.id().context("stored author without id")?;
        println!("Articles by {}:", author.name());
        for row in authors_repo.article_rows(author_id)? {
            println!("  - {}", row.text("title").unwrap_or("<untitled>"));
        }
        println!("Magazines {} has written for:", author.name());
        for row in authors_repo.magazine_rows(author_id)? {
            println!(
                "  - {} ({})",
                row.text("name").unwrap_or("<unnamed>"),
                row.text("category").unwrap_or("<none>")
            );
        }
        println!("Topic areas of {}:", author.name());
        for topic in authors_repo.topic_areas(author_id)? {
            println!("  - {topic}");
        }
    }

    if let Some(magazine) = magazines_repo.all()?.into_iter().next() {
        let magazine_id = magazine.id().context("stored magazine without id")?;
        println!("Contributors to {}:", magazine.name());
        for author in magazines_repo.contributors(magazine_id)? {
            println!("  - {}", author.name());
        }
        println!("Article titles in {}:", magazine.name());
        for title in magazines_repo.article_titles(magazine_id)? {
            println!("  - {title}");
        }
        println!("Contributing authors (>2 articles) in {}:", magazine.name());
        let contributing = magazines_repo.contributing_authors(magazine_id)?;
        if contributing.is_empty() {
            println!("  - No authors with more than 2 articles");
        }
        for author in contributing {
            println!("  - {}", author.name());
        }
    }

    println!("Top publisher:");
    match magazines_repo.top_publisher()? {
        Some(magazine) => println!("  - {} ({})", magazine.name(), magazine.category()),
        None => println!("  - No articles published yet"),
    }

    println!("Magazines with at least {SHARED_MAGAZINE_MIN_AUTHORS} authors:");
    for entry in reports.magazines_with_min_authors(SHARED_MAGAZINE_MIN_AUTHORS)? {
        println!(
            "  - {} ({}) - {} authors",
            entry.magazine.name(),
            entry.magazine.category(),
            entry.author_count
        );
    }

    println!("Articles per magazine:");
    for entry in reports.article_counts_by_magazine()? {
        println!(
            "  - {}: {} articles",
            entry.magazine.name(),
            entry.article_count
        );
    }

    if let Some(entry) = reports.most_prolific_author()? {
        println!(
            "Most prolific author: {} ({} articles)",
            entry.author.name(),
            entry.article_count
        );
    }
    Ok(())
}

fn finish(outcome: TxOutcome) -> Result<()> {
    let message = outcome.message();
    if !outcome.is_committed() {
        bail!(message);
    }
    println!("{message}");
    Ok(())
}

fn display_id(id: Option<i64>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

fn parse_new_article(value: &str) -> Result<NewArticle, String> {
    let (title, magazine_id) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected `<title>:<magazine_id>`, got `{value}`"))?;
    let magazine_id = magazine_id
        .trim()
        .parse::<MagazineId>()
        .map_err(|err| format!("invalid magazine id `{magazine_id}`: {err}"))?;
    Ok(NewArticle::new(title, magazine_id))
}

#[cfg(test)]
mod tests {
    use super::{parse_new_article, Cli};
    use clap::Parser;

    #[test]
    fn parse_new_article_splits_on_last_colon() {
        let article = parse_new_article("Rust: A Primer:7").unwrap();
        assert_eq!(article.title, "Rust: A Primer");
        assert_eq!(article.magazine_id, 7);
    }

    #[test]
    fn parse_new_article_rejects_missing_or_bad_id() {
        assert!(parse_new_article("No Magazine").is_err());
        assert!(parse_new_article("Title:abc").is_err());
    }

    #[test]
    fn transfer_requires_article_ids() {
        assert!(Cli::try_parse_from(["articles", "transfer", "1", "2"]).is_err());
        assert!(Cli::try_parse_from(["articles", "transfer", "1", "2", "5", "6"]).is_ok());
    }
}
