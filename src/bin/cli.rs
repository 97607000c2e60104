use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

#[derive(Parser, Debug)]
#[command(author, version, about = "professors-service operations tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    MigrateRun,
    /// Show migration status against the current database
    MigrateStatus,
    /// Insert a handful of sample professors into an empty directory
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Try to load env from CWD; when running in Docker the binary CWD may
    // differ, so fall back to the crate-local `.env`.
    if dotenv().is_err() {
        let crate_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::MigrateRun => {
            let pool = get_pool().await?;
            get_migrator().await?.run(&pool).await?;
            println!("Migrations applied");
        }
        Commands::MigrateStatus => {
            let pool = get_pool().await?;
            print_status(&pool, &get_migrator().await?).await?;
        }
        Commands::Seed => {
            let pool = get_pool().await?;
            get_migrator().await?.run(&pool).await?;
            seed(&pool).await?;
        }
    }

    Ok(())
}

async fn get_pool() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let options = SqliteConnectOptions::from_str(&database_url)
        .context("DATABASE_URL is not a valid sqlite URL")?
        .create_if_missing(true);

    SqlitePool::connect_with(options)
        .await
        .context("failed to connect to database")
}

async fn get_migrator() -> anyhow::Result<Migrator> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    Migrator::new(dir).await.context("failed to load migrations")
}

async fn print_status(pool: &SqlitePool, migrator: &Migrator) -> anyhow::Result<()> {
    let applied: HashSet<i64> = match sqlx::query_scalar("SELECT version FROM _sqlx_migrations")
        .fetch_all(pool)
        .await
    {
        Ok(versions) => versions.into_iter().collect(),
        // No migrations table yet means nothing has been applied.
        Err(_) => HashSet::new(),
    };

    for migration in migrator.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        println!("{:>14}  {}  [{}]", migration.version, migration.description, state);
    }

    Ok(())
}

async fn seed(pool: &SqlitePool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM professors")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("Directory is not empty, skipping seed");
        return Ok(());
    }

    let samples = [
        ("Alice Smith", "Computer Science", "alice.smith@university.edu", "IT 4.12"),
        ("Bob Jones", "Mathematics", "bob.jones@university.edu", "M 2.03"),
        ("Carol White", "Physics", "carol.white@university.edu", "P 1.18"),
    ];

    for (name, department, email, office) in samples {
        sqlx::query(
            "INSERT INTO professors (name, department, email, office, rating) VALUES (?, ?, ?, ?, 0.0)",
        )
        .bind(name)
        .bind(department)
        .bind(email)
        .bind(office)
        .execute(pool)
        .await?;
    }

    println!("Seeded {} professors", samples.len());

    Ok(())
}
