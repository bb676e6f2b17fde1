use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")
}

/// Failure modes shared by every repository implementation.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("unique constraint violated")]
    Conflict,
    #[error("unexpected value in column `{column}`: {value}")]
    Decode { column: &'static str, value: String },
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => RepoError::Conflict,
            _ => RepoError::Database(e),
        }
    }
}

impl From<RepoError> for crate::error::AppError {
    fn from(e: RepoError) -> Self {
        crate::error::AppError::Internal(anyhow::Error::new(e).context("repository"))
    }
}
