//! Embedded database migrations.

use sqlx::PgPool;

use tavern_core::error::{AppError, ErrorKind};

/// Run all pending migrations against the given pool.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Migration failed", e))
}
