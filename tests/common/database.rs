//! Test database setup
#![allow(dead_code)]

use sea_orm::{DatabaseConnection, DbErr};

/// Fresh in-memory SQLite database with the schema applied.
///
/// Every call returns an independent database, so tests can run in parallel.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    pollsite::db::connect_memory().await
}
