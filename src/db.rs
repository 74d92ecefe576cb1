use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Opens a pool for `database_url` (`postgres://…` or `sqlite:…`).
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(16)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    Database::connect(opt).await
}

/// In-memory SQLite database with the schema applied. One connection only,
/// since every SQLite memory connection is a separate database.
pub async fn connect_memory() -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;
    crate::migration::run(&db).await?;
    Ok(db)
}

pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL
        .get()
        .expect("DB_POOL was accessed before it was initialized.")
}

/// Connects the global pool. Panics when the database is unreachable.
pub async fn init_db(database_url: String) -> &'static DatabaseConnection {
    let pool = connect(&database_url)
        .await
        .expect("Database connection failed.");
    DB_POOL.get_or_init(|| pool)
}
