//! Creates the sample_app tables when they are missing.
//!
//! Postgres deployments may apply `migrations/0001_initial.sql` instead; the
//! resulting schema is the same.

use crate::orm::{author_clones, authors, choices, questions};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    Ok(())
}

/// Parents before children so foreign keys resolve.
pub async fn run<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());
    create_table(db, &schema, authors::Entity).await?;
    create_table(db, &schema, questions::Entity).await?;
    create_table(db, &schema, choices::Entity).await?;
    create_table(db, &schema, author_clones::Entity).await?;
    log::info!("Schema is up to date");
    Ok(())
}
