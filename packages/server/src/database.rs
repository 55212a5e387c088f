use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::{setlist, setlist_song, song, user};

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.connection_url());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    info!(backend = ?db.get_database_backend(), "Database connected");

    create_schema(&db).await?;
    Ok(db)
}

/// Create any missing tables. Referenced tables come first so foreign keys resolve.
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    create_table(db, user::Entity).await?;
    create_table(db, song::Entity).await?;
    create_table(db, setlist::Entity).await?;
    create_table(db, setlist_song::Entity).await?;
    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute_raw(backend.build(&stmt)).await?;
    Ok(())
}
