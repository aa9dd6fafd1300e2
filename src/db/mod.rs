pub mod entities;
pub mod enums;
pub mod models;
pub mod scope;
pub mod services;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use tracing::info;

use crate::db::entities::{account, message_template, message_template_tag, tag};

pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(max_connections).sqlx_logging(false);
    Database::connect(opt).await
}

/// Creates the tables and indexes the application needs if they are missing.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tables = vec![
        schema.create_table_from_entity(account::Entity),
        schema.create_table_from_entity(tag::Entity),
        schema.create_table_from_entity(message_template::Entity),
        schema.create_table_from_entity(message_template_tag::Entity),
    ];
    for table in tables.iter_mut() {
        table.if_not_exists();
        db.execute(backend.build(&*table)).await?;
    }

    // Backstop for the check-then-insert in `TagService`.
    let tag_name_per_account = Index::create()
        .name("idx_tags_account_id_name")
        .table(tag::Entity)
        .col(tag::Column::AccountId)
        .col(tag::Column::Name)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&tag_name_per_account)).await?;

    let templates_by_account = Index::create()
        .name("idx_message_templates_account_id")
        .table(message_template::Entity)
        .col(message_template::Column::AccountId)
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&templates_by_account)).await?;

    info!("Database schema is ready.");
    Ok(())
}
