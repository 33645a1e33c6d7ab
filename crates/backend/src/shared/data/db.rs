use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

/// Connect to the sqlite database file and make sure the `pastes` table
/// exists. The connection is returned to the caller for injection into the
/// store; nothing here is kept in global state.
pub async fn initialize_database(db_file: &str) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    // Minimal schema bootstrap
    let check_pastes_table = r#"
        SELECT name FROM sqlite_master WHERE type='table' AND name='pastes';
    "#;
    let pastes_table_exists = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            check_pastes_table.to_string(),
        ))
        .await?;

    if pastes_table_exists.is_empty() {
        tracing::info!("Creating pastes table");
        let create_pastes_table_sql = r#"
            CREATE TABLE pastes (
                id TEXT PRIMARY KEY NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT,
                max_views INTEGER,
                view_count INTEGER NOT NULL DEFAULT 0
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_pastes_table_sql.to_string(),
        ))
        .await?;
    }

    Ok(conn)
}
