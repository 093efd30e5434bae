use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;

/// Open (creating if needed) the SQLite database and bootstrap the schema
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    tracing::info!("Opening database: {}", absolute_path.display());
    let conn = Database::connect(&db_url).await?;
    bootstrap_schema(&conn).await?;
    Ok(conn)
}

/// Ensure required tables exist (minimal schema bootstrap)
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS a001_customer (
            id TEXT PRIMARY KEY NOT NULL,
            identification TEXT NOT NULL,
            name TEXT NOT NULL,
            lastname TEXT NOT NULL,
            date_born TEXT NOT NULL,
            gender TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        );
        "#,
        // Uniqueness only among records that are not soft-deleted
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_a001_customer_identification_active
            ON a001_customer (identification) WHERE deleted_at IS NULL;
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_a001_customer_created_at
            ON a001_customer (created_at);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS a002_company (
            id TEXT PRIMARY KEY NOT NULL,
            identification TEXT NOT NULL,
            name TEXT NOT NULL,
            alias TEXT NOT NULL,
            address TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        );
        "#,
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_a002_company_identification_active
            ON a002_company (identification) WHERE deleted_at IS NULL;
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_a002_company_created_at
            ON a002_company (created_at);
        "#,
    ];

    for sql in statements {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await?;
    }
    Ok(())
}

/// True when the error comes from a UNIQUE constraint
pub fn is_unique_violation(err: &DbErr) -> bool {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return true;
    }
    err.to_string().contains("UNIQUE constraint failed")
}

#[cfg(test)]
pub(crate) async fn open_temp_database() -> (tempfile::TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = initialize_database(&dir.path().join("test.db"))
        .await
        .unwrap();
    (dir, conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let (_dir, conn) = open_temp_database().await;
        bootstrap_schema(&conn).await.unwrap();

        let rows = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name LIKE 'a00%' ORDER BY name"
                    .to_string(),
            ))
            .await
            .unwrap();
        let names: Vec<String> = rows
            .iter()
            .map(|r| r.try_get::<String>("", "name").unwrap())
            .collect();
        assert_eq!(names, vec!["a001_customer", "a002_company"]);
    }
}
