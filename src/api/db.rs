pub mod base;

use std::path::{Path, PathBuf};

use log::{debug, info};
use sqlx::{Pool, Sqlite, SqlitePool};

use super::err::{ModelError, ModelResult};

const SQLITE_SCHEME: &str = "sqlite://";

/// open the database behind `url` and bring its schema up to date
///
/// file urls get their parent directory and the database file created
/// when missing, `sqlite::memory:` is passed through untouched
pub async fn init_db(url: &str) -> ModelResult<Pool<Sqlite>> {
    if let Some(path) = database_file(url)? {
        prepare_file(&path)?;
    }

    // connect the database
    let pool = SqlitePool::connect(url).await?;
    debug!("connected to {}", url);

    // use the migration feature of sqlx to create the table
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database ready at {}", url);

    Ok(pool)
}

/// open a file database by path
pub async fn init_db_at(path: &Path) -> ModelResult<Pool<Sqlite>> {
    let path = path
        .to_str()
        .ok_or_else(|| ModelError::Config(format!("non utf-8 path: {}", path.display())))?;
    init_db(&format!("{}{}", SQLITE_SCHEME, path)).await
}

fn database_file(url: &str) -> ModelResult<Option<PathBuf>> {
    if url.starts_with("sqlite::memory:") {
        return Ok(None);
    }
    let rest = url
        .strip_prefix(SQLITE_SCHEME)
        .or_else(|| url.strip_prefix("sqlite:"))
        .ok_or_else(|| ModelError::Config(format!("not a sqlite url: {}", url)))?;
    // drop connection options such as `?mode=rwc`
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() {
        return Err(ModelError::Config(format!("missing database path: {}", url)));
    }
    Ok(Some(PathBuf::from(path)))
}

fn prepare_file(path: &Path) -> ModelResult<()> {
    // create the data directory if it doesn't exist
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    // test if the database file exists
    if !path.exists() {
        std::fs::File::create(path)?;
        info!("created database file {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    /// fresh migrated database inside its own temp dir, keep the dir alive
    pub(crate) async fn build_pool() -> (TempDir, Pool<Sqlite>) {
        let dir = tempdir().unwrap();
        let pool = init_db_at(&dir.path().join("data.db")).await.unwrap();
        (dir, pool)
    }

    #[test]
    fn test_database_file() {
        assert_eq!(
            database_file("sqlite://data/nilai.db").unwrap(),
            Some(PathBuf::from("data/nilai.db"))
        );
        assert_eq!(
            database_file("sqlite:nilai.db?mode=rwc").unwrap(),
            Some(PathBuf::from("nilai.db"))
        );
        assert_eq!(database_file("sqlite::memory:").unwrap(), None);
        assert!(database_file("postgres://localhost/db").is_err());
        assert!(database_file("sqlite://").is_err());
    }

    #[tokio::test]
    async fn test_init_db_creates_file_and_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data.db");

        let pool = init_db_at(&path).await.unwrap();
        assert!(path.exists());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM nilai")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_init_db_twice() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.db");

        init_db_at(&path).await.unwrap().close().await;
        assert!(init_db_at(&path).await.is_ok());
    }
}
