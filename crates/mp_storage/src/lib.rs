use std::str::FromStr;
use std::sync::Arc;
use mp_core::{ArticleStore, Error, Result};

pub mod backends;

pub use backends::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "sqlite" => Ok(StorageKind::Sqlite),
            other => Err(Error::Config(format!(
                "Unknown storage backend '{}'. Available backends: memory (default), sqlite",
                other
            ))),
        }
    }
}

/// Opens the configured backend. `url` is only read by SQLite, where it is a
/// database file path and defaults to `news.db`.
pub async fn create_store(kind: StorageKind, url: Option<&str>) -> Result<Arc<dyn ArticleStore>> {
    match kind {
        StorageKind::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => {
            let path = std::path::PathBuf::from(url.unwrap_or(sqlite::DEFAULT_PATH));
            Ok(Arc::new(SqliteStore::new_with_path(&path).await?))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageKind::Sqlite => {
            let _ = url;
            Err(Error::Config(
                "SQLite support requires building with the `sqlite` feature".to_string(),
            ))
        }
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_store, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_parsing() {
        assert_eq!("MEMORY".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("sqlite".parse::<StorageKind>().unwrap(), StorageKind::Sqlite);
        assert!("mongo".parse::<StorageKind>().is_err());
    }

    #[tokio::test]
    async fn test_create_memory_store() {
        let store = create_store(StorageKind::Memory, None).await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
