use crate::error::WeatherStoreError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "meteogrid_cache";

pub fn get_cache_dir() -> Result<PathBuf, WeatherStoreError> {
    dirs::cache_dir()
        .ok_or(WeatherStoreError::CacheDirResolution)
        .map(|p| p.join(CACHE_DIR_NAME))
}

pub async fn ensure_cache_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Cache path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating cache directory: {}", path.display());
            tokio::fs::create_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_cache_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_cache_dir_exists(&nested).await.unwrap();
        assert!(nested.is_dir());
        // second call is a no-op
        ensure_cache_dir_exists(&nested).await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_cache_dir_rejects_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(ensure_cache_dir_exists(file.path()).await.is_err());
    }
}
