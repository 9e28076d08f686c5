use std::fs::File;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::Result;

/// Exclusive advisory lock serializing concurrent launches.
///
/// Released when dropped (closing the descriptor drops the flock). The lock file
/// itself is never removed.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Open (creating if needed) `path` and block until the lock is ours.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        debug!(path = %path.display(), "waiting for lock");
        file.lock_exclusive()?;
        debug!(path = %path.display(), "lock acquired");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// [`LockGuard::acquire`] off the async runtime's worker threads.
    pub async fn acquire_async(path: &Path) -> Result<Self> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::acquire(&path))
            .await
            .map_err(std::io::Error::other)?
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        debug!(path = %self.path.display(), "lock released");
    }
}

/// `$XDG_RUNTIME_DIR/marvex.lock`, or the temp dir when there is none.
pub fn default_lock_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("marvex.lock")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marvex.lock");

        let guard = LockGuard::acquire(&path).unwrap();
        assert!(path.exists());
        assert_eq!(guard.path(), path);
    }

    #[test]
    fn test_lock_is_exclusive_until_released() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marvex.lock");

        let guard = LockGuard::acquire(&path).unwrap();

        let other = File::options().write(true).open(&path).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        guard.release();
        assert!(other.try_lock_exclusive().is_ok());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_acquire_async_blocks_second_holder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marvex.lock");

        let first = LockGuard::acquire_async(&path).await.unwrap();

        let second_path = path.clone();
        let second = tokio::spawn(async move { LockGuard::acquire_async(&second_path).await });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!second.is_finished());

        first.release();
        let second = second.await.unwrap().unwrap();
        assert_eq!(second.path(), path);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = LockGuard::acquire(Path::new("/nonexistent/dir/marvex.lock")).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
