//! A [`KeyValueStore`] that keeps each value as a JSON file in a directory.
//!
//! The value stored under `sjc.jobs` lives in `<root>/sjc.jobs.json`. Writes go to a temporary
//! file which is then renamed over the old one, so a crash mid-write leaves the previous value in
//! place.
//!
//! Keys are used as file names unchanged, so only ASCII letters, digits, `.`, `-` and `_` are
//! accepted. Any other key, as well as an empty key, `.` or `..`, fails with
//! [`StoreError::InvalidKey`].
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use jobcard::store::{KeyValueStore, StoreError};
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// A store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates `root` if needed and returns a store rooted there.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(root);
        tokio::fs::create_dir_all(&store.root).await?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_');
        if matches!(key, "" | "." | "..") || !key.chars().all(allowed) {
            tracing::warn!(key, "Rejected key");
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl From<PathBuf> for FileStore {
    fn from(root: PathBuf) -> Self {
        Self::new(root)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        match tokio::fs::read(self.path(key)?).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let path = self.path(key)?;
        let staging = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(&value)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &path)
            .await
            .inspect_err(|error| tracing::error!(%error, ?path, "Failed to replace value"))?;
        tracing::trace!(?path, "Stored value");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path(key)?).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    use jobcard::{
        config::BoardConfig,
        job::{form::JobForm, JobStatus},
        testing::FixedClock,
        JobBoard,
    };

    use std::sync::Arc;
    use tempfile::TempDir;

    /// A [`FileStore`] in a temporary directory that is deleted with the last clone.
    #[derive(Clone, Debug)]
    struct ScratchStore {
        store: FileStore,
        dir: Arc<TempDir>,
    }

    impl ScratchStore {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            Self {
                store: FileStore::new(dir.path()),
                dir: Arc::new(dir),
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for ScratchStore {
        async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
            self.store.get(key).await
        }

        async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
            self.store.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.store.remove(key).await
        }
    }

    jobcard::test_suite!(attr: tokio::test, store: ScratchStore::new());

    #[tokio::test]
    async fn scratch_directory_is_removed_on_drop() {
        let store = ScratchStore::new();
        store.set("sjc.jobs", serde_json::json!([])).await.unwrap();
        let root = store.dir.path().to_owned();
        assert!(root.join("sjc.jobs.json").is_file());

        drop(store);

        assert!(!root.exists());
    }

    #[test]
    fn keys_map_to_file_names() {
        let store = FileStore::new("/data");

        assert_eq!(
            store.path("sjc.jobs").unwrap(),
            PathBuf::from("/data/sjc.jobs.json")
        );
        assert_eq!(
            store.path("shop-2_v1").unwrap(),
            PathBuf::from("/data/shop-2_v1.json")
        );
    }

    #[test]
    fn unsafe_keys_are_rejected() {
        let store = FileStore::new("/data");

        for key in ["", ".", "..", "../etc/passwd", "a/b", "a\\b", "a:b", "café", "a b"] {
            assert_matches!(store.path(key), Err(StoreError::InvalidKey(k)) if k == key, "{key:?}");
        }
    }

    #[tokio::test]
    async fn distinct_keys_never_share_a_file() {
        let store = ScratchStore::new();

        store.set("a_b", serde_json::json!(1)).await.unwrap();

        assert_matches!(
            store.set("a/b", serde_json::json!(2)).await,
            Err(StoreError::InvalidKey(_))
        );
        assert_matches!(store.get("a?b").await, Err(StoreError::InvalidKey(_)));
        assert_matches!(store.remove("a b").await, Err(StoreError::InvalidKey(_)));
        assert_eq!(store.get("a_b").await.unwrap(), Some(serde_json::json!(1)));
    }

    #[tokio::test]
    async fn writes_create_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("board"));

        store.set("sjc.settings", serde_json::json!({"name": "FixIt"})).await.unwrap();

        assert!(dir.path().join("nested/board/sjc.settings.json").is_file());
        assert!(!dir.path().join("nested/board/sjc.settings.json.tmp").exists());
    }

    #[tokio::test]
    async fn unreadable_files_are_decode_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sjc.jobs.json"), "{ not json").unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        assert_matches!(
            store.get("sjc.jobs").await,
            Err(StoreError::EncodeDecodeError(_))
        );
    }

    #[tokio::test]
    async fn board_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = || BoardConfig::default().with_clock(FixedClock::at(2024, 1, 15, 9, 30));
        let board = JobBoard::open_with_config(FileStore::new(dir.path()), config())
            .await
            .unwrap();
        let job = board
            .create_job(JobForm::default().with_customer_name("Alice"))
            .await
            .unwrap();
        board
            .jobs()
            .change_status(&job.id, JobStatus::Ready)
            .await
            .unwrap();

        let reopened = JobBoard::open_with_config(FileStore::new(dir.path()), config())
            .await
            .unwrap();

        assert_eq!(reopened.snapshot().await, board.snapshot().await);
        assert_eq!(
            reopened.jobs().find(&job.id).await.unwrap().status,
            JobStatus::Ready
        );
    }

    #[tokio::test]
    async fn corrupt_jobs_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sjc.jobs.json"), "[{\"id\": 1}]").unwrap();

        let board = JobBoard::open(FileStore::new(dir.path())).await.unwrap();

        assert!(board.jobs().is_empty().await);
    }
}
