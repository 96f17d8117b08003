use super::{ObjectStore, StoreError};
use async_trait::async_trait;
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Object store backed by a local directory, served over HTTP under
/// `public_base_url` (see `actix_files` in `main.rs`).
pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

fn key_regex() -> &'static Regex {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    // one or more path segments, no `..`, no leading slash
    KEY_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_\-]+(/[A-Za-z0-9_\-]+)*(\.[A-Za-z0-9]+)?$").expect("static regex")
    })
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !key_regex().is_match(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            let path = self.path_for(key)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_cannot_escape_the_root() {
        let store = FsObjectStore::new("/tmp/portal", "/storage");
        assert!(store.path_for("results/abc-1.csv").is_ok());
        assert!(store.path_for("notices/n_2.pdf").is_ok());
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("/abs.csv").is_err());
        assert!(store.path_for("results/../x.csv").is_err());
        assert!(store.path_for("").is_err());
    }

    #[test]
    fn public_url_joins_base_and_key() {
        let store = FsObjectStore::new("/tmp/portal", "http://localhost:8080/storage/");
        assert_eq!(
            store.public_url("results/a.csv"),
            "http://localhost:8080/storage/results/a.csv"
        );
    }

    #[actix_web::test]
    async fn put_and_remove_touch_the_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "/storage");
        let keys = vec!["results/a.csv".to_string()];

        store.put("results/a.csv", b"Candidate ID\n").await.unwrap();
        let on_disk = dir.path().join("results").join("a.csv");
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"Candidate ID\n");

        store.remove(&keys).await.unwrap();
        assert!(!on_disk.exists());
        // Already gone counts as removed.
        store.remove(&keys).await.unwrap();
    }
}
