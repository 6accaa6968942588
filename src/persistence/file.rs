//! File-backed persistent store.
//!
//! Each entry lives in its own JSON file named after the hex-encoded key, so
//! lookups go straight to one path. Keys too long for that get a SHA-256 file
//! name instead and are recovered from the record itself. Writes land in a
//! temp file that is renamed over the target, which keeps every put atomic
//! per key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::PersistentStore;
use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

/// Namespace holding cache entries.
pub const NAMESPACE: &str = "cache_metadata";

/// Every namespace the store manages; `clear` empties all of them.
const NAMESPACES: &[&str] = &[NAMESPACE];

const ENTRY_EXTENSION: &str = "json";

const TEMP_EXTENSION: &str = "tmp";

/// Longest key stored under a hex file name. Hex doubles the length and the
/// temp suffix adds up to ~25 bytes, which keeps names under 255 bytes.
const MAX_HEX_KEY_LEN: usize = 100;

/// File-name prefix for keys stored under their digest.
const HASHED_PREFIX: &str = "sha256-";

// == File Store ==
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    namespace_dir: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let namespace_dir = root.join(NAMESPACE);
        tokio::fs::create_dir_all(&namespace_dir).await?;

        let stale = remove_temp_files(&namespace_dir).await?;
        if stale > 0 {
            warn!(stale, "Removed leftover temp files from interrupted writes");
        }

        info!("Persistent store opened at {}", root.display());

        Ok(Self {
            root,
            namespace_dir,
            tmp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.namespace_dir
            .join(format!("{}.{}", file_stem(key), ENTRY_EXTENSION))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.namespace_dir
            .join(format!(
                "{}.{}.{}.{}",
                file_stem(key),
                ENTRY_EXTENSION,
                n,
                TEMP_EXTENSION
            ))
    }

    async fn read_entry(&self, path: &Path) -> Result<Option<CacheEntry>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[async_trait]
impl PersistentStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        match self.read_entry(&self.entry_path(key)).await {
            Ok(Some(entry)) if is_hashed(key) && entry.key != key => {
                debug!(key, "Digest file belongs to another key");
                Ok(None)
            }
            Ok(entry) => Ok(entry),
            Err(CacheError::Serialization(e)) => {
                // Unreadable records are dropped so they cannot shadow a later put
                warn!(key, "Discarding unreadable cache record: {}", e);
                self.delete(key).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        // Digest-named records are listed by the key they carry
        let bytes = if entry.key == key {
            serde_json::to_vec(entry)?
        } else {
            let mut owned = entry.clone();
            owned.key = key.to_string();
            serde_json::to_vec(&owned)?
        };
        let target = self.entry_path(key);
        let temp = self.temp_path(key);

        tokio::fs::create_dir_all(&self.namespace_dir).await?;
        let written = match tokio::fs::write(&temp, &bytes).await {
            Ok(()) => tokio::fs::rename(&temp, &target).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!(key, bytes = bytes.len(), "Persisted cache entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<()> {
        for namespace in NAMESPACES {
            let dir = self.root.join(namespace);
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            tokio::fs::create_dir_all(&dir).await?;
        }

        info!("Persistent store cleared");
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.namespace_dir).await?;

        while let Some(item) = dir.next_entry().await? {
            let name = item.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(stem) = name.strip_suffix(&format!(".{ENTRY_EXTENSION}")) else {
                continue;
            };
            if stem.starts_with(HASHED_PREFIX) {
                match self.read_entry(&item.path()).await {
                    Ok(Some(entry)) => keys.push(entry.key),
                    Ok(None) => {}
                    Err(e) => warn!(file = name, "Skipping unreadable cache record: {}", e),
                }
            } else if let Some(key) = decode_key(stem) {
                keys.push(key);
            }
        }

        Ok(keys)
    }

    async fn ping(&self) -> Result<()> {
        let metadata = tokio::fs::metadata(&self.namespace_dir).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(CacheError::Storage(std::io::Error::new(
                ErrorKind::NotFound,
                format!("{} is not a directory", self.namespace_dir.display()),
            )))
        }
    }
}

fn is_hashed(key: &str) -> bool {
    key.len() > MAX_HEX_KEY_LEN
}

/// File-name-safe stem for a key: hex of the key, or of its digest when long.
fn file_stem(key: &str) -> String {
    if is_hashed(key) {
        let digest = Sha256::digest(key.as_bytes());
        format!("{}{}", HASHED_PREFIX, hex::encode(digest))
    } else {
        hex::encode(key)
    }
}

fn decode_key(stem: &str) -> Option<String> {
    hex::decode(stem)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

async fn remove_temp_files(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(item) = entries.next_entry().await? {
        let is_temp = item
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(&format!(".{TEMP_EXTENSION}")));
        if is_temp {
            tokio::fs::remove_file(item.path()).await?;
            removed += 1;
        }
    }

    Ok(removed)
}
