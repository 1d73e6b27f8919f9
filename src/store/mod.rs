use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::{BotError, Result};

/// A JSON document on disk with locked read-modify-write access.
///
/// One store owns one file. All mutations must go through [`JsonStore::update`],
/// which holds the store lock across the whole read-mutate-write sequence;
/// pairing a bare `read` with a later `write` reintroduces the race the lock
/// exists to prevent. Two different stores share no lock and no ordering.
pub struct JsonStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Open a store, creating the file with `default` if it does not exist.
    pub async fn open(path: impl Into<PathBuf>, default: &T) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BotError::StoreSave {
                    path: path.display().to_string(),
                    source: e,
                })?;
        }

        match tokio::fs::metadata(&path).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                persist(&path, default).await?;
            }
            Err(e) => {
                return Err(BotError::StoreLoad {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        }

        Ok(Self {
            path,
            lock: Mutex::new(()),
            _doc: PhantomData,
        })
    }

    /// Load the current on-disk document.
    pub async fn read(&self) -> Result<T> {
        let _guard = self.lock.lock().await;
        let (_, doc) = load(&self.path).await?;
        Ok(doc)
    }

    /// Replace the on-disk document wholesale.
    pub async fn write(&self, doc: &T) -> Result<()> {
        let _guard = self.lock.lock().await;
        persist(&self.path, doc).await
    }

    /// Read the document, apply `f`, and persist the result, all under the
    /// store lock. Returns whatever `f` returns.
    ///
    /// If `f` fails, nothing is written and the on-disk file is untouched.
    /// If `f` leaves the document unchanged, the write is skipped.
    pub async fn update<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> Result<R>,
    {
        let _guard = self.lock.lock().await;
        let (raw, mut doc) = load(&self.path).await?;
        let out = f(&mut doc)?;

        let new_raw = serde_json::to_vec_pretty(&doc).map_err(|e| BotError::StoreParse {
            path: self.path.display().to_string(),
            source: e,
        })?;
        if new_raw != raw {
            persist_raw(&self.path, &new_raw).await?;
        }

        Ok(out)
    }
}

async fn load<T: DeserializeOwned>(path: &Path) -> Result<(Vec<u8>, T)> {
    let raw = tokio::fs::read(path).await.map_err(|e| BotError::StoreLoad {
        path: path.display().to_string(),
        source: e,
    })?;

    let doc = serde_json::from_slice(&raw).map_err(|e| BotError::StoreParse {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok((raw, doc))
}

async fn persist<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    let raw = serde_json::to_vec_pretty(doc).map_err(|e| BotError::StoreParse {
        path: path.display().to_string(),
        source: e,
    })?;
    persist_raw(path, &raw).await
}

/// Write to a temp file first, then rename for atomicity.
async fn persist_raw(path: &Path, raw: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, raw)
        .await
        .map_err(|e| BotError::StoreSave {
            path: path.display().to_string(),
            source: e,
        })?;

    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| BotError::StoreSave {
            path: path.display().to_string(),
            source: e,
        })?;

    Ok(())
}
