//! Durable store for the sync document.
//!
//! All access goes through a single lock: an in-process async mutex plus an
//! advisory file lock next to the document, so the daemon and one-shot CLI
//! invocations are serialized against each other too. A `Transaction` holds
//! both for the duration of one load-mutate-save unit.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{CoreError, CoreResult};

const FILE_LOCK_POLL: Duration = Duration::from_millis(25);

pub struct Store {
    path: PathBuf,
    lock: Mutex<()>,
}

/// A loaded document plus the locks that make mutating it safe.
///
/// Nothing is persisted unless `commit` is called.
pub struct Transaction<'a> {
    store: &'a Store,
    pub document: Document,
    _file_lock: FileLock,
    _guard: MutexGuard<'a, ()>,
}

impl Transaction<'_> {
    pub async fn commit(self) -> CoreResult<()> {
        self.store.save(&self.document).await
    }
}

/// Exclusive advisory lock on `<document>.lock`, released on drop.
struct FileLock {
    _file: File,
}

/// Marks the one daemon serving a data file. Released on drop.
pub struct DaemonLock {
    _file: File,
    path: PathBuf,
}

impl DaemonLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Store {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        sibling(&self.path, "lock")
    }

    fn temp_path(&self) -> PathBuf {
        sibling(&self.path, "tmp")
    }

    /// Claim `<document>.serve.lock`, failing if another daemon holds it.
    ///
    /// Held for the daemon's lifetime, unlike the per-transaction lock.
    pub fn lock_daemon(&self) -> CoreResult<DaemonLock> {
        let path = sibling(&self.path, "serve.lock");
        let file = open_lock_file(&path)?;

        file.try_lock_exclusive().map_err(|_| {
            CoreError::Store(format!(
                "Another ctfpost daemon is already serving {}.\n\
                If you believe this is an error, remove: {}",
                self.path.display(),
                path.display()
            ))
        })?;

        Ok(DaemonLock { _file: file, path })
    }

    /// Read the document without taking the lock.
    ///
    /// A missing or unparseable file yields the default document; corruption
    /// is never fatal.
    pub fn load(&self) -> Document {
        load_document(&self.path)
    }

    /// Write the document atomically on the blocking pool.
    async fn save(&self, document: &Document) -> CoreResult<()> {
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;

        let path = self.path.clone();
        let temp = self.temp_path();
        blocking(move || write_atomically(&path, &temp, content.as_bytes())).await??;

        debug!(path = %self.path.display(), "Store saved");
        Ok(())
    }

    async fn acquire_file_lock(&self) -> CoreResult<FileLock> {
        let path = self.lock_path();
        let file = blocking({
            let path = path.clone();
            move || open_lock_file(&path)
        })
        .await??;

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(FileLock { _file: file }),
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    tokio::time::sleep(FILE_LOCK_POLL).await;
                }
                Err(e) => {
                    return Err(CoreError::Store(format!(
                        "Could not lock {}: {e}",
                        path.display()
                    )));
                }
            }
        }
    }

    /// Take the store lock and load the document.
    pub async fn begin(&self) -> CoreResult<Transaction<'_>> {
        let guard = self.lock.lock().await;
        let file_lock = self.acquire_file_lock().await?;
        let path = self.path.clone();
        let document = blocking(move || load_document(&path)).await?;

        Ok(Transaction {
            store: self,
            document,
            _file_lock: file_lock,
            _guard: guard,
        })
    }

    /// Load a snapshot under the lock so it is never observed mid-write.
    pub async fn read(&self) -> CoreResult<Document> {
        let tx = self.begin().await?;
        Ok(tx.document)
    }

    /// Run a mutation as one unit of work and persist the result.
    pub async fn update<R>(&self, f: impl FnOnce(&mut Document) -> R) -> CoreResult<R> {
        let mut tx = self.begin().await?;
        let result = f(&mut tx.document);
        tx.commit().await?;
        Ok(result)
    }

    /// Like `update`, but an error from the closure leaves the store untouched.
    pub async fn try_update<R>(
        &self,
        f: impl FnOnce(&mut Document) -> CoreResult<R>,
    ) -> CoreResult<R> {
        let mut tx = self.begin().await?;
        let result = f(&mut tx.document)?;
        tx.commit().await?;
        Ok(result)
    }
}

async fn blocking<T, F>(f: F) -> CoreResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CoreError::Store(format!("Store I/O task failed: {e}")))
}

fn load_document(path: &Path) -> Document {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Document::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read store, using defaults");
            return Document::default();
        }
    };

    match serde_json::from_str::<Document>(&content) {
        Ok(mut document) => {
            document.normalize();
            document
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Store is corrupt, resetting to defaults");
            Document::default()
        }
    }
}

/// Temp file, fsync, rename over the target.
fn write_atomically(path: &Path, temp: &Path, content: &[u8]) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    {
        let mut file = File::create(temp)?;
        file.write_all(content)?;
        file.sync_all()?;
    }
    fs::rename(temp, path)?;
    Ok(())
}

fn open_lock_file(path: &Path) -> CoreResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(|e| CoreError::Store(format!("Could not open {}: {e}", path.display())))
}

fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(extension);
    path.with_file_name(name)
}
