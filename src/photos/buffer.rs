use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::{DateTime, Local};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::PhotoError;

/// Default number of photos retained.
pub const DEFAULT_PHOTO_CAPACITY: usize = 5;

/// Extension of every file the buffer manages.
pub const PHOTO_EXTENSION: &str = "jpg";

/// Capture-time prefix of a photo filename (second resolution).
const FILENAME_TIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

// =============================================================================
// Photo Entry
// =============================================================================

/// A retained photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    /// File name relative to the buffer root
    pub filename: String,

    /// When the entry was rotated into the buffer
    pub stored_at: DateTime<Local>,
}

impl PhotoEntry {
    fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            stored_at: Local::now(),
        }
    }
}

// =============================================================================
// Photo Buffer
// =============================================================================

/// Newest-first list of photos backed by files in a single directory.
///
/// The buffer never holds more than `capacity` entries once an operation
/// completes, and the set of managed files on disk mirrors the entries.
/// All mutation goes through [`rotate`](Self::rotate),
/// [`store`](Self::store) and [`clear_all`](Self::clear_all), each of which
/// holds the write lock for its whole sequence. Readers share the lock and
/// never see a rotation half done.
///
/// # Example
///
/// ```no_run
/// use nvgl8r::photos::PhotoBuffer;
/// use bytes::Bytes;
///
/// #[tokio::main]
/// async fn main() {
///     let buffer = PhotoBuffer::with_capacity("photos", 5);
///     buffer.clear_all().await;
///
///     let filename = buffer.store(Bytes::from_static(b"\xFF\xD8\xFF")).await.unwrap();
///     assert_eq!(buffer.get(0).await.unwrap().filename, filename);
/// }
/// ```
pub struct PhotoBuffer {
    entries: RwLock<VecDeque<PhotoEntry>>,
    capacity: usize,
    root: PathBuf,
    sequence: AtomicU64,
}

impl PhotoBuffer {
    /// Create a buffer rooted at `root` with the default capacity.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_capacity(root, DEFAULT_PHOTO_CAPACITY)
    }

    /// Create a buffer rooted at `root` holding at most `capacity` photos.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_capacity(root: impl Into<PathBuf>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            root: root.into(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Directory holding the photo files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maximum number of retained photos.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of photos currently retained.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the buffer holds no photos.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot of retained filenames, newest first.
    pub async fn filenames(&self) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| entry.filename.clone())
            .collect()
    }

    /// Get the photo at `position` (0 = newest).
    pub async fn get(&self, position: usize) -> Result<PhotoEntry, PhotoError> {
        let entries = self.entries.read().await;
        entries
            .get(position)
            .cloned()
            .ok_or(PhotoError::NotFound {
                position,
                size: entries.len(),
            })
    }

    /// Generate a fresh filename from the current local time.
    ///
    /// The timestamp has second resolution; a process-wide sequence number
    /// keeps names unique when several photos arrive within one second.
    pub fn next_filename(&self) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}-{:04}.{}",
            Local::now().format(FILENAME_TIME_FORMAT),
            sequence,
            PHOTO_EXTENSION
        )
    }

    /// Insert `filename` as the newest photo, evicting the oldest if full.
    ///
    /// The evicted photo's file is deleted; a failed delete is logged and
    /// the entry is dropped anyway.
    pub async fn rotate(&self, filename: impl Into<String>) {
        let mut entries = self.entries.write().await;
        self.rotate_locked(&mut entries, PhotoEntry::new(filename))
            .await;
    }

    /// Write `data` to a new file and rotate it in.
    ///
    /// Returns the generated filename. If the write fails, any partial file
    /// is removed and the buffer is left untouched.
    pub async fn store(&self, data: Bytes) -> Result<String, PhotoError> {
        let mut entries = self.entries.write().await;

        let filename = self.next_filename();
        let path = self.root.join(&filename);
        debug!(path = %path.display(), bytes = data.len(), "Writing photo");

        if let Err(e) = tokio::fs::write(&path, &data).await {
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                debug!(path = %path.display(), "No partial photo to remove: {}", cleanup);
            }
            return Err(PhotoError::Write {
                path,
                message: e.to_string(),
            });
        }

        self.rotate_locked(&mut entries, PhotoEntry::new(filename.clone()))
            .await;
        Ok(filename)
    }

    /// Delete every managed file in the root and empty the buffer.
    ///
    /// Individual delete failures are logged and skipped. A missing root
    /// directory is not an error.
    pub async fn clear_all(&self) {
        let mut entries = self.entries.write().await;

        match tokio::fs::read_dir(&self.root).await {
            Ok(mut dir) => loop {
                let entry = match dir.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(root = %self.root.display(), "Error listing photos: {}", e);
                        break;
                    }
                };

                let path = entry.path();
                if !is_managed(&path) {
                    continue;
                }
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), "Error removing photo: {}", e);
                }
            },
            Err(e) => {
                debug!(root = %self.root.display(), "Photo directory not readable: {}", e);
            }
        }

        let removed = entries.len();
        entries.clear();
        info!(root = %self.root.display(), tracked = removed, "Cleared photos");
    }

    async fn rotate_locked(&self, entries: &mut VecDeque<PhotoEntry>, entry: PhotoEntry) {
        while entries.len() >= self.capacity {
            let Some(oldest) = entries.pop_back() else {
                break;
            };
            let path = self.root.join(&oldest.filename);
            debug!(path = %path.display(), "Deleting oldest photo");
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), "Error removing oldest photo: {}", e);
            }
        }

        entries.push_front(entry);
    }
}

fn is_managed(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == PHOTO_EXTENSION)
}

// =============================================================================
// Tests
// =============================================================================
