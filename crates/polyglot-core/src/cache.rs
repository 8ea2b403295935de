//! Persistent `(unit, language) -> translation` cache.
//!
//! Stored on disk as a JSON object keyed by `<unit>_<code>`. Entries are write-once:
//! the first value stored for a key is kept for the lifetime of the process, so a
//! resumed run never re-requests a pair that already succeeded or fell back.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use polyglot_types::is_valid_language_code;

use crate::error::{CacheError, KeyError};

pub const KEY_SEPARATOR: char = '_';

/// Cache key for one `(unit, language)` pair, rendered as `<unit>_<code>`
///
/// Language codes never contain the separator, so the last `_` always splits the
/// key back into its pair even when the unit itself contains underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    rendered: String,
    split: usize,
}

impl TranslationKey {
    pub fn new(unit: &str, language: &str) -> Result<Self, KeyError> {
        if !is_valid_language_code(language) {
            return Err(KeyError::InvalidLanguage(language.to_string()));
        }

        Ok(Self {
            rendered: format!("{unit}{KEY_SEPARATOR}{language}"),
            split: unit.len(),
        })
    }

    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let (unit, language) = raw
            .rsplit_once(KEY_SEPARATOR)
            .ok_or_else(|| KeyError::Malformed(raw.to_string()))?;
        Self::new(unit, language)
    }

    pub fn unit(&self) -> &str {
        &self.rendered[..self.split]
    }

    pub fn language(&self) -> &str {
        &self.rendered[self.split + KEY_SEPARATOR.len_utf8()..]
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for TranslationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

pub struct TranslationCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
    /// Serializes writers of `<path>.tmp`
    persist_lock: Mutex<()>,
}

impl TranslationCache {
    /// Load the cache at `path`.
    ///
    /// A missing file gives an empty cache; an unreadable or corrupt one is logged
    /// and also gives an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries = match Self::read_entries(&path) {
            Ok(Some(entries)) => {
                tracing::info!(
                    path = %path.display(),
                    entries = entries.len(),
                    "Loaded translation cache"
                );
                entries
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "No translation cache found, starting fresh");
                HashMap::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Translation cache unusable, starting with an empty cache");
                HashMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
            persist_lock: Mutex::new(()),
        }
    }

    /// Empty cache that will persist to `path`, ignoring whatever is there now
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(HashMap::new()),
            persist_lock: Mutex::new(()),
        }
    }

    fn read_entries(path: &Path) -> Result<Option<HashMap<String, String>>, CacheError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_reader(BufReader::new(file))
            .map(Some)
            .map_err(|source| CacheError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &TranslationKey) -> Option<String> {
        self.read().get(key.as_str()).cloned()
    }

    pub fn contains(&self, key: &TranslationKey) -> bool {
        self.read().contains_key(key.as_str())
    }

    /// Store `text` unless the key already has a value.
    ///
    /// Returns the value held by the cache afterwards, which is the earlier value
    /// when another worker won the race.
    pub fn put(&self, key: &TranslationKey, text: String) -> String {
        match self.write().entry(key.as_str().to_string()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(text).clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sorted copy of every entry
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Write the whole cache to disk and return the number of entries written.
    ///
    /// The snapshot is taken under the map's lock, so it never sees half of a
    /// `put`; the file I/O happens after the lock is released so workers keep
    /// resolving during a checkpoint. The JSON goes to `<path>.tmp`, is fsynced,
    /// then renamed over `<path>`: the file on disk is always either the previous
    /// or the new complete snapshot.
    pub fn persist(&self) -> Result<usize, CacheError> {
        let _writing = self
            .persist_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Taken after `persist_lock` so a later persist never writes an older snapshot
        let snapshot = self.entries();

        let tmp_path = tmp_path(&self.path);
        let write_err = |source| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let file = File::create(&tmp_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.flush().map_err(write_err)?;
        writer.get_ref().sync_all().map_err(write_err)?;
        drop(writer);

        fs::rename(&tmp_path, &self.path).map_err(write_err)?;

        tracing::debug!(path = %self.path.display(), entries = snapshot.len(), "Cache persisted");
        Ok(snapshot.len())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
