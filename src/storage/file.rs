//! File-per-key storage backend.
//!
//! Layout: `<data-dir>/kv/<encoded-key>`, where the file body is the raw
//! value. Keys are percent-encoded so any string is a valid key; bytes in
//! `[A-Za-z0-9_-]` are kept verbatim.
//!
//! Separate processes opening the same data directory act as separate
//! "tabs": each one's change feed reports what the others wrote.

use super::backend::{BackendType, StorageBackend, StorageEvent, Subscription};
use crate::{Error, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Directory under the data dir that holds one file per key.
pub const KV_DIR: &str = "kv";

/// Values this handle wrote last, per key. `None` records a removal.
type WriteLedger = Arc<Mutex<HashMap<String, Option<String>>>>;

/// Key-value storage on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    written: WriteLedger,
}

impl FileStore {
    /// Open (creating if needed) the store under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let root = data_dir.join(KV_DIR);
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            written: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Directory holding the key files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(Error::InvalidInput("storage key must not be empty".to_string()));
        }
        Ok(self.root.join(encode_key(key)))
    }

    fn record_write(&self, key: &str, value: Option<&str>) {
        if let Ok(mut written) = self.written.lock() {
            written.insert(key.to_string(), value.map(str::to_string));
        }
    }
}

impl StorageBackend for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Record first: the watcher may fire before persist() returns
        self.record_write(key, Some(value));

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        self.record_write(key, None);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn subscribe(&self) -> Result<Subscription> {
        let (tx, rx) = mpsc::channel();
        let written = Arc::clone(&self.written);
        let mut seen = snapshot(&self.root);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let Ok(event) = res else { return };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }

                for path in &event.paths {
                    let Some(key) = path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .and_then(decode_key)
                    else {
                        continue;
                    };
                    let current = read_value(path);

                    // Coalesce repeated notifications for one write
                    if seen.get(&key) == Some(&current) {
                        continue;
                    }
                    let old_value = seen.insert(key.clone(), current.clone()).flatten();

                    if let Ok(mut own) = written.lock() {
                        if own.get(&key) == Some(&current) {
                            continue;
                        }
                        own.remove(&key);
                    }

                    let _ = tx.send(StorageEvent {
                        key,
                        old_value,
                        new_value: current,
                    });
                }
            },
            Config::default(),
        )?;
        watcher.watch(&self.root, RecursiveMode::NonRecursive)?;

        Ok(Subscription::new(rx, Some(Box::new(watcher))))
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::File
    }
}

/// Read a key file, treating any failure as "absent".
fn read_value(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

/// Current value of every key in `root`.
fn snapshot(root: &Path) -> HashMap<String, Option<String>> {
    let mut values = HashMap::new();
    let Ok(entries) = fs::read_dir(root) else {
        return values;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if let Some(key) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(decode_key)
        {
            values.insert(key, read_value(&path));
        }
    }
    values
}

/// Encode a storage key into a file name.
pub fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

/// Decode a file name back into a storage key.
///
/// Returns `None` for names that `encode_key` never produces, which covers
/// the dot-prefixed temp files used for atomic writes.
pub fn decode_key(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let bytes = name.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = name.get(i + 1..i + 3)?;
                decoded.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' => {
                decoded.push(b);
                i += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(decoded).ok()
}
