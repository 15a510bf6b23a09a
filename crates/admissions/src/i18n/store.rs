//! Process-wide language preference with write-through persistence.
//!
//! The store is built once at startup from a [`PreferenceStorage`] port. It reads the persisted
//! entry a single time and writes it back on every change, so a fresh store over the same
//! storage comes up in the language last selected.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::language::{DocumentAttributes, Language};
use super::translate::Dictionaries;

/// Key of the persisted language entry.
pub const LANGUAGE_STORAGE_KEY: &str = "hopn-language-storage";

/// Durable key/value entries.
pub trait PreferenceStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Value>, PreferenceStorageError>;

    fn save(&self, key: &str, value: Value) -> Result<(), PreferenceStorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceStorageError {
    #[error("failed to access preference file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preference file {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode preference: {0}")]
    Encode(#[source] serde_json::Error),
}

/// JSON object on disk mapping keys to values. A missing file reads as empty.
#[derive(Debug)]
pub struct FilePreferenceStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferenceStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, PreferenceStorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(PreferenceStorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|source| PreferenceStorageError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: std::io::Error) -> PreferenceStorageError {
        PreferenceStorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PreferenceStorage for FilePreferenceStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, PreferenceStorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn save(&self, key: &str, value: Value) -> Result<(), PreferenceStorageError> {
        let _guard = self.write_lock.lock().expect("preference file lock poisoned");

        // A corrupt file is replaced rather than blocking every later write.
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let serialized = serde_json::to_string_pretty(&Value::Object(entries))
            .map_err(PreferenceStorageError::Encode)?;
        fs::write(&self.path, serialized).map_err(|err| self.io_error(err))
    }
}

/// Storage double scoped to one process.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl InMemoryPreferenceStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStorage for InMemoryPreferenceStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, PreferenceStorageError> {
        let guard = self.entries.lock().expect("preference mutex poisoned");
        Ok(guard.get(key).cloned())
    }

    fn save(&self, key: &str, value: Value) -> Result<(), PreferenceStorageError> {
        let mut guard = self.entries.lock().expect("preference mutex poisoned");
        guard.insert(key.to_string(), value);
        Ok(())
    }
}

/// Shape of the persisted entry: `{"state":{"currentLanguage":"ar"},"version":0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedLanguage {
    pub state: LanguageSnapshot,
    #[serde(default)]
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSnapshot {
    pub current_language: String,
}

impl PersistedLanguage {
    pub fn of(language: Language) -> Self {
        Self {
            state: LanguageSnapshot {
                current_language: language.code().to_string(),
            },
            version: 0,
        }
    }
}

/// Selected site language, shared by every request.
pub struct LanguageStore {
    storage: Arc<dyn PreferenceStorage>,
    current: RwLock<Language>,
}

impl LanguageStore {
    /// Read the persisted language once. Anything missing, unreadable, or unsupported starts
    /// the store in English.
    pub fn initialize(storage: Arc<dyn PreferenceStorage>) -> Self {
        let current = match storage.load(LANGUAGE_STORAGE_KEY) {
            Ok(Some(value)) => restore(value),
            Ok(None) => {
                debug!("no persisted language, using default");
                Language::default()
            }
            Err(err) => {
                warn!(error = %err, "persisted language unreadable, using default");
                Language::default()
            }
        };

        Self {
            storage,
            current: RwLock::new(current),
        }
    }

    pub fn current(&self) -> Language {
        *self.current.read().expect("language lock poisoned")
    }

    /// Switch languages and write the choice through to storage. The in-memory selection
    /// changes even when persisting fails.
    pub fn set_language(
        &self,
        language: Language,
    ) -> Result<DocumentAttributes, PreferenceStorageError> {
        {
            let mut guard = self.current.write().expect("language lock poisoned");
            *guard = language;
        }
        info!(language = %language, "language changed");

        let persisted = serde_json::to_value(PersistedLanguage::of(language))
            .map_err(PreferenceStorageError::Encode)?;
        self.storage.save(LANGUAGE_STORAGE_KEY, persisted)?;

        Ok(language.attributes())
    }

    pub fn attributes(&self) -> DocumentAttributes {
        self.current().attributes()
    }

    /// Translate `key` into the current language.
    pub fn translate(&self, key: &str) -> String {
        Dictionaries::embedded().translate(self.current(), key)
    }
}

impl std::fmt::Debug for LanguageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageStore")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

fn restore(value: Value) -> Language {
    let code = match serde_json::from_value::<PersistedLanguage>(value) {
        Ok(persisted) => persisted.state.current_language,
        Err(err) => {
            warn!(error = %err, "persisted language has unexpected shape, using default");
            return Language::default();
        }
    };

    Language::from_code(&code).unwrap_or_else(|err| {
        warn!(error = %err, "persisted language unsupported, using default");
        Language::default()
    })
}
