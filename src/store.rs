use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

const APP_DIR_NAME: &str = "snake-advisor";
const SETTINGS_FILE_NAME: &str = "settings.json";
const STATS_FILE_NAME: &str = "stats.json";
const LOG_FILE_NAME: &str = "snake-advisor.log";

/// Narrow load/save interface for persisted values.
pub trait Store<T> {
    fn load(&self) -> Result<T, StoreError>;
    fn save(&self, value: &T) -> Result<(), StoreError>;
}

/// Stores one value as pretty-printed JSON in a single file.
///
/// A missing file loads as `T::default()` (first run); a file that exists but
/// cannot be read or parsed is an error so the caller can warn about it.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> Store<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn load(&self) -> Result<T, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(value)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Returns the platform-correct application data directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base
}

#[must_use]
pub fn settings_path() -> PathBuf {
    data_dir().join(SETTINGS_FILE_NAME)
}

#[must_use]
pub fn stats_path() -> PathBuf {
    data_dir().join(STATS_FILE_NAME)
}

#[must_use]
pub fn log_path() -> PathBuf {
    data_dir().join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::config::GameSettings;
    use crate::error::StoreError;
    use crate::stats::Statistics;

    use super::{JsonFileStore, Store};

    #[test]
    fn settings_serialization_round_trip() {
        let path = unique_test_path("round_trip");
        let store = JsonFileStore::<GameSettings>::new(&path);
        let settings = GameSettings {
            grid_width: 12,
            high_score: 42,
            ..GameSettings::default()
        };

        store.save(&settings).expect("settings save should succeed");
        let loaded = store.load().expect("load should succeed");

        assert_eq!(loaded, settings);
        cleanup_test_path(&path);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = unique_test_path("missing");
        // Deliberately do not create the file.
        let loaded = JsonFileStore::<Statistics>::new(&path)
            .load()
            .expect("missing file should load defaults");

        assert_eq!(loaded, Statistics::default());
    }

    #[test]
    fn malformed_file_returns_error() {
        let path = unique_test_path("malformed");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("test parent directory should be creatable");
        }
        fs::write(&path, "not-json").expect("test file write should succeed");

        let result = JsonFileStore::<Statistics>::new(&path).load();

        assert!(matches!(result, Err(StoreError::Parse(_))));
        cleanup_test_path(&path);
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("snake-advisor-store-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
    }
}
