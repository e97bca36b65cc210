use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
pub const DATA_DIR_ENV: &str = "TASKPULSE_DATA_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Tasks,
    Users,
    Meetings,
    Directives,
    Burndown,
    Vision,
}

impl Collection {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Tasks => "tasks.json",
            Self::Users => "users.json",
            Self::Meetings => "meetings.json",
            Self::Directives => "directives.json",
            Self::Burndown => "burndown.json",
            Self::Vision => "vision.json",
        }
    }
}

#[derive(Serialize)]
struct StoredCollection<'a, T> {
    schema_version: u32,
    items: &'a [T],
}

#[derive(Deserialize)]
struct LoadedCollection<T> {
    schema_version: u32,
    items: Vec<T>,
}

/// A data directory holding one JSON file per collection. Every operation
/// reads or writes a whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }

    pub fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, AppError> {
        load_items(&self.path(collection))
    }

    pub fn save<T: Serialize>(&self, collection: Collection, items: &[T]) -> Result<(), AppError> {
        save_items(&self.path(collection), items)
    }
}

pub fn default_data_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(DATA_DIR_ENV)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("taskpulse").join("data"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskpulse")
            .join("data"))
    }
}

/// Missing files read as empty. Both the versioned envelope and a bare JSON
/// array (the older on-disk format) are accepted.
pub fn load_items<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    let items = if value.is_array() {
        serde_json::from_value(value)
            .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err)))?
    } else {
        let stored: LoadedCollection<T> = serde_json::from_value(value)
            .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err)))?;
        if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
            return Err(AppError::invalid_data("schema_version mismatch"));
        }
        stored.items
    };

    tracing::debug!(path = %path.display(), "loaded collection");
    Ok(items)
}

/// Writes to a sibling temp file and renames it over the target.
pub fn save_items<T: Serialize>(path: &Path, items: &[T]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredCollection {
        schema_version: SCHEMA_VERSION,
        items,
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;

    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&staging, permissions)
            .map_err(|err| AppError::io(err.to_string()))?;
    }

    std::fs::rename(&staging, path).map_err(|err| AppError::io(err.to_string()))?;
    tracing::debug!(path = %path.display(), count = items.len(), "saved collection");
    Ok(())
}
