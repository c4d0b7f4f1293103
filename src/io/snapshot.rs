use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::io::storage::{KeyValueStore, StorageError};
use crate::model::category::{Category, default_categories};
use crate::model::task::Task;
use crate::ops::category_ops::dedupe_categories;
use crate::ops::task_ops::dedupe_tasks;

pub const TASKS_KEY: &str = "tasks";
pub const CATEGORIES_KEY: &str = "categories";

/// Suffix of the key that keeps the bytes of a record that failed to load
pub const CORRUPT_SUFFIX: &str = ".corrupt";

/// Error type for snapshot persistence
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("could not encode {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
    #[error("stored {key} is unreadable: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
}

/// Storage key names for the two persisted records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeys {
    pub tasks: String,
    pub categories: String,
}

impl RecordKeys {
    /// `tasks` / `categories`, or `tasks_v<N>` / `categories_v<N>` when versioned
    pub fn versioned(version: Option<u32>) -> Self {
        match version {
            Some(v) => RecordKeys {
                tasks: format!("{}_v{}", TASKS_KEY, v),
                categories: format!("{}_v{}", CATEGORIES_KEY, v),
            },
            None => RecordKeys {
                tasks: TASKS_KEY.to_string(),
                categories: CATEGORIES_KEY.to_string(),
            },
        }
    }
}

impl Default for RecordKeys {
    fn default() -> Self {
        Self::versioned(None)
    }
}

/// Outcome of reading one record
#[derive(Debug)]
pub enum Loaded<T> {
    /// Never written (or explicitly null)
    Missing,
    Found(T),
    Corrupt(SnapshotError),
}

/// Read and decode a single record.
pub fn read_record<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Loaded<T> {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Loaded::Missing,
        Err(e) => return Loaded::Corrupt(e.into()),
    };
    match serde_json::from_slice::<Option<T>>(&bytes) {
        Ok(Some(value)) => Loaded::Found(value),
        Ok(None) => Loaded::Missing,
        Err(source) => Loaded::Corrupt(SnapshotError::Decode {
            key: key.to_string(),
            source,
        }),
    }
}

/// Encode and write a single record.
pub fn write_record<T: Serialize + ?Sized>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), SnapshotError> {
    let bytes = serde_json::to_vec(value).map_err(|source| SnapshotError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &bytes)?;
    Ok(())
}

/// Write both records as a full snapshot.
pub fn write_snapshot(
    store: &mut impl KeyValueStore,
    keys: &RecordKeys,
    tasks: &[Task],
    categories: &[Category],
) -> Result<(), SnapshotError> {
    write_record(store, &keys.tasks, tasks)?;
    write_record(store, &keys.categories, categories)?;
    Ok(())
}

/// State reconstructed at startup
#[derive(Debug, Clone, Default)]
pub struct LoadedState {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    /// User-facing descriptions of anything that could not be loaded
    pub warnings: Vec<String>,
}

/// Load both records. Never fails: an unreadable record falls back to its
/// initial state, a warning is recorded, and its raw bytes are copied to
/// `<key>.corrupt` so the next write does not destroy them. Records that
/// decode but hold duplicate ids or blank titles are trimmed the same way.
pub fn load_state(store: &mut impl KeyValueStore, keys: &RecordKeys, seed_categories: bool) -> LoadedState {
    let mut state = LoadedState::default();

    state.tasks = match read_record::<Vec<Task>>(store, &keys.tasks) {
        Loaded::Found(tasks) => tasks,
        Loaded::Missing => Vec::new(),
        Loaded::Corrupt(e) => {
            tracing::warn!(key = %keys.tasks, error = %e, "falling back to an empty task list");
            preserve_corrupt(store, &keys.tasks);
            state
                .warnings
                .push(format!("Saved tasks could not be loaded ({}); starting empty.", e));
            Vec::new()
        }
    };

    state.categories = match read_record::<Vec<Category>>(store, &keys.categories) {
        Loaded::Found(categories) => categories,
        Loaded::Missing if seed_categories => default_categories(),
        Loaded::Missing => Vec::new(),
        Loaded::Corrupt(e) => {
            tracing::warn!(key = %keys.categories, error = %e, "falling back to default categories");
            preserve_corrupt(store, &keys.categories);
            state
                .warnings
                .push(format!("Saved categories could not be loaded ({}); using defaults.", e));
            if seed_categories {
                default_categories()
            } else {
                Vec::new()
            }
        }
    };

    let before = state.tasks.len();
    let duplicates = dedupe_tasks(&mut state.tasks);
    state.tasks.retain(|t| !t.title.trim().is_empty());
    let skipped = before - state.tasks.len();
    if skipped > 0 {
        tracing::warn!(key = %keys.tasks, skipped, duplicates, "skipped unusable saved tasks");
        let backup = preserve_corrupt(store, &keys.tasks);
        state.warnings.push(format!(
            "{} saved task(s) were skipped (duplicate id or blank title); {}.",
            skipped,
            kept_as(backup)
        ));
    }

    let skipped = dedupe_categories(&mut state.categories);
    if skipped > 0 {
        tracing::warn!(key = %keys.categories, skipped, "skipped saved categories with duplicate ids");
        let backup = preserve_corrupt(store, &keys.categories);
        state.warnings.push(format!(
            "{} saved category(ies) were skipped (duplicate id); {}.",
            skipped,
            kept_as(backup)
        ));
    }

    tracing::debug!(
        tasks = state.tasks.len(),
        categories = state.categories.len(),
        "loaded board state"
    );
    state
}

/// Copy a record's raw bytes aside under the first free `<key>.corrupt`,
/// `<key>.corrupt.1`, ... key. Bytes already backed up are not copied again.
/// Best effort; returns the backup key holding the bytes.
fn preserve_corrupt(store: &mut impl KeyValueStore, key: &str) -> Option<String> {
    match try_preserve(store, key) {
        Ok(backup) => backup,
        Err(e) => {
            tracing::warn!(key, error = %e, "could not preserve unreadable record");
            None
        }
    }
}

fn try_preserve(store: &mut impl KeyValueStore, key: &str) -> Result<Option<String>, StorageError> {
    let Some(bytes) = store.get(key)? else {
        return Ok(None);
    };
    let base = format!("{}{}", key, CORRUPT_SUFFIX);
    let mut backup = base.clone();
    let mut n = 1;
    while let Some(existing) = store.get(&backup)? {
        if existing == bytes {
            return Ok(Some(backup));
        }
        backup = format!("{}.{}", base, n);
        n += 1;
    }
    store.set(&backup, &bytes)?;
    Ok(Some(backup))
}

fn kept_as(backup: Option<String>) -> String {
    match backup {
        Some(key) => format!("the full record was kept as {}", key),
        None => "the full record could not be backed up".to_string(),
    }
}
