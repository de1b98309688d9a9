//! Durable key-value storage for UI preferences.
//!
//! Each list remembers its sort option and page size under keys prefixed with
//! the list's resource key (e.g. `categories.sort`). The category picked for
//! the last created scan is shared by every scan form.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension};

use crate::Error;

const PREFERENCE_TABLE: &str = "preference";
const SORT_SUFFIX: &str = "sort";
const PAGE_SIZE_SUFFIX: &str = "page_size";
const LAST_SELECTED_CATEGORY_KEY: &str = "scan.last_selected_category";

/// Create the preference table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_preference_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            table = PREFERENCE_TABLE
        ),
        (),
    )?;

    Ok(())
}

/// Get the value stored under `key`, if any.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_preference(key: &str, connection: &Connection) -> Result<Option<String>, Error> {
    connection
        .prepare(&format!(
            "SELECT value FROM {table} WHERE key = :key",
            table = PREFERENCE_TABLE
        ))?
        .query_row(&[(":key", key)], |row| row.get(0))
        .optional()
        .map_err(Error::from)
}

/// Store `value` under `key`, replacing any previous value.
///
/// # Errors
/// Returns [Error::SqlError] if the statement fails.
pub fn set_preference(key: &str, value: &str, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        &format!(
            "INSERT INTO {table} (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            table = PREFERENCE_TABLE
        ),
        (key, value),
    )?;

    Ok(())
}

/// The persisted choices of one list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPreferences {
    /// The key of the chosen sort option.
    pub sort: Option<String>,
    /// The chosen number of rows per page.
    pub page_size: Option<u64>,
}

/// Shared handle to the preferences database.
///
/// Preferences are best effort: read failures fall back to defaults and write
/// failures are logged, neither interrupts the list view.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    db_connection: Arc<Mutex<Connection>>,
}

impl PreferenceStore {
    pub fn new(db_connection: Arc<Mutex<Connection>>) -> Self {
        Self { db_connection }
    }

    /// Load the sort option and page size saved for `resource_key`.
    pub fn list_preferences(&self, resource_key: &str) -> ListPreferences {
        let sort = self.load(&preference_key(resource_key, SORT_SUFFIX));
        let page_size = self
            .load(&preference_key(resource_key, PAGE_SIZE_SUFFIX))
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|&page_size| page_size > 0);

        ListPreferences { sort, page_size }
    }

    pub fn save_sort_option(&self, resource_key: &str, sort_key: &str) {
        self.save(&preference_key(resource_key, SORT_SUFFIX), sort_key);
    }

    pub fn save_page_size(&self, resource_key: &str, page_size: u64) {
        self.save(
            &preference_key(resource_key, PAGE_SIZE_SUFFIX),
            &page_size.to_string(),
        );
    }

    fn load(&self, key: &str) -> Option<String> {
        let connection = match self.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return None;
            }
        };

        get_preference(key, &connection)
            .inspect_err(|error| tracing::warn!("Could not read preference {key}: {error}"))
            .ok()
            .flatten()
    }

    fn save(&self, key: &str, value: &str) {
        let connection = match self.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return;
            }
        };

        if let Err(error) = set_preference(key, value, &connection) {
            tracing::warn!("Could not save preference {key}={value}: {error}");
        }
    }
}

fn preference_key(resource_key: &str, suffix: &str) -> String {
    format!("{resource_key}.{suffix}")
}

/// The category chosen for the most recently created scan.
///
/// Every scan form reads it as its default category and the scan creation
/// endpoint writes it after a scan is saved.
#[derive(Debug, Clone)]
pub struct LastSelectedCategory {
    store: PreferenceStore,
}

impl LastSelectedCategory {
    pub fn new(store: PreferenceStore) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Option<String> {
        self.store
            .load(LAST_SELECTED_CATEGORY_KEY)
            .filter(|code| !code.is_empty())
    }

    pub fn set(&self, category_code: &str) {
        self.store.save(LAST_SELECTED_CATEGORY_KEY, category_code);
    }
}

#[cfg(test)]
pub(crate) fn get_test_preference_store() -> PreferenceStore {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    create_preference_table(&connection).expect("Could not create preference table");

    PreferenceStore::new(Arc::new(Mutex::new(connection)))
}
