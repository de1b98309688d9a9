//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    api::ApiClient,
    category::Categories,
    date::Dates,
    entry::Entries,
    list_view::ViewRegistry,
    pagination::PaginationConfig,
    preferences::{PreferenceStore, create_preference_table},
    scan::Scans,
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The client for the upstream scan API.
    pub api: ApiClient,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The database connection holding UI preferences.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The open category list views.
    pub category_views: ViewRegistry<Categories>,
    /// The open entry list views.
    pub entry_views: ViewRegistry<Entries>,
    /// The open date list views.
    pub date_views: ViewRegistry<Dates>,
    /// The open scan list views.
    pub scan_views: ViewRegistry<Scans>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the preference table.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        api: ApiClient,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        create_preference_table(&db_connection)?;

        Ok(Self {
            api,
            local_timezone: local_timezone.to_owned(),
            pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
            category_views: ViewRegistry::new(),
            entry_views: ViewRegistry::new(),
            date_views: ViewRegistry::new(),
            scan_views: ViewRegistry::new(),
        })
    }

    /// The preference store backed by the app's database.
    pub fn preferences(&self) -> PreferenceStore {
        PreferenceStore::new(self.db_connection.clone())
    }
}
