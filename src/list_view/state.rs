use axum::extract::FromRef;

use crate::{
    AppState,
    api::ApiClient,
    list_view::{ListPage, ViewRegistry},
    pagination::PaginationConfig,
    preferences::PreferenceStore,
};

/// The state needed by the interaction routes of one kind of list view.
#[derive(Debug)]
pub struct ListViewState<R: ListPage> {
    pub api: ApiClient,
    pub views: ViewRegistry<R>,
    pub preferences: PreferenceStore,
    pub pagination_config: PaginationConfig,
}

impl<R: ListPage> Clone for ListViewState<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            views: self.views.clone(),
            preferences: self.preferences.clone(),
            pagination_config: self.pagination_config.clone(),
        }
    }
}

impl<R: ListPage> FromRef<AppState> for ListViewState<R> {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            views: R::views(state).clone(),
            preferences: state.preferences(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}
