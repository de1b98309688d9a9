//! The state machine behind every list view.
//!
//! A [ListController] owns the query, the current page of rows, the
//! selection and the progress of a bulk action for one list view. All of its
//! transitions are synchronous; the caller performs the network requests and
//! hands the results back (see [ListController::begin_fetch] and
//! [ListController::complete_fetch]).

use std::collections::BTreeSet;

use crate::{
    Error,
    alert::Alert,
    api::Download,
    list::{
        BoundsSnapshot, BulkAction, BulkScope, BulkStage, BulkStep, DeleteRequest, ExportRequest,
        FetchGeneration, FetchOutcome, FetchPlan, FetchTicket, ListFilter, ListResource,
        ModalKind, QueryState, ResultSet, ScopeChoice, SelectAllState, SelectionSet,
    },
    preferences::{ListPreferences, PreferenceStore},
};

#[derive(Debug)]
pub struct ListController<R: ListResource> {
    resource: R,
    query: QueryState<R::Filter>,
    result: ResultSet<R::Row>,
    selection: SelectionSet,
    /// Ids of rows that were returned as not selectable.
    protected_ids: BTreeSet<String>,
    generation: FetchGeneration,
    bulk: BulkStage,
    filter_panel_open: bool,
    status: Option<Alert>,
    pending_download: Option<Download>,
}

impl<R: ListResource> ListController<R> {
    /// Create a controller using the saved sort option and page size, if any.
    pub fn new(resource: R, preferences: &ListPreferences, default_page_size: u64) -> Self {
        let sort = preferences
            .sort
            .as_deref()
            .and_then(R::find_sort_option)
            .unwrap_or(R::DEFAULT_SORT);
        let page_size = preferences.page_size.unwrap_or(default_page_size);
        let filter = resource.initial_filter();

        Self {
            resource,
            query: QueryState::new(sort, page_size, filter),
            result: ResultSet::empty(),
            selection: SelectionSet::new(),
            protected_ids: BTreeSet::new(),
            generation: FetchGeneration::default(),
            bulk: BulkStage::Idle,
            filter_panel_open: false,
            status: None,
            pending_download: None,
        }
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    pub fn query(&self) -> &QueryState<R::Filter> {
        &self.query
    }

    pub fn result(&self) -> &ResultSet<R::Row> {
        &self.result
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn bulk_stage(&self) -> &BulkStage {
        &self.bulk
    }

    pub fn is_filter_panel_open(&self) -> bool {
        self.filter_panel_open
    }

    pub fn status(&self) -> Option<&Alert> {
        self.status.as_ref()
    }

    /// Remove the status message so it is only shown once.
    pub fn take_status(&mut self) -> Option<Alert> {
        self.status.take()
    }

    /// # Errors
    /// Returns [Error::UnknownSortOption] if `key` is not a sort option of the list.
    pub fn set_sort(&mut self, key: &str, preferences: &PreferenceStore) -> Result<(), Error> {
        let option =
            R::find_sort_option(key).ok_or_else(|| Error::UnknownSortOption(key.to_owned()))?;

        self.query.set_sort(option);
        preferences.save_sort_option(R::KEY, option.key);

        Ok(())
    }

    pub fn set_search(&mut self, text: &str) {
        self.query.set_search(text);
    }

    pub fn update_filter(&mut self, update: impl FnOnce(&mut R::Filter)) {
        self.query.update_filter(update);
    }

    pub fn set_page(&mut self, page: u64) {
        self.query.set_page(page);
    }

    /// # Errors
    /// Returns [Error::InvalidPageSize] if `page_size` is zero.
    pub fn set_page_size(
        &mut self,
        page_size: u64,
        preferences: &PreferenceStore,
    ) -> Result<(), Error> {
        self.query.set_page_size(page_size)?;
        preferences.save_page_size(R::KEY, page_size);

        Ok(())
    }

    /// Start bringing the rows up to date with the query.
    ///
    /// When the filter matches nothing the rows are emptied immediately and
    /// no request is needed. Either way any fetch issued earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchPlan {
        let generation = self.generation.issue();

        if self.query.filter().matches_nothing() {
            tracing::debug!(
                "{} filter matches nothing, skipping request {generation}",
                R::PLURAL
            );
            self.result = ResultSet::empty();
            return FetchPlan::ShortCircuit;
        }

        FetchPlan::Request(FetchTicket {
            generation,
            path: self.resource.list_path(),
            params: self.query.query_params(),
        })
    }

    /// Apply the response to a request started with [ListController::begin_fetch].
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        response: Result<ResultSet<R::Row>, Error>,
    ) -> FetchOutcome {
        if !self.generation.is_latest(ticket.generation) {
            tracing::debug!(
                "Discarding stale {} response {}",
                R::PLURAL,
                ticket.generation
            );
            return FetchOutcome::Stale;
        }

        let result = match response {
            Ok(result) => result,
            Err(error) => {
                tracing::error!("Could not fetch {}: {error}", R::PLURAL);
                self.status = Some(Alert::error(
                    &format!("Could not load {}", R::PLURAL),
                    error.user_message(),
                ));
                return FetchOutcome::Failed;
            }
        };

        for row in result.rows.iter().filter(|row| !R::is_selectable(row)) {
            let id = R::row_id(row);
            self.selection.remove_all([&id]);
            self.protected_ids.insert(id);
        }

        let total = result.total;
        self.result = result;

        if self.query.clamp_to_total(total) {
            FetchOutcome::Clamped
        } else {
            FetchOutcome::Applied
        }
    }

    /// The ids of the selectable rows on the visible page.
    pub fn visible_ids(&self) -> Vec<String> {
        self.result
            .rows
            .iter()
            .filter(|row| R::is_selectable(row))
            .map(R::row_id)
            .collect()
    }

    pub fn is_protected(&self, id: &str) -> bool {
        self.protected_ids.contains(id)
    }

    /// Flip the selection of `id`. Ids of rows that are not selectable are ignored.
    pub fn toggle(&mut self, id: &str) {
        if self.is_protected(id) {
            tracing::debug!("Ignoring selection of protected {} {id}", R::SINGULAR);
            return;
        }

        self.selection.toggle(id);
    }

    pub fn select_all_on_page(&mut self) {
        let visible = self.visible_ids();
        self.selection.select_all_on_page(&visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all_state(&self) -> SelectAllState {
        self.selection.select_all_state(&self.visible_ids())
    }

    pub fn selected_on_page(&self) -> Vec<String> {
        self.selection.selected_among(&self.visible_ids())
    }

    pub fn open_filter_panel(&mut self, hook: &mut impl BoundsSnapshot) {
        hook.request_bounds_snapshot(ModalKind::Filter);
        self.filter_panel_open = true;
    }

    pub fn close_filter_panel(&mut self) {
        self.filter_panel_open = false;
    }

    /// Open the scope modal for `action`.
    ///
    /// Returns false and sets a status message instead when nothing is selected.
    pub fn request_bulk(&mut self, action: BulkAction, hook: &mut impl BoundsSnapshot) -> bool {
        if self.selection.is_empty() {
            self.status = Some(Alert::error(
                "Nothing selected",
                format!("Select one or more {} first.", R::PLURAL),
            ));
            return false;
        }

        let mut scopes = vec![BulkScope::CurrentPage, BulkScope::AllSelected];
        if action == BulkAction::Delete && R::Filter::OFFERS_MATCHING_SCOPE {
            scopes.push(BulkScope::MatchingFilters);
        }

        let choices = scopes
            .into_iter()
            .map(|scope| ScopeChoice {
                scope,
                count: self.resolve_scope(scope).len(),
            })
            .collect();

        hook.request_bounds_snapshot(ModalKind::BulkScope);
        self.bulk = BulkStage::ChoosingScope {
            action,
            choices,
            error: None,
        };

        true
    }

    /// Resolve the selected rows for `scope` and move on to the next step.
    ///
    /// # Errors
    /// - [Error::NoBulkActionPending] if the scope modal is not open.
    /// - [Error::InvalidBulkScope] if `scope` was not offered.
    /// - [Error::NothingSelected] if the scope covers no rows; the scope modal
    ///   stays open and shows the error.
    pub fn choose_scope(
        &mut self,
        scope: BulkScope,
        hook: &mut impl BoundsSnapshot,
    ) -> Result<BulkStep, Error> {
        let BulkStage::ChoosingScope {
            action, choices, ..
        } = &self.bulk
        else {
            return Err(Error::NoBulkActionPending);
        };

        if !choices.iter().any(|choice| choice.scope == scope) {
            return Err(Error::InvalidBulkScope(scope.as_str().to_owned()));
        }

        let action = *action;
        let codes = self.resolve_scope(scope);

        if codes.is_empty() {
            self.set_bulk_error(Error::NothingSelected.user_message());
            return Err(Error::NothingSelected);
        }

        match action {
            BulkAction::Delete => {
                hook.request_bounds_snapshot(ModalKind::ConfirmDelete);
                self.bulk = BulkStage::ConfirmingDelete {
                    scope,
                    codes,
                    error: None,
                };

                Ok(BulkStep::ConfirmDelete)
            }
            BulkAction::Export(format) => {
                let sort = self.query.sort();

                Ok(BulkStep::Export(ExportRequest {
                    codes,
                    sort_by: sort.sort_by,
                    order: sort.order,
                    format,
                }))
            }
        }
    }

    /// The request for the delete awaiting confirmation.
    ///
    /// # Errors
    /// Returns [Error::NoBulkActionPending] if no delete is awaiting confirmation.
    pub fn confirm_delete(&self) -> Result<DeleteRequest, Error> {
        match &self.bulk {
            BulkStage::ConfirmingDelete { codes, .. } => DeleteRequest::from_codes(
                codes
                    .iter()
                    .filter(|code| !self.is_protected(code))
                    .cloned()
                    .collect(),
            ),
            _ => Err(Error::NoBulkActionPending),
        }
    }

    /// Apply the API's answer to a delete.
    ///
    /// On success the deleted ids leave the selection and true is returned,
    /// meaning the rows must be fetched again. On failure the confirmation
    /// modal stays open with the error.
    pub fn finish_delete(
        &mut self,
        request: &DeleteRequest,
        response: Result<Option<String>, Error>,
    ) -> bool {
        match response {
            Ok(message) => {
                let count = request.codes().len();
                tracing::info!("Deleted {count} {}", R::PLURAL);

                self.selection.remove_all(request.codes());
                self.bulk = BulkStage::Idle;
                self.status = Some(Alert::success(message.unwrap_or_else(|| {
                    format!("Deleted {count} {}", noun(count, R::SINGULAR, R::PLURAL))
                })));

                true
            }
            Err(error) => {
                tracing::error!("Could not delete {}: {error}", R::PLURAL);
                self.set_bulk_error(error.user_message());

                false
            }
        }
    }

    /// Apply the API's answer to an export.
    ///
    /// A successful export closes the scope modal and waits for the browser
    /// to collect the file with [ListController::take_download].
    pub fn finish_export(&mut self, response: Result<Download, Error>) {
        match response {
            Ok(download) => {
                tracing::info!("Exported {} as {}", R::PLURAL, download.filename);

                self.status = Some(Alert::success(format!("Exported {}", download.filename)));
                self.pending_download = Some(download);
                self.bulk = BulkStage::Idle;
            }
            Err(error) => {
                tracing::error!("Could not export {}: {error}", R::PLURAL);
                self.set_bulk_error(error.user_message());
            }
        }
    }

    pub fn has_pending_download(&self) -> bool {
        self.pending_download.is_some()
    }

    /// # Errors
    /// Returns [Error::NoPendingDownload] if there is no export to collect.
    pub fn take_download(&mut self) -> Result<Download, Error> {
        self.pending_download.take().ok_or(Error::NoPendingDownload)
    }

    pub fn cancel_bulk(&mut self) {
        self.bulk = BulkStage::Idle;
    }

    fn set_bulk_error(&mut self, message: String) {
        match &mut self.bulk {
            BulkStage::ChoosingScope { error, .. } | BulkStage::ConfirmingDelete { error, .. } => {
                *error = Some(message)
            }
            BulkStage::Idle => self.status = Some(Alert::error("Request failed", message)),
        }
    }

    fn resolve_scope(&self, scope: BulkScope) -> Vec<String> {
        match scope {
            BulkScope::CurrentPage => self.selected_on_page(),
            BulkScope::AllSelected => self
                .selection
                .iter()
                .filter(|id| !self.is_protected(id))
                .map(str::to_owned)
                .collect(),
            BulkScope::MatchingFilters => {
                let filter = self.query.filter();

                self.selection
                    .iter()
                    .filter(|id| !self.is_protected(id) && filter.admits(id))
                    .map(str::to_owned)
                    .collect()
            }
        }
    }
}

fn noun<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}
