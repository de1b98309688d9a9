//! The interaction routes shared by every list view.
//!
//! Each route applies one controller transition while holding the view
//! registry lock, fetches rows from the API with the lock released if the
//! query changed, then re-renders the list view fragment.

use axum::{
    Form, Router,
    extract::{Path, State},
    http::{
        HeaderValue,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use axum_htmx::HX_TRIGGER;
use maud::Markup;
use serde::Deserialize;

use crate::{
    AppState, Error,
    endpoints::list_view_action,
    list::{
        BoundsSnapshot, BulkAction, BulkScope, BulkStep, FetchOutcome, FetchPlan, ListController,
        ModalKind, ResultSet,
    },
    list_view::{ListPage, ListViewState, list_view_fragment},
};

/// The client-side event that records the list's bounding box before a modal opens.
pub const SNAPSHOT_EVENT: &str = "snapshot-list-bounds";
/// The client-side event that starts the download of an export.
pub const DOWNLOAD_EVENT: &str = "download-ready";

/// The most fetches one interaction may issue. A clamped page needs a second fetch.
const MAX_FETCH_ROUNDS: usize = 3;

#[derive(Debug, Deserialize)]
pub struct SortForm {
    sort: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    search: String,
}

#[derive(Debug, Deserialize)]
pub struct PageForm {
    page: u64,
}

#[derive(Debug, Deserialize)]
pub struct PageSizeForm {
    page_size: u64,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    id: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkForm {
    action: String,
}

#[derive(Debug, Deserialize)]
pub struct ScopeForm {
    scope: String,
}

/// The interaction routes of the list views of `R`.
pub fn list_view_routes<R: ListPage>() -> Router<AppState> {
    let route = |action: &str| format!("{}/{action}", R::VIEWS_ROUTE);

    Router::new()
        .route(R::VIEWS_ROUTE, delete(discard_view::<R>))
        .route(&route("sort"), post(set_sort::<R>))
        .route(&route("search"), post(set_search::<R>))
        .route(&route("filter"), post(apply_filter::<R>))
        .route(&route("filter/open"), post(open_filter_panel::<R>))
        .route(&route("filter/close"), post(close_filter_panel::<R>))
        .route(&route("page"), post(set_page::<R>))
        .route(&route("page-size"), post(set_page_size::<R>))
        .route(&route("toggle"), post(toggle_row::<R>))
        .route(&route("select-all"), post(select_all_on_page::<R>))
        .route(&route("clear"), post(clear_selection::<R>))
        .route(&route("bulk"), post(request_bulk_action::<R>))
        .route(&route("bulk/scope"), post(choose_bulk_scope::<R>))
        .route(&route("bulk/confirm"), post(confirm_delete::<R>))
        .route(&route("bulk/cancel"), post(cancel_bulk_action::<R>))
        .route(&route("download"), get(download_export::<R>))
}

/// Create a list view for `resource`, load its first page and render it.
///
/// # Errors
/// Returns an error if the view registry lock is poisoned. A failed fetch is
/// shown as a status message inside the fragment instead.
pub async fn open_list_view<R: ListPage>(
    state: &ListViewState<R>,
    resource: R,
) -> Result<Markup, Error> {
    let preferences = state.preferences.list_preferences(R::KEY);
    let controller = ListController::new(
        resource,
        &preferences,
        state.pagination_config.default_page_size,
    );
    let view_id = state.views.insert(controller)?;
    tracing::debug!(
        "Opened {} view {view_id}, {} open",
        R::KEY,
        state.views.len().unwrap_or_default()
    );

    refresh(state, view_id).await?;

    state.views.with_view(view_id, |controller| {
        list_view_fragment(view_id, controller, &state.pagination_config)
    })
}

/// Bring the rows of a view up to date with its query.
async fn refresh<R: ListPage>(state: &ListViewState<R>, view_id: u64) -> Result<(), Error> {
    for _ in 0..MAX_FETCH_ROUNDS {
        let FetchPlan::Request(ticket) = state.views.with_view(view_id, |c| c.begin_fetch())?
        else {
            return Ok(());
        };

        let response = state
            .api
            .fetch_page::<R::Row>(ticket.path(), ticket.params())
            .await
            .map(ResultSet::from);

        let outcome = state
            .views
            .with_view(view_id, move |c| c.complete_fetch(ticket, response))?;

        if outcome != FetchOutcome::Clamped {
            return Ok(());
        }
    }

    tracing::warn!("{} view {view_id} kept clamping its page", R::KEY);
    Ok(())
}

/// Apply `update` to a view, refresh its rows when `update` returns true,
/// and render the fragment.
async fn update_view<R, F>(state: &ListViewState<R>, view_id: u64, update: F) -> Response
where
    R: ListPage,
    F: FnOnce(&mut ListController<R>, &mut Vec<ModalKind>) -> Result<bool, Error> + Send,
{
    let mut snapshots = Vec::<ModalKind>::new();

    let result = async {
        let needs_refresh = state
            .views
            .with_view(view_id, |controller| update(controller, &mut snapshots))??;

        if needs_refresh {
            refresh(state, view_id).await?;
        }

        render_view(state, view_id, &snapshots)
    }
    .await;

    result.unwrap_or_else(Error::into_alert_response)
}

fn render_view<R: ListPage>(
    state: &ListViewState<R>,
    view_id: u64,
    snapshots: &[ModalKind],
) -> Result<Response, Error> {
    let (markup, download_ready) = state.views.with_view(view_id, |controller| {
        (
            list_view_fragment(view_id, controller, &state.pagination_config),
            controller.has_pending_download(),
        )
    })?;

    let download_url =
        download_ready.then(|| list_view_action(R::VIEWS_ROUTE, view_id, "download"));
    let mut response = markup.into_response();

    if let Some(trigger) = hx_trigger(!snapshots.is_empty(), download_url.as_deref())? {
        response.headers_mut().insert(HX_TRIGGER, trigger);
    }

    Ok(response)
}

/// Respond with a modal that opens over a list, asking the browser to record
/// the list's bounds first.
pub fn modal_response(kind: ModalKind, markup: Markup) -> Response {
    let mut snapshots = Vec::<ModalKind>::new();
    snapshots.request_bounds_snapshot(kind);

    match hx_trigger(!snapshots.is_empty(), None) {
        Ok(Some(trigger)) => ([(HX_TRIGGER, trigger)], markup).into_response(),
        Ok(None) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Build the `HX-Trigger` header value for the client-side events of a response.
pub fn hx_trigger(
    snapshot: bool,
    download_url: Option<&str>,
) -> Result<Option<HeaderValue>, Error> {
    let mut events = serde_json::Map::new();

    if snapshot {
        events.insert(SNAPSHOT_EVENT.to_owned(), serde_json::Value::Bool(true));
    }

    if let Some(url) = download_url {
        events.insert(
            DOWNLOAD_EVENT.to_owned(),
            serde_json::json!({ "url": url }),
        );
    }

    if events.is_empty() {
        return Ok(None);
    }

    let value = serde_json::Value::Object(events).to_string();
    HeaderValue::from_str(&value)
        .map(Some)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))
}

async fn set_sort<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
    Form(form): Form<SortForm>,
) -> Response {
    let preferences = state.preferences.clone();

    update_view(&state, view_id, |controller, _| {
        controller.set_sort(&form.sort, &preferences)?;
        Ok(true)
    })
    .await
}

async fn set_search<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
    Form(form): Form<SearchForm>,
) -> Response {
    update_view(&state, view_id, |controller, _| {
        controller.set_search(form.search.trim());
        Ok(true)
    })
    .await
}

async fn apply_filter<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
    axum_extra::extract::Form(form): axum_extra::extract::Form<R::FilterForm>,
) -> Response {
    update_view(&state, view_id, |controller, _| {
        let filter = controller
            .resource()
            .filter_from_form(controller.query().filter(), form)?;

        controller.update_filter(|current| *current = filter);
        controller.close_filter_panel();

        Ok(true)
    })
    .await
}

async fn open_filter_panel<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
) -> Response {
    update_view(&state, view_id, |controller, snapshots| {
        controller.open_filter_panel(snapshots);
        Ok(false)
    })
    .await
}

async fn close_filter_panel<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
) -> Response {
    update_view(&state, view_id, |controller, _| {
        controller.close_filter_panel();
        Ok(false)
    })
    .await
}

async fn set_page<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
    Form(form): Form<PageForm>,
) -> Response {
    update_view(&state, view_id, |controller, _| {
        controller.set_page(form.page);
        Ok(true)
    })
    .await
}

async fn set_page_size<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
    Form(form): Form<PageSizeForm>,
) -> Response {
    let preferences = state.preferences.clone();

    update_view(&state, view_id, |controller, _| {
        controller.set_page_size(form.page_size, &preferences)?;
        Ok(true)
    })
    .await
}

async fn toggle_row<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
    Form(form): Form<ToggleForm>,
) -> Response {
    update_view(&state, view_id, |controller, _| {
        controller.toggle(&form.id);
        Ok(false)
    })
    .await
}

async fn select_all_on_page<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
) -> Response {
    update_view(&state, view_id, |controller, _| {
        controller.select_all_on_page();
        Ok(false)
    })
    .await
}

async fn clear_selection<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
) -> Response {
    update_view(&state, view_id, |controller, _| {
        controller.clear_selection();
        Ok(false)
    })
    .await
}

async fn request_bulk_action<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
    Form(form): Form<BulkForm>,
) -> Response {
    update_view(&state, view_id, |controller, snapshots| {
        let action: BulkAction = form.action.parse()?;
        controller.request_bulk(action, snapshots);
        Ok(false)
    })
    .await
}

async fn choose_bulk_scope<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
    Form(form): Form<ScopeForm>,
) -> Response {
    let scope: BulkScope = match form.scope.parse() {
        Ok(scope) => scope,
        Err(error) => return error.into_alert_response(),
    };
    let mut snapshots = Vec::<ModalKind>::new();

    let step = state.views.with_view(view_id, |controller| {
        let step = controller.choose_scope(scope, &mut snapshots);
        let paths = (
            controller.resource().bulk_path(),
            controller.resource().export_stem(),
        );
        (step, paths)
    });

    let (step, (bulk_path, export_stem)) = match step {
        Ok(result) => result,
        Err(error) => return error.into_alert_response(),
    };

    match step {
        Ok(BulkStep::Export(request)) => {
            let download = state
                .api
                .export(&bulk_path, &request, &export_stem)
                .await;

            if let Err(error) = state
                .views
                .with_view(view_id, |controller| controller.finish_export(download))
            {
                return error.into_alert_response();
            }
        }
        // The scope modal shows why the scope could not be used.
        Ok(BulkStep::ConfirmDelete) | Err(Error::NothingSelected) => {}
        Err(error) => return error.into_alert_response(),
    }

    render_view(&state, view_id, &snapshots).unwrap_or_else(Error::into_alert_response)
}

async fn confirm_delete<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
) -> Response {
    let result = async {
        let (request, bulk_path) = state.views.with_view(view_id, |controller| {
            controller
                .confirm_delete()
                .map(|request| (request, controller.resource().bulk_path()))
        })??;

        let response = state.api.delete(&bulk_path, &request).await;

        let needs_refresh = state
            .views
            .with_view(view_id, |controller| {
                controller.finish_delete(&request, response)
            })?;

        if needs_refresh {
            refresh(&state, view_id).await?;
        }

        render_view(&state, view_id, &[])
    }
    .await;

    result.unwrap_or_else(Error::into_alert_response)
}

async fn cancel_bulk_action<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
) -> Response {
    update_view(&state, view_id, |controller, _| {
        controller.cancel_bulk();
        Ok(false)
    })
    .await
}

async fn download_export<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
) -> Response {
    let download = state
        .views
        .with_view(view_id, |controller| controller.take_download())
        .and_then(|download| download);

    match download {
        Ok(download) => (
            [
                (CONTENT_TYPE, download.content_type),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", download.filename),
                ),
            ],
            download.bytes,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

async fn discard_view<R: ListPage>(
    State(state): State<ListViewState<R>>,
    Path(view_id): Path<u64>,
) -> Response {
    match state.views.remove(view_id) {
        Ok(existed) => {
            tracing::debug!("Discarded {} view {view_id} (existed: {existed})", R::KEY);
            axum::http::StatusCode::NO_CONTENT.into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
