//! Scan creation modal and endpoint.

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    AppState, Error,
    api::ApiClient,
    category::{Category, fetch_category_options},
    date::{format_iso_date, parse_iso_date},
    endpoints,
    entry::{Entry, fetch_entry_options},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, dismiss_modal_button, modal,
    },
    list::ModalKind,
    list_view::modal_response,
    preferences::LastSelectedCategory,
    scan::ScanParent,
    timezone::{get_local_offset, local_now},
};

/// The value format of a `datetime-local` input.
const SCANNED_AT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

/// Browsers add seconds to `datetime-local` values when a step below one minute is set.
const SCANNED_AT_WITH_SECONDS_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// The state needed for creating a scan.
#[derive(Debug, Clone)]
pub struct CreateScanState {
    pub api: ApiClient,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub last_selected_category: LastSelectedCategory,
}

impl FromRef<AppState> for CreateScanState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            local_timezone: state.local_timezone.clone(),
            last_selected_category: LastSelectedCategory::new(state.preferences()),
        }
    }
}

/// Where the scan form was opened from.
#[derive(Debug, Default, Deserialize)]
pub struct NewScanQuery {
    /// The code of the entry whose scan list opened the form.
    pub entry: Option<String>,
    /// The ISO date whose scan list opened the form.
    pub date: Option<String>,
}

/// The submitted scan form.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanFormData {
    pub entry_code: String,
    pub category_code: String,
    /// A `datetime-local` value in the server's timezone.
    pub scanned_at: String,
    /// The ISO date of the scan list to return to, empty when the form was
    /// opened from an entry.
    #[serde(default)]
    pub return_date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanBody<'a> {
    entry_code: &'a str,
    category_code: &'a str,
    #[serde(with = "time::serde::rfc3339")]
    scanned_at: OffsetDateTime,
}

/// A scan form that passed validation.
#[derive(Debug, PartialEq, Eq)]
struct ValidScan<'a> {
    entry_code: &'a str,
    category_code: &'a str,
    scanned_at: OffsetDateTime,
}

/// Render the scan creation modal.
///
/// The category defaults to the category of the last created scan, then to
/// General, then to the first category.
pub async fn get_new_scan_modal(
    State(state): State<CreateScanState>,
    Query(query): Query<NewScanQuery>,
) -> Response {
    let Some(now) = local_now(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let categories = match fetch_category_options(&state.api).await {
        Ok(categories) => categories,
        Err(error) => return error.into_alert_response(),
    };

    let entries = match fetch_entry_options(&state.api).await {
        Ok(entries) => entries,
        Err(error) => return error.into_alert_response(),
    };

    let return_date = query
        .date
        .as_deref()
        .filter(|date| !date.is_empty())
        .and_then(|date| parse_iso_date(date).ok());
    let scanned_at = default_scanned_at(return_date, now);
    let category_code = default_category(&categories, state.last_selected_category.get());

    let form = NewScanForm {
        entries: &entries,
        categories: &categories,
        entry_code: query.entry.as_deref().unwrap_or_default(),
        category_code: category_code.unwrap_or_default(),
        scanned_at: &scanned_at,
        max_scanned_at: &format_scanned_at(now),
        return_date: &return_date.map(format_iso_date).unwrap_or_default(),
    };

    modal_response(
        ModalKind::Create,
        modal("New scan", &dismiss_modal_button(), &form.into_html()),
    )
}

/// Handle scan creation form submission.
///
/// On success the browser is sent back to the scan list the form was opened from.
pub async fn create_scan_endpoint(
    State(state): State<CreateScanState>,
    Form(form): Form<ScanFormData>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let scan = match validate(&form, local_offset, OffsetDateTime::now_utc()) {
        Ok(scan) => scan,
        Err(error) => return error.into_alert_response(),
    };

    let body = ScanBody {
        entry_code: scan.entry_code,
        category_code: scan.category_code,
        scanned_at: scan.scanned_at,
    };

    if let Err(error) = state.api.post_json(endpoints::API_SCANS, &body).await {
        tracing::error!("Could not create scan for entry {}: {error}", scan.entry_code);
        return error.into_alert_response();
    }

    tracing::info!("Created scan for entry {}", scan.entry_code);
    state.last_selected_category.set(scan.category_code);

    let parent = match parse_iso_date(&form.return_date) {
        Ok(date) => ScanParent::Date(date),
        Err(_) => ScanParent::Entry {
            code: scan.entry_code.to_owned(),
        },
    };

    (HxRedirect(parent.page_path()), StatusCode::SEE_OTHER).into_response()
}

fn validate(
    form: &ScanFormData,
    local_offset: UtcOffset,
    now: OffsetDateTime,
) -> Result<ValidScan<'_>, Error> {
    let entry_code = form.entry_code.trim();
    if entry_code.is_empty() {
        return Err(Error::MissingEntry);
    }

    let category_code = form.category_code.trim();
    if category_code.is_empty() {
        return Err(Error::MissingCategory);
    }

    let scanned_at = PrimitiveDateTime::parse(&form.scanned_at, SCANNED_AT_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(&form.scanned_at, SCANNED_AT_WITH_SECONDS_FORMAT))
        .map_err(|_| Error::InvalidDate(form.scanned_at.clone()))?
        .assume_offset(local_offset);

    if scanned_at > now {
        return Err(Error::FutureScanTime(scanned_at));
    }

    Ok(ValidScan {
        entry_code,
        category_code,
        scanned_at,
    })
}

fn default_category(
    categories: &[Category],
    last_selected: Option<String>,
) -> Option<&str> {
    last_selected
        .and_then(|code| categories.iter().find(|category| category.code == code))
        .or_else(|| categories.iter().find(|category| category.is_general()))
        .or_else(|| categories.first())
        .map(|category| category.code.as_str())
}

/// Scans opened from a past date default to that date at the current time of day.
fn default_scanned_at(date: Option<time::Date>, now: OffsetDateTime) -> String {
    let scanned_at = date
        .map(|date| now.replace_date(date))
        .filter(|scanned_at| *scanned_at <= now)
        .unwrap_or(now);

    format_scanned_at(scanned_at)
}

fn format_scanned_at(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(SCANNED_AT_FORMAT)
        .unwrap_or_else(|_| timestamp.to_string())
}

struct NewScanForm<'a> {
    entries: &'a [Entry],
    categories: &'a [Category],
    entry_code: &'a str,
    category_code: &'a str,
    scanned_at: &'a str,
    max_scanned_at: &'a str,
    return_date: &'a str,
}

impl NewScanForm<'_> {
    fn into_html(self) -> Markup {
        html! {
            form
                hx-post=(endpoints::NEW_SCAN_VIEW)
                hx-target-error="#alert-container"
                class="w-full space-y-4"
            {
                input type="hidden" name="return_date" value=(self.return_date);

                div
                {
                    label for="entry_code" class=(FORM_LABEL_STYLE) { "Entry" }

                    select id="entry_code" name="entry_code" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected[self.entry_code.is_empty()] { "Choose an entry" }

                        @for entry in self.entries {
                            option value=(entry.code) selected[entry.code == self.entry_code]
                            {
                                (entry.name)
                            }
                        }
                    }
                }

                div
                {
                    label for="category_code" class=(FORM_LABEL_STYLE) { "Category" }

                    select id="category_code" name="category_code" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for category in self.categories {
                            option value=(category.code) selected[category.code == self.category_code]
                            {
                                (category.name)
                            }
                        }
                    }
                }

                div
                {
                    label for="scanned_at" class=(FORM_LABEL_STYLE) { "Scanned at" }

                    input
                        id="scanned_at"
                        type="datetime-local"
                        name="scanned_at"
                        value=(self.scanned_at)
                        max=(self.max_scanned_at)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Scan" }
            }
        }
    }
}

#[cfg(test)]
mod validate_tests {
    use time::{Duration, macros::{datetime, offset}};

    use crate::Error;

    use super::{ScanFormData, ValidScan, default_category, default_scanned_at, validate};

    fn form(entry_code: &str, category_code: &str, scanned_at: &str) -> ScanFormData {
        ScanFormData {
            entry_code: entry_code.to_owned(),
            category_code: category_code.to_owned(),
            scanned_at: scanned_at.to_owned(),
            return_date: String::new(),
        }
    }

    #[test]
    fn accepts_past_scan_in_local_time() {
        let now = datetime!(2026-03-07 12:00 UTC);
        let form = form("E-1", "C-1", "2026-03-07T09:30");

        let scan = validate(&form, offset!(+13), now).unwrap();

        assert_eq!(
            scan,
            ValidScan {
                entry_code: "E-1",
                category_code: "C-1",
                scanned_at: datetime!(2026-03-07 09:30 +13),
            }
        );
    }

    #[test]
    fn accepts_seconds() {
        let now = datetime!(2026-03-07 12:00 UTC);
        let form = form("E-1", "C-1", "2026-03-07T09:30:15");

        let scan = validate(&form, offset!(UTC), now).unwrap();

        assert_eq!(scan.scanned_at, datetime!(2026-03-07 09:30:15 UTC));
    }

    #[test]
    fn rejects_missing_entry_then_category() {
        let now = datetime!(2026-03-07 12:00 UTC);

        assert_eq!(
            validate(&form(" ", "", "nonsense"), offset!(UTC), now),
            Err(Error::MissingEntry)
        );
        assert_eq!(
            validate(&form("E-1", "", "nonsense"), offset!(UTC), now),
            Err(Error::MissingCategory)
        );
    }

    #[test]
    fn rejects_unparsable_time() {
        let now = datetime!(2026-03-07 12:00 UTC);

        assert_eq!(
            validate(&form("E-1", "C-1", "07/03/2026"), offset!(UTC), now),
            Err(Error::InvalidDate("07/03/2026".to_owned()))
        );
    }

    #[test]
    fn rejects_future_time() {
        let now = datetime!(2026-03-07 12:00 UTC);
        let form = form("E-1", "C-1", "2026-03-07T12:01");

        let result = validate(&form, offset!(UTC), now);

        assert_eq!(
            result,
            Err(Error::FutureScanTime(datetime!(2026-03-07 12:01 UTC)))
        );
    }

    #[test]
    fn default_category_prefers_last_selected() {
        let categories = vec![
            category("C-1", "General"),
            category("C-2", "Staff"),
            category("C-3", "Visitors"),
        ];

        assert_eq!(
            default_category(&categories, Some("C-3".to_owned())),
            Some("C-3")
        );
        assert_eq!(
            default_category(&categories, Some("deleted".to_owned())),
            Some("C-1")
        );
        assert_eq!(default_category(&categories[1..], None), Some("C-2"));
        assert_eq!(default_category(&[], None), None);
    }

    #[test]
    fn default_time_of_past_date_keeps_time_of_day() {
        let now = datetime!(2026-03-07 09:30 UTC);

        assert_eq!(
            default_scanned_at(Some(now.date() - Duration::days(2)), now),
            "2026-03-05T09:30"
        );
        assert_eq!(default_scanned_at(None, now), "2026-03-07T09:30");
    }

    fn category(code: &str, name: &str) -> crate::category::Category {
        crate::category::Category {
            code: code.to_owned(),
            name: name.to_owned(),
            scan_count: 0,
        }
    }
}

#[cfg(test)]
mod create_scan_tests {
    use axum::{
        Form, Json, Router,
        extract::{Query, State},
        http::StatusCode,
        routing::{get, post},
    };
    use serde_json::json;
    use time::{Duration, OffsetDateTime};

    use crate::{
        endpoints,
        preferences::{LastSelectedCategory, get_test_preference_store},
        scan::{CreateScanState, create_scan_endpoint, get_new_scan_modal},
        test_utils::{
            FakeUpstream, assert_content_type, assert_form_submit_button_with_text,
            assert_hx_redirect, must_get_form, parse_html_fragment,
        },
    };

    use super::{NewScanQuery, ScanFormData};

    fn upstream_router() -> Router {
        Router::new()
            .route(
                endpoints::API_CATEGORIES,
                get(|| async {
                    Json(json!({
                        "data": [
                            { "code": "C-1", "name": "General", "scanCount": 3 },
                            { "code": "C-2", "name": "Staff", "scanCount": 1 }
                        ],
                        "total": 2
                    }))
                }),
            )
            .route(
                endpoints::API_ENTRIES,
                get(|| async {
                    Json(json!({
                        "data": [{ "code": "E-1", "name": "Ada", "scanCount": 0 }],
                        "total": 1
                    }))
                }),
            )
            .route(
                endpoints::API_SCANS,
                post(|| async { Json(json!({ "message": "Scan created" })) }),
            )
    }

    fn state(upstream: &FakeUpstream) -> CreateScanState {
        CreateScanState {
            api: upstream.api_client(),
            local_timezone: "Etc/UTC".to_owned(),
            last_selected_category: LastSelectedCategory::new(get_test_preference_store()),
        }
    }

    #[tokio::test]
    async fn modal_defaults_to_last_selected_category() {
        let upstream = FakeUpstream::spawn(upstream_router()).await;
        let state = state(&upstream);
        state.last_selected_category.set("C-2");

        let response = get_new_scan_modal(
            State(state),
            Query(NewScanQuery {
                entry: Some("E-1".to_owned()),
                date: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_submit_button_with_text(&form, "Create Scan");
        let selected = scraper::Selector::parse("option[selected]").unwrap();
        let selected: Vec<_> = form
            .select(&selected)
            .filter_map(|option| option.value().attr("value"))
            .collect();
        assert_eq!(selected, vec!["E-1", "C-2"]);
    }

    #[tokio::test]
    async fn creates_scan_and_remembers_category() {
        let upstream = FakeUpstream::spawn(upstream_router()).await;
        let state = state(&upstream);
        let scanned_at = OffsetDateTime::now_utc() - Duration::hours(1);
        let scanned_at = scanned_at.replace_second(0).unwrap().replace_nanosecond(0).unwrap();

        let response = create_scan_endpoint(
            State(state.clone()),
            Form(ScanFormData {
                entry_code: "E-1".to_owned(),
                category_code: "C-2".to_owned(),
                scanned_at: super::format_scanned_at(scanned_at),
                return_date: "2026-03-07".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/dates/2026-03-07/scans");
        assert_eq!(state.last_selected_category.get(), Some("C-2".to_owned()));

        let requests = upstream.requests();
        assert_eq!(requests.len(), 1);
        let body = requests[0].json();
        assert_eq!(body["entryCode"], "E-1");
        assert_eq!(body["categoryCode"], "C-2");
        let sent = OffsetDateTime::parse(
            body["scannedAt"].as_str().unwrap(),
            &time::format_description::well_known::Rfc3339,
        )
        .unwrap();
        assert_eq!(sent, scanned_at);
    }

    #[tokio::test]
    async fn returns_to_entry_without_return_date() {
        let upstream = FakeUpstream::spawn(upstream_router()).await;

        let response = create_scan_endpoint(
            State(state(&upstream)),
            Form(ScanFormData {
                entry_code: "E-1".to_owned(),
                category_code: "C-1".to_owned(),
                scanned_at: "2020-01-01T08:00".to_owned(),
                return_date: String::new(),
            }),
        )
        .await;

        assert_hx_redirect(&response, "/entries/E-1/scans");
    }

    #[tokio::test]
    async fn future_scan_is_not_sent() {
        let upstream = FakeUpstream::spawn(upstream_router()).await;
        let state = state(&upstream);
        let tomorrow = OffsetDateTime::now_utc() + Duration::days(1);

        let response = create_scan_endpoint(
            State(state.clone()),
            Form(ScanFormData {
                entry_code: "E-1".to_owned(),
                category_code: "C-1".to_owned(),
                scanned_at: super::format_scanned_at(tomorrow),
                return_date: String::new(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(upstream.requests().is_empty());
        assert_eq!(state.last_selected_category.get(), None);
    }
}
