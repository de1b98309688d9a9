//! Entry creation modal and endpoint.

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Serialize;

use crate::{
    AppState, endpoints,
    api::ApiClient,
    entry::{EntryName, domain::EntryFormData},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, dismiss_modal_button,
        form_error, modal,
    },
    list::ModalKind,
    list_view::modal_response,
};

#[derive(Debug, Serialize)]
struct EntryBody<'a> {
    name: &'a str,
}

/// The state needed for creating an entry.
#[derive(Debug, Clone)]
pub struct CreateEntryState {
    pub api: ApiClient,
}

impl FromRef<AppState> for CreateEntryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// Render the entry creation modal.
pub async fn get_new_entry_modal() -> Response {
    let body = new_entry_form_view("", "");

    modal_response(
        ModalKind::Create,
        modal("New entry", &dismiss_modal_button(), &body),
    )
}

/// Handle entry creation form submission.
pub async fn create_entry_endpoint(
    State(state): State<CreateEntryState>,
    Form(form): Form<EntryFormData>,
) -> Response {
    let name = match EntryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return new_entry_form_view(&form.name, &format!("Error: {error}")).into_response();
        }
    };

    let body = EntryBody {
        name: name.as_ref(),
    };

    match state.api.post_json(endpoints::API_ENTRIES, &body).await {
        Ok(_) => {
            tracing::info!("Created entry {name}");

            (
                HxRedirect(endpoints::ENTRIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create entry {name}: {error}");

            new_entry_form_view(&form.name, &format!("Error: {}", error.user_message()))
                .into_response()
        }
    }
}

fn new_entry_form_view(name: &str, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::NEW_ENTRY_VIEW)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Entry Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(name)
                    placeholder="Entry Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (form_error(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Entry" }
        }
    }
}

#[cfg(test)]
mod create_entry_tests {
    use axum::{Form, Json, Router, extract::State, http::StatusCode, routing::post};
    use serde_json::json;

    use crate::{
        endpoints,
        entry::{CreateEntryState, create_entry_endpoint, domain::EntryFormData},
        test_utils::{
            FakeUpstream, assert_form_error_message, assert_hx_redirect, must_get_form,
            parse_html_fragment,
        },
    };

    #[tokio::test]
    async fn creates_entry() {
        let upstream = FakeUpstream::spawn(Router::new().route(
            endpoints::API_ENTRIES,
            post(|| async { Json(json!({ "message": "Entry created" })) }),
        ))
        .await;
        let state = CreateEntryState {
            api: upstream.api_client(),
        };

        let response = create_entry_endpoint(
            State(state),
            Form(EntryFormData {
                name: "Ada".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ENTRIES_VIEW);
        assert_eq!(upstream.requests()[0].json(), json!({ "name": "Ada" }));
    }

    #[tokio::test]
    async fn rejects_empty_name() {
        let upstream = FakeUpstream::spawn(Router::new()).await;
        let state = CreateEntryState {
            api: upstream.api_client(),
        };

        let response = create_entry_endpoint(
            State(state),
            Form(EntryFormData {
                name: String::new(),
            }),
        )
        .await;

        let html = parse_html_fragment(response).await;
        assert_form_error_message(&must_get_form(&html), "Error: Entry name cannot be empty");
        assert!(upstream.requests().is_empty());
    }
}
