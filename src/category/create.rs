//! Category creation modal and endpoint.

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, endpoints,
    api::ApiClient,
    category::{CategoryName, domain::CategoryBody, domain::CategoryFormData},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, dismiss_modal_button,
        form_error, modal,
    },
    list::ModalKind,
    list_view::modal_response,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub api: ApiClient,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// Render the category creation modal.
pub async fn get_new_category_modal() -> Response {
    let body = new_category_form_view("", "");

    modal_response(
        ModalKind::Create,
        modal("New category", &dismiss_modal_button(), &body),
    )
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return new_category_form_view(&form.name, &format!("Error: {error}")).into_response();
        }
    };

    let body = CategoryBody {
        name: name.as_ref(),
    };

    match state.api.post_json(endpoints::API_CATEGORIES, &body).await {
        Ok(_) => {
            tracing::info!("Created category {name}");

            (
                HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create category {name}: {error}");

            new_category_form_view(&form.name, &format!("Error: {}", error.user_message()))
                .into_response()
        }
    }
}

fn new_category_form_view(name: &str, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::NEW_CATEGORY_VIEW)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(name)
                    placeholder="Category Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (form_error(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
        }
    }
}


#[cfg(test)]
mod create_category_endpoint_tests {
    use axum::{
        Form, Json, Router,
        extract::State,
        http::{Method, StatusCode},
        routing::post,
    };
    use serde_json::json;

    use crate::{
        category::{CreateCategoryState, create_category_endpoint, domain::CategoryFormData},
        endpoints,
        test_utils::{
            FakeUpstream, assert_form_error_message, assert_hx_redirect, assert_valid_html,
            must_get_form, parse_html_fragment,
        },
    };

    async fn new_state(upstream: Router) -> (CreateCategoryState, FakeUpstream) {
        let upstream = FakeUpstream::spawn(upstream).await;

        (
            CreateCategoryState {
                api: upstream.api_client(),
            },
            upstream,
        )
    }

    fn form(name: &str) -> Form<CategoryFormData> {
        Form(CategoryFormData {
            name: name.to_owned(),
        })
    }

    #[tokio::test]
    async fn can_create_category() {
        let (state, upstream) = new_state(Router::new().route(
            endpoints::API_CATEGORIES,
            post(|| async { Json(json!({ "message": "Category created" })) }),
        ))
        .await;

        let response = create_category_endpoint(State(state), form(" Staff ")).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);

        let requests = upstream.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].path, endpoints::API_CATEGORIES);
        assert_eq!(requests[0].json(), json!({ "name": "Staff" }));
    }

    #[tokio::test]
    async fn rejects_empty_name_without_request() {
        let (state, upstream) = new_state(Router::new()).await;

        let response = create_category_endpoint(State(state), form("  ")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_form_error_message(
            &must_get_form(&html),
            "Error: Category name cannot be empty",
        );
        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn rejects_general_without_request() {
        let (state, upstream) = new_state(Router::new()).await;

        let response = create_category_endpoint(State(state), form("general")).await;

        let html = parse_html_fragment(response).await;
        assert_form_error_message(
            &must_get_form(&html),
            "Error: \"general\" is a reserved category name",
        );
        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn shows_upstream_error_in_form() {
        let (state, _upstream) = new_state(Router::new().route(
            endpoints::API_CATEGORIES,
            post(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "error": "Category already exists" })),
                )
            }),
        ))
        .await;

        let response = create_category_endpoint(State(state), form("Staff")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_form_error_message(&must_get_form(&html), "Error: Category already exists");
    }
}
