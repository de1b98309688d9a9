//! Category renaming modal and endpoint.

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, Error, endpoints,
    api::ApiClient,
    category::{
        Category, CategoryName,
        domain::{CategoryBody, CategoryFormData},
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, dismiss_modal_button,
        form_error, modal,
    },
    list::ModalKind,
    list_view::modal_response,
};

/// The state needed for renaming a category.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub api: ApiClient,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// Fetch a category, refusing the General category.
async fn get_editable_category(api: &ApiClient, code: &str) -> Result<Category, Error> {
    let category: Category = api
        .get_data(&endpoints::format_endpoint(endpoints::API_CATEGORY, code))
        .await
        .inspect_err(|error| tracing::error!("Could not fetch category {code}: {error}"))?;

    if category.is_general() {
        tracing::warn!("Refusing to edit the General category {code}");
        return Err(Error::GeneralCategoryProtected);
    }

    Ok(category)
}

/// Render the category renaming modal.
pub async fn get_edit_category_modal(
    Path(code): Path<String>,
    State(state): State<EditCategoryState>,
) -> Response {
    match get_editable_category(&state.api, &code).await {
        Ok(category) => {
            let body = edit_category_form_view(&category.code, &category.name, "");

            modal_response(
                ModalKind::Edit,
                modal("Rename category", &dismiss_modal_button(), &body),
            )
        }
        Err(error) => error.into_alert_response(),
    }
}

/// Handle category renaming form submission.
pub async fn update_category_endpoint(
    Path(code): Path<String>,
    State(state): State<EditCategoryState>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return edit_category_form_view(&code, &form.name, &format!("Error: {error}"))
                .into_response();
        }
    };

    if let Err(error) = get_editable_category(&state.api, &code).await {
        return error.into_alert_response();
    }

    let body = CategoryBody {
        name: name.as_ref(),
    };
    let path = endpoints::format_endpoint(endpoints::API_CATEGORY, &code);

    match state.api.put_json(&path, &body).await {
        Ok(_) => {
            tracing::info!("Renamed category {code} to {name}");

            (
                HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not rename category {code}: {error}");

            edit_category_form_view(
                &code,
                &form.name,
                &format!("Error: {}", error.user_message()),
            )
            .into_response()
        }
    }
}

fn edit_category_form_view(code: &str, name: &str, error_message: &str) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, code);

    html! {
        form
            hx-put=(update_endpoint)
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
        }
    }
}
