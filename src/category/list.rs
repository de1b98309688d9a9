//! The categories page.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    api::ApiClient,
    category::Category,
    endpoints,
    html::{BUTTON_SECONDARY_STYLE, MODAL_CONTAINER_ID, TABLE_CELL_STYLE},
    list::{ListResource, NoFilter, SortOption, SortOrder},
    list_view::{
        ListPage, ListViewState, NoFilterForm, ViewRegistry, list_page, open_list_view,
    },
};

const NAME_ASC: SortOption = SortOption {
    key: "alpha-asc",
    label: "Name (A-Z)",
    sort_by: "name",
    order: SortOrder::Ascending,
};

const NAME_DESC: SortOption = SortOption {
    key: "alpha-desc",
    label: "Name (Z-A)",
    sort_by: "name",
    order: SortOrder::Descending,
};

const MOST_SCANS: SortOption = SortOption {
    key: "most-scans",
    label: "Most scans",
    sort_by: "scanCount",
    order: SortOrder::Descending,
};

/// The category list. The General category is listed but can never be
/// selected, renamed or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Categories;

impl ListResource for Categories {
    type Row = Category;
    type Filter = NoFilter;

    const KEY: &'static str = "categories";
    const SINGULAR: &'static str = "category";
    const PLURAL: &'static str = "categories";
    const SORT_OPTIONS: &'static [SortOption] = &[NAME_ASC, NAME_DESC, MOST_SCANS];
    const DEFAULT_SORT: SortOption = NAME_ASC;

    fn list_path(&self) -> String {
        endpoints::API_CATEGORIES.to_owned()
    }

    fn bulk_path(&self) -> String {
        endpoints::API_CATEGORIES.to_owned()
    }

    fn row_id(row: &Category) -> String {
        row.code.clone()
    }

    fn is_selectable(row: &Category) -> bool {
        !row.is_general()
    }

    fn initial_filter(&self) -> NoFilter {
        NoFilter
    }
}

impl ListPage for Categories {
    const VIEWS_ROUTE: &'static str = endpoints::CATEGORY_LIST_VIEW;

    type FilterForm = NoFilterForm;

    fn views(state: &AppState) -> &ViewRegistry<Self> {
        &state.category_views
    }

    fn column_headers(&self) -> Vec<&'static str> {
        vec!["Name", "Scans"]
    }

    fn row_cells(&self, row: &Category) -> Markup {
        html! {
            th scope="row" class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (row.name)
            }
            td class=(TABLE_CELL_STYLE) { (row.scan_count) }
        }
    }

    fn row_actions(&self, row: &Category) -> Option<Markup> {
        if row.is_general() {
            return None;
        }

        let edit_url = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, &row.code);

        Some(html! {
            button
                type="button"
                hx-get=(edit_url)
                hx-target={ "#" (MODAL_CONTAINER_ID) }
                hx-swap="innerHTML"
                class=(BUTTON_SECONDARY_STYLE)
            {
                "Edit"
            }
        })
    }

    fn filter_from_form(
        &self,
        current: &NoFilter,
        _form: NoFilterForm,
    ) -> Result<NoFilter, Error> {
        Ok(*current)
    }

    fn create_action(&self) -> Option<(String, &'static str)> {
        Some((endpoints::NEW_CATEGORY_VIEW.to_owned(), "New category"))
    }
}

/// The most categories offered by a category picker.
const CATEGORY_OPTION_LIMIT: u64 = 1000;

/// Fetch the categories offered by pickers and filters, sorted by name.
///
/// # Errors
/// Returns an error if the API request fails.
pub async fn fetch_category_options(api: &ApiClient) -> Result<Vec<Category>, Error> {
    let params = [
        ("sortBy", NAME_ASC.sort_by.to_owned()),
        ("order", NAME_ASC.order.as_query_value().to_owned()),
        ("page", "1".to_owned()),
        ("limit", CATEGORY_OPTION_LIMIT.to_string()),
        ("search", String::new()),
    ];

    let page = api
        .fetch_page::<Category>(endpoints::API_CATEGORIES, &params)
        .await?;

    Ok(page.data)
}

/// Render the categories page with a freshly opened list view.
pub async fn get_categories_page(State(state): State<ListViewState<Categories>>) -> Response {
    match open_list_view(&state, Categories).await {
        Ok(fragment) => {
            list_page("Categories", endpoints::CATEGORIES_VIEW, None, &fragment).into_response()
        }
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod categories_resource_tests {
    use crate::{category::Category, list::ListResource, list_view::ListPage};

    use super::Categories;

    fn category(code: &str, name: &str) -> Category {
        Category {
            code: code.to_owned(),
            name: name.to_owned(),
            scan_count: 0,
        }
    }

    #[test]
    fn general_is_not_selectable() {
        assert!(!Categories::is_selectable(&category("C-1", "General")));
        assert!(!Categories::is_selectable(&category("C-1", "general")));
        assert!(Categories::is_selectable(&category("C-2", "Staff")));
    }

    #[test]
    fn general_has_no_actions() {
        assert!(Categories.row_actions(&category("C-1", "General")).is_none());
        assert!(Categories.row_actions(&category("C-2", "Staff")).is_some());
    }

    #[test]
    fn sort_options_can_be_found_by_key() {
        let option = Categories::find_sort_option("alpha-desc").expect("missing sort option");

        assert_eq!(option.sort_by, "name");
        assert!(Categories::find_sort_option("nope").is_none());
    }
}
