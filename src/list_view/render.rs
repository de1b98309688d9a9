//! HTML for list views.
//!
//! The whole list (toolbar, table, pagination and its modals) is one fragment
//! that every interaction route re-renders and swaps in place.

use maud::{Markup, html};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    AppState, Error,
    endpoints::{self, list_view_action},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CHECKBOX_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, MODAL_CONTAINER_ID, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, form_error, modal,
    },
    list::{
        BulkAction, BulkStage, ExportFormat, ListController, ListResource, SelectAllState,
    },
    list_view::ViewRegistry,
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators, page_count},
};

/// The browser-facing half of a [ListResource]: routes, columns and forms.
pub trait ListPage: ListResource {
    /// The route under which the interaction routes of a view live, with a
    /// `{view_id}` parameter.
    const VIEWS_ROUTE: &'static str;

    /// The form submitted by the filter panel.
    type FilterForm: DeserializeOwned + Send + 'static;

    /// The open views of this resource.
    fn views(state: &AppState) -> &ViewRegistry<Self>;

    fn column_headers(&self) -> Vec<&'static str>;

    /// The `td` cells of a row, after the selection checkbox.
    fn row_cells(&self, row: &Self::Row) -> Markup;

    /// The content of the actions cell of a row.
    fn row_actions(&self, _row: &Self::Row) -> Option<Markup> {
        None
    }

    /// Build the filter described by a submitted filter panel.
    ///
    /// # Errors
    /// Returns an error if the form holds an invalid value, e.g. an unparsable date.
    fn filter_from_form(
        &self,
        current: &Self::Filter,
        form: Self::FilterForm,
    ) -> Result<Self::Filter, Error>;

    /// The fields of the filter panel, or `None` if the list has no filter panel.
    fn filter_fields(&self, _filter: &Self::Filter) -> Option<Markup> {
        None
    }

    /// The route of the create form and the label of its button.
    fn create_action(&self) -> Option<(String, &'static str)> {
        None
    }

    /// The start of export filenames when the API does not name the file.
    fn export_stem(&self) -> String {
        Self::KEY.to_owned()
    }
}

/// The filter form of lists without a filter panel.
#[derive(Debug, Default, Deserialize)]
pub struct NoFilterForm {}

/// The DOM id of the list view with `view_id`.
pub fn list_view_dom_id(view_id: u64) -> String {
    format!("list-view-{view_id}")
}

/// Render a complete page around a list view fragment.
pub fn list_page(
    title: &str,
    active_nav: &str,
    subtitle: Option<&Markup>,
    fragment: &Markup,
) -> Markup {
    let nav_bar = NavBar::new(active_nav).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full lg:max-w-5xl space-y-4"
            {
                header class="flex flex-col gap-1"
                {
                    h1 class="text-xl font-bold" { (title) }

                    @if let Some(subtitle) = subtitle {
                        (subtitle)
                    }
                }

                (fragment)
            }
        }
    };

    base(title, &content)
}

/// Render the list view fragment.
///
/// The status message of the controller is consumed, so it is shown once.
pub fn list_view_fragment<R: ListPage>(
    view_id: u64,
    controller: &mut ListController<R>,
    pagination_config: &PaginationConfig,
) -> Markup {
    let status = controller.take_status();
    let controller = &*controller;
    let resource = controller.resource();
    let action = |name: &str| list_view_action(R::VIEWS_ROUTE, view_id, name);
    let filter_fields = resource.filter_fields(controller.query().filter());
    let has_actions_column = controller
        .result()
        .rows
        .iter()
        .any(|row| resource.row_actions(row).is_some());
    let column_count = resource.column_headers().len() + 1 + usize::from(has_actions_column);

    html! {
        div
            id=(list_view_dom_id(view_id))
            class="w-full space-y-4"
            data-list-view="true"
            data-discard-url=(endpoints::format_endpoint(R::VIEWS_ROUTE, view_id))
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
        {
            @if let Some(status) = status {
                (status.into_markup())
            }

            (toolbar(view_id, controller, filter_fields.is_some(), pagination_config))

            (selection_bar(view_id, controller))

            div class="overflow-x-auto dark:bg-gray-800"
            {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE)
                            {
                                (select_all_button(&action("select-all"), controller.select_all_state()))
                            }

                            @for header in resource.column_headers() {
                                th scope="col" class=(TABLE_CELL_STYLE) { (header) }
                            }

                            @if has_actions_column {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }
                    }

                    tbody
                    {
                        @for row in &controller.result().rows {
                            (table_row(view_id, controller, row, has_actions_column))
                        }

                        @if controller.result().rows.is_empty() {
                            tr
                            {
                                td
                                    colspan=(column_count)
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No " (R::PLURAL) " found."
                                }
                            }
                        }
                    }
                }
            }

            (pagination_footer(view_id, controller, pagination_config))

            (bulk_modal(view_id, controller))

            @if let Some(fields) = filter_fields.filter(|_| controller.is_filter_panel_open()) {
                (filter_modal::<R>(view_id, &fields))
            }
        }
    }
}

fn toolbar<R: ListPage>(
    view_id: u64,
    controller: &ListController<R>,
    has_filter_panel: bool,
    pagination_config: &PaginationConfig,
) -> Markup {
    let action = |name: &str| list_view_action(R::VIEWS_ROUTE, view_id, name);
    let query = controller.query();
    let search_id = format!("list-search-{view_id}");

    html! {
        div class="flex flex-wrap items-end gap-4"
        {
            div class="grow"
            {
                label for=(search_id) class=(FORM_LABEL_STYLE) { "Search" }
                input
                    id=(search_id)
                    type="search"
                    name="search"
                    value=(query.search())
                    placeholder={ "Search " (R::PLURAL) }
                    hx-post=(action("search"))
                    hx-trigger="input changed delay:300ms, search"
                    hx-preserve="true"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for={ "list-sort-" (view_id) } class=(FORM_LABEL_STYLE) { "Sort" }
                select
                    id={ "list-sort-" (view_id) }
                    name="sort"
                    hx-post=(action("sort"))
                    hx-trigger="change"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for option in R::SORT_OPTIONS {
                        option
                            value=(option.key)
                            selected[option.key == query.sort().key]
                        {
                            (option.label)
                        }
                    }
                }
            }

            div
            {
                label for={ "list-page-size-" (view_id) } class=(FORM_LABEL_STYLE) { "Per page" }
                select
                    id={ "list-page-size-" (view_id) }
                    name="page_size"
                    hx-post=(action("page-size"))
                    hx-trigger="change"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for &size in &pagination_config.page_size_options {
                        option value=(size) selected[size == query.page_size()] { (size) }
                    }

                    @if !pagination_config.page_size_options.contains(&query.page_size()) {
                        option value=(query.page_size()) selected { (query.page_size()) }
                    }
                }
            }

            @if has_filter_panel {
                button
                    type="button"
                    hx-post=(action("filter/open"))
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Filters"
                }
            }

            @if let Some((create_url, label)) = controller.resource().create_action() {
                button
                    type="button"
                    hx-get=(create_url)
                    hx-target={ "#" (MODAL_CONTAINER_ID) }
                    hx-swap="innerHTML"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    (label)
                }
            }
        }
    }
}

fn selection_bar<R: ListPage>(view_id: u64, controller: &ListController<R>) -> Markup {
    let action = |name: &str| list_view_action(R::VIEWS_ROUTE, view_id, name);
    let selected_count = controller.selection().len();
    let bulk_actions = [
        BulkAction::Delete,
        BulkAction::Export(ExportFormat::Csv),
        BulkAction::Export(ExportFormat::Pdf),
    ];

    html! {
        div class="flex flex-wrap items-center gap-2" data-selection-bar="true"
        {
            span class="text-sm text-gray-700 dark:text-gray-300" data-selected-count=(selected_count)
            {
                (selected_count) " selected"
            }

            @if selected_count > 0 {
                button
                    type="button"
                    hx-post=(action("clear"))
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Clear selection"
                }
            }

            @for bulk_action in bulk_actions {
                button
                    type="button"
                    hx-post=(action("bulk"))
                    hx-vals=(serde_json::json!({ "action": bulk_action.as_str() }).to_string())
                    class=(if bulk_action == BulkAction::Delete { BUTTON_DELETE_STYLE } else { BUTTON_SECONDARY_STYLE })
                {
                    (bulk_action.label())
                }
            }
        }
    }
}

fn select_all_button(route: &str, state: SelectAllState) -> Markup {
    let mark = match state {
        SelectAllState::None => "",
        SelectAllState::Some => "–",
        SelectAllState::All => "✓",
    };

    html! {
        button
            type="button"
            role="checkbox"
            aria-checked=(state.aria_checked())
            aria-label="Select all on this page"
            hx-post=(route)
            class="inline-flex items-center justify-center w-4 h-4 text-xs rounded border
                border-gray-300 dark:border-gray-600"
        {
            (mark)
        }
    }
}

fn table_row<R: ListPage>(
    view_id: u64,
    controller: &ListController<R>,
    row: &R::Row,
    has_actions_column: bool,
) -> Markup {
    let resource = controller.resource();
    let id = R::row_id(row);
    let selectable = R::is_selectable(row);
    let selected = controller.selection().contains(&id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-row-id=(id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                @if selectable {
                    input
                        type="checkbox"
                        checked[selected]
                        aria-label={ "Select " (R::SINGULAR) " " (id) }
                        hx-post=(list_view_action(R::VIEWS_ROUTE, view_id, "toggle"))
                        hx-vals=(serde_json::json!({ "id": id }).to_string())
                        class=(FORM_CHECKBOX_STYLE);
                } @else {
                    input
                        type="checkbox"
                        disabled
                        aria-label={ "This " (R::SINGULAR) " cannot be selected" }
                        class=(FORM_CHECKBOX_STYLE);
                }
            }

            (resource.row_cells(row))

            @if has_actions_column {
                td class=(TABLE_CELL_STYLE)
                {
                    @if let Some(actions) = resource.row_actions(row) {
                        (actions)
                    }
                }
            }
        }
    }
}

fn pagination_footer<R: ListPage>(
    view_id: u64,
    controller: &ListController<R>,
    pagination_config: &PaginationConfig,
) -> Markup {
    let route = list_view_action(R::VIEWS_ROUTE, view_id, "page");
    let query = controller.query();
    let total = controller.result().total;
    let indicators = create_pagination_indicators(
        query.page(),
        page_count(total, query.page_size()),
        pagination_config.max_pages,
    );
    let page_button = |page: u64, label: &str| {
        html! {
            button
                type="button"
                hx-post=(route)
                hx-vals=(serde_json::json!({ "page": page }).to_string())
                class="block px-3 py-2 rounded-sm text-blue-600 hover:underline"
            {
                (label)
            }
        }
    };

    html! {
        div class="flex flex-wrap items-center justify-between gap-4"
        {
            p class="text-sm text-gray-700 dark:text-gray-300" data-total=(total)
            {
                (total) " " (R::PLURAL)
            }

            nav class="pagination flex justify-center" aria-label="Pagination"
            {
                ul class="pagination flex items-center gap-1"
                {
                    @for indicator in indicators {
                        li
                        {
                            @match indicator {
                                PaginationIndicator::BackButton(page) => { (page_button(page, "Back")) },
                                PaginationIndicator::NextButton(page) => { (page_button(page, "Next")) },
                                PaginationIndicator::Page(page) => { (page_button(page, &page.to_string())) },
                                PaginationIndicator::CurrPage(page) => {
                                    span
                                        aria-current="page"
                                        class="block px-3 py-2 rounded-sm font-bold text-black dark:text-white"
                                    {
                                        (page)
                                    }
                                },
                                PaginationIndicator::Ellipsis => {
                                    span class="px-3 py-2" { "..." }
                                },
                            }
                        }
                    }
                }
            }
        }
    }
}

fn bulk_modal<R: ListPage>(view_id: u64, controller: &ListController<R>) -> Markup {
    let action = |name: &str| list_view_action(R::VIEWS_ROUTE, view_id, name);
    let cancel_button = html! {
        button
            type="button"
            aria-label="Close"
            hx-post=(action("bulk/cancel"))
            class="text-lg leading-none"
        {
            "×"
        }
    };

    match controller.bulk_stage() {
        BulkStage::Idle => html!(),
        BulkStage::ChoosingScope {
            action: bulk_action,
            choices,
            error,
        } => {
            let title = format!("{} {}", bulk_action.label(), R::PLURAL);
            let body = html! {
                p { "Which " (R::PLURAL) " should this apply to?" }

                div class="flex flex-col gap-2" data-scope-choices="true"
                {
                    @for choice in choices {
                        button
                            type="button"
                            hx-post=(action("bulk/scope"))
                            hx-vals=(serde_json::json!({ "scope": choice.scope.as_str() }).to_string())
                            disabled[choice.count == 0]
                            data-scope=(choice.scope.as_str())
                            class=(BUTTON_SECONDARY_STYLE)
                        {
                            (choice.scope.label()) " (" (choice.count) ")"
                        }
                    }
                }

                (form_error(error.as_deref().unwrap_or_default()))
            };

            modal(&title, &cancel_button, &body)
        }
        BulkStage::ConfirmingDelete { codes, error, .. } => {
            let noun = if codes.len() == 1 {
                R::SINGULAR
            } else {
                R::PLURAL
            };
            let title = format!("Delete {} {noun}?", codes.len());
            let body = html! {
                p { "This cannot be undone." }

                (form_error(error.as_deref().unwrap_or_default()))

                div class="flex justify-end gap-2"
                {
                    button
                        type="button"
                        hx-post=(action("bulk/cancel"))
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Cancel"
                    }

                    button
                        type="button"
                        hx-post=(action("bulk/confirm"))
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            };

            modal(&title, &cancel_button, &body)
        }
    }
}

fn filter_modal<R: ListPage>(view_id: u64, fields: &Markup) -> Markup {
    let action = |name: &str| list_view_action(R::VIEWS_ROUTE, view_id, name);
    let close_button = html! {
        button
            type="button"
            aria-label="Close"
            hx-post=(action("filter/close"))
            class="text-lg leading-none"
        {
            "×"
        }
    };
    let body = html! {
        form hx-post=(action("filter")) class="space-y-4"
        {
            (fields)

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply filters" }
        }
    };

    modal("Filters", &close_button, &body)
}
