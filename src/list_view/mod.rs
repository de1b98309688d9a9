//! The browser side of list views: per-view state, interaction routes and HTML.

mod handlers;
mod registry;
mod render;
mod state;

pub use handlers::{list_view_routes, modal_response, open_list_view};
pub use registry::ViewRegistry;
pub use render::{ListPage, NoFilterForm, list_page, list_view_fragment};
pub use state::ListViewState;
