//! Categories group scans, e.g. "Staff" or "Visitors".

mod create;
mod domain;
mod edit;
mod list;

pub use create::{CreateCategoryState, create_category_endpoint, get_new_category_modal};
pub use domain::{Category, CategoryName};
pub use edit::{EditCategoryState, get_edit_category_modal, update_category_endpoint};
pub use list::{Categories, fetch_category_options, get_categories_page};
