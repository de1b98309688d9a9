//! Entries are the things that get scanned.

mod create;
mod domain;
mod list;

pub use create::{CreateEntryState, create_entry_endpoint, get_new_entry_modal};
pub use domain::{Entry, EntryName};
pub use list::{Entries, fetch_entry_options, get_entries_page};

pub(crate) use list::format_timestamp;
