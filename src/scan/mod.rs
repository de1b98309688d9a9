//! Scans record that an entry was seen, in a category, at a point in time.

mod create;
mod domain;
mod list;

pub use create::{CreateScanState, create_scan_endpoint, get_new_scan_modal};
pub use domain::{CategoryFilter, Scan, ScanParent};
pub use list::{Scans, get_date_scans_page, get_entry_scans_page};
