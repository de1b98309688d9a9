//! The generic paginated, filterable, multi-select list.
//!
//! [ListController] is shared by every list in the app. Each kind of row
//! plugs in through a [ListResource] adapter that names its API paths, sort
//! options and filter.

mod bulk;
mod controller;
mod fetch;
mod modal;
mod query;
mod resource;
mod result;
mod selection;

pub use bulk::{
    BulkAction, BulkScope, BulkStage, BulkStep, DeleteRequest, ExportFormat, ExportRequest,
    ScopeChoice,
};
pub use controller::ListController;
pub use fetch::{FetchGeneration, FetchOutcome, FetchPlan, FetchTicket};
pub use modal::{BoundsSnapshot, ModalKind};
pub use query::{ListFilter, NoFilter, PageReset, QueryState, SortOption, SortOrder};
pub use resource::ListResource;
pub use result::ResultSet;
pub use selection::{SelectAllState, SelectionSet};
