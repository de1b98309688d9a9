//! Bulk delete and export over the selected rows.

use std::str::FromStr;

use serde::Serialize;

use crate::{Error, list::SortOrder};

/// The file type of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    /// The last path segment of the export endpoint.
    pub fn endpoint_suffix(self) -> &'static str {
        match self {
            ExportFormat::Csv => "export-csv",
            ExportFormat::Pdf => "export-pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Pdf => "PDF",
        }
    }
}

/// An action that applies to many rows at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    Export(ExportFormat),
}

impl BulkAction {
    /// The form value of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            BulkAction::Delete => "delete",
            BulkAction::Export(format) => format.endpoint_suffix(),
        }
    }

    pub fn label(self) -> String {
        match self {
            BulkAction::Delete => "Delete".to_owned(),
            BulkAction::Export(format) => format!("Export {}", format.label()),
        }
    }
}

impl FromStr for BulkAction {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "delete" => Ok(BulkAction::Delete),
            "export-csv" => Ok(BulkAction::Export(ExportFormat::Csv)),
            "export-pdf" => Ok(BulkAction::Export(ExportFormat::Pdf)),
            other => Err(Error::UnknownBulkAction(other.to_owned())),
        }
    }
}

/// Which of the selected rows a bulk action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkScope {
    /// The selected rows on the visible page.
    CurrentPage,
    /// Every selected row, including rows on other pages.
    AllSelected,
    /// The selected rows that the active filter admits.
    MatchingFilters,
}

impl BulkScope {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkScope::CurrentPage => "current-page",
            BulkScope::AllSelected => "all-selected",
            BulkScope::MatchingFilters => "matching-filters",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BulkScope::CurrentPage => "Selected on this page",
            BulkScope::AllSelected => "All selected",
            BulkScope::MatchingFilters => "Selected and matching the filters",
        }
    }
}

impl FromStr for BulkScope {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "current-page" => Ok(BulkScope::CurrentPage),
            "all-selected" => Ok(BulkScope::AllSelected),
            "matching-filters" => Ok(BulkScope::MatchingFilters),
            other => Err(Error::InvalidBulkScope(other.to_owned())),
        }
    }
}

/// A scope offered to the user together with the number of rows it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeChoice {
    pub scope: BulkScope,
    pub count: usize,
}

/// Where a list view is in the bulk action flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BulkStage {
    #[default]
    Idle,
    /// The scope modal is open.
    ChoosingScope {
        action: BulkAction,
        choices: Vec<ScopeChoice>,
        error: Option<String>,
    },
    /// The delete confirmation modal is open for the resolved `codes`.
    ConfirmingDelete {
        scope: BulkScope,
        codes: Vec<String>,
        error: Option<String>,
    },
}

/// A delete request to the API.
///
/// A single row goes to the singular endpoint, anything more to the batch endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteRequest {
    Single(String),
    Batch(Vec<String>),
}

impl DeleteRequest {
    /// # Errors
    /// Returns [Error::NothingSelected] if `codes` is empty.
    pub fn from_codes(mut codes: Vec<String>) -> Result<Self, Error> {
        match codes.len() {
            0 => Err(Error::NothingSelected),
            1 => Ok(DeleteRequest::Single(codes.remove(0))),
            _ => Ok(DeleteRequest::Batch(codes)),
        }
    }

    pub fn codes(&self) -> &[String] {
        match self {
            DeleteRequest::Single(code) => std::slice::from_ref(code),
            DeleteRequest::Batch(codes) => codes,
        }
    }
}

/// The body of an export request.
///
/// The sort of the list view is passed along so the file keeps the order the
/// user chose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub codes: Vec<String>,
    pub sort_by: &'static str,
    pub order: SortOrder,
    #[serde(skip)]
    pub format: ExportFormat,
}

/// What follows a scope choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkStep {
    /// The delete confirmation modal was opened.
    ConfirmDelete,
    /// The export is ready to be sent.
    Export(ExportRequest),
}
