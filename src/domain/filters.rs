//! List filters and request modes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Query parameter date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How a page is requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Plain paged listing, cursor only
    List,
    /// Filtered listing with keyword and/or date range plus cursor
    Search,
}

/// Filters a list view can apply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub keyword: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub department_id: Option<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }

    /// The keyword, trimmed, if it is not blank
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
    }

    fn department_id(&self) -> Option<&str> {
        self.department_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Whether any filter is currently applied
    pub fn is_active(&self) -> bool {
        self.keyword().is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.department_id().is_some()
    }

    pub fn mode(&self) -> FetchMode {
        if self.is_active() {
            FetchMode::Search
        } else {
            FetchMode::List
        }
    }

    /// A range whose start lies after its end is invalid
    pub fn has_valid_date_range(&self) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }

    /// Query parameters forwarded to the backend in search mode
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(keyword) = self.keyword() {
            pairs.push(("keyword", keyword.to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.format(DATE_FORMAT).to_string()));
        }
        if let Some(department_id) = self.department_id() {
            pairs.push(("departmentId", department_id.to_string()));
        }
        pairs
    }
}
