use std::fmt;

use derive_deref::Deref;

use super::filters::Filters;

const SEPARATOR: &str = "::";

/// Identity under which a list and its dedup set are partitioned
///
/// Keys take the shape `<owner>::<keyword>` (for example `cat-42::urgent`, or
/// `cat-43::` without a keyword) or a bare resource name for unfiltered global lists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref)]
pub struct ScopeKey(String);

impl ScopeKey {
    /// A bare, unfiltered scope such as `history`
    pub fn resource(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// A scope owned by a category and narrowed by an optional keyword
    pub fn category(category_id: &str, keyword: Option<&str>) -> Self {
        let keyword = keyword.map(str::trim).unwrap_or_default();
        Self(format!("{category_id}{SEPARATOR}{keyword}"))
    }

    /// The scope of a resource listing under `filters`
    ///
    /// Unfiltered listings share the bare resource scope; a keyword narrows it.
    pub fn for_filters(resource: &str, filters: &Filters) -> Self {
        match filters.keyword() {
            Some(keyword) => Self::category(resource, Some(keyword)),
            None => Self::resource(resource),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScopeKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
