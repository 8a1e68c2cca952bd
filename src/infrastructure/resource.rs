//! Backend list resources and their endpoints

use clap::ValueEnum;
use strum::{Display, EnumIter};

use crate::domain::{filters::FetchMode, scope::ScopeKey};

/// The kinds of list the console pages through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    DictionaryCategories,
    FaqCategories,
    DocumentCategories,
    CategoryFiles,
    History,
}

/// A concrete list resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    DictionaryCategories,
    FaqCategories,
    DocumentCategories,
    CategoryFiles { category_id: String },
    History,
}

/// Where a resource's pages come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    /// Name of the array inside the envelope's `result`
    pub list_field: &'static str,
}

impl Resource {
    /// Build a resource from its kind
    ///
    /// Returns `None` for `CategoryFiles` without a category.
    pub fn from_kind(kind: ResourceKind, category_id: Option<&str>) -> Option<Self> {
        let resource = match kind {
            ResourceKind::DictionaryCategories => Resource::DictionaryCategories,
            ResourceKind::FaqCategories => Resource::FaqCategories,
            ResourceKind::DocumentCategories => Resource::DocumentCategories,
            ResourceKind::CategoryFiles => Resource::CategoryFiles {
                category_id: category_id
                    .map(str::trim)
                    .filter(|id| !id.is_empty())?
                    .to_string(),
            },
            ResourceKind::History => Resource::History,
        };
        Some(resource)
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::DictionaryCategories => ResourceKind::DictionaryCategories,
            Resource::FaqCategories => ResourceKind::FaqCategories,
            Resource::DocumentCategories => ResourceKind::DocumentCategories,
            Resource::CategoryFiles { .. } => ResourceKind::CategoryFiles,
            Resource::History => ResourceKind::History,
        }
    }

    /// Name used for logging and as the default scope
    pub fn name(&self) -> String {
        self.kind().to_string()
    }

    fn base_path(&self) -> String {
        match self {
            Resource::DictionaryCategories => String::from("/api/dictionary/categories"),
            Resource::FaqCategories => String::from("/api/faq/categories"),
            Resource::DocumentCategories => String::from("/api/documents/categories"),
            Resource::CategoryFiles { category_id } => {
                format!("/api/documents/categories/{category_id}/files")
            }
            Resource::History => String::from("/api/history"),
        }
    }

    pub fn list_field(&self) -> &'static str {
        match self {
            Resource::DictionaryCategories
            | Resource::FaqCategories
            | Resource::DocumentCategories => "categoryList",
            Resource::CategoryFiles { .. } => "fileList",
            Resource::History => "historyList",
        }
    }

    pub fn endpoint(&self, mode: FetchMode) -> Endpoint {
        let base = self.base_path();
        let path = match mode {
            FetchMode::List => base,
            FetchMode::Search => format!("{base}/search"),
        };
        Endpoint {
            path,
            list_field: self.list_field(),
        }
    }

    /// Scope for results of this resource filtered by `keyword`
    ///
    /// Category files are owned by their category.
    pub fn scope(&self, keyword: Option<&str>) -> ScopeKey {
        match (self, keyword) {
            (Resource::CategoryFiles { category_id }, keyword) => {
                ScopeKey::category(category_id, keyword)
            }
            (_, Some(keyword)) => ScopeKey::category(&self.name(), Some(keyword)),
            (_, None) => ScopeKey::resource(self.name()),
        }
    }
}
