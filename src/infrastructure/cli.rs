use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{
    domain::{filters::Filters, scope::ScopeKey},
    infrastructure::resource::{Resource, ResourceKind},
    presentation::printer::OutputFormat,
    utils::version,
};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Backend base URL, overriding the configured one
    #[arg(long, env = "SCROLLFEED_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Page through a list and print every item once
    List(ListArgs),
    /// Print the dedup scope a list would use
    Scope(ScopeArgs),
}

/// Which list to read, and how to narrow it
#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// List to page through
    #[arg(value_enum)]
    pub resource: ResourceKind,

    /// Category whose files are listed (category-files only)
    #[arg(long, value_name = "ID")]
    pub category_id: Option<String>,

    /// Search keyword; switches to the search endpoint
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Earliest date, YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// Latest date, YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    #[arg(long, value_name = "ID")]
    pub department_id: Option<String>,
}

impl SelectArgs {
    pub fn resource(&self) -> Option<Resource> {
        Resource::from_kind(self.resource, self.category_id.as_deref())
    }

    pub fn filters(&self) -> Filters {
        let mut filters = Filters::new().with_date_range(self.start_date, self.end_date);
        if let Some(keyword) = &self.keyword {
            filters = filters.with_keyword(keyword.as_str());
        }
        if let Some(department_id) = &self.department_id {
            filters = filters.with_department(department_id.as_str());
        }
        filters
    }

    /// The scope a list for these arguments keeps its dedup set under
    pub fn scope(&self) -> Option<ScopeKey> {
        let filters = self.filters();
        self.resource()
            .map(|resource| resource.scope(filters.keyword()))
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Stop after this many pages
    #[arg(long, value_name = "N")]
    pub max_pages: Option<usize>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    #[command(flatten)]
    pub select: SelectArgs,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from([
            "scrollfeed",
            "list",
            "category-files",
            "--category-id",
            "42",
            "--keyword",
            "manual",
            "--start-date",
            "2025-01-01",
            "--max-pages",
            "3",
            "--format",
            "json",
        ])
        .expect("parse");

        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.max_pages, Some(3));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(
            args.select.resource(),
            Some(Resource::CategoryFiles {
                category_id: String::from("42")
            })
        );
        assert_eq!(args.select.filters().keyword(), Some("manual"));
        assert_eq!(
            args.select.filters().start_date,
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(args.select.scope().map(|s| s.to_string()), Some(String::from("42::manual")));
    }

    #[test]
    fn test_category_files_requires_category() {
        let cli = Cli::try_parse_from(["scrollfeed", "scope", "category-files"]).expect("parse");
        let Command::Scope(args) = cli.command else {
            panic!("expected scope");
        };
        assert_eq!(args.select.resource(), None);
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["scrollfeed", "list", "history", "--start-date", "01/02/2025"])
            .is_err());
    }
}
