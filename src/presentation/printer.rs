//! Console output for loaded list items

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::item::{
    CategoryFile, DictionaryCategory, DocumentCategory, FaqCategory, HistoryEntry,
};

/// A record that can be shown as a table row
pub trait Row {
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_else(|| String::from("-"))
}

/// The timestamp shown for a record: the newest-looking field it carries
fn shown_time(
    timestamp: &Option<String>,
    last_modified_date: &Option<String>,
    updated_at: &Option<String>,
    created_at: &Option<String>,
) -> String {
    opt(&timestamp
        .clone()
        .or_else(|| last_modified_date.clone())
        .or_else(|| updated_at.clone())
        .or_else(|| created_at.clone()))
}

impl Row for DictionaryCategory {
    const COLUMNS: &'static [&'static str] = &["ID", "NAME", "TERMS", "UPDATED"];

    fn cells(&self) -> Vec<String> {
        vec![
            opt(&self.category_id),
            self.name.clone(),
            opt(&self.term_count),
            shown_time(&self.timestamp, &self.last_modified_date, &self.updated_at, &self.created_at),
        ]
    }
}

impl Row for FaqCategory {
    const COLUMNS: &'static [&'static str] = &["ID", "NAME", "FAQS", "UPDATED"];

    fn cells(&self) -> Vec<String> {
        vec![
            opt(&self.category_id),
            self.name.clone(),
            opt(&self.faq_count),
            shown_time(&self.timestamp, &self.last_modified_date, &self.updated_at, &self.created_at),
        ]
    }
}

impl Row for DocumentCategory {
    const COLUMNS: &'static [&'static str] = &["ID", "NAME", "DOCUMENTS", "UPDATED"];

    fn cells(&self) -> Vec<String> {
        vec![
            opt(&self.category_id),
            self.name.clone(),
            opt(&self.document_count),
            shown_time(&self.timestamp, &self.last_modified_date, &self.updated_at, &self.created_at),
        ]
    }
}

impl Row for CategoryFile {
    const COLUMNS: &'static [&'static str] = &["ID", "FILE", "SIZE", "UPLOADER", "UPDATED"];

    fn cells(&self) -> Vec<String> {
        vec![
            opt(&self.file_id),
            self.file_name.clone(),
            opt(&self.file_size),
            opt(&self.uploader),
            shown_time(&self.timestamp, &self.last_modified_date, &self.updated_at, &self.created_at),
        ]
    }
}

impl Row for HistoryEntry {
    const COLUMNS: &'static [&'static str] = &["ID", "ACTION", "ACTOR", "TARGET", "AT"];

    fn cells(&self) -> Vec<String> {
        vec![
            opt(&self.history_id),
            self.action.clone(),
            opt(&self.actor),
            opt(&self.target),
            shown_time(&self.timestamp, &self.last_modified_date, &self.updated_at, &self.created_at),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated columns with a header
    #[default]
    Table,
    /// One JSON object per line
    Json,
}

/// Writes batches of items as they arrive
#[derive(Debug)]
pub struct Printer {
    format: OutputFormat,
    header_written: bool,
    rows_written: usize,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            header_written: false,
            rows_written: 0,
        }
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn write_batch<T, W>(&mut self, out: &mut W, items: &[T]) -> io::Result<()>
    where
        T: Row + Serialize,
        W: Write,
    {
        match self.format {
            OutputFormat::Table => {
                if !self.header_written {
                    writeln!(out, "{}", T::COLUMNS.join("\t"))?;
                    self.header_written = true;
                }
                for item in items {
                    writeln!(out, "{}", item.cells().join("\t"))?;
                }
            }
            OutputFormat::Json => {
                for item in items {
                    serde_json::to_writer(&mut *out, item)?;
                    writeln!(out)?;
                }
            }
        }
        self.rows_written += items.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn categories() -> Vec<DictionaryCategory> {
        vec![
            DictionaryCategory {
                category_id: Some(String::from("1")),
                name: String::from("Networking"),
                term_count: Some(12),
                timestamp: Some(String::from("2025-01-01T10:00:00Z")),
                ..Default::default()
            },
            DictionaryCategory {
                name: String::from("Drafts"),
                created_at: Some(String::from("2025-01-02T00:00:00Z")),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_table_header_written_once() {
        let mut printer = Printer::new(OutputFormat::Table);
        let mut out = Vec::new();
        let items = categories();

        printer.write_batch(&mut out, &items[..1]).expect("write");
        printer.write_batch(&mut out, &items[1..]).expect("write");

        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "ID\tNAME\tTERMS\tUPDATED\n\
             1\tNetworking\t12\t2025-01-01T10:00:00Z\n\
             -\tDrafts\t-\t2025-01-02T00:00:00Z\n"
        );
        assert_eq!(printer.rows_written(), 2);
    }

    #[test]
    fn test_json_lines() {
        let mut printer = Printer::new(OutputFormat::Json);
        let mut out = Vec::new();
        let entry = HistoryEntry {
            history_id: Some(String::from("7")),
            action: String::from("LOGIN"),
            ..Default::default()
        };

        printer.write_batch(&mut out, &[entry]).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        let line: serde_json::Value = serde_json::from_str(text.trim_end()).expect("json");
        assert_eq!(line["historyId"], "7");
        assert_eq!(line["action"], "LOGIN");
        assert!(text.ends_with('\n'));
    }
}
