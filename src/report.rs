/*!
 * Reporting functionality for filefacts
 *
 * Renders gathered facts either as console tables, using the tabled
 * library, or as JSON for scripts.
 */

use clap::ValueEnum;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::error::Result;
use crate::types::FileMetadata;

/// The result of one fact, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FactReport {
    /// File metadata, absent when missing or of another type
    Metadata(Option<FileMetadata>),
    /// Hex digest, absent when it could not be computed
    Checksum(Option<String>),
    /// Matching lines, absent when the file does not exist
    Matches(Option<Vec<String>>),
    /// Paths listed by find
    Paths(Vec<String>),
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Console table output
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Report generator for gathered facts
pub struct Reporter {
    format: ReportFormat,
}

/// A two column row of the metadata table
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    key: String,

    #[tabled(rename = "Value")]
    value: String,
}

/// A single column row for line and path lists
#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "#")]
    index: usize,

    #[tabled(rename = "Entry")]
    entry: String,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate a report string for a fact result
    pub fn generate_report(&self, report: &FactReport) -> Result<String> {
        match self.format {
            ReportFormat::Table => Ok(self.generate_console_report(report)),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &FactReport) -> Result<()> {
        println!("{}", self.generate_report(report)?);
        Ok(())
    }

    fn generate_console_report(&self, report: &FactReport) -> String {
        match report {
            FactReport::Metadata(Some(metadata)) => self.create_metadata_table(metadata),
            FactReport::Metadata(None) => "absent: no such path of the requested type".to_string(),
            FactReport::Checksum(Some(digest)) => digest.clone(),
            FactReport::Checksum(None) => "absent: checksum unavailable".to_string(),
            FactReport::Matches(None) => "absent: no such file".to_string(),
            FactReport::Matches(Some(lines)) if lines.is_empty() => {
                "file exists, no matching lines".to_string()
            }
            FactReport::Matches(Some(lines)) => self.create_lines_table(lines),
            FactReport::Paths(paths) if paths.is_empty() => "no entries found".to_string(),
            FactReport::Paths(paths) => self.create_lines_table(paths),
        }
    }

    // Create a field/value table for file metadata
    fn create_metadata_table(&self, metadata: &FileMetadata) -> String {
        let mut rows = vec![
            FieldRow {
                key: "Type".to_string(),
                value: metadata.file_type.to_string(),
            },
            FieldRow {
                key: "Owner".to_string(),
                value: metadata.owner.clone(),
            },
            FieldRow {
                key: "Group".to_string(),
                value: metadata.group.clone(),
            },
            FieldRow {
                key: "Mode".to_string(),
                value: metadata.mode.to_string(),
            },
            FieldRow {
                key: "Size".to_string(),
                value: metadata.size.to_string(),
            },
            FieldRow {
                key: "Accessed".to_string(),
                value: metadata.accessed.to_string(),
            },
            FieldRow {
                key: "Modified".to_string(),
                value: metadata.modified.to_string(),
            },
            FieldRow {
                key: "Changed".to_string(),
                value: metadata.changed.to_string(),
            },
        ];

        if let Some(target) = &metadata.link_target {
            rows.push(FieldRow {
                key: "Link Target".to_string(),
                value: target.clone(),
            });
        }

        self.style(Table::new(rows))
    }

    // Create a numbered table of lines or paths
    fn create_lines_table(&self, lines: &[String]) -> String {
        let rows = lines.iter().enumerate().map(|(i, line)| LineRow {
            index: i + 1,
            entry: line.clone(),
        });

        self.style(Table::new(rows))
    }

    fn style(&self, mut table: Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }
}
