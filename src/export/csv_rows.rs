//! Flat CSV export: one row per extracted event, no merging.

use crate::error::ExtractResult;
use crate::resolver::{infer_year, parse_label, ResolvedEvent};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CsvRow {
    pub date: String,
    pub title: String,
    pub category: String,
    pub page: usize,
}

/// ISO date of the event, degrading gracefully when the label is not a real day.
///
/// A label that parses but names an impossible day keeps its zero-padded
/// pieces (month `01` when the abbreviation is unknown); a label that does not
/// parse at all is passed through untouched.
pub fn csv_date(event: &ResolvedEvent, reference_year: i32) -> String {
    if let Some(date) = event.date {
        return date.format("%Y-%m-%d").to_string();
    }
    match parse_label(&event.raw.date_label) {
        Some(label) => {
            let month = label.month().unwrap_or(1);
            let year = infer_year(month, event.raw.table_index, reference_year);
            format!("{:04}-{:02}-{:02}", year, month, label.day)
        }
        None => event.raw.date_label.clone(),
    }
}

impl CsvRow {
    pub fn from_event(event: &ResolvedEvent, reference_year: i32) -> Self {
        let tags: Vec<&str> = event.raw.tags.iter().map(|t| t.as_str()).collect();
        Self {
            date: csv_date(event, reference_year),
            title: event.raw.event_text.trim().to_string(),
            category: tags.join(","),
            page: event.raw.table_index,
        }
    }
}

/// Renders events as CSV with a `date,title,category,page` header.
pub fn render_csv(events: &[ResolvedEvent], reference_year: i32) -> ExtractResult<String> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(["date", "title", "category", "page"])?;
    for event in events {
        writer.serialize(CsvRow::from_event(event, reference_year))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
