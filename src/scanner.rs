//! Grid scanning.
//!
//! Walks each extracted table column by column, finds the cells that hold a
//! day and a Spanish month abbreviation ("date cells") and turns the text
//! stacked beneath each one into [`RawEvent`]s.
//!
//! Row 0 of every table is a weekday header and column 0 holds week labels;
//! both are skipped.

use crate::table::Table;
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Day, optional separator, month abbreviation, optional period. Nothing else.
pub static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(\d{1,2})\s*[-‐‑—–./]?\s*(ene|feb|mar|abr|may|jun|jul|ago|sep|set|sept|oct|nov|dic)\.?\s*$",
    )
    .unwrap()
});

pub(crate) static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static FRAGMENT_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n•]+").unwrap());

/// Values the extractor emits for cells without data.
const MISSING_PLACEHOLDERS: [&str; 2] = ["nan", "none"];

/// Course-section codes that tag an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    B1,
    B2,
    B3,
    B4,
    S1,
    S2,
}

impl Tag {
    pub const ALL: [Tag; 6] = [Tag::B1, Tag::B2, Tag::B3, Tag::B4, Tag::S1, Tag::S2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::B1 => "B1",
            Tag::B2 => "B2",
            Tag::B3 => "B3",
            Tag::B4 => "B4",
            Tag::S1 => "S1",
            Tag::S2 => "S2",
        }
    }
}

/// One text fragment found beneath a date cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub date_label: String,
    pub event_text: String,
    pub table_index: usize,
    pub tags: BTreeSet<Tag>,
}

/// Collapses whitespace runs and trims; placeholder values become empty text.
pub fn normalize_cell(text: &str) -> String {
    let trimmed = text.trim();
    if MISSING_PLACEHOLDERS.iter().any(|p| trimmed.eq_ignore_ascii_case(p)) {
        return String::new();
    }
    WHITESPACE.replace_all(trimmed, " ").into_owned()
}

pub fn is_date_cell(text: &str) -> bool {
    let cleaned = normalize_cell(text);
    !cleaned.is_empty() && DATE_PATTERN.is_match(&cleaned)
}

/// Tags whose token appears anywhere in `text`.
pub fn detect_tags(text: &str) -> BTreeSet<Tag> {
    Tag::ALL.iter().copied().filter(|tag| text.contains(tag.as_str())).collect()
}

/// Splits a cell on newlines and bullets into cleaned, non-empty fragments.
fn split_fragments(raw: &str) -> impl Iterator<Item = String> + '_ {
    FRAGMENT_SEPARATOR.split(raw).map(normalize_cell).filter(|part| !part.is_empty())
}

/// Collects the events beneath the date cell at (`date_row`, `col`).
///
/// Returns the events and the row the walk should resume at: either the next
/// date cell, the first blank cell after something was collected, or the end
/// of the column. Blank cells before anything was collected are skipped.
pub fn scan_date_block(
    table: &Table,
    table_index: usize,
    col: usize,
    date_row: usize,
) -> (Vec<RawEvent>, usize) {
    let date_label = normalize_cell(table.cell(date_row, col));
    let mut events = Vec::new();
    let mut row = date_row + 1;

    while row < table.rows() {
        let raw = table.cell(row, col);
        let below = normalize_cell(raw);
        if is_date_cell(&below) {
            break;
        }
        if below.is_empty() {
            if !events.is_empty() {
                break;
            }
        } else {
            let tags = detect_tags(&below);
            for part in split_fragments(raw) {
                events.push(RawEvent {
                    date_label: date_label.clone(),
                    event_text: part,
                    table_index,
                    tags: tags.clone(),
                });
            }
        }
        row += 1;
    }

    (events, row)
}

/// Scans one table, skipping its header row and label column.
pub fn scan_table(table: &Table, table_index: usize) -> Vec<RawEvent> {
    let mut events = Vec::new();

    for col in 1..table.cols() {
        let mut row = 1;
        while row < table.rows() {
            let cell = table.cell(row, col);
            trace!("Table {}, Row {}, Col {}: '{}'", table_index, row, col, normalize_cell(cell));
            if is_date_cell(cell) {
                let (block, next) = scan_date_block(table, table_index, col, row);
                events.extend(block);
                row = next;
            } else {
                row += 1;
            }
        }
    }

    events
}

/// Scans every table in document order.
pub fn scan_tables(tables: &[Table]) -> Vec<RawEvent> {
    let events: Vec<RawEvent> = tables
        .iter()
        .enumerate()
        .flat_map(|(idx, table)| scan_table(table, idx))
        .collect();

    for event in &events {
        debug!(
            "{}: {}, (table {}), tags: {:?}",
            event.date_label, event.event_text, event.table_index, event.tags
        );
    }
    events
}
