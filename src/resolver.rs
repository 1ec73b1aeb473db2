//! Turns "DD MMM" labels into calendar dates.
//
// Labels carry no year. An academic calendar straddles the new year, so the
// year is inferred from where the table sits in the document: the December
// in the first table belongs to the previous year and a January in any table
// after the second belongs to the next one.

use crate::scanner::{RawEvent, DATE_PATTERN};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Spanish month abbreviations and their month numbers.
pub static MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("ene", 1);
    map.insert("feb", 2);
    map.insert("mar", 3);
    map.insert("abr", 4);
    map.insert("may", 5);
    map.insert("jun", 6);
    map.insert("jul", 7);
    map.insert("ago", 8);
    map.insert("sep", 9);
    map.insert("set", 9);
    map.insert("sept", 9);
    map.insert("oct", 10);
    map.insert("nov", 11);
    map.insert("dic", 12);
    map
});

/// Day and lowercased month abbreviation of a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLabel {
    pub day: u32,
    pub month_abbr: String,
}

impl DateLabel {
    pub fn month(&self) -> Option<u32> {
        MONTHS.get(self.month_abbr.as_str()).copied()
    }
}

pub fn parse_label(label: &str) -> Option<DateLabel> {
    let caps = DATE_PATTERN.captures(label)?;
    let day = caps[1].parse().ok()?;
    Some(DateLabel { day, month_abbr: caps[2].to_lowercase() })
}

pub fn infer_year(month: u32, table_index: usize, reference_year: i32) -> i32 {
    match (month, table_index) {
        (12, 0) => reference_year - 1,
        (1, idx) if idx > 1 => reference_year + 1,
        _ => reference_year,
    }
}

/// A scanned event with its calendar date, if the label names a real day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEvent {
    pub raw: RawEvent,
    pub date: Option<NaiveDate>,
}

pub fn resolve_date(event: &RawEvent, reference_year: i32) -> Option<NaiveDate> {
    let label = parse_label(&event.date_label)?;
    let month = label.month()?;
    let year = infer_year(month, event.table_index, reference_year);
    NaiveDate::from_ymd_opt(year, month, label.day)
}

pub fn resolve_events(events: Vec<RawEvent>, reference_year: i32) -> Vec<ResolvedEvent> {
    events
        .into_iter()
        .map(|raw| {
            let date = resolve_date(&raw, reference_year);
            ResolvedEvent { raw, date }
        })
        .collect()
}
