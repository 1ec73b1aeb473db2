//! iCalendar generation for merged date runs.

use crate::aggregate::DateRun;
use crate::config::CalendarConfig;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use icalendar::{Calendar, Component, Property, ValueType};
use sha2::{Digest, Sha256};

/// Stable UID for a run: the same title and span always yield the same UID.
pub fn make_uid(title: &str, start: NaiveDate, end: NaiveDate, domain: &str) -> String {
    let digest = Sha256::digest(format!("{}|{}|{}", title, start, end).as_bytes());
    format!("{:x}@{}", digest, domain)
}

fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}

fn build_event(run: &DateRun, dtstamp: &str, domain: &str) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&make_uid(&run.title, run.start, run.end, domain));
    ics_event.add_property("DTSTAMP", dtstamp);
    ics_event.summary(&run.title);

    add_date_property(&mut ics_event, "DTSTART", run.start);
    // all-day events end on the day after the last included day
    add_date_property(&mut ics_event, "DTEND", run.end + Duration::days(1));

    ics_event.done()
}

/// CATEGORIES is a list value; the crate would escape its separators.
fn categories_line(run: &DateRun) -> Option<String> {
    if run.tags.is_empty() {
        return None;
    }
    let categories: Vec<&str> = run.tags.iter().map(|t| t.as_str()).collect();
    Some(format!("CATEGORIES:{}", categories.join(",")))
}

/// Swaps in our PRODID and adds each event's CATEGORIES before its END:VEVENT.
fn finish_document(ics: &str, product_id: &str, categories: Vec<Option<String>>) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut pending = categories.into_iter();

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str(&format!("PRODID:{}\r\n", product_id));
            continue;
        }

        if line == "END:VEVENT" {
            if let Some(Some(categories)) = pending.next() {
                result.push_str(&categories);
                result.push_str("\r\n");
            }
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Renders runs as one VCALENDAR document with CRLF line endings.
pub fn render_ics(runs: &[DateRun], calendar: &CalendarConfig, now: DateTime<Utc>) -> String {
    let dtstamp = now.format("%Y%m%dT%H%M%SZ").to_string();

    let mut cal = Calendar::new();
    cal.append_property(Property::new("METHOD", "PUBLISH"));

    let mut categories = Vec::with_capacity(runs.len());
    for run in runs {
        cal.push(build_event(run, &dtstamp, &calendar.uid_domain));
        categories.push(categories_line(run));
    }
    let cal = cal.done();

    finish_document(&cal.to_string(), &calendar.product_id, categories)
}
