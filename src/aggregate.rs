//! Groups resolved events by title and merges consecutive days into runs.

use crate::resolver::ResolvedEvent;
use crate::scanner::{Tag, WHITESPACE};
use chrono::{Duration, NaiveDate};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Lowercased, whitespace-collapsed title used as the grouping key.
pub fn normalize_title(title: &str) -> String {
    WHITESPACE.replace_all(title.trim(), " ").to_lowercase()
}

/// Every date on which one normalized title occurs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventGroup {
    pub key: String,
    pub dates: BTreeSet<NaiveDate>,
    pub titles_by_date: BTreeMap<NaiveDate, String>,
    pub tags_by_date: BTreeMap<NaiveDate, BTreeSet<Tag>>,
}

impl EventGroup {
    fn new(key: String) -> Self {
        Self { key, ..Self::default() }
    }

    fn record(&mut self, date: NaiveDate, title: &str, tags: &BTreeSet<Tag>) {
        self.dates.insert(date);
        self.titles_by_date.insert(date, title.to_string());
        self.tags_by_date.entry(date).or_default().extend(tags.iter().copied());
    }

    /// Splits the date set into maximal runs of consecutive days.
    pub fn runs(&self) -> Vec<DateRun> {
        let mut runs = Vec::new();
        let mut dates = self.dates.iter().copied();
        let Some(first) = dates.next() else {
            return runs;
        };

        let (mut start, mut end) = (first, first);
        for date in dates {
            if date == end + Duration::days(1) {
                end = date;
            } else {
                runs.push(self.close_run(start, end));
                start = date;
                end = date;
            }
        }
        runs.push(self.close_run(start, end));
        runs
    }

    fn close_run(&self, start: NaiveDate, end: NaiveDate) -> DateRun {
        let title = self
            .titles_by_date
            .get(&start)
            .or_else(|| self.titles_by_date.values().next())
            .cloned()
            .unwrap_or_else(|| self.key.clone());
        let tags = self
            .tags_by_date
            .range(start..=end)
            .flat_map(|(_, tags)| tags.iter().copied())
            .collect();
        DateRun { title, start, end, tags }
    }
}

/// Consecutive days sharing one title; exported as a single all-day event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRun {
    pub title: String,
    pub start: NaiveDate,
    /// Last included day.
    pub end: NaiveDate,
    pub tags: BTreeSet<Tag>,
}

/// Groups events with a date by normalized title, in first-seen order.
pub fn group_events(events: &[ResolvedEvent]) -> Vec<EventGroup> {
    let mut groups: Vec<EventGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for event in events {
        let Some(date) = event.date else {
            continue;
        };
        let title = event.raw.event_text.trim();
        let key = normalize_title(title);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(EventGroup::new(key));
            groups.len() - 1
        });
        groups[slot].record(date, title, &event.raw.tags);
    }

    debug!("Grouped {} events into {} titles", events.len(), groups.len());
    groups
}

/// Runs of every group, group by group.
pub fn merge_runs(groups: &[EventGroup]) -> Vec<DateRun> {
    groups.iter().flat_map(EventGroup::runs).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::RawEvent;
    use pretty_assertions::assert_eq;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn event(text: &str, date: Option<NaiveDate>, tags: &[Tag]) -> ResolvedEvent {
        ResolvedEvent {
            raw: RawEvent {
                date_label: "x".to_string(),
                event_text: text.to_string(),
                table_index: 1,
                tags: tags.iter().copied().collect(),
            },
            date,
        }
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Semana   de\tRECESO "), "semana de receso");
    }

    #[test]
    fn test_consecutive_days_merge_into_runs() {
        let events: Vec<_> = [day(3, 1), day(3, 2), day(3, 3), day(3, 10)]
            .into_iter()
            .map(|d| event("Receso", Some(d), &[]))
            .collect();
        let runs = merge_runs(&group_events(&events));
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].start, runs[0].end), (day(3, 1), day(3, 3)));
        assert_eq!((runs[1].start, runs[1].end), (day(3, 10), day(3, 10)));
    }

    #[test]
    fn test_runs_cross_month_boundaries() {
        let events = vec![
            event("Feriado", Some(day(3, 1)), &[]),
            event("Feriado", Some(day(2, 28)), &[]),
        ];
        let runs = merge_runs(&group_events(&events));
        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].start, runs[0].end), (day(2, 28), day(3, 1)));
    }

    #[test]
    fn test_titles_group_case_and_space_insensitively() {
        let events = vec![
            event("Inicio de Clases", Some(day(3, 3)), &[Tag::B1]),
            event("inicio  de clases", Some(day(3, 4)), &[Tag::S2]),
            event("Otro", Some(day(3, 4)), &[]),
        ];
        let groups = group_events(&events);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "inicio de clases");

        let runs = groups[0].runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].title, "Inicio de Clases");
        assert_eq!(runs[0].tags, BTreeSet::from([Tag::B1, Tag::S2]));
    }

    #[test]
    fn test_tags_stay_within_their_run() {
        let events = vec![
            event("Control", Some(day(4, 1)), &[Tag::B1]),
            event("Control", Some(day(4, 8)), &[Tag::B2]),
        ];
        let runs = merge_runs(&group_events(&events));
        assert_eq!(runs[0].tags, BTreeSet::from([Tag::B1]));
        assert_eq!(runs[1].tags, BTreeSet::from([Tag::B2]));
    }

    #[test]
    fn test_same_day_duplicates_collapse() {
        let events = vec![
            event("Examen", Some(day(5, 2)), &[Tag::S1]),
            event("EXAMEN", Some(day(5, 2)), &[]),
        ];
        let groups = group_events(&events);
        assert_eq!(groups[0].dates.len(), 1);
        // last writer wins
        assert_eq!(groups[0].titles_by_date[&day(5, 2)], "EXAMEN");
        assert_eq!(groups[0].runs()[0].tags, BTreeSet::from([Tag::S1]));
    }

    #[test]
    fn test_unresolved_events_are_skipped() {
        let events = vec![event("Perdido", None, &[]), event("Visto", Some(day(6, 1)), &[])];
        let groups = group_events(&events);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "visto");
    }

    #[test]
    fn test_group_maps_only_hold_group_dates() {
        let events = vec![
            event("A", Some(day(7, 1)), &[Tag::B3]),
            event("a", Some(day(7, 9)), &[]),
        ];
        let group = &group_events(&events)[0];
        assert!(group.titles_by_date.keys().all(|d| group.dates.contains(d)));
        assert!(group.tags_by_date.keys().all(|d| group.dates.contains(d)));
    }
}
