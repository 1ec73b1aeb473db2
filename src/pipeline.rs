//! End-to-end extraction: tables in, one calendar file out.

use crate::aggregate::{group_events, merge_runs};
use crate::config::Config;
use crate::error::ExtractError;
use crate::export::{output_path, render_csv, render_ics, OutputFormat};
use crate::resolver::resolve_events;
use crate::scanner::scan_tables;
use crate::table::{extract_tables, extractor_for, Table, TableExtractor};
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, Utc};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs every run depends on besides the document itself.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub reference_year: i32,
    pub now: DateTime<Utc>,
}

impl RunContext {
    /// Uses the configured reference year, or the current local year.
    pub fn from_config(config: &Config) -> Self {
        Self {
            reference_year: config.calendar.reference_year.unwrap_or_else(|| Local::now().year()),
            now: Utc::now(),
        }
    }
}

/// Rendered document plus the counts worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    pub events: usize,
    /// VEVENTs for ICS, data rows for CSV.
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub tables: usize,
    pub events: usize,
    pub records: usize,
}

/// Scans, resolves and renders already-extracted tables. Nothing is written.
pub fn render_tables(
    tables: &[Table],
    format: OutputFormat,
    config: &Config,
    ctx: &RunContext,
) -> Result<Rendered, ExtractError> {
    let raw = scan_tables(tables);
    info!("Extracted {} events", raw.len());
    if raw.is_empty() {
        return Err(ExtractError::NoDateCells(tables.len()));
    }

    let resolved = resolve_events(raw, ctx.reference_year);
    let unresolved = resolved.iter().filter(|e| e.date.is_none()).count();
    if unresolved > 0 {
        warn!("{} events have labels that are not valid dates", unresolved);
    }

    let events = resolved.len();
    match format {
        OutputFormat::Ics => {
            let runs = merge_runs(&group_events(&resolved));
            Ok(Rendered {
                content: render_ics(&runs, &config.calendar, ctx.now),
                events,
                records: runs.len(),
            })
        }
        OutputFormat::Csv => Ok(Rendered {
            content: render_csv(&resolved, ctx.reference_year)?,
            events,
            records: events,
        }),
    }
}

/// Extracts `input` with `extractor` and writes the rendered document next to it.
pub fn run_with(
    extractor: &dyn TableExtractor,
    input: &Path,
    config: &Config,
    ctx: &RunContext,
) -> Result<ExportSummary> {
    info!("Parsing {}", input.display());
    let tables = extract_tables(extractor, input)
        .with_context(|| format!("Failed to extract tables from {}", input.display()))?;

    let format = config.output.format;
    let rendered = render_tables(&tables, format, config, ctx)?;

    // the whole document is in memory before anything touches the disk
    let path = output_path(input, &config.output.suffix, format);
    fs::write(&path, &rendered.content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(ExportSummary {
        path,
        format,
        tables: tables.len(),
        events: rendered.events,
        records: rendered.records,
    })
}

/// Runs the whole pipeline with the extractor suited to `input`.
pub fn run(input: &Path, config: &Config) -> Result<ExportSummary> {
    let extractor = extractor_for(input, &config.extractor);
    run_with(extractor.as_ref(), input, config, &RunContext::from_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn table(rows: &[&[&str]]) -> Table {
        Table::new(1, rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect())
    }

    fn ctx() -> RunContext {
        RunContext { reference_year: 2025, now: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap() }
    }

    #[test]
    fn test_no_date_cells_is_an_error() {
        let tables = vec![table(&[&["", "Lunes"], &["1", "Clase"]])];
        let result = render_tables(&tables, OutputFormat::Ics, &Config::default(), &ctx());
        assert!(matches!(result, Err(ExtractError::NoDateCells(1))));
    }

    #[test]
    fn test_csv_keeps_events_ics_drops() {
        let tables = vec![table(&[
            &["", "Lunes", "Martes"],
            &["1", "3 mar", "31 abr"],
            &["", "Clase", "Imposible"],
        ])];
        let config = Config::default();
        let ics = render_tables(&tables, OutputFormat::Ics, &config, &ctx()).unwrap();
        let csv = render_tables(&tables, OutputFormat::Csv, &config, &ctx()).unwrap();
        assert_eq!(ics.records, 1);
        assert_eq!(csv.records, 2);
        assert!(csv.content.contains("2025-04-31,Imposible,,0"));
    }
}
