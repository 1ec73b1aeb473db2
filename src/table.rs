//! Table extraction.
//
// PDF layout analysis is delegated to an external tool. This module runs it,
// reads its output back into plain text grids, and also accepts grids that
// were extracted ahead of time and saved as JSON.

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, ExtractResult};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

static CSV_TABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-page-(\d+)-table-(\d+)\.csv$").unwrap());

/// One extracted table: a grid of raw cell text, rows by columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub page: usize,
    pub cells: Vec<Vec<String>>,
}

impl Table {
    pub fn new(page: usize, cells: Vec<Vec<String>>) -> Self {
        Self { page, cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Width of the widest row. Ragged rows read as empty past their end.
    pub fn cols(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.cells.get(row).and_then(|r| r.get(col)).map_or("", String::as_str)
    }
}

/// Anything able to turn a document into an ordered list of tables.
pub trait TableExtractor {
    fn extract(&self, path: &Path) -> ExtractResult<Vec<Table>>;
}

/// Runs the `camelot` command line tool in lattice mode and reads back its CSV export.
pub struct CamelotExtractor {
    config: ExtractorConfig,
}

impl CamelotExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    fn command_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--pages".into(),
            self.config.pages.clone().into(),
            "--format".into(),
            "csv".into(),
            "--output".into(),
            output.as_os_str().to_owned(),
        ];
        if !self.config.strip_text.is_empty() {
            args.push("--strip_text".into());
            args.push(self.config.strip_text.clone().into());
        }
        args.push("lattice".into());
        args.push("--line_scale".into());
        args.push(self.config.line_scale.to_string().into());
        for copy in &self.config.copy_text {
            args.push("--copy_text".into());
            args.push(copy.clone().into());
        }
        args.push(input.as_os_str().to_owned());
        args
    }
}

impl TableExtractor for CamelotExtractor {
    fn extract(&self, path: &Path) -> ExtractResult<Vec<Table>> {
        let scratch = tempfile::tempdir()?;
        let output = scratch.path().join("tables.csv");
        let args = self.command_args(path, &output);
        debug!("Running {} {:?}", self.config.command, args);

        let result = Command::new(&self.config.command).args(&args).output().map_err(|e| {
            ExtractError::Extractor(format!("failed to run '{}': {}", self.config.command, e))
        })?;
        if !result.status.success() {
            return Err(ExtractError::Extractor(format!(
                "'{}' exited with {}: {}",
                self.config.command,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        read_csv_tables(scratch.path())
    }
}

/// Reads every `*-page-N-table-M.csv` file in `dir`, ordered by page then table.
pub fn read_csv_tables(dir: &Path) -> ExtractResult<Vec<Table>> {
    let mut found: Vec<(usize, usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(caps) = CSV_TABLE_NAME.captures(name) {
            let page = caps[1].parse().unwrap_or(0);
            let order = caps[2].parse().unwrap_or(0);
            found.push((page, order, path));
        }
    }
    found.sort();

    let mut tables = Vec::with_capacity(found.len());
    for (page, order, path) in found {
        let mut reader =
            csv::ReaderBuilder::new().has_headers(false).flexible(true).from_path(&path)?;
        let mut cells = Vec::new();
        for record in reader.records() {
            cells.push(record?.iter().map(str::to_string).collect());
        }
        debug!("Read page {} table {} ({} rows)", page, order, cells.len());
        tables.push(Table::new(page, cells));
    }
    Ok(tables)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTable {
    Grid(Vec<Vec<Option<String>>>),
    Paged { page: usize, cells: Vec<Vec<Option<String>>> },
}

fn into_cells(grid: Vec<Vec<Option<String>>>) -> Vec<Vec<String>> {
    grid.into_iter().map(|row| row.into_iter().map(Option::unwrap_or_default).collect()).collect()
}

/// Parses a JSON document of pre-extracted tables.
///
/// Accepts either a bare list of grids or a list of `{"page": n, "cells": grid}`
/// objects. `null` cells read as empty text.
pub fn parse_json_tables(json: &str) -> ExtractResult<Vec<Table>> {
    let raw: Vec<JsonTable> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(idx, table)| match table {
            JsonTable::Grid(grid) => Table::new(idx + 1, into_cells(grid)),
            JsonTable::Paged { page, cells } => Table::new(page, into_cells(cells)),
        })
        .collect())
}

/// Reads tables that were extracted ahead of time and saved as JSON.
pub struct JsonTableSource;

impl TableExtractor for JsonTableSource {
    fn extract(&self, path: &Path) -> ExtractResult<Vec<Table>> {
        let content = fs::read_to_string(path)?;
        parse_json_tables(&content)
    }
}

/// Picks the extractor for a document: JSON grids are read directly, anything
/// else goes through the external tool.
pub fn extractor_for(path: &Path, config: &ExtractorConfig) -> Box<dyn TableExtractor> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonTableSource)
    } else {
        Box::new(CamelotExtractor::new(config.clone()))
    }
}

/// Extracts the tables of `path`, failing when none are found.
pub fn extract_tables(extractor: &dyn TableExtractor, path: &Path) -> ExtractResult<Vec<Table>> {
    let tables = extractor.extract(path)?;
    if tables.is_empty() {
        return Err(ExtractError::NoTables(path.to_path_buf()));
    }
    for (idx, table) in tables.iter().enumerate() {
        if table.cells.iter().all(Vec::is_empty) {
            return Err(ExtractError::InvalidGrid(format!("table {} has no cells", idx)));
        }
    }
    info!("Found {} tables", tables.len());
    Ok(tables)
}
