use crate::export::OutputFormat;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Knobs handed verbatim to the external table extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub command: String,
    pub pages: String,
    pub line_scale: u32,
    pub strip_text: String,
    pub copy_text: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            command: "camelot".to_string(),
            pages: "all".to_string(),
            line_scale: 100,
            strip_text: String::new(),
            copy_text: vec!["h".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: OutputFormat::Ics, suffix: "_events".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Year the day/month labels are anchored to. Defaults to the current year.
    pub reference_year: Option<i32>,
    pub product_id: String,
    pub uid_domain: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            reference_year: None,
            product_id: "-//extrae-cal-uai//EN".to_string(),
            uid_domain: "extrae-cal-uai".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "extrae-cal", "extrae-cal")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.extractor.command, "camelot");
        assert_eq!(config.extractor.pages, "all");
        assert_eq!(config.extractor.line_scale, 100);
        assert_eq!(config.output.format, OutputFormat::Ics);
        assert_eq!(config.output.suffix, "_events");
        assert_eq!(config.calendar.reference_year, None);
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.output.format = OutputFormat::Csv;
        config.calendar.reference_year = Some(2025);
        config.save_to(&config_path)?;

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded.output.format, OutputFormat::Csv);
        assert_eq!(loaded.calendar.reference_year, Some(2025));
        assert_eq!(loaded.extractor.strip_text, "");

        Ok(())
    }

    #[test]
    fn test_default_extractor_keeps_cell_newlines() {
        // newlines inside a cell separate events; the extractor must not strip them
        assert!(!ExtractorConfig::default().strip_text.contains('\n'));
    }

    #[test]
    fn test_partial_config_fills_defaults() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[output]\nformat = \"csv\"\n")?;

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded.output.format, OutputFormat::Csv);
        assert_eq!(loaded.output.suffix, "_events");
        assert_eq!(loaded.extractor.copy_text, vec!["h".to_string()]);
        assert_eq!(loaded.calendar.uid_domain, "extrae-cal-uai");

        Ok(())
    }

    #[test]
    fn test_unknown_format_is_rejected() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[output]\nformat = \"pdf\"\n")?;

        assert!(Config::load_from(&config_path).is_err());
        Ok(())
    }
}
