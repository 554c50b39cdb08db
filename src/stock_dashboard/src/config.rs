//! Dashboard configuration: TOML file, defaults, and command-line overrides.
//!
//! Every key is optional. A missing file section or key falls back to the
//! defaults below, which reproduce the classic behavior (Yahoo data from
//! 2020-01-01, twenty recent rows, charts on).
//!
//! ```toml
//! [data]
//! provider = "yahoo"
//! start_date = "2020-01-01"
//! timeout_secs = 30
//!
//! [display]
//! recent_rows = 20
//! show_table = true
//! charts = true
//! chart_dir = "charts"
//! chart_width = 1024
//! chart_height = 480
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::NaiveDate;
use market_data_client::{ProviderKind, ProviderSettings};
use serde::{Deserialize, Serialize};
use shared_utils::env::get_optional_env_var;

use crate::{errors::ConfigError, presentation::DEFAULT_RECENT_ROWS};

/// Environment variable consulted when no `--config` flag is given.
pub const CONFIG_ENV_VAR: &str = "STOCK_DASHBOARD_CONFIG";

const MIN_CHART_SIDE: u32 = 100;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub display: DisplayConfig,
}

/// Where the history comes from.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DataConfig {
    pub provider: ProviderKind,
    /// First date requested from the provider; the end is always "now".
    pub start_date: NaiveDate,
    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Yahoo,
            start_date: default_start_date(),
            timeout_secs: 30,
        }
    }
}

/// How the dashboard is drawn.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DisplayConfig {
    /// Rows in the recent-data table.
    pub recent_rows: usize,
    /// Collapses the recent-data table when false.
    pub show_table: bool,
    /// Writes the three chart panels as PNG files when true.
    pub charts: bool,
    pub chart_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            recent_rows: DEFAULT_RECENT_ROWS,
            show_table: true,
            charts: true,
            chart_dir: PathBuf::from("charts"),
            chart_width: 1024,
            chart_height: 480,
        }
    }
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub provider: Option<ProviderKind>,
    pub start_date: Option<NaiveDate>,
    pub chart_dir: Option<PathBuf>,
    pub no_charts: bool,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

impl DashboardConfig {
    /// Parses a TOML document. `origin` is only used in error messages.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Loads the file named on the command line or by [`CONFIG_ENV_VAR`],
    /// falling back to defaults when neither is set.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = cli_path
            .map(Path::to_path_buf)
            .or_else(|| get_optional_env_var(CONFIG_ENV_VAR).map(PathBuf::from));
        match path {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(provider) = overrides.provider {
            self.data.provider = provider;
        }
        if let Some(start) = overrides.start_date {
            self.data.start_date = start;
        }
        if let Some(dir) = overrides.chart_dir {
            self.display.chart_dir = dir;
        }
        if overrides.no_charts {
            self.display.charts = false;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.timeout_secs == 0 {
            return Err(ConfigError::Invalid("data.timeout_secs must be at least 1".into()));
        }
        if self.display.recent_rows == 0 {
            return Err(ConfigError::Invalid("display.recent_rows must be at least 1".into()));
        }
        if self.display.chart_width < MIN_CHART_SIDE || self.display.chart_height < MIN_CHART_SIDE {
            return Err(ConfigError::Invalid(format!(
                "chart dimensions must be at least {MIN_CHART_SIDE}x{MIN_CHART_SIDE}, got {}x{}",
                self.display.chart_width, self.display.chart_height
            )));
        }
        Ok(())
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            kind: self.data.provider,
            timeout: Duration::from_secs(self.data.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = DashboardConfig::from_toml_str("", Path::new("inline")).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.data.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(cfg.display.recent_rows, 20);
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = DashboardConfig::from_toml_str(
            r#"
            [data]
            provider = "alpaca"
            start_date = "2023-06-01"

            [display]
            show_table = false
            "#,
            Path::new("inline"),
        )
        .unwrap();
        assert_eq!(cfg.data.provider, ProviderKind::Alpaca);
        assert_eq!(cfg.data.start_date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(cfg.data.timeout_secs, 30);
        assert!(!cfg.display.show_table);
        assert!(cfg.display.charts);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = DashboardConfig::from_toml_str("[data]\nend_date = \"2024-01-01\"\n", Path::new("x.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("x.toml"));
    }

    #[test]
    fn bad_provider_is_a_parse_error() {
        let err = DashboardConfig::from_toml_str("[data]\nprovider = \"polygon\"\n", Path::new("x.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\nrecent_rows = 5\nchart_dir = \"out\"").unwrap();

        let cfg = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(cfg.display.recent_rows, 5);
        assert_eq!(cfg.display.chart_dir, PathBuf::from("out"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DashboardConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut cfg = DashboardConfig::default();
        cfg.apply_overrides(ConfigOverrides {
            provider: Some(ProviderKind::Alpaca),
            start_date: NaiveDate::from_ymd_opt(2022, 2, 2),
            chart_dir: Some(PathBuf::from("/tmp/charts")),
            no_charts: true,
        });
        assert_eq!(cfg.data.provider, ProviderKind::Alpaca);
        assert_eq!(cfg.data.start_date, NaiveDate::from_ymd_opt(2022, 2, 2).unwrap());
        assert_eq!(cfg.display.chart_dir, PathBuf::from("/tmp/charts"));
        assert!(!cfg.display.charts);
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let mut cfg = DashboardConfig::default();
        cfg.display.recent_rows = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = DashboardConfig::default();
        cfg.data.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = DashboardConfig::default();
        cfg.display.chart_width = 10;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("10x480"));
    }

    #[test]
    fn provider_settings_carry_timeout() {
        let mut cfg = DashboardConfig::default();
        cfg.data.timeout_secs = 7;
        let settings = cfg.provider_settings();
        assert_eq!(settings.kind, ProviderKind::Yahoo);
        assert_eq!(settings.timeout, Duration::from_secs(7));
    }
}
