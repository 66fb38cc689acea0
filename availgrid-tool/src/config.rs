use std::io;
use std::path::{Path, PathBuf};

use availgrid_client::DEFAULT_BASE_URL;
use availgrid_core::{GridRequest, Time24, Weekday, parse_user_time};
use serde::Deserialize;
use tracing::debug;

use crate::error::ToolError;

pub const URL_ENV: &str = "AVAILGRID_URL";
const DEFAULT_TITLE: &str = "Availability Schedule";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub title: Option<String>,
    #[serde(default)]
    pub grid: GridDefaults,
}

/// Initial timetable parameters. Unset fields fall back to the built-in defaults.
#[derive(Debug, Deserialize, Default)]
pub struct GridDefaults {
    pub days: Option<Vec<String>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub slot_minutes: Option<u16>,
}

/// Grid parameters given on the command line.
#[derive(Debug, Default, Clone)]
pub struct GridOverrides {
    pub days: Option<Vec<String>>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub slot_minutes: Option<u16>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("availgrid").join("config.toml"))
}

/// Where the TUI writes its log, since the terminal belongs to the interface.
pub fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("availgrid")
        .join("availgrid.log")
}

/// Reads the config file. A missing file yields the defaults; a malformed one is an error.
pub fn load_config() -> Result<Config, ToolError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

pub fn load_config_from(path: &Path) -> Result<Config, ToolError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ToolError::ConfigRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&content).map_err(|source| ToolError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// `--url` beats the environment, which beats the config file.
pub fn resolve_base_url(cli: Option<String>, config: &Config) -> String {
    let env = std::env::var(URL_ENV).ok();
    pick_base_url(cli, env, config)
}

fn pick_base_url(cli: Option<String>, env: Option<String>, config: &Config) -> String {
    [cli, env, config.base_url.clone()]
        .into_iter()
        .flatten()
        .map(|url| url.trim().to_string())
        .find(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn resolve_export_dir(cli: Option<PathBuf>, config: &Config) -> PathBuf {
    cli.or_else(|| config.export_dir.clone())
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn title(config: &Config) -> String {
    config
        .title
        .clone()
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Builds the grid request from the config, then the command line.
pub fn grid_request(config: &Config, overrides: &GridOverrides) -> Result<GridRequest, ToolError> {
    let base = GridRequest::default();

    let days = match overrides.days.as_ref().or(config.grid.days.as_ref()) {
        Some(names) => parse_days(names)?,
        None => base.days,
    };
    let start = pick_time(overrides.start.as_deref(), config.grid.start_time.as_deref())?
        .unwrap_or(base.start);
    let end = pick_time(overrides.end.as_deref(), config.grid.end_time.as_deref())?
        .unwrap_or(base.end);
    let slot = overrides
        .slot_minutes
        .or(config.grid.slot_minutes)
        .unwrap_or(base.slot_minutes);

    Ok(GridRequest::new(days, start, end, slot)?)
}

/// Accepts both repeated values and comma-separated lists.
pub fn parse_days(names: &[String]) -> Result<Vec<Weekday>, ToolError> {
    let mut days = Vec::new();
    for name in names.iter().flat_map(|n| n.split(',')) {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        days.push(name.parse::<Weekday>()?);
    }
    Ok(days)
}

fn pick_time(cli: Option<&str>, config: Option<&str>) -> Result<Option<Time24>, ToolError> {
    cli.or(config)
        .map(parse_user_time)
        .transpose()
        .map_err(ToolError::from)
}

#[cfg(test)]
mod tests {
    use availgrid_core::RequestError;

    use super::*;

    fn config(text: &str) -> Config {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = config("");
        let request = grid_request(&config, &GridOverrides::default()).unwrap();
        assert_eq!(request, GridRequest::default());
        assert_eq!(title(&config), "Availability Schedule");
    }

    #[test]
    fn base_url_precedence() {
        let config = config(r#"base_url = "http://config:1""#);
        assert_eq!(
            pick_base_url(Some("http://cli:1".into()), Some("http://env:1".into()), &config),
            "http://cli:1"
        );
        assert_eq!(
            pick_base_url(None, Some("http://env:1".into()), &config),
            "http://env:1"
        );
        assert_eq!(pick_base_url(None, Some("  ".into()), &config), "http://config:1");
        assert_eq!(pick_base_url(None, None, &Config::default()), DEFAULT_BASE_URL);
    }

    #[test]
    fn command_line_overrides_config_grid() {
        let config = config(
            r#"
            [grid]
            days = ["Mon", "Wed"]
            start_time = "09:00"
            end_time = "17:00"
            slot_minutes = 30
            "#,
        );
        let overrides = GridOverrides {
            days: Some(vec!["tuesday,thu".into()]),
            end: Some("3:00 PM".into()),
            ..Default::default()
        };

        let request = grid_request(&config, &overrides).unwrap();
        assert_eq!(request.days, vec![Weekday::Tue, Weekday::Thu]);
        assert_eq!(request.start.to_string(), "09:00");
        assert_eq!(request.end.to_string(), "15:00");
        assert_eq!(request.slot_minutes, 30);
    }

    #[test]
    fn invalid_grid_settings_are_rejected() {
        let bad_window = GridOverrides {
            start: Some("18:00".into()),
            end: Some("09:00".into()),
            ..Default::default()
        };
        assert!(matches!(
            grid_request(&Config::default(), &bad_window),
            Err(ToolError::Request(RequestError::EmptyWindow { .. }))
        ));

        let bad_day = GridOverrides {
            days: Some(vec!["Funday".into()]),
            ..Default::default()
        };
        assert!(matches!(
            grid_request(&Config::default(), &bad_day),
            Err(ToolError::Day(_))
        ));

        let bad_slot = GridOverrides {
            slot_minutes: Some(7),
            ..Default::default()
        };
        assert!(matches!(
            grid_request(&Config::default(), &bad_slot),
            Err(ToolError::Request(RequestError::UnsupportedSlot(7)))
        ));
    }

    #[test]
    fn only_a_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(missing.base_url.is_none());

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = [").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ToolError::Config { .. })
        ));

        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x62]).unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ToolError::ConfigRead { .. })
        ));

        assert!(matches!(
            load_config_from(dir.path()),
            Err(ToolError::ConfigRead { .. })
        ));

        std::fs::write(&path, "export_dir = \"/tmp/out\"\ntitle = \"Spring\"").unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(
            resolve_export_dir(None, &config),
            PathBuf::from("/tmp/out")
        );
        assert_eq!(
            resolve_export_dir(Some(PathBuf::from("elsewhere")), &config),
            PathBuf::from("elsewhere")
        );
        assert_eq!(title(&config), "Spring");
    }
}
