//! Configuration file management for flightwatch.
//!
//! Reads/writes `~/.flightwatch/config.yaml` with the watched region, poll
//! interval, tracked callsigns, and webhook destinations.

use std::path::{Path, PathBuf};

use crate::geo::Region;
use crate::types::{Result, WatchError};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub region: Region,
    pub poll_interval_secs: u64,
    pub tracked: Vec<String>,
    pub webhooks: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            region: Region::new(43.533321723, 33.245738826, 345_000.0),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            tracked: vec!["FORTE10".into()],
            webhooks: Vec::new(),
        }
    }
}

impl Config {
    /// Reject configurations the poll loop cannot run with.
    ///
    /// Webhooks are only required when alerts will actually be posted.
    pub fn validate(&self, require_webhooks: bool) -> Result<()> {
        if self.tracked.iter().all(|cs| cs.trim().is_empty()) {
            return Err(WatchError::Config("no tracked callsigns configured".into()));
        }
        if !(-90.0..=90.0).contains(&self.region.lat) {
            return Err(WatchError::Config(format!(
                "region latitude {} out of range",
                self.region.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.region.lon) {
            return Err(WatchError::Config(format!(
                "region longitude {} out of range",
                self.region.lon
            )));
        }
        if self.region.radius_m.is_nan() || self.region.radius_m <= 0.0 {
            return Err(WatchError::Config(format!(
                "region radius must be positive, got {}",
                self.region.radius_m
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(WatchError::Config("poll interval must be at least 1 second".into()));
        }
        if require_webhooks && self.webhooks.is_empty() {
            return Err(WatchError::Config("no webhook destinations configured".into()));
        }
        Ok(())
    }
}

/// Get the config directory path (`~/.flightwatch/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".flightwatch")
}

/// Get the default config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `path`.
///
/// Returns default config if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}

/// Save config to `path`, creating parent directories as needed.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, serialize_config(config))?;
    Ok(())
}

/// Parse simple YAML-like config text.
///
/// Keys missing from the text keep their defaults. A list section that
/// appears in the text replaces the default list entirely.
pub fn parse_config(text: &str) -> Result<Config> {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;
    let mut seen_tracked = false;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        // List items first: URLs contain ':'
        if let Some(item) = stripped.strip_prefix('-') {
            let Some(section) = current_section.as_deref() else {
                return Err(WatchError::Config(format!("list item outside a section: {stripped}")));
            };
            let Some(value) = parse_string_value(item.trim()) else {
                continue;
            };
            match section {
                "tracked" => config.tracked.push(value),
                "webhooks" => config.webhooks.push(value),
                _ => {
                    return Err(WatchError::Config(format!(
                        "section '{section}' does not take list items"
                    )))
                }
            }
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            return Err(WatchError::Config(format!("expected 'key: value', got: {stripped}")));
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            if key == "tracked" && !seen_tracked {
                config.tracked.clear();
                seen_tracked = true;
            }
            if val.is_empty() {
                current_section = Some(key.to_string());
                continue;
            }
            current_section = None;
            match key {
                "poll_interval_secs" => config.poll_interval_secs = parse_number(key, val)?,
                "tracked" => config.tracked.extend(parse_inline_list(val)),
                "webhooks" => config.webhooks.extend(parse_inline_list(val)),
                _ => {}
            }
        } else if current_section.as_deref() == Some("region") {
            match key {
                "lat" => config.region.lat = parse_number(key, val)?,
                "lon" => config.region.lon = parse_number(key, val)?,
                "radius_m" => config.region.radius_m = parse_number(key, val)?,
                _ => {}
            }
        }
    }

    Ok(config)
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

/// `a, b, c` on the same line as the key.
fn parse_inline_list(val: &str) -> Vec<String> {
    val.split(',').filter_map(|v| parse_string_value(v.trim())).collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, val: &str) -> Result<T> {
    val.parse()
        .map_err(|_| WatchError::Config(format!("invalid value for {key}: {val}")))
}

/// Serialize config to YAML-like text.
pub fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# flightwatch configuration".to_string(), String::new()];

    lines.push("region:".into());
    lines.push(format!("  lat: {}", config.region.lat));
    lines.push(format!("  lon: {}", config.region.lon));
    lines.push(format!("  radius_m: {}", config.region.radius_m));
    lines.push(String::new());

    lines.push(format!("poll_interval_secs: {}", config.poll_interval_secs));
    lines.push(String::new());

    lines.push("tracked:".into());
    for cs in &config.tracked {
        lines.push(format!("  - {cs}"));
    }
    lines.push(String::new());

    lines.push("webhooks:".into());
    for url in &config.webhooks {
        lines.push(format!("  - \"{url}\""));
    }

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
