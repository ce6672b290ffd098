// This file is part of Nitrogen.
//
// Nitrogen is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Nitrogen is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Nitrogen.  If not, see <http://www.gnu.org/licenses/>.

//! Configuration loader: a small INI-like file with an `[ENV]` section and
//! one section per well-known observer. No ecosystem INI crate fits a
//! three-section, handful-of-keys format, so this stays plain
//! line-oriented parsing rather than pulling in a crate for it.

use anyhow::{anyhow, Result};
use chrono::Utc;
use nitrous::ObserverValue;
use std::path::Path;

const DEFAULT_TZ_HOURS: f64 = 9.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub tz_hours: f64,
    pub log_level: String,
    pub echo: bool,
    pub here: (f64, f64, f64),
    pub chokai: (f64, f64, f64),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tz_hours: DEFAULT_TZ_HOURS,
            log_level: "No".to_owned(),
            echo: true,
            here: (0.0, 0.0, 0.0),
            chokai: (0.0, 0.0, 0.0),
        }
    }
}

impl Config {
    /// Load from `path`. A missing file is not an error — only a malformed
    /// file at an explicitly-given path is fatal — so callers should only
    /// invoke this after confirming the file exists, or catch the
    /// resulting io error themselves and fall back to `default()`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("could not read configuration file {}: {}", path.display(), e))?;
        Ok(Self::parse(&raw))
    }

    fn parse(raw: &str) -> Self {
        let mut config = Self::default();
        let mut section = String::new();

        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                section = name.to_owned();
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            config.apply(&section, key, value);
        }
        config
    }

    fn apply(&mut self, section: &str, key: &str, value: &str) {
        match (section, key) {
            ("ENV", "Tz") => match value.parse::<f64>() {
                Ok(v) if (-12.0..=14.0).contains(&v) => self.tz_hours = v,
                Ok(v) => {
                    log::warn!(
                        "configured Tz={} is out of range [-12.0, 14.0]; falling back to {}",
                        v,
                        DEFAULT_TZ_HOURS
                    );
                }
                Err(_) => log::warn!("could not parse Tz value '{}'; keeping default", value),
            },
            ("ENV", "Log") => self.log_level = value.to_owned(),
            ("ENV", "Echo") => self.echo = matches!(value.to_lowercase().as_str(), "yes" | "1" | "true" | "on"),
            ("Here", "lat") => self.here.0 = value.parse().unwrap_or(self.here.0),
            ("Here", "lon") => self.here.1 = value.parse().unwrap_or(self.here.1),
            ("Here", "elev") => self.here.2 = value.parse().unwrap_or(self.here.2),
            ("Chokai", "lat") => self.chokai.0 = value.parse().unwrap_or(self.chokai.0),
            ("Chokai", "lon") => self.chokai.1 = value.parse().unwrap_or(self.chokai.1),
            ("Chokai", "elev") => self.chokai.2 = value.parse().unwrap_or(self.chokai.2),
            _ => {}
        }
    }

    pub fn here_observer(&self) -> ObserverValue {
        ObserverValue::new(self.here.0, self.here.1, self.here.2, Utc::now())
    }

    pub fn chokai_observer(&self) -> ObserverValue {
        ObserverValue::new(self.chokai.0, self.chokai.1, self.chokai.2, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_and_keys() {
        let config = Config::parse(
            "; comment\n[ENV]\nTz = 5.5\nEcho = No\n\n[Here]\nlat=35.5\nlon=139.7\nelev=10\n",
        );
        assert_eq!(config.tz_hours, 5.5);
        assert!(!config.echo);
        assert_eq!(config.here, (35.5, 139.7, 10.0));
    }

    #[test]
    fn out_of_range_tz_falls_back_to_default_with_a_warning_not_an_error() {
        let config = Config::parse("[ENV]\nTz = 20.0\n");
        assert_eq!(config.tz_hours, DEFAULT_TZ_HOURS);
    }

    #[test]
    fn unknown_sections_and_keys_are_ignored() {
        let config = Config::parse("[Bogus]\nWhatever=1\n[ENV]\nMystery=2\n");
        assert_eq!(config.tz_hours, DEFAULT_TZ_HOURS);
    }
}
