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

//! Named variable/body slots, the env configuration table, and the
//! reserved-name policy, expressed as two closed tables (env keys,
//! reserved body names) the setters route on.

use crate::error::DslError;
use crate::value::{ObserverValue, Value};
use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use orrery::{BodyKind, RESERVED_BODY_NAMES};
use std::collections::HashMap;

const ENV_KEYS: &[&str] = &["Tz", "Echo", "Log", "Time", "Direction", "Here", "Chokai", "Earth"];

pub struct Environment {
    variables: HashMap<String, Value>,
    bodies: HashMap<String, Value>,
    /// Per-statement transient parameters; cleared by `reset_hints`
    /// before every top-level statement.
    pub observer_hints: HashMap<String, Value>,

    pub tz_hours: f64,
    pub echo: bool,
    pub log_level: String,
    pub time: DateTime<Utc>,
    pub direction_bins: u32,
    pub here: ObserverValue,
    pub chokai: ObserverValue,
    pub earth: ObserverValue,

    /// `Here` as loaded from the configuration file at boot; `Home()`
    /// restores to this rather than any other state (DESIGN.md Open
    /// Questions #1).
    home_default: ObserverValue,
}

impl Environment {
    pub fn new(now: DateTime<Utc>) -> Self {
        let here = ObserverValue::new(0.0, 0.0, 0.0, now);
        Self {
            variables: HashMap::new(),
            bodies: HashMap::new(),
            observer_hints: HashMap::new(),
            tz_hours: 9.0,
            echo: true,
            log_level: "No".to_owned(),
            time: now,
            direction_bins: 16,
            home_default: here.clone(),
            here,
            chokai: ObserverValue::new(0.0, 0.0, 0.0, now),
            earth: ObserverValue::geocentric(now),
        }
    }

    /// Called once at boot after the configuration file is loaded, so
    /// `Home()` restores to the configured station rather than (0,0,0).
    pub fn set_home_default(&mut self, observer: ObserverValue) {
        self.home_default = observer.clone();
        self.here = observer;
    }

    pub fn home_default(&self) -> &ObserverValue {
        &self.home_default
    }

    pub fn reset_hints(&mut self) {
        self.observer_hints.clear();
    }

    pub fn get_variable(&self, name: &str) -> Value {
        self.variables.get(name).cloned().unwrap_or_else(|| Value::number(0.0))
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_owned(), value);
    }

    /// Resolution order: env keys, then `Now`, then a stored body, then an
    /// auto-registered default ephemeris object on first reference to a
    /// recognised name; unknown names are an error.
    pub fn get_body(&mut self, name: &str) -> Result<Value, DslError> {
        if let Some(v) = self.get_env(name) {
            return Ok(v);
        }
        if name == "Now" {
            return Ok(Value::Date(Utc::now()));
        }
        if let Some(existing) = self.bodies.get(name) {
            return Ok(existing.clone());
        }
        if let Some(kind) = BodyKind::from_name(name) {
            let value = Value::Body(crate::value::BodyValue::new(kind));
            self.bodies.insert(name.to_owned(), value.clone());
            return Ok(value);
        }
        Err(DslError::UnknownName(name.to_owned()))
    }

    /// Env keys route to validating setters; reserved names are rejected
    /// outright; everything else is stored verbatim.
    pub fn set_body(&mut self, name: &str, value: Value) -> Result<(), DslError> {
        if ENV_KEYS.contains(&name) {
            return self.set_env(name, value);
        }
        if RESERVED_BODY_NAMES.contains(&name) {
            return Err(DslError::ReservedName(name.to_owned()));
        }
        self.bodies.insert(name.to_owned(), value);
        Ok(())
    }

    fn get_env(&self, name: &str) -> Option<Value> {
        Some(match name {
            "Tz" => Value::number(self.tz_hours),
            "Echo" => Value::String(if self.echo { "Yes" } else { "No" }.to_owned()),
            "Log" => Value::String(self.log_level.clone()),
            "Time" => Value::Date(self.time),
            "Direction" => Value::number(self.direction_bins as f64),
            "Here" => Value::Observer(self.here.clone()),
            "Chokai" => Value::Observer(self.chokai.clone()),
            "Earth" => Value::Observer(self.earth.clone()),
            _ => return None,
        })
    }

    fn set_env(&mut self, name: &str, value: Value) -> Result<(), DslError> {
        match name {
            "Tz" => {
                let v = as_number(&value)?;
                if !(-12.0..=14.0).contains(&v) {
                    return Err(DslError::OutOfRange(format!("Tz must be in [-12.0, 14.0], got {}", v)));
                }
                self.tz_hours = v;
            }
            "Direction" => {
                let v = as_number(&value)? as i64;
                if v != 4 && v != 8 && v != 16 {
                    return Err(DslError::OutOfRange(format!("Direction must be 4, 8, or 16, got {}", v)));
                }
                self.direction_bins = v as u32;
            }
            "Here" => match value {
                Value::Observer(o) => self.here = o,
                other => return Err(DslError::TypeMismatch(format!("Here must be assigned an Observer, got {}", other))),
            },
            "Chokai" => match value {
                Value::Observer(o) => self.chokai = o,
                other => return Err(DslError::TypeMismatch(format!("Chokai must be assigned an Observer, got {}", other))),
            },
            "Earth" => match value {
                Value::Observer(o) => self.earth = o,
                other => return Err(DslError::TypeMismatch(format!("Earth must be assigned an Observer, got {}", other))),
            },
            "Time" => match value {
                Value::Date(d) => self.time = d,
                other => return Err(DslError::TypeMismatch(format!("Time must be assigned a Date, got {}", other))),
            },
            "Echo" => self.echo = normalize_yes_no(&value),
            "Log" => self.log_level = normalize_log(&value),
            _ => unreachable!("set_env called with a non-env key"),
        }
        Ok(())
    }
}

fn as_number(v: &Value) -> Result<f64, DslError> {
    match v {
        Value::Number(n) => Ok(n.0),
        other => Err(DslError::TypeMismatch(format!("expected a number, got {}", other))),
    }
}

fn normalize_yes_no(v: &Value) -> bool {
    match v {
        Value::Number(n) => n.0 != 0.0,
        Value::String(s) => !matches!(s.to_lowercase().as_str(), "0" | "off" | "false" | "no"),
        _ => true,
    }
}

fn normalize_log(v: &Value) -> String {
    match v {
        Value::Number(n) => if n.0 != 0.0 { "Yes" } else { "No" }.to_owned(),
        Value::String(s) => {
            let lower = s.to_lowercase();
            if matches!(lower.as_str(), "0" | "off" | "false" | "no") {
                "No".to_owned()
            } else if matches!(lower.as_str(), "1" | "on" | "true" | "yes") {
                "Yes".to_owned()
            } else {
                s.clone()
            }
        }
        _ => "Yes".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn env() -> Environment {
        Environment::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn tz_out_of_range_is_rejected_and_unchanged() {
        let mut e = env();
        let before = e.tz_hours;
        assert!(e.set_body("Tz", Value::number(14.01)).is_err());
        assert_eq!(e.tz_hours, before);
        assert!(e.set_body("Tz", Value::number(14.0)).is_ok());
        assert!(e.set_body("Tz", Value::number(-12.0)).is_ok());
    }

    #[test]
    fn direction_must_be_4_8_or_16() {
        let mut e = env();
        assert!(e.set_body("Direction", Value::number(5.0)).is_err());
        assert!(e.set_body("Direction", Value::number(8.0)).is_ok());
        assert_eq!(e.direction_bins, 8);
    }

    #[test]
    fn reserved_names_cannot_be_assigned() {
        let mut e = env();
        assert!(e.set_body("Moon", Value::number(1.0)).is_err());
        // Moon still resolves to the default lunar ephemeris body.
        assert!(matches!(e.get_body("Moon").unwrap(), Value::Body(_)));
    }

    #[test]
    fn observer_hints_start_empty_and_reset_clears_them() {
        let mut e = env();
        assert!(e.observer_hints.is_empty());
        e.observer_hints.insert("Moon".to_owned(), Value::number(3.0));
        e.reset_hints();
        assert!(e.observer_hints.is_empty());
    }

    #[test]
    fn echo_normalizes_falsy_strings() {
        let mut e = env();
        e.set_body("Echo", Value::String("off".to_owned())).unwrap();
        assert!(!e.echo);
        e.set_body("Echo", Value::String("Yes".to_owned())).unwrap();
        assert!(e.echo);
    }
}
