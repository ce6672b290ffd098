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

//! The unified result type of every expression: a closed, tagged value
//! with arithmetic restricted to `impl_add`/`impl_multiply`/… on a single
//! match per operator, erroring on any shape mismatch rather than
//! coercing.

use crate::error::DslError;
use crate::ir::CompareOp;
use chrono::{DateTime, Datelike, Timelike, Utc};
use ordered_float::OrderedFloat;
use orrery::{BodyKind, BodyState, EclipseEvent};
use std::fmt;

/// A geodetic station with a reference time and atmosphere. Also doubles
/// as a "Mountain" — same shape, no atmosphere, flagged so the arrow
/// dispatcher and formatter can tell the two apart.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverValue {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub elev_m: f64,
    pub date: DateTime<Utc>,
    pub pressure_mbar: f64,
    pub temp_celsius: f64,
    pub is_mountain: bool,
}

impl ObserverValue {
    pub fn new(lat_deg: f64, lon_deg: f64, elev_m: f64, date: DateTime<Utc>) -> Self {
        Self {
            lat_rad: lat_deg.to_radians(),
            lon_rad: lon_deg.to_radians(),
            elev_m,
            date,
            pressure_mbar: 1010.0,
            temp_celsius: 15.0,
            is_mountain: false,
        }
    }

    pub fn mountain(lat_deg: f64, lon_deg: f64, elev_m: f64, date: DateTime<Utc>) -> Self {
        Self {
            pressure_mbar: 0.0,
            is_mountain: true,
            ..Self::new(lat_deg, lon_deg, elev_m, date)
        }
    }

    /// A fixed observer at Earth's geocentre, used for `env.Earth` (an
    /// auxiliary for eclipse search, distinct from the reserved `Body`
    /// named Earth — see DESIGN.md's Open Questions).
    pub fn geocentric(date: DateTime<Utc>) -> Self {
        Self {
            lat_rad: 0.0,
            lon_rad: 0.0,
            elev_m: -orrery::EARTH_RADIUS_M,
            date,
            pressure_mbar: 0.0,
            temp_celsius: 15.0,
            is_mountain: false,
        }
    }

    pub fn geodetic(&self) -> geodesy::Geodetic {
        geodesy::Geodetic::new(self.lat_rad, self.lon_rad, self.elev_m)
    }

    pub fn state(&self, date: DateTime<Utc>) -> orrery::ObserverState {
        orrery::ObserverState {
            lat_rad: self.lat_rad,
            lon_rad: self.lon_rad,
            elev_m: self.elev_m,
            date,
            pressure_mbar: self.pressure_mbar,
            temp_celsius: self.temp_celsius,
        }
    }
}

/// A celestial body with identity and the most recently computed state.
/// The cache is only ever trusted immediately after a compute — nothing
/// here reads it without the calculator having just written it.
#[derive(Debug, Clone)]
pub struct BodyValue {
    pub kind: BodyKind,
    pub cached: Option<BodyState>,
    pub cached_at: Option<DateTime<Utc>>,
}

impl BodyValue {
    pub fn new(kind: BodyKind) -> Self {
        Self {
            kind,
            cached: None,
            cached_at: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Transient product of `Sun -> Observer`, existing only to make
/// `Sun -> Observer -> Moon` a pair of terminal arrow dispatches.
#[derive(Debug, Clone)]
pub struct EarthContextValue {
    pub observer: Box<ObserverValue>,
    pub sun: Box<BodyValue>,
    pub moon: Box<BodyValue>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Number(OrderedFloat<f64>),
    String(String),
    Date(DateTime<Utc>),
    Observer(ObserverValue),
    Body(BodyValue),
    EarthContext(EarthContextValue),
    EclipseResult(Vec<EclipseEvent>),
}

impl Value {
    pub fn number(n: f64) -> Self {
        Value::Number(OrderedFloat(n))
    }

    pub fn bool(b: bool) -> Self {
        Value::number(if b { 1.0 } else { 0.0 })
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Date(_) => "a date",
            Value::Observer(_) => "an observer",
            Value::Body(_) => "a body",
            Value::EarthContext(_) => "an earth-context",
            Value::EclipseResult(_) => "an eclipse result",
        }
    }

    /// `var.attr` dot access: missing attribute reads as `0`, never an
    /// error — only an unknown *name* (no such variable/body) is an
    /// error.
    pub fn attr(&self, name: &str) -> Value {
        match self {
            Value::Observer(o) => match name {
                "lat" => Value::number(o.lat_rad.to_degrees()),
                "lon" => Value::number(o.lon_rad.to_degrees()),
                "elev" => Value::number(o.elev_m),
                "pressure" => Value::number(o.pressure_mbar),
                "temp" => Value::number(o.temp_celsius),
                "date" => Value::Date(o.date),
                _ => Value::number(0.0),
            },
            Value::Body(b) => match &b.cached {
                None => Value::number(0.0),
                Some(state) => match name {
                    "alt" => Value::number(state.alt_deg),
                    "az" => Value::number(state.az_deg),
                    "distance" => Value::number(state.earth_distance_au),
                    "phase" => Value::number(state.phase_pct.unwrap_or(0.0)),
                    "diameter" => Value::number(state.size_arcsec / 60.0),
                    "size" => Value::number(state.size_arcsec),
                    "magnitude" => Value::number(state.magnitude.unwrap_or(0.0)),
                    "hlon" => Value::number(state.hlon_deg),
                    "hlat" => Value::number(state.hlat_deg),
                    _ => Value::number(0.0),
                },
            },
            Value::Date(d) => match name {
                "year" => Value::number(d.year() as f64),
                "month" => Value::number(d.month() as f64),
                "day" => Value::number(d.day() as f64),
                "hour" => Value::number(d.hour() as f64),
                "minute" => Value::number(d.minute() as f64),
                "second" => Value::number(d.second() as f64),
                _ => Value::number(0.0),
            },
            Value::EclipseResult(events) => match name {
                "count" => Value::number(events.len() as f64),
                _ => Value::number(0.0),
            },
            Value::String(_) | Value::EarthContext(_) => Value::number(0.0),
        }
    }

    pub fn negate(self) -> Result<Value, DslError> {
        match self {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(DslError::TypeMismatch(format!(
                "cannot negate {}",
                other.type_name()
            ))),
        }
    }

    pub fn compare(&self, op: &CompareOp, other: &Value) -> Result<Value, DslError> {
        let ordering = match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            _ => {
                return Err(DslError::TypeMismatch(format!(
                    "cannot compare {} and {}",
                    self.type_name(),
                    other.type_name()
                )))
            }
        };
        let ordering = ordering.ok_or_else(|| DslError::TypeMismatch("values are not comparable".into()))?;
        let result = match op {
            CompareOp::Gt => ordering == std::cmp::Ordering::Greater,
            CompareOp::Lt => ordering == std::cmp::Ordering::Less,
            CompareOp::Eq => ordering == std::cmp::Ordering::Equal,
            CompareOp::Ne => ordering != std::cmp::Ordering::Equal,
        };
        Ok(Value::bool(result))
    }

    pub fn impl_add(self, other: Self) -> Result<Self, DslError> {
        match self {
            Value::Number(lhs) => match other {
                Value::Number(rhs) => Ok(Value::Number(lhs + rhs)),
                other => Err(DslError::TypeMismatch(format!("cannot add {} to a number", other.type_name()))),
            },
            Value::String(lhs) => match other {
                Value::String(rhs) => Ok(Value::String(lhs + &rhs)),
                other => Err(DslError::TypeMismatch(format!("cannot add {} to a string", other.type_name()))),
            },
            other => Err(DslError::TypeMismatch(format!("cannot do arithmetic on {}", other.type_name()))),
        }
    }

    pub fn impl_subtract(self, other: Self) -> Result<Self, DslError> {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => Ok(Value::Number(lhs - rhs)),
            (lhs, rhs) => Err(DslError::TypeMismatch(format!(
                "cannot subtract {} from {}",
                rhs.type_name(),
                lhs.type_name()
            ))),
        }
    }

    pub fn impl_multiply(self, other: Self) -> Result<Self, DslError> {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => Ok(Value::Number(lhs * rhs)),
            (lhs, rhs) => Err(DslError::TypeMismatch(format!(
                "cannot multiply {} by {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        }
    }

    pub fn impl_divide(self, other: Self) -> Result<Self, DslError> {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => {
                if rhs.0 == 0.0 {
                    Err(DslError::TypeMismatch("division by zero".into()))
                } else {
                    Ok(Value::Number(lhs / rhs))
                }
            }
            (lhs, rhs) => Err(DslError::TypeMismatch(format!(
                "cannot divide {} by {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        }
    }

    pub fn impl_pow(self, other: Self) -> Result<Self, DslError> {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => Ok(Value::Number(OrderedFloat(lhs.0.powf(rhs.0)))),
            (lhs, rhs) => Err(DslError::TypeMismatch(format!(
                "cannot raise {} to the power of {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n.0),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y/%m/%d %H:%M:%S")),
            Value::Observer(o) => write!(
                f,
                "{}(lat={:.4}, lon={:.4}, elev={:.1})",
                if o.is_mountain { "Mountain" } else { "Observer" },
                o.lat_rad.to_degrees(),
                o.lon_rad.to_degrees(),
                o.elev_m
            ),
            Value::Body(b) => write!(f, "{}", b.name()),
            Value::EarthContext(_) => write!(f, "<earth-context>"),
            Value::EclipseResult(events) => write!(f, "<{} eclipse event(s)>", events.len()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_numbers() {
        let a = Value::number(2.0);
        let b = Value::number(3.0);
        assert_eq!(a.impl_add(b).unwrap(), Value::number(5.0));
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        let a = Value::number(1.0);
        let b = Value::number(0.0);
        assert!(a.impl_divide(b).is_err());
    }

    #[test]
    fn adding_number_to_string_is_a_type_mismatch() {
        let a = Value::String("x".to_owned());
        let b = Value::number(1.0);
        assert!(a.impl_add(b).is_err());
    }

    #[test]
    fn missing_attribute_reads_as_zero() {
        let body = Value::Body(BodyValue::new(BodyKind::Mars));
        assert_eq!(body.attr("alt"), Value::number(0.0));
        assert_eq!(body.attr("nonsense"), Value::number(0.0));
    }

    #[test]
    fn compare_numbers() {
        let a = Value::number(2.0);
        let b = Value::number(3.0);
        assert_eq!(a.compare(&CompareOp::Lt, &b).unwrap(), Value::bool(true));
        assert_eq!(a.compare(&CompareOp::Gt, &b).unwrap(), Value::bool(false));
    }
}
