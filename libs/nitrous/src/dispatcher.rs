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

//! Pattern-match dispatch on evaluated arrow operands: a closed sum-type
//! match rather than a chain of runtime type checks. Also carries the
//! `Body -> Mountain` occlusion check.

use crate::environment::Environment;
use crate::error::DslError;
use crate::formatter;
use crate::value::{BodyValue, EarthContextValue, ObserverValue, Value};
use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use orrery::{BodyKind, Calculator, KeplerianEphemeris};

const DEFAULT_ECLIPSE_SEARCH_YEARS: f64 = 5.0;

/// Bearing tolerance for the mountain-occlusion plausibility check: how
/// close a body's azimuth must be to the mountain's bearing before its
/// altitude is even worth comparing to the summit's silhouette.
const MOUNTAIN_BEARING_TOLERANCE_DEG: f64 = 5.0;

pub fn dispatch(env: &mut Environment, lhs: Value, rhs: Value) -> Result<Value, DslError> {
    match (lhs, rhs) {
        (Value::Observer(observer), Value::Body(body)) => observer_to_body(env, observer, body),
        (Value::Body(body), Value::Observer(mountain)) if mountain.is_mountain => {
            body_mountain_overlap(env, body, mountain)
        }
        (Value::Observer(a), Value::Observer(b)) => observer_to_observer(env, a, b),
        (Value::Body(a), Value::Body(b)) => body_to_body(env, a, b),
        (Value::Body(sun), Value::Observer(observer)) if sun.kind == BodyKind::Sun => {
            sun_to_observer(env, observer)
        }
        (Value::EarthContext(ctx), Value::Body(moon)) if moon.kind == BodyKind::Moon => {
            earth_context_to_moon(env, ctx)
        }
        (l, r) => Err(DslError::TypeMismatch(format!(
            "Invalid arrow operation: {} -> {}",
            l, r
        ))),
    }
}

fn hinted_date(env: &Environment, name: &str) -> DateTime<Utc> {
    match env.observer_hints.get(name) {
        Some(Value::Date(d)) => *d,
        _ => env.time,
    }
}

/// `Observer -> Body`: terminal. Computes the body at the observer's date
/// and prints the position/event table.
fn observer_to_body(env: &mut Environment, mut observer: ObserverValue, mut body: BodyValue) -> Result<Value, DslError> {
    observer.date = hinted_date(env, body.name());

    let eph = KeplerianEphemeris::new();
    let calc = Calculator::new(&eph);
    let observer_state = observer.state(observer.date);
    let state = calc.position(&observer_state, body.kind)?;
    body.cached = Some(state);
    body.cached_at = Some(observer.date);

    formatter::print_position(env, &observer, &body, &calc, &eph);

    Ok(Value::Body(body))
}

/// `Observer -> Observer`: terminal. Prints inter-location geometry and
/// returns the distance in kilometres.
fn observer_to_observer(env: &Environment, a: ObserverValue, b: ObserverValue) -> Result<Value, DslError> {
    let bearing = geodesy::bearing(a.geodetic(), b.geodetic());
    formatter::print_geometry(env, &bearing);
    Ok(Value::Number(OrderedFloat(bearing.distance_m / 1000.0)))
}

/// `Body -> Mountain`: terminal. Reports the bearing from `env.Here` to
/// the mountain and the mountain summit's angular height as seen from
/// there, then flags whether the body's last-computed azimuth and
/// altitude (from an earlier `Here -> Body`) plausibly place it behind
/// the summit's silhouette, using the same ECEF bearing formula as the
/// inter-location geometry.
fn body_mountain_overlap(env: &Environment, body: BodyValue, mountain: ObserverValue) -> Result<Value, DslError> {
    let state = body.cached.ok_or_else(|| {
        DslError::TypeMismatch(format!(
            "{} has no cached position yet; observe it first with e.g. Here -> {}",
            body.name(),
            body.name()
        ))
    })?;
    let bearing = geodesy::bearing(env.here.geodetic(), mountain.geodetic());
    let az_diff = geodesy::angle_diff_deg(state.az_deg, bearing.azimuth_deg);
    let occluded = az_diff.abs() < MOUNTAIN_BEARING_TOLERANCE_DEG && state.alt_deg <= bearing.elevation_deg;
    let text = format!(
        "Mountain bearing={:.2} deg summit_elevation={:.2} deg; {} az={:.2} alt={:.2}; occlusion {}",
        bearing.azimuth_deg,
        bearing.elevation_deg,
        body.name(),
        state.az_deg,
        state.alt_deg,
        if occluded { "likely" } else { "unlikely" },
    );
    println!("{}", text);
    Ok(Value::String(text))
}

/// `Body -> Body`: terminal. Angular separation at `env.Here`'s date.
fn body_to_body(env: &Environment, a: BodyValue, b: BodyValue) -> Result<Value, DslError> {
    let eph = KeplerianEphemeris::new();
    let sep_deg = eph.separation(a.kind, b.kind, env.here.date).to_degrees();
    let text = format!("{} - {} separation: {:.2} deg", a.name(), b.name(), sep_deg);
    println!("{}", text);
    Ok(Value::String(text))
}

/// `Sun -> Observer`: intermediate. Yields an `EarthContext` so the next
/// arrow in the chain (`-> Moon`) can run the eclipse search.
fn sun_to_observer(env: &Environment, mut observer: ObserverValue) -> Result<Value, DslError> {
    observer.date = hinted_date(env, "Sun");
    Ok(Value::EarthContext(EarthContextValue {
        observer: Box::new(observer),
        sun: Box::new(BodyValue::new(BodyKind::Sun)),
        moon: Box::new(BodyValue::new(BodyKind::Moon)),
    }))
}

/// `EarthContext -> Moon`: terminal. Runs the lunar-eclipse search over
/// `observer_hints["Moon"] ?? 5` years and prints one line per event.
fn earth_context_to_moon(env: &mut Environment, ctx: EarthContextValue) -> Result<Value, DslError> {
    let period_years = match env.observer_hints.get("Moon") {
        Some(Value::Number(n)) => n.0,
        _ => DEFAULT_ECLIPSE_SEARCH_YEARS,
    };
    let place = env
        .observer_hints
        .keys()
        .next()
        .cloned()
        .unwrap_or_else(|| "here".to_owned());

    let eph = KeplerianEphemeris::new();
    let surface = ctx.observer.state(ctx.observer.date);
    let events = orrery::search_lunar_eclipses(&eph, &surface, ctx.observer.date, period_years, &place);
    formatter::print_eclipses(&events);
    Ok(Value::EclipseResult(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery::BodyState;

    fn here_and_mountain() -> (Environment, ObserverValue) {
        let now = chrono::Utc::now();
        let mut env = Environment::new(now);
        env.here = ObserverValue::new(35.0, 139.0, 0.0, now);
        let mountain = ObserverValue::mountain(35.01, 139.0, 3776.0, now);
        (env, mountain)
    }

    #[test]
    fn uncached_body_reports_an_error_instead_of_guessing() {
        let (env, mountain) = here_and_mountain();
        let body = BodyValue::new(BodyKind::Mars);
        assert!(body_mountain_overlap(&env, body, mountain).is_err());
    }

    #[test]
    fn matching_bearing_and_low_altitude_is_flagged_as_likely_occluded() {
        let (env, mountain) = here_and_mountain();
        let bearing = geodesy::bearing(env.here.geodetic(), mountain.geodetic());
        let mut body = BodyValue::new(BodyKind::Mars);
        body.cached = Some(BodyState {
            az_deg: bearing.azimuth_deg,
            alt_deg: bearing.elevation_deg - 1.0,
            ..BodyState::default()
        });
        let result = body_mountain_overlap(&env, body, mountain).unwrap();
        assert!(matches!(result, Value::String(s) if s.contains("likely")));
    }

    #[test]
    fn far_off_bearing_is_not_occluded() {
        let (env, mountain) = here_and_mountain();
        let mut body = BodyValue::new(BodyKind::Mars);
        body.cached = Some(BodyState {
            az_deg: 270.0,
            alt_deg: 10.0,
            ..BodyState::default()
        });
        let result = body_mountain_overlap(&env, body, mountain).unwrap();
        assert!(matches!(result, Value::String(s) if s.contains("unlikely")));
    }
}
