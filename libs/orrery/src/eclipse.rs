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

//! Full-moon enumeration, coarse candidate filter, and fine-grained
//! timing/magnitude refinement, in two phases: a cheap coarse filter over
//! every candidate full moon, then a per-second scan around the survivors
//! to find begin/max/end and magnitude.

use crate::ephemeris::{BodyKind, EphemerisError, KeplerianEphemeris, ObserverState, EARTH_RADIUS_M};
use chrono::{prelude::*, Duration};

const ANGLE_LUNAR_ECLIPSE_RAD: f64 = 0.0262;
const LUNAR_ECLIPSE_SCALE_FACTOR: f64 = 51.0 / 50.0;
const MOONSET_ALTITUDE_DEG: f64 = -1.2;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EclipseKind {
    Total,
    Partial,
    Penumbral,
}

#[derive(Debug, Clone, Copy)]
pub struct EclipseEvent {
    pub candidate_date: DateTime<Utc>,
    pub coarse_separation_rad: f64,
    pub moon_altitude_at_full_deg: f64,
    pub kind: EclipseKind,
    pub max_instant: DateTime<Utc>,
    pub magnitude: f64,
    pub begin: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Per-sample state during fine-grained refinement.
struct Sample {
    time: DateTime<Utc>,
    magnitude: f64,
}

fn geocentric_auxiliary_observer(date: DateTime<Utc>) -> ObserverState {
    ObserverState {
        lat_rad: 0.0,
        lon_rad: 0.0,
        elev_m: -EARTH_RADIUS_M,
        date,
        pressure_mbar: 0.0,
        temp_celsius: 15.0,
    }
}

fn refine_sample(eph: &KeplerianEphemeris, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
    let observer = geocentric_auxiliary_observer(at);
    let sun = eph.compute(BodyKind::Sun, &observer)?;
    let moon = eph.compute(BodyKind::Moon, &observer)?;

    let r_s = sun.size_arcsec / 2.0;
    let r_m = moon.size_arcsec / 2.0;

    let p_s = (EARTH_RADIUS_M / (sun.earth_distance_au * crate::ephemeris::METERS_PER_AU))
        .to_degrees()
        * 3600.0;
    let p_m = (EARTH_RADIUS_M / (moon.earth_distance_au * crate::ephemeris::METERS_PER_AU))
        .to_degrees()
        * 3600.0;

    let r_u = (p_s + p_m - r_s) * LUNAR_ECLIPSE_SCALE_FACTOR;

    let sep_rad = eph.separation(BodyKind::Sun, BodyKind::Moon, at);
    let s_arcsec = ((sep_rad.to_degrees() - 180.0).abs()) * 3600.0;

    Ok((r_u + r_m - s_arcsec) / (2.0 * r_m))
}

/// Scan seconds from `full_moon - 2h` to `full_moon + 2h` (~14400 samples),
/// find the maximum-magnitude sample, and the begin/end zero-crossings.
fn refine(eph: &KeplerianEphemeris, full_moon: DateTime<Utc>) -> Option<(Sample, Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    let start = full_moon - Duration::hours(2);
    let total_seconds = 4 * 3600;

    let mut best: Option<Sample> = None;
    let mut begin: Option<DateTime<Utc>> = None;
    let mut end: Option<DateTime<Utc>> = None;
    let mut prev_positive = false;
    let mut seen_positive = false;

    for offset in 0..total_seconds {
        let t = start + Duration::seconds(offset);
        let magnitude = match refine_sample(eph, t) {
            Ok(m) => m,
            Err(_) => continue,
        };
        log::trace!("eclipse refinement sample t={} magnitude={:.4}", t, magnitude);

        if best.as_ref().map(|s| magnitude > s.magnitude).unwrap_or(true) {
            best = Some(Sample { time: t, magnitude });
        }

        let positive = magnitude > 0.0;
        if positive && begin.is_none() {
            begin = Some(t);
        }
        if seen_positive && !positive && prev_positive && end.is_none() {
            end = Some(t);
        }
        if positive {
            seen_positive = true;
        }
        prev_positive = positive;
    }

    best.map(|s| (s, begin, end))
}

fn classify(magnitude: f64) -> EclipseKind {
    if magnitude >= 1.0 {
        EclipseKind::Total
    } else if magnitude > 0.0 {
        EclipseKind::Partial
    } else {
        EclipseKind::Penumbral
    }
}

/// Search `period_years` years of full moons starting at `from`, returning
/// every candidate that survives the coarse angular-separation (and,
/// unless `place == "world"`, horizon) filter, each refined to
/// begin/max/end and a magnitude-based classification.
pub fn search_lunar_eclipses(
    eph: &KeplerianEphemeris,
    surface_observer: &ObserverState,
    from: DateTime<Utc>,
    period_years: f64,
    place: &str,
) -> Vec<EclipseEvent> {
    let mut events = Vec::new();
    let num_candidates = (12.0 * period_years).round() as usize;
    let mut cursor = from;

    for _ in 0..num_candidates {
        let full_moon = eph.next_full_moon(cursor);
        cursor = full_moon + Duration::hours(1);

        let sep = (eph.separation(BodyKind::Sun, BodyKind::Moon, full_moon) - std::f64::consts::PI).abs();
        if sep >= ANGLE_LUNAR_ECLIPSE_RAD * LUNAR_ECLIPSE_SCALE_FACTOR {
            continue;
        }

        let surface_at_full_moon = ObserverState { date: full_moon, ..*surface_observer };
        let moon_alt_deg = eph
            .compute(BodyKind::Moon, &surface_at_full_moon)
            .map(|s| s.alt_deg)
            .unwrap_or(f64::NAN);

        if place != "world" && moon_alt_deg < MOONSET_ALTITUDE_DEG {
            continue;
        }

        if let Some((best, begin, end)) = refine(eph, full_moon) {
            events.push(EclipseEvent {
                candidate_date: full_moon,
                coarse_separation_rad: sep,
                moon_altitude_at_full_deg: moon_alt_deg,
                kind: classify(best.magnitude),
                max_instant: best.time,
                magnitude: best.magnitude,
                begin,
                end,
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify(1.0), EclipseKind::Total);
        assert_eq!(classify(1.5), EclipseKind::Total);
        assert_eq!(classify(0.5), EclipseKind::Partial);
        assert_eq!(classify(0.0), EclipseKind::Penumbral);
        assert_eq!(classify(-0.2), EclipseKind::Penumbral);
    }
}
