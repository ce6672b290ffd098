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

//! Renders positions, rise/transit/set tables, inter-location geometry,
//! and eclipse listings for the terminal, including sentinel handling
//! (`always up`, `never up`, `--:-- (none)`) for events that never occur.

use chrono::{DateTime, Duration, Utc};
use crate::environment::Environment;
use crate::value::{BodyValue, ObserverValue};
use orrery::{Calculator, EclipseEvent, EclipseKind, KeplerianEphemeris, RiseSetEvent};

/// Every stored instant is UTC; the formatter is the I/O boundary (spec
/// §3 "conversion happens only at the I/O boundary"), so displayed times
/// are shifted by `env.Tz` here, not before.
fn to_local(t: DateTime<Utc>, tz_hours: f64) -> DateTime<Utc> {
    t + Duration::seconds((tz_hours * 3600.0) as i64)
}

pub fn print_position(
    env: &Environment,
    observer: &ObserverValue,
    body: &BodyValue,
    calc: &Calculator,
    eph: &KeplerianEphemeris,
) {
    let state = match &body.cached {
        Some(s) => s,
        None => return,
    };

    println!(
        "{} [{:+}]",
        to_local(observer.date, env.tz_hours).format("%Y/%m/%d %H:%M:%S"),
        env.tz_hours as i64
    );
    println!(
        "  observer lat={:.4} lon={:.4} elev={:.1}m",
        observer.lat_rad.to_degrees(),
        observer.lon_rad.to_degrees(),
        observer.elev_m
    );

    let compass = geodesy::compass_label(state.az_deg, env.direction_bins);
    println!(
        "  {:<10} az={:7.2} ({:<3})  alt={:7.2}  dist={:.6} AU",
        body.name(),
        state.az_deg,
        compass,
        state.alt_deg,
        state.earth_distance_au
    );

    if let Some(phase) = state.phase_pct {
        let age = calc.lunar_age(observer.date);
        let noon_age = calc.noon_lunar_age(observer.date, env.tz_hours);
        println!(
            "    phase={:.1}%  age={:.1}d  diameter={:.1}'  noon_age={:.1}d",
            phase,
            age.num_seconds() as f64 / 86_400.0,
            state.size_arcsec / 60.0,
            noon_age.num_seconds() as f64 / 86_400.0,
        );
    } else if matches!(body.kind, orrery::BodyKind::Sun) {
        println!("    diameter={:.1}'", state.size_arcsec / 60.0);
    } else {
        let (abbrev, name) = eph.constellation(state.hlon_deg);
        let magnitude = state.magnitude.unwrap_or(0.0);
        println!("    magnitude={:.1}  constellation={} ({})", magnitude, abbrev, name);
    }

    let observer_state = observer.state(observer.date);
    print_event("rise", calc.next_rise(&observer_state, body.kind), env.tz_hours);
    print_event("transit", calc.next_transit(&observer_state, body.kind), env.tz_hours);
    print_event("set", calc.next_set(&observer_state, body.kind), env.tz_hours);
}

fn print_event(label: &str, event: RiseSetEvent, tz_hours: f64) {
    match event {
        RiseSetEvent::At { time, value_deg } => {
            println!(
                "    {:<8}{} ({:.2} deg)",
                label,
                to_local(time, tz_hours).format("%H:%M:%S"),
                value_deg
            )
        }
        RiseSetEvent::AlwaysUp => println!("    {:<8}always up", label),
        RiseSetEvent::NeverUp => println!("    {:<8}never up", label),
        RiseSetEvent::Unknown => println!("    {:<8}--:-- (none)", label),
    }
}

pub fn print_geometry(env: &Environment, bearing: &geodesy::Bearing) {
    let compass = geodesy::compass_label(bearing.azimuth_deg, env.direction_bins);
    println!(
        "distance={:.2} km  azimuth={:.2} ({})  elevation={:.2} deg",
        bearing.distance_m / 1000.0,
        bearing.azimuth_deg,
        compass,
        bearing.elevation_deg
    );
}

pub fn print_eclipses(events: &[EclipseEvent]) {
    if events.is_empty() {
        println!("no lunar eclipses found in the requested window");
        return;
    }
    for event in events {
        let emoji = match event.kind {
            EclipseKind::Total => "\u{1F311}",
            EclipseKind::Partial => "\u{1F312}",
            EclipseKind::Penumbral => "\u{1F315}",
        };
        let begin = format_opt_time(event.begin);
        let end = format_opt_time(event.end);
        println!(
            "{} {} begin={} max={} end={} mag={:.3} alt={:.1} sep={:.4} {}",
            event.candidate_date.format("%Y/%m/%d"),
            emoji,
            begin,
            event.max_instant.format("%H:%M:%S"),
            end,
            event.magnitude,
            event.moon_altitude_at_full_deg,
            event.coarse_separation_rad,
            kind_label(event.kind),
        );
    }
}

fn format_opt_time(t: Option<chrono::DateTime<chrono::Utc>>) -> String {
    t.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_else(|| "--:-- (none)".to_owned())
}

fn kind_label(kind: EclipseKind) -> &'static str {
    match kind {
        EclipseKind::Total => "total",
        EclipseKind::Partial => "partial",
        EclipseKind::Penumbral => "penumbral",
    }
}
