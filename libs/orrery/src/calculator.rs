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

//! Position, rise/transit/set, and noon-lunar-age for an `(observer, body)`
//! pair.

use crate::ephemeris::{BodyKind, BodyState, EphemerisError, KeplerianEphemeris, ObserverState};
use chrono::{prelude::*, Duration};

/// Outcome of a rise/transit/set query. `value_deg` is azimuth for
/// rise/set, altitude for transit.
#[derive(Debug, Clone, Copy)]
pub enum RiseSetEvent {
    At { time: DateTime<Utc>, value_deg: f64 },
    AlwaysUp,
    NeverUp,
    Unknown,
}

pub struct Calculator<'a> {
    eph: &'a KeplerianEphemeris,
}

impl<'a> Calculator<'a> {
    pub fn new(eph: &'a KeplerianEphemeris) -> Self {
        Self { eph }
    }

    /// Current position, mutating nothing but reading `observer.date` as
    /// given by the caller (the evaluator is responsible for setting it
    /// before calling).
    pub fn position(&self, observer: &ObserverState, kind: BodyKind) -> Result<BodyState, EphemerisError> {
        self.eph.compute(kind, observer)
    }

    /// The UTC instant corresponding to 00:00 local time (offset `tz_hours`)
    /// on `observer.date`'s local calendar day.
    pub fn local_midnight(&self, observer_date: DateTime<Utc>, tz_hours: f64) -> DateTime<Utc> {
        let local = observer_date + Duration::seconds((tz_hours * 3600.0) as i64);
        let local_midnight_naive = local.date_naive().and_hms_opt(0, 0, 0).unwrap();
        DateTime::<Utc>::from_naive_utc_and_offset(local_midnight_naive, Utc)
            - Duration::seconds((tz_hours * 3600.0) as i64)
    }

    /// `date_of_local_noon_in_utc = local_midnight + 12h - Tz*3600s`
    pub fn local_noon_in_utc(&self, observer_date: DateTime<Utc>, tz_hours: f64) -> DateTime<Utc> {
        self.local_midnight(observer_date, tz_hours) + Duration::hours(12)
            - Duration::seconds((tz_hours * 3600.0) as i64)
    }

    /// `noon_lunar_age = local_noon_in_utc - previous_new_moon(local_noon_in_utc)`
    pub fn noon_lunar_age(&self, observer_date: DateTime<Utc>, tz_hours: f64) -> Duration {
        let noon = self.local_noon_in_utc(observer_date, tz_hours);
        noon - self.eph.previous_new_moon(noon)
    }

    pub fn lunar_age(&self, at: DateTime<Utc>) -> Duration {
        at - self.eph.previous_new_moon(at)
    }

    fn event(&self, outcome: Result<DateTime<Utc>, EphemerisError>, observer: &ObserverState, kind: BodyKind, read_altitude: bool) -> RiseSetEvent {
        match outcome {
            Ok(time) => {
                let at_event = ObserverState { date: time, ..*observer };
                match self.eph.compute(kind, &at_event) {
                    Ok(state) => RiseSetEvent::At {
                        time,
                        value_deg: if read_altitude { state.alt_deg } else { state.az_deg },
                    },
                    Err(_) => RiseSetEvent::Unknown,
                }
            }
            Err(EphemerisError::AlwaysUp(_)) => RiseSetEvent::AlwaysUp,
            Err(EphemerisError::NeverUp(_)) => RiseSetEvent::NeverUp,
            Err(_) => RiseSetEvent::Unknown,
        }
    }

    pub fn next_rise(&self, observer: &ObserverState, kind: BodyKind) -> RiseSetEvent {
        self.event(self.eph.next_rising(observer, kind), observer, kind, false)
    }

    pub fn next_transit(&self, observer: &ObserverState, kind: BodyKind) -> RiseSetEvent {
        self.event(self.eph.next_transit(observer, kind), observer, kind, true)
    }

    pub fn next_set(&self, observer: &ObserverState, kind: BodyKind) -> RiseSetEvent {
        self.event(self.eph.next_setting(observer, kind), observer, kind, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_midnight_round_trips_to_same_calendar_day() {
        let eph = KeplerianEphemeris::new();
        let calc = Calculator::new(&eph);
        let date = Utc.with_ymd_and_hms(2026, 1, 21, 20, 0, 0).unwrap();
        let midnight = calc.local_midnight(date, 9.0);
        let local = midnight + Duration::hours(9);
        assert_eq!(local.hour(), 0);
        assert_eq!(local.minute(), 0);
    }
}
