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

/**
 * Orbital mechanics works great. Time, however, does not. The time reference for ephimeris is a
 * position on a spinning thing, whose period drifts human observable amounts over human relevant
 * timespans. To complicate matters further, that spinning thing is itself tidally locked to a mass
 * called the moon, which means that the celestially relevant orbital parameters have to be
 * specified around the "barycenter", rather than about the center of spin. So if one wants to use
 * J2000 to find the relative position of planets, one needs to subtract leap seconds, but if one
 * wants the locally relevant spin position of a planet, one must not subtract leap seconds.
 *
 * The name orrery was chosen for this module to put people in mind of the tiny and obviously
 * inaccurate physical solar system models built with gears: that is ultimately how this module
 * works, a hack that gives a flavor of the real thing without trying too hard.
 */
pub mod calculator;
pub mod eclipse;
mod elements;
pub mod ephemeris;
mod lunar;

pub use calculator::{Calculator, RiseSetEvent};
pub use eclipse::{search_lunar_eclipses, EclipseEvent, EclipseKind};
pub use ephemeris::{
    centuries_from_j2000, BodyKind, BodyState, EphemerisError, KeplerianEphemeris, ObserverState,
    EARTH_RADIUS_M, METERS_PER_AU, RESERVED_BODY_NAMES,
};
