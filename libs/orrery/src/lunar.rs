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

//! The Moon is not in the JPL low-precision planetary table (`elements.rs`):
//! that table only covers heliocentric bodies. This is a truncated
//! geocentric lunar theory (leading terms only, a handful of arcminutes of
//! error — adequate for this engine, since arbitrary-precision astronomy is
//! an explicit non-goal) giving ecliptic longitude, latitude and distance
//! directly, which is the standard shape for reduced lunar ephemerides.

use nalgebra::Point3;
use std::f64::consts::PI;

fn deg(x: f64) -> f64 {
    x.to_radians()
}

/// Returns (ecliptic longitude rad, ecliptic latitude rad, distance AU) of
/// the Moon, geocentric, at `centuries_from_j2000`.
pub fn geocentric_ecliptic(centuries_from_j2000: f64) -> (f64, f64, f64) {
    let t = centuries_from_j2000;

    // Mean longitude of the Moon.
    let l_prime = 218.316_4591 + 481_267.881_342_36 * t - 0.001_3268 * t * t;
    // Mean elongation of the Moon from the Sun.
    let d = 297.850_2042 + 445_267.111_5168 * t - 0.001_6300 * t * t;
    // Sun's mean anomaly.
    let m = 357.529_1092 + 35_999.050_2909 * t - 0.000_1536 * t * t;
    // Moon's mean anomaly.
    let m_prime = 134.963_4114 + 477_198.867_6313 * t + 0.008_9970 * t * t;
    // Moon's argument of latitude.
    let f = 93.272_0993 + 483_202.017_5273 * t - 0.003_4029 * t * t;

    let d = deg(d);
    let m = deg(m);
    let m_prime = deg(m_prime);
    let f = deg(f);

    // Leading periodic terms (coefficients in arcsec for longitude/latitude,
    // km for distance), truncated from the full ELP2000 series.
    let lon_corr = 6.288_774 * m_prime.sin()
        + 1.274_027 * (2.0 * d - m_prime).sin()
        + 0.658_314 * (2.0 * d).sin()
        + 0.213_618 * (2.0 * m_prime).sin()
        - 0.185_116 * m.sin()
        - 0.114_332 * (2.0 * f).sin()
        + 0.058_793 * (2.0 * d - 2.0 * m_prime).sin()
        + 0.057_066 * (2.0 * d - m - m_prime).sin()
        + 0.053_322 * (2.0 * d + m_prime).sin()
        + 0.045_758 * (2.0 * d - m).sin();

    let lat_corr = 5.128_122 * f.sin()
        + 0.280_602 * (m_prime + f).sin()
        + 0.277_693 * (m_prime - f).sin()
        + 0.173_237 * (2.0 * d - f).sin()
        + 0.055_413 * (2.0 * d + f - m_prime).sin();

    let dist_corr_km = -20_905.355 * m_prime.cos()
        - 3_699.111 * (2.0 * d - m_prime).cos()
        - 2_955.968 * (2.0 * d).cos()
        - 569.925 * (2.0 * m_prime).cos()
        + 48.888 * m.cos();

    let lon_deg = (l_prime + lon_corr).rem_euclid(360.0);
    let lat_deg = lat_corr;
    let distance_km = 385_000.56 + dist_corr_km;
    const AU_KM: f64 = 149_597_870.7;

    (deg(lon_deg), deg(lat_deg), distance_km / AU_KM)
}

/// Geocentric ecliptic cartesian position, in AU.
pub fn geocentric_position(centuries_from_j2000: f64) -> Point3<f64> {
    let (lon, lat, r) = geocentric_ecliptic(centuries_from_j2000);
    Point3::new(
        r * lat.cos() * lon.cos(),
        r * lat.cos() * lon.sin(),
        r * lat.sin(),
    )
}

/// Apparent angular radius of the Moon as seen from Earth's center, in
/// arcseconds, given its distance in AU.
pub fn angular_radius_arcsec(distance_au: f64) -> f64 {
    const MOON_RADIUS_KM: f64 = 1_737.4;
    const AU_KM: f64 = 149_597_870.7;
    let distance_km = distance_au * AU_KM;
    (MOON_RADIUS_KM / distance_km).asin().to_degrees() * 3600.0
}

/// Illuminated fraction of the Moon's disk (0.0 new .. 1.0 full), from the
/// Sun-Moon-Earth phase angle.
pub fn illuminated_fraction(phase_angle_rad: f64) -> f64 {
    (1.0 + phase_angle_rad.cos()) / 2.0
}

pub const TWO_PI: f64 = 2.0 * PI;
