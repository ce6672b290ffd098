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

//! Plain ECEF geometry between two geodetic stations and compass binning
//! of an azimuth. Deliberately untyped (`f64` in, `f64` out): a generic
//! typed-unit wrapper would be overkill for one formula used in one
//! place, so this follows the formula directly.

use nalgebra::Vector3;

/// Mean Earth radius, metres. WGS-84 equatorial radius is close enough for
/// the spherical approximation this geometry uses.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A geodetic station: latitude and longitude in radians, elevation in
/// metres above `EARTH_RADIUS_M`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub elev_m: f64,
}

impl Geodetic {
    pub fn new(lat_rad: f64, lon_rad: f64, elev_m: f64) -> Self {
        Self {
            lat_rad,
            lon_rad,
            elev_m,
        }
    }

    /// `P = ((R+h)cos(lat)cos(lon), (R+h)cos(lat)sin(lon), (R+h)sin(lat))`
    pub fn ecef(&self) -> Vector3<f64> {
        let r = EARTH_RADIUS_M + self.elev_m;
        Vector3::new(
            r * self.lat_rad.cos() * self.lon_rad.cos(),
            r * self.lat_rad.cos() * self.lon_rad.sin(),
            r * self.lat_rad.sin(),
        )
    }

    fn up(&self) -> Vector3<f64> {
        Vector3::new(
            self.lat_rad.cos() * self.lon_rad.cos(),
            self.lat_rad.cos() * self.lon_rad.sin(),
            self.lat_rad.sin(),
        )
    }

    fn east(&self) -> Vector3<f64> {
        Vector3::new(-self.lon_rad.sin(), self.lon_rad.cos(), 0.0)
    }

    fn north(&self) -> Vector3<f64> {
        self.up().cross(&self.east())
    }
}

/// Great-circle-ish ECEF distance and bearing from `a` to `b`. `distance_m`
/// is symmetric; `elevation_deg`/`azimuth_deg` are as seen from `a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bearing {
    pub distance_m: f64,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
}

/// ECEF difference, then elevation/azimuth from the local tangent frame
/// at `a`.
pub fn bearing(a: Geodetic, b: Geodetic) -> Bearing {
    let d = b.ecef() - a.ecef();
    let distance_m = d.norm();

    let up = a.up();
    let east = a.east();
    let north = a.north();

    let elevation_rad = (d.dot(&up) / distance_m).clamp(-1.0, 1.0).asin();
    let azimuth_rad = d.dot(&east).atan2(d.dot(&north));
    let azimuth_deg = (azimuth_rad.to_degrees() + 360.0) % 360.0;

    Bearing {
        distance_m,
        elevation_deg: elevation_rad.to_degrees(),
        azimuth_deg,
    }
}

/// Signed smallest angular difference `a - b` in degrees, normalised to
/// `(-180, 180]`. Used for the mountain-occlusion bearing check.
pub fn angle_diff_deg(a: f64, b: f64) -> f64 {
    let raw = (a - b) % 360.0;
    if raw > 180.0 {
        raw - 360.0
    } else if raw <= -180.0 {
        raw + 360.0
    } else {
        raw
    }
}

/// Discretise an azimuth (degrees, `[0, 360)`) into one of `n` compass
/// labels, `n` one of 4, 8, or 16. Panics on any other `n` — callers must
/// validate against the `Direction` invariant before calling.
pub fn compass_label(azimuth_deg: f64, n: u32) -> &'static str {
    const LABELS_4: [&str; 4] = ["N", "E", "S", "W"];
    const LABELS_8: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    const LABELS_16: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let labels: &[&str] = match n {
        4 => &LABELS_4,
        8 => &LABELS_8,
        16 => &LABELS_16,
        _ => panic!("compass_label: direction bin count must be 4, 8, or 16, got {n}"),
    };
    let bin_width = 360.0 / n as f64;
    let idx = ((azimuth_deg % 360.0 + bin_width / 2.0) / bin_width).floor() as usize % labels.len();
    labels[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bearing_is_symmetric_in_distance() {
        let a = Geodetic::new(35f64.to_radians(), 139f64.to_radians(), 0.0);
        let b = Geodetic::new(34f64.to_radians(), 135f64.to_radians(), 0.0);
        let ab = bearing(a, b);
        let ba = bearing(b, a);
        assert_relative_eq!(ab.distance_m, ba.distance_m, epsilon = 1e-3);
    }

    #[test]
    fn osaka_to_tokyo_matches_known_distance() {
        // Osaka -> Tokyo is roughly 400km.
        let tokyo = Geodetic::new(35f64.to_radians(), 139f64.to_radians(), 0.0);
        let osaka = Geodetic::new(34f64.to_radians(), 135f64.to_radians(), 0.0);
        let b = bearing(tokyo, osaka);
        assert!((b.distance_m / 1000.0 - 411.0).abs() < 5.0);
    }

    #[test]
    fn compass_label_wraps_at_north() {
        assert_eq!(compass_label(359.0, 4), "N");
        assert_eq!(compass_label(0.0, 4), "N");
        assert_eq!(compass_label(89.9, 4), "E");
        assert_eq!(compass_label(180.0, 8), "S");
    }

    #[test]
    fn compass_label_16_way() {
        assert_eq!(compass_label(0.0, 16), "N");
        assert_eq!(compass_label(22.5, 16), "NNE");
    }

    #[test]
    fn angle_diff_wraps_around_north() {
        assert_relative_eq!(angle_diff_deg(350.0, 10.0), -20.0, epsilon = 1e-9);
        assert_relative_eq!(angle_diff_deg(10.0, 350.0), 20.0, epsilon = 1e-9);
        assert_relative_eq!(angle_diff_deg(180.0, 0.0), 180.0, epsilon = 1e-9);
    }
}
