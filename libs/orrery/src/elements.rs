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

//! Low-precision planetary orbital elements, from
//! <https://ssd.jpl.nasa.gov/txt/p_elem_t2.txt>, valid 1800 AD - 2050 AD.
//! `KeplerianElements`/`OrbitalParameters` and the Newton's-method Kepler
//! solve are generic over any body; this module supplies the per-planet
//! tables for every JPL-tabulated body from Mercury through Pluto.

use nalgebra::Point3;
use std::f64::consts::PI;

#[derive(Debug)]
pub struct KeplerianElements {
    initial: OrbitalParameters,
    delta_per_century: OrbitalParameters,
    b: f64,
    c: f64,
    s: f64,
    f: f64,
}

impl KeplerianElements {
    #[allow(clippy::too_many_arguments)]
    #[allow(clippy::many_single_char_names)]
    pub fn new(
        a: f64,
        e: f64,
        i: f64,
        l: f64,
        omega_bar: f64,
        capital_omega: f64,
        apc: f64,
        epc: f64,
        ipc: f64,
        lpc: f64,
        long_node_pc: f64,
        omega_bar_pc: f64,
        b: f64,
        c: f64,
        s: f64,
        f: f64,
    ) -> Self {
        Self {
            initial: OrbitalParameters::new(a, e, i, l, omega_bar, capital_omega),
            delta_per_century: OrbitalParameters::new(
                apc,
                epc,
                ipc,
                lpc,
                omega_bar_pc,
                long_node_pc,
            ),
            b,
            c,
            s,
            f,
        }
    }

    pub fn at_century(&self, centuries_from_j2000: f64) -> OrbitalParameters {
        OrbitalParameters::new(
            self.project_coord(
                self.initial.a,
                self.delta_per_century.a,
                centuries_from_j2000,
            ),
            self.project_coord(
                self.initial.e,
                self.delta_per_century.e,
                centuries_from_j2000,
            ),
            self.project_coord(
                self.initial.i,
                self.delta_per_century.i,
                centuries_from_j2000,
            ) * PI
                / 180f64,
            self.project_coord(
                self.initial.l,
                self.delta_per_century.l,
                centuries_from_j2000,
            ) * PI
                / 180f64,
            self.project_coord(
                self.initial.omega_bar,
                self.delta_per_century.omega_bar,
                centuries_from_j2000,
            ) * PI
                / 180f64,
            self.project_coord(
                self.initial.capital_omega,
                self.delta_per_century.capital_omega,
                centuries_from_j2000,
            ) * PI
                / 180f64,
        )
    }

    fn project_coord(&self, n0: f64, ndot: f64, centuries_from_j2000: f64) -> f64 {
        n0 + ndot * centuries_from_j2000
            + self.b * centuries_from_j2000.powf(2f64)
            + self.c * (self.f * centuries_from_j2000).cos()
            + self.s * (self.f * centuries_from_j2000).sin()
    }
}

#[derive(Debug)]
pub struct OrbitalParameters {
    a: f64,             // AU
    e: f64,             // rad
    i: f64,             // rad
    l: f64,             // rad
    omega_bar: f64,     // rad
    capital_omega: f64, // rad
}

impl OrbitalParameters {
    pub fn new(
        a: f64,
        e: f64,
        i: f64,
        l: f64,
        omega_bar: f64,
        capital_omega: f64,
    ) -> Self {
        Self {
            a,
            e,
            i,
            l,
            omega_bar,
            capital_omega,
        }
    }

    /// Heliocentric ecliptic position, in AU.
    /// <https://space.stackexchange.com/questions/8911/determining-orbital-position-at-a-future-point-in-time>
    #[allow(non_snake_case)]
    #[allow(clippy::many_single_char_names)]
    pub fn eccliptic_position(&self) -> Point3<f64> {
        let i = self.i;
        let l = self.l;
        let omega_bar = self.omega_bar;
        let capital_omega = self.capital_omega;

        let M = l - omega_bar; // mean anomaly
        let w = omega_bar - capital_omega; // argument of periapsis

        let mut E = M;
        let mut iterations = 0u32;
        loop {
            let dE = (E - self.e * E.sin() - M) / (1f64 - self.e * E.cos());
            E -= dE;
            iterations += 1;
            if dE.abs() < 1e-6 {
                break;
            }
        }
        log::debug!("Kepler solve converged in {} iteration(s), e={:.6}", iterations, self.e);

        let P = self.a * (E.cos() - self.e);
        let Q = self.a * E.sin() * (1f64 - self.e.powf(2f64)).sqrt();

        let x = w.cos() * P - w.sin() * Q;
        let y = w.sin() * P + w.cos() * Q;
        let z = i.sin() * x;
        let x = i.cos() * x;
        let xtemp = x;
        let x = capital_omega.cos() * xtemp - capital_omega.sin() * y;
        let y = capital_omega.sin() * xtemp + capital_omega.cos() * y;

        Point3::new(x, y, z)
    }
}

/// One row of the JPL table plus its Table 2b (b, c, s, f) correction,
/// zeroed for the inner planets which don't need it.
#[allow(clippy::too_many_arguments)]
fn elements(
    a: f64,
    e: f64,
    i: f64,
    l: f64,
    omega_bar: f64,
    capital_omega: f64,
    apc: f64,
    epc: f64,
    ipc: f64,
    lpc: f64,
    long_node_pc: f64,
    omega_bar_pc: f64,
    b: f64,
    c: f64,
    s: f64,
    f: f64,
) -> KeplerianElements {
    KeplerianElements::new(
        a, e, i, l, omega_bar, capital_omega, apc, epc, ipc, lpc, long_node_pc, omega_bar_pc, b,
        c, s, f,
    )
}

pub fn mercury() -> KeplerianElements {
    elements(
        0.387_098_43,
        0.205_636_61,
        7.005_594_32,
        252.251_667_24,
        77.457_718_95,
        48.339_618_19,
        0.0,
        0.000_021_23,
        -0.005_901_58,
        149_472.674_866_23,
        0.159_400_13,
        -0.122_141_82,
        0.0,
        0.0,
        0.0,
        0.0,
    )
}

pub fn venus() -> KeplerianElements {
    elements(
        0.723_321_02,
        0.006_763_99,
        3.397_775_45,
        181.979_708_50,
        131.767_557_13,
        76.672_614_96,
        -0.000_000_26,
        -0.000_051_07,
        0.000_434_94,
        58_517.815_602_60,
        0.056_796_48,
        -0.272_741_74,
        0.0,
        0.0,
        0.0,
        0.0,
    )
}

/// Earth-Moon barycenter; used as Earth's heliocentric position for the
/// precision this engine targets.
pub fn earth_moon_barycenter() -> KeplerianElements {
    elements(
        1.000_000_18,
        0.016_731_63,
        -0.000_543_46,
        100.466_915_72,
        102.930_058_85,
        -5.112_603_89,
        -0.000_000_03,
        -0.000_036_61,
        -0.013_371_78,
        35_999.373_063_29,
        0.317_952_60,
        -0.241_238_56,
        0.0,
        0.0,
        0.0,
        0.0,
    )
}

pub fn mars() -> KeplerianElements {
    elements(
        1.523_712_43,
        0.093_365_11,
        1.851_818_69,
        -4.568_131_64,
        -23.917_447_84,
        49.713_209_84,
        0.000_000_97,
        0.000_091_49,
        -0.007_247_57,
        19_140.299_342_43,
        0.452_236_25,
        -0.268_524_31,
        0.0,
        0.0,
        0.0,
        0.0,
    )
}

pub fn jupiter() -> KeplerianElements {
    elements(
        5.202_480_19,
        0.048_535_90,
        1.298_614_16,
        34.334_791_52,
        14.274_952_44,
        100.292_826_54,
        -0.000_028_64,
        0.000_180_26,
        -0.003_226_99,
        3_034.903_717_57,
        0.181_991_96,
        0.130_246_19,
        -0.000_124_52,
        0.060_640_60,
        -0.356_354_38,
        38.351_25,
    )
}

pub fn saturn() -> KeplerianElements {
    elements(
        9.541_498_83,
        0.055_508_25,
        2.494_241_02,
        50.075_713_29,
        92.861_360_63,
        113.639_987_02,
        -0.000_030_65,
        -0.000_320_44,
        0.004_519_69,
        1_222.114_947_24,
        0.541_794_78,
        -0.250_150_02,
        0.000_258_99,
        -0.134_344_69,
        0.873_201_47,
        38.351_25,
    )
}

pub fn uranus() -> KeplerianElements {
    elements(
        19.187_979_48,
        0.046_857_40,
        0.772_981_27,
        314.202_766_25,
        172.434_044_41,
        73.962_502_15,
        -0.000_204_55,
        -0.000_015_50,
        -0.001_801_55,
        428.495_125_95,
        0.092_669_85,
        0.057_396_99,
        0.000_583_31,
        -0.977_318_48,
        0.176_892_45,
        7.670_25,
    )
}

pub fn neptune() -> KeplerianElements {
    elements(
        30.069_527_52,
        0.008_954_39,
        1.770_055_20,
        304.222_892_87,
        46.681_587_24,
        131.786_358_53,
        0.000_064_47,
        0.000_008_18,
        0.000_224_00,
        218.465_153_14,
        0.010_099_38,
        -0.006_063_02,
        -0.000_413_48,
        0.683_463_18,
        -0.101_625_47,
        7.670_25,
    )
}

pub fn pluto() -> KeplerianElements {
    elements(
        39.486_860_35,
        0.248_852_38,
        17.141_042_60,
        238.965_350_11,
        224.097_025_98,
        110.301_679_86,
        0.004_497_51,
        0.000_060_16,
        0.000_005_01,
        145.180_429_03,
        -0.009_688_27,
        -0.008_099_81,
        -0.012_627_24,
        0.0,
        0.0,
        0.0,
    )
}
