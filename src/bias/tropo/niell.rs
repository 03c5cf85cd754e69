//! Niell Mapping Function (A.E. Niell, JGR 1996)
use crate::bias::{tropo::latitude_interpolation, BiasRuntime};
use std::f64::consts::PI;

const HYDROSTATIC_AVERAGE: [(f64, [f64; 3]); 5] = [
    (15.0, [1.2769934E-3, 2.9153695E-3, 62.610505E-3]),
    (30.0, [1.2683230E-3, 2.9152299E-3, 62.837393E-3]),
    (45.0, [1.2465397E-3, 2.9288445E-3, 63.721774E-3]),
    (60.0, [1.2196049E-3, 2.9022565E-3, 63.824265E-3]),
    (75.0, [1.2045996E-3, 2.9024912E-3, 64.258455E-3]),
];

const HYDROSTATIC_AMPLITUDE: [(f64, [f64; 3]); 5] = [
    (15.0, [0.0, 0.0, 0.0]),
    (30.0, [1.2709626E-5, 2.1414979E-5, 9.0128400E-5]),
    (45.0, [2.6523662E-5, 3.0160779E-5, 4.3497037E-5]),
    (60.0, [3.4000452E-5, 7.2562722E-5, 84.795348E-5]),
    (75.0, [4.1202191E-5, 11.723375E-5, 170.37206E-5]),
];

const WET: [(f64, [f64; 3]); 5] = [
    (15.0, [5.8021897E-4, 1.4275268E-3, 4.3472961E-2]),
    (30.0, [5.6794847E-4, 1.5138625E-3, 4.6729510E-2]),
    (45.0, [5.8118019E-4, 1.4572752E-3, 4.3908931E-2]),
    (60.0, [5.9727542E-4, 1.5007428E-3, 4.4626982E-2]),
    (75.0, [6.1641693E-4, 1.7599082E-3, 5.4736038E-2]),
];

// height correction coefficients
const HEIGHT: [f64; 3] = [2.53E-5, 5.49E-3, 1.14E-3];

// Marini continued fraction, normalized to unity at zenith
fn marini(elevation_rad: f64, coefs: [f64; 3]) -> f64 {
    let [a, b, c] = coefs;
    let sin_e = elevation_rad.sin();
    (1.0 + a / (1.0 + b / (1.0 + c))) / (sin_e + a / (sin_e + b / (sin_e + c)))
}

/// Hydrostatic mapping factor, with seasonal variation and height correction.
pub(crate) fn hydrostatic(rtm: &BiasRuntime) -> f64 {
    if rtm.elevation_rad <= 0.0 {
        return 0.0;
    }

    let lat_ddeg = rtm.latitude_deg();

    // seasons are reversed in the southern hemisphere
    let mut year = (rtm.epoch.day_of_year() - 28.0) / 365.25;
    if lat_ddeg < 0.0 {
        year += 0.5;
    }
    let cos_y = (2.0 * PI * year).cos();

    let mut coefs = [0.0_f64; 3];
    for (i, coef) in coefs.iter_mut().enumerate() {
        *coef = latitude_interpolation(&HYDROSTATIC_AVERAGE, lat_ddeg, i)
            - latitude_interpolation(&HYDROSTATIC_AMPLITUDE, lat_ddeg, i) * cos_y;
    }

    let dm = (1.0 / rtm.elevation_rad.sin() - marini(rtm.elevation_rad, HEIGHT))
        * rtm.altitude_m()
        / 1.0E3;

    marini(rtm.elevation_rad, coefs) + dm
}

/// Wet mapping factor.
pub(crate) fn wet(rtm: &BiasRuntime) -> f64 {
    if rtm.elevation_rad <= 0.0 {
        return 0.0;
    }

    let lat_ddeg = rtm.latitude_deg();

    let mut coefs = [0.0_f64; 3];
    for (i, coef) in coefs.iter_mut().enumerate() {
        *coef = latitude_interpolation(&WET, lat_ddeg, i);
    }

    marini(rtm.elevation_rad, coefs)
}
