use crate::bias::{tropo::latitude_interpolation, BiasRuntime};
use std::f64::consts::PI;

#[derive(Copy, Clone, Debug)]
enum Unb3Param {
    // pressure [mBar]
    Pressure = 0,
    // temperature [K]
    Temperature = 1,
    // water vapour pressure [mBar]
    WaterVapourPressure = 2,
    // temperature lapse rate [K/m]
    Beta = 3,
    // water vapour pressure height factor
    Lambda = 4,
}

const ANNUAL_AVERAGE: [(f64, [f64; 5]); 5] = [
    (15.0, [1013.25, 299.65, 26.31, 6.30E-3, 2.77]),
    (30.0, [1017.25, 294.15, 21.79, 6.05E-3, 3.15]),
    (45.0, [1015.75, 283.15, 11.66, 5.58E-3, 2.57]),
    (60.0, [1011.75, 272.15, 6.78, 5.39E-3, 1.81]),
    (75.0, [1013.00, 263.65, 4.11, 4.53E-3, 1.55]),
];

const SEASONAL_AMPLITUDE: [(f64, [f64; 5]); 5] = [
    (15.0, [0.0, 0.0, 0.0, 0.0, 0.0]),
    (30.0, [-3.75, 7.0, 8.85, 0.25E-3, 0.33]),
    (45.0, [-2.25, 11.0, 7.24, 0.32E-3, 0.46]),
    (60.0, [-1.75, 15.0, 5.36, 0.81E-3, 0.74]),
    (75.0, [-0.50, 14.5, 3.39, 0.62E-3, 0.3]),
];

fn unb3_parameter(prm: Unb3Param, lat_ddeg: f64, day_of_year: f64) -> f64 {
    // seasons are reversed in the southern hemisphere
    let dmin = if lat_ddeg.is_sign_negative() {
        211.0_f64
    } else {
        28.0_f64
    };
    let column = prm as usize;
    let annual = latitude_interpolation(&ANNUAL_AVERAGE, lat_ddeg, column);
    let amplitude = latitude_interpolation(&SEASONAL_AMPLITUDE, lat_ddeg, column);
    annual - amplitude * ((day_of_year - dmin) * 2.0_f64 * PI / 365.25_f64).cos()
}

/// Evaluates (ZHD, ZWD) [m] at receiver altitude, from the UNB3
/// seasonal and latitudinal meteorological table.
pub(crate) fn zenith_delays_m(rtm: &BiasRuntime) -> (f64, f64) {
    const K_1: f64 = 77.604;
    const K_2: f64 = 382000.0_f64;
    const R_D: f64 = 287.054;
    const G: f64 = 9.80665_f64;
    const G_M: f64 = 9.784_f64;

    let day_of_year = rtm.epoch.day_of_year();
    let lat_ddeg = rtm.latitude_deg();
    let h = rtm.altitude_m();

    let beta = unb3_parameter(Unb3Param::Beta, lat_ddeg, day_of_year);
    let p = unb3_parameter(Unb3Param::Pressure, lat_ddeg, day_of_year);
    let lambda = unb3_parameter(Unb3Param::Lambda, lat_ddeg, day_of_year);
    let temp = unb3_parameter(Unb3Param::Temperature, lat_ddeg, day_of_year);
    let e = unb3_parameter(Unb3Param::WaterVapourPressure, lat_ddeg, day_of_year);

    let z0_zhd = 1.0E-6 * K_1 * R_D * p / G_M;
    let denom = (lambda + 1.0_f64) * G_M - beta * R_D;
    let z0_zwd = 1.0E-6 * K_2 * R_D * e / temp / denom;
    let value = 1.0_f64 - beta * h / temp;

    let zhd = value.powf(G / R_D / beta) * z0_zhd;
    let zwd = value.powf((lambda + 1.0_f64) * G / R_D / beta - 1.0_f64) * z0_zwd;

    (zhd, zwd)
}
