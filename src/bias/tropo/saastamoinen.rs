//! Saastamoinen zenith delays, fed with standard atmosphere values
use crate::bias::BiasRuntime;

const MIN_ALTITUDE_M: f64 = -100.0;
const MAX_ALTITUDE_M: f64 = 10.0E3;

/// Relative humidity
const HUMIDITY: f64 = 0.7;

/// Sea level temperature [°C]
const SEA_LEVEL_TEMPERATURE_C: f64 = 15.0;

/// Standard atmosphere at receiver altitude: (pressure [hPa], temperature [K], water vapour pressure [hPa])
fn standard_atmosphere(altitude_m: f64) -> (f64, f64, f64) {
    let h = altitude_m.max(0.0);
    let pressure = 1013.25 * (1.0 - 2.2557E-5 * h).powf(5.2568);
    let temperature = SEA_LEVEL_TEMPERATURE_C - 6.5E-3 * h + 273.16;
    let e = 6.108 * HUMIDITY * ((17.15 * temperature - 4684.0) / (temperature - 38.45)).exp();
    (pressure, temperature, e)
}

fn within_validity(rtm: &BiasRuntime) -> bool {
    let h = rtm.altitude_m();
    (MIN_ALTITUDE_M..=MAX_ALTITUDE_M).contains(&h)
}

/// Zenith hydrostatic delay [m]
pub(crate) fn zhd_m(rtm: &BiasRuntime) -> f64 {
    if !within_validity(rtm) {
        return 0.0;
    }
    let h = rtm.altitude_m().max(0.0);
    let (pressure, _, _) = standard_atmosphere(h);
    let lat = rtm.rx_geodetic.latitude_rad;
    0.0022768 * pressure / (1.0 - 0.00266 * (2.0 * lat).cos() - 0.00028 * h / 1.0E3)
}

/// Zenith wet delay [m]
pub(crate) fn zwd_m(rtm: &BiasRuntime) -> f64 {
    if !within_validity(rtm) {
        return 0.0;
    }
    let (_, temperature, e) = standard_atmosphere(rtm.altitude_m());
    0.002277 * (1255.0 / temperature + 0.05) * e
}
