//! Geometric and kinematic relations between a receiver and a satellite.
//! All positions and velocities are expressed in ECEF frame ([m], [m/s]).
use map_3d::{deg2rad, ecef2aer, ecef2geodetic, geodetic2ecef, Ellipsoid};
use nalgebra::Vector3;

use crate::constants::{
    EARTH_ANGULAR_VEL_RAD, EARTH_GRAVITATION_MU_M3_S2, EARTH_SEMI_MAJOR_AXIS_WGS84,
    SPEED_OF_LIGHT_M_S,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geodetic coordinates on the WGS84 ellipsoid
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeodeticPosition {
    /// Latitude [rad]
    pub latitude_rad: f64,
    /// Longitude [rad]
    pub longitude_rad: f64,
    /// Altitude above the ellipsoid [m]
    pub altitude_m: f64,
}

impl GeodeticPosition {
    /// Builds [GeodeticPosition] from angles in radians
    pub fn new(latitude_rad: f64, longitude_rad: f64, altitude_m: f64) -> Self {
        Self {
            latitude_rad,
            longitude_rad,
            altitude_m,
        }
    }

    /// Builds [GeodeticPosition] from angles in degrees
    pub fn from_degrees(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self::new(deg2rad(latitude_deg), deg2rad(longitude_deg), altitude_m)
    }
}

/// Geometric range between receiver and satellite [m]
pub fn range(sv_position: &Vector3<f64>, rx_position: &Vector3<f64>) -> f64 {
    (sv_position - rx_position).norm()
}

/// Line of sight unit vector, from the receiver antenna to the satellite.
pub fn line_of_sight(rx_position: &Vector3<f64>, sv_position: &Vector3<f64>) -> Vector3<f64> {
    (sv_position - rx_position).normalize()
}

/// Range correction [m] due to Earth rotation during signal propagation
/// (Sagnac effect).
pub fn sagnac_correction(rx_position: &Vector3<f64>, sv_position: &Vector3<f64>) -> f64 {
    EARTH_ANGULAR_VEL_RAD / SPEED_OF_LIGHT_M_S
        * (sv_position[0] * rx_position[1] - sv_position[1] * rx_position[0])
}

/// Range rate correction [m/s] due to Earth rotation during signal propagation.
/// It is to be subtracted from the projected relative velocity, and equals
/// the opposite of the time derivative of [sagnac_correction].
pub fn sagnac_rate_correction(
    rx_position: &Vector3<f64>,
    sv_position: &Vector3<f64>,
    rx_velocity: &Vector3<f64>,
    sv_velocity: &Vector3<f64>,
) -> f64 {
    EARTH_ANGULAR_VEL_RAD / SPEED_OF_LIGHT_M_S
        * (sv_velocity[1] * rx_position[0] + sv_position[1] * rx_velocity[0]
            - sv_velocity[0] * rx_position[1]
            - sv_position[0] * rx_velocity[1])
}

/// Relative velocity between satellite and receiver, projected on the line of sight [m/s]
pub fn projected_relative_velocity(
    los: &Vector3<f64>,
    sv_velocity: &Vector3<f64>,
    rx_velocity: &Vector3<f64>,
) -> f64 {
    los.dot(&(sv_velocity - rx_velocity))
}

/// Relativistic signal delay [s] due to space-time curvature in the Earth
/// gravitational field (Shapiro effect). Only meaningful for receivers
/// located on or above the Earth surface: returns zero otherwise.
pub fn shapiro_delay_s(rx_position: &Vector3<f64>, sv_position: &Vector3<f64>) -> f64 {
    let r_rx = rx_position.norm();
    if r_rx <= EARTH_SEMI_MAJOR_AXIS_WGS84 / 2.0 {
        return 0.0;
    }
    let r_sv = sv_position.norm();
    let rho = range(sv_position, rx_position);
    2.0 * EARTH_GRAVITATION_MU_M3_S2 / SPEED_OF_LIGHT_M_S.powi(3)
        * ((r_sv + r_rx + rho) / (r_sv + r_rx - rho)).ln()
}

/// Satellite (elevation, azimuth) angles in radians, as seen from this receiver.
/// Azimuth is counted clockwise from North, within [0, 2π[.
pub fn elevation_azimuth(geodetic: &GeodeticPosition, sv_position: &Vector3<f64>) -> (f64, f64) {
    let (azimuth, elevation, _) = ecef2aer(
        sv_position[0],
        sv_position[1],
        sv_position[2],
        geodetic.latitude_rad,
        geodetic.longitude_rad,
        geodetic.altitude_m,
        Ellipsoid::WGS84,
    );
    (elevation, azimuth.rem_euclid(2.0 * std::f64::consts::PI))
}

/// Converts ECEF coordinates to WGS84 geodetic coordinates.
pub fn ecef_to_geodetic(position: &Vector3<f64>) -> GeodeticPosition {
    let (lat, lon, alt) = ecef2geodetic(position[0], position[1], position[2], Ellipsoid::WGS84);
    GeodeticPosition::new(lat, lon, alt)
}

/// Converts WGS84 geodetic coordinates to ECEF coordinates.
pub fn geodetic_to_ecef(geodetic: &GeodeticPosition) -> Vector3<f64> {
    let (x, y, z) = geodetic2ecef(
        geodetic.latitude_rad,
        geodetic.longitude_rad,
        geodetic.altitude_m,
        Ellipsoid::WGS84,
    );
    Vector3::new(x, y, z)
}

/// Converts a Doppler shift [Hz] to a range rate [m/s], for this wavelength [m].
pub fn doppler_to_range_rate(doppler_hz: f64, wavelength_m: f64) -> f64 {
    -doppler_hz * wavelength_m
}

/// Converts a range rate [m/s] to a Doppler shift [Hz], for this wavelength [m].
pub fn range_rate_to_doppler(range_rate_m_s: f64, wavelength_m: f64) -> f64 {
    -range_rate_m_s / wavelength_m
}

/// Frequencies ratio squared (f1/f2)²
pub fn frequency_ratio_squared(f1_hz: f64, f2_hz: f64) -> f64 {
    (f1_hz / f2_hz).powi(2)
}
