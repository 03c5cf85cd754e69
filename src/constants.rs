/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Earth angular velocity, in WGS84 frame rad/s
pub const EARTH_ANGULAR_VEL_RAD: f64 = 7.2921151467E-5;

/// Earth gravitational constant (m^3 s-2)
pub const EARTH_GRAVITATION_MU_M3_S2: f64 = 3.986004418E14;

/// WGS84 Earth Frame Ellipsoid semi-major axis
pub const EARTH_SEMI_MAJOR_AXIS_WGS84: f64 = 6378137.0_f64;

/// Lowest elevation [rad] considered by the propagation and noise models.
/// Satellites closer to (or below) the horizon are modeled at this elevation.
pub const MIN_ELEVATION_RAD: f64 = std::f64::consts::PI / 180.0;

/// GPS L1 (and E1, B1C) carrier frequency
pub const L1_FREQUENCY_HZ: f64 = 1575.42E6;
