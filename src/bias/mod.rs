//! Atmospheric propagation delays
use crate::{constants::MIN_ELEVATION_RAD, geometry::GeodeticPosition, prelude::Epoch};

pub(crate) mod tropo;
pub use tropo::{
    troposphere_variance_m2, MappingFunction, TroposphereSelection, ZenithDelay, ZenithDelayModel,
};

pub(crate) mod iono;
pub use iono::{
    ionosphere_variance_m2, scale_to_frequency, IonosphereModel, IonosphericCorrections, KbModel,
};

/// Conditions of one signal propagation, used by all delay models.
#[derive(Debug, Copy, Clone)]
pub struct BiasRuntime {
    /// Sampling [Epoch]
    pub epoch: Epoch,
    /// Satellite elevation [rad]
    pub elevation_rad: f64,
    /// Satellite azimuth [rad]
    pub azimuth_rad: f64,
    /// Receiver [GeodeticPosition]
    pub rx_geodetic: GeodeticPosition,
    /// Signal frequency [Hz]
    pub frequency_hz: f64,
}

impl BiasRuntime {
    /// Copies and returns with the elevation raised to [MIN_ELEVATION_RAD],
    /// so the models remain defined down to (and below) the horizon.
    pub(crate) fn above_horizon(&self) -> Self {
        let mut s = *self;
        s.elevation_rad = s.elevation_rad.max(MIN_ELEVATION_RAD);
        s
    }

    /// Receiver latitude [°]
    pub(crate) fn latitude_deg(&self) -> f64 {
        self.rx_geodetic.latitude_rad.to_degrees()
    }

    /// Receiver altitude [m]
    pub(crate) fn altitude_m(&self) -> f64 {
        self.rx_geodetic.altitude_m
    }
}
