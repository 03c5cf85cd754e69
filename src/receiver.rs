//! Receiver states, as maintained by the navigation filter between epochs.
use std::collections::HashMap;

use crate::{
    geometry::{ecef_to_geodetic, GeodeticPosition},
    prelude::{Carrier, Constellation, Vector3},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Role of a receiver in the navigation process.
/// Receivers are always indexed by role.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReceiverRole {
    /// Receiver we are navigating
    #[default]
    Rover = 0,
    /// Reference site, for differential navigation
    Base = 1,
}

impl ReceiverRole {
    /// Number of roles
    pub const COUNT: usize = 2;

    /// All roles, in indexing order
    pub const ALL: [Self; Self::COUNT] = [Self::Rover, Self::Base];

    /// Index of this role in a receivers slice
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for ReceiverRole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Rover => write!(f, "rover"),
            Self::Base => write!(f, "base"),
        }
    }
}

/// Estimated value and its standard deviation
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UncertainValue {
    pub value: f64,
    pub std_dev: f64,
}

impl UncertainValue {
    pub fn new(value: f64, std_dev: f64) -> Self {
        Self { value, std_dev }
    }

    /// Variance (squared standard deviation)
    pub fn variance(&self) -> f64 {
        self.std_dev.powi(2)
    }
}

/// Receiver clock state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiverClock {
    /// Clock bias [s]
    pub bias: UncertainValue,
    /// Clock drift [s/s]
    pub drift: UncertainValue,
    /// Inter-system time difference [s], per [Constellation].
    /// The reference system must be present too (usually with null value).
    pub system_bias: HashMap<Constellation, UncertainValue>,
    /// Inter-system time difference drift [s/s], per [Constellation].
    pub system_drift: HashMap<Constellation, UncertainValue>,
}

impl ReceiverClock {
    /// Builds a [ReceiverClock] with null inter-system terms
    /// for each of these [Constellation]s.
    pub fn with_systems(constellations: &[Constellation]) -> Self {
        let mut s = Self::default();
        for constellation in constellations {
            s.system_bias
                .insert(*constellation, UncertainValue::default());
            s.system_drift
                .insert(*constellation, UncertainValue::default());
        }
        s
    }

    /// Copies and returns with updated clock bias
    pub fn with_bias(&self, bias: UncertainValue) -> Self {
        let mut s = self.clone();
        s.bias = bias;
        s
    }

    /// Copies and returns with updated clock drift
    pub fn with_drift(&self, drift: UncertainValue) -> Self {
        let mut s = self.clone();
        s.drift = drift;
        s
    }

    /// Copies and returns with updated inter-system bias
    pub fn with_system_bias(&self, constellation: Constellation, bias: UncertainValue) -> Self {
        let mut s = self.clone();
        s.system_bias.insert(constellation, bias);
        s
    }

    /// Copies and returns with updated inter-system drift
    pub fn with_system_drift(&self, constellation: Constellation, drift: UncertainValue) -> Self {
        let mut s = self.clone();
        s.system_drift.insert(constellation, drift);
        s
    }
}

/// Receiver state
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    /// [ReceiverRole]
    pub role: ReceiverRole,
    /// Antenna position in ECEF [m]
    position_ecef_m: Vector3<f64>,
    /// Antenna geodetic position
    geodetic: GeodeticPosition,
    /// Velocity in ECEF [m/s]
    pub velocity_ecef_m_s: Vector3<f64>,
    /// [ReceiverClock] state
    pub clock: ReceiverClock,
    /// Inter-frequency biases [s], per [Carrier]
    pub inter_frequency_bias: HashMap<Carrier, UncertainValue>,
}

impl Receiver {
    /// Builds a static [Receiver] at this ECEF position
    pub fn new(role: ReceiverRole, position_ecef_m: Vector3<f64>) -> Self {
        Self {
            role,
            position_ecef_m,
            geodetic: ecef_to_geodetic(&position_ecef_m),
            velocity_ecef_m_s: Vector3::zeros(),
            clock: ReceiverClock::default(),
            inter_frequency_bias: HashMap::new(),
        }
    }

    /// Antenna position in ECEF [m]
    pub fn position_ecef_m(&self) -> &Vector3<f64> {
        &self.position_ecef_m
    }

    /// Antenna [GeodeticPosition]
    pub fn geodetic(&self) -> &GeodeticPosition {
        &self.geodetic
    }

    /// Updates the antenna position, keeping both coordinate
    /// representations consistent.
    pub fn set_position_ecef_m(&mut self, position_ecef_m: Vector3<f64>) {
        self.position_ecef_m = position_ecef_m;
        self.geodetic = ecef_to_geodetic(&position_ecef_m);
    }

    /// Copies and returns with updated velocity
    pub fn with_velocity_ecef_m_s(&self, velocity_ecef_m_s: Vector3<f64>) -> Self {
        let mut s = self.clone();
        s.velocity_ecef_m_s = velocity_ecef_m_s;
        s
    }

    /// Copies and returns with updated [ReceiverClock]
    pub fn with_clock(&self, clock: ReceiverClock) -> Self {
        let mut s = self.clone();
        s.clock = clock;
        s
    }

    /// Copies and returns with an inter-frequency bias for this [Carrier]
    pub fn with_inter_frequency_bias(&self, carrier: Carrier, bias: UncertainValue) -> Self {
        let mut s = self.clone();
        s.inter_frequency_bias.insert(carrier, bias);
        s
    }
}
