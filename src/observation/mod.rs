//! Per epoch observation batch
use std::{collections::BTreeMap, sync::Arc};

use itertools::Itertools;

use crate::{
    bias::ZenithDelay,
    geometry::{elevation_azimuth, line_of_sight},
    prelude::{Carrier, Constellation, Epoch, Receiver, Vector3, SV},
};

mod navigation;
pub use navigation::{NavigationData, SignalInSpaceAccuracy};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Satellite signal identifier
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalId {
    /// [SV] transmitting this signal
    pub sv: SV,
    /// [Carrier] signal
    pub carrier: Carrier,
}

impl SignalId {
    pub fn new(sv: SV, carrier: Carrier) -> Self {
        Self { sv, carrier }
    }

    /// [Constellation] (satellite system) of this signal
    pub fn constellation(&self) -> Constellation {
        self.sv.constellation
    }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}({})", self.sv, self.carrier)
    }
}

/// Type of observation
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Observable {
    /// Code (pseudo) range [m]
    PseudoRange,
    /// Carrier phase, expressed as a range [m]
    PhaseRange,
    /// Doppler, expressed as a range rate [m/s]
    Doppler,
}

impl std::fmt::Display for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::PseudoRange => write!(f, "pseudo-range"),
            Self::PhaseRange => write!(f, "phase-range"),
            Self::Doppler => write!(f, "doppler"),
        }
    }
}

impl Observable {
    /// True for [Observable::PseudoRange] and [Observable::PhaseRange]
    pub fn is_range(&self) -> bool {
        matches!(self, Self::PseudoRange | Self::PhaseRange)
    }
}

/// Measurement and its modeled counterpart
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationDatum {
    /// Measured value ([m] or [m/s])
    pub measurement: f64,
    /// Estimated value ([m] or [m/s])
    pub estimate: f64,
    /// Measurement variance ([m²] or [m²/s²])
    pub variance: f64,
}

impl ObservationDatum {
    pub fn new(measurement: f64) -> Self {
        Self {
            measurement,
            estimate: 0.0,
            variance: 0.0,
        }
    }

    /// Measurement minus estimate
    pub fn residual(&self) -> f64 {
        self.measurement - self.estimate
    }
}

/// Satellite clock offset to its system time
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatelliteClock {
    /// Clock bias [s]
    pub bias: f64,
    /// Clock drift [s/s]
    pub drift: f64,
}

/// Intermediate terms of the last estimation
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct EstimationTerms {
    /// Receiver-satellite geometric range [m]
    pub rho_m: f64,
    /// Earth rotation (Sagnac) correction [m]
    pub sagnac_m: f64,
    /// Troposphere [ZenithDelay] and mapping factors
    pub zenith_delay: ZenithDelay,
    /// Slant troposphere delay [m]
    pub tropo_m: f64,
    /// Ionosphere delay on this signal [m]
    pub iono_m: f64,
    /// Relative velocity projected on the line of sight [m/s]
    pub range_rate_m_s: f64,
    /// Earth rotation correction of the range rate [m/s]
    pub sagnac_rate_m_s: f64,
    /// Relativistic (Shapiro) delay [m].
    /// Evaluated for reference, never applied to the estimates.
    pub shapiro_m: f64,
}

/// Signal observation by one receiver
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverObservation {
    /// Satellite position in ECEF [m]
    sv_position_ecef_m: Vector3<f64>,
    /// Satellite velocity in ECEF [m/s]
    sv_velocity_ecef_m_s: Vector3<f64>,
    /// [SatelliteClock]
    sv_clock: SatelliteClock,
    /// Line of sight unit vector, from receiver to satellite
    los: Vector3<f64>,
    /// Elevation [rad]
    elevation_rad: f64,
    /// Azimuth [rad]
    azimuth_rad: f64,
    /// Carrier to noise density ratio [dB.Hz]
    pub cn0_dbhz: Option<f64>,
    /// Sampled [Observable]s
    pub observables: BTreeMap<Observable, ObservationDatum>,
    /// [EstimationTerms] of the last estimation
    pub terms: EstimationTerms,
}

impl ReceiverObservation {
    /// Builds a new [ReceiverObservation] of a satellite, resolving the line of sight
    /// and the satellite attitude from this [Receiver] position.
    pub fn new(
        receiver: &Receiver,
        sv_position_ecef_m: Vector3<f64>,
        sv_velocity_ecef_m_s: Vector3<f64>,
        sv_clock: SatelliteClock,
    ) -> Self {
        let los = line_of_sight(receiver.position_ecef_m(), &sv_position_ecef_m);
        let (elevation_rad, azimuth_rad) = elevation_azimuth(receiver.geodetic(), &sv_position_ecef_m);
        Self {
            sv_position_ecef_m,
            sv_velocity_ecef_m_s,
            sv_clock,
            los,
            elevation_rad,
            azimuth_rad,
            cn0_dbhz: None,
            observables: BTreeMap::new(),
            terms: EstimationTerms::default(),
        }
    }

    /// Copies and returns with this signal quality [dB.Hz]
    pub fn with_cn0_dbhz(&self, cn0_dbhz: f64) -> Self {
        let mut s = self.clone();
        s.cn0_dbhz = Some(cn0_dbhz);
        s
    }

    /// Copies and returns with a new [Observable] measurement
    pub fn with_observation(&self, observable: Observable, measurement: f64) -> Self {
        let mut s = self.clone();
        s.observables
            .insert(observable, ObservationDatum::new(measurement));
        s
    }

    /// Copies and returns with a pseudo range measurement [m]
    pub fn with_pseudo_range_m(&self, pr_m: f64) -> Self {
        self.with_observation(Observable::PseudoRange, pr_m)
    }

    /// Copies and returns with a phase range measurement [m]
    pub fn with_phase_range_m(&self, cp_m: f64) -> Self {
        self.with_observation(Observable::PhaseRange, cp_m)
    }

    /// Copies and returns with a Doppler measurement, expressed as a range rate [m/s]
    pub fn with_range_rate_m_s(&self, rate_m_s: f64) -> Self {
        self.with_observation(Observable::Doppler, rate_m_s)
    }

    /// Satellite position in ECEF [m]
    pub fn sv_position_ecef_m(&self) -> &Vector3<f64> {
        &self.sv_position_ecef_m
    }

    /// Satellite velocity in ECEF [m/s]
    pub fn sv_velocity_ecef_m_s(&self) -> &Vector3<f64> {
        &self.sv_velocity_ecef_m_s
    }

    /// [SatelliteClock] state
    pub fn sv_clock(&self) -> &SatelliteClock {
        &self.sv_clock
    }

    /// Line of sight unit vector
    pub fn line_of_sight(&self) -> &Vector3<f64> {
        &self.los
    }

    /// Satellite elevation [rad]
    pub fn elevation_rad(&self) -> f64 {
        self.elevation_rad
    }

    /// Satellite azimuth [rad]
    pub fn azimuth_rad(&self) -> f64 {
        self.azimuth_rad
    }

    /// [ObservationDatum] for this [Observable], if sampled
    pub fn datum(&self, observable: Observable) -> Option<&ObservationDatum> {
        self.observables.get(&observable)
    }
}

/// Signal observed by one or several receivers
#[derive(Debug, Clone)]
pub struct SignalObservation {
    /// [NavigationData] of the transmitting satellite
    pub navigation: Option<Arc<dyn NavigationData>>,
    /// Frequency channel number, for Glonass FDMA signals
    pub channel: Option<i8>,
    /// [ReceiverObservation]s, indexed by [crate::prelude::ReceiverRole]
    pub receivers: Vec<ReceiverObservation>,
}

impl SignalObservation {
    pub fn new(navigation: Option<Arc<dyn NavigationData>>) -> Self {
        Self {
            navigation,
            channel: None,
            receivers: Vec::with_capacity(2),
        }
    }

    /// Copies and returns with this Glonass frequency channel
    pub fn with_channel(&self, channel: i8) -> Self {
        let mut s = self.clone();
        s.channel = Some(channel);
        s
    }

    /// Copies and returns with a new [ReceiverObservation], for the next [crate::prelude::ReceiverRole]
    pub fn with_receiver_observation(&self, observation: ReceiverObservation) -> Self {
        let mut s = self.clone();
        s.receivers.push(observation);
        s
    }

    /// True if every receiver sampled this [Observable]
    pub fn observed_by_all(&self, observable: Observable) -> bool {
        !self.receivers.is_empty()
            && self
                .receivers
                .iter()
                .all(|rx| rx.observables.contains_key(&observable))
    }
}

/// Observations of one epoch
#[derive(Debug, Clone)]
pub struct Observations {
    /// Sampling [Epoch]
    pub epoch: Epoch,
    /// [SignalObservation]s
    pub signals: BTreeMap<SignalId, SignalObservation>,
}

impl Observations {
    pub fn new(epoch: Epoch) -> Self {
        Self {
            epoch,
            signals: BTreeMap::new(),
        }
    }

    /// Inserts (or replaces) a [SignalObservation]
    pub fn insert(&mut self, signal: SignalId, observation: SignalObservation) {
        self.signals.insert(signal, observation);
    }

    /// [Constellation]s in sight
    pub fn systems(&self) -> Vec<Constellation> {
        self.signals
            .keys()
            .map(|signal| signal.constellation())
            .unique()
            .collect()
    }

    /// [SV]s in sight
    pub fn satellites(&self) -> Vec<SV> {
        self.signals.keys().map(|signal| signal.sv).unique().collect()
    }

    /// Number of signals observed by every receiver, for this [Observable]
    pub fn observable_count(&self, observable: Observable) -> usize {
        self.signals
            .values()
            .filter(|obs| obs.observed_by_all(observable))
            .count()
    }

    /// Number of satellites contributing at least one signal
    /// observed by every receiver, for this [Observable]
    pub fn observable_count_unique_satellite(&self, observable: Observable) -> usize {
        self.signals
            .iter()
            .filter_map(|(signal, obs)| {
                if obs.observed_by_all(observable) {
                    Some(signal.sv)
                } else {
                    None
                }
            })
            .unique()
            .count()
    }
}
