//! Observation estimator
use crate::{
    bias::{ionosphere_variance_m2, troposphere_variance_m2, BiasRuntime, IonosphericCorrections},
    cfg::Config,
    constants::{MIN_ELEVATION_RAD, SPEED_OF_LIGHT_M_S},
    error::Error,
    geometry::{
        projected_relative_velocity, range, sagnac_correction, sagnac_rate_correction,
        shapiro_delay_s,
    },
    noise::DEFAULT_CN0_DBHZ,
    observation::{
        EstimationTerms, Observable, Observations, ReceiverObservation, SignalId,
        SignalObservation,
    },
    prelude::{Epoch, Receiver, ReceiverRole},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod trace;
pub use trace::{EstimationObserver, EstimationTrace, TraceLogger, VarianceBudget};

/// How the estimated observations are going to be combined
/// by the navigation filter.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DifferenceMode {
    /// Raw observations
    #[default]
    Undifferenced,
    /// Differenced between receivers: satellite clock terms cancel out
    SingleDifference,
    /// Differenced between receivers and satellites: all clock terms cancel out
    DoubleDifference,
}

impl std::fmt::Display for DifferenceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Undifferenced => write!(f, "undifferenced"),
            Self::SingleDifference => write!(f, "single-difference"),
            Self::DoubleDifference => write!(f, "double-difference"),
        }
    }
}

impl DifferenceMode {
    fn receiver_clock_gate(&self) -> f64 {
        match self {
            Self::DoubleDifference => 0.0,
            _ => 1.0,
        }
    }

    fn satellite_clock_gate(&self) -> f64 {
        match self {
            Self::Undifferenced => 1.0,
            _ => 0.0,
        }
    }
}

/// [ObservationEstimator] predicts the value of each observation,
/// and the variance of each measurement, from the current receiver states.
#[derive(Debug, Clone)]
pub struct ObservationEstimator {
    cfg: Config,
}

impl ObservationEstimator {
    /// Builds a new [ObservationEstimator], refusing invalid [Config]urations.
    pub fn new(cfg: Config) -> Result<Self, Error> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// [Config] in use
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Estimates all [Observations], reporting through the [TraceLogger].
    /// See [Self::estimate_with_observer].
    pub fn estimate(
        &self,
        observations: &mut Observations,
        receivers: &[Receiver],
        corrections: &IonosphericCorrections,
        mode: DifferenceMode,
    ) -> Result<(), Error> {
        let mut logger = TraceLogger::default();
        self.estimate_with_observer(observations, receivers, corrections, mode, &mut logger)
    }

    /// Estimates all [Observations] in place, for this [DifferenceMode].
    /// `receivers` holds one [Receiver] per [ReceiverRole], indexed by role.
    /// Each signal is observed by the leading receivers (the rover alone,
    /// or every role). On any error, `observations` are left untouched
    /// and the observer is not notified.
    pub fn estimate_with_observer<O: EstimationObserver>(
        &self,
        observations: &mut Observations,
        receivers: &[Receiver],
        corrections: &IonosphericCorrections,
        mode: DifferenceMode,
        observer: &mut O,
    ) -> Result<(), Error> {
        if receivers.len() != ReceiverRole::COUNT {
            return Err(Error::ReceiverCount {
                expected: ReceiverRole::COUNT,
                got: receivers.len(),
            });
        }

        for (index, rx) in receivers.iter().enumerate() {
            if rx.role.index() != index {
                return Err(Error::ReceiverRoleOrder {
                    index,
                    role: rx.role,
                });
            }
        }

        let mut traces = Vec::with_capacity(observations.signals.len() * receivers.len() * 3);

        for (signal, signal_obs) in observations.signals.iter() {
            // signals may be tracked by the first receivers only
            if signal_obs.receivers.len() > receivers.len() {
                return Err(Error::ReceiverCount {
                    expected: receivers.len(),
                    got: signal_obs.receivers.len(),
                });
            }

            for (rx, rx_obs) in receivers.iter().zip(signal_obs.receivers.iter()) {
                self.estimate_signal(
                    observations.epoch,
                    *signal,
                    signal_obs,
                    rx,
                    rx_obs,
                    corrections,
                    mode,
                    &mut traces,
                )?;
            }
        }

        // commit
        for t in traces.iter() {
            let Some(rx_obs) = observations
                .signals
                .get_mut(&t.signal)
                .and_then(|obs| obs.receivers.get_mut(t.role.index()))
            else {
                continue;
            };

            rx_obs.terms = t.terms;

            if let Some(datum) = rx_obs.observables.get_mut(&t.observable) {
                datum.estimate = t.estimate;
                datum.variance = t.variance.total();
            }

            observer.observe(t);
        }

        observer.epoch_completed(observations.epoch, traces.len());
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn estimate_signal(
        &self,
        epoch: Epoch,
        signal: SignalId,
        signal_obs: &SignalObservation,
        rx: &Receiver,
        rx_obs: &ReceiverObservation,
        corrections: &IonosphericCorrections,
        mode: DifferenceMode,
        traces: &mut Vec<EstimationTrace>,
    ) -> Result<(), Error> {
        let constellation = signal.constellation();
        let role = rx.role;

        let frequency_hz = signal
            .carrier
            .frequency_hz(signal_obs.channel)
            .ok_or(Error::MissingFrequencyNumber(signal))?;

        let system_bias = rx
            .clock
            .system_bias
            .get(&constellation)
            .ok_or(Error::MissingInterSystemBias {
                role,
                constellation,
            })?;

        let system_drift = rx
            .clock
            .system_drift
            .get(&constellation)
            .ok_or(Error::MissingInterSystemDrift {
                role,
                constellation,
            })?;

        let ifb = rx.inter_frequency_bias.get(&signal.carrier);

        let rx_pos = rx.position_ecef_m();
        let sv_pos = rx_obs.sv_position_ecef_m();
        let sv_clock = rx_obs.sv_clock();
        let elevation_rad = rx_obs.elevation_rad();
        let cn0_dbhz = rx_obs.cn0_dbhz.unwrap_or(DEFAULT_CN0_DBHZ);

        let rtm = BiasRuntime {
            epoch,
            elevation_rad: elevation_rad.max(MIN_ELEVATION_RAD),
            azimuth_rad: rx_obs.azimuth_rad(),
            rx_geodetic: *rx.geodetic(),
            frequency_hz,
        };

        let has_range = rx_obs.observables.keys().any(|obs| obs.is_range());

        let zenith_delay = self.cfg.troposphere.zenith_delay(&rtm);

        let iono_m = if has_range {
            self.cfg.ionosphere.delay_m(&rtm, corrections)?
        } else {
            0.0
        };

        let terms = EstimationTerms {
            rho_m: range(sv_pos, rx_pos),
            sagnac_m: sagnac_correction(rx_pos, sv_pos),
            zenith_delay,
            tropo_m: zenith_delay.slant_delay_m(),
            iono_m,
            range_rate_m_s: projected_relative_velocity(
                rx_obs.line_of_sight(),
                rx_obs.sv_velocity_ecef_m_s(),
                &rx.velocity_ecef_m_s,
            ),
            sagnac_rate_m_s: sagnac_rate_correction(
                rx_pos,
                sv_pos,
                &rx.velocity_ecef_m_s,
                rx_obs.sv_velocity_ecef_m_s(),
            ),
            shapiro_m: shapiro_delay_s(rx_pos, sv_pos) * SPEED_OF_LIGHT_M_S,
        };

        let rx_gate = mode.receiver_clock_gate();
        let sv_gate = mode.satellite_clock_gate();
        let undifferenced = mode == DifferenceMode::Undifferenced;
        let c2 = SPEED_OF_LIGHT_M_S.powi(2);

        let clock_bias_s =
            rx.clock.bias.value * rx_gate - sv_clock.bias * sv_gate + system_bias.value;

        let clock_drift_s_s = rx.clock.drift.value * rx_gate - sv_clock.drift * sv_gate
            + system_drift.value * sv_gate;

        for (observable, datum) in rx_obs.observables.iter() {
            let mut variance = VarianceBudget::default();

            let (clock, estimate) = match observable {
                Observable::PseudoRange => {
                    let ifb_s = ifb.map(|ifb| ifb.value).unwrap_or_default();
                    let clock_m = SPEED_OF_LIGHT_M_S * (clock_bias_s + ifb_s);
                    (
                        clock_m,
                        terms.rho_m + terms.sagnac_m + terms.tropo_m + terms.iono_m + clock_m,
                    )
                },
                Observable::PhaseRange => {
                    let clock_m = SPEED_OF_LIGHT_M_S * clock_bias_s;
                    (
                        clock_m,
                        terms.rho_m + terms.sagnac_m + terms.tropo_m - terms.iono_m + clock_m,
                    )
                },
                Observable::Doppler => {
                    let clock_m_s = SPEED_OF_LIGHT_M_S * clock_drift_s_s;
                    (
                        clock_m_s,
                        terms.range_rate_m_s - terms.sagnac_rate_m_s + clock_m_s,
                    )
                },
            };

            let error_model = &self.cfg.error_model;

            variance.measurement = match observable {
                Observable::PseudoRange => {
                    error_model.pseudo_range_variance(constellation, elevation_rad, cn0_dbhz)
                },
                Observable::PhaseRange => {
                    error_model.phase_range_variance(constellation, elevation_rad, cn0_dbhz)
                },
                Observable::Doppler => error_model
                    .range_rate_variance(
                        signal.carrier,
                        signal_obs.channel,
                        elevation_rad,
                        cn0_dbhz,
                    )
                    .ok_or(Error::MissingFrequencyNumber(signal))?,
            };

            if undifferenced && observable.is_range() {
                let navigation = signal_obs
                    .navigation
                    .as_ref()
                    .ok_or(Error::MissingNavigationData(signal))?;

                variance.satellite_position = navigation.satellite_position_variance_m2();
                variance.ionosphere = ionosphere_variance_m2(terms.iono_m);
                variance.troposphere = troposphere_variance_m2(terms.tropo_m, rtm.elevation_rad);
            }

            if undifferenced && *observable == Observable::PseudoRange {
                variance.code_bias = error_model.code_bias_variance();
                if let Some(ifb) = ifb {
                    variance.inter_frequency_bias = ifb.variance();
                }
            }

            if mode != DifferenceMode::DoubleDifference {
                variance.receiver_clock = match observable {
                    Observable::Doppler => {
                        c2 * (rx.clock.drift.variance() + system_drift.variance())
                    },
                    _ => c2 * (rx.clock.bias.variance() + system_bias.variance()),
                };
            }

            let total = variance.total();
            if !total.is_finite() || total < 0.0 {
                return Err(Error::InvalidVariance {
                    signal,
                    role,
                    observable: *observable,
                    variance: total,
                });
            }

            traces.push(EstimationTrace {
                epoch,
                signal,
                role,
                observable: *observable,
                terms,
                clock,
                measurement: datum.measurement,
                estimate,
                variance,
            });
        }

        Ok(())
    }
}
