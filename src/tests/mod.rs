mod filter;

use std::{
    str::FromStr,
    sync::{Arc, Once},
};

use log::LevelFilter;
use map_3d::{aer2ecef, deg2rad, Ellipsoid};

use crate::{
    geometry::{geodetic_to_ecef, range},
    prelude::*,
};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Trace)
            .init();
    });
}

pub fn epoch() -> Epoch {
    Epoch::from_str("2023-03-15T14:00:00 GPST").unwrap()
}

/// IS-GPS-200 reference Klobuchar coefficients
pub fn klobuchar_corrections() -> IonosphericCorrections {
    IonosphericCorrections::default().with_klobuchar(
        Constellation::GPS,
        KbModel {
            alpha: (0.1118E-07, -0.7451E-08, -0.5961E-07, 0.1192E-06),
            beta: (0.1167E+06, -0.2294E+06, -0.1311E+06, 0.1049E+07),
        },
    )
}

/// No atmosphere compensation and no residual code bias:
/// the variance reduces to the measurement noise floor.
pub fn no_atmosphere_config() -> Config {
    Config {
        ionosphere: IonosphereModel::None,
        troposphere: TroposphereSelection::none(),
        error_model: MeasurementErrorModel {
            code_bias_std_dev_m: 0.0,
            ..Default::default()
        },
    }
}

pub fn systems() -> [Constellation; 3] {
    [Constellation::GPS, Constellation::Galileo, Constellation::Glonass]
}

/// Receiver on the equator, at the prime meridian
pub fn equator_receiver() -> Receiver {
    Receiver::new(ReceiverRole::Rover, Vector3::new(6378137.0, 0.0, 0.0))
        .with_clock(ReceiverClock::with_systems(&[Constellation::GPS]))
}

pub fn g01_l1() -> SignalId {
    SignalId::new(SV::from_str("G01").unwrap(), Carrier::L1)
}

/// Satellite at 20200 km above the equator receiver, on its horizon,
/// observed in code, phase and doppler without signal quality.
pub fn equator_observations(
    rx: &Receiver,
    sv_clock: SatelliteClock,
    navigation: Arc<dyn NavigationData>,
) -> Observations {
    let rx_obs = ReceiverObservation::new(
        rx,
        Vector3::new(6378137.0, 0.0, 20200000.0),
        Vector3::zeros(),
        sv_clock,
    )
    .with_pseudo_range_m(20200012.0)
    .with_phase_range_m(20200008.0)
    .with_range_rate_m_s(0.1);

    let mut observations = Observations::new(epoch());
    observations.insert(
        g01_l1(),
        SignalObservation::new(Some(navigation)).with_receiver_observation(rx_obs),
    );
    observations
}

/// Completes this rover with the [base] station, as expected by the estimator.
pub fn with_base(rover: Receiver) -> [Receiver; ReceiverRole::COUNT] {
    [rover, base()]
}

fn receiver(role: ReceiverRole, lat_deg: f64, lon_deg: f64, alt_m: f64) -> Receiver {
    let geodetic = GeodeticPosition::from_degrees(lat_deg, lon_deg, alt_m);
    Receiver::new(role, geodetic_to_ecef(&geodetic))
        .with_clock(ReceiverClock::with_systems(&systems()))
}

/// Rover, close to Toulouse
pub fn rover() -> Receiver {
    receiver(ReceiverRole::Rover, 43.60, 1.44, 150.0)
}

/// Base station, about 10 km away from the [rover]
pub fn base() -> Receiver {
    receiver(ReceiverRole::Base, 43.66, 1.52, 210.0)
}

/// ECEF position of a satellite seen from this receiver
pub fn sv_position(rx: &Receiver, elev_deg: f64, azim_deg: f64, range_m: f64) -> Vector3<f64> {
    let geodetic = rx.geodetic();
    let (x, y, z) = aer2ecef(
        deg2rad(azim_deg),
        deg2rad(elev_deg),
        range_m,
        geodetic.latitude_rad,
        geodetic.longitude_rad,
        geodetic.altitude_m,
        Ellipsoid::WGS84,
    );
    Vector3::new(x, y, z)
}

/// Satellite constellation in sight, as seen from the [rover]:
/// (signal, frequency channel, elevation [°], azimuth [°])
pub fn sky() -> Vec<(SignalId, Option<i8>, f64, f64)> {
    vec![
        (SignalId::new(SV::from_str("G05").unwrap(), Carrier::L1), None, 62.0, 45.0),
        (SignalId::new(SV::from_str("G05").unwrap(), Carrier::L2), None, 62.0, 45.0),
        (SignalId::new(SV::from_str("G18").unwrap(), Carrier::L1), None, 18.0, 130.0),
        (SignalId::new(SV::from_str("E11").unwrap(), Carrier::E1), None, 35.0, 210.0),
        (SignalId::new(SV::from_str("R03").unwrap(), Carrier::G1), Some(-2), 48.0, 300.0),
    ]
}

/// Builds the [Observations] of these receivers, for the [sky] in sight.
/// Measurements are geometric ranges plus a few meters.
pub fn observations(receivers: &[Receiver], sv_clock: SatelliteClock) -> Observations {
    let mut observations = Observations::new(epoch());
    let sv_velocity = Vector3::new(1200.0, -2400.0, 800.0);

    for (signal, channel, elev_deg, azim_deg) in sky() {
        let sv_pos = sv_position(&receivers[0], elev_deg, azim_deg, 21.0E6);

        let mut signal_obs = SignalObservation::new(Some(Arc::new(
            SignalInSpaceAccuracy::from_gps_ura_index(0),
        )));

        if let Some(channel) = channel {
            signal_obs = signal_obs.with_channel(channel);
        }

        for rx in receivers.iter() {
            let rho = range(&sv_pos, rx.position_ecef_m());
            let rx_obs = ReceiverObservation::new(rx, sv_pos, sv_velocity, sv_clock)
                .with_cn0_dbhz(42.0)
                .with_pseudo_range_m(rho + 5.0)
                .with_phase_range_m(rho + 2.0)
                .with_range_rate_m_s(-350.0);
            signal_obs = signal_obs.with_receiver_observation(rx_obs);
        }

        observations.insert(signal, signal_obs);
    }

    observations
}

/// (signal, role, observable) -> (estimate, variance) of all observations
pub fn estimates(observations: &Observations) -> Vec<(SignalId, usize, Observable, f64, f64)> {
    let mut estimates = Vec::new();
    for (signal, signal_obs) in observations.signals.iter() {
        for (index, rx_obs) in signal_obs.receivers.iter().enumerate() {
            for (observable, datum) in rx_obs.observables.iter() {
                estimates.push((*signal, index, *observable, datum.estimate, datum.variance));
            }
        }
    }
    estimates
}

/// Runs the estimator and collects all [EstimationTrace]s
pub fn run(
    estimator: &ObservationEstimator,
    observations: &mut Observations,
    receivers: &[Receiver],
    corrections: &IonosphericCorrections,
    mode: DifferenceMode,
) -> Result<Vec<EstimationTrace>, Error> {
    let mut traces = Vec::new();
    let mut observer = |trace: &EstimationTrace| traces.push(*trace);
    estimator.estimate_with_observer(observations, receivers, corrections, mode, &mut observer)?;
    Ok(traces)
}

/// Finds the [EstimationTrace] of this observation
pub fn find(
    traces: &[EstimationTrace],
    signal: SignalId,
    role: ReceiverRole,
    observable: Observable,
) -> EstimationTrace {
    *traces
        .iter()
        .find(|t| t.signal == signal && t.role == role && t.observable == observable)
        .unwrap_or_else(|| panic!("missing {} [{}] {}", signal, role, observable))
}
