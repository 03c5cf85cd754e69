use std::collections::BTreeSet;

use crate::{
    prelude::*,
    tests::{base, init_logger, klobuchar_corrections, observations, rover, run, sky},
};

/// Rover and base [Observations] of the whole [sky]
fn sky_observations() -> Observations {
    observations(&[rover(), base()], SatelliteClock::default())
}

fn signal(index: usize) -> SignalId {
    sky()[index].0
}

/// [sky] signals at these indexes
fn signals(indexes: &[usize]) -> BTreeSet<SignalId> {
    indexes.iter().map(|index| signal(*index)).collect()
}

fn retained(observations: &Observations) -> BTreeSet<SignalId> {
    observations.signals.keys().copied().collect()
}

#[test]
fn default_selection() {
    init_logger();

    let mut filter = ObservationFilter::default();
    let mut obs = sky_observations();

    // glonass is not selected by default
    assert_eq!(filter.select(&mut obs, false), 1);
    assert_eq!(retained(&obs), signals(&[0, 1, 2, 3]));

    for signal_obs in obs.signals.values() {
        assert_eq!(signal_obs.receivers.len(), 2);
        for rx_obs in signal_obs.receivers.iter() {
            assert_eq!(rx_obs.observables.len(), 3);
        }
    }
}

#[test]
fn elevation_mask() {
    init_logger();

    let g18 = signal(2);
    let mut filter = ObservationFilter::default()
        .with_constellations(&[
            Constellation::GPS,
            Constellation::Galileo,
            Constellation::Glonass,
        ])
        .with_carriers(&[Carrier::L1, Carrier::L2, Carrier::E1, Carrier::G1])
        .with_elevation_mask_deg(20.0);

    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, false), 1);
    assert!(!obs.signals.contains_key(&g18));

    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, true), 0);
    assert!(obs.signals.contains_key(&g18));
}

#[test]
fn snr_masks() {
    init_logger();

    // every signal is tracked at 42 dB-Hz
    let l1_mask = SnrMask::uniform(&[Carrier::L1], SnrThresholds::constant(45.0));

    let mut filter =
        ObservationFilter::default().with_snr_mask(ReceiverRole::Rover, l1_mask.clone());
    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, false), 3);
    assert_eq!(retained(&obs), signals(&[1, 3]));

    // masks are ignored along with the elevation mask
    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, true), 1);

    // the base mask is not used unless requested
    let mut filter = ObservationFilter::default().with_snr_mask(ReceiverRole::Base, l1_mask);
    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, false), 1);

    let mut filter = filter.with_same_snr_mask(false);
    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, false), 3);

    // signals without signal quality are not masked
    let mut obs = sky_observations();
    for index in [0, 2] {
        if let Some(signal_obs) = obs.signals.get_mut(&signal(index)) {
            for rx_obs in signal_obs.receivers.iter_mut() {
                rx_obs.cn0_dbhz = None;
            }
        }
    }
    assert_eq!(filter.select(&mut obs, false), 1);

    // elevation dependent thresholds
    let ramp = SnrThresholds([50.0, 45.0, 40.0, 40.0, 40.0, 40.0, 40.0, 40.0, 40.0]);
    let mut filter = ObservationFilter::default()
        .with_snr_mask(ReceiverRole::Rover, SnrMask::uniform(&[Carrier::L1], ramp));
    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, false), 2);
    assert!(!obs.signals.contains_key(&signal(2)));
}

#[test]
fn excluded_satellite() {
    init_logger();

    let (g05_l1, g05_l2) = (signal(0), signal(1));
    let mut filter = ObservationFilter::default().with_excluded_satellite(g05_l1.sv);

    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, false), 3);
    assert!(!obs.signals.contains_key(&g05_l1));
    assert!(!obs.signals.contains_key(&g05_l2));

    // single carrier
    let mut filter = ObservationFilter::default().with_carriers(&[Carrier::L2, Carrier::E1]);
    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, false), 3);
    assert_eq!(retained(&obs), signals(&[1, 3]));
}

#[test]
fn temporary_exclusion() {
    init_logger();

    let g18 = signal(2);
    let mut filter = ObservationFilter::default();

    filter.exclude_signal_temporarily(g18, 0);
    assert!(!filter.is_temporarily_excluded(g18));

    filter.exclude_signal_temporarily(g18, 2);
    // a pending exclusion is not extended
    filter.exclude_signal_temporarily(g18, 10);

    for _ in 0..2 {
        assert!(filter.is_temporarily_excluded(g18));
        let mut obs = sky_observations();
        assert_eq!(filter.select(&mut obs, false), 2);
        assert!(!obs.signals.contains_key(&g18));
    }

    assert!(!filter.is_temporarily_excluded(g18));
    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, false), 1);

    filter.exclude_signal_temporarily(g18, 5);
    filter.reset();
    assert!(!filter.is_temporarily_excluded(g18));

    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, false), 1);
}

#[test]
fn used_and_needed_observables() {
    init_logger();

    let mut filter = ObservationFilter::default()
        .with_used_observables(&[Observable::PseudoRange, Observable::Doppler]);

    let mut obs = sky_observations();
    assert_eq!(filter.select(&mut obs, false), 1);
    for signal_obs in obs.signals.values() {
        for rx_obs in signal_obs.receivers.iter() {
            assert!(rx_obs.datum(Observable::PhaseRange).is_none());
            assert!(rx_obs.datum(Observable::Doppler).is_some());
        }
    }

    let (g05_l2, e11) = (signal(1), signal(3));

    let mut obs = sky_observations();
    for sig in [g05_l2, e11] {
        if let Some(signal_obs) = obs.signals.get_mut(&sig) {
            signal_obs.receivers[1]
                .observables
                .remove(&Observable::PhaseRange);
        }
    }

    // phase is dropped from every receiver when one of them misses it
    let mut filter = ObservationFilter::default();
    let mut single = obs.clone();
    assert_eq!(filter.select(&mut single, false), 1);
    assert!(single.signals[&e11]
        .receivers
        .iter()
        .all(|rx_obs| rx_obs.datum(Observable::PhaseRange).is_none()));

    let mut filter = filter.with_needed_observables(&[Observable::PhaseRange]);
    assert_eq!(filter.select(&mut obs, false), 3);
    assert_eq!(retained(&obs), signals(&[0, 2]));
}

#[test]
fn pseudo_range_and_navigation_required() {
    init_logger();

    let (g05_l1, g18) = (signal(0), signal(2));
    let mut obs = sky_observations();

    if let Some(signal_obs) = obs.signals.get_mut(&g05_l1) {
        signal_obs.receivers[1]
            .observables
            .remove(&Observable::PseudoRange);
    }
    if let Some(signal_obs) = obs.signals.get_mut(&g18) {
        signal_obs.navigation = None;
    }

    let mut filter = ObservationFilter::default();
    assert_eq!(filter.select(&mut obs, false), 3);
    assert_eq!(retained(&obs), signals(&[1, 3]));
}

#[test]
fn estimation_of_selected_signals() {
    init_logger();

    let estimator = ObservationEstimator::new(Config::default()).unwrap();
    let receivers = [rover(), base()];

    let mut filter = ObservationFilter::default()
        .with_used_observables(&[Observable::PseudoRange, Observable::PhaseRange]);
    assert!(filter.validate().is_ok());

    let mut obs = sky_observations();
    filter.select(&mut obs, false);

    let traces = run(
        &estimator,
        &mut obs,
        &receivers,
        &klobuchar_corrections(),
        DifferenceMode::DoubleDifference,
    )
    .unwrap();

    // 4 signals, 2 receivers, 2 observables
    assert_eq!(traces.len(), 16);
    assert!(traces
        .iter()
        .all(|t| t.observable.is_range() && t.signal.constellation() != Constellation::Glonass));
}
