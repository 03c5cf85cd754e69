//! Selection of the signals worth estimating
use std::collections::{BTreeSet, HashMap};

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod snr;

pub use snr::{SnrMask, SnrThresholds};

use crate::{
    cfg::Error as ConfigError,
    prelude::{
        Carrier, Constellation, Observable, Observations, ReceiverRole, SignalId,
        SignalObservation, SV,
    },
};

fn default_constellations() -> BTreeSet<Constellation> {
    [Constellation::GPS, Constellation::Galileo].into_iter().collect()
}

fn default_carriers() -> BTreeSet<Carrier> {
    [
        Carrier::L1,
        Carrier::L2,
        Carrier::L5,
        Carrier::E1,
        Carrier::E5A,
        Carrier::E5B,
        Carrier::E5,
        Carrier::E6,
    ]
    .into_iter()
    .collect()
}

fn default_elevation_mask_deg() -> f64 {
    10.0
}

fn default_same_snr_mask() -> bool {
    true
}

fn default_used_observables() -> BTreeSet<Observable> {
    [
        Observable::PseudoRange,
        Observable::PhaseRange,
        Observable::Doppler,
    ]
    .into_iter()
    .collect()
}

/// [ObservationFilter] selects the [Observations] that are passed to the
/// [ObservationEstimator](crate::prelude::ObservationEstimator).
/// A signal is retained when:
/// - its constellation and carrier are selected and its satellite is not excluded
/// - it is not temporarily excluded
/// - navigation data is available
/// - every receiver sampled its pseudo range
/// - it is above the elevation mask and passes the [SnrMask] of every receiver
/// - every needed [Observable] was sampled by all receivers
///
/// Observables that are not used, or not sampled by every receiver, are discarded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationFilter {
    /// Selected [Constellation]s
    #[cfg_attr(feature = "serde", serde(default = "default_constellations"))]
    pub constellations: BTreeSet<Constellation>,
    /// Selected [Carrier]s
    #[cfg_attr(feature = "serde", serde(default = "default_carriers"))]
    pub carriers: BTreeSet<Carrier>,
    /// Satellites that are never used
    #[cfg_attr(feature = "serde", serde(default))]
    pub excluded_satellites: Vec<SV>,
    /// Elevation mask [°]
    #[cfg_attr(feature = "serde", serde(default = "default_elevation_mask_deg"))]
    pub elevation_mask_deg: f64,
    /// [SnrMask] per [ReceiverRole]
    #[cfg_attr(feature = "serde", serde(default))]
    pub snr_masks: [SnrMask; ReceiverRole::COUNT],
    /// Applies the rover [SnrMask] to every receiver
    #[cfg_attr(feature = "serde", serde(default = "default_same_snr_mask"))]
    pub same_snr_mask: bool,
    /// [Observable]s that may be estimated
    #[cfg_attr(feature = "serde", serde(default = "default_used_observables"))]
    pub used_observables: BTreeSet<Observable>,
    /// [Observable]s a signal must carry to be retained
    #[cfg_attr(feature = "serde", serde(default))]
    pub needed_observables: BTreeSet<Observable>,
    /// Remaining number of epochs, per temporarily excluded signal
    #[cfg_attr(feature = "serde", serde(skip))]
    temporary_exclusions: HashMap<SignalId, usize>,
}

impl Default for ObservationFilter {
    fn default() -> Self {
        Self {
            constellations: default_constellations(),
            carriers: default_carriers(),
            excluded_satellites: Vec::new(),
            elevation_mask_deg: default_elevation_mask_deg(),
            snr_masks: Default::default(),
            same_snr_mask: default_same_snr_mask(),
            used_observables: default_used_observables(),
            needed_observables: BTreeSet::new(),
            temporary_exclusions: HashMap::new(),
        }
    }
}

impl ObservationFilter {
    /// Copies and returns with these [Constellation]s selected
    pub fn with_constellations(&self, constellations: &[Constellation]) -> Self {
        let mut s = self.clone();
        s.constellations = constellations.iter().copied().collect();
        s
    }

    /// Copies and returns with these [Carrier]s selected
    pub fn with_carriers(&self, carriers: &[Carrier]) -> Self {
        let mut s = self.clone();
        s.carriers = carriers.iter().copied().collect();
        s
    }

    /// Copies and returns with this satellite excluded
    pub fn with_excluded_satellite(&self, sv: SV) -> Self {
        let mut s = self.clone();
        if !s.excluded_satellites.contains(&sv) {
            s.excluded_satellites.push(sv);
        }
        s
    }

    /// Copies and returns with this elevation mask [°]
    pub fn with_elevation_mask_deg(&self, mask_deg: f64) -> Self {
        let mut s = self.clone();
        s.elevation_mask_deg = mask_deg;
        s
    }

    /// Copies and returns with this [SnrMask] for this [ReceiverRole]
    pub fn with_snr_mask(&self, role: ReceiverRole, mask: SnrMask) -> Self {
        let mut s = self.clone();
        s.snr_masks[role.index()] = mask;
        s
    }

    /// Copies and returns, applying the rover [SnrMask] to all receivers or not
    pub fn with_same_snr_mask(&self, same: bool) -> Self {
        let mut s = self.clone();
        s.same_snr_mask = same;
        s
    }

    /// Copies and returns with these used [Observable]s
    pub fn with_used_observables(&self, observables: &[Observable]) -> Self {
        let mut s = self.clone();
        s.used_observables = observables.iter().copied().collect();
        s
    }

    /// Copies and returns with these needed [Observable]s
    pub fn with_needed_observables(&self, observables: &[Observable]) -> Self {
        let mut s = self.clone();
        s.needed_observables = observables.iter().copied().collect();
        s
    }

    /// Verifies the filter parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.elevation_mask_deg) {
            return Err(ConfigError::InvalidObservationFilter("elevation mask"));
        }
        if !self.snr_masks.iter().all(|mask| mask.is_valid()) {
            return Err(ConfigError::InvalidObservationFilter("snr mask"));
        }
        if !self.needed_observables.is_subset(&self.used_observables) {
            return Err(ConfigError::InvalidObservationFilter(
                "needed observables must be used",
            ));
        }
        Ok(())
    }

    /// [SnrMask] applied to this [ReceiverRole]
    pub fn snr_mask(&self, role: ReceiverRole) -> &SnrMask {
        if self.same_snr_mask {
            &self.snr_masks[ReceiverRole::Rover.index()]
        } else {
            &self.snr_masks[role.index()]
        }
    }

    /// True when this satellite may be used
    pub fn is_satellite_allowed(&self, sv: SV) -> bool {
        self.constellations.contains(&sv.constellation) && !self.excluded_satellites.contains(&sv)
    }

    /// True when this signal may be used
    pub fn is_signal_allowed(&self, signal: SignalId) -> bool {
        self.is_satellite_allowed(signal.sv) && self.carriers.contains(&signal.carrier)
    }

    /// Skips this signal during the next `epochs` selections.
    /// A signal that is already excluded keeps its remaining count.
    pub fn exclude_signal_temporarily(&mut self, signal: SignalId, epochs: usize) {
        if epochs == 0 {
            return;
        }
        self.temporary_exclusions.entry(signal).or_insert(epochs);
    }

    /// True when this signal is temporarily excluded
    pub fn is_temporarily_excluded(&self, signal: SignalId) -> bool {
        self.temporary_exclusions.contains_key(&signal)
    }

    /// Clears all temporary exclusions
    pub fn reset(&mut self) {
        self.temporary_exclusions.clear();
    }

    /// Drops the signals that should not be estimated, and their unused observables.
    /// Returns the number of dropped signals.
    pub fn select(&mut self, observations: &mut Observations, ignore_elevation_mask: bool) -> usize {
        let epoch = observations.epoch;
        let total = observations.signals.len();

        let temporary = &mut self.temporary_exclusions;
        observations
            .signals
            .retain(|signal, _| match temporary.get_mut(signal) {
                Some(remaining) => {
                    *remaining -= 1;
                    if *remaining == 0 {
                        temporary.remove(signal);
                    }
                    debug!("{} ({}): temporarily excluded", epoch, signal);
                    false
                },
                None => true,
            });

        let filter = &*self;
        observations.signals.retain(|signal, signal_obs| {
            match filter.retain_signal(*signal, signal_obs, ignore_elevation_mask) {
                Ok(()) => true,
                Err(reason) => {
                    debug!("{} ({}): {}", epoch, signal, reason);
                    false
                },
            }
        });

        total - observations.signals.len()
    }

    /// Checks a single signal, dropping its unused observables
    fn retain_signal(
        &self,
        signal: SignalId,
        signal_obs: &mut SignalObservation,
        ignore_elevation_mask: bool,
    ) -> Result<(), &'static str> {
        if !self.is_satellite_allowed(signal.sv) {
            return Err("satellite not selected");
        }
        if !self.carriers.contains(&signal.carrier) {
            return Err("carrier not selected");
        }
        if signal_obs.navigation.is_none() {
            return Err("missing navigation data");
        }
        if !signal_obs.observed_by_all(Observable::PseudoRange) {
            return Err("pseudo range not sampled by every receiver");
        }

        if !ignore_elevation_mask {
            let mask_rad = self.elevation_mask_deg.to_radians();

            for (rx_obs, role) in signal_obs.receivers.iter().zip(ReceiverRole::ALL) {
                let elevation_rad = rx_obs.elevation_rad();
                if elevation_rad < mask_rad {
                    return Err("below elevation mask");
                }

                if let Some(cn0_dbhz) = rx_obs.cn0_dbhz {
                    if !self
                        .snr_mask(role)
                        .check(signal.carrier, elevation_rad, cn0_dbhz)
                    {
                        return Err("snr mask");
                    }
                }
            }
        }

        let retained = self
            .used_observables
            .iter()
            .copied()
            .filter(|observable| signal_obs.observed_by_all(*observable))
            .collect::<BTreeSet<_>>();

        if !self.needed_observables.is_subset(&retained) {
            return Err("missing needed observable");
        }

        for rx_obs in signal_obs.receivers.iter_mut() {
            rx_obs
                .observables
                .retain(|observable, _| retained.contains(observable));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_filter() {
        let filter = ObservationFilter::default();
        assert!(filter.validate().is_ok());
        assert_eq!(filter.elevation_mask_deg, 10.0);
        assert!(filter.same_snr_mask);
        assert_eq!(filter.used_observables.len(), 3);
        assert!(filter.needed_observables.is_empty());

        let g01 = SV::new(Constellation::GPS, 1);
        assert!(filter.is_signal_allowed(SignalId::new(g01, Carrier::L1)));
        assert!(!filter.is_signal_allowed(SignalId::new(g01, Carrier::L6)));
        assert!(!filter.is_satellite_allowed(SV::new(Constellation::Glonass, 3)));

        let filter = filter.with_excluded_satellite(g01);
        assert!(!filter.is_satellite_allowed(g01));
    }

    #[test]
    fn invalid_filter() {
        let filter = ObservationFilter::default().with_elevation_mask_deg(95.0);
        assert_eq!(
            filter.validate(),
            Err(ConfigError::InvalidObservationFilter("elevation mask"))
        );

        let filter = ObservationFilter::default()
            .with_used_observables(&[Observable::PseudoRange])
            .with_needed_observables(&[Observable::Doppler]);
        assert!(filter.validate().is_err());

        let filter = ObservationFilter::default().with_snr_mask(
            ReceiverRole::Base,
            SnrMask::uniform(&[Carrier::L1], SnrThresholds::constant(f64::NAN)),
        );
        assert!(filter.validate().is_err());
    }

    #[test]
    fn snr_mask_per_role() {
        let rover_mask = SnrMask::uniform(&[Carrier::L1], SnrThresholds::constant(40.0));
        let base_mask = SnrMask::uniform(&[Carrier::L1], SnrThresholds::constant(30.0));

        let filter = ObservationFilter::default()
            .with_snr_mask(ReceiverRole::Rover, rover_mask.clone())
            .with_snr_mask(ReceiverRole::Base, base_mask.clone());

        assert_eq!(filter.snr_mask(ReceiverRole::Base), &rover_mask);

        let filter = filter.with_same_snr_mask(false);
        assert_eq!(filter.snr_mask(ReceiverRole::Rover), &rover_mask);
        assert_eq!(filter.snr_mask(ReceiverRole::Base), &base_mask);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn filter_serdes() {
        let filter = ObservationFilter::default()
            .with_elevation_mask_deg(15.0)
            .with_excluded_satellite(SV::new(Constellation::Galileo, 12))
            .with_snr_mask(
                ReceiverRole::Rover,
                SnrMask::uniform(&[Carrier::L1, Carrier::E1], SnrThresholds::constant(35.0)),
            )
            .with_needed_observables(&[Observable::PhaseRange]);

        let content = serde_json::to_string_pretty(&filter).unwrap();
        let parsed: ObservationFilter = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, filter);

        let parsed: ObservationFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, ObservationFilter::default());

        let parsed: ObservationFilter =
            serde_json::from_str(r#"{ "elevation_mask_deg": 5.0 }"#).unwrap();
        assert_eq!(parsed.elevation_mask_deg, 5.0);
        assert_eq!(parsed.constellations, default_constellations());
    }
}
