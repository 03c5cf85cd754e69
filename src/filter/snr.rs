use std::collections::HashMap;

use crate::prelude::Carrier;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 10° wide bins, from the horizon up to zenith
const ELEVATION_BINS: usize = 9;

/// Minimal signal quality [dB-Hz] per elevation bin: [0°, 10°[, [10°, 20°[ .. [80°, 90°].
/// Thresholds are linearly interpolated between bin centers.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SnrThresholds(pub [f64; ELEVATION_BINS]);

impl Default for SnrThresholds {
    fn default() -> Self {
        Self::constant(0.0)
    }
}

impl SnrThresholds {
    /// Same threshold at all elevations
    pub fn constant(cn0_dbhz: f64) -> Self {
        Self([cn0_dbhz; ELEVATION_BINS])
    }

    /// Minimal CN0 [dB-Hz] at this elevation [rad]
    pub fn min_cn0_dbhz(&self, elevation_rad: f64) -> f64 {
        let bin = (elevation_rad.to_degrees() + 5.0) / 10.0;
        let upper = bin.floor();

        if upper < 1.0 {
            return self.0[0];
        }
        if upper >= ELEVATION_BINS as f64 {
            return self.0[ELEVATION_BINS - 1];
        }

        let upper_index = upper as usize;
        let (low, high) = (self.0[upper_index - 1], self.0[upper_index]);
        low + (bin - upper) * (high - low)
    }

    fn is_valid(&self) -> bool {
        self.0.iter().all(|cn0| cn0.is_finite())
    }
}

/// Signal quality mask of one receiver.
/// Carriers without [SnrThresholds] are not masked.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SnrMask {
    /// [SnrThresholds] per [Carrier]
    #[cfg_attr(feature = "serde", serde(default))]
    pub thresholds: HashMap<Carrier, SnrThresholds>,
}

impl SnrMask {
    /// Builds a [SnrMask] applying the same [SnrThresholds] to all these carriers
    pub fn uniform(carriers: &[Carrier], thresholds: SnrThresholds) -> Self {
        Self {
            thresholds: carriers.iter().map(|c| (*c, thresholds)).collect(),
        }
    }

    /// Copies and returns with [SnrThresholds] for this [Carrier]
    pub fn with_thresholds(&self, carrier: Carrier, thresholds: SnrThresholds) -> Self {
        let mut s = self.clone();
        s.thresholds.insert(carrier, thresholds);
        s
    }

    /// True when this signal quality [dB-Hz] passes the mask,
    /// at this elevation [rad].
    pub fn check(&self, carrier: Carrier, elevation_rad: f64, cn0_dbhz: f64) -> bool {
        match self.thresholds.get(&carrier) {
            Some(thresholds) => cn0_dbhz >= thresholds.min_cn0_dbhz(elevation_rad),
            None => true,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.thresholds.values().all(|t| t.is_valid())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    const RAMP: SnrThresholds =
        SnrThresholds([30.0, 32.0, 34.0, 36.0, 38.0, 40.0, 42.0, 44.0, 46.0]);

    #[rstest]
    #[case(-3.0, 30.0)]
    #[case(0.0, 30.0)]
    #[case(5.0, 30.0)]
    #[case(10.0, 31.0)]
    #[case(15.0, 32.0)]
    #[case(47.5, 38.5)]
    #[case(85.0, 46.0)]
    #[case(90.0, 46.0)]
    fn thresholds_interpolation(#[case] elev_deg: f64, #[case] expected: f64) {
        let cn0 = RAMP.min_cn0_dbhz(elev_deg.to_radians());
        assert!((cn0 - expected).abs() < 1.0E-9, "{}°: {}", elev_deg, cn0);
    }

    #[test]
    fn mask_per_carrier() {
        let mask = SnrMask::uniform(&[Carrier::L1, Carrier::E1], SnrThresholds::constant(35.0))
            .with_thresholds(Carrier::L5, RAMP);

        let elev = 30.0_f64.to_radians();
        assert!(mask.check(Carrier::L1, elev, 35.0));
        assert!(!mask.check(Carrier::E1, elev, 34.9));
        assert!(!mask.check(Carrier::L5, elev, 33.0));
        assert!(mask.check(Carrier::L5, elev, 34.0));

        // not masked
        assert!(mask.check(Carrier::L2, elev, 10.0));
        assert!(SnrMask::default().check(Carrier::L1, elev, 0.0));
    }
}
