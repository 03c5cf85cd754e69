#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [NavigationData] gives access to the quality of the orbital state
/// the satellite position was resolved from (broadcast ephemeris, precise
/// products..). Implement it on your own navigation data storage, or use
/// the proposed [SignalInSpaceAccuracy].
pub trait NavigationData: std::fmt::Debug + Send + Sync {
    /// Returns satellite position variance [m²]
    fn satellite_position_variance_m2(&self) -> f64;
}

/// Broadcast signal in space accuracy (user range accuracy) [m]
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalInSpaceAccuracy(pub f64);

impl SignalInSpaceAccuracy {
    /// No accuracy prediction available: use at own risk.
    pub const NO_PREDICTION_M: f64 = 6144.0;

    /// Builds [SignalInSpaceAccuracy] from a GPS URA index (IS-GPS-200, 20.3.3.3.1.3)
    pub fn from_gps_ura_index(index: u8) -> Self {
        const LUT: [f64; 15] = [
            2.4, 3.4, 4.85, 6.85, 9.65, 13.65, 24.0, 48.0, 96.0, 192.0, 384.0, 768.0, 1536.0,
            3072.0, 6144.0,
        ];
        Self(
            LUT.get(index as usize)
                .copied()
                .unwrap_or(Self::NO_PREDICTION_M),
        )
    }

    /// Builds [SignalInSpaceAccuracy] from a Galileo SISA index (Galileo OS SIS ICD, 5.1.12)
    pub fn from_galileo_sisa_index(index: u8) -> Self {
        let idx = index as f64;
        let value = match index {
            0..=49 => idx * 0.01,
            50..=74 => 0.5 + (idx - 50.0) * 0.02,
            75..=99 => 1.0 + (idx - 75.0) * 0.04,
            100..=125 => 2.0 + (idx - 100.0) * 0.16,
            _ => Self::NO_PREDICTION_M,
        };
        Self(value)
    }
}

impl NavigationData for SignalInSpaceAccuracy {
    fn satellite_position_variance_m2(&self) -> f64 {
        self.0.powi(2)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gps_ura() {
        assert_eq!(SignalInSpaceAccuracy::from_gps_ura_index(0).0, 2.4);
        assert_eq!(SignalInSpaceAccuracy::from_gps_ura_index(6).0, 24.0);
        assert_eq!(
            SignalInSpaceAccuracy::from_gps_ura_index(15).0,
            SignalInSpaceAccuracy::NO_PREDICTION_M
        );
        assert!(
            (SignalInSpaceAccuracy::from_gps_ura_index(1).satellite_position_variance_m2()
                - 11.56)
                .abs()
                < 1.0E-9
        );
    }

    #[test]
    fn galileo_sisa() {
        for (index, expected) in [
            (0, 0.0),
            (10, 0.10),
            (50, 0.5),
            (60, 0.7),
            (75, 1.0),
            (80, 1.2),
            (100, 2.0),
            (125, 6.0),
            (255, SignalInSpaceAccuracy::NO_PREDICTION_M),
        ] {
            let sisa = SignalInSpaceAccuracy::from_galileo_sisa_index(index);
            assert!(
                (sisa.0 - expected).abs() < 1.0E-9,
                "sisa #{}: {} expecting {}",
                index,
                sisa.0,
                expected
            );
        }
    }
}
