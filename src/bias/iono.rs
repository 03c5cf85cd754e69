use std::{collections::HashMap, f64::consts::PI};

use crate::{
    bias::BiasRuntime,
    cfg::Error as ConfigError,
    constants::{L1_FREQUENCY_HZ, SPEED_OF_LIGHT_M_S},
    error::Error,
    prelude::{Constellation, TimeScale},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Broadcast model error, as a fraction of the modeled delay
/// (the Klobuchar model compensates about 50 % RMS of the actual delay).
const BROADCAST_MODEL_ERROR_RATIO: f64 = 0.5;

/// Ionosphere delay models that we propose.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IonosphereModel {
    /// Do not compensate for the ionosphere
    None,
    /// Broadcast Klobuchar model (IS-GPS-200)
    #[default]
    Klobuchar,
}

impl std::fmt::Display for IonosphereModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Klobuchar => write!(f, "klobuchar"),
        }
    }
}

impl std::str::FromStr for IonosphereModel {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "none" => Ok(Self::None),
            "klobuchar" | "kb" => Ok(Self::Klobuchar),
            _ => Err(ConfigError::UnknownIonosphereModel(c)),
        }
    }
}

impl IonosphereModel {
    /// Returns ionosphere delay [m] for this signal.
    pub fn delay_m(
        &self,
        rtm: &BiasRuntime,
        corrections: &IonosphericCorrections,
    ) -> Result<f64, Error> {
        match self {
            Self::None => Ok(0.0),
            Self::Klobuchar => {
                let kb = corrections
                    .klobuchar_model()
                    .ok_or(Error::MissingIonosphericCorrections)?;
                let delay_l1_m = kb.delay_l1_s(rtm) * SPEED_OF_LIGHT_M_S;
                Ok(scale_to_frequency(delay_l1_m, L1_FREQUENCY_HZ, rtm.frequency_hz))
            },
        }
    }
}

/// Scales an ionosphere delay [m] observed on one frequency to another frequency.
pub fn scale_to_frequency(delay_m: f64, from_hz: f64, to_hz: f64) -> f64 {
    delay_m * (from_hz / to_hz).powi(2)
}

/// Variance [m²] of a modeled ionosphere delay. The delay is frequency specific,
/// so is its variance: (0.5 * delay)².
pub fn ionosphere_variance_m2(delay_m: f64) -> f64 {
    (BROADCAST_MODEL_ERROR_RATIO * delay_m).powi(2)
}

/// Klobuchar Model
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KbModel {
    /// alpha coefficients [s, s/sc, s/sc², s/sc³]
    pub alpha: (f64, f64, f64, f64),
    /// beta coefficients [s, s/sc, s/sc², s/sc³]
    pub beta: (f64, f64, f64, f64),
}

impl KbModel {
    /// Returns L1 vertical delay converted to slant delay [s] (IS-GPS-200, 20.3.3.5.2.5).
    /// Satellites below 1° of elevation are evaluated at 1°.
    pub fn delay_l1_s(&self, rtm: &BiasRuntime) -> f64 {
        let rtm = rtm.above_horizon();

        // semicircles
        let phi_u = rtm.rx_geodetic.latitude_rad / PI;
        let lambda_u = rtm.rx_geodetic.longitude_rad / PI;
        let elev = rtm.elevation_rad / PI;
        let azim = rtm.azimuth_rad;

        let t_gpst = rtm.epoch.to_time_scale(TimeScale::GPST);
        let (_, tow_nanos) = t_gpst.to_time_of_week();
        let tow = tow_nanos as f64 * 1.0E-9;

        let psi = 0.0137 / (elev + 0.11) - 0.022;

        let phi_i = (phi_u + psi * azim.cos()).clamp(-0.416, 0.416);
        let lambda_i = lambda_u + psi * azim.sin() / (phi_i * PI).cos();
        let phi_m = phi_i + 0.064 * ((lambda_i - 1.617) * PI).cos();

        let t = (4.32E4 * lambda_i + tow).rem_euclid(86.4E3);

        let f = 1.0 + 16.0 * (0.53 - elev).powi(3);

        let a_i = (self.alpha.0
            + self.alpha.1 * phi_m
            + self.alpha.2 * phi_m.powi(2)
            + self.alpha.3 * phi_m.powi(3))
        .max(0.0);

        let p_i = (self.beta.0
            + self.beta.1 * phi_m
            + self.beta.2 * phi_m.powi(2)
            + self.beta.3 * phi_m.powi(3))
        .max(72.0E3);

        let x_i = 2.0 * PI * (t - 50400.0) / p_i;

        if x_i.abs() < 1.57 {
            f * (5.0E-9 + a_i * (1.0 - x_i.powi(2) / 2.0 + x_i.powi(4) / 24.0))
        } else {
            f * 5.0E-9
        }
    }
}

/// Broadcast ionosphere correction parameters, collected from the navigation messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IonosphericCorrections {
    klobuchar: HashMap<Constellation, KbModel>,
}

impl IonosphericCorrections {
    /// Copies and returns with Klobuchar parameters broadcast by this [Constellation]
    pub fn with_klobuchar(&self, constellation: Constellation, model: KbModel) -> Self {
        let mut s = self.clone();
        s.klobuchar.insert(constellation, model);
        s
    }

    /// Klobuchar parameters broadcast by this [Constellation]
    pub fn klobuchar(&self, constellation: Constellation) -> Option<&KbModel> {
        self.klobuchar.get(&constellation)
    }

    /// Selects the Klobuchar parameters, preferably broadcast by GPS, or QZSS.
    pub(crate) fn klobuchar_model(&self) -> Option<&KbModel> {
        self.klobuchar(Constellation::GPS)
            .or_else(|| self.klobuchar(Constellation::QZSS))
    }
}
