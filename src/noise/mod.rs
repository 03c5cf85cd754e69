//! Measurement noise floor
use crate::{
    cfg::Error as ConfigError,
    constants::MIN_ELEVATION_RAD,
    prelude::{Carrier, Constellation},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod weighting;
pub use weighting::{ElevationMappingFunction, WeightingModel};

/// CN0 used when the observation does not report signal quality [dB-Hz]
pub const DEFAULT_CN0_DBHZ: f64 = 1.0;

/// Per [Constellation] error factors, scaling the zenith noise.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SystemErrorFactors {
    pub gps: f64,
    pub glonass: f64,
    pub galileo: f64,
    pub beidou: f64,
    pub qzss: f64,
    pub irnss: f64,
    /// Any geostationary augmentation system
    pub sbas: f64,
}

impl Default for SystemErrorFactors {
    fn default() -> Self {
        Self {
            gps: 1.0,
            glonass: 1.5,
            galileo: 1.0,
            beidou: 1.0,
            qzss: 1.0,
            irnss: 1.5,
            sbas: 3.0,
        }
    }
}

impl SystemErrorFactors {
    /// Error factor of this [Constellation]
    pub fn factor(&self, constellation: Constellation) -> f64 {
        match constellation {
            Constellation::GPS => self.gps,
            Constellation::Glonass => self.glonass,
            Constellation::Galileo => self.galileo,
            Constellation::BeiDou => self.beidou,
            Constellation::QZSS => self.qzss,
            Constellation::IRNSS => self.irnss,
            c if c.is_sbas() => self.sbas,
            _ => self.gps,
        }
    }

    fn iter(&self) -> impl Iterator<Item = f64> {
        [
            self.gps,
            self.glonass,
            self.galileo,
            self.beidou,
            self.qzss,
            self.irnss,
            self.sbas,
        ]
        .into_iter()
    }
}

fn default_carrier_std_dev_m() -> f64 {
    0.003
}

fn default_code_carrier_ratio() -> f64 {
    100.0
}

fn default_doppler_std_dev_hz() -> f64 {
    0.1
}

fn default_code_bias_std_dev_m() -> f64 {
    0.3
}

fn default_cn0_reference_dbhz() -> f64 {
    45.0
}

/// [MeasurementErrorModel] describes the noise floor of each observable,
/// before any modeling uncertainty is accounted for.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementErrorModel {
    /// Elevation [WeightingModel]
    #[cfg_attr(feature = "serde", serde(default))]
    pub weighting: WeightingModel,
    /// Per system error factors
    #[cfg_attr(feature = "serde", serde(default))]
    pub system_factors: SystemErrorFactors,
    /// Zenith carrier phase noise [m]
    #[cfg_attr(feature = "serde", serde(default = "default_carrier_std_dev_m"))]
    pub carrier_std_dev_m: f64,
    /// Ratio between code and carrier phase noise
    #[cfg_attr(feature = "serde", serde(default = "default_code_carrier_ratio"))]
    pub code_carrier_ratio: f64,
    /// Zenith doppler noise [Hz]
    #[cfg_attr(feature = "serde", serde(default = "default_doppler_std_dev_hz"))]
    pub doppler_std_dev_hz: f64,
    /// Residual code bias uncertainty [m]
    #[cfg_attr(feature = "serde", serde(default = "default_code_bias_std_dev_m"))]
    pub code_bias_std_dev_m: f64,
    /// Reference CN0 [dB-Hz] of [WeightingModel::SineCn0]
    #[cfg_attr(feature = "serde", serde(default = "default_cn0_reference_dbhz"))]
    pub cn0_reference_dbhz: f64,
}

impl Default for MeasurementErrorModel {
    fn default() -> Self {
        Self {
            weighting: WeightingModel::default(),
            system_factors: SystemErrorFactors::default(),
            carrier_std_dev_m: default_carrier_std_dev_m(),
            code_carrier_ratio: default_code_carrier_ratio(),
            doppler_std_dev_hz: default_doppler_std_dev_hz(),
            code_bias_std_dev_m: default_code_bias_std_dev_m(),
            cn0_reference_dbhz: default_cn0_reference_dbhz(),
        }
    }
}

impl MeasurementErrorModel {
    /// Verifies that all parameters are physical.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = |value: f64| value.is_finite() && value >= 0.0;

        if !non_negative(self.carrier_std_dev_m) {
            return Err(ConfigError::InvalidErrorModelParameter("carrier std dev"));
        }
        if !self.code_carrier_ratio.is_finite() || self.code_carrier_ratio < 1.0 {
            return Err(ConfigError::InvalidErrorModelParameter("code/carrier ratio"));
        }
        if !non_negative(self.doppler_std_dev_hz) {
            return Err(ConfigError::InvalidErrorModelParameter("doppler std dev"));
        }
        if !non_negative(self.code_bias_std_dev_m) {
            return Err(ConfigError::InvalidErrorModelParameter("code bias std dev"));
        }
        if !self.cn0_reference_dbhz.is_finite() {
            return Err(ConfigError::InvalidErrorModelParameter("CN0 reference"));
        }
        if !self.system_factors.iter().all(|f| f.is_finite() && f > 0.0) {
            return Err(ConfigError::InvalidErrorModelParameter("system factor"));
        }
        self.weighting.validate()
    }

    fn weight(&self, elevation_rad: f64, cn0_dbhz: f64) -> f64 {
        let elevation_rad = elevation_rad.max(MIN_ELEVATION_RAD);
        self.weighting
            .factor(elevation_rad, cn0_dbhz, self.cn0_reference_dbhz)
    }

    /// Pseudo range variance [m²]
    pub fn pseudo_range_variance(
        &self,
        constellation: Constellation,
        elevation_rad: f64,
        cn0_dbhz: f64,
    ) -> f64 {
        self.code_carrier_ratio.powi(2)
            * self.phase_range_variance(constellation, elevation_rad, cn0_dbhz)
    }

    /// Phase range variance [m²]
    pub fn phase_range_variance(
        &self,
        constellation: Constellation,
        elevation_rad: f64,
        cn0_dbhz: f64,
    ) -> f64 {
        let sigma = self.system_factors.factor(constellation) * self.carrier_std_dev_m;
        sigma.powi(2) * self.weight(elevation_rad, cn0_dbhz)
    }

    /// Range rate variance [m²/s²]: doppler noise converted with the carrier wavelength.
    /// Returns None for GLONASS FDMA signals without frequency channel.
    pub fn range_rate_variance(
        &self,
        carrier: Carrier,
        channel: Option<i8>,
        elevation_rad: f64,
        cn0_dbhz: f64,
    ) -> Option<f64> {
        let wavelength_m = carrier.wavelength_m(channel)?;
        let sigma = wavelength_m * self.doppler_std_dev_hz;
        Some(sigma.powi(2) * self.weight(elevation_rad, cn0_dbhz))
    }

    /// Residual code bias variance [m²]
    pub fn code_bias_variance(&self) -> f64 {
        self.code_bias_std_dev_m.powi(2)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[test]
    fn default_model() {
        let model = MeasurementErrorModel::default();
        assert!(model.validate().is_ok());
        assert!((model.code_bias_variance() - 0.09).abs() < 1.0E-12);

        let zenith = 90.0_f64.to_radians();
        let code = model.pseudo_range_variance(Constellation::GPS, zenith, 45.0);
        let phase = model.phase_range_variance(Constellation::GPS, zenith, 45.0);
        assert!((phase - 2.0 * 0.003_f64.powi(2)).abs() < 1.0E-15);
        assert!((code / phase - 1.0E4).abs() < 1.0E-6);

        let glo = model.phase_range_variance(Constellation::Glonass, zenith, 45.0);
        assert!((glo / phase - 2.25).abs() < 1.0E-9);
    }

    #[rstest]
    #[case(WeightingModel::None)]
    #[case(WeightingModel::Sine)]
    #[case(WeightingModel::SineOffset)]
    #[case(WeightingModel::SineCn0)]
    #[case(WeightingModel::Exponential(Default::default()))]
    fn monotonicity(#[case] weighting: WeightingModel) {
        let model = MeasurementErrorModel {
            weighting,
            ..Default::default()
        };

        // decreasing elevation never decreases variance, down to and below the horizon
        let mut previous = (0.0, 0.0, 0.0);
        for elev_deg in [90.0, 60.0, 30.0, 10.0, 5.0, 1.0, 0.0, -3.0] {
            let elev = f64::to_radians(elev_deg);
            let code = model.pseudo_range_variance(Constellation::GPS, elev, 40.0);
            let phase = model.phase_range_variance(Constellation::GPS, elev, 40.0);
            let rate = model
                .range_rate_variance(Carrier::L1, None, elev, 40.0)
                .unwrap();
            assert!(code.is_finite() && phase.is_finite() && rate.is_finite());
            assert!(code >= previous.0, "{} code @{}°", weighting, elev_deg);
            assert!(phase >= previous.1, "{} phase @{}°", weighting, elev_deg);
            assert!(rate >= previous.2, "{} rate @{}°", weighting, elev_deg);
            previous = (code, phase, rate);
        }

        // increasing CN0 never increases variance
        let elev = 20.0_f64.to_radians();
        let mut previous = f64::INFINITY;
        for cn0 in [1.0, 20.0, 35.0, 45.0, 55.0] {
            let code = model.pseudo_range_variance(Constellation::Galileo, elev, cn0);
            assert!(code <= previous, "{} code @{}dB", weighting, cn0);
            previous = code;
        }
    }

    #[test]
    fn range_rate() {
        let model = MeasurementErrorModel {
            weighting: WeightingModel::None,
            ..Default::default()
        };
        let l1 = model
            .range_rate_variance(Carrier::L1, None, 1.0, 45.0)
            .unwrap();
        let lambda = Carrier::L1.wavelength_m(None).unwrap();
        assert!((l1 - (0.1 * lambda).powi(2)).abs() < 1.0E-12);

        assert!(model
            .range_rate_variance(Carrier::G1, None, 1.0, 45.0)
            .is_none());
        assert!(model
            .range_rate_variance(Carrier::G1, Some(-7), 1.0, 45.0)
            .is_some());
    }

    #[rstest]
    #[case(MeasurementErrorModel { code_carrier_ratio: 0.5, ..Default::default() })]
    #[case(MeasurementErrorModel { carrier_std_dev_m: -0.003, ..Default::default() })]
    #[case(MeasurementErrorModel { doppler_std_dev_hz: f64::NAN, ..Default::default() })]
    #[case(MeasurementErrorModel { code_bias_std_dev_m: -1.0, ..Default::default() })]
    fn invalid_parameters(#[case] model: MeasurementErrorModel) {
        assert!(model.validate().is_err());
    }
}
