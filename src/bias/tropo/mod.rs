use crate::{bias::BiasRuntime, cfg::Error as ConfigError, constants::MIN_ELEVATION_RAD};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod niell;
mod saastamoinen;
mod unb3;

/// Troposphere model error at zenith [m]
const ZENITH_MODEL_ERROR_M: f64 = 0.3;

/// Zenith delay models that we propose.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ZenithDelayModel {
    /// No delay
    None,
    /// Saastamoinen model, fed with standard atmosphere meteorological values
    #[default]
    Saastamoinen,
    /// UNB3 model, with seasonal and latitudinal meteorological lookup
    UNB3,
}

impl std::str::FromStr for ZenithDelayModel {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, ConfigError> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "none" => Ok(Self::None),
            "saastamoinen" => Ok(Self::Saastamoinen),
            "unb3" => Ok(Self::UNB3),
            _ => Err(ConfigError::UnknownTroposphereModel(c)),
        }
    }
}

impl std::fmt::Display for ZenithDelayModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Saastamoinen => write!(f, "saastamoinen"),
            Self::UNB3 => write!(f, "unb3"),
        }
    }
}

/// Elevation mapping functions that we propose.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MappingFunction {
    /// No mapping: only valid along [ZenithDelayModel::None]
    None,
    /// 1 / sin(e)
    Cosecant,
    /// Black & Eisner: 1.001 / sqrt(0.002001 + sin²(e))
    BlackEisner,
    /// Niell Mapping Function (NMF)
    #[default]
    Niell,
}

impl std::str::FromStr for MappingFunction {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, ConfigError> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "none" => Ok(Self::None),
            "cosecant" => Ok(Self::Cosecant),
            "black-eisner" | "blackeisner" => Ok(Self::BlackEisner),
            "niell" | "nmf" => Ok(Self::Niell),
            _ => Err(ConfigError::UnknownMappingFunction(c)),
        }
    }
}

impl std::fmt::Display for MappingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Cosecant => write!(f, "cosecant"),
            Self::BlackEisner => write!(f, "black-eisner"),
            Self::Niell => write!(f, "niell"),
        }
    }
}

impl MappingFunction {
    fn hydrostatic(&self, rtm: &BiasRuntime) -> f64 {
        match self {
            Self::Niell => niell::hydrostatic(rtm),
            _ => self.elevation_only(rtm.elevation_rad),
        }
    }

    fn wet(&self, rtm: &BiasRuntime) -> f64 {
        match self {
            Self::Niell => niell::wet(rtm),
            _ => self.elevation_only(rtm.elevation_rad),
        }
    }

    // Niell is position and season dependent, handled by the callers
    fn elevation_only(&self, elevation_rad: f64) -> f64 {
        match self {
            Self::None | Self::Niell => 0.0,
            Self::Cosecant => 1.0 / elevation_rad.sin(),
            Self::BlackEisner => {
                1.001_f64 / (0.002001_f64 + elevation_rad.sin().powi(2)).sqrt()
            },
        }
    }
}

/// Troposphere zenith delay components and their elevation mapping factors
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ZenithDelay {
    /// Zenith hydrostatic delay [m]
    pub zhd_m: f64,
    /// Zenith wet delay [m]
    pub zwd_m: f64,
    /// Hydrostatic mapping factor
    pub zhd_mapping_factor: f64,
    /// Wet mapping factor
    pub zwd_mapping_factor: f64,
}

impl ZenithDelay {
    /// Slant delay [m], along the line of sight
    pub fn slant_delay_m(&self) -> f64 {
        self.zhd_m * self.zhd_mapping_factor + self.zwd_m * self.zwd_mapping_factor
    }
}

fn default_zhd_model() -> ZenithDelayModel {
    ZenithDelayModel::Saastamoinen
}

fn default_zwd_model() -> ZenithDelayModel {
    ZenithDelayModel::Saastamoinen
}

fn default_mapping() -> MappingFunction {
    MappingFunction::Niell
}

/// Troposphere models selection. Hydrostatic and wet components
/// may be modeled differently.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TroposphereSelection {
    /// Zenith hydrostatic delay model
    #[cfg_attr(feature = "serde", serde(default = "default_zhd_model"))]
    pub zhd_model: ZenithDelayModel,
    /// Zenith wet delay model
    #[cfg_attr(feature = "serde", serde(default = "default_zwd_model"))]
    pub zwd_model: ZenithDelayModel,
    /// Hydrostatic [MappingFunction]
    #[cfg_attr(feature = "serde", serde(default = "default_mapping"))]
    pub zhd_mapping: MappingFunction,
    /// Wet [MappingFunction]
    #[cfg_attr(feature = "serde", serde(default = "default_mapping"))]
    pub zwd_mapping: MappingFunction,
}

impl Default for TroposphereSelection {
    fn default() -> Self {
        Self {
            zhd_model: default_zhd_model(),
            zwd_model: default_zwd_model(),
            zhd_mapping: default_mapping(),
            zwd_mapping: default_mapping(),
        }
    }
}

impl TroposphereSelection {
    /// No troposphere compensation
    pub fn none() -> Self {
        Self {
            zhd_model: ZenithDelayModel::None,
            zwd_model: ZenithDelayModel::None,
            zhd_mapping: MappingFunction::None,
            zwd_mapping: MappingFunction::None,
        }
    }

    /// Same model and mapping function for both components
    pub fn new(model: ZenithDelayModel, mapping: MappingFunction) -> Self {
        Self {
            zhd_model: model,
            zwd_model: model,
            zhd_mapping: mapping,
            zwd_mapping: mapping,
        }
    }

    /// Verifies that each modeled component has a mapping function.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zhd_model != ZenithDelayModel::None && self.zhd_mapping == MappingFunction::None {
            return Err(ConfigError::UnsetMappingFunction("hydrostatic"));
        }
        if self.zwd_model != ZenithDelayModel::None && self.zwd_mapping == MappingFunction::None {
            return Err(ConfigError::UnsetMappingFunction("wet"));
        }
        Ok(())
    }

    /// Evaluates [ZenithDelay] for this signal. Satellites below
    /// [MIN_ELEVATION_RAD] are mapped as if they were at that elevation.
    pub fn zenith_delay(&self, rtm: &BiasRuntime) -> ZenithDelay {
        let rtm = &rtm.above_horizon();

        let zhd_m = match self.zhd_model {
            ZenithDelayModel::None => 0.0,
            ZenithDelayModel::Saastamoinen => saastamoinen::zhd_m(rtm),
            ZenithDelayModel::UNB3 => unb3::zenith_delays_m(rtm).0,
        };

        let zwd_m = match self.zwd_model {
            ZenithDelayModel::None => 0.0,
            ZenithDelayModel::Saastamoinen => saastamoinen::zwd_m(rtm),
            ZenithDelayModel::UNB3 => unb3::zenith_delays_m(rtm).1,
        };

        ZenithDelay {
            zhd_m,
            zwd_m,
            zhd_mapping_factor: self.zhd_mapping.hydrostatic(rtm),
            zwd_mapping_factor: self.zwd_mapping.wet(rtm),
        }
    }
}

/// Variance [m²] of a modeled slant troposphere delay: (0.3 / (sin(e) + 0.1))².
/// Null when the troposphere is not compensated.
pub fn troposphere_variance_m2(slant_delay_m: f64, elevation_rad: f64) -> f64 {
    if slant_delay_m == 0.0 {
        0.0
    } else {
        let elevation_rad = elevation_rad.max(MIN_ELEVATION_RAD);
        (ZENITH_MODEL_ERROR_M / (elevation_rad.sin() + 0.1)).powi(2)
    }
}

/// Linear interpolation of a latitude lookup table, indexed every 15° from 15° to 75°.
/// Latitudes are folded into the northern hemisphere.
pub(crate) fn latitude_interpolation<const N: usize>(
    lut: &[(f64, [f64; N]); 5],
    lat_ddeg: f64,
    column: usize,
) -> f64 {
    let lat = lat_ddeg.abs();
    if lat <= lut[0].0 {
        return lut[0].1[column];
    }
    if lat >= lut[4].0 {
        return lut[4].1[column];
    }
    let upper = lut
        .iter()
        .position(|(lat_i, _)| *lat_i > lat)
        .unwrap_or(4);
    let (lat_0, row_0) = &lut[upper - 1];
    let (lat_1, row_1) = &lut[upper];
    row_0[column] + (row_1[column] - row_0[column]) * (lat - lat_0) / (lat_1 - lat_0)
}
