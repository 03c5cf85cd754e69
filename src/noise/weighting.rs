use crate::cfg::Error as ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Exponential elevation weighting: a + b * e^(-elev/c), elevation in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElevationMappingFunction {
    /// a + b * e^(-elev/c)
    pub a: f64,
    /// a + b * e^(-elev/c)
    pub b: f64,
    /// a + b * e^(-elev/c)
    pub c: f64,
}

impl Default for ElevationMappingFunction {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 10.0,
            c: 10.0,
        }
    }
}

impl ElevationMappingFunction {
    pub(crate) fn eval(&self, elev_deg: f64) -> f64 {
        self.a + self.b * (-elev_deg / self.c).exp()
    }
}

/// Elevation (and signal quality) dependent weighting of the
/// zenith measurement noise. Every model returns a variance scaling
/// factor, which increases toward the horizon.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WeightingModel {
    /// No weighting: the zenith noise applies to all elevations
    None,
    /// 1 / sin²(e)
    Sine,
    /// 1 + 1 / sin²(e)
    #[default]
    SineOffset,
    /// 10^((cn0_ref - cn0) / 10) / sin²(e), CN0 capped at the reference value
    SineCn0,
    /// (a + b * e^(-elev/c))²
    Exponential(ElevationMappingFunction),
}

impl std::fmt::Display for WeightingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Sine => write!(f, "sine"),
            Self::SineOffset => write!(f, "sine-offset"),
            Self::SineCn0 => write!(f, "sine-cn0"),
            Self::Exponential(_) => write!(f, "exponential"),
        }
    }
}

impl std::str::FromStr for WeightingModel {
    type Err = ConfigError;
    /// Parses a weighting model name. "exponential" uses default coefficients.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "none" => Ok(Self::None),
            "sine" => Ok(Self::Sine),
            "sine-offset" => Ok(Self::SineOffset),
            "sine-cn0" => Ok(Self::SineCn0),
            "exponential" => Ok(Self::Exponential(Default::default())),
            _ => Err(ConfigError::UnknownWeightingModel(c)),
        }
    }
}

impl WeightingModel {
    /// Variance scaling factor, for this elevation [rad] and signal quality [dB-Hz].
    /// Elevation must already be floored above zero.
    pub(crate) fn factor(&self, elevation_rad: f64, cn0_dbhz: f64, cn0_ref_dbhz: f64) -> f64 {
        let sin2 = elevation_rad.sin().powi(2);
        match self {
            Self::None => 1.0,
            Self::Sine => 1.0 / sin2,
            Self::SineOffset => 1.0 + 1.0 / sin2,
            Self::SineCn0 => {
                let cn0 = cn0_dbhz.min(cn0_ref_dbhz);
                10.0_f64.powf((cn0_ref_dbhz - cn0) / 10.0) / sin2
            },
            Self::Exponential(mapf) => mapf.eval(elevation_rad.to_degrees()).powi(2),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Exponential(mapf) => {
                let valid = mapf.a.is_finite()
                    && mapf.b.is_finite()
                    && mapf.a >= 0.0
                    && mapf.b >= 0.0
                    && mapf.c > 0.0
                    && mapf.c.is_finite();
                if valid {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidErrorModelParameter("elevation mapping function"))
                }
            },
            _ => Ok(()),
        }
    }
}
