use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::{IonosphereModel, MeasurementErrorModel, TroposphereSelection};

/// Configuration Error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("unknown ionosphere model \"{0}\"")]
    UnknownIonosphereModel(String),
    #[error("unknown troposphere model \"{0}\"")]
    UnknownTroposphereModel(String),
    #[error("unknown mapping function \"{0}\"")]
    UnknownMappingFunction(String),
    #[error("unknown weighting model \"{0}\"")]
    UnknownWeightingModel(String),
    /// A zenith delay model was selected without mapping function
    #[error("{0} zenith delay is modeled but its mapping function is not set")]
    UnsetMappingFunction(&'static str),
    #[error("invalid measurement error model parameter: {0}")]
    InvalidErrorModelParameter(&'static str),
    #[error("invalid observation filter: {0}")]
    InvalidObservationFilter(&'static str),
}

/// [Config] gathers the model selections of the [ObservationEstimator](crate::prelude::ObservationEstimator).
/// It is read-only during estimation.
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// [IonosphereModel] used to compensate the ionosphere delay
    #[cfg_attr(feature = "serde", serde(default))]
    pub ionosphere: IonosphereModel,
    /// Troposphere zenith delay models and mapping functions
    #[cfg_attr(feature = "serde", serde(default))]
    pub troposphere: TroposphereSelection,
    /// Measurement noise floor
    #[cfg_attr(feature = "serde", serde(default))]
    pub error_model: MeasurementErrorModel,
}

impl Config {
    /// Copies and returns [Config] with desired [IonosphereModel]
    pub fn with_ionosphere(&self, ionosphere: IonosphereModel) -> Self {
        let mut s = self.clone();
        s.ionosphere = ionosphere;
        s
    }

    /// Copies and returns [Config] with desired [TroposphereSelection]
    pub fn with_troposphere(&self, troposphere: TroposphereSelection) -> Self {
        let mut s = self.clone();
        s.troposphere = troposphere;
        s
    }

    /// Copies and returns [Config] with desired [MeasurementErrorModel]
    pub fn with_error_model(&self, error_model: MeasurementErrorModel) -> Self {
        let mut s = self.clone();
        s.error_model = error_model;
        s
    }

    /// Verifies the model selections.
    pub fn validate(&self) -> Result<(), Error> {
        self.troposphere.validate()?;
        self.error_model.validate()
    }
}
