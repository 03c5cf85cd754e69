#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod bias;
mod carrier;
mod cfg;
mod constants;
mod error;
mod estimator;
mod filter;
mod noise;
mod observation;
mod receiver;

pub mod geometry;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::bias::{
        ionosphere_variance_m2, scale_to_frequency, troposphere_variance_m2, BiasRuntime,
        IonosphereModel, IonosphericCorrections, KbModel, MappingFunction, TroposphereSelection,
        ZenithDelay, ZenithDelayModel,
    };
    pub use crate::carrier::{Carrier, ParsingError as CarrierParsingError};
    pub use crate::cfg::{Config, Error as ConfigError};
    pub use crate::constants::SPEED_OF_LIGHT_M_S;
    pub use crate::error::Error;
    pub use crate::estimator::{
        DifferenceMode, EstimationObserver, EstimationTrace, ObservationEstimator, TraceLogger,
        VarianceBudget,
    };
    pub use crate::filter::{ObservationFilter, SnrMask, SnrThresholds};
    pub use crate::geometry::GeodeticPosition;
    pub use crate::noise::{
        ElevationMappingFunction, MeasurementErrorModel, SystemErrorFactors, WeightingModel,
        DEFAULT_CN0_DBHZ,
    };
    pub use crate::observation::{
        EstimationTerms, NavigationData, Observable, ObservationDatum, Observations,
        ReceiverObservation, SatelliteClock, SignalId, SignalInSpaceAccuracy, SignalObservation,
    };
    pub use crate::receiver::{Receiver, ReceiverClock, ReceiverRole, UncertainValue};
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}

// pub export
pub use error::Error;
