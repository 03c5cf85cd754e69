use thiserror::Error;

use crate::{
    cfg::Error as ConfigError,
    prelude::{Constellation, Observable, ReceiverRole, SignalId},
};

#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// Invalid, unsupported or incomplete model selection.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// One receiver must be provided per role, and no signal
    /// may be observed by more receivers than that.
    #[error("receiver count mismatch: expected {expected}, got {got}")]
    ReceiverCount { expected: usize, got: usize },

    /// Receivers must be indexed by their role.
    #[error("receiver #{index} is tagged as {role}")]
    ReceiverRoleOrder { index: usize, role: ReceiverRole },

    /// Each constellation in sight must have an inter-system bias entry
    /// in every receiver clock, even when it is the reference system.
    #[error("{role}: missing inter-system clock bias for {constellation}")]
    MissingInterSystemBias {
        role: ReceiverRole,
        constellation: Constellation,
    },

    /// Each constellation in sight must have an inter-system drift entry
    /// in every receiver clock, even when it is the reference system.
    #[error("{role}: missing inter-system clock drift for {constellation}")]
    MissingInterSystemDrift {
        role: ReceiverRole,
        constellation: Constellation,
    },

    /// Undifferenced code and phase variances include the satellite position variance,
    /// which requires navigation data.
    #[error("{0}: missing navigation data")]
    MissingNavigationData(SignalId),

    /// GLONASS FDMA signals need their frequency channel number.
    #[error("{0}: missing frequency channel number")]
    MissingFrequencyNumber(SignalId),

    /// The selected ionosphere model needs broadcast parameters
    /// that were not provided.
    #[error("missing ionospheric correction parameters")]
    MissingIonosphericCorrections,

    /// Variance must be finite and non-negative: anything else results
    /// from bad input data or invalid model parameters.
    #[error("{signal} [{role}] {observable}: invalid variance {variance}")]
    InvalidVariance {
        signal: SignalId,
        role: ReceiverRole,
        observable: Observable,
        variance: f64,
    },
}
