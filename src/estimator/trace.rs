use log::{debug, trace};

use crate::{
    observation::{EstimationTerms, Observable, SignalId},
    prelude::{Epoch, ReceiverRole},
};

/// Additive contributions to the variance of one observation
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct VarianceBudget {
    /// Measurement noise floor
    pub measurement: f64,
    /// Satellite position uncertainty
    pub satellite_position: f64,
    /// Ionosphere model uncertainty
    pub ionosphere: f64,
    /// Troposphere model uncertainty
    pub troposphere: f64,
    /// Residual code bias
    pub code_bias: f64,
    /// Receiver inter-frequency bias
    pub inter_frequency_bias: f64,
    /// Receiver clock (and inter-system) bias or drift
    pub receiver_clock: f64,
}

impl VarianceBudget {
    /// Total variance
    pub fn total(&self) -> f64 {
        self.measurement
            + self.satellite_position
            + self.ionosphere
            + self.troposphere
            + self.code_bias
            + self.inter_frequency_bias
            + self.receiver_clock
    }
}

/// Everything that went into one estimated observation
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EstimationTrace {
    /// Sampling [Epoch]
    pub epoch: Epoch,
    /// Estimated [SignalId]
    pub signal: SignalId,
    /// [ReceiverRole] of the receiver that tracked this signal
    pub role: ReceiverRole,
    /// Estimated [Observable]
    pub observable: Observable,
    /// Geometry and propagation [EstimationTerms]
    pub terms: EstimationTerms,
    /// Clock terms, scaled to [m] for ranges and [m/s] for [Observable::Doppler]
    pub clock: f64,
    /// Measured value
    pub measurement: f64,
    /// Estimated value
    pub estimate: f64,
    /// [VarianceBudget]
    pub variance: VarianceBudget,
}

impl EstimationTrace {
    /// Measurement minus estimate
    pub fn residual(&self) -> f64 {
        self.measurement - self.estimate
    }
}

/// [EstimationObserver] is notified of every estimated observation,
/// once the whole epoch was successfully estimated.
pub trait EstimationObserver {
    /// Called for each estimated observation
    fn observe(&mut self, trace: &EstimationTrace);

    /// Called once per epoch, after all observations
    fn epoch_completed(&mut self, _epoch: Epoch, _estimated: usize) {}
}

impl<F: FnMut(&EstimationTrace)> EstimationObserver for F {
    fn observe(&mut self, trace: &EstimationTrace) {
        self(trace)
    }
}

/// [TraceLogger] reports all estimation terms through the logger
#[derive(Debug, Default, Clone)]
pub struct TraceLogger {
    largest_residual: Option<(SignalId, ReceiverRole, Observable, f64)>,
}

impl EstimationObserver for TraceLogger {
    fn observe(&mut self, t: &EstimationTrace) {
        let terms = &t.terms;
        match t.observable {
            Observable::Doppler => {
                trace!(
                    "{}: {} [{}] {} - rate={:.4} sagnac_rate={:.6} clock={:.4}",
                    t.epoch,
                    t.signal,
                    t.role,
                    t.observable,
                    terms.range_rate_m_s,
                    terms.sagnac_rate_m_s,
                    t.clock,
                );
            },
            _ => {
                let zenith = &terms.zenith_delay;
                trace!(
                    "{}: {} [{}] {} - rho={:.3} sagnac={:.3} tropo={:.3} iono={:.3} clock={:.3} (shapiro={:.4} not applied)",
                    t.epoch,
                    t.signal,
                    t.role,
                    t.observable,
                    terms.rho_m,
                    terms.sagnac_m,
                    terms.tropo_m,
                    terms.iono_m,
                    t.clock,
                    terms.shapiro_m,
                );
                trace!(
                    "{}: {} [{}] tropo - zhd={:.3}m (x{:.3}) zwd={:.3}m (x{:.3})",
                    t.epoch,
                    t.signal,
                    t.role,
                    zenith.zhd_m,
                    zenith.zhd_mapping_factor,
                    zenith.zwd_m,
                    zenith.zwd_mapping_factor,
                );
            },
        }

        trace!(
            "{}: {} [{}] {} - measured={:.4} estimated={:.4} residual={:.4} variance={:.4E} ({:?})",
            t.epoch,
            t.signal,
            t.role,
            t.observable,
            t.measurement,
            t.estimate,
            t.residual(),
            t.variance.total(),
            t.variance,
        );

        let residual = t.residual().abs();
        let largest = match self.largest_residual {
            Some((_, _, _, largest)) => residual > largest,
            None => true,
        };
        if largest {
            self.largest_residual = Some((t.signal, t.role, t.observable, residual));
        }
    }

    fn epoch_completed(&mut self, epoch: Epoch, estimated: usize) {
        match self.largest_residual.take() {
            Some((signal, role, observable, residual)) => {
                debug!(
                    "{}: estimated {} observations - largest residual {:.3} {} [{}] {}",
                    epoch, estimated, residual, signal, role, observable
                );
            },
            None => {
                debug!("{}: estimated {} observations", epoch, estimated);
            },
        }
    }
}
