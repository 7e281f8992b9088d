// rov_core/src/control/channel.rs

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use crate::control::lqr::LqrModel;
use crate::control::params::{ControlLawParameters, ParameterUpdate};
use crate::control::{ControlLaw, ControlLawKind};
use crate::error::ParameterError;

#[derive(Debug)]
struct ChannelState {
    /// Parameters of the most recently accepted update.
    accepted: ControlLawParameters,
    /// A fully built law waiting for the control loop to pick it up.
    pending: Option<Box<dyn ControlLaw>>,
}

/// The parameter channel between operators and the control loop.
///
/// Updates are validated (and, for LQR, solved) on the caller's thread. Only a
/// complete, ready law ever crosses into the loop, so a tick can never observe a
/// partially applied parameter set. Rejected updates leave both the accepted
/// parameters and the running law untouched.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::prelude::Resource))]
pub struct ParameterChannel {
    state: Arc<Mutex<ChannelState>>,
    default_model: LqrModel,
}

impl ParameterChannel {
    /// Creates the channel and the law the loop starts with.
    pub fn new(
        initial: ControlLawParameters,
        default_model: LqrModel,
    ) -> Result<(Self, Box<dyn ControlLaw>), ParameterError> {
        let law = initial.build()?;
        let channel = Self {
            state: Arc::new(Mutex::new(ChannelState {
                accepted: initial,
                pending: None,
            })),
            default_model,
        };
        Ok((channel, law))
    }

    /// Validates `update` against the accepted parameters and queues the new law.
    /// A second accepted update before the next tick replaces the first.
    pub fn submit(&self, update: &ParameterUpdate) -> Result<ControlLawKind, ParameterError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let candidate = state.accepted.apply(update, &self.default_model);

        match candidate.build() {
            Ok(law) => {
                let kind = law.kind();
                info!("Accepted {:?} parameter update: {:?}", kind, candidate);
                state.accepted = candidate;
                state.pending = Some(law);
                Ok(kind)
            }
            Err(e) => {
                warn!("Rejected parameter update {:?}: {}", update, e);
                Err(e)
            }
        }
    }

    /// Takes the law queued since the last call, if any. Called by the loop between ticks.
    pub fn take_pending(&self) -> Option<Box<dyn ControlLaw>> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .take()
    }

    /// The parameters of the most recently accepted update.
    pub fn accepted(&self) -> ControlLawParameters {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .accepted
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::params::LqrWeights;

    fn channel() -> ParameterChannel {
        ParameterChannel::new(ControlLawParameters::default(), LqrModel::default())
            .unwrap()
            .0
    }

    #[test]
    fn accepted_update_is_queued_once() {
        let channel = channel();
        let kind = channel
            .submit(&ParameterUpdate::Lqr {
                q: LqrWeights::Scalar(1.0),
                r: LqrWeights::Scalar(1.0),
            })
            .unwrap();
        assert_eq!(kind, ControlLawKind::Lqr);
        assert_eq!(channel.take_pending().map(|l| l.kind()), Some(ControlLawKind::Lqr));
        assert!(channel.take_pending().is_none());
    }

    #[test]
    fn rejected_update_keeps_prior_parameters() {
        let channel = channel();
        let before = channel.accepted();
        let err = channel.submit(&ParameterUpdate::Pid {
            p: -1.0,
            i: 0.0,
            d: 0.0,
            integral_limit: None,
        });
        assert!(err.is_err());
        assert_eq!(channel.accepted(), before);
        assert!(channel.take_pending().is_none());
    }

    #[test]
    fn singular_lqr_is_rejected() {
        let channel = channel();
        let err = channel
            .submit(&ParameterUpdate::Lqr {
                q: LqrWeights::Scalar(1.0),
                r: LqrWeights::Scalar(0.0),
            })
            .unwrap_err();
        assert!(matches!(err, ParameterError::InvalidWeight { .. }));
        assert_eq!(channel.accepted().kind(), ControlLawKind::Pid);
    }

    #[test]
    fn clones_share_one_queue() {
        let writer = channel();
        let reader = writer.clone();
        writer.submit(&ParameterUpdate::Goal([1.0, 0.0, 0.0, 0.0, 0.0, 0.0])).unwrap();
        let law = reader.take_pending().unwrap();
        assert_eq!(law.goal()[0], 1.0);
    }
}
