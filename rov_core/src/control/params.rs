// rov_core/src/control/params.rs

use nalgebra::Matrix6;
use serde::{Deserialize, Serialize};

use crate::control::lqr::LqrModel;
use crate::control::{ControlLaw, ControlLawKind, Lqr, Pid};
use crate::error::ParameterError;
use crate::types::Dof6;

/// Diagonal PID gains, one entry per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub p: Dof6,
    pub i: Dof6,
    pub d: Dof6,
}

impl PidGains {
    /// The same `{kP, kI, kD}` on every axis.
    pub fn uniform(p: f64, i: f64, d: f64) -> Self {
        Self {
            p: Dof6::repeat(p),
            i: Dof6::repeat(i),
            d: Dof6::repeat(d),
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, gains) in [("p", &self.p), ("i", &self.i), ("d", &self.d)] {
            if let Some(&value) = gains.iter().find(|g| !g.is_finite() || **g < 0.0) {
                return Err(ParameterError::InvalidGain { name, value });
            }
        }
        Ok(())
    }
}

impl Default for PidGains {
    fn default() -> Self {
        Self::uniform(2.0, 0.0, 0.0)
    }
}

/// LQR cost weights, given either as one scalar for every axis or as a diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LqrWeights {
    Scalar(f64),
    Diagonal([f64; 6]),
}

impl LqrWeights {
    pub fn to_matrix(self) -> Matrix6<f64> {
        match self {
            LqrWeights::Scalar(w) => Matrix6::from_diagonal_element(w),
            LqrWeights::Diagonal(d) => Matrix6::from_diagonal(&Dof6::from(d)),
        }
    }
}

/// The full parameter set of the active control law.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlLawParameters {
    Pid {
        gains: PidGains,
        integral_limit: Option<f64>,
        goal: Dof6,
    },
    Lqr {
        q: LqrWeights,
        r: LqrWeights,
        model: LqrModel,
        goal: Dof6,
    },
}

impl ControlLawParameters {
    pub fn kind(&self) -> ControlLawKind {
        match self {
            ControlLawParameters::Pid { .. } => ControlLawKind::Pid,
            ControlLawParameters::Lqr { .. } => ControlLawKind::Lqr,
        }
    }

    pub fn goal(&self) -> &Dof6 {
        match self {
            ControlLawParameters::Pid { goal, .. } | ControlLawParameters::Lqr { goal, .. } => goal,
        }
    }

    /// Validates the parameters and builds a ready-to-run law. For LQR this is
    /// where the Riccati equation is solved, once per parameter change.
    pub fn build(&self) -> Result<Box<dyn ControlLaw>, ParameterError> {
        validate_goal(self.goal())?;
        match self {
            ControlLawParameters::Pid {
                gains,
                integral_limit,
                goal,
            } => Ok(Box::new(Pid::new(*gains, *goal, *integral_limit)?)),
            ControlLawParameters::Lqr { q, r, model, goal } => Ok(Box::new(Lqr::new(
                model,
                &q.to_matrix(),
                &r.to_matrix(),
                *goal,
            )?)),
        }
    }

    /// Produces the parameter set that results from applying `update` on top of `self`.
    /// A law switch keeps the current goal; an LQR update keeps the current plant model.
    pub fn apply(&self, update: &ParameterUpdate, default_model: &LqrModel) -> Self {
        match update {
            ParameterUpdate::Pid {
                p,
                i,
                d,
                integral_limit,
            } => ControlLawParameters::Pid {
                gains: PidGains::uniform(*p, *i, *d),
                integral_limit: *integral_limit,
                goal: *self.goal(),
            },
            ParameterUpdate::Lqr { q, r } => {
                let model = match self {
                    ControlLawParameters::Lqr { model, .. } => *model,
                    ControlLawParameters::Pid { .. } => *default_model,
                };
                ControlLawParameters::Lqr {
                    q: *q,
                    r: *r,
                    model,
                    goal: *self.goal(),
                }
            }
            ParameterUpdate::Goal(goal) => {
                let goal = Dof6::from(*goal);
                let mut next = self.clone();
                match &mut next {
                    ControlLawParameters::Pid { goal: g, .. } | ControlLawParameters::Lqr { goal: g, .. } => {
                        *g = goal
                    }
                }
                next
            }
        }
    }
}

impl Default for ControlLawParameters {
    fn default() -> Self {
        ControlLawParameters::Pid {
            gains: PidGains::default(),
            integral_limit: None,
            goal: Dof6::zeros(),
        }
    }
}

fn validate_goal(goal: &Dof6) -> Result<(), ParameterError> {
    if goal.iter().all(|g| g.is_finite()) {
        Ok(())
    } else {
        Err(ParameterError::OutOfRange {
            name: "goal",
            reason: "goal must be finite".to_string(),
        })
    }
}

/// A structured update arriving over the parameter channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterUpdate {
    /// Switch to (or retune) PID with the same gains on every axis.
    Pid {
        p: f64,
        i: f64,
        d: f64,
        #[serde(default)]
        integral_limit: Option<f64>,
    },
    /// Switch to (or retune) LQR with diagonal `Q` and `R`.
    Lqr { q: LqrWeights, r: LqrWeights },
    /// Move the setpoint of the active law.
    Goal([f64; 6]),
}
