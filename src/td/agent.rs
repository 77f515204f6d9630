//! Model-based TD agent with an ε-greedy policy.
//!
//! The agent learns an empirical dynamics model from every step it takes and
//! scores actions with a one-step Bellman expectation over that model:
//!
//! Q(s,a) = r̂(s,a) + γ Σ_{s'} P̂(s'|s,a) V(s')
//!
//! Values are only updated at the end of an episode, by a backward TD pass
//! over the recorded trajectory.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use super::{
    dynamics::DynamicsModel,
    snapshot::ModelSnapshot,
    value_table::{Trajectory, ValueTable},
};
use crate::{
    config::LearningConfig,
    error::{Error, Result},
    robot::{Action, BatteryLevel, StateId},
};

/// Action chosen by the policy and how it was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    /// False when the action was drawn at random for exploration
    pub greedy: bool,
}

/// Greedy choice and action values for one battery level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub level: BatteryLevel,
    pub state_value: f64,
    pub greedy_action: Action,
    /// Expected value and attempt count of every valid action
    pub actions: Vec<(Action, f64, u64)>,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Learning agent for the can-collecting robot.
#[derive(Debug, Clone)]
pub struct TdAgent {
    config: LearningConfig,
    dynamics: DynamicsModel,
    values: ValueTable,
    trajectory: Trajectory,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl TdAgent {
    pub fn new(config: LearningConfig) -> Self {
        let values = ValueTable::new(config.initial_value);
        Self {
            config,
            dynamics: DynamicsModel::new(),
            values,
            trajectory: Trajectory::new(),
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    /// Create an agent that resumes from a saved model.
    pub fn from_snapshot(config: LearningConfig, snapshot: ModelSnapshot) -> Self {
        let mut agent = Self::new(config);
        agent.restore(snapshot);
        agent
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_rng_seed(seed);
        self
    }

    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn dynamics(&self) -> &DynamicsModel {
        &self.dynamics
    }

    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Current value estimate for a battery level.
    pub fn value(&self, level: BatteryLevel) -> f64 {
        self.values.get(level.into())
    }

    /// Prepare for a new episode.
    pub fn reset(&mut self) {
        self.trajectory.clear();
    }

    /// Discard everything learned and start from scratch.
    pub fn forget(&mut self) {
        self.dynamics.clear();
        self.values = ValueTable::new(self.config.initial_value);
        self.trajectory.clear();
        self.rng = build_rng(self.rng_seed);
    }

    /// One-step Bellman expectation of taking `action` from `state` under
    /// the learned model.
    ///
    /// Pairs never attempted report `unknown_value` so untried actions stay
    /// competitive.
    pub fn expected_value(&self, state: StateId, action: Action) -> f64 {
        let Some(stats) = self.dynamics.stats(state, action) else {
            return self.config.unknown_value;
        };
        if stats.attempts == 0 {
            return self.config.unknown_value;
        }
        let lookahead: f64 = StateId::all()
            .map(|next| stats.transition_probability(next) * self.values.get(next))
            .sum();
        stats.expected_reward() + self.config.discount * lookahead
    }

    /// Valid action with the highest expected value.
    ///
    /// Ties go to the action listed first by
    /// [`BatteryLevel::valid_actions`].
    pub fn greedy_action(&self, state: StateId) -> Result<Action> {
        let mut best: Option<(Action, f64)> = None;
        for &action in state.level().valid_actions() {
            let value = self.expected_value(state, action);
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((action, value));
            }
        }
        best.map(|(action, _)| action)
            .ok_or(Error::NoValidActions {
                level: state.level(),
            })
    }

    /// ε-greedy action selection.
    pub fn select_action(&mut self, state: StateId) -> Result<Decision> {
        let valid = state.level().valid_actions();
        if valid.is_empty() {
            return Err(Error::NoValidActions {
                level: state.level(),
            });
        }

        if self.rng.random::<f64>() < self.config.epsilon {
            let action = *valid.choose(&mut self.rng).ok_or(Error::NoValidActions {
                level: state.level(),
            })?;
            return Ok(Decision {
                action,
                greedy: false,
            });
        }

        Ok(Decision {
            action: self.greedy_action(state)?,
            greedy: true,
        })
    }

    /// Record the outcome of a step: update the dynamics model and append
    /// to the episode trajectory.
    pub fn observe(&mut self, state: StateId, decision: Decision, next_state: StateId, reward: f64) {
        self.dynamics
            .observe(state, decision.action, next_state, reward);
        self.trajectory.push(state, decision.greedy, reward);
    }

    /// Backward TD pass over the current episode's trajectory.
    ///
    /// The trajectory is kept until the next [`reset`](Self::reset).
    pub fn backup(&mut self) {
        self.values.backup(
            &self.trajectory,
            self.config.step_size,
            self.config.discount,
        );
    }

    /// Greedy policy and action values for every battery level.
    pub fn policy(&self) -> Result<Vec<PolicyEntry>> {
        StateId::all()
            .map(|state| {
                let actions = state
                    .level()
                    .valid_actions()
                    .iter()
                    .map(|&action| {
                        (
                            action,
                            self.expected_value(state, action),
                            self.dynamics.attempts(state, action),
                        )
                    })
                    .collect();
                Ok(PolicyEntry {
                    level: state.level(),
                    state_value: self.values.get(state),
                    greedy_action: self.greedy_action(state)?,
                    actions,
                })
            })
            .collect()
    }

    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot::from_parts(&self.values, &self.dynamics)
    }

    /// Replace the learned tables with those from `snapshot`.
    pub fn restore(&mut self, snapshot: ModelSnapshot) {
        let (values, dynamics) = snapshot.into_parts(self.config.initial_value);
        self.values = values;
        self.dynamics = dynamics;
        self.trajectory.clear();
    }
}
