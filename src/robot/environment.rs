//! Ground-truth dynamics of the can-collecting robot.
//!
//! An [`EnvironmentState`] carries two uniform draws fixed when the state is
//! created: one decides whether a search drains the battery, the other
//! whether the step is rewarded. Successor and reward are pure functions of
//! that value, so both are decided by the same draws and never resampled.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::battery::{Action, BatteryLevel, StateId};
use crate::{
    config::EnvironmentConfig,
    error::{Error, Result},
};

/// One instant of the robot: its battery level plus the draws that decide
/// what happens next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    level: BatteryLevel,
    depletion_draw: f64,
    reward_draw: f64,
}

impl EnvironmentState {
    /// Create a state at `level`, sampling both draws from `rng`.
    pub fn sample<R: Rng + ?Sized>(level: BatteryLevel, rng: &mut R) -> Self {
        Self {
            level,
            depletion_draw: rng.random::<f64>(),
            reward_draw: rng.random::<f64>(),
        }
    }

    /// Create a state with explicit draws.
    pub fn with_draws(level: BatteryLevel, depletion_draw: f64, reward_draw: f64) -> Self {
        Self {
            level,
            depletion_draw,
            reward_draw,
        }
    }

    pub fn level(&self) -> BatteryLevel {
        self.level
    }

    /// Identity used by the learned tables.
    pub fn id(&self) -> StateId {
        StateId::from(self.level)
    }

    pub fn depletion_draw(&self) -> f64 {
        self.depletion_draw
    }

    pub fn reward_draw(&self) -> f64 {
        self.reward_draw
    }

    pub fn valid_actions(&self) -> &'static [Action] {
        self.level.valid_actions()
    }

    fn ensure_allowed(&self, action: Action) -> Result<()> {
        match (self.level, action) {
            (BatteryLevel::Dead, Action::Search | Action::Wait) => Err(Error::InvalidAction {
                action,
                level: self.level,
            }),
            _ => Ok(()),
        }
    }

    /// Whether `action` drains the battery down one level from this state.
    fn depletes(&self, action: Action, config: &EnvironmentConfig) -> bool {
        match (self.level, action) {
            (BatteryLevel::High, Action::Search) => self.depletion_draw >= config.alpha,
            (BatteryLevel::Low, Action::Search) => self.depletion_draw >= config.beta,
            _ => false,
        }
    }

    /// Battery level reached by taking `action` from this state.
    ///
    /// Recharging always yields [`BatteryLevel::High`], even from a high
    /// battery. Searching or waiting with a dead battery is an error.
    pub fn next_level(&self, action: Action, config: &EnvironmentConfig) -> Result<BatteryLevel> {
        self.ensure_allowed(action)?;
        let level = match action {
            Action::Recharge => BatteryLevel::High,
            Action::Wait => self.level,
            Action::Search if self.depletes(action, config) => match self.level {
                BatteryLevel::High => BatteryLevel::Low,
                _ => BatteryLevel::Dead,
            },
            Action::Search => self.level,
        };
        Ok(level)
    }

    /// Reward for taking `action` from this state.
    pub fn reward(&self, action: Action, config: &EnvironmentConfig) -> Result<f64> {
        self.ensure_allowed(action)?;
        if self.battery_dies(action, config) {
            return Ok(config.dead_battery_penalty);
        }
        if self.reward_draw < config.reward_probability(action) {
            Ok(1.0)
        } else {
            Ok(0.0)
        }
    }

    /// Whether `action` runs a low battery flat.
    pub fn battery_dies(&self, action: Action, config: &EnvironmentConfig) -> bool {
        self.level == BatteryLevel::Low && self.depletes(action, config)
    }
}

/// Outcome of one environment step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: EnvironmentState,
    pub action: Action,
    pub reward: f64,
    pub next_state: EnvironmentState,
}

/// Environment driving the robot through an episode.
#[derive(Debug, Clone)]
pub struct Environment {
    config: EnvironmentConfig,
    state: EnvironmentState,
    rng: StdRng,
}

impl Environment {
    pub fn new(config: EnvironmentConfig) -> Self {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        let state = EnvironmentState::sample(BatteryLevel::High, &mut rng);
        Self {
            config,
            state,
            rng,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_rng_seed(seed);
        self
    }

    /// Reseed the generator used to sample new states.
    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.state = EnvironmentState::sample(BatteryLevel::High, &mut self.rng);
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    /// Start a new episode with a fully charged battery.
    pub fn reset(&mut self) -> EnvironmentState {
        self.state = EnvironmentState::sample(BatteryLevel::High, &mut self.rng);
        self.state
    }

    /// Successor of `state` under `action`, with fresh draws.
    pub fn next_state(&mut self, state: &EnvironmentState, action: Action) -> Result<EnvironmentState> {
        let level = state.next_level(action, &self.config)?;
        Ok(EnvironmentState::sample(level, &mut self.rng))
    }

    pub fn reward(&self, state: &EnvironmentState, action: Action) -> Result<f64> {
        state.reward(action, &self.config)
    }

    /// Apply `action` to the current state and advance.
    pub fn step(&mut self, action: Action) -> Result<Transition> {
        let state = self.state;
        let reward = self.reward(&state, action)?;
        let next_state = self.next_state(&state, action)?;
        self.state = next_state;
        Ok(Transition {
            state,
            action,
            reward,
            next_state,
        })
    }
}
