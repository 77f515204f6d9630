//! Records produced while running episodes.

use serde::{Deserialize, Serialize};

use crate::robot::{Action, BatteryLevel, Transition};

/// One step of an episode, as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub level: BatteryLevel,
    pub action: Action,
    pub greedy: bool,
    pub reward: f64,
    pub next_level: BatteryLevel,
}

impl StepRecord {
    pub fn new(step: usize, transition: &Transition, greedy: bool) -> Self {
        Self {
            step,
            level: transition.state.level(),
            action: transition.action,
            greedy,
            reward: transition.reward,
            next_level: transition.next_state.level(),
        }
    }

    /// True when this step ran the battery flat.
    pub fn battery_died(&self) -> bool {
        self.level == BatteryLevel::Low && self.next_level == BatteryLevel::Dead
    }
}

/// Result of a single episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    pub total_reward: f64,
    /// Reward of every step, in order
    pub rewards: Vec<f64>,
    /// Steps that ran the battery flat
    pub dead_battery_events: usize,
    /// Steps chosen by exploration rather than greedily
    pub exploratory_steps: usize,
}

impl EpisodeOutcome {
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}
