//! Empirical transition and reward model learned from experience.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::robot::{Action, StateActionKey, StateId};

/// Everything observed after taking one action from one state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionStats {
    /// Histogram of resulting state identities
    pub transitions: BTreeMap<StateId, u64>,
    /// Rewards in the order they were observed
    pub rewards: Vec<f64>,
    /// Number of times the action was taken
    pub attempts: u64,
}

impl ActionStats {
    pub fn transition_probability(&self, next: StateId) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        let count = self.transitions.get(&next).copied().unwrap_or(0);
        count as f64 / self.attempts as f64
    }

    pub fn expected_reward(&self) -> f64 {
        if self.rewards.is_empty() {
            0.0
        } else {
            self.rewards.iter().sum::<f64>() / self.rewards.len() as f64
        }
    }
}

/// Learned model of `P(next | state, action)` and `E[reward | state, action]`.
///
/// Keyed by [`StateActionKey`]; an unseen key reads as an empty
/// [`ActionStats`], which gives zero probabilities and zero reward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicsModel {
    table: BTreeMap<StateActionKey, ActionStats>,
}

impl DynamicsModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_table(table: BTreeMap<StateActionKey, ActionStats>) -> Self {
        Self { table }
    }

    /// Record one observed transition.
    pub fn observe(&mut self, state: StateId, action: Action, next_state: StateId, reward: f64) {
        let stats = self
            .table
            .entry(StateActionKey::new(state, action))
            .or_default();
        *stats.transitions.entry(next_state).or_insert(0) += 1;
        stats.rewards.push(reward);
        stats.attempts += 1;
    }

    /// Statistics for `(state, action)`, if it was ever attempted.
    pub fn stats(&self, state: StateId, action: Action) -> Option<&ActionStats> {
        self.table.get(&StateActionKey::new(state, action))
    }

    pub fn attempts(&self, state: StateId, action: Action) -> u64 {
        self.stats(state, action).map_or(0, |stats| stats.attempts)
    }

    pub fn transition_probability(&self, state: StateId, action: Action, next: StateId) -> f64 {
        self.stats(state, action)
            .map_or(0.0, |stats| stats.transition_probability(next))
    }

    pub fn expected_reward(&self, state: StateId, action: Action) -> f64 {
        self.stats(state, action)
            .map_or(0.0, ActionStats::expected_reward)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateActionKey, &ActionStats)> {
        self.table.iter()
    }

    /// Number of distinct (state, action) pairs observed.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}
