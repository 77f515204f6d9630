//! State-value table and the backward TD backup over an episode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::robot::StateId;

/// One recorded step of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryStep {
    /// State the action was taken from
    pub state: StateId,
    /// Whether the action was the greedy choice
    pub greedy: bool,
    pub reward: f64,
}

/// Steps of the current episode, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    steps: Vec<TrajectoryStep>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: StateId, greedy: bool, reward: f64) {
        self.steps.push(TrajectoryStep {
            state,
            greedy,
            reward,
        });
    }

    pub fn steps(&self) -> &[TrajectoryStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}

impl FromIterator<TrajectoryStep> for Trajectory {
    fn from_iter<I: IntoIterator<Item = TrajectoryStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Estimated discounted return per state identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueTable {
    values: BTreeMap<StateId, f64>,
    /// Value reported for identities missing from `values`
    initial_value: f64,
}

impl ValueTable {
    /// Create a table with every state set to `initial_value`.
    pub fn new(initial_value: f64) -> Self {
        Self {
            values: StateId::all().map(|id| (id, initial_value)).collect(),
            initial_value,
        }
    }

    pub(crate) fn from_values(values: BTreeMap<StateId, f64>, initial_value: f64) -> Self {
        let mut table = Self::new(initial_value);
        table.values.extend(values);
        table
    }

    pub fn get(&self, state: StateId) -> f64 {
        self.values
            .get(&state)
            .copied()
            .unwrap_or(self.initial_value)
    }

    pub fn set(&mut self, state: StateId, value: f64) {
        self.values.insert(state, value);
    }

    pub fn as_map(&self) -> &BTreeMap<StateId, f64> {
        &self.values
    }

    /// Backward TD pass over one finished episode.
    ///
    /// For each step `i` from the second-to-last back to the first:
    ///
    /// V(s_i) ← V(s_i) + step_size · g_i · [r_i + γ V(s_{i+1}) − V(s_i)]
    ///
    /// where `g_i` is 1 for greedy steps and 0 for exploratory ones. The final
    /// step has no successor in the trajectory and is left alone.
    pub fn backup(&mut self, trajectory: &Trajectory, step_size: f64, discount: f64) {
        let steps = trajectory.steps();
        for i in (0..steps.len().saturating_sub(1)).rev() {
            let step = &steps[i];
            if !step.greedy {
                continue;
            }
            let current = self.get(step.state);
            let next = self.get(steps[i + 1].state);
            let td_error = step.reward + discount * next - current;
            self.set(step.state, current + step_size * td_error);
        }
    }
}

impl Default for ValueTable {
    fn default() -> Self {
        Self::new(0.5)
    }
}
