//! Persistable form of a learned model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    dynamics::{ActionStats, DynamicsModel},
    value_table::ValueTable,
};
use crate::robot::{StateActionKey, StateId};

/// Serialized record of everything the agent has learned.
///
/// Four flat tables keyed by state or by `"state:action"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub value_table: BTreeMap<StateId, f64>,
    pub transition_counts: BTreeMap<StateActionKey, BTreeMap<StateId, u64>>,
    pub reward_history: BTreeMap<StateActionKey, Vec<f64>>,
    pub total_attempts: BTreeMap<StateActionKey, u64>,
}

impl ModelSnapshot {
    /// Snapshot of an untrained model: every state valued at `initial_value`,
    /// nothing observed.
    pub fn fresh(initial_value: f64) -> Self {
        Self::from_parts(&ValueTable::new(initial_value), &DynamicsModel::new())
    }

    pub fn from_parts(values: &ValueTable, dynamics: &DynamicsModel) -> Self {
        let mut transition_counts = BTreeMap::new();
        let mut reward_history = BTreeMap::new();
        let mut total_attempts = BTreeMap::new();
        for (key, stats) in dynamics.iter() {
            transition_counts.insert(*key, stats.transitions.clone());
            reward_history.insert(*key, stats.rewards.clone());
            total_attempts.insert(*key, stats.attempts);
        }
        Self {
            value_table: values.as_map().clone(),
            transition_counts,
            reward_history,
            total_attempts,
        }
    }

    /// Rebuild the value table and dynamics model.
    ///
    /// States absent from `value_table` take `initial_value`.
    pub fn into_parts(self, initial_value: f64) -> (ValueTable, DynamicsModel) {
        let Self {
            value_table,
            mut transition_counts,
            mut reward_history,
            total_attempts,
        } = self;

        let mut keys: Vec<StateActionKey> = total_attempts.keys().copied().collect();
        keys.extend(transition_counts.keys().copied());
        keys.extend(reward_history.keys().copied());
        keys.sort();
        keys.dedup();

        let table = keys
            .into_iter()
            .map(|key| {
                let stats = ActionStats {
                    transitions: transition_counts.remove(&key).unwrap_or_default(),
                    rewards: reward_history.remove(&key).unwrap_or_default(),
                    attempts: total_attempts.get(&key).copied().unwrap_or(0),
                };
                (key, stats)
            })
            .collect();

        (
            ValueTable::from_values(value_table, initial_value),
            DynamicsModel::from_table(table),
        )
    }
}

impl Default for ModelSnapshot {
    fn default() -> Self {
        Self::fresh(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::{Action, BatteryLevel};

    #[test]
    fn test_fresh_snapshot_shape() {
        let snapshot = ModelSnapshot::default();
        assert_eq!(snapshot.value_table.len(), 3);
        assert!(snapshot.value_table.values().all(|&v| v == 0.5));
        assert!(snapshot.transition_counts.is_empty());
        assert!(snapshot.reward_history.is_empty());
        assert!(snapshot.total_attempts.is_empty());
    }

    #[test]
    fn test_parts_survive_conversion() {
        let low = StateId::from(BatteryLevel::Low);
        let dead = StateId::from(BatteryLevel::Dead);
        let mut dynamics = DynamicsModel::new();
        dynamics.observe(low, Action::Search, dead, -3.0);
        dynamics.observe(low, Action::Search, low, 1.0);
        let mut values = ValueTable::new(0.5);
        values.set(low, 0.25);

        let snapshot = ModelSnapshot::from_parts(&values, &dynamics);
        assert_eq!(
            snapshot.total_attempts[&StateActionKey::new(low, Action::Search)],
            2
        );

        let (values_back, dynamics_back) = snapshot.into_parts(0.5);
        assert_eq!(values_back, values);
        assert_eq!(dynamics_back, dynamics);
    }

    #[test]
    fn test_json_uses_readable_keys() {
        let low = StateId::from(BatteryLevel::Low);
        let mut dynamics = DynamicsModel::new();
        dynamics.observe(low, Action::Wait, low, 0.0);
        let snapshot = ModelSnapshot::from_parts(&ValueTable::default(), &dynamics);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["total_attempts"]["low:wait"], 1);
        assert_eq!(json["transition_counts"]["low:wait"]["low"], 1);
        assert_eq!(json["value_table"]["high"], 0.5);
    }
}
