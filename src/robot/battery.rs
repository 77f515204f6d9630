//! Battery levels, actions and the identifiers used to key learned tables.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Charge level of the robot's battery.
///
/// This is the only thing the agent observes, so the state space has exactly
/// three members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryLevel {
    High,
    Low,
    Dead,
}

impl BatteryLevel {
    /// Every battery level, in index order.
    pub const ALL: [BatteryLevel; 3] = [BatteryLevel::High, BatteryLevel::Low, BatteryLevel::Dead];

    /// Actions the robot may take at this battery level.
    ///
    /// The order is fixed and doubles as the tie-break order for greedy
    /// action selection.
    pub fn valid_actions(self) -> &'static [Action] {
        match self {
            BatteryLevel::High => &[Action::Search, Action::Wait],
            BatteryLevel::Low => &[Action::Search, Action::Wait, Action::Recharge],
            BatteryLevel::Dead => &[Action::Recharge],
        }
    }

    /// Whether `action` is permitted at this battery level.
    pub fn allows(self, action: Action) -> bool {
        self.valid_actions().contains(&action)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BatteryLevel::High => "high",
            BatteryLevel::Low => "low",
            BatteryLevel::Dead => "dead",
        }
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatteryLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(BatteryLevel::High),
            "low" => Ok(BatteryLevel::Low),
            "dead" => Ok(BatteryLevel::Dead),
            _ => Err(Error::InvalidState {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<u8> for BatteryLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        BatteryLevel::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| Error::InvalidState {
                value: value.to_string(),
            })
    }
}

/// Something the robot can do during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Actively look for cans; drains the battery.
    Search,
    /// Wait for someone to bring a can; battery unchanged.
    Wait,
    /// Return to the dock and recharge to full.
    Recharge,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Search, Action::Wait, Action::Recharge];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Search => "search",
            Action::Wait => "wait",
            Action::Recharge => "recharge",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(Action::Search),
            "wait" => Ok(Action::Wait),
            "recharge" => Ok(Action::Recharge),
            _ => Err(Error::UnknownAction {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Action::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| Error::UnknownAction {
                value: value.to_string(),
            })
    }
}

/// Key used to index every learned table.
///
/// Derived from the battery level alone: all environment states sharing a
/// level collapse onto the same identity, whatever their random draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(BatteryLevel);

impl StateId {
    pub const fn new(level: BatteryLevel) -> Self {
        Self(level)
    }

    pub fn level(self) -> BatteryLevel {
        self.0
    }

    /// Identities of all three states.
    pub fn all() -> impl Iterator<Item = StateId> {
        BatteryLevel::ALL.into_iter().map(StateId)
    }
}

impl From<BatteryLevel> for StateId {
    fn from(level: BatteryLevel) -> Self {
        Self(level)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `(state identity, action)` pair keying the learned dynamics.
///
/// Serialized as `"<state>:<action>"` (e.g. `"low:search"`) so it can be used
/// as a map key by text formats as well as MessagePack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateActionKey {
    pub state: StateId,
    pub action: Action,
}

impl StateActionKey {
    pub fn new(state: StateId, action: Action) -> Self {
        Self { state, action }
    }
}

impl fmt::Display for StateActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.state, self.action)
    }
}

impl FromStr for StateActionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (state, action) = s.split_once(':').ok_or_else(|| Error::InvalidState {
            value: s.to_string(),
        })?;
        Ok(Self {
            state: StateId::new(state.parse()?),
            action: action.parse()?,
        })
    }
}

impl Serialize for StateActionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StateActionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
