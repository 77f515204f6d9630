//! Can-collecting robot environment

pub mod battery;
pub mod environment;

pub use battery::{Action, BatteryLevel, StateActionKey, StateId};
pub use environment::{Environment, EnvironmentState, Transition};
