//! Model-based temporal-difference learning for a can-collecting robot
//!
//! This crate provides:
//! - The battery environment (HIGH/LOW/DEAD) with fixed per-state random draws
//! - A learned dynamics model and value table with one-step Bellman backups
//! - An epsilon-greedy TD agent with backward trajectory updates
//! - An episode controller with pluggable observers
//! - Model persistence through MessagePack, JSON and in-memory repositories

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod robot;
pub mod td;
pub mod types;

pub use config::{EnvironmentConfig, LearningConfig, Preset, RobotConfig};
pub use error::{Error, Result};
pub use robot::{Action, BatteryLevel, Environment, EnvironmentState, StateId};
pub use td::{DynamicsModel, ModelSnapshot, TdAgent, ValueTable};
