//! Model-based temporal difference learning
//!
//! The agent keeps two long-lived tables:
//!
//! - a [`DynamicsModel`] of observed transitions and rewards per
//!   (state, action), and
//! - a [`ValueTable`] of discounted-return estimates per state.
//!
//! Action values are computed on demand from both, and the value table is
//! updated once per episode by a backward TD pass over the trajectory.
//!
//! ## Usage Example
//!
//! ```no_run
//! use canbot::{config::LearningConfig, robot::{BatteryLevel, StateId}, td::TdAgent};
//!
//! let mut agent = TdAgent::new(LearningConfig::default()).with_seed(7);
//! let decision = agent.select_action(StateId::from(BatteryLevel::High))?;
//! # Ok::<(), canbot::Error>(())
//! ```

pub mod agent;
pub mod dynamics;
pub mod snapshot;
pub mod value_table;

pub use agent::{Decision, PolicyEntry, TdAgent};
pub use dynamics::{ActionStats, DynamicsModel};
pub use snapshot::ModelSnapshot;
pub use value_table::{Trajectory, TrajectoryStep, ValueTable};
