//! Training pipeline
//!
//! This module provides:
//! - The episode controller driving environment and agent
//! - Observers recording what happens during training

pub mod observers;
pub mod training;

pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, Observation, ProgressObserver};
pub use training::{EpisodeController, TrainingConfig, TrainingResult};

pub use crate::ports::Observer;
