//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling the episode loop
//! to specific output formats or metrics.

use std::{cell::RefCell, rc::Rc};

use crate::{
    Result,
    types::{EpisodeOutcome, StepRecord},
};

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during training.
/// Examples include:
/// - Progress bars for user feedback
/// - Periodic log lines with running averages
/// - JSONL export for analysis
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(...)` - For each step in the episode
///    - `on_episode_end(episode, outcome)` - After the last step, before any
///      value backup
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use canbot::{ports::Observer, types::EpisodeOutcome};
///
/// struct DeathCounter {
///     deaths: usize,
/// }
///
/// impl Observer for DeathCounter {
///     fn on_episode_end(
///         &mut self,
///         _episode: usize,
///         outcome: &EpisodeOutcome,
///     ) -> canbot::Result<()> {
///         self.deaths += outcome.dead_battery_events;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer {
    /// Called when training starts.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode starts.
    ///
    /// # Parameters
    ///
    /// * `episode` - Index of the episode (0-based)
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each environment step.
    fn on_step(&mut self, _episode: usize, _step: &StepRecord) -> Result<()> {
        Ok(())
    }

    /// Called after the last step of an episode.
    fn on_episode_end(&mut self, _episode: usize, _outcome: &EpisodeOutcome) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// Use this to finalize outputs, flush files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Shared observers: the caller keeps a handle and reads results after the
/// controller that owns the box is done.
impl<O: Observer> Observer for Rc<RefCell<O>> {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        self.borrow_mut().on_training_start(total_episodes)
    }

    fn on_episode_start(&mut self, episode: usize) -> Result<()> {
        self.borrow_mut().on_episode_start(episode)
    }

    fn on_step(&mut self, episode: usize, step: &StepRecord) -> Result<()> {
        self.borrow_mut().on_step(episode, step)
    }

    fn on_episode_end(&mut self, episode: usize, outcome: &EpisodeOutcome) -> Result<()> {
        self.borrow_mut().on_episode_end(episode, outcome)
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.borrow_mut().on_training_end()
    }
}
