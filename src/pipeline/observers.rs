//! Observer implementations for the training pipeline
//!
//! Observers allow composable data collection during training without coupling
//! the episode loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ports::Observer,
    types::{EpisodeOutcome, StepRecord},
};

/// Complete observation of a training episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Episode number
    pub episode: usize,
    /// Total reward collected
    pub total_reward: f64,
    /// Steps that ran the battery flat
    pub dead_battery_events: usize,
    /// Steps in the episode
    pub steps: Vec<StepRecord>,
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    total_reward: f64,
    episodes: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            total_reward: 0.0,
            episodes: 0,
        }
    }

    fn message(&self) -> String {
        if self.episodes == 0 {
            "avg reward -".to_string()
        } else {
            format!("avg reward {:.2}", self.total_reward / self.episodes as f64)
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, outcome: &EpisodeOutcome) -> Result<()> {
        self.total_reward += outcome.total_reward;
        self.episodes += 1;

        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    episode_rewards: Vec<f64>,
    dead_battery_events: usize,
    exploratory_steps: usize,
    total_steps: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean total reward per episode
    pub fn mean_reward(&self) -> f64 {
        if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f64>() / self.episode_rewards.len() as f64
        }
    }

    /// Fraction of steps chosen by exploration
    pub fn exploration_rate(&self) -> f64 {
        if self.total_steps == 0 {
            0.0
        } else {
            self.exploratory_steps as f64 / self.total_steps as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episode_rewards.len(),
            total_steps: self.total_steps,
            mean_reward: self.mean_reward(),
            dead_battery_events: self.dead_battery_events,
            exploration_rate: self.exploration_rate(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub total_steps: usize,
    pub mean_reward: f64,
    pub dead_battery_events: usize,
    pub exploration_rate: f64,
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, _episode: usize, step: &StepRecord) -> Result<()> {
        self.total_steps += 1;
        if !step.greedy {
            self.exploratory_steps += 1;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, _episode: usize, outcome: &EpisodeOutcome) -> Result<()> {
        self.episode_rewards.push(outcome.total_reward);
        self.dead_battery_events += outcome.dead_battery_events;
        Ok(())
    }
}

/// JSONL observer - Exports one JSON object per episode
pub struct JsonlObserver {
    writer: BufWriter<File>,
    current_steps: Vec<StepRecord>,
}

impl JsonlObserver {
    /// Create a new JSONL observer writing to `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            current_steps: Vec::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.current_steps.clear();
        Ok(())
    }

    fn on_step(&mut self, _episode: usize, step: &StepRecord) -> Result<()> {
        self.current_steps.push(*step);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, outcome: &EpisodeOutcome) -> Result<()> {
        let observation = Observation {
            episode,
            total_reward: outcome.total_reward,
            dead_battery_events: outcome.dead_battery_events,
            steps: std::mem::take(&mut self.current_steps),
        };

        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::{Action, BatteryLevel};

    fn step(greedy: bool) -> StepRecord {
        StepRecord {
            step: 0,
            level: BatteryLevel::High,
            action: Action::Search,
            greedy,
            reward: 1.0,
            next_level: BatteryLevel::High,
        }
    }

    #[test]
    fn test_metrics_observer_counts() {
        let mut metrics = MetricsObserver::new();
        metrics.on_step(0, &step(true)).unwrap();
        metrics.on_step(0, &step(false)).unwrap();
        metrics
            .on_episode_end(
                0,
                &EpisodeOutcome {
                    total_reward: 2.0,
                    rewards: vec![1.0, 1.0],
                    dead_battery_events: 1,
                    exploratory_steps: 1,
                },
            )
            .unwrap();

        let summary = metrics.summary();
        assert_eq!(summary.episodes, 1);
        assert_eq!(summary.total_steps, 2);
        assert_eq!(summary.mean_reward, 2.0);
        assert_eq!(summary.dead_battery_events, 1);
        assert_eq!(summary.exploration_rate, 0.5);
    }
}
