//! Episode loop and training driver

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    config::RobotConfig,
    ports::Observer,
    robot::{BatteryLevel, Environment},
    td::TdAgent,
    types::{EpisodeOutcome, StepRecord},
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of episodes to run
    pub episodes: usize,

    /// Log the running average every this many episodes (0 disables)
    pub report_interval: usize,

    /// Random seed
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            report_interval: 100,
            seed: None,
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Total episodes run
    pub total_episodes: usize,

    /// Mean total reward per episode
    pub mean_reward: f64,

    /// Highest episode total
    pub best_reward: f64,

    /// Lowest episode total
    pub worst_reward: f64,

    /// Number of steps that ran the battery flat
    pub dead_battery_events: usize,

    /// Total reward of every episode, in order
    pub episode_rewards: Vec<f64>,

    /// Value estimate per battery level after training
    pub final_values: Vec<(BatteryLevel, f64)>,
}

impl TrainingResult {
    /// Summarise a run from its per-episode totals
    pub fn new(
        episode_rewards: Vec<f64>,
        dead_battery_events: usize,
        final_values: Vec<(BatteryLevel, f64)>,
    ) -> Self {
        let total_episodes = episode_rewards.len();
        let mean_reward = if total_episodes > 0 {
            episode_rewards.iter().sum::<f64>() / total_episodes as f64
        } else {
            0.0
        };
        let best_reward = episode_rewards
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let worst_reward = episode_rewards
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);

        Self {
            total_episodes,
            mean_reward,
            best_reward: if total_episodes > 0 { best_reward } else { 0.0 },
            worst_reward: if total_episodes > 0 { worst_reward } else { 0.0 },
            dead_battery_events,
            episode_rewards,
            final_values,
        }
    }

    /// Mean total reward over the last `n` episodes
    pub fn recent_mean(&self, n: usize) -> f64 {
        let start = self.episode_rewards.len().saturating_sub(n);
        let recent = &self.episode_rewards[start..];
        if recent.is_empty() {
            0.0
        } else {
            recent.iter().sum::<f64>() / recent.len() as f64
        }
    }
}

/// Drives episodes of the robot environment with a learning agent.
///
/// Each episode starts from a fully charged battery and runs for exactly
/// `max_steps` steps; a dead battery does not end it early.
pub struct EpisodeController {
    environment: Environment,
    agent: TdAgent,
    max_steps: usize,
    observers: Vec<Box<dyn Observer>>,
    episodes_run: usize,
}

impl EpisodeController {
    /// Create a controller with a fresh environment and agent
    pub fn new(config: &RobotConfig) -> Self {
        Self::from_parts(
            Environment::new(config.environment.clone()),
            TdAgent::new(config.learning.clone()),
            config.max_steps,
        )
    }

    /// Create a controller around an existing environment and agent
    pub fn from_parts(environment: Environment, agent: TdAgent, max_steps: usize) -> Self {
        Self {
            environment,
            agent,
            max_steps,
            observers: Vec::new(),
            episodes_run: 0,
        }
    }

    /// Seed the environment and agent with independent streams
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed(seed);
        self
    }

    /// Add an observer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn agent(&self) -> &TdAgent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut TdAgent {
        &mut self.agent
    }

    pub fn into_agent(self) -> TdAgent {
        self.agent
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Episodes run so far by this controller
    pub fn episodes_run(&self) -> usize {
        self.episodes_run
    }

    fn seed(&mut self, seed: u64) {
        self.environment.set_rng_seed(seed);
        self.agent.set_rng_seed(seed.wrapping_add(1));
    }

    /// Run one episode without backing up values.
    ///
    /// Observers see the full start, step and end sequence. The agent's
    /// trajectory holds the episode afterwards, ready for
    /// [`TdAgent::backup`].
    pub fn run_episode(&mut self) -> Result<EpisodeOutcome> {
        let episode = self.episodes_run;
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        self.environment.reset();
        self.agent.reset();

        let mut outcome = EpisodeOutcome::default();
        for step in 0..self.max_steps {
            let state = self.environment.state().id();
            let decision = self.agent.select_action(state)?;
            let transition = self.environment.step(decision.action)?;
            self.agent
                .observe(state, decision, transition.next_state.id(), transition.reward);

            let record = StepRecord::new(step, &transition, decision.greedy);
            outcome.total_reward += transition.reward;
            outcome.rewards.push(transition.reward);
            if record.battery_died() {
                outcome.dead_battery_events += 1;
            }
            if !decision.greedy {
                outcome.exploratory_steps += 1;
            }

            for observer in &mut self.observers {
                observer.on_step(episode, &record)?;
            }
        }

        for observer in &mut self.observers {
            observer.on_episode_end(episode, &outcome)?;
        }

        self.episodes_run += 1;
        Ok(outcome)
    }

    /// Run `config.episodes` episodes, backing up values after each
    pub fn run_training(&mut self, config: &TrainingConfig) -> Result<TrainingResult> {
        if let Some(seed) = config.seed {
            self.seed(seed);
        }

        for observer in &mut self.observers {
            observer.on_training_start(config.episodes)?;
        }

        let mut episode_rewards = Vec::with_capacity(config.episodes);
        let mut dead_battery_events = 0;
        let mut window_total = 0.0;

        for i in 0..config.episodes {
            let episode = self.episodes_run;
            let outcome = self.run_episode()?;
            self.agent.backup();

            tracing::debug!(
                episode,
                total_reward = outcome.total_reward,
                dead_battery_events = outcome.dead_battery_events,
                "episode finished"
            );

            dead_battery_events += outcome.dead_battery_events;
            window_total += outcome.total_reward;
            episode_rewards.push(outcome.total_reward);

            if config.report_interval > 0 && (i + 1).is_multiple_of(config.report_interval) {
                tracing::info!(
                    "episode {}: average reward {:.3} over last {} episodes (V[high]={:.3}, V[low]={:.3}, V[dead]={:.3})",
                    i + 1,
                    window_total / config.report_interval as f64,
                    config.report_interval,
                    self.agent.value(BatteryLevel::High),
                    self.agent.value(BatteryLevel::Low),
                    self.agent.value(BatteryLevel::Dead),
                );
                window_total = 0.0;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let final_values = BatteryLevel::ALL
            .iter()
            .map(|&level| (level, self.agent.value(level)))
            .collect();

        Ok(TrainingResult::new(
            episode_rewards,
            dead_battery_events,
            final_values,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use tempfile::tempdir;

    use super::*;
    use crate::{
        config::LearningConfig,
        pipeline::{JsonlObserver, MetricsObserver},
    };

    #[test]
    fn test_episode_has_fixed_length() {
        let config = RobotConfig::default().with_max_steps(7);
        let mut controller = EpisodeController::new(&config).with_seed(42);

        let outcome = controller.run_episode().unwrap();

        assert_eq!(outcome.len(), 7);
        assert_eq!(controller.agent().trajectory().len(), 7);
        let sum: f64 = outcome.rewards.iter().sum();
        assert!((outcome.total_reward - sum).abs() < 1e-12);
    }

    #[test]
    fn test_training_pipeline() {
        let config = RobotConfig::default().with_max_steps(10);
        let training = TrainingConfig {
            episodes: 25,
            report_interval: 5,
            seed: Some(7),
        };

        let mut controller = EpisodeController::new(&config);
        let result = controller.run_training(&training).unwrap();

        assert_eq!(result.total_episodes, 25);
        assert_eq!(result.episode_rewards.len(), 25);
        assert_eq!(controller.episodes_run(), 25);
        assert!(result.worst_reward <= result.mean_reward);
        assert!(result.mean_reward <= result.best_reward);
        assert_eq!(result.final_values.len(), 3);
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let config = RobotConfig::default()
            .with_max_steps(10)
            .with_learning(LearningConfig::default().with_epsilon(0.2));
        let training = TrainingConfig {
            episodes: 30,
            report_interval: 0,
            seed: Some(99),
        };

        let a = EpisodeController::new(&config)
            .run_training(&training)
            .unwrap();
        let b = EpisodeController::new(&config)
            .run_training(&training)
            .unwrap();

        assert_eq!(a.episode_rewards, b.episode_rewards);
        assert_eq!(a.final_values, b.final_values);
    }

    #[test]
    fn test_run_episode_closes_every_episode_for_observers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("episodes.jsonl");
        let metrics = Rc::new(RefCell::new(MetricsObserver::new()));

        let config = RobotConfig::default().with_max_steps(5);
        let mut controller = EpisodeController::new(&config)
            .with_seed(8)
            .with_observer(Box::new(Rc::clone(&metrics)))
            .with_observer(Box::new(JsonlObserver::new(&path).unwrap()));

        for _ in 0..3 {
            controller.run_episode().unwrap();
            controller.agent_mut().backup();
        }
        // Dropping the controller flushes the JSONL writer.
        drop(controller);

        let summary = metrics.borrow().summary();
        assert_eq!(summary.episodes, 3);
        assert_eq!(summary.total_steps, 15);

        let contents = std::fs::read_to_string(&path).unwrap();
        let episodes: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(episodes.len(), 3);
        for (i, episode) in episodes.iter().enumerate() {
            assert_eq!(episode["episode"], i);
            assert_eq!(episode["steps"].as_array().unwrap().len(), 5);
        }
    }

    #[test]
    fn test_empty_result() {
        let result = TrainingResult::new(Vec::new(), 0, Vec::new());
        assert_eq!(result.mean_reward, 0.0);
        assert_eq!(result.best_reward, 0.0);
        assert_eq!(result.recent_mean(10), 0.0);
    }
}
