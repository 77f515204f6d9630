//! Tunable parameters for the environment and the learning agent.
//!
//! All probabilities, rewards and learning rates live here and are handed to
//! [`Environment`](crate::robot::Environment) and
//! [`TdAgent`](crate::td::TdAgent) at construction time.

use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    robot::Action,
};

/// Ground-truth dynamics and reward model of the robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Probability that searching with a high battery leaves it high
    pub alpha: f64,
    /// Probability that searching with a low battery leaves it low
    pub beta: f64,
    /// Probability that a search step finds a can
    pub search_reward_probability: f64,
    /// Probability that a wait step is handed a can
    pub wait_reward_probability: f64,
    /// Probability that a recharge step yields a reward
    pub recharge_reward_probability: f64,
    /// Reward when the battery dies mid-search and the robot must be rescued
    pub dead_battery_penalty: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Preset::Standard.environment()
    }
}

impl EnvironmentConfig {
    /// Success probability of the Bernoulli reward draw for `action`.
    pub fn reward_probability(&self, action: Action) -> f64 {
        match action {
            Action::Search => self.search_reward_probability,
            Action::Wait => self.wait_reward_probability,
            Action::Recharge => self.recharge_reward_probability,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_reward_probabilities(mut self, search: f64, wait: f64, recharge: f64) -> Self {
        self.search_reward_probability = search;
        self.wait_reward_probability = wait;
        self.recharge_reward_probability = recharge;
        self
    }

    pub fn with_dead_battery_penalty(mut self, penalty: f64) -> Self {
        self.dead_battery_penalty = penalty;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_probability("alpha", self.alpha)?;
        check_probability("beta", self.beta)?;
        check_probability("search_reward_probability", self.search_reward_probability)?;
        check_probability("wait_reward_probability", self.wait_reward_probability)?;
        check_probability(
            "recharge_reward_probability",
            self.recharge_reward_probability,
        )?;
        if !self.dead_battery_penalty.is_finite() {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "dead_battery_penalty must be finite, got {}",
                    self.dead_battery_penalty
                ),
            });
        }
        Ok(())
    }
}

/// Parameters of the value estimator and ε-greedy policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Discount factor γ
    pub discount: f64,
    /// Exploration rate ε
    pub epsilon: f64,
    /// TD step size
    pub step_size: f64,
    /// Starting value of every state in the value table
    pub initial_value: f64,
    /// Expected value reported for a (state, action) pair never attempted
    pub unknown_value: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            epsilon: 0.1,
            step_size: 0.1,
            initial_value: 0.5,
            unknown_value: 0.5,
        }
    }
}

impl LearningConfig {
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_probability("discount", self.discount)?;
        check_probability("epsilon", self.epsilon)?;
        check_probability("step_size", self.step_size)?;
        for (name, value) in [
            ("initial_value", self.initial_value),
            ("unknown_value", self.unknown_value),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be finite, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Complete configuration of a training run.
///
/// # Examples
///
/// ```
/// use canbot::config::{LearningConfig, Preset, RobotConfig};
///
/// let config = RobotConfig::new(Preset::Harsh.environment())
///     .with_learning(LearningConfig::default().with_epsilon(0.05))
///     .with_max_steps(20);
/// config.validate()?;
/// # Ok::<(), canbot::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub environment: EnvironmentConfig,
    pub learning: LearningConfig,
    /// Number of steps after which an episode ends
    pub max_steps: usize,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::new(EnvironmentConfig::default())
    }
}

impl RobotConfig {
    pub fn new(environment: EnvironmentConfig) -> Self {
        Self {
            environment,
            learning: LearningConfig::default(),
            max_steps: 50,
        }
    }

    pub fn with_learning(mut self, learning: LearningConfig) -> Self {
        self.learning = learning;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.environment.validate()?;
        self.learning.validate()?;
        if self.max_steps == 0 {
            return Err(Error::InvalidConfiguration {
                message: "max_steps must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        let config: RobotConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }
}

/// Named environment parameter sets.
///
/// `Standard` uses the classic can-collector constants (ALPHA 0.7, BETA 1.0),
/// so a low battery never dies while searching. `Risky` lowers BETA to 0.6 so
/// the dead-battery penalty comes into play; `Harsh` drains faster still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Classic constants: a low battery never dies while searching
    #[default]
    Standard,
    /// Searching is usually worth it but a low battery can die
    Risky,
    /// The battery drains quickly and dying is expensive
    Harsh,
}

impl Preset {
    pub fn environment(self) -> EnvironmentConfig {
        match self {
            Preset::Standard => EnvironmentConfig {
                alpha: 0.7,
                beta: 1.0,
                search_reward_probability: 0.7,
                wait_reward_probability: 0.3,
                recharge_reward_probability: 0.0,
                dead_battery_penalty: -3.0,
            },
            Preset::Risky => EnvironmentConfig {
                alpha: 0.7,
                beta: 0.6,
                search_reward_probability: 0.7,
                wait_reward_probability: 0.3,
                recharge_reward_probability: 0.0,
                dead_battery_penalty: -3.0,
            },
            Preset::Harsh => EnvironmentConfig {
                alpha: 0.5,
                beta: 0.3,
                search_reward_probability: 0.8,
                wait_reward_probability: 0.2,
                recharge_reward_probability: 0.0,
                dead_battery_penalty: -10.0,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Standard => "standard",
            Preset::Risky => "risky",
            Preset::Harsh => "harsh",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Preset::Standard),
            "risky" => Ok(Preset::Risky),
            "harsh" => Ok(Preset::Harsh),
            other => Err(Error::InvalidConfiguration {
                message: format!(
                    "unknown preset '{other}' (expected standard, risky or harsh)"
                ),
            }),
        }
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("{name} must lie in [0, 1], got {value}"),
        })
    }
}
