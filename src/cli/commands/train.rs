//! Train command - Run training episodes and save the learned model

use std::{cell::RefCell, path::PathBuf, rc::Rc};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use super::ModelFormat;
use crate::{
    cli::output::{
        format_number, print_policy, print_section, print_stats_table, print_subsection,
    },
    config::{Preset, RobotConfig},
    pipeline::{
        EpisodeController, JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver,
        TrainingConfig, TrainingResult,
    },
    robot::Environment,
    td::{ModelSnapshot, TdAgent},
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    training: &'a TrainingResult,
    metrics: MetricsSummary,
    config: &'a RobotConfig,
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(about = "Train the robot agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 1000)]
    pub episodes: usize,

    /// Log the running average every N episodes (0 disables)
    #[arg(long, default_value_t = 100)]
    pub report_interval: usize,

    /// Steps per episode
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Environment parameter set (ignored when --config is given)
    #[arg(long, value_enum, default_value_t = Preset::Standard)]
    pub preset: Preset,

    /// JSON configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Probability that searching keeps a high battery high
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Probability that searching keeps a low battery low
    #[arg(long)]
    pub beta: Option<f64>,

    /// Reward when the battery dies mid-search
    #[arg(long)]
    pub dead_battery_penalty: Option<f64>,

    /// Exploration rate
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Discount factor
    #[arg(long)]
    pub discount: Option<f64>,

    /// TD step size
    #[arg(long)]
    pub step_size: Option<f64>,

    /// Model file; loaded if present and overwritten after training
    #[arg(long, short = 'm')]
    pub model: Option<PathBuf>,

    /// Model file format (inferred from the extension by default)
    #[arg(long, value_enum)]
    pub format: Option<ModelFormat>,

    /// Optional file for JSONL episode observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

/// Assemble the run configuration from file, preset and overrides.
pub fn build_config(args: &TrainArgs) -> Result<RobotConfig> {
    let mut config = match &args.config {
        Some(path) => RobotConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RobotConfig::new(args.preset.environment()),
    };

    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }
    if let Some(alpha) = args.alpha {
        config.environment.alpha = alpha;
    }
    if let Some(beta) = args.beta {
        config.environment.beta = beta;
    }
    if let Some(penalty) = args.dead_battery_penalty {
        config.environment.dead_battery_penalty = penalty;
    }
    if let Some(epsilon) = args.epsilon {
        config.learning.epsilon = epsilon;
    }
    if let Some(discount) = args.discount {
        config.learning.discount = discount;
    }
    if let Some(step_size) = args.step_size {
        config.learning.step_size = step_size;
    }

    config.validate()?;
    Ok(config)
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = build_config(&args)?;

    let snapshot = match &args.model {
        Some(path) => ModelFormat::resolve(args.format, path)
            .repository()
            .load_or_default(path, config.learning.initial_value)
            .with_context(|| format!("Failed to load model {}", path.display()))?,
        None => ModelSnapshot::fresh(config.learning.initial_value),
    };

    let agent = TdAgent::from_snapshot(config.learning.clone(), snapshot);
    let environment = Environment::new(config.environment.clone());
    let metrics = Rc::new(RefCell::new(MetricsObserver::new()));

    let mut controller = EpisodeController::from_parts(environment, agent, config.max_steps)
        .with_observer(Box::new(Rc::clone(&metrics)));
    if !args.no_progress {
        controller = controller.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create observations file {}", path.display()))?;
        controller = controller.with_observer(Box::new(observer));
    }

    let training = TrainingConfig {
        episodes: args.episodes,
        report_interval: args.report_interval,
        seed: args.seed,
    };

    tracing::info!(
        episodes = training.episodes,
        max_steps = config.max_steps,
        seed = ?training.seed,
        "starting training"
    );
    let result = controller.run_training(&training)?;
    let metrics = metrics.borrow().summary();

    print_section("Training Summary");
    print_stats_table(&[
        ("Episodes", format_number(result.total_episodes)),
        ("Steps per episode", format_number(config.max_steps)),
        ("Mean reward", format!("{:.3}", result.mean_reward)),
        ("Best / worst", format!("{:.1} / {:.1}", result.best_reward, result.worst_reward)),
        ("Recent mean (100)", format!("{:.3}", result.recent_mean(100))),
        ("Battery deaths", format_number(result.dead_battery_events)),
        ("Exploration rate", format!("{:.1}%", metrics.exploration_rate * 100.0)),
    ]);

    print_subsection("Learned policy");
    print_policy(&controller.agent().policy()?);

    if let Some(path) = &args.model {
        ModelFormat::resolve(args.format, path)
            .repository()
            .save(&controller.agent().snapshot(), path)
            .with_context(|| format!("Failed to save model {}", path.display()))?;
        println!("\nModel saved to {}", path.display());
    }

    if let Some(path) = &args.summary {
        let summary = TrainingSummaryFile {
            training: &result,
            metrics,
            config: &config,
            seed: args.seed,
        };
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create summary {}", path.display()))?;
        serde_json::to_writer_pretty(file, &summary).context("Failed to write summary")?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}
