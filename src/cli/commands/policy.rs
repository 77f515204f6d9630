//! Policy command - Show the value table and greedy policy of a saved model

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use super::ModelFormat;
use crate::{
    cli::output::{print_policy, print_section},
    config::{LearningConfig, RobotConfig},
    td::TdAgent,
};

#[derive(Parser, Debug)]
#[command(about = "Show the learned policy")]
pub struct PolicyArgs {
    /// Saved model to inspect
    #[arg(long, short = 'm')]
    pub model: PathBuf,

    /// Model file format (inferred from the extension by default)
    #[arg(long, value_enum)]
    pub format: Option<ModelFormat>,

    /// JSON configuration supplying the discount factor and priors
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

pub fn execute(args: PolicyArgs) -> Result<()> {
    let learning = match &args.config {
        Some(path) => {
            RobotConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
                .learning
        }
        None => LearningConfig::default(),
    };

    let snapshot = ModelFormat::resolve(args.format, &args.model)
        .repository()
        .load(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;

    let agent = TdAgent::from_snapshot(learning, snapshot);

    print_section(&format!("Policy for {}", args.model.display()));
    print_policy(&agent.policy()?);
    Ok(())
}
