//! CLI train and policy commands run end to end

use canbot::{
    BatteryLevel,
    adapters::MsgPackRepository,
    cli::commands::{
        policy::{self, PolicyArgs},
        train::{TrainArgs, build_config, execute},
    },
    ports::ModelRepository,
};
use clap::Parser;
use tempfile::tempdir;

fn parse_args<I, T>(args: I) -> TrainArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    TrainArgs::parse_from(args)
}

#[test]
fn overrides_apply_on_top_of_the_preset() {
    let args = parse_args([
        "canbot-train",
        "--preset",
        "harsh",
        "--beta",
        "0.45",
        "--dead-battery-penalty",
        "-5",
        "--max-steps",
        "8",
    ]);

    let config = build_config(&args).unwrap();
    assert_eq!(config.environment.alpha, 0.5);
    assert_eq!(config.environment.beta, 0.45);
    assert_eq!(config.environment.dead_battery_penalty, -5.0);
    assert_eq!(config.max_steps, 8);
}

#[test]
fn invalid_override_is_rejected() {
    let args = parse_args(["canbot-train", "--alpha", "1.5"]);
    assert!(build_config(&args).is_err());
}

#[test]
fn train_writes_model_and_summary() {
    let tmp = tempdir().unwrap();
    let model = tmp.path().join("robot.msgpack");
    let summary = tmp.path().join("summary.json");
    let observations = tmp.path().join("episodes.jsonl");

    let args = parse_args([
        "canbot-train",
        "--episodes",
        "6",
        "--max-steps",
        "10",
        "--seed",
        "4",
        "--no-progress",
        "--model",
        model.to_str().unwrap(),
        "--summary",
        summary.to_str().unwrap(),
        "--observations",
        observations.to_str().unwrap(),
    ]);

    execute(args).expect("training should succeed");

    let snapshot = MsgPackRepository::new().load(&model).unwrap();
    assert_eq!(snapshot.total_attempts.values().sum::<u64>(), 60);

    let contents = std::fs::read_to_string(&summary).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["training"]["total_episodes"], 6);
    assert_eq!(parsed["metrics"]["total_steps"], 60);
    assert_eq!(parsed["config"]["max_steps"], 10);
    assert_eq!(parsed["seed"], 4);

    let lines = std::fs::read_to_string(&observations).unwrap();
    assert_eq!(lines.lines().count(), 6);

    // A second run continues from the saved model.
    let args = parse_args([
        "canbot-train",
        "--episodes",
        "2",
        "--max-steps",
        "10",
        "--no-progress",
        "--model",
        model.to_str().unwrap(),
    ]);
    execute(args).unwrap();
    let snapshot = MsgPackRepository::new().load(&model).unwrap();
    assert_eq!(snapshot.total_attempts.values().sum::<u64>(), 80);
    assert!(snapshot.value_table.keys().any(|state| state.level() == BatteryLevel::High));
}

#[test]
fn policy_command_reads_a_json_model() {
    let tmp = tempdir().unwrap();
    let model = tmp.path().join("robot.json");

    let args = parse_args([
        "canbot-train",
        "--episodes",
        "3",
        "--max-steps",
        "5",
        "--no-progress",
        "--model",
        model.to_str().unwrap(),
    ]);
    execute(args).unwrap();
    assert!(model.exists());

    let args = PolicyArgs::parse_from(["canbot-policy", "--model", model.to_str().unwrap()]);
    policy::execute(args).unwrap();

    let missing = PolicyArgs::parse_from([
        "canbot-policy",
        "--model",
        tmp.path().join("nope.json").to_str().unwrap(),
    ]);
    assert!(policy::execute(missing).is_err());
}
