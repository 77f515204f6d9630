//! Saving and reloading learned models through the repository adapters

use std::path::Path;

use canbot::{
    BatteryLevel, Environment, ModelSnapshot, RobotConfig, StateId, TdAgent,
    adapters::{InMemoryRepository, JsonRepository, MsgPackRepository},
    pipeline::{EpisodeController, TrainingConfig},
    ports::ModelRepository,
};
use tempfile::tempdir;

fn trained_agent() -> TdAgent {
    let config = RobotConfig::default().with_max_steps(25);
    let mut controller = EpisodeController::new(&config);
    controller
        .run_training(&TrainingConfig {
            episodes: 30,
            report_interval: 0,
            seed: Some(101),
        })
        .unwrap();
    controller.into_agent()
}

#[test]
fn msgpack_round_trip_restores_the_same_policy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("robot.msgpack");
    let agent = trained_agent();

    let repo = MsgPackRepository::new();
    repo.save(&agent.snapshot(), &path).unwrap();
    let loaded = repo.load(&path).unwrap();
    assert_eq!(loaded, agent.snapshot());

    let restored = TdAgent::from_snapshot(agent.config().clone(), loaded);
    assert_eq!(restored.policy().unwrap(), agent.policy().unwrap());
}

#[test]
fn json_file_holds_the_four_tables() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("robot.json");
    let agent = trained_agent();

    JsonRepository::new().save(&agent.snapshot(), &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let object = parsed.as_object().unwrap();
    assert_eq!(object.len(), 4);
    for field in [
        "value_table",
        "transition_counts",
        "reward_history",
        "total_attempts",
    ] {
        assert!(object.contains_key(field), "missing {field}");
    }
    assert!(parsed["value_table"]["high"].is_number());
    assert!(parsed["total_attempts"]["high:search"].is_number());

    let loaded = JsonRepository::new().load(&path).unwrap();
    let original = agent.snapshot();
    assert_eq!(loaded.total_attempts, original.total_attempts);
    assert_eq!(loaded.transition_counts, original.transition_counts);
    assert_eq!(loaded.reward_history, original.reward_history);
    for state in StateId::all() {
        assert!((loaded.value_table[&state] - original.value_table[&state]).abs() < 1e-12);
    }
}

#[test]
fn missing_file_falls_back_to_a_fresh_model() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.msgpack");

    let snapshot = MsgPackRepository::new()
        .load_or_default(&path, 0.5)
        .unwrap();

    assert_eq!(snapshot, ModelSnapshot::fresh(0.5));
    assert!(snapshot.total_attempts.is_empty());
    assert!(!path.exists());
}

#[test]
fn corrupt_file_is_an_error_not_a_fresh_model() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("robot.msgpack");
    std::fs::write(&path, b"not a model").unwrap();

    assert!(MsgPackRepository::new().load_or_default(&path, 0.5).is_err());
}

#[test]
fn training_resumes_from_a_saved_model() {
    let repo = InMemoryRepository::new();
    let path = Path::new("robot");
    let agent = trained_agent();
    let attempts: u64 = agent.snapshot().total_attempts.values().sum();
    repo.save(&agent.snapshot(), path).unwrap();

    let config = RobotConfig::default().with_max_steps(25);
    let snapshot = repo.load_or_default(path, 0.5).unwrap();
    let resumed = TdAgent::from_snapshot(config.learning.clone(), snapshot);
    assert_eq!(resumed.value(BatteryLevel::High), agent.value(BatteryLevel::High));

    let mut controller = EpisodeController::from_parts(
        Environment::new(config.environment.clone()),
        resumed,
        config.max_steps,
    );
    controller
        .run_training(&TrainingConfig {
            episodes: 2,
            report_interval: 0,
            seed: Some(1),
        })
        .unwrap();

    let total: u64 = controller.agent().snapshot().total_attempts.values().sum();
    assert_eq!(total, attempts + 50);
}
