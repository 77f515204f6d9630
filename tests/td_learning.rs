//! End-to-end checks of the TD agent driven by the episode controller

use std::{cell::RefCell, rc::Rc};

use canbot::{
    Action, BatteryLevel, EnvironmentConfig, LearningConfig, RobotConfig, StateId, TdAgent,
    pipeline::{EpisodeController, MetricsObserver, TrainingConfig},
    td::Trajectory,
};

const HIGH: StateId = StateId::new(BatteryLevel::High);
const LOW: StateId = StateId::new(BatteryLevel::Low);

/// Searching never drains the battery and always finds a can.
fn always_rewarding() -> EnvironmentConfig {
    EnvironmentConfig::default()
        .with_alpha(1.0)
        .with_beta(1.0)
        .with_reward_probabilities(1.0, 0.0, 0.0)
}

#[test]
fn fresh_agent_uses_the_prior_everywhere() {
    let agent = TdAgent::new(LearningConfig::default());
    for level in BatteryLevel::ALL {
        assert_eq!(agent.value(level), 0.5);
        for &action in level.valid_actions() {
            assert_eq!(agent.expected_value(StateId::new(level), action), 0.5);
        }
    }
    assert_eq!(agent.greedy_action(HIGH).unwrap(), Action::Search);
    assert_eq!(agent.greedy_action(LOW).unwrap(), Action::Search);
}

#[test]
fn five_step_episode_backs_up_from_the_end() {
    let config = RobotConfig::default()
        .with_max_steps(5)
        .with_learning(LearningConfig::default().with_epsilon(0.0));
    let mut controller = EpisodeController::new(&config).with_seed(2024);

    let outcome = controller.run_episode().unwrap();
    assert_eq!(outcome.len(), 5);
    assert_eq!(outcome.exploratory_steps, 0);
    let sum: f64 = outcome.rewards.iter().sum();
    assert_eq!(outcome.total_reward, sum);

    let before = controller.agent().clone();
    let steps = before.trajectory().steps().to_vec();
    assert_eq!(steps.len(), 5);
    assert!(steps.iter().all(|step| step.greedy));

    let learning = before.config().clone();
    let mut partial = before.values().clone();
    let tail: Trajectory = steps[1..].iter().copied().collect();
    partial.backup(&tail, learning.step_size, learning.discount);

    let first = steps[0];
    let expected = partial.get(first.state)
        + learning.step_size
            * (first.reward + learning.discount * partial.get(steps[1].state)
                - partial.get(first.state));

    controller.agent_mut().backup();
    let actual = controller.agent().values().get(first.state);
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn greedy_agent_converges_to_the_bellman_fixed_point() {
    let learning = LearningConfig::default()
        .with_epsilon(0.0)
        .with_step_size(0.5)
        .with_discount(0.9);
    let config = RobotConfig::new(always_rewarding())
        .with_learning(learning)
        .with_max_steps(50);
    let mut controller = EpisodeController::new(&config);

    let result = controller
        .run_training(&TrainingConfig {
            episodes: 20,
            report_interval: 0,
            seed: Some(5),
        })
        .unwrap();

    // Search pays 1 and keeps the battery high: V = 1 / (1 - 0.9).
    let agent = controller.agent();
    assert!((agent.value(BatteryLevel::High) - 10.0).abs() < 1e-3);
    assert_eq!(agent.greedy_action(HIGH).unwrap(), Action::Search);
    assert!((agent.expected_value(HIGH, Action::Search) - 10.0).abs() < 1e-3);
    assert_eq!(agent.dynamics().attempts(HIGH, Action::Wait), 0);

    assert_eq!(result.total_episodes, 20);
    assert_eq!(result.dead_battery_events, 0);
    assert!(result.episode_rewards.iter().all(|&total| total == 50.0));
    // Never visited.
    assert_eq!(agent.value(BatteryLevel::Low), 0.5);
    assert_eq!(agent.value(BatteryLevel::Dead), 0.5);
}

#[test]
fn exploratory_steps_leave_values_untouched() {
    let learning = LearningConfig::default().with_epsilon(1.0);
    let config = RobotConfig::default()
        .with_learning(learning)
        .with_max_steps(30);
    let mut controller = EpisodeController::new(&config).with_seed(9);

    controller
        .run_training(&TrainingConfig {
            episodes: 10,
            report_interval: 0,
            seed: None,
        })
        .unwrap();

    let agent = controller.agent();
    for level in BatteryLevel::ALL {
        assert_eq!(agent.value(level), 0.5);
    }
    assert!(!agent.dynamics().is_empty());
}

#[test]
fn training_is_reproducible_with_a_seed() {
    let config = RobotConfig::default().with_max_steps(20);
    let training = TrainingConfig {
        episodes: 40,
        report_interval: 10,
        seed: Some(77),
    };

    let first = EpisodeController::new(&config)
        .run_training(&training)
        .unwrap();
    let second = EpisodeController::new(&config)
        .run_training(&training)
        .unwrap();

    assert_eq!(first.episode_rewards, second.episode_rewards);
    assert_eq!(first.final_values, second.final_values);
}

#[test]
fn shared_metrics_observer_sees_every_step() {
    let config = RobotConfig::default().with_max_steps(12);
    let metrics = Rc::new(RefCell::new(MetricsObserver::new()));
    let mut controller =
        EpisodeController::new(&config).with_observer(Box::new(Rc::clone(&metrics)));

    let result = controller
        .run_training(&TrainingConfig {
            episodes: 15,
            report_interval: 5,
            seed: Some(3),
        })
        .unwrap();

    let summary = metrics.borrow().summary();
    assert_eq!(summary.episodes, 15);
    assert_eq!(summary.total_steps, 15 * 12);
    assert_eq!(summary.dead_battery_events, result.dead_battery_events);
    assert!((summary.mean_reward - result.mean_reward).abs() < 1e-9);
    assert!((0.0..=1.0).contains(&summary.exploration_rate));
}
