//! Determinism verification tests
//!
//! Same seed must give identical trajectories; different seeds must not.

use dilemma::{
    BernoulliChoices, ChoiceGenerator, Experiment, ExperimentConfig, Matrix, RunId,
    SimulationState, Trajectory,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn config(seed: u64) -> ExperimentConfig {
    let mut config = ExperimentConfig::base_simulation();
    config.experiment.agents = 6;
    config.experiment.timesteps = 40;
    config.experiment.runs = 2;
    config.experiment.seed = seed;
    config
}

#[test]
fn test_generator_determinism() {
    let goodwill = Matrix::filled(8, 0.5);
    let mut a = BernoulliChoices::new(SmallRng::seed_from_u64(42));
    let mut b = BernoulliChoices::new(SmallRng::seed_from_u64(42));
    for _ in 0..10 {
        assert_eq!(a.generate(&goodwill).unwrap(), b.generate(&goodwill).unwrap());
    }
}

#[test]
fn test_trajectory_determinism() {
    let params = config(0).parameters.expand().unwrap()[3];
    let run = |seed| {
        Trajectory::new(
            RunId::default(),
            params,
            BernoulliChoices::new(SmallRng::seed_from_u64(seed)),
            100,
        )
        .unwrap()
        .run(SimulationState::genesis(6, 0.8).unwrap())
        .unwrap()
    };
    assert_eq!(run(7), run(7));
    assert_ne!(run(7), run(8));
}

#[tokio::test]
async fn test_experiment_determinism() {
    let first = Experiment::new(config(42)).unwrap().run().await.unwrap();
    let second = Experiment::new(config(42)).unwrap().run().await.unwrap();
    assert_eq!(first, second, "same seed should reproduce every trajectory");

    let other = Experiment::new(config(43)).unwrap().run().await.unwrap();
    assert_ne!(first, other, "different seeds should diverge");
}
