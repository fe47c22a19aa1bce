//! End-to-end scenarios for a single step and for sweeps.

use dilemma::{
    Choice, Experiment, ExperimentConfig, Matrix, ParameterSpace, Parameters, RunId,
    ScriptedChoices, SimulationState, Sweep, Trajectory,
};

fn scenario_params() -> Parameters {
    Parameters {
        coordinate_param: 10.0,
        exploiter_param: 15.0,
        exploited_param: 0.0,
        defect_param: 2.0,
        coordinate_goodwill: 1.2,
        exploiter_goodwill: 1.0,
        exploited_goodwill: 0.4,
        defect_goodwill: 0.8,
        min_goodwill: 0.05,
        max_goodwill: 0.95,
    }
}

/// Two agents, agent 0 cooperates and agent 1 defects.
#[test]
fn test_exploitation_single_step() {
    let script = ScriptedChoices::from_digits(vec![vec![vec![0, 1], vec![0, 0]]]).unwrap();
    let history = Trajectory::new(RunId::default(), scenario_params(), script, 1)
        .unwrap()
        .run(SimulationState::genesis(2, 0.8).unwrap())
        .unwrap();

    assert_eq!(history.len(), 2);
    let (timestep, state) = &history[1];
    assert_eq!(*timestep, 1);
    assert_eq!(state.rewards[0], 0.0, "agent 0 was exploited");
    assert_eq!(state.rewards[1], 15.0, "agent 1 exploited");
    assert!((state.goodwill.get(0, 1) - 0.32).abs() < 1e-12);
    assert!((state.goodwill.get(1, 0) - 0.8).abs() < 1e-12);
    assert_eq!(*state.choices.get(0, 1), Some(Choice::Cooperate));
    assert_eq!(*state.choices.get(1, 0), Some(Choice::Defect));
}

/// Goodwill already at the upper bound stays there under mutual cooperation.
#[test]
fn test_max_goodwill_does_not_overshoot() {
    let mut params = scenario_params();
    params.coordinate_goodwill = 2.0;
    let script = ScriptedChoices::new(vec![Matrix::filled(3, Some(Choice::Cooperate)); 3]);
    let history = Trajectory::new(RunId::default(), params, script, 3)
        .unwrap()
        .run(SimulationState::genesis(3, 0.95).unwrap())
        .unwrap();

    for (_, state) in &history[1..] {
        assert!(state.goodwill.off_diagonal().all(|(_, _, g)| *g == 0.95));
    }
    assert_eq!(history[3].1.rewards, vec![60.0, 60.0, 60.0]);
}

/// Mutual defection keeps shrinking goodwill until the lower bound holds it.
#[test]
fn test_min_goodwill_floor() {
    let script = ScriptedChoices::new(vec![Matrix::filled(2, Some(Choice::Defect)); 40]);
    let history = Trajectory::new(RunId::default(), scenario_params(), script, 40)
        .unwrap()
        .run(SimulationState::genesis(2, 0.8).unwrap())
        .unwrap();
    let last = &history.last().unwrap().1;
    assert_eq!(*last.goodwill.get(0, 1), 0.05);
    assert_eq!(*last.goodwill.get(1, 0), 0.05);
    assert_eq!(last.rewards, vec![80.0, 80.0]);
}

#[tokio::test]
async fn test_two_by_two_sweep_is_independent() {
    let mut parameters = ParameterSpace::stock();
    parameters.coordinate_goodwill = Sweep::single(1.2);
    parameters.exploited_goodwill = Sweep::new(vec![0.4, 0.8]);
    parameters.defect_goodwill = Sweep::new(vec![0.8, 1.2]);
    let mut config = ExperimentConfig::base_simulation();
    config.parameters = parameters;
    config.experiment.agents = 5;
    config.experiment.timesteps = 30;
    config.experiment.runs = 3;
    config.experiment.seed = 11;

    let experiment = Experiment::new(config).unwrap();
    assert_eq!(experiment.parameter_sets().len(), 4);
    let results = experiment.run().await.unwrap();
    assert_eq!(results.len(), 12);

    let mut genesis_seen = 0;
    for result in &results {
        let first = &result.records[0];
        assert_eq!(first.timestep, 0);
        assert_eq!(first.state, SimulationState::genesis(5, 0.8).unwrap());
        genesis_seen += 1;

        for record in &result.records {
            assert_eq!(record.param_set, result.param_set);
            assert_eq!(record.run, result.run);
            let p = &result.parameters;
            assert!(record
                .state
                .goodwill
                .off_diagonal()
                .all(|(_, _, g)| *g >= p.min_goodwill && *g <= p.max_goodwill));
        }

        // Rerunning one unit alone reproduces it exactly.
        assert_eq!(
            &experiment.run_one(result.param_set, result.run).unwrap(),
            result
        );
    }
    assert_eq!(genesis_seen, 12);

    let finals: Vec<_> = results.iter().filter_map(|r| r.final_state()).collect();
    assert_ne!(finals[0], finals[1], "runs draw from distinct random streams");
}
