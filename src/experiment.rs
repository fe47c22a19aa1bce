use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::choice::BernoulliChoices;
use crate::config::ExperimentConfig;
use crate::state_machine::{RunId, Trajectory};
use crate::{DilemmaError, Parameters, SimulationState, StepRecord};

/// Recorded trajectory of one (parameter set, Monte Carlo run) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub param_set: usize,
    pub run: usize,
    pub parameters: Parameters,
    pub records: Vec<StepRecord>,
}

impl RunResult {
    /// Last recorded state of the trajectory.
    pub fn final_state(&self) -> Option<&SimulationState> {
        self.records.last().map(|r| &r.state)
    }
}

/// A full experiment: every expanded parameter set, each run `runs` times.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
    parameter_sets: Vec<Parameters>,
}

impl Experiment {
    /// Validates the configuration and expands its parameter sweep.
    ///
    /// # Errors
    /// Returns an error if the configuration or any parameter combination is invalid.
    pub fn new(config: ExperimentConfig) -> Result<Self, DilemmaError> {
        config.validate()?;
        let parameter_sets = config.parameters.expand()?;
        Ok(Self {
            config,
            parameter_sets,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Expanded configurations; the index is the parameter-set id.
    pub fn parameter_sets(&self) -> &[Parameters] {
        &self.parameter_sets
    }

    /// Seed for one unit of work, derived from the base seed and its identity.
    pub fn seed_for(&self, id: RunId) -> u64 {
        run_seed(self.config.experiment.seed, id)
    }

    /// Runs a single trajectory on the current thread.
    ///
    /// # Errors
    /// Returns an error if `param_set` is out of range or the trajectory fails.
    pub fn run_one(&self, param_set: usize, run: usize) -> Result<RunResult, DilemmaError> {
        let parameters = *self.parameter_sets.get(param_set).ok_or_else(|| {
            DilemmaError::Config(format!(
                "parameter set {param_set} does not exist ({} available)",
                self.parameter_sets.len()
            ))
        })?;
        let settings = &self.config.experiment;
        execute(
            RunId { param_set, run },
            parameters,
            settings.agents,
            settings.initial_goodwill,
            settings.timesteps,
            settings.record_interval,
            self.seed_for(RunId { param_set, run }),
        )
    }

    /// Runs every (parameter set × run) pair concurrently on blocking tasks.
    ///
    /// Results are ordered by parameter set, then run, independent of completion order.
    pub async fn run(&self) -> Result<Vec<RunResult>, DilemmaError> {
        let settings = self.config.experiment.clone();
        info!(
            name = %settings.name,
            parameter_sets = self.parameter_sets.len(),
            runs = settings.runs,
            timesteps = settings.timesteps,
            agents = settings.agents,
            "starting experiment"
        );

        let mut handles: Vec<tokio::task::JoinHandle<Result<RunResult, DilemmaError>>> =
            Vec::new();
        for (param_set, &parameters) in self.parameter_sets.iter().enumerate() {
            for run in 0..settings.runs {
                let id = RunId { param_set, run };
                let seed = self.seed_for(id);
                let (agents, initial_goodwill, timesteps, record_interval) = (
                    settings.agents,
                    settings.initial_goodwill,
                    settings.timesteps,
                    settings.record_interval,
                );
                handles.push(tokio::task::spawn_blocking(move || {
                    execute(
                        id,
                        parameters,
                        agents,
                        initial_goodwill,
                        timesteps,
                        record_interval,
                        seed,
                    )
                }));
            }
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await??); // Propagate JoinError as DilemmaError
        }
        results.sort_by_key(|r| (r.param_set, r.run));

        info!(name = %settings.name, trajectories = results.len(), "experiment complete");
        Ok(results)
    }
}

fn run_seed(base: u64, id: RunId) -> u64 {
    base ^ ((id.param_set as u64) << 32) ^ (id.run as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn execute(
    id: RunId,
    parameters: Parameters,
    agents: usize,
    initial_goodwill: f64,
    timesteps: usize,
    record_interval: usize,
    seed: u64,
) -> Result<RunResult, DilemmaError> {
    debug!(param_set = id.param_set, run = id.run, seed, "trajectory started");
    let genesis = SimulationState::genesis(agents, initial_goodwill)?;
    let generator = BernoulliChoices::new(SmallRng::seed_from_u64(seed));
    let history = Trajectory::new(id, parameters, generator, timesteps)?
        .with_record_interval(record_interval)
        .run(genesis)?;

    let records = history
        .into_iter()
        .map(|(timestep, state)| StepRecord {
            param_set: id.param_set,
            run: id.run,
            timestep,
            state,
        })
        .collect();
    debug!(param_set = id.param_set, run = id.run, "trajectory finished");
    Ok(RunResult {
        param_set: id.param_set,
        run: id.run,
        parameters,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ExperimentConfig {
        let mut config = ExperimentConfig::base_simulation();
        config.experiment.agents = 4;
        config.experiment.timesteps = 20;
        config.experiment.runs = 2;
        config
    }

    #[tokio::test]
    async fn test_run_covers_every_pair_in_order() {
        let experiment = Experiment::new(small_config()).unwrap();
        let results = experiment.run().await.unwrap();
        assert_eq!(results.len(), 8 * 2);
        for (k, result) in results.iter().enumerate() {
            assert_eq!(result.param_set, k / 2);
            assert_eq!(result.run, k % 2);
            assert_eq!(result.parameters, experiment.parameter_sets()[k / 2]);
            assert_eq!(result.records.len(), 21);
        }
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let experiment = Experiment::new(small_config()).unwrap();
        let results = experiment.run().await.unwrap();
        let single = experiment.run_one(5, 1).unwrap();
        assert_eq!(results[5 * 2 + 1], single);
    }

    #[test]
    fn test_run_one_rejects_unknown_set() {
        let experiment = Experiment::new(small_config()).unwrap();
        assert!(matches!(
            experiment.run_one(99, 0),
            Err(DilemmaError::Config(_))
        ));
    }

    #[test]
    fn test_seeds_are_distinct() {
        let experiment = Experiment::new(small_config()).unwrap();
        let mut seeds: Vec<u64> = (0..8)
            .flat_map(|param_set| (0..4).map(move |run| RunId { param_set, run }))
            .map(|id| experiment.seed_for(id))
            .collect();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 32);
    }
}
