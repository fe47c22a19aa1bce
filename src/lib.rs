//! Dilemma: a Rust library simulating a repeated, pairwise prisoner's dilemma among a fixed
//! population of agents. Each directed pair carries a goodwill \( g_{ij} \in [0, 1] \), the
//! probability that agent \( i \) cooperates with agent \( j \). Every step, choices are drawn
//! from goodwill, payouts are accumulated from a 2x2 outcome matrix, and goodwill is scaled by
//! the multiplier of the outcome and clamped to configured bounds.
//!
//! # Features
//! - Bernoulli choice generation behind a swappable [`ChoiceGenerator`].
//! - Perspective-aware outcome resolution through an [`IncentiveMechanism`].
//! - An explicit two-phase [`StateMachine`] step driven by a [`Trajectory`].
//! - Monte Carlo runs and parameter sweeps executed concurrently with Tokio.
//!
//! # Example
//! ```
//! use dilemma::{Experiment, ExperimentConfig, DilemmaError};
//!
//! # async fn example() -> Result<(), DilemmaError> {
//! let mut config = ExperimentConfig::base_simulation();
//! config.experiment.timesteps = 50;
//! let experiment = Experiment::new(config)?;
//! let results = experiment.run().await?;
//! assert_eq!(results.len(), experiment.parameter_sets().len() * 3);
//! # Ok(())
//! # }
//! ```

pub mod choice;
pub mod config;
mod error;
pub mod experiment;
pub mod incentive;
mod params;
pub mod state_machine;
pub mod summary;
mod types;

pub use choice::{BernoulliChoices, ChoiceGenerator, ScriptedChoices};
pub use config::{ExperimentConfig, ExperimentSettings};
pub use error::DilemmaError;
pub use experiment::{Experiment, RunResult};
pub use incentive::{IncentiveMechanism, Resolution};
pub use params::{ParameterSpace, Parameters, Sweep};
pub use state_machine::{DilemmaStateMachine, RunId, StateMachine, Trajectory};
pub use summary::StateSummary;
pub use types::{
    Choice, ChoiceMatrix, GoodwillMatrix, Matrix, Outcome, RewardVector, SimulationState,
    StepRecord, MAX_AGENTS,
};
