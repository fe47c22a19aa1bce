use tracing::trace;

use crate::choice::ChoiceGenerator;
use crate::incentive::{resolve, IncentiveMechanism};
use crate::{ChoiceMatrix, DilemmaError, SimulationState};

/// Trait for state machines advanced by one step of externally generated input.
///
/// Implementors define how a state transitions given that step's input,
/// without retaining any history beyond the state itself.
pub trait StateMachine {
    /// Type of input consumed by one transition.
    type Input;

    /// Type of state carried between steps.
    type State;

    /// Produces the next state from the previous one and this step's input.
    fn transition(&self, state: &Self::State, input: Self::Input)
        -> Result<Self::State, DilemmaError>;
}

/// Repeated prisoner's dilemma transition over a whole population.
///
/// For every ordered pair \( (i, j), i \neq j \), adds the payout to reward \( i \) and
/// replaces \( g_{ij} \) with its adjusted value. The diagonal is carried over untouched.
#[derive(Debug, Clone)]
pub struct DilemmaStateMachine<IM: IncentiveMechanism> {
    mechanism: IM,
}

impl<IM: IncentiveMechanism> DilemmaStateMachine<IM> {
    /// Creates a state machine driven by `mechanism`.
    ///
    /// # Errors
    /// Returns an error if the mechanism's rules fail validation.
    pub fn new(mechanism: IM) -> Result<Self, DilemmaError> {
        mechanism.validate()?;
        Ok(Self { mechanism })
    }
}

impl<IM: IncentiveMechanism> StateMachine for DilemmaStateMachine<IM> {
    type Input = ChoiceMatrix;
    type State = SimulationState;

    fn transition(
        &self,
        state: &SimulationState,
        choices: ChoiceMatrix,
    ) -> Result<SimulationState, DilemmaError> {
        state.check_shape()?;
        let agents = state.agents();
        if choices.size() != agents {
            return Err(DilemmaError::ShapeMismatch {
                what: "choice matrix",
                expected: agents,
                found: choices.size(),
            });
        }

        let mut goodwill = state.goodwill.clone();
        let mut rewards = state.rewards.clone();
        for i in 0..agents {
            for j in (0..agents).filter(|&j| j != i) {
                let resolution =
                    resolve(i, j, &choices, *state.goodwill.get(i, j), &self.mechanism)?;
                rewards[i] += resolution.payout;
                goodwill.set(i, j, resolution.goodwill);
            }
        }

        SimulationState::new(goodwill, choices, rewards)
    }
}

/// Identity of one trajectory within an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RunId {
    pub param_set: usize,
    pub run: usize,
}

/// Drives a state machine from genesis for a fixed number of steps.
pub struct Trajectory<G: ChoiceGenerator, IM: IncentiveMechanism> {
    id: RunId,
    state_machine: DilemmaStateMachine<IM>,
    generator: G,
    timesteps: usize,
    record_interval: usize,
}

impl<G: ChoiceGenerator, IM: IncentiveMechanism> Trajectory<G, IM> {
    /// Creates a trajectory of `timesteps` steps recording every state.
    ///
    /// # Errors
    /// Returns an error if the mechanism's rules fail validation.
    pub fn new(
        id: RunId,
        mechanism: IM,
        generator: G,
        timesteps: usize,
    ) -> Result<Self, DilemmaError> {
        Ok(Self {
            id,
            state_machine: DilemmaStateMachine::new(mechanism)?,
            generator,
            timesteps,
            record_interval: 1,
        })
    }

    /// Keeps only every `interval`-th state (plus genesis and the final state).
    pub fn with_record_interval(mut self, interval: usize) -> Self {
        self.record_interval = interval.max(1);
        self
    }

    /// Advances `state` by one step: generate choices, then resolve outcomes.
    pub fn step(&mut self, state: &SimulationState) -> Result<SimulationState, DilemmaError> {
        let choices = self.generator.generate(&state.goodwill)?;
        self.state_machine.transition(state, choices)
    }

    /// Runs all steps from `genesis`, returning `(timestep, state)` pairs starting at 0.
    ///
    /// # Errors
    /// Any failure is wrapped in [`DilemmaError::Run`] with the step it occurred at.
    pub fn run(
        mut self,
        genesis: SimulationState,
    ) -> Result<Vec<(usize, SimulationState)>, DilemmaError> {
        let mut history = Vec::with_capacity(self.timesteps / self.record_interval + 2);
        let mut state = genesis;
        history.push((0, state.clone()));

        for step in 1..=self.timesteps {
            state = self.step(&state).map_err(|source| DilemmaError::Run {
                param_set: self.id.param_set,
                run: self.id.run,
                step,
                source: Box::new(source),
            })?;
            trace!(param_set = self.id.param_set, run = self.id.run, step, "step complete");
            if step % self.record_interval == 0 || step == self.timesteps {
                history.push((step, state.clone()));
            }
        }
        Ok(history)
    }
}
