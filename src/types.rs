use serde::{Deserialize, Serialize};

use crate::DilemmaError;

/// Largest population a state may describe.
pub const MAX_AGENTS: usize = 4096;

/// A single decision in one prisoner's-dilemma interaction.
///
/// Serialized as `1` (cooperate) or `0` (defect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Choice {
    Defect,
    Cooperate,
}

impl Choice {
    /// Numeric form used by analysis tooling: cooperate = 1.0, defect = 0.0.
    pub fn as_f64(self) -> f64 {
        match self {
            Choice::Cooperate => 1.0,
            Choice::Defect => 0.0,
        }
    }
}

impl From<bool> for Choice {
    fn from(cooperate: bool) -> Self {
        if cooperate {
            Choice::Cooperate
        } else {
            Choice::Defect
        }
    }
}

impl From<Choice> for u8 {
    fn from(choice: Choice) -> u8 {
        match choice {
            Choice::Cooperate => 1,
            Choice::Defect => 0,
        }
    }
}

impl TryFrom<u8> for Choice {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Choice::Cooperate),
            0 => Ok(Choice::Defect),
            other => Err(format!("choice must be 0 or 1, got {other}")),
        }
    }
}

/// Joint outcome of an interaction, seen from the first agent's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Both cooperated.
    Coordinate,
    /// This agent defected against a cooperator.
    Exploiter,
    /// This agent cooperated and was defected against.
    Exploited,
    /// Both defected.
    Defect,
}

impl Outcome {
    /// Classifies `(mine, theirs)` from the perspective of the agent making `mine`.
    pub fn classify(mine: Choice, theirs: Choice) -> Self {
        match (mine, theirs) {
            (Choice::Cooperate, Choice::Cooperate) => Outcome::Coordinate,
            (Choice::Cooperate, Choice::Defect) => Outcome::Exploited,
            (Choice::Defect, Choice::Cooperate) => Outcome::Exploiter,
            (Choice::Defect, Choice::Defect) => Outcome::Defect,
        }
    }
}

/// Dense row-major square matrix indexed by `(agent, counterparty)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRepr<T>")]
pub struct Matrix<T> {
    size: usize,
    data: Vec<T>,
}

#[derive(Deserialize)]
struct MatrixRepr<T> {
    size: usize,
    data: Vec<T>,
}

impl<T> TryFrom<MatrixRepr<T>> for Matrix<T> {
    type Error = DilemmaError;

    fn try_from(repr: MatrixRepr<T>) -> Result<Self, Self::Error> {
        let expected = repr.size.checked_mul(repr.size).ok_or_else(|| {
            DilemmaError::InvalidParameter(format!("matrix size {} overflows", repr.size))
        })?;
        if repr.data.len() != expected {
            return Err(DilemmaError::ShapeMismatch {
                what: "matrix data",
                expected,
                found: repr.data.len(),
            });
        }
        Ok(Self {
            size: repr.size,
            data: repr.data,
        })
    }
}

impl<T: Clone> Matrix<T> {
    /// Creates a `size`×`size` matrix with every entry set to `value`.
    pub fn filled(size: usize, value: T) -> Self {
        Self {
            size,
            data: vec![value; size * size],
        }
    }

    /// Builds a matrix from rows, rejecting ragged or non-square input.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, DilemmaError> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for row in rows {
            if row.len() != size {
                return Err(DilemmaError::ShapeMismatch {
                    what: "matrix row",
                    expected: size,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self { size, data })
    }
}

impl<T> Matrix<T> {
    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.size + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.data[i * self.size + j] = value;
    }

    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    /// Iterates over off-diagonal entries as `(i, j, value)`.
    pub fn off_diagonal(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(k, v)| (k / self.size, k % self.size, v))
            .filter(|(i, j, _)| i != j)
    }
}

/// Entry `(i, j)` is agent i's propensity to cooperate with agent j.
pub type GoodwillMatrix = Matrix<f64>;

/// Entry `(i, j)` is agent i's choice against agent j; `None` before the first step.
pub type ChoiceMatrix = Matrix<Option<Choice>>;

/// Cumulative payout per agent.
pub type RewardVector = Vec<f64>;

/// Goodwill, choices and cumulative rewards at one timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StateRepr")]
pub struct SimulationState {
    pub goodwill: GoodwillMatrix,
    pub choices: ChoiceMatrix,
    pub rewards: RewardVector,
}

#[derive(Deserialize)]
struct StateRepr {
    goodwill: GoodwillMatrix,
    choices: ChoiceMatrix,
    rewards: RewardVector,
}

impl TryFrom<StateRepr> for SimulationState {
    type Error = DilemmaError;

    fn try_from(repr: StateRepr) -> Result<Self, Self::Error> {
        Self::new(repr.goodwill, repr.choices, repr.rewards)
    }
}

impl SimulationState {
    /// Assembles a state, checking that all parts describe the same population.
    pub fn new(
        goodwill: GoodwillMatrix,
        choices: ChoiceMatrix,
        rewards: RewardVector,
    ) -> Result<Self, DilemmaError> {
        let state = Self {
            goodwill,
            choices,
            rewards,
        };
        state.check_shape()?;
        Ok(state)
    }

    /// Verifies that goodwill, choices and rewards share one population size.
    pub fn check_shape(&self) -> Result<(), DilemmaError> {
        let agents = self.rewards.len();
        if agents == 0 || agents > MAX_AGENTS {
            return Err(DilemmaError::ShapeMismatch {
                what: "reward vector",
                expected: agents.clamp(1, MAX_AGENTS),
                found: agents,
            });
        }
        if self.goodwill.size() != agents {
            return Err(DilemmaError::ShapeMismatch {
                what: "goodwill matrix",
                expected: agents,
                found: self.goodwill.size(),
            });
        }
        if self.choices.size() != agents {
            return Err(DilemmaError::ShapeMismatch {
                what: "choice matrix",
                expected: agents,
                found: self.choices.size(),
            });
        }
        Ok(())
    }

    /// Standard starting state: uniform goodwill, no choices yet, zero rewards.
    ///
    /// # Errors
    /// Returns an error if `agents` is zero or above [`MAX_AGENTS`], or if
    /// `initial_goodwill` is not in [0, 1].
    pub fn genesis(agents: usize, initial_goodwill: f64) -> Result<Self, DilemmaError> {
        if agents == 0 || agents > MAX_AGENTS {
            return Err(DilemmaError::ShapeMismatch {
                what: "population",
                expected: agents.clamp(1, MAX_AGENTS),
                found: agents,
            });
        }
        if !(0.0..=1.0).contains(&initial_goodwill) {
            return Err(DilemmaError::InvalidParameter(format!(
                "initial goodwill must be in [0, 1], got {initial_goodwill}"
            )));
        }
        Self::new(
            Matrix::filled(agents, initial_goodwill),
            Matrix::filled(agents, None),
            vec![0.0; agents],
        )
    }

    pub fn agents(&self) -> usize {
        self.rewards.len()
    }
}

/// One recorded state of one trajectory, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub param_set: usize,
    pub run: usize,
    pub timestep: usize,
    pub state: SimulationState,
}
