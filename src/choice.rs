use std::collections::VecDeque;

use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;

use crate::{Choice, ChoiceMatrix, DilemmaError, GoodwillMatrix, Matrix};

/// Source of each step's decisions.
///
/// Implementors turn the current goodwill into a fully resolved choice matrix
/// of the same size. Diagonal entries are produced but never read.
pub trait ChoiceGenerator {
    fn generate(&mut self, goodwill: &GoodwillMatrix) -> Result<ChoiceMatrix, DilemmaError>;
}

/// Draws every entry independently: cooperate with probability equal to its goodwill.
#[derive(Debug, Clone)]
pub struct BernoulliChoices<R: Rng> {
    rng: R,
}

impl<R: Rng> BernoulliChoices<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ChoiceGenerator for BernoulliChoices<R> {
    fn generate(&mut self, goodwill: &GoodwillMatrix) -> Result<ChoiceMatrix, DilemmaError> {
        let size = goodwill.size();
        let mut choices = Matrix::filled(size, None);
        for i in 0..size {
            for (j, &p) in goodwill.row(i).iter().enumerate() {
                let trial = Bernoulli::new(p).map_err(|_| {
                    DilemmaError::InvalidParameter(format!(
                        "goodwill[{i}][{j}] = {p} is not a probability"
                    ))
                })?;
                choices.set(i, j, Some(Choice::from(trial.sample(&mut self.rng))));
            }
        }
        Ok(choices)
    }
}

/// Replays a fixed sequence of choice matrices, one per step.
///
/// Useful for reproducing a recorded trajectory or forcing specific draws.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChoices {
    script: VecDeque<ChoiceMatrix>,
}

impl ScriptedChoices {
    pub fn new(script: impl IntoIterator<Item = ChoiceMatrix>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Builds a script from matrices of `1` (cooperate) and `0` (defect).
    pub fn from_digits(steps: Vec<Vec<Vec<u8>>>) -> Result<Self, DilemmaError> {
        let mut script = VecDeque::with_capacity(steps.len());
        for rows in steps {
            let rows = rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|d| Choice::try_from(d).map(Some))
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(DilemmaError::InvalidParameter)?;
            script.push_back(Matrix::from_rows(rows)?);
        }
        Ok(Self { script })
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ChoiceGenerator for ScriptedChoices {
    fn generate(&mut self, goodwill: &GoodwillMatrix) -> Result<ChoiceMatrix, DilemmaError> {
        let next = self
            .script
            .pop_front()
            .ok_or_else(|| DilemmaError::Config("scripted choices exhausted".into()))?;
        if next.size() != goodwill.size() {
            return Err(DilemmaError::ShapeMismatch {
                what: "scripted choice matrix",
                expected: goodwill.size(),
                found: next.size(),
            });
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_frequency_tracks_goodwill() {
        let mut generator = BernoulliChoices::new(SmallRng::seed_from_u64(7));
        for &p in &[0.05, 0.3, 0.8, 0.95] {
            let goodwill = Matrix::filled(100, p);
            let choices = generator.generate(&goodwill).unwrap();
            let cooperations = (0..100)
                .flat_map(|i| choices.row(i).iter())
                .filter(|c| **c == Some(Choice::Cooperate))
                .count();
            let freq = cooperations as f64 / 10_000.0;
            // 5 standard errors of a 10k-sample proportion is at most 0.025
            assert!((freq - p).abs() < 0.025, "p = {p}, observed {freq}");
        }
    }

    #[test]
    fn test_extreme_goodwill_is_deterministic() {
        let mut generator = BernoulliChoices::new(SmallRng::seed_from_u64(1));
        let always = generator.generate(&Matrix::filled(5, 1.0)).unwrap();
        assert!(always.off_diagonal().all(|(_, _, c)| *c == Some(Choice::Cooperate)));
        let never = generator.generate(&Matrix::filled(5, 0.0)).unwrap();
        assert!(never.off_diagonal().all(|(_, _, c)| *c == Some(Choice::Defect)));
    }

    #[test]
    fn test_rejects_out_of_range_goodwill() {
        let mut generator = BernoulliChoices::new(SmallRng::seed_from_u64(1));
        let err = generator.generate(&Matrix::filled(2, 1.5)).unwrap_err();
        assert!(matches!(err, DilemmaError::InvalidParameter(_)));
    }

    #[test]
    fn test_script_replays_then_exhausts() {
        let mut script = ScriptedChoices::from_digits(vec![vec![vec![1, 1], vec![0, 0]]]).unwrap();
        let goodwill = Matrix::filled(2, 0.5);
        let choices = script.generate(&goodwill).unwrap();
        assert_eq!(*choices.get(0, 1), Some(Choice::Cooperate));
        assert_eq!(*choices.get(1, 0), Some(Choice::Defect));
        assert_eq!(script.remaining(), 0);
        assert!(script.generate(&goodwill).is_err());
    }

    #[test]
    fn test_script_checks_size() {
        let mut script = ScriptedChoices::from_digits(vec![vec![vec![1]]]).unwrap();
        assert!(matches!(
            script.generate(&Matrix::filled(2, 0.5)),
            Err(DilemmaError::ShapeMismatch { .. })
        ));
    }
}
