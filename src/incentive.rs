use crate::{ChoiceMatrix, DilemmaError, Outcome, Parameters};

/// Trait for the rules that turn an interaction outcome into rewards and goodwill changes.
///
/// Implementors assign a payout and a goodwill multiplier to each [`Outcome`]
/// and bound the goodwill that results.
pub trait IncentiveMechanism {
    /// Payout to the agent who experienced `outcome`.
    fn payout(&self, outcome: Outcome) -> f64;

    /// Factor applied to that agent's goodwill toward its counterparty.
    fn goodwill_multiplier(&self, outcome: Outcome) -> f64;

    /// Inclusive `(min, max)` bounds for goodwill after an update.
    fn goodwill_bounds(&self) -> (f64, f64);

    /// Checks that the rules can drive a run: bounds ordered and within [0, 1].
    fn validate(&self) -> Result<(), DilemmaError>;

    /// Next goodwill: \( \text{clamp}(g \cdot m_{outcome}, g_{min}, g_{max}) \).
    fn adjust_goodwill(&self, goodwill: f64, outcome: Outcome) -> f64 {
        let (min, max) = self.goodwill_bounds();
        (goodwill * self.goodwill_multiplier(outcome)).max(min).min(max)
    }
}

impl IncentiveMechanism for Parameters {
    fn payout(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Coordinate => self.coordinate_param,
            Outcome::Exploiter => self.exploiter_param,
            Outcome::Exploited => self.exploited_param,
            Outcome::Defect => self.defect_param,
        }
    }

    fn goodwill_multiplier(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Coordinate => self.coordinate_goodwill,
            Outcome::Exploiter => self.exploiter_goodwill,
            Outcome::Exploited => self.exploited_goodwill,
            Outcome::Defect => self.defect_goodwill,
        }
    }

    fn goodwill_bounds(&self) -> (f64, f64) {
        (self.min_goodwill, self.max_goodwill)
    }

    fn validate(&self) -> Result<(), DilemmaError> {
        Parameters::validate(self)
    }
}

/// Result of resolving one ordered pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub payout: f64,
    pub goodwill: f64,
}

/// Classifies the interaction between `agent` and `counterparty` from `agent`'s side.
///
/// # Errors
/// Returns [`DilemmaError::UnclassifiableOutcome`] if either choice is unresolved.
pub fn classify(
    agent: usize,
    counterparty: usize,
    choices: &ChoiceMatrix,
) -> Result<Outcome, DilemmaError> {
    match (choices.get(agent, counterparty), choices.get(counterparty, agent)) {
        (Some(mine), Some(theirs)) => Ok(Outcome::classify(*mine, *theirs)),
        _ => Err(DilemmaError::UnclassifiableOutcome {
            agent,
            counterparty,
        }),
    }
}

/// Payout `agent` earns from its interaction with `counterparty`.
pub fn resolve_payout<IM: IncentiveMechanism>(
    agent: usize,
    counterparty: usize,
    choices: &ChoiceMatrix,
    mechanism: &IM,
) -> Result<f64, DilemmaError> {
    Ok(mechanism.payout(classify(agent, counterparty, choices)?))
}

/// Updated goodwill of `agent` toward `counterparty`, given its previous value.
pub fn resolve_goodwill<IM: IncentiveMechanism>(
    agent: usize,
    counterparty: usize,
    choices: &ChoiceMatrix,
    goodwill: f64,
    mechanism: &IM,
) -> Result<f64, DilemmaError> {
    let outcome = classify(agent, counterparty, choices)?;
    Ok(mechanism.adjust_goodwill(goodwill, outcome))
}

/// Payout and updated goodwill for one ordered pair, classified once.
pub fn resolve<IM: IncentiveMechanism>(
    agent: usize,
    counterparty: usize,
    choices: &ChoiceMatrix,
    goodwill: f64,
    mechanism: &IM,
) -> Result<Resolution, DilemmaError> {
    let outcome = classify(agent, counterparty, choices)?;
    Ok(Resolution {
        outcome,
        payout: mechanism.payout(outcome),
        goodwill: mechanism.adjust_goodwill(goodwill, outcome),
    })
}
