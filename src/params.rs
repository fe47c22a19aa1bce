use serde::{Deserialize, Serialize};

use crate::DilemmaError;

/// Fixed rules of one simulation run.
///
/// Four payouts and four goodwill multipliers, one per [`Outcome`](crate::Outcome),
/// plus the clamp bounds applied after every goodwill update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub coordinate_param: f64,
    pub exploiter_param: f64,
    pub exploited_param: f64,
    pub defect_param: f64,
    pub coordinate_goodwill: f64,
    pub exploiter_goodwill: f64,
    pub exploited_goodwill: f64,
    pub defect_goodwill: f64,
    pub min_goodwill: f64,
    pub max_goodwill: f64,
}

impl Parameters {
    /// Checks the invariants sampling relies on.
    ///
    /// # Errors
    /// Returns an error if any value is non-finite, a multiplier is negative,
    /// a bound is outside [0, 1], or `min_goodwill > max_goodwill`.
    pub fn validate(&self) -> Result<(), DilemmaError> {
        let named = [
            ("coordinate_param", self.coordinate_param),
            ("exploiter_param", self.exploiter_param),
            ("exploited_param", self.exploited_param),
            ("defect_param", self.defect_param),
            ("coordinate_goodwill", self.coordinate_goodwill),
            ("exploiter_goodwill", self.exploiter_goodwill),
            ("exploited_goodwill", self.exploited_goodwill),
            ("defect_goodwill", self.defect_goodwill),
            ("min_goodwill", self.min_goodwill),
            ("max_goodwill", self.max_goodwill),
        ];
        if let Some((name, value)) = named.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DilemmaError::InvalidParameter(format!(
                "{name} must be finite, got {value}"
            )));
        }
        if let Some((name, value)) = named[4..8].iter().find(|(_, v)| *v < 0.0) {
            return Err(DilemmaError::InvalidParameter(format!(
                "{name} must be non-negative, got {value}"
            )));
        }
        for (name, value) in &named[8..] {
            if !(0.0..=1.0).contains(value) {
                return Err(DilemmaError::InvalidParameter(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.min_goodwill > self.max_goodwill {
            return Err(DilemmaError::InvalidParameter(format!(
                "min_goodwill {} exceeds max_goodwill {}",
                self.min_goodwill, self.max_goodwill
            )));
        }
        Ok(())
    }
}

/// Finite ordered set of values a swept parameter takes.
///
/// Deserializes from a bare number or an array of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SweepRepr", into = "Vec<f64>")]
pub struct Sweep(Vec<f64>);

#[derive(Deserialize)]
#[serde(untagged)]
enum SweepRepr {
    Single(f64),
    Many(Vec<f64>),
}

impl From<SweepRepr> for Sweep {
    fn from(repr: SweepRepr) -> Self {
        match repr {
            SweepRepr::Single(value) => Sweep(vec![value]),
            SweepRepr::Many(values) => Sweep(values),
        }
    }
}

impl From<Sweep> for Vec<f64> {
    fn from(sweep: Sweep) -> Self {
        sweep.0
    }
}

impl Sweep {
    pub fn new(values: Vec<f64>) -> Self {
        Sweep(values)
    }

    pub fn single(value: f64) -> Self {
        Sweep(vec![value])
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

/// Payouts and bounds with a set of candidate values per goodwill multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpace {
    pub coordinate_param: f64,
    pub exploiter_param: f64,
    pub exploited_param: f64,
    pub defect_param: f64,
    pub coordinate_goodwill: Sweep,
    pub exploiter_goodwill: Sweep,
    pub exploited_goodwill: Sweep,
    pub defect_goodwill: Sweep,
    pub max_goodwill: f64,
    pub min_goodwill: f64,
}

impl ParameterSpace {
    /// Values used by the stock experiments.
    pub fn stock() -> Self {
        Self {
            coordinate_param: 10.0,
            exploiter_param: 15.0,
            exploited_param: 0.0,
            defect_param: 2.0,
            coordinate_goodwill: Sweep::new(vec![1.2, 2.0]),
            exploiter_goodwill: Sweep::single(1.0),
            exploited_goodwill: Sweep::new(vec![0.4, 0.8]),
            defect_goodwill: Sweep::new(vec![0.8, 1.2]),
            max_goodwill: 0.95,
            min_goodwill: 0.05,
        }
    }

    /// Expands the cross product of all swept values into validated configurations.
    ///
    /// Order is nested with `coordinate_goodwill` outermost and `defect_goodwill`
    /// innermost; a configuration's index is its parameter-set id.
    ///
    /// # Errors
    /// Returns an error if a sweep is empty or any combination fails validation.
    pub fn expand(&self) -> Result<Vec<Parameters>, DilemmaError> {
        let sweeps = [
            ("coordinate_goodwill", &self.coordinate_goodwill),
            ("exploiter_goodwill", &self.exploiter_goodwill),
            ("exploited_goodwill", &self.exploited_goodwill),
            ("defect_goodwill", &self.defect_goodwill),
        ];
        if let Some((name, _)) = sweeps.iter().find(|(_, s)| s.values().is_empty()) {
            return Err(DilemmaError::InvalidParameter(format!(
                "{name} sweep has no values"
            )));
        }

        let mut configs = Vec::new();
        for &coordinate in self.coordinate_goodwill.values() {
            for &exploiter in self.exploiter_goodwill.values() {
                for &exploited in self.exploited_goodwill.values() {
                    for &defect in self.defect_goodwill.values() {
                        let params = Parameters {
                            coordinate_param: self.coordinate_param,
                            exploiter_param: self.exploiter_param,
                            exploited_param: self.exploited_param,
                            defect_param: self.defect_param,
                            coordinate_goodwill: coordinate,
                            exploiter_goodwill: exploiter,
                            exploited_goodwill: exploited,
                            defect_goodwill: defect,
                            min_goodwill: self.min_goodwill,
                            max_goodwill: self.max_goodwill,
                        };
                        params.validate()?;
                        configs.push(params);
                    }
                }
            }
        }
        Ok(configs)
    }
}
