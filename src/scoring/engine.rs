use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::catalog::parse_catalog;
use super::config::ScoringConfig;
use super::element::{Calculation, CalculationElement};
use super::error::{EvaluationError, ParseError};
use super::tree::parse_score_calculation;

/// Observed values keyed by element name.
pub type Inputs = HashMap<String, f64>;

/// A compiled scoring configuration: the summed formula tree plus the
/// catalog it was resolved against. Immutable once built, so one instance
/// can score any number of subjects concurrently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCalculation {
    pub root: Calculation,
    pub catalog: Vec<CalculationElement>,
}

impl ScoreCalculation {
    pub fn compile(config: &ScoringConfig) -> Result<Self, ParseError> {
        let catalog = parse_catalog(&config.elements)?;
        let root = parse_score_calculation(&config.expression, &catalog)?;
        Ok(Self { root, catalog })
    }

    pub fn evaluate(&self, inputs: &Inputs) -> Result<f64, EvaluationError> {
        evaluate(&self.root, inputs)
    }

    /// Catalog entries the formula actually uses, in catalog order.
    pub fn referenced_elements(&self) -> Vec<&CalculationElement> {
        let mut names = HashSet::new();
        for child in &self.root.children {
            child.for_each_lookup(&mut |lookup| {
                names.insert(lookup.name());
            });
        }
        self.catalog
            .iter()
            .filter(|element| names.contains(element.name()))
            .collect()
    }
}

/// Evaluate a calculation node: children are evaluated first, then folded
/// left to right with the node's operator.
pub fn evaluate(calculation: &Calculation, inputs: &Inputs) -> Result<f64, EvaluationError> {
    let mut children = calculation.children.iter();
    let first = children
        .next()
        .ok_or_else(|| EvaluationError::EmptyCalculation {
            operation: calculation.name.clone(),
        })?;

    let mut result = calculate_element(first, inputs)?;
    for child in children {
        result = calculation
            .operation
            .apply(result, calculate_element(child, inputs)?);
    }
    Ok(result)
}

pub fn calculate_element(
    element: &CalculationElement,
    inputs: &Inputs,
) -> Result<f64, EvaluationError> {
    match element {
        CalculationElement::Constant { value, .. } => Ok(*value),
        CalculationElement::LookupInterval(lookup) => {
            let input = fetch_input(&lookup.name, inputs)?;
            Ok(lookup
                .ranges
                .iter()
                .find(|range| range.contains(input))
                .map_or(lookup.out_of_range_score, |range| range.score))
        }
        CalculationElement::LookupNumber(lookup) => {
            let input = fetch_input(&lookup.name, inputs)?;
            // NaN passes through; f64::max would replace it with the bound
            Ok(match (lookup.range.min, lookup.range.max) {
                (Some(min), Some(max)) if !input.is_nan() => input.max(min).min(max),
                _ => input,
            })
        }
        CalculationElement::Calculation(calculation) => evaluate(calculation, inputs),
    }
}

fn fetch_input(name: &str, inputs: &Inputs) -> Result<f64, EvaluationError> {
    inputs
        .get(name)
        .copied()
        .ok_or_else(|| EvaluationError::MissingInput(name.to_string()))
}

/// Lowest and highest value an element can produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn of(element: &CalculationElement) -> Self {
        match element {
            CalculationElement::Constant { value, .. } => Self {
                min: *value,
                max: *value,
            },
            CalculationElement::LookupInterval(lookup) => {
                let scores = lookup
                    .ranges
                    .iter()
                    .map(|range| range.score)
                    .chain(std::iter::once(lookup.out_of_range_score));
                let (min, max) = scores.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                    (lo.min(s), hi.max(s))
                });
                Self { min, max }
            }
            CalculationElement::LookupNumber(lookup) => Self {
                min: lookup.range.min.unwrap_or(f64::NEG_INFINITY),
                max: lookup.range.max.unwrap_or(f64::INFINITY),
            },
            CalculationElement::Calculation(_) => Self {
                min: f64::NEG_INFINITY,
                max: f64::INFINITY,
            },
        }
    }
}

/// One factor's share of a score, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub name: String,
    pub range: ScoreRange,
    pub value: f64,    // Raw observed input
    pub weighted: f64, // Element output for that input
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: f64,
    pub breakdown: Vec<FactorContribution>,
}

pub fn calculate_score(
    calculation: &ScoreCalculation,
    inputs: &Inputs,
) -> Result<ScoreResult, EvaluationError> {
    let score = calculation.evaluate(inputs)?;

    let breakdown = calculation
        .referenced_elements()
        .into_iter()
        .map(|element| -> Result<FactorContribution, EvaluationError> {
            Ok(FactorContribution {
                name: element.name().to_string(),
                range: ScoreRange::of(element),
                value: fetch_input(element.name(), inputs)?,
                weighted: calculate_element(element, inputs)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScoreResult { score, breakdown })
}
