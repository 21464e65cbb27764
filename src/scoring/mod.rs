pub mod catalog;
pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod tokenizer;
pub mod tree;
pub mod validation;

pub use config::*;
pub use element::{
    Calculation, CalculationElement, IntervalRange, LookupInterval, LookupNumber, NumberRange,
    Operation,
};
pub use engine::{
    calculate_element, calculate_score, evaluate, FactorContribution, Inputs, ScoreCalculation,
    ScoreRange, ScoreResult,
};
pub use error::{EvaluationError, ParseError};
pub use validation::{partition_warnings, validate_scoring};
