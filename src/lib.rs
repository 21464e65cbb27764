//! Compile credibility scoring formulas into calculation trees and evaluate
//! them against observed inputs.
//!
//! ```
//! use cred_score::scoring::{calculate_score, Inputs, ScoreCalculation, ScoringConfig};
//!
//! let config: ScoringConfig = serde_saphyr::from_str(
//!     "expression: [\"1000 + [Followers]\"]\nelements:\n  Followers:\n    Range: [0, 100]\n",
//! )
//! .unwrap();
//! let calculation = ScoreCalculation::compile(&config).unwrap();
//!
//! let mut inputs = Inputs::new();
//! inputs.insert("Followers".to_string(), 50.0);
//! assert_eq!(calculate_score(&calculation, &inputs).unwrap().score, 1050.0);
//! ```

pub mod config;
pub mod output;
pub mod scoring;
