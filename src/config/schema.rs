use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::scoring::Inputs;

/// Observations file: either one mapping of inputs, or a list of subjects.
///
/// ```yaml
/// - subject: alice
///   inputs: { Account Age: 400, Transactions: 12 }
/// - subject: bob
///   inputs: { Account Age: 3, Transactions: 150 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum InputsFile {
    Subjects(Vec<Subject>),
    Single(HashMap<String, f64>),
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Subject {
    pub subject: String,
    pub inputs: Inputs,
}

impl InputsFile {
    /// Flatten into subjects. A single mapping becomes one subject named "input".
    pub fn into_subjects(self) -> Vec<Subject> {
        match self {
            InputsFile::Subjects(subjects) => subjects,
            InputsFile::Single(inputs) => vec![Subject {
                subject: "input".to_string(),
                inputs,
            }],
        }
    }
}
