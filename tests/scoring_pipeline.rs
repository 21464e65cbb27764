use cred_score::config::InputsFile;
use cred_score::scoring::{
    calculate_score, validate_scoring, CalculationElement, EvaluationError, Inputs, ParseError,
    ScoreCalculation, ScoringConfig,
};

const CONFIG: &str = r#"
expression:
  - "1000 * [Account Age] * [Transactions]"
  - "[Balance] / 4"
elements:
  Account Age:
    Interval: ["< 5: 0.1", "< 90: 0.5", "/> 90: 1"]
  Transactions:
    Interval: ["< 10: 0.2", "/> 10: 1"]
  Balance:
    Range: [-400, 400]
"#;

const SUBJECTS: &str = r#"
- subject: veteran
  inputs:
    Account Age: 365
    Transactions: 250
    Balance: 1000
- subject: newcomer
  inputs:
    Account Age: 2
    Transactions: 3
    Balance: -20
"#;

fn compile(yaml: &str) -> ScoreCalculation {
    let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
    assert!(validate_scoring(&config).is_ok());
    ScoreCalculation::compile(&config).unwrap()
}

fn subjects() -> Vec<cred_score::config::Subject> {
    let file: InputsFile = serde_saphyr::from_str(SUBJECTS).unwrap();
    file.into_subjects()
}

#[test]
fn test_scores_subjects_from_yaml() {
    let calculation = compile(CONFIG);
    let subjects = subjects();

    // 1000 * 1 * 1 + 400 / 4
    let veteran = calculation.evaluate(&subjects[0].inputs).unwrap();
    assert!((veteran - 1100.0).abs() < 1e-9);

    // 1000 * 0.1 * 0.2 + -20 / 4
    let newcomer = calculation.evaluate(&subjects[1].inputs).unwrap();
    assert!((newcomer - 15.0).abs() < 1e-9);
}

#[test]
fn test_interval_edges_through_config() {
    let calculation = compile(
        r#"
expression: ["[Age]"]
elements:
  Age:
    Interval: ["< 5: 1", "< 90: 2", "/> 90: 3"]
"#,
    );
    for (age, expected) in [(4.999, 1.0), (5.0, 2.0), (89.999, 2.0), (90.0, 3.0)] {
        let inputs: Inputs = [("Age".to_string(), age)].into_iter().collect();
        assert_eq!(calculation.evaluate(&inputs), Ok(expected));
    }
}

#[test]
fn test_breakdown_pairs_inputs_with_outputs() {
    let calculation = compile(CONFIG);
    let result = calculate_score(&calculation, &subjects()[0].inputs).unwrap();

    let balance = result
        .breakdown
        .iter()
        .find(|f| f.name == "Balance")
        .unwrap();
    assert_eq!(balance.value, 1000.0);
    assert_eq!(balance.weighted, 400.0);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["breakdown"].as_array().unwrap().len(), 3);
}

#[test]
fn test_compiled_tree_scores_in_parallel() {
    use rayon::prelude::*;

    let calculation = compile(CONFIG);
    let subjects = subjects();
    let scores: Vec<f64> = (0..64)
        .into_par_iter()
        .map(|i| calculation.evaluate(&subjects[i % 2].inputs).unwrap())
        .collect();
    assert!(scores.iter().step_by(2).all(|s| (s - 1100.0).abs() < 1e-9));
}

#[test]
fn test_missing_input_is_an_error() {
    let calculation = compile(CONFIG);
    let mut inputs = subjects()[0].inputs.clone();
    inputs.remove("Transactions");
    assert_eq!(
        calculation.evaluate(&inputs),
        Err(EvaluationError::MissingInput("Transactions".to_string()))
    );
}

#[test]
fn test_invalid_token_produces_no_tree() {
    let config: ScoringConfig = serde_saphyr::from_str("expression: [\"2 * abc\"]\n").unwrap();
    assert_eq!(
        ScoreCalculation::compile(&config),
        Err(ParseError::InvalidToken("abc".to_string()))
    );
    assert!(validate_scoring(&config).is_err());
}

#[test]
fn test_catalog_keeps_every_element() {
    let calculation = compile(CONFIG);
    let names: Vec<&str> = calculation.catalog.iter().map(CalculationElement::name).collect();
    assert_eq!(names, vec!["Account Age", "Balance", "Transactions"]);
}

#[test]
fn test_ranking_survives_nan_scores() {
    use cred_score::output::{rank_subjects, RankedSubject};

    let calculation = compile(
        r#"
expression: ["[A] / [B]"]
elements:
  A:
    Range: [0, 100]
  B:
    Range: [0, 100]
"#,
    );

    let names: Vec<String> = (0..60).map(|i| format!("s{:02}", i)).collect();
    let scores: Vec<f64> = (0..60)
        .map(|i| {
            let value = if i % 7 == 0 { 0.0 } else { i as f64 };
            let inputs: Inputs = [("A".to_string(), value), ("B".to_string(), value)]
                .into_iter()
                .collect();
            calculation.evaluate(&inputs).unwrap()
        })
        .collect();

    let mut ranked: Vec<RankedSubject> = names
        .iter()
        .zip(&scores)
        .map(|(name, score)| RankedSubject {
            subject: name,
            score: *score,
        })
        .collect();
    rank_subjects(&mut ranked);

    assert!(ranked[..51].iter().all(|r| r.score == 1.0));
    assert!(ranked[51..].iter().all(|r| r.score.is_nan()));
    assert_eq!(ranked[0].subject, "s01");
}

#[test]
fn test_misshapen_element_fails_compile_with_name() {
    let config: ScoringConfig = serde_saphyr::from_str(
        r#"
expression: ["[Score]"]
elements:
  Score:
    Interval: "< 5: 1"
"#,
    )
    .unwrap();
    assert_eq!(
        ScoreCalculation::compile(&config),
        Err(ParseError::InvalidIntervalConfig("Score".to_string()))
    );
}
