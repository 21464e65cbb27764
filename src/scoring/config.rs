use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main scoring configuration.
///
/// `expression` entries are summed. Each `[Name]` in a formula refers to an
/// entry of `elements`, which maps an observed input to a score.
///
/// Example YAML:
/// ```yaml
/// expression:
///   - "1000 * [Account Age] * [Transactions]"
/// elements:
///   Account Age:
///     Interval: ["< 5: 0.1", "< 90: 0.5", "/> 90: 1"]
///   Balance:
///     Range: [-400, 400]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Formula strings, summed into one score
    pub expression: Vec<String>,

    /// Named elements available to formulas as `[Name]`
    #[serde(default)]
    pub elements: BTreeMap<String, ElementSpec>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut elements = BTreeMap::new();
        elements.insert(
            "Account Age".to_string(),
            ElementSpec::Interval(vec![
                "< 30: 0.1".to_string(),
                "< 365: 0.5".to_string(),
                "/> 365: 1".to_string(),
            ]),
        );
        elements.insert(
            "Transactions".to_string(),
            ElementSpec::Interval(vec![
                "< 10: 0.2".to_string(),
                "< 100: 0.6".to_string(),
                "/> 100: 1".to_string(),
            ]),
        );
        elements.insert("Balance".to_string(), ElementSpec::Range(vec![-400.0, 400.0]));

        Self {
            expression: vec![
                "1000 * [Account Age] * [Transactions]".to_string(),
                "[Balance]".to_string(),
            ],
            elements,
        }
    }
}

/// Definition of one named element.
///
/// Bodies of the wrong shape (`Range: 5`, `Interval: "< 5: 1"`) still
/// deserialize, as [`ElementSpec::Malformed`], so the catalog parser can
/// report them against the element name.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(from = "RawElementSpec")]
pub enum ElementSpec {
    /// Interval rules, e.g. `["< 5: 0.1", "/> 5: 1"]`
    Interval(Vec<String>),

    /// `[min, max]` clamp bounds
    Range(Vec<f64>),

    /// A known element kind whose body is not a list of the expected type
    Malformed(ElementKind),
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum ElementKind {
    Interval,
    Range,
}

#[derive(Deserialize)]
enum RawElementSpec {
    Interval(serde_json::Value),
    Range(serde_json::Value),
}

impl From<RawElementSpec> for ElementSpec {
    fn from(raw: RawElementSpec) -> Self {
        match raw {
            RawElementSpec::Interval(body) => serde_json::from_value(body)
                .map_or(ElementSpec::Malformed(ElementKind::Interval), ElementSpec::Interval),
            RawElementSpec::Range(body) => serde_json::from_value(body)
                .map_or(ElementSpec::Malformed(ElementKind::Range), ElementSpec::Range),
        }
    }
}
