use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::config::{ElementKind, ElementSpec};
use super::element::{CalculationElement, IntervalRange, LookupInterval, LookupNumber, NumberRange};
use super::error::ParseError;

/// Score returned by an interval lookup when no rule covers the input.
pub const OUT_OF_RANGE_SCORE: f64 = 0.0;

/// Parse every named element spec into a catalog entry, in name order.
pub fn parse_catalog(
    elements: &BTreeMap<String, ElementSpec>,
) -> Result<Vec<CalculationElement>, ParseError> {
    let catalog = elements
        .iter()
        .map(|(name, spec)| parse_element(name, spec))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(elements = catalog.len(), "parsed element catalog");
    Ok(catalog)
}

pub fn parse_element(name: &str, spec: &ElementSpec) -> Result<CalculationElement, ParseError> {
    if name.contains('[') || name.contains(']') {
        return Err(ParseError::InvalidElementName(name.to_string()));
    }

    match spec {
        ElementSpec::Range(bounds) => match bounds.as_slice() {
            [min, max] if min.is_finite() && max.is_finite() && min <= max => {
                Ok(CalculationElement::LookupNumber(LookupNumber {
                    name: name.to_string(),
                    range: NumberRange {
                        min: Some(*min),
                        max: Some(*max),
                    },
                }))
            }
            _ => Err(ParseError::InvalidRangeConfig(name.to_string())),
        },
        ElementSpec::Malformed(ElementKind::Range) => {
            Err(ParseError::InvalidRangeConfig(name.to_string()))
        }
        ElementSpec::Malformed(ElementKind::Interval) => {
            Err(ParseError::InvalidIntervalConfig(name.to_string()))
        }
        ElementSpec::Interval(rules) => {
            if rules.is_empty() {
                return Err(ParseError::InvalidIntervalConfig(name.to_string()));
            }
            let raw = rules
                .iter()
                .map(|rule| parse_rule(name, rule))
                .collect::<Result<Vec<_>, _>>()?;
            let ranges = resolve_overlaps(&raw);
            trace!(element = name, ?ranges, "resolved interval bounds");

            Ok(CalculationElement::LookupInterval(LookupInterval {
                name: name.to_string(),
                ranges,
                out_of_range_score: OUT_OF_RANGE_SCORE,
            }))
        }
    }
}

/// Parse one rule of the form `OPERATOR VALUE: SCORE`.
///
/// `<` bounds the range from above, `/>` bounds it from below. The other
/// side stays open until [`resolve_overlaps`] closes it.
fn parse_rule(name: &str, rule: &str) -> Result<IntervalRange, ParseError> {
    let invalid = || ParseError::InvalidIntervalConfig(name.to_string());

    let (condition, score) = rule.split_once(':').ok_or_else(invalid)?;
    let condition = condition.trim();
    let split_at = condition
        .find(|c: char| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '+' | '.'))
        .ok_or_else(invalid)?;
    let (operator, value) = condition.split_at(split_at);
    if operator.is_empty() {
        return Err(invalid());
    }
    if operator != "<" && operator != "/>" {
        return Err(ParseError::UnsupportedOperator(operator.to_string()));
    }

    let value = parse_finite(value).ok_or_else(invalid)?;
    let score = parse_finite(score).ok_or_else(invalid)?;

    if operator == "<" {
        Ok(IntervalRange {
            start: None,
            end: Some(value),
            score,
        })
    } else {
        Ok(IntervalRange {
            start: Some(value),
            end: None,
            score,
        })
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Close the open sides of interval ranges so they partition the line.
///
/// A range with only an upper bound starts at the largest upper bound below
/// it among the other upper-bound-only ranges; a range with only a lower
/// bound ends at the smallest lower bound above it among the other
/// lower-bound-only ranges. `["< 5", "< 90", "/> 90"]` resolves to
/// `(-inf, 5), [5, 90), [90, inf)`.
///
/// Ranges sharing an open side only with unrelated bounds are not checked
/// for gaps here; see `validation::partition_warnings`.
pub fn resolve_overlaps(raw: &[IntervalRange]) -> Vec<IntervalRange> {
    raw.iter()
        .enumerate()
        .map(|(i, range)| {
            let others = raw
                .iter()
                .enumerate()
                .filter(move |(j, _)| *j != i)
                .map(|(_, other)| other);
            let mut resolved = range.clone();

            match (range.start, range.end) {
                (None, Some(end)) => {
                    resolved.start = others
                        .filter_map(|other| match (other.start, other.end) {
                            (None, Some(other_end)) if other_end < end => Some(other_end),
                            _ => None,
                        })
                        .reduce(f64::max);
                }
                (Some(start), None) => {
                    resolved.end = others
                        .filter_map(|other| match (other.start, other.end) {
                            (Some(other_start), None) if other_start > start => Some(other_start),
                            _ => None,
                        })
                        .reduce(f64::min);
                }
                _ => {}
            }
            resolved
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(rules: &[&str]) -> ElementSpec {
        ElementSpec::Interval(rules.iter().map(|r| r.to_string()).collect())
    }

    fn ranges_of(element: &CalculationElement) -> &[IntervalRange] {
        match element {
            CalculationElement::LookupInterval(lookup) => &lookup.ranges,
            other => panic!("expected interval lookup, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_range_element() {
        let element = parse_element("Balance", &ElementSpec::Range(vec![-400.0, 400.0])).unwrap();
        assert_eq!(
            element,
            CalculationElement::LookupNumber(LookupNumber {
                name: "Balance".to_string(),
                range: NumberRange {
                    min: Some(-400.0),
                    max: Some(400.0),
                },
            })
        );
    }

    #[test]
    fn test_parse_range_wrong_arity() {
        for bounds in [vec![], vec![1.0], vec![1.0, 2.0, 3.0]] {
            assert_eq!(
                parse_element("Balance", &ElementSpec::Range(bounds)),
                Err(ParseError::InvalidRangeConfig("Balance".to_string()))
            );
        }
    }

    #[test]
    fn test_parse_range_inverted_bounds() {
        assert!(parse_element("Balance", &ElementSpec::Range(vec![5.0, 1.0])).is_err());
    }

    #[test]
    fn test_parse_interval_resolves_partition() {
        let spec = interval(&["< 5: 0.1", "< 90: 0.5", "/> 90: 1"]);
        let element = parse_element("Age", &spec).unwrap();
        assert_eq!(
            ranges_of(&element),
            &[
                IntervalRange {
                    start: None,
                    end: Some(5.0),
                    score: 0.1
                },
                IntervalRange {
                    start: Some(5.0),
                    end: Some(90.0),
                    score: 0.5
                },
                IntervalRange {
                    start: Some(90.0),
                    end: None,
                    score: 1.0
                },
            ]
        );
    }

    #[test]
    fn test_parse_rule_without_space_after_operator() {
        let element = parse_element("Age", &interval(&["<5: 1", "/>5: 2"])).unwrap();
        assert_eq!(ranges_of(&element)[0].end, Some(5.0));
        assert_eq!(ranges_of(&element)[1].start, Some(5.0));
    }

    #[test]
    fn test_parse_rule_negative_value() {
        let element = parse_element("Delta", &interval(&["< -10: 0", "/> -10: 1"])).unwrap();
        assert_eq!(ranges_of(&element)[0].end, Some(-10.0));
    }

    #[test]
    fn test_unsupported_operator() {
        assert_eq!(
            parse_element("Age", &interval(&["> 5: 1"])),
            Err(ParseError::UnsupportedOperator(">".to_string()))
        );
        assert_eq!(
            parse_element("Age", &interval(&[">= 5: 1"])),
            Err(ParseError::UnsupportedOperator(">=".to_string()))
        );
    }

    #[test]
    fn test_malformed_interval_rules() {
        let cases: &[&[&str]] = &[&[], &["< 5"], &["< five: 1"], &["< 5: high"], &["5: 1"]];
        for rules in cases {
            assert_eq!(
                parse_element("Age", &interval(rules)),
                Err(ParseError::InvalidIntervalConfig("Age".to_string())),
                "rules: {:?}",
                rules
            );
        }
    }

    #[test]
    fn test_resolve_two_upper_bounds() {
        let raw = vec![
            IntervalRange {
                start: None,
                end: Some(90.0),
                score: 2.0,
            },
            IntervalRange {
                start: None,
                end: Some(5.0),
                score: 1.0,
            },
        ];
        let resolved = resolve_overlaps(&raw);
        assert_eq!(resolved[0].start, Some(5.0));
        assert_eq!(resolved[1].start, None);
    }

    #[test]
    fn test_resolve_many_lower_bounds() {
        let raw: Vec<IntervalRange> = [0.0, 10.0, 20.0]
            .iter()
            .map(|&start| IntervalRange {
                start: Some(start),
                end: None,
                score: start,
            })
            .collect();
        let resolved = resolve_overlaps(&raw);
        assert_eq!(resolved[0].end, Some(10.0));
        assert_eq!(resolved[1].end, Some(20.0));
        assert_eq!(resolved[2].end, None);
    }

    #[test]
    fn test_resolve_shared_edges_are_equal() {
        let raw: Vec<IntervalRange> = [3.0, 50.0, 7.0, 12.0]
            .iter()
            .map(|&end| IntervalRange {
                start: None,
                end: Some(end),
                score: 0.0,
            })
            .collect();
        let mut resolved = resolve_overlaps(&raw);
        resolved.sort_by(|a, b| a.end.partial_cmp(&b.end).unwrap());
        for pair in resolved.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_resolve_leaves_input_untouched() {
        let raw = vec![
            IntervalRange {
                start: None,
                end: Some(1.0),
                score: 0.0,
            },
            IntervalRange {
                start: None,
                end: Some(2.0),
                score: 0.0,
            },
        ];
        let snapshot = raw.clone();
        let _ = resolve_overlaps(&raw);
        assert_eq!(raw, snapshot);
    }

    #[test]
    fn test_malformed_bodies_report_element_name() {
        assert_eq!(
            parse_element("Balance", &ElementSpec::Malformed(ElementKind::Range)),
            Err(ParseError::InvalidRangeConfig("Balance".to_string()))
        );
        assert_eq!(
            parse_element("Age", &ElementSpec::Malformed(ElementKind::Interval)),
            Err(ParseError::InvalidIntervalConfig("Age".to_string()))
        );
    }

    #[test]
    fn test_malformed_yaml_bodies_fail_catalog_parse() {
        for (body, expected) in [
            (
                "Range: [low, 1]",
                ParseError::InvalidRangeConfig("A".to_string()),
            ),
            ("Range: 5", ParseError::InvalidRangeConfig("A".to_string())),
            (
                "Interval: \"< 5: 1\"",
                ParseError::InvalidIntervalConfig("A".to_string()),
            ),
        ] {
            let yaml = format!("A:\n  {}\n", body);
            let elements: BTreeMap<String, ElementSpec> = serde_saphyr::from_str(&yaml).unwrap();
            assert_eq!(parse_catalog(&elements), Err(expected), "body: {}", body);
        }
    }

    #[test]
    fn test_bracket_in_name_rejected() {
        let mut elements = BTreeMap::new();
        elements.insert("A]".to_string(), ElementSpec::Range(vec![0.0, 1.0]));
        assert_eq!(
            parse_catalog(&elements),
            Err(ParseError::InvalidElementName("A]".to_string()))
        );
    }

    #[test]
    fn test_parse_catalog_in_name_order() {
        let mut elements = BTreeMap::new();
        elements.insert("Zeta".to_string(), ElementSpec::Range(vec![0.0, 1.0]));
        elements.insert("Alpha".to_string(), interval(&["< 1: 1"]));
        let catalog = parse_catalog(&elements).unwrap();
        let names: Vec<&str> = catalog.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }
}
