use super::catalog::parse_element;
use super::config::ScoringConfig;
use super::element::{Calculation, CalculationElement, IntervalRange, LookupInterval};
use super::error::ParseError;
use super::tree::parse_formula;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.expression.is_empty() {
        errors.push("expression: at least one formula is required".to_string());
    }

    // Parse elements one by one so every bad entry is reported
    let mut catalog = Vec::new();
    for (name, spec) in &config.elements {
        match parse_element(name, spec) {
            Ok(element) => catalog.push(element),
            Err(e) => errors.push(format!("elements.{}: {}", name, e)),
        }
    }

    for (i, formula) in config.expression.iter().enumerate() {
        match parse_formula(formula, &catalog) {
            Ok(root) if root.children.is_empty() => {
                errors.push(format!("expression[{}]: formula is empty", i));
            }
            Ok(root) => {
                if let Some(operation) = find_empty_calculation(&root) {
                    errors.push(format!(
                        "expression[{}]: invalid '{}' - operator '{}' has no operands",
                        i, formula, operation
                    ));
                }
            }
            // Already reported against the element itself
            Err(ParseError::UnknownElement(name)) if config.elements.contains_key(&name) => {}
            Err(e) => errors.push(format!(
                "expression[{}]: invalid '{}' - {}",
                i, formula, e
            )),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn find_empty_calculation(calculation: &Calculation) -> Option<&str> {
    if calculation.children.is_empty() {
        return Some(&calculation.name);
    }
    calculation.children.iter().find_map(|child| match child {
        CalculationElement::Calculation(inner) => find_empty_calculation(inner),
        _ => None,
    })
}

/// Report gaps and overlaps left in a lookup's resolved ranges.
///
/// Resolution only closes bounds between ranges that share an open side, so
/// hand-written rule sets can still leave holes. These are warnings: inputs
/// falling in a gap score `out_of_range_score`.
pub fn partition_warnings(lookup: &LookupInterval) -> Vec<String> {
    let mut warnings = Vec::new();

    let open_starts = lookup.ranges.iter().filter(|r| r.start.is_none()).count();
    let open_ends = lookup.ranges.iter().filter(|r| r.end.is_none()).count();
    if open_starts > 1 {
        warnings.push(format!(
            "elements.{}: {} ranges have no lower bound",
            lookup.name, open_starts
        ));
    }
    if open_ends > 1 {
        warnings.push(format!(
            "elements.{}: {} ranges have no upper bound",
            lookup.name, open_ends
        ));
    }

    let mut sorted: Vec<&IntervalRange> = lookup.ranges.iter().collect();
    sorted.sort_by(|a, b| {
        let a = a.start.unwrap_or(f64::NEG_INFINITY);
        let b = b.start.unwrap_or(f64::NEG_INFINITY);
        a.total_cmp(&b)
    });

    for pair in sorted.windows(2) {
        let end = pair[0].end.unwrap_or(f64::INFINITY);
        let start = pair[1].start.unwrap_or(f64::NEG_INFINITY);
        if end < start {
            warnings.push(format!(
                "elements.{}: gap between {} and {}",
                lookup.name,
                format_bound(end),
                format_bound(start)
            ));
        } else if end > start {
            warnings.push(format!(
                "elements.{}: ranges overlap between {} and {}",
                lookup.name,
                format_bound(start),
                format_bound(end)
            ));
        }
    }

    warnings
}

fn format_bound(value: f64) -> String {
    if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        value.to_string()
    }
}
