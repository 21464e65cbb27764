use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::scoring::{Calculation, CalculationElement, ScoreRange, ScoreResult};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score in compact notation (1.5k, 2.3M, 847, 0.5)
pub fn format_score(score: f64) -> String {
    if !score.is_finite() {
        return score.to_string();
    }

    // Thresholds sit where the lower tier would round up into the next one
    let magnitude = score.abs();
    let formatted = if magnitude >= 999_950.0 {
        format!("{:.1}M", score / 1_000_000.0)
    } else if magnitude >= 999.5 {
        format!("{:.1}k", score / 1_000.0)
    } else if magnitude >= 9.995 {
        format!("{:.0}", score)
    } else {
        let fixed = format!("{:.2}", score);
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    };

    if formatted == "-0" {
        return "0".to_string();
    }
    // Trim trailing .0 (e.g., "1.0k" -> "1k")
    formatted.replace(".0M", "M").replace(".0k", "k")
}

fn format_range(range: &ScoreRange) -> String {
    format!("[{}, {}]", format_bound(range.min), format_bound(range.max))
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

/// Format a score with its per-factor breakdown
/// One line per factor: name, raw value, weighted value, output range
pub fn format_breakdown(result: &ScoreResult, use_colors: bool) -> String {
    let name_width = result
        .breakdown
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = result
        .breakdown
        .iter()
        .map(|factor| {
            let name = format!("{:<width$}", factor.name, width = name_width);
            let value = factor.value.to_string();
            let weighted = factor.weighted.to_string();
            let range = format_range(&factor.range);
            if use_colors {
                format!(
                    "  {}  {} -> {}  {}",
                    name.cyan(),
                    value,
                    weighted.bold(),
                    range.dimmed()
                )
            } else {
                format!("  {}  {} -> {}  {}", name, value, weighted, range)
            }
        })
        .collect();

    let score = format_score(result.score);
    if use_colors {
        lines.push(format!("Score: {}", score.bold()));
    } else {
        lines.push(format!("Score: {}", score));
    }
    lines.join("\n")
}

/// Render a calculation tree, one node per line, children indented
pub fn format_tree(root: &Calculation) -> String {
    let mut lines = Vec::new();
    push_calculation(root, 0, &mut lines);
    lines.join("\n")
}

fn push_calculation(calculation: &Calculation, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}{}", "  ".repeat(depth), calculation.name));
    for child in &calculation.children {
        push_element(child, depth + 1, lines);
    }
}

fn push_element(element: &CalculationElement, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match element {
        CalculationElement::Calculation(calculation) => push_calculation(calculation, depth, lines),
        CalculationElement::Constant { value, .. } => lines.push(format!("{}{}", indent, value)),
        CalculationElement::LookupInterval(lookup) => lines.push(format!(
            "{}[{}] interval ({} ranges)",
            indent,
            lookup.name,
            lookup.ranges.len()
        )),
        CalculationElement::LookupNumber(lookup) => lines.push(format!(
            "{}[{}] range [{}, {}]",
            indent,
            lookup.name,
            lookup.range.min.map_or("-inf".to_string(), |v| v.to_string()),
            lookup.range.max.map_or("inf".to_string(), |v| v.to_string())
        )),
    }
}

/// A scored subject for ranked display
pub struct RankedSubject<'a> {
    pub subject: &'a str,
    pub score: f64,
}

/// Sort subjects by score descending, then by subject name for ties.
/// NaN scores sort after every number.
pub fn rank_subjects(subjects: &mut [RankedSubject]) {
    subjects.sort_by(|a, b| {
        let by_score = match (a.score.is_nan(), b.score.is_nan()) {
            (false, false) => b.score.total_cmp(&a.score),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        };
        by_score.then_with(|| a.subject.cmp(b.subject))
    });
}

/// Format subjects as a ranked table with columns: Index, Score, Subject
/// No headers (minimal format)
/// Score column is right-aligned, 7 chars wide (fits "9999.9M")
pub fn format_ranked_table(subjects: &[RankedSubject], use_colors: bool) -> String {
    if subjects.is_empty() {
        return "No subjects to score.".to_string();
    }

    let score_width = 7;
    let separator = "  ";

    subjects
        .iter()
        .enumerate()
        .map(|(idx, ranked)| {
            // 1-based index, right-aligned with trailing dot
            let index_str = format!("{:>2}.", idx + 1);
            let score_padded = format!("{:>width$}", format_score(ranked.score), width = score_width);

            if use_colors {
                format!(
                    "{} {}{}{}",
                    index_str.dimmed(),
                    score_padded.bold(),
                    separator,
                    ranked.subject
                )
            } else {
                format!("{} {}{}{}", index_str, score_padded, separator, ranked.subject)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format subjects as tab-separated values for scripting
/// Columns: score, subject (no headers, no colors)
pub fn format_tsv(subjects: &[RankedSubject]) -> String {
    subjects
        .iter()
        .map(|ranked| format!("{}\t{}", ranked.score, ranked.subject))
        .collect::<Vec<_>>()
        .join("\n")
}
