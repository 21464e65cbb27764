use super::error::ParseError;

/// Characters that always end the current token and form a token of their own.
/// `-` is deliberately absent so negative literals like `-2` stay intact.
const SPLIT_CHARS: [char; 6] = ['+', '*', '/', '^', '(', ')'];

/// Split a formula fragment into trimmed, non-empty tokens.
///
/// Text inside `[...]` is never split, so element names may contain operator
/// characters or spaces.
pub fn tokenize(formula: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;

    for c in formula.chars() {
        match c {
            '[' => {
                bracket_depth += 1;
                current.push(c);
            }
            ']' => {
                bracket_depth = bracket_depth.saturating_sub(1);
                current.push(c);
            }
            c if bracket_depth == 0 && SPLIT_CHARS.contains(&c) => {
                push_segment(&mut tokens, &current);
                current.clear();
                tokens.push(c.to_string());
            }
            _ => current.push(c),
        }
    }
    push_segment(&mut tokens, &current);

    tokens
}

fn push_segment(tokens: &mut Vec<String>, segment: &str) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        tokens.push(trimmed.to_string());
    }
}

/// One entry of the paren grouping, keyed by the source text it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    /// Source text, parentheses included for nested groups
    pub text: String,
    pub group: Group,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Group {
    /// Unparenthesized run, already tokenized
    Tokens(Vec<String>),
    /// Grouping of a parenthesized run's interior
    Nested(Vec<GroupEntry>),
}

/// Build the nested grouping that mirrors the parentheses of `formula`.
///
/// Entries keep source order. Runs that tokenize to nothing (whitespace
/// between groups) are dropped. Unbalanced parentheses are rejected.
pub fn group_parens(formula: &str) -> Result<Vec<GroupEntry>, ParseError> {
    group_at(formula, 0)
}

fn group_at(formula: &str, offset: usize) -> Result<Vec<GroupEntry>, ParseError> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut bracket_depth = 0usize;
    let mut segment_start = 0usize;

    for (idx, c) in formula.char_indices() {
        match c {
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '(' if bracket_depth == 0 => {
                if depth == 0 {
                    flush_tokens(&mut entries, &formula[segment_start..idx]);
                    segment_start = idx;
                }
                depth += 1;
            }
            ')' if bracket_depth == 0 => {
                if depth == 0 {
                    return Err(ParseError::UnbalancedParentheses {
                        position: offset + idx,
                    });
                }
                depth -= 1;
                if depth == 0 {
                    let interior_start = segment_start + 1;
                    let nested = group_at(&formula[interior_start..idx], offset + interior_start)?;
                    entries.push(GroupEntry {
                        text: formula[segment_start..=idx].to_string(),
                        group: Group::Nested(nested),
                    });
                    segment_start = idx + 1;
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        return Err(ParseError::UnbalancedParentheses {
            position: offset + segment_start,
        });
    }
    flush_tokens(&mut entries, &formula[segment_start..]);

    Ok(entries)
}

fn flush_tokens(entries: &mut Vec<GroupEntry>, text: &str) {
    let tokens = tokenize(text);
    if !tokens.is_empty() {
        entries.push(GroupEntry {
            text: text.to_string(),
            group: Group::Tokens(tokens),
        });
    }
}
