use tracing::{debug, trace};

use super::element::{Calculation, CalculationElement, Operation};
use super::error::ParseError;
use super::tokenizer::{group_parens, Group, GroupEntry};

/// Classify a flat token sequence into calculation elements.
///
/// `[Name]` resolves against `catalog` by exact name, operator symbols become
/// empty `Calculation` placeholders, and anything else must be a finite number.
pub fn strings_to_elements(
    tokens: &[String],
    catalog: &[CalculationElement],
) -> Result<Vec<CalculationElement>, ParseError> {
    tokens
        .iter()
        .map(|token| classify_token(token, catalog))
        .collect()
}

fn classify_token(
    token: &str,
    catalog: &[CalculationElement],
) -> Result<CalculationElement, ParseError> {
    if let Some(name) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return catalog
            .iter()
            .find(|element| element.name() == name)
            .cloned()
            .ok_or_else(|| ParseError::UnknownElement(name.to_string()));
    }

    if let Some(operation) = Operation::from_symbol(token) {
        return Ok(Calculation::new(operation).into());
    }

    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(CalculationElement::constant(token, value)),
        _ => Err(ParseError::InvalidToken(token.to_string())),
    }
}

/// Fold classified elements into one tree.
///
/// Each operator takes the operands queued since the previous operator, and
/// every later operator nests inside the one before it:
/// `a OP1 b OP2 c` becomes `OP1(a, OP2(b, c))`. Existing configurations rely
/// on this nesting, so it must not be changed to left-associative folding.
pub fn elements_to_calculation_tree(elements: Vec<CalculationElement>) -> Calculation {
    let mut chain: Vec<Calculation> = Vec::new();
    let mut pending: Vec<CalculationElement> = Vec::new();

    for element in elements {
        match element {
            CalculationElement::Calculation(mut operator) if operator.children.is_empty() => {
                operator.children.append(&mut pending);
                chain.push(operator);
            }
            operand => pending.push(operand),
        }
    }

    let Some(mut top) = chain.pop() else {
        return Calculation::with_children(Operation::Add, pending);
    };
    top.children.append(&mut pending);

    while let Some(mut parent) = chain.pop() {
        parent.children.push(top.into());
        top = parent;
    }
    top
}

/// Turn a paren grouping into a tree rooted at a synthetic `+` node.
///
/// Every entry, token run or nested group, becomes one child of that root.
pub fn walk_tree(
    groups: &[GroupEntry],
    catalog: &[CalculationElement],
) -> Result<Calculation, ParseError> {
    let mut root = Calculation::new(Operation::Add);

    for entry in groups {
        let child = match &entry.group {
            Group::Tokens(tokens) => {
                trace!(fragment = %entry.text, "building fragment");
                elements_to_calculation_tree(strings_to_elements(tokens, catalog)?)
            }
            Group::Nested(nested) => walk_tree(nested, catalog)?,
        };
        root.children.push(child.into());
    }

    Ok(root)
}

/// Parse a single formula string.
pub fn parse_formula(
    formula: &str,
    catalog: &[CalculationElement],
) -> Result<Calculation, ParseError> {
    walk_tree(&group_parens(formula)?, catalog)
}

/// Parse a list of formula strings, which are implicitly summed.
///
/// The fragments of every expression become children of one `+` root, the
/// same tree as wrapping each expression in its own parentheses. Joining the
/// raw text with `+` instead would fold an expression into the operator
/// chain of the one before it.
pub fn parse_score_calculation(
    expressions: &[String],
    catalog: &[CalculationElement],
) -> Result<Calculation, ParseError> {
    let mut root = Calculation::new(Operation::Add);
    for formula in expressions {
        root.children.extend(parse_formula(formula, catalog)?.children);
    }
    debug!(
        expressions = expressions.len(),
        fragments = root.children.len(),
        "parsed score calculation"
    );
    Ok(root)
}
