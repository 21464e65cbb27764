use serde::Serialize;

/// Arithmetic operator carried by a [`Calculation`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operation {
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Operation::Add),
            "-" => Some(Operation::Subtract),
            "*" => Some(Operation::Multiply),
            "/" => Some(Operation::Divide),
            "^" => Some(Operation::Power),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
            Operation::Power => "^",
        }
    }

    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operation::Add => lhs + rhs,
            Operation::Subtract => lhs - rhs,
            Operation::Multiply => lhs * rhs,
            Operation::Divide => lhs / rhs,
            Operation::Power => lhs.powf(rhs),
        }
    }
}

/// One step of an interval lookup: `[start, end)`, either side may be open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalRange {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub score: f64,
}

impl IntervalRange {
    pub fn contains(&self, value: f64) -> bool {
        self.start.map_or(true, |start| value >= start) && self.end.map_or(true, |end| value < end)
    }
}

/// Advisory bounds for a numeric lookup. Values outside are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Step function over a named scalar input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupInterval {
    pub name: String,
    pub ranges: Vec<IntervalRange>,
    pub out_of_range_score: f64,
}

/// Clamped passthrough of a named scalar input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupNumber {
    pub name: String,
    pub range: NumberRange,
}

/// Internal node: folds its children's results with `operation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    /// Operator symbol, e.g. "+"
    pub name: String,
    pub operation: Operation,
    pub children: Vec<CalculationElement>,
}

impl Calculation {
    pub fn new(operation: Operation) -> Self {
        Self {
            name: operation.symbol().to_string(),
            operation,
            children: Vec::new(),
        }
    }

    pub fn with_children(operation: Operation, children: Vec<CalculationElement>) -> Self {
        Self {
            children,
            ..Self::new(operation)
        }
    }
}

/// A node of the calculation tree. Only `Calculation` has children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CalculationElement {
    Constant { name: String, value: f64 },
    LookupInterval(LookupInterval),
    LookupNumber(LookupNumber),
    Calculation(Calculation),
}

impl CalculationElement {
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        CalculationElement::Constant {
            name: name.into(),
            value,
        }
    }

    /// Label for constants, input key for lookups, operator symbol for calculations
    pub fn name(&self) -> &str {
        match self {
            CalculationElement::Constant { name, .. } => name,
            CalculationElement::LookupInterval(lookup) => &lookup.name,
            CalculationElement::LookupNumber(lookup) => &lookup.name,
            CalculationElement::Calculation(calc) => &calc.name,
        }
    }

    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            CalculationElement::LookupInterval(_) | CalculationElement::LookupNumber(_)
        )
    }

    /// Visit every lookup leaf, depth first, left to right.
    pub fn for_each_lookup<'a>(&'a self, visit: &mut impl FnMut(&'a CalculationElement)) {
        match self {
            CalculationElement::Calculation(calc) => {
                for child in &calc.children {
                    child.for_each_lookup(visit);
                }
            }
            element if element.is_lookup() => visit(element),
            _ => {}
        }
    }
}

impl From<Calculation> for CalculationElement {
    fn from(calc: Calculation) -> Self {
        CalculationElement::Calculation(calc)
    }
}
