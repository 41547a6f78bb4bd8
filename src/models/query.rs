use std::cmp::Ordering;
use std::fmt::Display;

use super::{Attribute, MetadataValue, Movie};

/// What the query translator extracts from a natural-language request
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredQuery {
    /// Text to compare against plot summaries; empty when the request is
    /// purely a metadata constraint
    pub query: String,
    pub filter: Option<Filter>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contain,
    Like,
    In,
    Nin,
}

impl Comparator {
    pub const ALL: [Comparator; 10] = [
        Comparator::Eq,
        Comparator::Ne,
        Comparator::Gt,
        Comparator::Gte,
        Comparator::Lt,
        Comparator::Lte,
        Comparator::Contain,
        Comparator::Like,
        Comparator::In,
        Comparator::Nin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Comparator::Eq => "eq",
            Comparator::Ne => "ne",
            Comparator::Gt => "gt",
            Comparator::Gte => "gte",
            Comparator::Lt => "lt",
            Comparator::Lte => "lte",
            Comparator::Contain => "contain",
            Comparator::Like => "like",
            Comparator::In => "in",
            Comparator::Nin => "nin",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::And, Operator::Or, Operator::Not];

    pub fn name(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|o| o.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Literal on the right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<FilterValue>),
}

impl FilterValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            FilterValue::Integer(i) => Some(*i as f64),
            FilterValue::Float(f) => Some(*f),
            // Models sometimes quote numbers
            FilterValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            FilterValue::Text(s) => Some(s.to_lowercase()),
            _ => None,
        }
    }
}

impl Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Text(s) => write!(f, "{:?}", s),
            FilterValue::Integer(i) => write!(f, "{}", i),
            FilterValue::Float(x) => write!(f, "{}", x),
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Metadata filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Comparison {
        comparator: Comparator,
        attribute: Attribute,
        value: FilterValue,
    },
    Operation {
        operator: Operator,
        arguments: Vec<Filter>,
    },
}

impl Filter {
    pub fn comparison(comparator: Comparator, attribute: Attribute, value: FilterValue) -> Self {
        Filter::Comparison {
            comparator,
            attribute,
            value,
        }
    }

    /// Whether `movie` satisfies this filter
    pub fn matches(&self, movie: &Movie) -> bool {
        match self {
            Filter::Comparison {
                comparator,
                attribute,
                value,
            } => compare(*comparator, &movie.metadata(*attribute), value),
            Filter::Operation {
                operator,
                arguments,
            } => match operator {
                Operator::And => arguments.iter().all(|f| f.matches(movie)),
                Operator::Or => arguments.iter().any(|f| f.matches(movie)),
                Operator::Not => !arguments.iter().any(|f| f.matches(movie)),
            },
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::Comparison {
                comparator,
                attribute,
                value,
            } => write!(f, "{}(\"{}\", {})", comparator.name(), attribute.name(), value),
            Filter::Operation {
                operator,
                arguments,
            } => {
                write!(f, "{}(", operator.name())?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Orders a metadata value against a filter literal; `None` on type mismatch
fn order(actual: &MetadataValue, expected: &FilterValue) -> Option<Ordering> {
    match actual {
        MetadataValue::Integer(i) => (*i as f64).partial_cmp(&expected.as_number()?),
        MetadataValue::Float(x) => x.partial_cmp(&expected.as_number()?),
        MetadataValue::Text(s) => Some(s.to_lowercase().cmp(&expected.as_text()?)),
    }
}

fn compare(comparator: Comparator, actual: &MetadataValue, expected: &FilterValue) -> bool {
    match comparator {
        Comparator::Eq => order(actual, expected) == Some(Ordering::Equal),
        Comparator::Ne => matches!(order(actual, expected), Some(o) if o != Ordering::Equal),
        Comparator::Gt => order(actual, expected) == Some(Ordering::Greater),
        Comparator::Gte => matches!(
            order(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Comparator::Lt => order(actual, expected) == Some(Ordering::Less),
        Comparator::Lte => matches!(
            order(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Comparator::Contain | Comparator::Like => match (actual, expected.as_text()) {
            (MetadataValue::Text(s), Some(needle)) => {
                s.to_lowercase().contains(needle.trim_matches('%'))
            }
            _ => false,
        },
        Comparator::In => match expected {
            FilterValue::List(items) => items
                .iter()
                .any(|item| order(actual, item) == Some(Ordering::Equal)),
            single => order(actual, single) == Some(Ordering::Equal),
        },
        Comparator::Nin => match expected {
            FilterValue::List(items) => items
                .iter()
                .all(|item| matches!(order(actual, item), Some(o) if o != Ordering::Equal)),
            single => matches!(order(actual, single), Some(o) if o != Ordering::Equal),
        },
    }
}
