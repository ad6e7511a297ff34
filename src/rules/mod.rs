//! Rule Engine (C7): one rule definition compiled two ways — to SQL and to
//! an in-memory predicate — so ingest-time autotagging and query-time
//! listing agree (spec §4.7, property P5).

mod eval;
mod sql;

pub use eval::{evaluate, Record};
pub use sql::compile_where_clause;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Equals,
    Contains,
    GreaterThan,
    LessThan,
    InRange,
    Regex,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::Contains => "contains",
            Operator::GreaterThan => "greater-than",
            Operator::LessThan => "less-than",
            Operator::InRange => "in-range",
            Operator::Regex => "regex",
        }
    }
}

impl std::str::FromStr for Operator {
    type Err = crate::error::AppError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "equals" => Operator::Equals,
            "contains" => Operator::Contains,
            "greater-than" => Operator::GreaterThan,
            "less-than" => Operator::LessThan,
            "in-range" => Operator::InRange,
            "regex" => Operator::Regex,
            other => {
                return Err(crate::error::AppError::validation(
                    "operator",
                    format!("unknown operator: {other}"),
                ))
            }
        })
    }
}

/// The field names a rule may reference (spec §4.7's in-memory extraction
/// list: type, title, year, genres, rating, resolution, codec names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub field: String,
    pub operator: Operator,
    /// JSON-encoded value: a string/number for most operators, a 2-element
    /// array for `in-range`.
    pub value_json: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn operator_round_trips_through_str() {
        for op in [
            Operator::Equals,
            Operator::Contains,
            Operator::GreaterThan,
            Operator::LessThan,
            Operator::InRange,
            Operator::Regex,
        ] {
            assert_eq!(Operator::from_str(op.as_str()).unwrap(), op);
        }
    }
}
