//! Compiles a rule set to a SQL `WHERE` fragment (spec §4.7).

use super::{Operator, Rule};

/// A value bound into the compiled clause at execution time. Kept
/// separate from the clause string so callers don't interpolate untrusted
/// values directly into SQL.
#[derive(Debug, Clone)]
pub enum RuleBind {
    Text(String),
    Real(f64),
}

fn column_for_field(field: &str) -> &'static str {
    match field {
        "type" | "kind" => "kind",
        "title" => "title",
        "year" => "year",
        "genres" => "genres",
        "rating" => "rating",
        "resolution" => "resolution",
        "video_codec" => "video_codec",
        "audio_codec" => "audio_codec",
        _ => "title",
    }
}

fn first_string(value_json: &str) -> String {
    serde_json::from_str::<String>(value_json)
        .or_else(|_| serde_json::from_str::<serde_json::Value>(value_json).map(|v| v.to_string()))
        .unwrap_or_else(|_| value_json.trim_matches('"').to_string())
}

fn as_f64(value_json: &str) -> f64 {
    serde_json::from_str::<f64>(value_json).unwrap_or(0.0)
}

fn as_range(value_json: &str) -> (f64, f64) {
    let pair: Vec<f64> = serde_json::from_str(value_json).unwrap_or_default();
    (
        pair.first().copied().unwrap_or(0.0),
        pair.get(1).copied().unwrap_or(0.0),
    )
}

/// Compiles `rules` (AND-conjoined, per spec §4.7) into a `WHERE`-clause
/// body (without the `WHERE` keyword) plus the values to bind, in order,
/// against its `?` placeholders.
pub fn compile_where_clause(rules: &[Rule]) -> (String, Vec<RuleBind>) {
    if rules.is_empty() {
        return ("1=1".to_string(), Vec::new());
    }

    let mut clauses = Vec::with_capacity(rules.len());
    let mut binds = Vec::new();

    for rule in rules {
        let column = column_for_field(&rule.field);
        match rule.operator {
            Operator::Equals => {
                clauses.push(format!("{column} = ?"));
                binds.push(RuleBind::Text(first_string(&rule.value_json)));
            }
            Operator::Contains => {
                clauses.push(format!("{column} LIKE ?"));
                binds.push(RuleBind::Text(format!("%{}%", first_string(&rule.value_json))));
            }
            Operator::GreaterThan => {
                clauses.push(format!("{column} > ?"));
                binds.push(RuleBind::Real(as_f64(&rule.value_json)));
            }
            Operator::LessThan => {
                clauses.push(format!("{column} < ?"));
                binds.push(RuleBind::Real(as_f64(&rule.value_json)));
            }
            Operator::InRange => {
                let (lo, hi) = as_range(&rule.value_json);
                clauses.push(format!("{column} BETWEEN ? AND ?"));
                binds.push(RuleBind::Real(lo));
                binds.push(RuleBind::Real(hi));
            }
            Operator::Regex => {
                // The store has no native regex function; degrade to a
                // substring match (spec §4.7).
                clauses.push(format!("{column} LIKE ?"));
                binds.push(RuleBind::Text(format!("%{}%", first_string(&rule.value_json))));
            }
        }
    }

    (clauses.join(" AND "), binds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_binds_one_text_value() {
        let rules = vec![Rule {
            field: "type".into(),
            operator: Operator::Equals,
            value_json: "\"movie\"".into(),
        }];
        let (clause, binds) = compile_where_clause(&rules);
        assert_eq!(clause, "kind = ?");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn in_range_binds_two_values() {
        let rules = vec![Rule {
            field: "year".into(),
            operator: Operator::InRange,
            value_json: "[2000,2010]".into(),
        }];
        let (clause, binds) = compile_where_clause(&rules);
        assert_eq!(clause, "year BETWEEN ? AND ?");
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn empty_rules_match_everything() {
        let (clause, binds) = compile_where_clause(&[]);
        assert_eq!(clause, "1=1");
        assert!(binds.is_empty());
    }
}
