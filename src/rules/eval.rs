//! In-memory rule evaluation, used at ingest time to autotag a freshly
//! catalogued record against every smart section (spec §4.7). Must agree
//! with `sql::compile_where_clause` for every rule (property P5).

use regex::Regex;

use super::{Operator, Rule};

/// A flattened view of any cataloguable record, built the same way
/// regardless of whether it backs a movie, episode, or extra.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub kind: String,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub rating: Option<f64>,
    pub resolution: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
}

impl Record {
    fn field_as_string(&self, field: &str) -> String {
        match field {
            "type" | "kind" => self.kind.clone(),
            "title" => self.title.clone(),
            "year" => self.year.map(|y| y.to_string()).unwrap_or_default(),
            "genres" => self.genres.join(", "),
            "rating" => self
                .rating
                .map(|r| format!("{r:.1}"))
                .unwrap_or_default(),
            "resolution" => self.resolution.clone().unwrap_or_default(),
            "video_codec" => self.video_codec.clone().unwrap_or_default(),
            "audio_codec" => self.audio_codec.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn field_as_f64(&self, field: &str) -> f64 {
        match field {
            "year" => self.year.map(|y| y as f64).unwrap_or(0.0),
            "rating" => self.rating.unwrap_or(0.0),
            other => self.field_as_string(other).parse().unwrap_or(0.0),
        }
    }
}

fn value_as_string(value_json: &str) -> String {
    serde_json::from_str::<String>(value_json).unwrap_or_else(|_| value_json.trim_matches('"').to_string())
}

fn value_as_f64(value_json: &str) -> f64 {
    serde_json::from_str(value_json).unwrap_or(0.0)
}

fn value_as_range(value_json: &str) -> (f64, f64) {
    let pair: Vec<f64> = serde_json::from_str(value_json).unwrap_or_default();
    (
        pair.first().copied().unwrap_or(0.0),
        pair.get(1).copied().unwrap_or(0.0),
    )
}

fn matches_one(record: &Record, rule: &Rule) -> bool {
    match rule.operator {
        Operator::Equals => record.field_as_string(&rule.field) == value_as_string(&rule.value_json),
        Operator::Contains => record
            .field_as_string(&rule.field)
            .to_lowercase()
            .contains(&value_as_string(&rule.value_json).to_lowercase()),
        Operator::GreaterThan => record.field_as_f64(&rule.field) > value_as_f64(&rule.value_json),
        Operator::LessThan => record.field_as_f64(&rule.field) < value_as_f64(&rule.value_json),
        Operator::InRange => {
            let (lo, hi) = value_as_range(&rule.value_json);
            let v = record.field_as_f64(&rule.field);
            v >= lo && v <= hi
        }
        Operator::Regex => {
            let pattern = value_as_string(&rule.value_json);
            Regex::new(&pattern)
                .map(|re| re.is_match(&record.field_as_string(&rule.field)))
                .unwrap_or(false)
        }
    }
}

/// A smart section is the AND of its rules.
pub fn evaluate(record: &Record, rules: &[Rule]) -> bool {
    rules.iter().all(|rule| matches_one(record, rule))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            kind: "movie".into(),
            title: "The Matrix".into(),
            year: Some(2021),
            genres: vec!["Action".into(), "Sci-Fi".into()],
            rating: Some(8.7),
            resolution: Some("1920x1080".into()),
            video_codec: Some("h264".into()),
            audio_codec: Some("aac".into()),
        }
    }

    #[test]
    fn smart_section_conjunction_matches() {
        let rules = vec![
            Rule {
                field: "type".into(),
                operator: Operator::Equals,
                value_json: "\"movie\"".into(),
            },
            Rule {
                field: "year".into(),
                operator: Operator::GreaterThan,
                value_json: "2020".into(),
            },
            Rule {
                field: "genres".into(),
                operator: Operator::Contains,
                value_json: "\"Action\"".into(),
            },
        ];
        assert!(evaluate(&sample(), &rules));
    }

    #[test]
    fn single_failing_rule_fails_conjunction() {
        let rules = vec![Rule {
            field: "year".into(),
            operator: Operator::LessThan,
            value_json: "2000".into(),
        }];
        assert!(!evaluate(&sample(), &rules));
    }

    #[test]
    fn regex_operator_matches_title() {
        let rules = vec![Rule {
            field: "title".into(),
            operator: Operator::Regex,
            value_json: "\"^The .*\"".into(),
        }];
        assert!(evaluate(&sample(), &rules));
    }
}
