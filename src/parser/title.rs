//! Separator normalization and title-casing (spec §4.1 rule 5).

const SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "the", "of", "in", "on", "at", "to", "for", "with", "from", "by",
];

fn title_case(words: &[&str]) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            if i != 0 && SMALL_WORDS.contains(&w.to_lowercase().as_str()) {
                w.to_lowercase()
            } else {
                capitalize(w)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// `is_tv_title`: preserves the source's 4-word truncation heuristic for
/// TV titles (spec §9 Open Question — bug-parity, not removed; this will
/// sometimes truncate legitimate longer show names).
pub fn normalize(raw: &str, is_tv_title: bool) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '.' | '_' | '-' => ' ',
            other => other,
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    // Strip leading file-order digits (`^0\d\s+`), e.g. "01 Pilot" -> "Pilot".
    let stripped = {
        let bytes = collapsed.as_bytes();
        if bytes.len() >= 3
            && bytes[0] == b'0'
            && bytes[1].is_ascii_digit()
            && bytes[2] == b' '
        {
            &collapsed[3..]
        } else {
            collapsed.as_str()
        }
    };

    let mut words: Vec<&str> = stripped.split(' ').filter(|w| !w.is_empty()).collect();
    if is_tv_title && words.len() > 4 {
        words.truncate(4);
    }

    if words.is_empty() {
        return String::new();
    }

    title_case(&words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_cases() {
        assert_eq!(normalize("the.matrix", false), "The Matrix");
    }

    #[test]
    fn small_word_stays_lowercase_unless_first() {
        assert_eq!(normalize("lord.of.the.rings", false), "Lord of the Rings");
    }

    #[test]
    fn strips_leading_file_order_digits() {
        assert_eq!(normalize("01 pilot episode", false), "Pilot Episode");
    }

    #[test]
    fn tv_titles_truncate_to_four_words() {
        assert_eq!(
            normalize("a very long running show title", true),
            "A Very Long Running"
        );
    }
}
