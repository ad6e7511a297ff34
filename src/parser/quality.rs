//! Quality-token stripping (spec §4.1 rule 4): removed before separator
//! normalization so tokens like `1080p` never leak into year extraction
//! or the title.

const QUALITY_TOKENS: &[&str] = &[
    "2160p", "1080p", "720p", "480p", "360p", "bluray", "blu-ray", "bdrip", "brrip", "webrip",
    "web-dl", "webdl", "web", "hdtv", "dvdrip", "x264", "x265", "h264", "h265", "hevc", "hdr",
    "hdr10", "10bit", "8bit", "aac", "ac3", "dts", "atmos", "remux", "extended", "unrated",
    "proper", "repack", "internal", "limited",
];

pub fn strip_quality_tokens(stem: &str) -> String {
    let mut result = stem.to_string();
    for token in QUALITY_TOKENS {
        // Match the token as a whole word bounded by separators, case-insensitively.
        let mut out = String::with_capacity(result.len());
        let lower = result.to_lowercase();
        let mut idx = 0;
        while let Some(found) = lower[idx..].find(token) {
            let start = idx + found;
            let end = start + token.len();
            let before_ok = start == 0 || is_separator(lower.as_bytes()[start - 1]);
            let after_ok = end == lower.len() || is_separator(lower.as_bytes()[end]);
            if before_ok && after_ok {
                out.push_str(&result[idx..start]);
                idx = end;
            } else {
                out.push_str(&result[idx..start + 1]);
                idx = start + 1;
            }
        }
        out.push_str(&result[idx..]);
        result = out;
    }
    result
}

fn is_separator(b: u8) -> bool {
    matches!(b, b'.' | b'_' | b'-' | b' ' | b'(' | b')' | b'[' | b']')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_resolution_token() {
        assert_eq!(strip_quality_tokens("Some.Movie.1080p.mp4"), "Some.Movie..mp4");
    }

    #[test]
    fn leaves_unrelated_digits_alone() {
        assert_eq!(strip_quality_tokens("Movie.1999"), "Movie.1999");
    }
}
