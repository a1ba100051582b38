use crate::config::Config;
use unicode_normalization::UnicodeNormalization;

/// Cleans extracted page text according to `[text]` settings.
pub fn normalize(cfg: &Config, raw: &str) -> String {
    let mut s = raw.replace("\r\n", "\n");

    if cfg.text.normalize_unicode {
        s = s.nfkc().collect::<String>();
    }

    if cfg.text.trim_trailing_whitespace {
        s = s
            .lines()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
    }

    s
}

/// First `max_chars` characters of `text`, flattened to a single line.
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_flattens_and_truncates() {
        assert_eq!(snippet("Hello\nworld, again", 11), "Hello world");
        assert_eq!(snippet("short", 50), "short");
    }

    #[test]
    fn snippet_counts_chars_not_bytes() {
        assert_eq!(snippet("가나다라", 2), "가나");
    }

    #[test]
    fn normalize_trims_and_folds() {
        let mut cfg = Config::default();
        cfg.text.normalize_unicode = true;
        let out = normalize(&cfg, "ﬁne  \r\nline\t\n");
        assert_eq!(out, "fine\nline");
    }
}
