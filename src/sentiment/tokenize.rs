use once_cell::sync::Lazy;
use regex::Regex;

// \w covers letters, digits and `_`; (?u) keeps it Unicode-aware
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\w+").expect("word regex"));

/// Lower-cased word tokens, in input order. Runs of non-word characters are
/// separators, so punctuation-only or blank input yields no tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation_and_lowercases() {
        assert_eq!(
            tokenize("Great product!! Didn't LOVE the_box, though."),
            vec!["great", "product", "didn", "t", "love", "the_box", "though"]
        );
    }

    #[test]
    fn blank_and_punctuation_only_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n").is_empty());
        assert!(tokenize("?!... --- ***").is_empty());
    }

    #[test]
    fn keeps_digits_and_unicode_letters() {
        assert_eq!(tokenize("Arrived in 3 days, très bien"), vec![
            "arrived", "in", "3", "days", "très", "bien"
        ]);
    }
}
