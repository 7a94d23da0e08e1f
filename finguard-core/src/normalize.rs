//! Text normalization shared by the matcher and the recurrence detector.
//!
//! Both functions are deterministic: the same description always yields the
//! same keywords and the same merchant key.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum number of keywords kept per description
pub const MAX_KEYWORDS: usize = 5;

/// Transaction-log prefixes that carry no merchant information
const LOG_PREFIXES: &[&str] = &["debit", "credit", "ach", "check", "transfer"];

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "from", "with", "inc", "llc", "ltd", "corp", "co", "com", "www",
    "payment", "purchase", "pos", "card", "online", "store", "des", "ref", "via", "your",
    "this", "that", "our", "you", "are", "was", "not",
];

static PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("static regex"));

/// Lowercase, replace punctuation with spaces and collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = PUNCT_RE.replace_all(&lower, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

fn is_log_prefix(token: &str) -> bool {
    LOG_PREFIXES.contains(&token)
}

/// A bare number of 4+ digits, as appended by banks for check/reference numbers
fn is_reference_number(token: &str) -> bool {
    token.len() >= 4 && token.chars().all(|c| c.is_ascii_digit())
}

/// Extract up to [`MAX_KEYWORDS`] distinct keywords from a description.
///
/// Stop-words and tokens of two characters or fewer are dropped.
pub fn extract_keywords(description: &str) -> Vec<String> {
    let cleaned = clean_text(description);
    let mut out: Vec<String> = Vec::new();
    for token in cleaned.split_whitespace() {
        if token.chars().count() <= 2 || is_stop_word(token) {
            continue;
        }
        if out.iter().any(|k| k == token) {
            continue;
        }
        out.push(token.to_string());
        if out.len() == MAX_KEYWORDS {
            break;
        }
    }
    out
}

/// Derive the merchant key used to group transactions from one counterparty.
///
/// Drops everything after the first dash, leading log prefixes
/// (DEBIT/CREDIT/ACH/CHECK/TRANSFER) and reference numbers, then keeps the
/// first two remaining words. When nothing survives the cleaned text is used
/// as-is. Applying this to its own output returns the same string.
pub fn merchant_key(description: &str) -> String {
    let head = description.split('-').next().unwrap_or(description);
    let mut cleaned = clean_text(head);
    if cleaned.is_empty() {
        cleaned = clean_text(description);
    }

    let mut words: Vec<&str> = cleaned
        .split_whitespace()
        .skip_while(|t| is_log_prefix(t) || is_reference_number(t))
        .take(2)
        .collect();
    while words.last().is_some_and(|t| is_reference_number(t)) {
        words.pop();
    }

    if words.is_empty() {
        cleaned
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  AMAZON.COM*MK1234   Seattle, WA "), "amazon com mk1234 seattle wa");
        assert_eq!(clean_text("!!!"), "");
    }

    #[test]
    fn test_keywords_drop_short_and_stop_words() {
        let kw = extract_keywords("The Uber trip to SF airport");
        assert_eq!(kw, vec!["uber", "trip", "airport"]);
    }

    #[test]
    fn test_keywords_capped_and_distinct() {
        let kw = extract_keywords("alpha beta gamma delta alpha epsilon zeta eta");
        assert_eq!(kw.len(), MAX_KEYWORDS);
        assert_eq!(kw, vec!["alpha", "beta", "gamma", "delta", "epsilon"]);
    }

    #[test]
    fn test_keywords_empty_input() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("a b").is_empty());
    }

    #[test]
    fn test_merchant_key_strips_prefixes_and_refs() {
        assert_eq!(merchant_key("ACH DEBIT NETFLIX.COM 4821"), "netflix com");
        assert_eq!(merchant_key("DEBIT SPOTIFY 1234"), "spotify");
        assert_eq!(merchant_key("CHECK 10023"), "check 10023");
        assert_eq!(merchant_key("Comcast Cable - Autopay 03/01"), "comcast cable");
        assert_eq!(merchant_key("TRANSFER 99881 Landlord Properties LLC"), "landlord properties");
    }

    #[test]
    fn test_merchant_key_same_merchant_same_key() {
        assert_eq!(
            merchant_key("ACH GYM FLEX 0001"),
            merchant_key("gym flex - march dues")
        );
    }

    #[test]
    fn test_merchant_key_idempotent() {
        for desc in [
            "ACH DEBIT NETFLIX.COM 4821",
            "CHECK 10023",
            "Comcast Cable - Autopay",
            "-leading dash",
            "",
            "credit 1234 5678",
            "Whole Foods Market #10234",
        ] {
            let once = merchant_key(desc);
            assert_eq!(merchant_key(&once), once, "not idempotent for {desc:?}");
        }
    }
}
