use regex::Regex;
use std::sync::LazyLock;

static SSN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("static regex"));
static CARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{4}-\d{4}-\d{4}\b").expect("static regex"));
static ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{9}\b").expect("static regex"));

pub const SSN_TOKEN: &str = "[REDACTED SSN]";
pub const CARD_TOKEN: &str = "[REDACTED CARD]";
pub const ACCOUNT_TOKEN: &str = "[REDACTED ACCOUNT]";

/// Scrub SSN-like, card-like and bare 9-digit numbers. Tokens carry no digits,
/// so a second pass never changes the output.
pub fn redact_sensitive(text: &str) -> String {
    let out = SSN.replace_all(text, SSN_TOKEN);
    let out = CARD.replace_all(&out, CARD_TOKEN);
    ACCOUNT.replace_all(&out, ACCOUNT_TOKEN).into_owned()
}
