//! Shared extraction patterns and defaults.
//!
//! Default extractors reuse the compiled patterns below instead of
//! recompiling them per instance.

use lazy_static::lazy_static;
use regex::Regex;

/// Label written before the verdict in strict mode ("match result").
pub const DEFAULT_VERDICT_LABEL: &str = "匹配结果";

/// Delimiter between label and verdict. ASCII colon, not the full-width one.
pub const DEFAULT_VERDICT_DELIMITER: &str = ":";

/// Binary verdict alphabet: "yes" and "no".
pub const DEFAULT_VERDICT_TOKENS: [&str; 2] = ["是", "否"];

/// GSM8K final-answer marker.
pub const DEFAULT_FINAL_ANSWER_MARKER: &str = "#### ";

/// Numeric answer body: optional sign, digits, dots and thousands separators.
pub(crate) const NUMBER_BODY: &str = r"(-?[0-9.,]+)";

lazy_static! {
    /// `匹配结果:(是|否)`
    pub(crate) static ref VERDICT_MARKER_PATTERN: Regex = Regex::new(
        r"匹配结果:(是|否)"
    ).unwrap();

    /// `#### <number>`
    pub(crate) static ref FINAL_ANSWER_PATTERN: Regex = Regex::new(
        r"#### (-?[0-9.,]+)"
    ).unwrap();

    /// Any numeric run, used by flexible numeric extraction.
    pub(crate) static ref NUMBER_PATTERN: Regex = Regex::new(NUMBER_BODY).unwrap();
}

/// Build a strict marker pattern: `<label><delimiter>(<tok>|<tok>|...)`.
///
/// Everything is matched literally. Longer tokens are tried first so a token
/// that prefixes another cannot shadow it.
pub(crate) fn marker_pattern(
    label: &str,
    delimiter: &str,
    tokens: &[String],
) -> Result<Regex, regex::Error> {
    let mut ordered: Vec<&String> = tokens.iter().collect();
    ordered.sort_by(|a, b| b.len().cmp(&a.len()));

    let alternation = ordered
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(
        "{}{}({})",
        regex::escape(label),
        regex::escape(delimiter),
        alternation
    ))
}

/// Build a final-answer pattern: `<marker><number>`.
pub(crate) fn final_answer_pattern(marker: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("{}{}", regex::escape(marker), NUMBER_BODY))
}
