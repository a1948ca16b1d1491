//! Translation processing rules.
//!
//! Each translation carries an ordered list of regex substitutions that turn
//! raw verse text into display text. Rules run one after another, each on the
//! output of the previous one.

use std::borrow::Cow;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::InvalidPatternWarning;

/// A user-defined regex substitution attached to a translation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessingRule {
    /// Regular expression source.
    #[serde(rename = "regex")]
    pub pattern: String,
    /// Replacement template using `$1`.. and `$&`.
    #[serde(rename = "formatting")]
    pub replacement: String,
    /// HTML-escape substituted values before inserting them.
    #[serde(rename = "escape", default)]
    pub escape_captures: bool,
}

impl ProcessingRule {
    /// Create a rule that inserts captures as-is.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            escape_captures: false,
        }
    }

    /// Create a rule that HTML-escapes captures before inserting them.
    pub fn escaped(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            escape_captures: true,
            ..Self::new(pattern, replacement)
        }
    }
}

/// Verse text after every applicable rule has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedVerse {
    /// The formatted text.
    pub text: String,
    /// Rules that were skipped because their pattern did not compile.
    pub warnings: Vec<InvalidPatternWarning>,
}

/// One piece of a parsed replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Group(usize),
    WholeMatch,
}

/// Split a replacement template into literal text and substitution points.
///
/// `$$` is a literal dollar. `$nn` wins over `$n` when group `nn` exists.
/// References to groups the pattern does not have stay literal.
fn parse_template(template: &str, groups: usize) -> Vec<Token> {
    fn flush(tokens: &mut Vec<Token>, literal: &mut String) {
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(literal)));
        }
    }

    let group_at = |digits: &[u8]| -> Option<usize> {
        let n = digits
            .iter()
            .fold(0usize, |acc, d| acc * 10 + usize::from(d - b'0'));
        (1..=groups).contains(&n).then_some(n)
    };

    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let bytes = after.as_bytes();
        let two_digit = match bytes {
            [a @ b'0'..=b'9', b @ b'0'..=b'9', ..] => group_at(&[*a, *b]),
            _ => None,
        };
        let one_digit = match bytes {
            [a @ b'0'..=b'9', ..] => group_at(&[*a]),
            _ => None,
        };
        let consumed = match (bytes.first(), two_digit, one_digit) {
            (Some(b'$'), ..) => {
                literal.push('$');
                1
            }
            (Some(b'&'), ..) => {
                flush(&mut tokens, &mut literal);
                tokens.push(Token::WholeMatch);
                1
            }
            (_, Some(n), _) => {
                flush(&mut tokens, &mut literal);
                tokens.push(Token::Group(n));
                2
            }
            (_, None, Some(n)) => {
                flush(&mut tokens, &mut literal);
                tokens.push(Token::Group(n));
                1
            }
            _ => {
                literal.push('$');
                0
            }
        };
        rest = &after[consumed..];
    }
    literal.push_str(rest);
    flush(&mut tokens, &mut literal);
    tokens
}

/// Escape the characters that would otherwise be read as HTML or wiki-link
/// syntax when the formatted verse is inserted into a note.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| matches!(c, '&' | '<' | '>' | '[' | ']')) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '[' => out.push_str("&#91;"),
            ']' => out.push_str("&#93;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[derive(Debug, Clone)]
struct CompiledRule {
    regex: Regex,
    template: Vec<Token>,
    escape: bool,
}

impl CompiledRule {
    fn compile(rule: &ProcessingRule) -> Result<Self, regex::Error> {
        let regex = Regex::new(&rule.pattern)?;
        let groups = regex.captures_len().saturating_sub(1);
        Ok(Self {
            template: parse_template(&rule.replacement, groups),
            regex,
            escape: rule.escape_captures,
        })
    }

    fn push_value(&self, out: &mut String, value: &str) {
        if self.escape {
            out.push_str(&escape_html(value));
        } else {
            out.push_str(value);
        }
    }

    /// Replace every non-overlapping match.
    fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&text[last..whole.start()]);
            for token in &self.template {
                match token {
                    Token::Literal(s) => out.push_str(s),
                    Token::WholeMatch => self.push_value(&mut out, whole.as_str()),
                    Token::Group(i) => {
                        self.push_value(&mut out, caps.get(*i).map_or("", |m| m.as_str()));
                    }
                }
            }
            last = whole.end();
        }
        out.push_str(&text[last..]);
        out
    }
}

/// The rule list of one translation, compiled once and reusable across verses.
#[derive(Debug, Clone, Default)]
pub struct VerseFormatter {
    translation: String,
    rules: Vec<CompiledRule>,
    warnings: Vec<InvalidPatternWarning>,
}

impl VerseFormatter {
    /// Compile `rules` for `translation`, skipping any whose pattern is malformed.
    pub fn new(translation: impl Into<String>, rules: &[ProcessingRule]) -> Self {
        let translation = translation.into();
        let mut compiled = Vec::with_capacity(rules.len());
        let mut warnings = Vec::new();

        for rule in rules {
            match CompiledRule::compile(rule) {
                Ok(c) => compiled.push(c),
                Err(e) => {
                    let warning = InvalidPatternWarning {
                        translation: translation.clone(),
                        pattern: rule.pattern.clone(),
                        message: e.to_string(),
                    };
                    tracing::warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }

        Self { translation, rules: compiled, warnings }
    }

    /// A formatter with no rules; text passes through unchanged.
    pub fn passthrough(translation: impl Into<String>) -> Self {
        Self { translation: translation.into(), ..Self::default() }
    }

    /// Translation these rules belong to.
    pub fn translation(&self) -> &str {
        &self.translation
    }

    /// Rules skipped at compile time.
    pub fn warnings(&self) -> &[InvalidPatternWarning] {
        &self.warnings
    }

    /// Number of rules that will run.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule will run.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule over `text`, in order.
    pub fn format(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc))
    }
}

/// Compile and apply `rules` to a single verse.
pub fn apply_processing_rules(
    text: &str,
    rules: &[ProcessingRule],
    translation: &str,
) -> FormattedVerse {
    let formatter = VerseFormatter::new(translation, rules);
    FormattedVerse {
        text: formatter.format(text),
        warnings: formatter.warnings,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn apply(text: &str, rules: &[ProcessingRule]) -> String {
        apply_processing_rules(text, rules, "KJV").text
    }

    #[test]
    fn empty_rule_list_is_identity() {
        let out = apply_processing_rules("In the beginning", &[], "KJV");
        assert_eq!(out.text, "In the beginning");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn substitutes_capture_group() {
        let rule = ProcessingRule::new(r"\[(\w+)\]", "<em>$1</em>");
        assert_eq!(apply("the [Lord] said", &[rule]), "the <em>Lord</em> said");
    }

    #[test]
    fn replaces_every_occurrence() {
        let rule = ProcessingRule::new(r"\[(\w+)\]", "<em>$1</em>");
        assert_eq!(
            apply("[And] God [said]", &[rule]),
            "<em>And</em> God <em>said</em>"
        );
    }

    #[test]
    fn escapes_captures_when_requested() {
        let rule = ProcessingRule::escaped(r"\[([^\]]+)\]", "<em>$1</em>");
        assert_eq!(apply("the [<b>] said", &[rule]), "the <em>&lt;b&gt;</em> said");
    }

    #[test]
    fn unescaped_mode_inserts_raw_captures() {
        let rule = ProcessingRule::new(r"\[([^\]]+)\]", "<em>$1</em>");
        assert_eq!(apply("the [<b>] said", &[rule]), "the <em><b></em> said");
    }

    #[test]
    fn escapes_whole_match_but_not_template() {
        let rule = ProcessingRule::escaped(r"\[\w+\]", "<i>[$&]</i>");
        assert_eq!(apply("a [b] c", &[rule]), "a <i>[&#91;b&#93;]</i> c");
    }

    #[test]
    fn invalid_pattern_is_skipped_with_warning() {
        let rules = [
            ProcessingRule::new("(unbalanced", "x"),
            ProcessingRule::new("Lord", "LORD"),
        ];
        let out = apply_processing_rules("the Lord said", &rules, "ASV");
        assert_eq!(out.text, "the LORD said");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].pattern, "(unbalanced");
        assert_eq!(out.warnings[0].translation, "ASV");
    }

    #[test]
    fn rules_compose_sequentially() {
        let rules = [ProcessingRule::new("A", "B"), ProcessingRule::new("B", "C")];
        assert_eq!(apply("xAx", &rules), "xCx");
    }

    #[test]
    fn dollar_escapes_and_unknown_groups_stay_literal() {
        let rule = ProcessingRule::new(r"(\d+)", "$$$1 $2 $0");
        assert_eq!(apply("cost 30", &[rule]), "cost $30 $2 $0");
    }

    #[test]
    fn two_digit_group_only_when_present() {
        let rule = ProcessingRule::new(r"(a)", "$10");
        assert_eq!(apply("a", &[rule]), "a0");

        let pattern = "(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)";
        let rule = ProcessingRule::new(pattern, "$10-$1");
        assert_eq!(apply("abcdefghij", &[rule]), "j-a");
    }

    #[test]
    fn non_participating_group_is_empty() {
        let rule = ProcessingRule::new(r"(x)?y", "[$1]");
        assert_eq!(apply("y", &[rule]), "[]");
    }

    #[test]
    fn formatter_is_reusable_across_verses() {
        let formatter = VerseFormatter::new("KJV", &[ProcessingRule::new("LORD", "Lord")]);
        assert_eq!(formatter.len(), 1);
        assert_eq!(formatter.format("the LORD is"), "the Lord is");
        assert_eq!(formatter.format("O LORD"), "O Lord");
    }

    #[test]
    fn escape_table() {
        assert_eq!(escape_html("a&b<c>[d]"), "a&amp;b&lt;c&gt;&#91;d&#93;");
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn deserializes_data_file_field_names() {
        let rule: ProcessingRule =
            serde_json::from_str(r#"{"regex":"\\[\\w+\\]","formatting":"<em>$&</em>"}"#).unwrap();
        assert_eq!(rule.pattern, r"\[\w+\]");
        assert_eq!(rule.replacement, "<em>$&</em>");
        assert!(!rule.escape_captures);
    }
}
