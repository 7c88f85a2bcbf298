//! Response matching.
//!
//! Decides whether a submitted value satisfies an authored match pattern.
//! Each interaction style has its own [`ResponseMatcher`] that parses the
//! raw value and the pattern into comparable typed values. [`matches`]
//! selects the matcher with an exhaustive `match` on the style, so a new
//! style is a new enum variant plus a matcher, with no change to the
//! evaluator.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::ops::Bound;

use crate::error::MatchError;
use crate::model::{Interaction, InteractionStyle, SelectMode};

/// Pattern that matches any non-blank response, whatever the style.
pub const WILDCARD: &str = "*";

/// Relative tolerance for exact numeric patterns.
const NUMERIC_TOLERANCE: f64 = 1e-9;

/// Decide whether `raw_value` satisfies `pattern` for the given interaction.
///
/// An absent pattern matches unconditionally (the "else" branch of a part).
pub fn matches(
    interaction: &Interaction,
    pattern: Option<&str>,
    raw_value: &str,
) -> Result<bool, MatchError> {
    let Some(pattern) = pattern else {
        return Ok(true);
    };

    let value = decode_lenient(raw_value);

    if pattern.trim() == WILDCARD {
        return Ok(!value.trim().is_empty());
    }

    match interaction.style {
        InteractionStyle::MultipleChoice | InteractionStyle::ImageHotspot => {
            ChoiceSetMatcher.evaluate(interaction, pattern, &value)
        }
        InteractionStyle::FillInTheBlank => SingleChoiceMatcher.evaluate(interaction, pattern, &value),
        InteractionStyle::Ordering => OrderingMatcher.evaluate(interaction, pattern, &value),
        InteractionStyle::Numeric => NumericMatcher.evaluate(interaction, pattern, &value),
        InteractionStyle::Text | InteractionStyle::ShortAnswer => {
            TextMatcher.evaluate(interaction, pattern, &value)
        }
        InteractionStyle::Essay => EssayMatcher.evaluate(interaction, pattern, &value),
    }
}

/// Check that an authored pattern parses for the interaction's style.
pub fn check_pattern(interaction: &Interaction, pattern: &str) -> Result<(), MatchError> {
    if pattern.trim() == WILDCARD {
        return Ok(());
    }
    match interaction.style {
        InteractionStyle::MultipleChoice | InteractionStyle::ImageHotspot => {
            ChoiceSetMatcher.parse_pattern(interaction, pattern).map(drop)
        }
        InteractionStyle::FillInTheBlank => {
            SingleChoiceMatcher.parse_pattern(interaction, pattern).map(drop)
        }
        InteractionStyle::Ordering => OrderingMatcher.parse_pattern(interaction, pattern).map(drop),
        InteractionStyle::Numeric => NumericMatcher.parse_pattern(interaction, pattern).map(drop),
        InteractionStyle::Text | InteractionStyle::ShortAnswer => {
            TextMatcher.parse_pattern(interaction, pattern).map(drop)
        }
        InteractionStyle::Essay => EssayMatcher.parse_pattern(interaction, pattern).map(drop),
    }
}

/// URL-decode a submitted value (`+` as space, then percent escapes).
///
/// Values that do not decode to UTF-8 are used as submitted. This lenience
/// is intentional: clients are not required to encode their values.
pub fn decode_lenient(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::debug!("using undecoded value '{raw}': {e}");
            raw.to_string()
        }
    }
}

/// Parse/compare rule for one family of interaction styles.
pub trait ResponseMatcher {
    /// Typed form of a submitted value.
    type Input;
    /// Typed form of an authored pattern.
    type Pattern;

    fn parse_input(&self, interaction: &Interaction, value: &str) -> Result<Self::Input, MatchError>;

    fn parse_pattern(
        &self,
        interaction: &Interaction,
        pattern: &str,
    ) -> Result<Self::Pattern, MatchError>;

    fn compare(&self, pattern: &Self::Pattern, input: &Self::Input) -> bool;

    /// Parse the value, then the pattern, then compare.
    fn evaluate(
        &self,
        interaction: &Interaction,
        pattern: &str,
        value: &str,
    ) -> Result<bool, MatchError> {
        let input = self.parse_input(interaction, value)?;
        let pattern = self.parse_pattern(interaction, pattern)?;
        Ok(self.compare(&pattern, &input))
    }
}

fn split_values(text: &str) -> Vec<&str> {
    text.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect()
}

/// Split a comma-separated selection and check every value against the
/// interaction's declared choices or hotspots.
fn parse_selection<'t>(
    interaction: &Interaction,
    text: &'t str,
    make_err: fn(&str, String) -> MatchError,
) -> Result<Vec<&'t str>, MatchError> {
    let values = split_values(text);
    if values.is_empty() {
        return Err(make_err(text, "no values selected".into()));
    }
    if let Some(known) = interaction.known_values() {
        if let Some(unknown) = values.iter().find(|v| !known.contains(v)) {
            return Err(make_err(
                text,
                format!("'{unknown}' is not a value of interaction '{}'", interaction.id),
            ));
        }
    }
    Ok(values)
}

fn input_error(value: &str, reason: String) -> MatchError {
    MatchError::input(value, reason)
}

fn pattern_error(pattern: &str, reason: String) -> MatchError {
    MatchError::pattern(pattern, reason)
}

// ---------------------------------------------------------------------------
// Choice-based styles
// ---------------------------------------------------------------------------

/// Multiple choice and image hotspot: set equality over selected values.
pub struct ChoiceSetMatcher;

impl ChoiceSetMatcher {
    fn to_set(
        interaction: &Interaction,
        text: &str,
        make_err: fn(&str, String) -> MatchError,
    ) -> Result<BTreeSet<String>, MatchError> {
        let set: BTreeSet<String> = parse_selection(interaction, text, make_err)?
            .into_iter()
            .map(String::from)
            .collect();
        if interaction.select_mode() == SelectMode::Single && set.len() > 1 {
            return Err(make_err(
                text,
                format!(
                    "single-select interaction '{}' cannot take {} values",
                    interaction.id,
                    set.len()
                ),
            ));
        }
        Ok(set)
    }
}

impl ResponseMatcher for ChoiceSetMatcher {
    type Input = BTreeSet<String>;
    type Pattern = BTreeSet<String>;

    fn parse_input(&self, interaction: &Interaction, value: &str) -> Result<Self::Input, MatchError> {
        Self::to_set(interaction, value, input_error)
    }

    fn parse_pattern(
        &self,
        interaction: &Interaction,
        pattern: &str,
    ) -> Result<Self::Pattern, MatchError> {
        Self::to_set(interaction, pattern, pattern_error)
    }

    fn compare(&self, pattern: &Self::Pattern, input: &Self::Input) -> bool {
        pattern == input
    }
}

/// Fill in the blank: one value, usually picked from a dropdown of choices.
pub struct SingleChoiceMatcher;

impl SingleChoiceMatcher {
    fn to_value(
        interaction: &Interaction,
        text: &str,
        make_err: fn(&str, String) -> MatchError,
    ) -> Result<String, MatchError> {
        let value = text.trim();
        if value.is_empty() {
            return Err(make_err(text, "empty value".into()));
        }
        if let Some(known) = interaction.known_values() {
            if !known.contains(&value) {
                return Err(make_err(
                    text,
                    format!("'{value}' is not a value of interaction '{}'", interaction.id),
                ));
            }
        }
        Ok(value.to_string())
    }
}

impl ResponseMatcher for SingleChoiceMatcher {
    type Input = String;
    type Pattern = String;

    fn parse_input(&self, interaction: &Interaction, value: &str) -> Result<Self::Input, MatchError> {
        Self::to_value(interaction, value, input_error)
    }

    fn parse_pattern(
        &self,
        interaction: &Interaction,
        pattern: &str,
    ) -> Result<Self::Pattern, MatchError> {
        Self::to_value(interaction, pattern, pattern_error)
    }

    fn compare(&self, pattern: &Self::Pattern, input: &Self::Input) -> bool {
        pattern == input
    }
}

/// Ordering: sequence equality.
pub struct OrderingMatcher;

impl OrderingMatcher {
    fn to_sequence(
        interaction: &Interaction,
        text: &str,
        make_err: fn(&str, String) -> MatchError,
    ) -> Result<Vec<String>, MatchError> {
        let values = parse_selection(interaction, text, make_err)?;
        let mut seen = BTreeSet::new();
        if let Some(dup) = values.iter().find(|v| !seen.insert(**v)) {
            return Err(make_err(text, format!("'{dup}' appears more than once")));
        }
        Ok(values.into_iter().map(String::from).collect())
    }
}

impl ResponseMatcher for OrderingMatcher {
    type Input = Vec<String>;
    type Pattern = Vec<String>;

    fn parse_input(&self, interaction: &Interaction, value: &str) -> Result<Self::Input, MatchError> {
        Self::to_sequence(interaction, value, input_error)
    }

    fn parse_pattern(
        &self,
        interaction: &Interaction,
        pattern: &str,
    ) -> Result<Self::Pattern, MatchError> {
        Self::to_sequence(interaction, pattern, pattern_error)
    }

    fn compare(&self, pattern: &Self::Pattern, input: &Self::Input) -> bool {
        pattern == input
    }
}

// ---------------------------------------------------------------------------
// Numeric
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

/// Parsed numeric pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericPattern {
    /// `3.5`
    Exact(f64),
    /// `[1,5]`, `(1,5)`, `[1,5)`, `(,5]`
    Range { lower: Bound<f64>, upper: Bound<f64> },
    /// `<5`, `<=5`, `>5`, `>=5`, `=5`
    Compare(Comparison, f64),
}

impl NumericPattern {
    pub fn contains(&self, x: f64) -> bool {
        match *self {
            NumericPattern::Exact(v) => approx_eq(v, x),
            NumericPattern::Range { lower, upper } => {
                let above = match lower {
                    Bound::Included(l) => x >= l || approx_eq(x, l),
                    Bound::Excluded(l) => x > l && !approx_eq(x, l),
                    Bound::Unbounded => true,
                };
                let below = match upper {
                    Bound::Included(u) => x <= u || approx_eq(x, u),
                    Bound::Excluded(u) => x < u && !approx_eq(x, u),
                    Bound::Unbounded => true,
                };
                above && below
            }
            NumericPattern::Compare(op, v) => match op {
                Comparison::Lt => x < v && !approx_eq(x, v),
                Comparison::Le => x <= v || approx_eq(x, v),
                Comparison::Gt => x > v && !approx_eq(x, v),
                Comparison::Ge => x >= v || approx_eq(x, v),
                Comparison::Eq => approx_eq(x, v),
            },
        }
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= NUMERIC_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric: exact value, interval or comparison.
pub struct NumericMatcher;

impl NumericMatcher {
    fn parse_bound(pattern: &str, text: &str, inclusive: bool) -> Result<Bound<f64>, MatchError> {
        if text.trim().is_empty() {
            return Ok(Bound::Unbounded);
        }
        let value = parse_number(text)
            .ok_or_else(|| MatchError::pattern(pattern, format!("'{}' is not a number", text.trim())))?;
        Ok(if inclusive {
            Bound::Included(value)
        } else {
            Bound::Excluded(value)
        })
    }

    fn parse_range(pattern: &str, trimmed: &str) -> Result<NumericPattern, MatchError> {
        let lower_inclusive = trimmed.starts_with('[');
        let upper_inclusive = trimmed.ends_with(']');
        let inner = &trimmed[1..trimmed.len() - 1];
        let Some((low, high)) = inner.split_once(',') else {
            return Err(MatchError::pattern(pattern, "interval needs two bounds separated by ','"));
        };
        let lower = Self::parse_bound(pattern, low, lower_inclusive)?;
        let upper = Self::parse_bound(pattern, high, upper_inclusive)?;

        if let (Bound::Included(l) | Bound::Excluded(l), Bound::Included(u) | Bound::Excluded(u)) =
            (lower, upper)
        {
            if l > u {
                return Err(MatchError::pattern(pattern, "lower bound exceeds upper bound"));
            }
        }
        Ok(NumericPattern::Range { lower, upper })
    }
}

impl ResponseMatcher for NumericMatcher {
    type Input = f64;
    type Pattern = NumericPattern;

    fn parse_input(&self, _interaction: &Interaction, value: &str) -> Result<Self::Input, MatchError> {
        parse_number(value).ok_or_else(|| MatchError::input(value, "not a finite number"))
    }

    fn parse_pattern(
        &self,
        _interaction: &Interaction,
        pattern: &str,
    ) -> Result<Self::Pattern, MatchError> {
        let trimmed = pattern.trim();

        if trimmed.len() >= 2
            && (trimmed.starts_with('[') || trimmed.starts_with('('))
            && (trimmed.ends_with(']') || trimmed.ends_with(')'))
        {
            return Self::parse_range(pattern, trimmed);
        }

        let (op, rest) = if let Some(rest) = trimmed.strip_prefix("<=") {
            (Some(Comparison::Le), rest)
        } else if let Some(rest) = trimmed.strip_prefix(">=") {
            (Some(Comparison::Ge), rest)
        } else if let Some(rest) = trimmed.strip_prefix('<') {
            (Some(Comparison::Lt), rest)
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            (Some(Comparison::Gt), rest)
        } else if let Some(rest) = trimmed.strip_prefix('=') {
            (Some(Comparison::Eq), rest)
        } else {
            (None, trimmed)
        };

        let value = parse_number(rest)
            .ok_or_else(|| MatchError::pattern(pattern, "not a number, interval or comparison"))?;

        Ok(match op {
            Some(op) => NumericPattern::Compare(op, value),
            None => NumericPattern::Exact(value),
        })
    }

    fn compare(&self, pattern: &Self::Pattern, input: &Self::Input) -> bool {
        pattern.contains(*input)
    }
}

// ---------------------------------------------------------------------------
// Free text
// ---------------------------------------------------------------------------

/// Text and short answer: whitespace-normalized equality.
pub struct TextMatcher;

impl TextMatcher {
    fn normalize(text: &str, case_sensitive: bool) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if case_sensitive {
            collapsed
        } else {
            collapsed.to_lowercase()
        }
    }
}

impl ResponseMatcher for TextMatcher {
    type Input = String;
    type Pattern = String;

    fn parse_input(&self, interaction: &Interaction, value: &str) -> Result<Self::Input, MatchError> {
        let normalized = Self::normalize(value, interaction.is_case_sensitive());
        if normalized.is_empty() {
            return Err(MatchError::input(value, "empty response"));
        }
        Ok(normalized)
    }

    fn parse_pattern(
        &self,
        interaction: &Interaction,
        pattern: &str,
    ) -> Result<Self::Pattern, MatchError> {
        let normalized = Self::normalize(pattern, interaction.is_case_sensitive());
        if normalized.is_empty() {
            return Err(MatchError::pattern(pattern, "empty pattern"));
        }
        Ok(normalized)
    }

    fn compare(&self, pattern: &Self::Pattern, input: &Self::Input) -> bool {
        pattern == input
    }
}

/// Essay: graded by people. Only the wildcard pattern can match.
pub struct EssayMatcher;

impl ResponseMatcher for EssayMatcher {
    type Input = String;
    type Pattern = Infallible;

    fn parse_input(&self, _interaction: &Interaction, value: &str) -> Result<Self::Input, MatchError> {
        Ok(value.to_string())
    }

    fn parse_pattern(
        &self,
        interaction: &Interaction,
        pattern: &str,
    ) -> Result<Self::Pattern, MatchError> {
        Err(MatchError::pattern(
            pattern,
            format!(
                "essay interaction '{}' only accepts the '{WILDCARD}' pattern",
                interaction.id
            ),
        ))
    }

    fn compare(&self, pattern: &Self::Pattern, _input: &Self::Input) -> bool {
        match *pattern {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, Hotspot};

    fn interaction(style: InteractionStyle) -> Interaction {
        Interaction {
            id: "i1".into(),
            style,
            multiple_select: false,
            choices: vec![],
            hotspots: vec![],
            image: None,
            labels: vec![],
            size: None,
            notation: None,
            case_sensitive: None,
            override_value: None,
        }
    }

    fn with_choices(style: InteractionStyle, values: &[&str]) -> Interaction {
        let mut i = interaction(style);
        i.choices = values
            .iter()
            .map(|v| Choice {
                value: v.to_string(),
                color: None,
                body: format!("choice {v}"),
            })
            .collect();
        i
    }

    #[test]
    fn absent_pattern_always_matches() {
        let i = interaction(InteractionStyle::Numeric);
        assert!(matches(&i, None, "not even a number").unwrap());
    }

    #[test]
    fn wildcard_matches_any_non_blank_response() {
        let i = interaction(InteractionStyle::Essay);
        assert!(matches(&i, Some("*"), "a long essay").unwrap());
        assert!(!matches(&i, Some(" * "), "   ").unwrap());
    }

    #[test]
    fn decode_handles_plus_and_percent_escapes() {
        assert_eq!(decode_lenient("a%2Cb"), "a,b");
        assert_eq!(decode_lenient("new+york"), "new york");
        // %FF is not valid UTF-8, the original value is kept.
        assert_eq!(decode_lenient("x%FFy"), "x%FFy");
        assert_eq!(decode_lenient("plain"), "plain");
    }

    #[test]
    fn multiple_choice_single_select() {
        let i = with_choices(InteractionStyle::MultipleChoice, &["a", "b"]);
        assert!(matches(&i, Some("a"), "a").unwrap());
        assert!(!matches(&i, Some("a"), "b").unwrap());

        let err = matches(&i, Some("a"), "a,b").unwrap_err();
        assert!(matches!(err, MatchError::InputFormat { .. }));

        let err = matches(&i, Some("z"), "a").unwrap_err();
        assert!(matches!(err, MatchError::PatternFormat { .. }));

        let err = matches(&i, Some("a"), "c").unwrap_err();
        assert!(matches!(err, MatchError::InputFormat { .. }));
    }

    #[test]
    fn multiple_select_uses_set_equality() {
        let mut i = with_choices(InteractionStyle::MultipleChoice, &["a", "b", "c"]);
        i.multiple_select = true;
        assert!(matches(&i, Some("a,c"), "c,a").unwrap());
        assert!(matches(&i, Some("a, c"), "c%2Ca").unwrap());
        assert!(!matches(&i, Some("a,c"), "a").unwrap());
        assert!(!matches(&i, Some("a,c"), "a,b,c").unwrap());
    }

    #[test]
    fn hotspots_are_multi_select_over_hotspot_values() {
        let mut i = interaction(InteractionStyle::ImageHotspot);
        i.hotspots = ["h1", "h2"]
            .iter()
            .map(|v| Hotspot {
                value: v.to_string(),
                shape: "circle".into(),
                coordinates: "10,10,5".into(),
                label: String::new(),
            })
            .collect();
        assert!(matches(&i, Some("h1,h2"), "h2,h1").unwrap());
        assert!(matches(&i, Some("h3"), "h1").is_err());
    }

    #[test]
    fn fill_in_the_blank_compares_one_value() {
        let i = with_choices(InteractionStyle::FillInTheBlank, &["paris", "lyon"]);
        assert!(matches(&i, Some("paris"), " paris ").unwrap());
        assert!(!matches(&i, Some("paris"), "lyon").unwrap());
        assert!(matches(&i, Some("paris"), "rome").is_err());
    }

    #[test]
    fn ordering_requires_same_sequence() {
        let i = with_choices(InteractionStyle::Ordering, &["a", "b", "c"]);
        assert!(matches(&i, Some("c,a,b"), "c,a,b").unwrap());
        assert!(!matches(&i, Some("c,a,b"), "a,b,c").unwrap());
        let err = matches(&i, Some("c,a,b"), "a,a,b").unwrap_err();
        assert!(matches!(err, MatchError::InputFormat { .. }));
    }

    #[test]
    fn numeric_exact_and_intervals() {
        let i = interaction(InteractionStyle::Numeric);
        assert!(matches(&i, Some("3.5"), "3.50").unwrap());
        assert!(matches(&i, Some("0.3"), "0.30000000000000004").unwrap());
        assert!(!matches(&i, Some("3.5"), "3.6").unwrap());

        assert!(matches(&i, Some("[1,5]"), "1").unwrap());
        assert!(matches(&i, Some("[1,5]"), "5").unwrap());
        assert!(!matches(&i, Some("(1,5)"), "1").unwrap());
        assert!(!matches(&i, Some("(1,5)"), "5").unwrap());
        assert!(matches(&i, Some("[1,5)"), "4.999").unwrap());
        assert!(matches(&i, Some("(,0]"), "-12").unwrap());
        assert!(matches(&i, Some("[1e3,)"), "2500").unwrap());
    }

    #[test]
    fn numeric_comparisons() {
        let i = interaction(InteractionStyle::Numeric);
        assert!(matches(&i, Some("<5"), "4").unwrap());
        assert!(!matches(&i, Some("<5"), "5").unwrap());
        assert!(matches(&i, Some("<=5"), "5").unwrap());
        assert!(matches(&i, Some(">=-2"), "-2").unwrap());
        assert!(!matches(&i, Some(">10"), "10").unwrap());
        assert!(matches(&i, Some("=7"), "7.0").unwrap());
    }

    #[test]
    fn numeric_format_errors() {
        let i = interaction(InteractionStyle::Numeric);
        assert!(matches!(
            matches(&i, Some("5"), "five").unwrap_err(),
            MatchError::InputFormat { .. }
        ));
        assert!(matches!(
            matches(&i, Some("5"), "inf").unwrap_err(),
            MatchError::InputFormat { .. }
        ));
        assert!(matches!(
            matches(&i, Some("[5,1]"), "3").unwrap_err(),
            MatchError::PatternFormat { .. }
        ));
        assert!(matches!(
            matches(&i, Some("[1;5]"), "3").unwrap_err(),
            MatchError::PatternFormat { .. }
        ));
        assert!(matches!(
            matches(&i, Some("about 5"), "5").unwrap_err(),
            MatchError::PatternFormat { .. }
        ));
    }

    #[test]
    fn text_respects_case_sensitivity() {
        let mut i = interaction(InteractionStyle::Text);
        assert!(matches(&i, Some("Mount  Everest"), "mount+everest").unwrap());

        i.case_sensitive = Some(true);
        assert!(!matches(&i, Some("Mount Everest"), "mount everest").unwrap());
        assert!(matches(&i, Some("Mount Everest"), " Mount Everest ").unwrap());

        let short = interaction(InteractionStyle::ShortAnswer);
        assert!(matches(&short, Some("photosynthesis"), "").is_err());
    }

    #[test]
    fn essay_rejects_literal_patterns() {
        let i = interaction(InteractionStyle::Essay);
        let err = matches(&i, Some("good answer"), "good answer").unwrap_err();
        assert!(err.is_authoring_error());
    }

    #[test]
    fn check_pattern_reports_authoring_errors() {
        let i = with_choices(InteractionStyle::MultipleChoice, &["a", "b"]);
        assert!(check_pattern(&i, "a").is_ok());
        assert!(check_pattern(&i, "*").is_ok());
        assert!(check_pattern(&i, "a,b").is_err());
        assert!(check_pattern(&interaction(InteractionStyle::Numeric), "(2,1)").is_err());
        assert!(check_pattern(&interaction(InteractionStyle::Essay), "*").is_ok());
    }

    #[test]
    fn input_is_parsed_before_pattern() {
        let i = interaction(InteractionStyle::Numeric);
        let err = matches(&i, Some("bad pattern"), "bad input").unwrap_err();
        assert!(matches!(err, MatchError::InputFormat { .. }));
    }
}
