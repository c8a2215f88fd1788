//! Boolean condition expressions.
//!
//! Node and mapping conditions are written over material parameter names
//! (`DiffuseMap && !VertexColor`). Before they reach generated source every
//! identifier is rewritten to a `defined(NAME)` test on the upper-cased
//! define the parameter drives.

/// Extracts identifiers from a condition and keeps the rewritten expression
/// of the last call.
#[derive(Debug, Clone, Default)]
pub struct ConditionParser {
    formatted: String,
}

impl ConditionParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifiers of `expression` in first-occurrence order,
    /// each listed once.
    ///
    /// `#if`, `#ifdef` and `defined` are dropped before scanning; numeric
    /// tokens are copied through unchanged. The rewritten expression is
    /// available from [`formatted_expression`](Self::formatted_expression).
    pub fn extract_defines(&mut self, expression: &str) -> Vec<String> {
        let mut defines: Vec<String> = Vec::new();
        let mut formatted = String::with_capacity(expression.len() * 2);
        let mut chars = expression.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            if is_word(c) {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !is_word(next) {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                let word = &expression[start..end];
                if word == "defined" {
                    continue;
                }
                if c.is_ascii_digit() {
                    formatted.push_str(word);
                    continue;
                }
                formatted.push_str("defined(");
                formatted.push_str(&word.to_uppercase());
                formatted.push(')');
                if !defines.iter().any(|d| d == word) {
                    defines.push(word.to_string());
                }
            } else if c == '#' {
                // `#if` / `#ifdef` directive prefix
                let rest = &expression[start + 1..];
                let directive = rest
                    .find(|ch: char| !is_word(ch))
                    .map_or(rest, |end| &rest[..end]);
                if directive == "if" || directive == "ifdef" {
                    for _ in 0..directive.len() {
                        chars.next();
                    }
                    while chars.peek().is_some_and(|&(_, ch)| ch.is_whitespace()) {
                        chars.next();
                    }
                } else {
                    formatted.push(c);
                }
            } else {
                formatted.push(c);
            }
        }

        self.formatted = formatted;
        defines
    }

    /// Expression of the last [`extract_defines`](Self::extract_defines) call
    /// with every identifier rewritten to `defined(UPPER)`.
    #[must_use]
    pub fn formatted_expression(&self) -> &str {
        &self.formatted
    }
}

#[inline]
fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Combines two optional conditions with `||`. `None` means "always", so
/// either side being `None` yields `None`.
#[must_use]
pub fn or_conditions(left: Option<&str>, right: Option<&str>) -> Option<String> {
    match (left, right) {
        (Some(l), Some(r)) if l == r => Some(l.to_string()),
        (Some(l), Some(r)) => Some(format!("({l})||({r})")),
        _ => None,
    }
}

/// Combines two optional conditions with `&&`. `None` is neutral.
#[must_use]
pub fn and_conditions(left: Option<&str>, right: Option<&str>) -> Option<String> {
    match (left, right) {
        (Some(l), Some(r)) if l == r => Some(l.to_string()),
        (Some(l), Some(r)) => Some(format!("({l})&&({r})")),
        (Some(c), None) | (None, Some(c)) => Some(c.to_string()),
        (None, None) => None,
    }
}
