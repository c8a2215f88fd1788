//! Node source splicing.
//!
//! Node sources are plain GLSL with a `void main()` holding the node body.
//! Splicing never parses GLSL: a small lexer separates identifiers from
//! everything else so renames only ever touch whole identifier tokens, never
//! substrings, swizzles or comments.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    /// Identifier; `member` is set when it follows a `.`.
    Ident { text: &'a str, member: bool },
    /// Comments, numbers, whitespace and punctuation, copied verbatim.
    Text(&'a str),
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    after_dot: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            after_dot: false,
        }
    }

    fn take_while(&mut self, start: usize, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = &self.source[start..];
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos = start + len;
        &self.source[start..self.pos]
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Piece<'a>> {
        let start = self.pos;
        let rest = &self.source[start..];
        let c = rest.chars().next()?;

        if c.is_alphabetic() || c == '_' {
            let text = self.take_while(start, is_ident_char);
            let member = self.after_dot;
            self.after_dot = false;
            return Some(Piece::Ident { text, member });
        }
        if c.is_ascii_digit() {
            // 1.0e-3, 0x1F, 2u: one token so no part of it reads as a name
            let text = self.take_while(start, |ch| is_ident_char(ch) || ch == '.');
            self.after_dot = false;
            return Some(Piece::Text(text));
        }
        if rest.starts_with("//") {
            let len = rest.find('\n').unwrap_or(rest.len());
            self.pos = start + len;
            return Some(Piece::Text(&self.source[start..self.pos]));
        }
        if rest.starts_with("/*") {
            let len = rest[2..].find("*/").map_or(rest.len(), |end| end + 4);
            self.pos = start + len;
            return Some(Piece::Text(&self.source[start..self.pos]));
        }
        if c.is_whitespace() {
            return Some(Piece::Text(self.take_while(start, char::is_whitespace)));
        }

        self.pos = start + c.len_utf8();
        self.after_dot = c == '.';
        Some(Piece::Text(&self.source[start..self.pos]))
    }
}

#[inline]
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replaces identifiers found in `renames`. Member accesses (`v.name`) are
/// left alone.
#[must_use]
pub fn rename_identifiers(source: &str, renames: &FxHashMap<String, String>) -> String {
    let mut out = String::with_capacity(source.len() + source.len() / 4);
    for piece in Lexer::new(source) {
        match piece {
            Piece::Ident {
                text,
                member: false,
            } => out.push_str(renames.get(text).map_or(text, String::as_str)),
            Piece::Ident { text, .. } | Piece::Text(text) => out.push_str(text),
        }
    }
    out
}

/// Splits a node source into its declarative header and the body of
/// `void main() { ... }`. Returns `None` when there is no `main`.
#[must_use]
pub fn split_main(source: &str) -> Option<(&str, &str)> {
    let mut pieces = Lexer::new(source);
    let mut expected = ["void", "main", "(", ")", "{"].iter();
    let mut header_end = 0;
    let mut offset = 0;

    for piece in pieces.by_ref() {
        let text = match piece {
            Piece::Ident { text, .. } | Piece::Text(text) => text,
        };
        let start = offset;
        offset += text.len();
        if text.trim().is_empty() {
            continue;
        }
        match expected.next() {
            Some(&want) if want == text => {
                if want == "void" {
                    header_end = start;
                }
                if want == "{" {
                    break;
                }
            }
            _ => {
                expected = ["void", "main", "(", ")", "{"].iter();
                if text == "void" {
                    expected.next();
                    header_end = start;
                }
            }
        }
    }
    if expected.len() != 0 {
        return None;
    }

    let body = &source[offset..];
    let body = body.rfind('}').map_or(body, |end| &body[..end]);
    Some((&source[..header_end], body))
}

/// Rewrites `#if`/`#ifdef` lines that test a node input: each such input is
/// replaced by the condition of the mapping feeding it.
#[must_use]
pub fn rewrite_input_conditions(source: &str, conditions: &FxHashMap<String, String>) -> String {
    if conditions.is_empty() {
        return source.to_string();
    }
    let mut out = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let (directive, expression) = if let Some(rest) = trimmed.strip_prefix("#ifdef") {
            ("ifdef", rest)
        } else if let Some(rest) = trimmed.strip_prefix("#if") {
            ("if", rest)
        } else {
            out.push_str(line);
            continue;
        };
        if !expression.starts_with(char::is_whitespace) {
            out.push_str(line);
            continue;
        }

        let rewritten = if directive == "ifdef" {
            let name = expression.trim();
            conditions.get(name).map(|c| format!("({c})"))
        } else {
            rewrite_expression(expression.trim(), conditions)
        };
        match rewritten {
            Some(expression) => {
                let indent = &line[..line.len() - trimmed.len()];
                out.push_str(indent);
                out.push_str("#if ");
                out.push_str(&expression);
                if line.ends_with('\n') {
                    out.push('\n');
                }
            }
            None => out.push_str(line),
        }
    }
    out
}

/// `defined(x)`, `defined x` and bare `x` become `(condition)` for mapped
/// inputs. `None` when nothing matched.
fn rewrite_expression(expression: &str, conditions: &FxHashMap<String, String>) -> Option<String> {
    let pieces: Vec<Piece<'_>> = Lexer::new(expression).collect();
    let mut out = String::with_capacity(expression.len() * 2);
    let mut matched = false;
    let mut i = 0;

    let significant = |from: usize| {
        (from..pieces.len()).find(|&j| !matches!(pieces[j], Piece::Text(t) if t.trim().is_empty()))
    };

    while i < pieces.len() {
        if let Piece::Ident {
            text: "defined", ..
        } = pieces[i]
        {
            // defined(x) / defined x
            let mut j = significant(i + 1);
            let open = j.is_some_and(|j| pieces[j] == Piece::Text("("));
            if open {
                j = j.and_then(|j| significant(j + 1));
            }
            if let Some(name_at) = j
                && let Piece::Ident { text: name, .. } = pieces[name_at]
                && let Some(condition) = conditions.get(name)
            {
                let close = if open {
                    significant(name_at + 1).filter(|&k| pieces[k] == Piece::Text(")"))
                } else {
                    Some(name_at)
                };
                if let Some(end) = close {
                    out.push('(');
                    out.push_str(condition);
                    out.push(')');
                    matched = true;
                    i = end + 1;
                    continue;
                }
            }
        }
        match pieces[i] {
            Piece::Ident { text, member: false } if conditions.contains_key(text) => {
                out.push('(');
                out.push_str(&conditions[text]);
                out.push(')');
                matched = true;
            }
            Piece::Ident { text, .. } | Piece::Text(text) => out.push_str(text),
        }
        i += 1;
    }
    matched.then_some(out)
}

/// Moves every `#extension` line to the top of `source`, once each.
#[must_use]
pub fn hoist_extensions(source: &str) -> String {
    let mut extensions: Vec<&str> = Vec::new();
    let mut rest = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with("#extension") {
            if !extensions.contains(&trimmed) {
                extensions.push(trimmed);
            }
        } else {
            rest.push_str(line);
        }
    }
    if extensions.is_empty() {
        return rest;
    }
    let mut out = extensions.join("\n");
    out.push('\n');
    out.push_str(&rest);
    out
}
