//! Block Statements
//!
//! Material, technique and shader-node files reach the compiler already
//! tokenized by an external block parser into a tree of [`Statement`]s: one
//! entry per line, with nested `{ ... }` blocks as children.
//!
//! Dispatch on statement keywords goes through closed keyword tables declared
//! with [`keyword_table!`], so an unknown keyword is a single `None` case at
//! every call site instead of string comparisons spread over the loaders.

use std::fmt;

/// One line of a block-structured file together with its nested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    line: String,
    line_number: usize,
    contents: Vec<Statement>,
}

impl Statement {
    /// Creates a leaf statement. `line_number` is 1-based.
    pub fn new(line_number: usize, line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            line_number,
            contents: Vec::new(),
        }
    }

    /// Attaches the statements of the block opened by this line.
    #[must_use]
    pub fn with_contents(mut self, contents: Vec<Statement>) -> Self {
        self.contents = contents;
        self
    }

    pub fn push(&mut self, child: Statement) {
        self.contents.push(child);
    }

    /// The raw line text, without the opening brace of its block.
    #[inline]
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    #[inline]
    #[must_use]
    pub fn contents(&self) -> &[Statement] {
        &self.contents
    }

    /// First token of the line: everything up to whitespace, `{` or `:`.
    #[must_use]
    pub fn keyword(&self) -> &str {
        let line = self.line.trim_start();
        let end = line
            .find(|c: char| c.is_whitespace() || c == '{' || c == ':')
            .unwrap_or(line.len());
        &line[..end]
    }

    /// Text following the keyword, trimmed, with one leading `:` removed.
    #[must_use]
    pub fn argument(&self) -> &str {
        let line = self.line.trim_start();
        let rest = line[self.keyword().len()..].trim();
        let rest = rest.strip_prefix(':').unwrap_or(rest).trim();
        rest.trim_end_matches('{').trim_end()
    }

    /// Whitespace separated tokens of the line.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.line.split_whitespace()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line_number, self.line)
    }
}

/// Lookup interface shared by every [`keyword_table!`] enum, so loaders can
/// parse any of them through one generic helper.
pub trait KeywordTable: Sized + Copy + 'static {
    fn lookup(keyword: &str) -> Option<Self>;

    /// Accepted keywords, comma separated.
    fn keywords() -> String;
}

/// Declares a closed keyword enum with a lookup table.
///
/// ```rust,ignore
/// keyword_table! {
///     pub enum Toggle { On => "On", Off => "Off" }
/// }
/// assert_eq!(Toggle::from_keyword("On"), Some(Toggle::On));
/// ```
macro_rules! keyword_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),*
        }

        impl $name {
            /// Every keyword of the table, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Looks a keyword up, `None` when the table does not contain it.
            #[must_use]
            pub fn from_keyword(keyword: &str) -> Option<Self> {
                match keyword {
                    $( $text => Some(Self::$variant), )*
                    _ => None,
                }
            }

            /// The keyword as written in source files.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )*
                }
            }

            /// Comma separated list of accepted keywords, for error messages.
            #[must_use]
            pub fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::statement::KeywordTable for $name {
            fn lookup(keyword: &str) -> Option<Self> {
                Self::from_keyword(keyword)
            }

            fn keywords() -> String {
                Self::expected()
            }
        }
    };
}

pub(crate) use keyword_table;
