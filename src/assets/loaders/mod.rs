//! Statement-tree loaders.
//!
//! - [`MaterialLoader`]: `MaterialDef` and `Material` files
//! - [`ShaderNodeDefinitionLoader`]: `ShaderNodeDefinitions` files
//!
//! Both accept the same root shapes: exactly one root statement, or the
//! two-statement `Exception <message>` sentinel written by tools that failed
//! to produce the file.

pub mod material;
pub mod render_state;
pub mod shader_node;
pub mod technique;
pub mod values;

pub use material::{MaterialAsset, MaterialLoader};
pub use shader_node::{LoaderSettings, ShaderNodeDefinitionLoader};

use crate::errors::{MaterialError, Result};
use crate::statement::{KeywordTable, Statement};

/// Returns the single root statement of a file.
pub(crate) fn root_statement<'a>(file: &str, roots: &'a [Statement]) -> Result<&'a Statement> {
    match roots {
        [root] => Ok(root),
        [sentinel, _] if sentinel.keyword() == "Exception" => {
            Err(MaterialError::Embedded(sentinel.argument().to_string()))
        }
        [first, ..] => Err(MaterialError::syntax(
            file,
            first,
            format!("Expected exactly one root statement, found {}", roots.len()),
        )),
        [] => Err(MaterialError::Syntax {
            file: file.to_string(),
            line: 0,
            text: String::new(),
            message: "File contains no statements".to_string(),
        }),
    }
}

/// Parses `On`/`Off`.
pub(crate) fn parse_toggle(file: &str, statement: &Statement, token: &str) -> Result<bool> {
    match token {
        "On" => Ok(true),
        "Off" => Ok(false),
        other => Err(MaterialError::syntax(
            file,
            statement,
            format!("Expected On or Off, got '{other}'"),
        )),
    }
}

/// Parses a keyword of table `T`, naming the accepted keywords on failure.
pub(crate) fn parse_keyword<T: KeywordTable>(
    file: &str,
    statement: &Statement,
    token: &str,
) -> Result<T> {
    T::lookup(token).ok_or_else(|| {
        MaterialError::syntax(
            file,
            statement,
            format!("Expected one of {}, got '{token}'", T::keywords()),
        )
    })
}

/// Parses a float token.
pub(crate) fn parse_float(file: &str, statement: &Statement, token: &str) -> Result<f32> {
    token.parse::<f32>().map_err(|_| {
        MaterialError::syntax(file, statement, format!("Expected a float, got '{token}'"))
    })
}
