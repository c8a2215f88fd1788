//! Error Types
//!
//! This module defines the error types used throughout the material compiler.
//!
//! # Overview
//!
//! The main error type [`MaterialError`] covers every failure that aborts a
//! load or a generation pass:
//! - Syntax errors in material, technique and shader-node files
//! - Semantic errors found while wiring the shader-node graph
//! - Embedded `Exception` sentinels re-raised from pre-parsed files
//! - Missing assets and malformed node sources
//!
//! Recoverable conditions (missing textures, dropped fixed-function
//! techniques, defines bound to unknown parameters) are never errors; they
//! are reported through `log::warn!` and processing continues.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, MaterialError>`.
//!
//! ```rust,ignore
//! use myth_shadernodes::errors::{MaterialError, Result};
//!
//! fn load() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::statement::Statement;

/// The main error type for the material compiler.
///
/// Syntax and semantic variants carry the file, the 1-based line number and
/// the text of the offending statement so callers can report them verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterialError {
    // ========================================================================
    // Parse Errors
    // ========================================================================
    /// Unexpected keyword, wrong token count or malformed expression.
    #[error("{file}:{line}: {message}\n    {text}")]
    Syntax {
        file: String,
        line: usize,
        text: String,
        message: String,
    },

    /// The statement is well formed but does not make sense in its context.
    #[error("{file}:{line}: {message}\n    {text}")]
    Semantic {
        file: String,
        line: usize,
        text: String,
        message: String,
    },

    /// A file whose root is `Exception <message>` followed by one statement.
    #[error("{0}")]
    Embedded(String),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The asset provider has nothing registered under this key.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The key resolved to an asset of another kind.
    #[error("Asset '{key}' is not a {expected}")]
    WrongAssetKind { key: String, expected: &'static str },

    // ========================================================================
    // Generation Errors
    // ========================================================================
    /// A float define cannot be represented as a GLSL literal.
    #[error("Define {name} has value {value}, GLSL does not support NaN or infinite float literals")]
    InvalidDefineValue { name: String, value: String },

    /// A node source file cannot be spliced into the generated shader.
    #[error("Shader node {node} ({path}): {message}")]
    NodeSource {
        node: String,
        path: String,
        message: String,
    },
}

impl MaterialError {
    /// Builds a [`MaterialError::Syntax`] located at `statement`.
    pub fn syntax(file: &str, statement: &Statement, message: impl Into<String>) -> Self {
        Self::Syntax {
            file: file.to_string(),
            line: statement.line_number(),
            text: statement.line().to_string(),
            message: message.into(),
        }
    }

    /// Builds a [`MaterialError::Semantic`] located at `statement`.
    pub fn semantic(file: &str, statement: &Statement, message: impl Into<String>) -> Self {
        Self::Semantic {
            file: file.to_string(),
            line: statement.line_number(),
            text: statement.line().to_string(),
            message: message.into(),
        }
    }

    /// Syntax error for a keyword that is not valid where it appears.
    pub fn unexpected(file: &str, statement: &Statement, expected: &str) -> Self {
        Self::syntax(
            file,
            statement,
            format!("Expected {expected}, got '{}'", statement.keyword()),
        )
    }

    /// Returns the 1-based line of a located error.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. } | Self::Semantic { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// `true` for errors raised while validating the node graph or bindings.
    #[must_use]
    pub fn is_semantic(&self) -> bool {
        matches!(self, Self::Semantic { .. })
    }
}

/// Alias for `Result<T, MaterialError>`.
pub type Result<T> = std::result::Result<T, MaterialError>;
