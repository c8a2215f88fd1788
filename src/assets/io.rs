use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{MaterialError, Result};
use crate::statement::Statement;

/// Asset access needed by the compiler.
///
/// Block-structured files arrive already parsed into statement trees; node
/// sources arrive as text. Texture data is never read, only checked for
/// existence.
pub trait AssetProvider: Send + Sync {
    /// Root statements of a material, technique or node definition file.
    fn load_statements(&self, key: &str) -> Result<Vec<Statement>>;

    /// Raw text of a shader node source file.
    fn load_source(&self, path: &str) -> Result<String>;

    /// `true` if anything is registered under `key`.
    fn contains(&self, key: &str) -> bool;
}

/// In-memory asset provider, used by tools and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    statements: FxHashMap<String, Vec<Statement>>,
    sources: FxHashMap<String, String>,
    files: FxHashSet<String>,
}

impl MemoryAssets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_statements(&mut self, key: impl Into<String>, roots: Vec<Statement>) {
        self.statements.insert(key.into(), roots);
    }

    pub fn insert_source(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(path.into(), source.into());
    }

    /// Registers an opaque file such as a texture.
    pub fn insert_file(&mut self, path: impl Into<String>) {
        self.files.insert(path.into());
    }

    #[must_use]
    pub fn with_statements(mut self, key: impl Into<String>, roots: Vec<Statement>) -> Self {
        self.insert_statements(key, roots);
        self
    }

    #[must_use]
    pub fn with_source(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert_source(path, source);
        self
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.insert_file(path);
        self
    }
}

impl AssetProvider for MemoryAssets {
    fn load_statements(&self, key: &str) -> Result<Vec<Statement>> {
        self.statements
            .get(key)
            .cloned()
            .ok_or_else(|| MaterialError::AssetNotFound(key.to_string()))
    }

    fn load_source(&self, path: &str) -> Result<String> {
        self.sources
            .get(path)
            .cloned()
            .ok_or_else(|| MaterialError::AssetNotFound(path.to_string()))
    }

    fn contains(&self, key: &str) -> bool {
        self.statements.contains_key(key)
            || self.sources.contains_key(key)
            || self.files.contains(key)
    }
}
