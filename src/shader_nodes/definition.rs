//! Shader-node definitions: the reusable half of a shader node.

use serde::Serialize;
use smallvec::SmallVec;

use crate::resources::technique::ShaderStage;
use crate::shader_nodes::variable::ShaderNodeVariable;

/// One `Shader <Lang> : <path>` entry of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSource {
    pub language: String,
    pub path: String,
}

impl NodeSource {
    /// Numeric version of a `GLSL<N>` language tag, `0` for anything else.
    #[must_use]
    pub fn version(&self) -> u32 {
        language_version(&self.language)
    }
}

/// Parses `GLSL150` as `150`.
#[must_use]
pub fn language_version(language: &str) -> u32 {
    language
        .strip_prefix("GLSL")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShaderNodeDefinition {
    pub name: String,
    pub stage: ShaderStage,
    /// Sorted by increasing language version.
    pub sources: SmallVec<[NodeSource; 2]>,
    pub inputs: Vec<ShaderNodeVariable>,
    pub outputs: Vec<ShaderNodeVariable>,
    /// `Output { None }`: the node has side effects only and is never pruned.
    pub no_output: bool,
    pub documentation: Option<String>,
    /// File the definition was loaded from.
    pub path: String,
}

impl ShaderNodeDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage: ShaderStage::Vertex,
            sources: SmallVec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            no_output: false,
            documentation: None,
            path: path.into(),
        }
    }

    /// Adds a source, keeping the list ordered by language version.
    pub fn add_source(&mut self, language: impl Into<String>, path: impl Into<String>) {
        let source = NodeSource {
            language: language.into(),
            path: path.into(),
        };
        let at = self
            .sources
            .iter()
            .position(|s| s.version() > source.version())
            .unwrap_or(self.sources.len());
        self.sources.insert(at, source);
    }

    /// Highest source not above `max_version`; the first source when none
    /// qualifies.
    #[must_use]
    pub fn select_source(&self, max_version: u32) -> Option<&NodeSource> {
        self.sources
            .iter()
            .rev()
            .find(|s| s.version() <= max_version)
            .or_else(|| self.sources.first())
    }

    #[must_use]
    pub fn input(&self, name: &str) -> Option<&ShaderNodeVariable> {
        self.inputs.iter().find(|v| v.name == name)
    }

    #[must_use]
    pub fn output(&self, name: &str) -> Option<&ShaderNodeVariable> {
        self.outputs.iter().find(|v| v.name == name)
    }
}
