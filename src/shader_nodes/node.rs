use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::resources::technique::ShaderStage;
use crate::shader_nodes::definition::ShaderNodeDefinition;
use crate::shader_nodes::variable::{Namespace, ShaderNodeVariable, VariableMapping};

/// A shader node: a named instance of a definition wired into a technique.
#[derive(Debug, Clone, Serialize)]
pub struct ShaderNode {
    pub name: String,
    pub definition: Arc<ShaderNodeDefinition>,
    /// Formatted `defined(...)` expression, `None` when always active.
    pub condition: Option<String>,
    pub input_mappings: Vec<VariableMapping>,
    pub output_mappings: Vec<VariableMapping>,
}

impl ShaderNode {
    #[must_use]
    pub fn new(name: impl Into<String>, definition: Arc<ShaderNodeDefinition>) -> Self {
        Self {
            name: name.into(),
            definition,
            condition: None,
            input_mappings: Vec::new(),
            output_mappings: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> ShaderStage {
        self.definition.stage
    }

    /// Input mapping whose left side is the definition input `name`.
    #[must_use]
    pub fn input_mapping(&self, name: &str) -> Option<&VariableMapping> {
        self.input_mappings.iter().find(|m| m.left.name == name)
    }
}

/// Declarations a node technique needs, collected by the graph builder and
/// consumed by the generator.
#[derive(Debug, Clone, Default)]
pub struct ShaderGenerationInfo {
    pub attributes: Vec<ShaderNodeVariable>,
    pub vertex_uniforms: Vec<ShaderNodeVariable>,
    pub fragment_uniforms: Vec<ShaderNodeVariable>,
    pub varyings: Vec<ShaderNodeVariable>,
    /// The single vertex-stage output, usually `Global.position`.
    pub vertex_global: Option<ShaderNodeVariable>,
    /// Fragment outputs; more than one enables multiple render targets.
    pub fragment_globals: Vec<ShaderNodeVariable>,
    /// Nodes no mapping has consumed yet. Whatever remains after the graph
    /// is built is dead and skipped by the generator.
    pub unused_nodes: FxHashSet<String>,
}

impl ShaderGenerationInfo {
    #[must_use]
    pub fn uniforms(&self, stage: ShaderStage) -> &[ShaderNodeVariable] {
        match stage {
            ShaderStage::Vertex => &self.vertex_uniforms,
            ShaderStage::Fragment => &self.fragment_uniforms,
            _ => &[],
        }
    }

    /// `true` when `namespace.name` is declared as a varying.
    #[must_use]
    pub fn is_varying(&self, namespace: &Namespace, name: &str) -> bool {
        self.varyings
            .iter()
            .any(|v| v.namespace == *namespace && v.name == name)
    }

    #[must_use]
    pub fn is_unused(&self, node: &str) -> bool {
        self.unused_nodes.contains(node)
    }
}
