//! Shader Nodes
//!
//! Reusable GLSL fragments with typed inputs and outputs, composed into a
//! shader by wiring outputs of one node to inputs of another.
//!
//! # Overview
//!
//! - [`ShaderNodeDefinition`]: the reusable part, loaded from a
//!   `ShaderNodeDefinitions` file and cached in a [`DefinitionRepository`]
//! - [`ShaderNode`]: a named use of a definition inside a technique, with its
//!   input and output [`VariableMapping`]s
//! - [`GraphBuilder`]: resolves mappings across namespaces, validates types
//!   and collects declarations into a [`ShaderGenerationInfo`]
//! - [`ConditionParser`]: rewrites activation conditions into preprocessor
//!   expressions

pub mod condition;
pub mod definition;
pub mod graph;
pub mod node;
pub mod repository;
pub mod variable;

pub use condition::ConditionParser;
pub use definition::{NodeSource, ShaderNodeDefinition};
pub use graph::GraphBuilder;
pub use node::{ShaderGenerationInfo, ShaderNode};
pub use repository::{DefinitionFile, DefinitionRepository};
pub use variable::{Namespace, ShaderNodeVariable, VariableMapping};
