#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! # Myth Shader Nodes
//!
//! Material compiler for the Myth engine. It reads block-structured material,
//! technique and shader-node definition files, wires shader nodes into a
//! per-technique graph, validates every edge of that graph and emits GLSL
//! source per pipeline stage together with a `#define` prologue.
//!
//! # Pipeline
//!
//! ```text
//! Statement tree ──► ShaderNodeDefinitionLoader ──► DefinitionRepository
//!        │                                               │
//!        └────────► MaterialLoader ──► GraphBuilder ◄────┘
//!                        │                  │
//!                        ▼                  ▼
//!               MaterialDefinition   ShaderGenerationInfo + ShaderNodes
//!                                           │
//!                                           ▼
//!                                    ShaderGenerator ──► GLSL per stage
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use myth_shadernodes::prelude::*;
//!
//! let loader = MaterialLoader::new(assets, Arc::new(DefinitionRepository::default()));
//! let definition = loader.load_definition("Materials/Unshaded.j3md")?;
//! let technique = definition.default_technique().unwrap();
//!
//! let generator = ShaderGenerator::new(GlslCaps::new(150));
//! let shader = generator.generate(loader.assets(), technique)?;
//! ```

pub mod assets;
pub mod errors;
pub mod generator;
pub mod resources;
pub mod shader_nodes;
pub mod statement;

pub use assets::{AssetProvider, AssetStorage, MaterialAsset, MaterialLoader, MemoryAssets};
pub use errors::{MaterialError, Result};
pub use generator::{GeneratedShader, GlslCaps, ShaderGenerator};
pub use resources::{
    DefineTable, MaterialDefinition, MaterialInstance, MaterialParameter, ParamValue,
    RenderState, ShaderStage, TechniqueDefinition, VarType, WorldBinding,
};
pub use shader_nodes::{
    ConditionParser, DefinitionRepository, ShaderGenerationInfo, ShaderNode,
    ShaderNodeDefinition, ShaderNodeVariable, VariableMapping,
};
pub use statement::Statement;

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::assets::loaders::LoaderSettings;
    pub use crate::assets::{AssetProvider, MaterialAsset, MaterialLoader, MemoryAssets};
    pub use crate::errors::{MaterialError, Result};
    pub use crate::generator::{GeneratedShader, GlslCaps, ShaderGenerator};
    pub use crate::resources::{
        DefineTable, MaterialDefinition, MaterialInstance, TechniqueDefinition, VarType,
    };
    pub use crate::shader_nodes::DefinitionRepository;
    pub use crate::statement::Statement;
}
