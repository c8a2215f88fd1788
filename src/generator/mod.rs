//! Shader Code Generator
//!
//! Builds GLSL source for the vertex and fragment stages of a shader-node
//! technique.
//!
//! # Layout of a generated stage
//!
//! ```text
//! #extension ...            (hoisted from node sources)
//! uniform ...               (stage uniforms, guarded by their users' conditions)
//! attribute ... / in ...    (vertex only; inPosition always present)
//! varying ... / in|out ...
//! <node headers>            (once per definition)
//!
//! void main() {
//!     <stage globals>
//!     //Node : Begin
//!     <input mappings> <node body> <output mappings>
//!     //Node : End
//!     gl_Position / gl_FragColor / gl_FragData[i]
//! }
//! ```
//!
//! Geometry and tessellation stages exist in the model but are never
//! generated.

pub mod glsl;
pub mod splice;

pub use glsl::Dialect;

use crate::assets::io::AssetProvider;
use crate::errors::{MaterialError, Result};
use crate::resources::technique::{NodeProgram, ShaderStage, TechniqueDefinition};
use glsl::StageWriter;
use splice::hoist_extensions;

/// Shading-language capabilities of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlslCaps {
    /// Highest supported GLSL version, e.g. `100`, `150`, `330`.
    pub max_version: u32,
}

impl GlslCaps {
    #[must_use]
    pub const fn new(max_version: u32) -> Self {
        Self { max_version }
    }

    /// A version is supported when it does not exceed the maximum; support
    /// for version N implies every lower version.
    #[inline]
    #[must_use]
    pub const fn supports(&self, version: u32) -> bool {
        version <= self.max_version
    }
}

impl Default for GlslCaps {
    fn default() -> Self {
        Self::new(150)
    }
}

/// Generated sources of one node technique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedShader {
    /// Language of the sources, e.g. `GLSL150`.
    pub language: String,
    pub vertex: String,
    pub fragment: String,
    /// `#define` lines of the technique's preset defines.
    pub defines: String,
}

impl GeneratedShader {
    /// Source of `stage`; `None` for stages that are never generated.
    #[must_use]
    pub fn source(&self, stage: ShaderStage) -> Option<&str> {
        match stage {
            ShaderStage::Vertex => Some(&self.vertex),
            ShaderStage::Fragment => Some(&self.fragment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShaderGenerator {
    caps: GlslCaps,
    dialect: Dialect,
}

impl ShaderGenerator {
    #[must_use]
    pub fn new(caps: GlslCaps) -> Self {
        let dialect = if caps.supports(150) {
            Dialect::Glsl150
        } else {
            Dialect::Glsl100
        };
        Self { caps, dialect }
    }

    #[inline]
    #[must_use]
    pub fn caps(&self) -> GlslCaps {
        self.caps
    }

    #[inline]
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Generates both stages of a shader-node technique.
    pub fn generate(
        &self,
        assets: &dyn AssetProvider,
        technique: &TechniqueDefinition,
    ) -> Result<GeneratedShader> {
        let Some(program) = technique.node_program() else {
            return Err(MaterialError::WrongAssetKind {
                key: technique.name().to_string(),
                expected: "shader node technique",
            });
        };
        let vertex = self.generate_stage(assets, program, ShaderStage::Vertex)?;
        let fragment = self.generate_stage(assets, program, ShaderStage::Fragment)?;
        log::debug!(
            "Generated {} for technique '{}': vertex {} bytes, fragment {} bytes",
            self.dialect.language(),
            technique.name(),
            vertex.as_ref().map_or(0, String::len),
            fragment.as_ref().map_or(0, String::len)
        );
        Ok(GeneratedShader {
            language: self.dialect.language(),
            vertex: vertex.unwrap_or_default(),
            fragment: fragment.unwrap_or_default(),
            defines: technique.prologue().to_string(),
        })
    }

    /// Source of one stage, `None` for stages that are not generated.
    pub fn generate_stage(
        &self,
        assets: &dyn AssetProvider,
        program: &NodeProgram,
        stage: ShaderStage,
    ) -> Result<Option<String>> {
        if !stage.is_generated() {
            return Ok(None);
        }
        let source = StageWriter::new(self.dialect, stage, &program.info).write(assets, &program.nodes)?;
        Ok(Some(hoist_extensions(&source)))
    }
}
