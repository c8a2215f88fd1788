//! Technique Definitions
//!
//! A technique is one concrete way of rendering a material: render state,
//! light handling and the shader program. The program is either a set of
//! shader files (one per stage, for one shading-language variant) or a
//! shader-node graph from which the generator builds the sources.
//!
//! # Defines
//!
//! A technique owns the names and types of its define slots. Slots are
//! allocated in registration order and bound to a material parameter, so a
//! material instance can evaluate its [`DefineTable`](super::DefineTable)
//! without knowing anything about the technique's source.

use rustc_hash::FxHashMap;
use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::resources::define_table::MAX_DEFINES;
use crate::resources::render_state::RenderState;
use crate::resources::var_type::VarType;
use crate::resources::world_params::WorldBinding;
use crate::shader_nodes::{ShaderGenerationInfo, ShaderNode};
use crate::statement::keyword_table;

/// Name given to a `Technique` block without a name.
pub const DEFAULT_TECHNIQUE_NAME: &str = "Default";

keyword_table! {
    pub enum ShaderStage {
        Vertex => "Vertex",
        Fragment => "Fragment",
        Geometry => "Geometry",
        TessellationControl => "TessellationControl",
        TessellationEvaluation => "TessellationEvaluation",
    }
}

impl ShaderStage {
    /// Parses a technique statement keyword such as `VertexShader`.
    #[must_use]
    pub fn from_shader_keyword(keyword: &str) -> Option<Self> {
        keyword.strip_suffix("Shader").and_then(Self::from_keyword)
    }

    /// Stages the node generator produces source for.
    #[inline]
    #[must_use]
    pub fn is_generated(self) -> bool {
        matches!(self, Self::Vertex | Self::Fragment)
    }
}

keyword_table! {
    #[derive(Default)]
    pub enum LightMode {
        #[default]
        Disable => "Disable",
        SinglePass => "SinglePass",
        MultiPass => "MultiPass",
        SinglePassAndImageBased => "SinglePassAndImageBased",
        StaticPass => "StaticPass",
    }
}

keyword_table! {
    #[derive(Default)]
    pub enum LightSpace {
        #[default]
        World => "World",
        View => "View",
        Legacy => "Legacy",
    }
}

keyword_table! {
    #[derive(Default)]
    pub enum ShadowMode {
        #[default]
        Disable => "Disable",
        InPass => "InPass",
        PostPass => "PostPass",
    }
}

/// One shader file of a file-based technique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShaderFile {
    pub stage: ShaderStage,
    pub language: String,
    pub path: String,
}

/// Node graph of a node-based technique, validated by the graph builder.
#[derive(Debug, Clone, Default)]
pub struct NodeProgram {
    pub info: ShaderGenerationInfo,
    pub nodes: Vec<ShaderNode>,
}

#[derive(Debug, Clone)]
pub enum TechniqueProgram {
    /// One file per stage, all for the same language variant.
    Files(Vec<ShaderFile>),
    Nodes(NodeProgram),
}

impl Default for TechniqueProgram {
    fn default() -> Self {
        Self::Files(Vec::new())
    }
}

#[derive(Debug, Clone)]
pub struct TechniqueDefinition {
    name: String,
    id: u64,
    light_mode: LightMode,
    light_space: Option<LightSpace>,
    shadow_mode: ShadowMode,
    render_state: Option<RenderState>,
    forced_render_state: Option<RenderState>,
    world_params: Vec<WorldBinding>,
    define_names: Vec<String>,
    define_types: Vec<VarType>,
    param_defines: FxHashMap<String, usize>,
    prologue: String,
    program: TechniqueProgram,
    no_render: bool,
}

impl TechniqueDefinition {
    /// Creates an empty technique whose identity is derived from the owning
    /// definition's asset name and the technique name.
    #[must_use]
    pub fn new(name: impl Into<String>, asset_name: &str) -> Self {
        let name = name.into();
        let id = Self::compute_id(asset_name, &name);
        Self {
            name,
            id,
            light_mode: LightMode::default(),
            light_space: None,
            shadow_mode: ShadowMode::default(),
            render_state: None,
            forced_render_state: None,
            world_params: Vec::new(),
            define_names: Vec::new(),
            define_types: Vec::new(),
            param_defines: FxHashMap::default(),
            prologue: String::new(),
            program: TechniqueProgram::default(),
            no_render: false,
        }
    }

    /// `xxh3_64("<asset>@<technique>")`
    #[must_use]
    pub fn compute_id(asset_name: &str, technique_name: &str) -> u64 {
        xxh3_64(format!("{asset_name}@{technique_name}").as_bytes())
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    // ========================================================================
    // Lighting
    // ========================================================================

    #[must_use]
    pub fn light_mode(&self) -> LightMode {
        self.light_mode
    }

    pub fn set_light_mode(&mut self, mode: LightMode) {
        self.light_mode = mode;
        // MultiPass without an explicit LightSpace uses legacy space.
        if mode == LightMode::MultiPass && self.light_space.is_none() {
            self.light_space = Some(LightSpace::Legacy);
        }
    }

    #[must_use]
    pub fn light_space(&self) -> Option<LightSpace> {
        self.light_space
    }

    pub fn set_light_space(&mut self, space: LightSpace) {
        self.light_space = Some(space);
    }

    #[must_use]
    pub fn shadow_mode(&self) -> ShadowMode {
        self.shadow_mode
    }

    pub fn set_shadow_mode(&mut self, mode: ShadowMode) {
        self.shadow_mode = mode;
    }

    // ========================================================================
    // Render state
    // ========================================================================

    #[must_use]
    pub fn render_state(&self) -> Option<&RenderState> {
        self.render_state.as_ref()
    }

    pub fn set_render_state(&mut self, state: RenderState) {
        self.render_state = Some(state);
    }

    #[must_use]
    pub fn forced_render_state(&self) -> Option<&RenderState> {
        self.forced_render_state.as_ref()
    }

    pub fn set_forced_render_state(&mut self, state: RenderState) {
        self.forced_render_state = Some(state);
    }

    #[must_use]
    pub fn is_no_render(&self) -> bool {
        self.no_render
    }

    pub fn set_no_render(&mut self, no_render: bool) {
        self.no_render = no_render;
    }

    // ========================================================================
    // World parameters
    // ========================================================================

    #[must_use]
    pub fn world_params(&self) -> &[WorldBinding] {
        &self.world_params
    }

    /// Adds a binding once. Returns `false` when it was already present.
    pub fn add_world_param(&mut self, binding: WorldBinding) -> bool {
        if self.world_params.contains(&binding) {
            return false;
        }
        self.world_params.push(binding);
        true
    }

    // ========================================================================
    // Defines
    // ========================================================================

    /// Allocates a define slot bound to a material parameter.
    ///
    /// Returns `None` when the technique already has [`MAX_DEFINES`] slots.
    pub fn add_param_define(
        &mut self,
        param_name: &str,
        var_type: VarType,
        define_name: &str,
    ) -> Option<usize> {
        let slot = self.define_names.len();
        if slot >= MAX_DEFINES {
            return None;
        }
        self.param_defines.insert(param_name.to_string(), slot);
        self.define_names.push(define_name.to_string());
        self.define_types.push(var_type);
        Some(slot)
    }

    /// Slot bound to `param_name`, if any.
    #[must_use]
    pub fn param_define_slot(&self, param_name: &str) -> Option<usize> {
        self.param_defines.get(param_name).copied()
    }

    /// Parameter-to-slot bindings, in no particular order.
    pub fn param_defines(&self) -> impl Iterator<Item = (&str, usize)> {
        self.param_defines.iter().map(|(name, slot)| (name.as_str(), *slot))
    }

    #[must_use]
    pub fn define_names(&self) -> &[String] {
        &self.define_names
    }

    #[must_use]
    pub fn define_types(&self) -> &[VarType] {
        &self.define_types
    }

    /// `#define` lines of the technique's preset defines.
    #[must_use]
    pub fn prologue(&self) -> &str {
        &self.prologue
    }

    pub fn set_prologue(&mut self, prologue: String) {
        self.prologue = prologue;
    }

    // ========================================================================
    // Program
    // ========================================================================

    #[must_use]
    pub fn program(&self) -> &TechniqueProgram {
        &self.program
    }

    pub fn set_program(&mut self, program: TechniqueProgram) {
        self.program = program;
    }

    #[must_use]
    pub fn uses_shader_nodes(&self) -> bool {
        matches!(self.program, TechniqueProgram::Nodes(_))
    }

    #[must_use]
    pub fn node_program(&self) -> Option<&NodeProgram> {
        match &self.program {
            TechniqueProgram::Nodes(program) => Some(program),
            TechniqueProgram::Files(_) => None,
        }
    }

    /// Shader files of a file-based technique; empty for node techniques.
    #[must_use]
    pub fn shader_files(&self) -> &[ShaderFile] {
        match &self.program {
            TechniqueProgram::Files(files) => files,
            TechniqueProgram::Nodes(_) => &[],
        }
    }

    /// Path of the file for `stage`, if the technique is file-based.
    #[must_use]
    pub fn shader_file(&self, stage: ShaderStage) -> Option<&ShaderFile> {
        self.shader_files().iter().find(|file| file.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_hashes_asset_and_name() {
        let a = TechniqueDefinition::new("Glow", "Materials/A.j3md");
        let b = TechniqueDefinition::new("Glow", "Materials/A.j3md");
        let c = TechniqueDefinition::new("Glow", "Materials/B.j3md");
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(a.id(), xxh3_64(b"Materials/A.j3md@Glow"));
    }

    #[test]
    fn define_slots_are_sequential_and_capped() {
        let mut technique = TechniqueDefinition::new("Default", "a");
        assert_eq!(technique.add_param_define("Color", VarType::Vector4, "COLOR"), Some(0));
        assert_eq!(technique.add_param_define("NumBones", VarType::Int, "NUM_BONES"), Some(1));
        assert_eq!(technique.param_define_slot("NumBones"), Some(1));
        for i in 2..MAX_DEFINES {
            assert!(technique.add_param_define(&format!("P{i}"), VarType::Boolean, "P").is_some());
        }
        assert_eq!(technique.add_param_define("Overflow", VarType::Boolean, "OVERFLOW"), None);
    }

    #[test]
    fn shader_stage_keywords() {
        assert_eq!(
            ShaderStage::from_shader_keyword("TessellationControlShader"),
            Some(ShaderStage::TessellationControl)
        );
        assert_eq!(ShaderStage::from_shader_keyword("Vertex"), None);
        assert!(!ShaderStage::Geometry.is_generated());
    }

    #[test]
    fn multipass_defaults_to_legacy_space() {
        let mut technique = TechniqueDefinition::new("Default", "a");
        technique.set_light_mode(LightMode::MultiPass);
        assert_eq!(technique.light_space(), Some(LightSpace::Legacy));
        assert!(technique.add_world_param(WorldBinding::Time));
        assert!(!technique.add_world_param(WorldBinding::Time));
    }
}
