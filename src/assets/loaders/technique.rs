//! Technique Loader
//!
//! Reads one `Technique [<name>] { ... }` block of a `MaterialDef` into one
//! or more [`TechniqueDefinition`]s.
//!
//! # Program kinds
//!
//! A technique either names its shader files:
//!
//! ```text
//! Technique {
//!     VertexShader GLSL310 GLSL150 : Shaders/Unshaded.vert
//!     FragmentShader GLSL310 GLSL150 : Shaders/Unshaded.frag
//! }
//! ```
//!
//! which registers one technique per language variant (here two, sharing
//! the technique's identity and defines), or builds its program from
//! shader nodes (`VertexShaderNodes` / `FragmentShaderNodes`), which
//! registers exactly one technique. The two forms cannot be mixed.
//!
//! A technique with neither a vertex nor a fragment shader is a legacy
//! fixed-function technique; it is dropped with a warning.

use crate::assets::io::AssetProvider;
use crate::assets::loaders::parse_keyword;
use crate::assets::loaders::render_state::read_render_state;
use crate::errors::{MaterialError, Result};
use crate::resources::material::MaterialDefinition;
use crate::resources::technique::{
    DEFAULT_TECHNIQUE_NAME, LightMode, LightSpace, ShaderFile, ShaderStage, ShadowMode,
    TechniqueDefinition, TechniqueProgram,
};
use crate::resources::world_params::WorldBinding;
use crate::shader_nodes::graph::GraphBuilder;
use crate::shader_nodes::repository::DefinitionRepository;
use crate::statement::{Statement, keyword_table};

keyword_table! {
    enum TechniqueKeyword {
        VertexShader => "VertexShader",
        FragmentShader => "FragmentShader",
        GeometryShader => "GeometryShader",
        TessellationControlShader => "TessellationControlShader",
        TessellationEvaluationShader => "TessellationEvaluationShader",
        LightMode => "LightMode",
        LightSpace => "LightSpace",
        ShadowMode => "ShadowMode",
        WorldParameters => "WorldParameters",
        RenderState => "RenderState",
        ForcedRenderState => "ForcedRenderState",
        Defines => "Defines",
        ShaderNodesDefinitions => "ShaderNodesDefinitions",
        VertexShaderNodes => "VertexShaderNodes",
        FragmentShaderNodes => "FragmentShaderNodes",
        NoRender => "NoRender",
    }
}

/// A shader-file statement: one path, one or more language variants.
struct StageFiles {
    stage: ShaderStage,
    languages: Vec<String>,
    path: String,
}

/// Parse state of one technique block. Created per block and consumed when
/// the block closes, so nothing leaks between techniques.
pub(crate) struct TechniqueContext<'a> {
    file: &'a str,
    assets: &'a dyn AssetProvider,
    repository: &'a DefinitionRepository,
    material: &'a MaterialDefinition,
    technique: TechniqueDefinition,
    stage_files: Vec<StageFiles>,
    preset_defines: Vec<String>,
    /// Present once a node block was seen.
    graph: Option<GraphBuilder<'a>>,
}

impl<'a> TechniqueContext<'a> {
    /// Reads `block` and returns the techniques to register, possibly none.
    pub(crate) fn read(
        file: &'a str,
        assets: &'a dyn AssetProvider,
        repository: &'a DefinitionRepository,
        material: &'a MaterialDefinition,
        block: &Statement,
    ) -> Result<Vec<TechniqueDefinition>> {
        let name = match block.tokens().skip(1).filter(|t| *t != "{").collect::<Vec<_>>().as_slice() {
            [] => DEFAULT_TECHNIQUE_NAME.to_string(),
            [name] => (*name).to_string(),
            _ => {
                return Err(MaterialError::syntax(
                    file,
                    block,
                    "Expected 'Technique [<name>]'",
                ));
            }
        };

        let mut context = Self {
            file,
            assets,
            repository,
            material,
            technique: TechniqueDefinition::new(name, material.asset_name()),
            stage_files: Vec::new(),
            preset_defines: Vec::new(),
            graph: None,
        };
        for statement in block.contents() {
            context.read_statement(statement)?;
        }
        Ok(context.finish())
    }

    fn read_statement(&mut self, statement: &Statement) -> Result<()> {
        let Some(keyword) = TechniqueKeyword::from_keyword(statement.keyword()) else {
            return Err(MaterialError::unexpected(
                self.file,
                statement,
                &TechniqueKeyword::expected(),
            ));
        };
        match keyword {
            TechniqueKeyword::VertexShader
            | TechniqueKeyword::FragmentShader
            | TechniqueKeyword::GeometryShader
            | TechniqueKeyword::TessellationControlShader
            | TechniqueKeyword::TessellationEvaluationShader => self.read_shader(statement)?,
            TechniqueKeyword::LightMode => {
                let mode = match statement.argument() {
                    "Disabled" => LightMode::Disable,
                    other => parse_keyword::<LightMode>(self.file, statement, other)?,
                };
                self.technique.set_light_mode(mode);
            }
            TechniqueKeyword::LightSpace => {
                let space = parse_keyword::<LightSpace>(self.file, statement, statement.argument())?;
                self.technique.set_light_space(space);
            }
            TechniqueKeyword::ShadowMode => {
                let mode = parse_keyword::<ShadowMode>(self.file, statement, statement.argument())?;
                self.technique.set_shadow_mode(mode);
            }
            TechniqueKeyword::WorldParameters => {
                for line in statement.contents() {
                    let name = line.line().trim();
                    let Some(binding) = WorldBinding::from_keyword(name) else {
                        return Err(MaterialError::semantic(
                            self.file,
                            line,
                            format!("Unknown WorldParameter {name}"),
                        ));
                    };
                    self.technique.add_world_param(binding);
                }
            }
            TechniqueKeyword::RenderState => {
                let state = read_render_state(self.file, statement.contents())?;
                self.technique.set_render_state(state);
            }
            TechniqueKeyword::ForcedRenderState => {
                let state = read_render_state(self.file, statement.contents())?;
                self.technique.set_forced_render_state(state);
            }
            TechniqueKeyword::Defines => {
                for line in statement.contents() {
                    self.read_define(line)?;
                }
            }
            TechniqueKeyword::ShaderNodesDefinitions => {
                self.graph(statement)?.read_definitions(statement)?;
            }
            TechniqueKeyword::VertexShaderNodes => {
                self.read_nodes(ShaderStage::Vertex, statement)?;
            }
            TechniqueKeyword::FragmentShaderNodes => {
                self.read_nodes(ShaderStage::Fragment, statement)?;
            }
            TechniqueKeyword::NoRender => self.technique.set_no_render(true),
        }
        Ok(())
    }

    /// `<Stage>Shader <Lang...> : <path>`
    fn read_shader(&mut self, statement: &Statement) -> Result<()> {
        if self.graph.is_some() {
            return Err(MaterialError::semantic(
                self.file,
                statement,
                "Cannot mix shader files and shader nodes in one technique",
            ));
        }
        let Some(stage) = ShaderStage::from_shader_keyword(statement.keyword()) else {
            return Err(MaterialError::unexpected(self.file, statement, "a shader statement"));
        };
        let line = statement.line().trim();
        let Some((head, path)) = line.split_once(':') else {
            return Err(MaterialError::syntax(
                self.file,
                statement,
                "Expected '<Stage>Shader <Lang...> : <path>'",
            ));
        };
        let languages: Vec<String> = head.split_whitespace().skip(1).map(str::to_string).collect();
        let path = path.trim();
        if languages.is_empty() || path.is_empty() {
            return Err(MaterialError::syntax(
                self.file,
                statement,
                "Expected '<Stage>Shader <Lang...> : <path>'",
            ));
        }
        if let Some(first) = self.stage_files.first()
            && first.languages.len() != languages.len()
        {
            return Err(MaterialError::semantic(
                self.file,
                statement,
                format!(
                    "All shader statements of a technique must declare the same number of \
                     languages, expected {} got {}",
                    first.languages.len(),
                    languages.len()
                ),
            ));
        }
        self.stage_files.push(StageFiles {
            stage,
            languages,
            path: path.to_string(),
        });
        Ok(())
    }

    /// `<NAME> [: <param>]`
    fn read_define(&mut self, statement: &Statement) -> Result<()> {
        let line = statement.line().trim();
        let (define, param) = match line.split_once(':') {
            Some((define, param)) => (define.trim(), Some(param.trim())),
            None => (line, None),
        };
        if define.is_empty() || define.contains(char::is_whitespace) {
            return Err(MaterialError::syntax(
                self.file,
                statement,
                "Expected '<DEFINE> [: <param>]'",
            ));
        }

        let Some(param_name) = param.filter(|p| !p.is_empty()) else {
            if !self.preset_defines.iter().any(|d| d == define) {
                self.preset_defines.push(define.to_string());
            }
            return Ok(());
        };
        let Some(param) = self.material.param(param_name) else {
            log::warn!(
                "In technique '{}' of {}: define {define} is mapped to unknown parameter {param_name}",
                self.technique.name(),
                self.file
            );
            return Ok(());
        };
        if self.technique.param_define_slot(&param.name).is_some() {
            return Ok(());
        }
        self.technique
            .add_param_define(&param.name, param.var_type, define)
            .map(|_| ())
            .ok_or_else(|| {
                MaterialError::semantic(self.file, statement, "Too many defines in technique")
            })
    }

    /// Node mode starts with the first node block.
    fn graph(&mut self, statement: &Statement) -> Result<&mut GraphBuilder<'a>> {
        if !self.stage_files.is_empty() {
            return Err(MaterialError::semantic(
                self.file,
                statement,
                "Cannot mix shader files and shader nodes in one technique",
            ));
        }
        let (file, assets, repository, material) =
            (self.file, self.assets, self.repository, self.material);
        Ok(self
            .graph
            .get_or_insert_with(|| GraphBuilder::new(file, assets, repository, material)))
    }

    fn read_nodes(&mut self, stage: ShaderStage, statement: &Statement) -> Result<()> {
        self.graph(statement)?;
        if let Some(graph) = self.graph.as_mut() {
            graph.read_nodes(&mut self.technique, stage, statement.contents())?;
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<TechniqueDefinition> {
        let prologue: String = self
            .preset_defines
            .iter()
            .map(|define| format!("#define {define} 1\n"))
            .collect();
        self.technique.set_prologue(prologue);

        if let Some(graph) = self.graph.take() {
            self.technique
                .set_program(TechniqueProgram::Nodes(graph.finish()));
            return vec![self.technique];
        }

        let has_stage = |stage: ShaderStage| self.stage_files.iter().any(|f| f.stage == stage);
        if !has_stage(ShaderStage::Vertex) || !has_stage(ShaderStage::Fragment) {
            log::warn!(
                "Fixed function technique '{}' in {} was ignored",
                self.technique.name(),
                self.file
            );
            return Vec::new();
        }

        let variants = self.stage_files.first().map_or(0, |f| f.languages.len());
        (0..variants)
            .map(|variant| {
                let mut technique = self.technique.clone();
                let files = self
                    .stage_files
                    .iter()
                    .map(|f| ShaderFile {
                        stage: f.stage,
                        language: f.languages[variant].clone(),
                        path: f.path.clone(),
                    })
                    .collect();
                technique.set_program(TechniqueProgram::Files(files));
                technique
            })
            .collect()
    }
}
