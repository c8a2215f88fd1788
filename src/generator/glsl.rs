//! GLSL dialects and the per-stage source writer.

use std::fmt::Write as _;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::assets::io::AssetProvider;
use crate::errors::{MaterialError, Result};
use crate::generator::splice::{rename_identifiers, rewrite_input_conditions, split_main};
use crate::resources::technique::ShaderStage;
use crate::shader_nodes::condition::or_conditions;
use crate::shader_nodes::graph::mapping_guard;
use crate::shader_nodes::node::{ShaderGenerationInfo, ShaderNode};
use crate::shader_nodes::variable::{Namespace, ShaderNodeVariable, VariableMapping};

const MAX_INDENT: u8 = 10;
const INDENT: &str = "    ";

/// Output dialect. GLSL 1.00 uses `attribute`/`varying` and the built-in
/// fragment outputs; GLSL 1.50 uses `in`/`out` and declares the fragment
/// outputs itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Glsl100,
    Glsl150,
}

impl Dialect {
    #[must_use]
    pub fn version(self) -> u32 {
        match self {
            Self::Glsl100 => 100,
            Self::Glsl150 => 150,
        }
    }

    /// Language name as used in shader statements, e.g. `GLSL150`.
    #[must_use]
    pub fn language(self) -> String {
        format!("GLSL{}", self.version())
    }

    fn attribute_qualifier(self) -> &'static str {
        match self {
            Self::Glsl100 => "attribute",
            Self::Glsl150 => "in",
        }
    }

    fn varying_qualifier(self, stage: ShaderStage) -> &'static str {
        match (self, stage) {
            (Self::Glsl100, _) => "varying",
            (Self::Glsl150, ShaderStage::Vertex) => "out",
            (Self::Glsl150, _) => "in",
        }
    }
}

// ============================================================================
// Stage writer
// ============================================================================

/// Emits one stage. Owned by a single generate call.
pub(crate) struct StageWriter<'a> {
    dialect: Dialect,
    stage: ShaderStage,
    info: &'a ShaderGenerationInfo,
    declarations: String,
    body: String,
    indent: u8,
    /// Type `inPosition` ends up declared with.
    in_position_type: String,
}

impl<'a> StageWriter<'a> {
    pub(crate) fn new(dialect: Dialect, stage: ShaderStage, info: &'a ShaderGenerationInfo) -> Self {
        Self {
            dialect,
            stage,
            info,
            declarations: String::new(),
            body: String::new(),
            indent: 0,
            in_position_type: "vec3".to_string(),
        }
    }

    fn indent(&mut self) {
        self.indent = (self.indent + 1).min(MAX_INDENT);
    }

    fn unindent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    fn pad(&self) -> String {
        INDENT.repeat(usize::from(self.indent))
    }

    /// Writes the whole stage: declarations, `main` and the nodes of this
    /// stage in declaration order.
    pub(crate) fn write(
        mut self,
        assets: &dyn AssetProvider,
        nodes: &[ShaderNode],
    ) -> Result<String> {
        self.write_uniforms();
        if self.stage == ShaderStage::Vertex {
            self.write_attributes();
        }
        self.write_varyings();
        self.start_main();

        let active: Vec<&ShaderNode> = nodes
            .iter()
            .filter(|n| n.stage() == self.stage && !self.info.is_unused(&n.name))
            .collect();
        let headers = shared_header_conditions(&active);
        let mut headers_written: FxHashSet<&str> = FxHashSet::default();

        for node in &active {
            let source = node
                .definition
                .select_source(self.dialect.version())
                .map(|s| s.path.as_str());
            let Some(path) = source else {
                self.write_node_body(node, "");
                continue;
            };
            let text = assets.load_source(path)?;
            let conditions = input_conditions(node);

            if text.trim().len() <= 1 {
                self.write_node_body(node, "");
                continue;
            }
            let Some((header, body)) = split_main(&text) else {
                return Err(MaterialError::NodeSource {
                    node: node.name.clone(),
                    path: path.to_string(),
                    message: "Cannot find 'void main(){'".to_string(),
                });
            };

            let name = node.definition.name.as_str();
            if headers_written.insert(name) && !header.trim().is_empty() {
                let (condition, users) = &headers[name];
                let header = if *users == 1 {
                    rewrite_input_conditions(header, &conditions)
                } else {
                    header.to_string()
                };
                self.write_header(condition.as_deref(), &header);
            }
            let body = rewrite_input_conditions(body, &conditions);
            self.write_node_body(node, &body);
        }

        self.end_main();
        Ok(self.declarations + &self.body)
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn start_condition(out: &mut String, pad: &str, condition: Option<&str>) {
        if let Some(condition) = condition {
            let _ = writeln!(out, "{pad}#if {condition}");
        }
    }

    fn end_condition(out: &mut String, pad: &str, condition: Option<&str>) {
        if condition.is_some() {
            let _ = writeln!(out, "{pad}#endif");
        }
    }

    fn declare(&mut self, qualifier: &str, var: &ShaderNodeVariable) {
        let pad = self.pad();
        let condition = var.condition.as_deref();
        Self::start_condition(&mut self.declarations, &pad, condition);
        let _ = write!(
            self.declarations,
            "{pad}{qualifier} {} {}",
            var.var_type,
            var.glsl_name()
        );
        if let Some(multiplicity) = &var.multiplicity {
            let _ = write!(self.declarations, "[{}]", multiplicity.to_uppercase());
        }
        self.declarations.push_str(";\n");
        Self::end_condition(&mut self.declarations, &pad, condition);
    }

    fn write_uniforms(&mut self) {
        let info = self.info;
        for var in info.uniforms(self.stage) {
            self.declare("uniform", var);
        }
    }

    fn write_attributes(&mut self) {
        self.declarations.push('\n');
        let qualifier = self.dialect.attribute_qualifier();
        let mut has_position = false;
        let info = self.info;
        for var in &info.attributes {
            if var.name == "inPosition" {
                has_position = true;
                let mut position = var.clone();
                position.condition = None;
                if position.var_type != "vec3" && position.var_type != "vec4" {
                    position.var_type = "vec3".to_string();
                }
                self.in_position_type = position.var_type.clone();
                self.declare(qualifier, &position);
            } else {
                self.declare(qualifier, var);
            }
        }
        if !has_position {
            let position =
                ShaderNodeVariable::new("vec3", "inPosition").with_namespace(Namespace::Attribute);
            self.declare(qualifier, &position);
        }
    }

    fn write_varyings(&mut self) {
        self.declarations.push('\n');
        let qualifier = self.dialect.varying_qualifier(self.stage);
        let info = self.info;
        for var in &info.varyings {
            self.declare(qualifier, var);
        }
    }

    fn write_header(&mut self, condition: Option<&str>, header: &str) {
        self.declarations.push('\n');
        Self::start_condition(&mut self.declarations, "", condition);
        self.declarations.push_str(header.trim_end());
        self.declarations.push('\n');
        Self::end_condition(&mut self.declarations, "", condition);
    }

    // ========================================================================
    // main
    // ========================================================================

    fn vertex_global(&self) -> ShaderNodeVariable {
        self.info.vertex_global.clone().unwrap_or_else(|| {
            ShaderNodeVariable::new("vec4", "position").with_namespace(Namespace::Global)
        })
    }

    fn start_main(&mut self) {
        if self.stage == ShaderStage::Fragment && self.dialect == Dialect::Glsl150 {
            for global in &self.info.fragment_globals {
                let _ = writeln!(self.declarations, "out vec4 {};", global.glsl_name());
            }
        }
        self.body.push_str("\nvoid main() {\n");
        self.indent();
        let pad = self.pad();

        if self.stage == ShaderStage::Vertex {
            let global = self.vertex_global();
            let init = if self.in_position_type == "vec4" {
                "inPosition".to_string()
            } else {
                "vec4(inPosition, 1.0)".to_string()
            };
            let _ = writeln!(self.body, "{pad}vec4 {} = {init};", global.glsl_name());
        } else {
            let declared = self.dialect == Dialect::Glsl150;
            for global in &self.info.fragment_globals {
                let ty = if declared { "" } else { "vec4 " };
                let _ = writeln!(self.body, "{pad}{ty}{} = vec4(1.0);", global.glsl_name());
            }
        }
    }

    fn end_main(&mut self) {
        self.body.push('\n');
        let pad = self.pad();
        if self.stage == ShaderStage::Vertex {
            let global = self.vertex_global();
            let _ = writeln!(self.body, "{pad}gl_Position = {};", global.glsl_name());
        } else if self.dialect == Dialect::Glsl100 {
            let globals = &self.info.fragment_globals;
            if let [global] = globals.as_slice() {
                let _ = writeln!(self.body, "{pad}gl_FragColor = {};", global.glsl_name());
            } else {
                for (index, global) in globals.iter().enumerate() {
                    let _ = writeln!(
                        self.body,
                        "{pad}gl_FragData[{index}] = {};",
                        global.glsl_name()
                    );
                }
            }
        }
        self.unindent();
        self.body.push_str("}\n");
    }

    // ========================================================================
    // Node bodies
    // ========================================================================

    fn write_node_body(&mut self, node: &ShaderNode, source: &str) {
        let pad = self.pad();
        let _ = writeln!(self.body, "\n{pad}//{} : Begin", node.name);
        let condition = node.condition.as_deref();
        Self::start_condition(&mut self.body, &pad, condition);
        self.indent();

        let node_namespace = Namespace::Node(node.name.clone());
        let mut renames: FxHashMap<String, String> = FxHashMap::default();
        // Inputs already declared in this body, with whether they hold a value.
        let mut declared: FxHashMap<String, bool> = FxHashMap::default();

        // Inputs not fed by an unconditional mapping are declared up front so
        // conditional assignments and the node body always see them.
        for input in &node.definition.inputs {
            let local = input.clone().with_namespace(node_namespace.clone());
            renames.insert(input.name.clone(), local.glsl_name());
            if input.is_sampler() || self.info.is_varying(&node_namespace, &input.name) {
                continue;
            }
            let fed = node
                .input_mappings
                .iter()
                .any(|m| m.left.name == input.name && mapping_guard(m).is_none());
            if fed {
                continue;
            }
            self.declare_local(&local, input.default_value.as_deref());
            declared.insert(input.name.clone(), input.default_value.is_some());
        }

        for mapping in &node.input_mappings {
            if mapping.right.is_sampler() && mapping.right.namespace.is_uniform() {
                renames.insert(mapping.left.name.clone(), mapping.right.glsl_name());
                continue;
            }
            let initialized = declared.get(&mapping.left.name).copied();
            self.map(mapping, initialized);
            declared.entry(mapping.left.name.clone()).or_insert(true);
        }

        for output in &node.definition.outputs {
            if node.definition.input(&output.name).is_some() {
                continue;
            }
            let local = output.clone().with_namespace(node_namespace.clone());
            renames.insert(output.name.clone(), local.glsl_name());
            if !self.info.is_varying(&node_namespace, &output.name) {
                self.declare_local(&local, None);
            }
        }

        let source = rename_identifiers(source, &renames);
        let inner = self.pad();
        for line in source.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let _ = writeln!(self.body, "{inner}{}", line.trim());
        }

        for mapping in &node.output_mappings {
            self.map(mapping, Some(true));
        }

        self.unindent();
        Self::end_condition(&mut self.body, &pad, condition);
        let _ = writeln!(self.body, "{pad}//{} : End", node.name);
    }

    fn declare_local(&mut self, var: &ShaderNodeVariable, value: Option<&str>) {
        let pad = self.pad();
        let _ = write!(self.body, "{pad}{} {}", var.var_type, var.glsl_name());
        if let Some(multiplicity) = &var.multiplicity {
            let _ = write!(self.body, "[{}]", multiplicity.to_uppercase());
        }
        if let Some(value) = value {
            let _ = write!(self.body, " = {value}");
        }
        self.body.push_str(";\n");
    }

    /// Emits `left = right;`. `declared` is `None` when the left variable
    /// still needs its declaration, `Some(has_value)` otherwise.
    fn map(&mut self, mapping: &VariableMapping, declared: Option<bool>) {
        let guard = mapping_guard(mapping);
        let pad = self.pad();
        Self::start_condition(&mut self.body, &pad, guard.as_deref());

        let left = &mapping.left;
        let name = left.glsl_name();
        let declare = declared.is_none() && !left.shader_output;
        let has_value = declared == Some(true);
        let mut right = mapping.right.glsl_name();
        if !mapping.right_swizzle.is_empty() {
            right = format!("{right}.{}", mapping.right_swizzle);
        }

        if mapping.left_swizzle.is_empty() {
            let ty = if declare { format!("{} ", left.var_type) } else { String::new() };
            let _ = writeln!(self.body, "{pad}{ty}{name}{} = {right};", array_suffix(left, declare));
        } else {
            if declare {
                let _ = writeln!(
                    self.body,
                    "{pad}{} {name}{} = {}(0.0);",
                    left.var_type,
                    array_suffix(left, true),
                    left.var_type
                );
            } else if !has_value {
                let _ = writeln!(self.body, "{pad}{name} = {}(0.0);", left.var_type);
            }
            let _ = writeln!(self.body, "{pad}{name}.{} = {right};", mapping.left_swizzle);
        }

        Self::end_condition(&mut self.body, &pad, guard.as_deref());
    }
}

fn array_suffix(var: &ShaderNodeVariable, declare: bool) -> String {
    match (&var.multiplicity, declare) {
        (Some(multiplicity), true) => format!("[{}]", multiplicity.to_uppercase()),
        _ => String::new(),
    }
}

/// Conditions of the mappings feeding each input, for `#if` rewriting.
fn input_conditions(node: &ShaderNode) -> FxHashMap<String, String> {
    node.input_mappings
        .iter()
        .filter_map(|m| mapping_guard(m).map(|guard| (m.left.name.clone(), guard)))
        .collect()
}

/// Per definition: the OR of its nodes' conditions and the number of nodes
/// sharing it.
fn shared_header_conditions<'n>(
    nodes: &[&'n ShaderNode],
) -> FxHashMap<&'n str, (Option<String>, usize)> {
    let mut headers: FxHashMap<&'n str, (Option<String>, usize)> = FxHashMap::default();
    for node in nodes {
        headers
            .entry(node.definition.name.as_str())
            .and_modify(|(condition, users)| {
                *condition = or_conditions(condition.as_deref(), node.condition.as_deref());
                *users += 1;
            })
            .or_insert_with(|| (node.condition.clone(), 1));
    }
    headers
}
