//! Shader-Node Graph Builder
//!
//! Turns the `VertexShaderNodes` / `FragmentShaderNodes` blocks of a
//! technique into a validated node list plus the declarations the generator
//! needs.
//!
//! # Resolution
//!
//! Every input mapping `left = Namespace.name[.swizzle][ : condition]` is
//! resolved by the namespace of its right side:
//!
//! | Namespace | Effect |
//! |---|---|
//! | `Global` | stage output (`Global_position`, `Global_color`, ...) |
//! | `Attr` | vertex attribute, declared once |
//! | `MatParam` | material parameter uniform (`m_`), declared once per stage |
//! | `WorldParam` | engine uniform (`g_`), declared once per stage |
//! | node name | output of an earlier node, a varying across stages |
//!
//! Output mappings always write a `Global`.
//!
//! # Unused nodes
//!
//! Nodes start out unused. Reading a node's output, writing a `Global` from
//! it or using a definition without outputs marks it used. Nodes still
//! unused when the graph is finished are skipped by the generator.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::assets::io::AssetProvider;
use crate::assets::loaders::shader_node::ShaderNodeDefinitionLoader;
use crate::errors::{MaterialError, Result};
use crate::resources::material::{MATERIAL_UNIFORM_PREFIX, MaterialDefinition};
use crate::resources::technique::{NodeProgram, ShaderStage, TechniqueDefinition};
use crate::resources::var_type::{VarType, resolve_glsl_type};
use crate::resources::world_params::{WORLD_UNIFORM_PREFIX, WorldBinding};
use crate::shader_nodes::condition::{ConditionParser, and_conditions};
use crate::shader_nodes::definition::ShaderNodeDefinition;
use crate::shader_nodes::node::{ShaderGenerationInfo, ShaderNode};
use crate::shader_nodes::repository::DefinitionRepository;
use crate::shader_nodes::variable::{
    Namespace, ShaderNodeVariable, VariableMapping, multiplicity_match, types_match,
};
use crate::statement::{Statement, keyword_table};

keyword_table! {
    enum NodeKeyword {
        Definition => "Definition",
        Condition => "Condition",
        InputMapping => "InputMapping",
        InputMappings => "InputMappings",
        OutputMapping => "OutputMapping",
        OutputMappings => "OutputMappings",
    }
}

// ============================================================================
// Declaration tables
// ============================================================================

/// Variables declared once per technique (or per stage), with the names of
/// the nodes referencing each one. Indices follow the matching list in
/// [`ShaderGenerationInfo`].
#[derive(Debug, Default)]
struct DeclarationTable {
    index: FxHashMap<String, usize>,
    users: Vec<Vec<String>>,
}

impl DeclarationTable {
    /// Declares `var` unless a variable with the same generated name exists,
    /// records `node` as a user and returns the stored variable.
    fn declare(
        &mut self,
        list: &mut Vec<ShaderNodeVariable>,
        var: ShaderNodeVariable,
        node: &str,
    ) -> ShaderNodeVariable {
        let key = var.glsl_name();
        let index = match self.index.get(&key) {
            Some(&index) => index,
            None => {
                list.push(var);
                self.users.push(Vec::new());
                self.index.insert(key, list.len() - 1);
                list.len() - 1
            }
        };
        let users = &mut self.users[index];
        if !users.iter().any(|u| u == node) {
            users.push(node.to_string());
        }
        list[index].clone()
    }

    fn lookup(&self, list: &[ShaderNodeVariable], key: &str) -> Option<ShaderNodeVariable> {
        self.index.get(key).map(|&index| list[index].clone())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Per-technique graph state. Create one per technique; it is consumed by
/// [`finish`](Self::finish).
pub struct GraphBuilder<'a> {
    file: &'a str,
    assets: &'a dyn AssetProvider,
    repository: &'a DefinitionRepository,
    material: &'a MaterialDefinition,
    /// Definitions declared inline or already resolved, by name.
    definitions: FxHashMap<String, Arc<ShaderNodeDefinition>>,
    nodes: Vec<ShaderNode>,
    info: ShaderGenerationInfo,
    attributes: DeclarationTable,
    vertex_uniforms: DeclarationTable,
    fragment_uniforms: DeclarationTable,
    varyings: DeclarationTable,
}

impl<'a> GraphBuilder<'a> {
    #[must_use]
    pub fn new(
        file: &'a str,
        assets: &'a dyn AssetProvider,
        repository: &'a DefinitionRepository,
        material: &'a MaterialDefinition,
    ) -> Self {
        Self {
            file,
            assets,
            repository,
            material,
            definitions: FxHashMap::default(),
            nodes: Vec::new(),
            info: ShaderGenerationInfo::default(),
            attributes: DeclarationTable::default(),
            vertex_uniforms: DeclarationTable::default(),
            fragment_uniforms: DeclarationTable::default(),
            varyings: DeclarationTable::default(),
        }
    }

    #[inline]
    fn semantic(&self, statement: &Statement, message: impl Into<String>) -> MaterialError {
        MaterialError::semantic(self.file, statement, message)
    }

    #[inline]
    fn syntax(&self, statement: &Statement, message: impl Into<String>) -> MaterialError {
        MaterialError::syntax(self.file, statement, message)
    }

    /// Nodes read so far, in declaration order.
    #[must_use]
    pub fn nodes(&self) -> &[ShaderNode] {
        &self.nodes
    }

    /// Registers the definitions of a `ShaderNodesDefinitions` block.
    pub fn read_definitions(&mut self, block: &Statement) -> Result<()> {
        let definitions =
            ShaderNodeDefinitionLoader::default().read_definitions(self.file, block.contents())?;
        for definition in definitions {
            self.definitions
                .insert(definition.name.clone(), Arc::new(definition));
        }
        Ok(())
    }

    /// Reads the `ShaderNode` statements of a `VertexShaderNodes` or
    /// `FragmentShaderNodes` block.
    pub fn read_nodes(
        &mut self,
        technique: &mut TechniqueDefinition,
        stage: ShaderStage,
        statements: &[Statement],
    ) -> Result<()> {
        for statement in statements {
            if statement.keyword() != "ShaderNode" {
                return Err(MaterialError::unexpected(self.file, statement, "ShaderNode"));
            }
            let name = statement.argument();
            if name.is_empty() {
                return Err(self.syntax(statement, "ShaderNode requires a name"));
            }
            if self.nodes.iter().any(|n| n.name == name) {
                return Err(self.semantic(
                    statement,
                    format!("A ShaderNode with the name {name} already exists"),
                ));
            }
            let node = self.read_node(technique, stage, name, statement)?;
            self.nodes.push(node);
        }
        Ok(())
    }

    fn read_node(
        &mut self,
        technique: &mut TechniqueDefinition,
        stage: ShaderStage,
        name: &str,
        block: &Statement,
    ) -> Result<ShaderNode> {
        let Some((first, rest)) = block.contents().split_first() else {
            return Err(self.syntax(block, format!("ShaderNode {name} is empty")));
        };
        if NodeKeyword::from_keyword(first.keyword()) != Some(NodeKeyword::Definition) {
            return Err(self.syntax(
                first,
                "Definition must be the first statement of a ShaderNode",
            ));
        }

        let definition = self.read_definition_reference(first)?;
        if definition.stage != stage {
            return Err(self.semantic(
                first,
                format!(
                    "Only {stage} definitions are allowed in {stage}ShaderNodes, {} is a {} definition",
                    definition.name, definition.stage
                ),
            ));
        }

        let mut node = ShaderNode::new(name, definition);
        self.info.unused_nodes.insert(node.name.clone());
        if node.definition.no_output {
            self.info.unused_nodes.remove(&node.name);
        }

        for statement in rest {
            let Some(keyword) = NodeKeyword::from_keyword(statement.keyword()) else {
                return Err(MaterialError::unexpected(
                    self.file,
                    statement,
                    "Condition, InputMappings or OutputMappings",
                ));
            };
            match keyword {
                NodeKeyword::Definition => {
                    return Err(self.syntax(statement, "Duplicate Definition statement"));
                }
                NodeKeyword::Condition => {
                    let condition = self.extract_condition(technique, statement.argument(), statement)?;
                    node.condition = Some(condition);
                }
                NodeKeyword::InputMapping | NodeKeyword::InputMappings => {
                    for line in statement.contents() {
                        let mapping = self.read_input_mapping(technique, &node, line)?;
                        node.input_mappings.push(mapping);
                    }
                }
                NodeKeyword::OutputMapping | NodeKeyword::OutputMappings => {
                    for line in statement.contents() {
                        let mapping = self.read_output_mapping(technique, &node, line)?;
                        node.output_mappings.push(mapping);
                    }
                    self.info.unused_nodes.remove(&node.name);
                }
            }
        }
        Ok(node)
    }

    /// `Definition : <name> [: <path>]`
    fn read_definition_reference(
        &mut self,
        statement: &Statement,
    ) -> Result<Arc<ShaderNodeDefinition>> {
        let argument = statement.argument();
        let (name, path) = match argument.split_once(':') {
            Some((name, path)) => (name.trim(), Some(path.trim())),
            None => (argument, None),
        };
        if name.is_empty() {
            return Err(self.syntax(statement, "Expected 'Definition : <name> [: <path>]'"));
        }

        if let Some(path) = path.filter(|p| !p.is_empty()) {
            let Some(definition) = self.repository.definition(self.assets, path, name)? else {
                return Err(self.semantic(
                    statement,
                    format!("Could not find definition {name} in {path}"),
                ));
            };
            self.definitions
                .entry(name.to_string())
                .or_insert_with(|| Arc::clone(&definition));
            return Ok(definition);
        }

        self.definitions.get(name).cloned().ok_or_else(|| {
            self.semantic(
                statement,
                format!("Could not find definition {name}, declare it inline or give its file"),
            )
        })
    }

    // ========================================================================
    // Conditions and defines
    // ========================================================================

    /// Rewrites a condition, checking that every identifier is a material
    /// parameter and registering a define for each one.
    fn extract_condition(
        &self,
        technique: &mut TechniqueDefinition,
        expression: &str,
        statement: &Statement,
    ) -> Result<String> {
        let material = self.material;
        let mut parser = ConditionParser::new();
        for name in parser.extract_defines(expression) {
            let Some(param) = material.param(&name) else {
                return Err(self.semantic(
                    statement,
                    format!("Invalid condition, {name} is not a declared material parameter"),
                ));
            };
            self.register_define(technique, &param.name, param.var_type, statement)?;
        }
        Ok(parser.formatted_expression().to_string())
    }

    fn register_define(
        &self,
        technique: &mut TechniqueDefinition,
        param: &str,
        var_type: VarType,
        statement: &Statement,
    ) -> Result<()> {
        if technique.param_define_slot(param).is_some() {
            return Ok(());
        }
        technique
            .add_param_define(param, var_type, &param.to_uppercase())
            .map(|_| ())
            .ok_or_else(|| {
                self.semantic(
                    statement,
                    format!("Cannot register define for {param}, the technique has too many defines"),
                )
            })
    }

    // ========================================================================
    // Mappings
    // ========================================================================

    /// Splits `left = right[:condition]` into a mapping with namespaces and
    /// swizzles but no types.
    fn parse_mapping(
        &self,
        technique: &mut TechniqueDefinition,
        statement: &Statement,
        left_namespace: bool,
        right_namespace: bool,
    ) -> Result<VariableMapping> {
        let line = statement.line().trim();
        let Some((left, right)) = line.split_once('=') else {
            return Err(self.syntax(statement, "Expected '<left> = <right>'"));
        };
        if right.contains('=') {
            return Err(self.syntax(statement, "Unexpected mapping format, more than one '='"));
        }
        let (right, condition) = match right.split_once(':') {
            Some((right, condition)) => (right, Some(condition.trim())),
            None => (right, None),
        };

        let (left, left_swizzle) = self.parse_variable(statement, left.trim(), left_namespace)?;
        let (right, right_swizzle) = self.parse_variable(statement, right.trim(), right_namespace)?;

        let mut mapping = VariableMapping::new(left, right);
        mapping.left_swizzle = left_swizzle;
        mapping.right_swizzle = right_swizzle;
        if let Some(condition) = condition {
            if condition.is_empty() {
                return Err(self.syntax(statement, "Empty mapping condition"));
            }
            mapping.condition = Some(self.extract_condition(technique, condition, statement)?);
        }
        Ok(mapping)
    }

    /// `[namespace.]name[.swizzle]`
    fn parse_variable(
        &self,
        statement: &Statement,
        expression: &str,
        has_namespace: bool,
    ) -> Result<(ShaderNodeVariable, String)> {
        let parts: Vec<&str> = expression.split('.').map(str::trim).collect();
        let (namespace, name, swizzle) = match (has_namespace, parts.as_slice()) {
            (true, [namespace, name]) => (*namespace, *name, ""),
            (true, [namespace, name, swizzle]) => (*namespace, *name, *swizzle),
            (false, [name]) => ("", *name, ""),
            (false, [name, swizzle]) => ("", *name, *swizzle),
            (true, _) => {
                return Err(self.syntax(
                    statement,
                    format!("Expected 'namespace.variable[.swizzle]', got '{expression}'"),
                ));
            }
            (false, _) => {
                return Err(self.syntax(
                    statement,
                    format!("Expected 'variable[.swizzle]', got '{expression}'"),
                ));
            }
        };
        if name.is_empty() || (has_namespace && namespace.is_empty()) {
            return Err(self.syntax(statement, format!("Malformed variable '{expression}'")));
        }
        let variable = ShaderNodeVariable::new("", name).with_namespace(Namespace::parse(namespace));
        Ok((variable, swizzle.to_string()))
    }

    fn read_input_mapping(
        &mut self,
        technique: &mut TechniqueDefinition,
        node: &ShaderNode,
        statement: &Statement,
    ) -> Result<VariableMapping> {
        let mut mapping = self.parse_mapping(technique, statement, false, true)?;

        let Some(input) = node.definition.input(&mapping.left.name) else {
            return Err(self.semantic(
                statement,
                format!(
                    "Could not find input variable {} in definition {}",
                    mapping.left.name, node.definition.name
                ),
            ));
        };
        mapping.left = input
            .clone()
            .with_namespace(Namespace::Node(node.name.clone()));

        if mapping.left.is_sampler() && !mapping.right.namespace.is_uniform() {
            return Err(self.semantic(
                statement,
                "Samplers can only be assigned from MatParam or WorldParam",
            ));
        }

        match mapping.right.namespace.clone() {
            Namespace::Global => {
                mapping.right.var_type = "vec4".to_string();
                self.store_global(node.stage(), &mut mapping.right, statement)?;
            }
            Namespace::Attribute => {
                if node.stage() == ShaderStage::Fragment {
                    return Err(self.semantic(
                        statement,
                        format!(
                            "Cannot have an attribute as input in a fragment shader: {}",
                            mapping.right.name
                        ),
                    ));
                }
                mapping.right.var_type = if !mapping.right_swizzle.is_empty() {
                    "vec4".to_string()
                } else if !mapping.left_swizzle.is_empty() {
                    swizzle_type(mapping.left_swizzle.len())
                } else {
                    mapping.left.var_type.clone()
                };
                mapping.right.multiplicity = mapping.left.multiplicity.clone();
                mapping.right = self.attributes.declare(
                    &mut self.info.attributes,
                    mapping.right.clone(),
                    &node.name,
                );
            }
            Namespace::MaterialParam => {
                self.resolve_material_param(technique, node, &mut mapping, statement)?;
            }
            Namespace::WorldParam => {
                let Some(binding) = WorldBinding::from_keyword(&mapping.right.name) else {
                    return Err(self.semantic(
                        statement,
                        format!("Could not find a World Parameter named {}", mapping.right.name),
                    ));
                };
                technique.add_world_param(binding);
                mapping.right.var_type = binding.glsl_type().to_string();
                mapping.right.prefix = WORLD_UNIFORM_PREFIX.to_string();
                mapping.right = self.declare_uniform(node, mapping.right.clone());
            }
            Namespace::Node(producer) => {
                self.resolve_node_output(node, &producer, &mut mapping, statement)?;
            }
            Namespace::Local => {
                return Err(self.syntax(statement, "Right side of an input mapping needs a namespace"));
            }
        }

        self.check_types(&mapping, statement)?;
        Ok(mapping)
    }

    fn read_output_mapping(
        &mut self,
        technique: &mut TechniqueDefinition,
        node: &ShaderNode,
        statement: &Statement,
    ) -> Result<VariableMapping> {
        let mut mapping = self.parse_mapping(technique, statement, true, false)?;

        if mapping.left.namespace != Namespace::Global {
            return Err(self.semantic(
                statement,
                format!(
                    "Only the Global namespace is allowed in output mappings, got '{}'",
                    mapping.left.namespace
                ),
            ));
        }
        mapping.left.var_type = "vec4".to_string();

        let Some(output) = node.definition.output(&mapping.right.name) else {
            return Err(self.semantic(
                statement,
                format!(
                    "{} is not an output variable of {}",
                    mapping.right.name, node.definition.name
                ),
            ));
        };
        mapping.right = output
            .clone()
            .with_namespace(Namespace::Node(node.name.clone()));

        if mapping.right.is_sampler() {
            return Err(self.semantic(statement, "Samplers can only be inputs"));
        }
        self.store_global(node.stage(), &mut mapping.left, statement)?;
        self.check_types(&mapping, statement)?;
        Ok(mapping)
    }

    // ========================================================================
    // Namespace resolution
    // ========================================================================

    fn store_global(
        &mut self,
        stage: ShaderStage,
        var: &mut ShaderNodeVariable,
        statement: &Statement,
    ) -> Result<()> {
        var.shader_output = true;
        if stage == ShaderStage::Vertex {
            if let Some(global) = &self.info.vertex_global {
                if global.name != var.name {
                    return Err(self.semantic(
                        statement,
                        format!(
                            "A global output is already defined for the vertex shader: {}. \
                             A vertex shader can only have one global output",
                            global.name
                        ),
                    ));
                }
            } else {
                self.info.vertex_global = Some(var.clone());
            }
        } else if !self.info.fragment_globals.iter().any(|g| g.name == var.name) {
            self.info.fragment_globals.push(var.clone());
        }
        Ok(())
    }

    fn declare_uniform(&mut self, node: &ShaderNode, var: ShaderNodeVariable) -> ShaderNodeVariable {
        if node.stage() == ShaderStage::Vertex {
            self.vertex_uniforms
                .declare(&mut self.info.vertex_uniforms, var, &node.name)
        } else {
            self.fragment_uniforms
                .declare(&mut self.info.fragment_uniforms, var, &node.name)
        }
    }

    fn resolve_material_param(
        &mut self,
        technique: &mut TechniqueDefinition,
        node: &ShaderNode,
        mapping: &mut VariableMapping,
        statement: &Statement,
    ) -> Result<()> {
        let material = self.material;
        let Some(param) = material.param(&mapping.right.name) else {
            return Err(self.semantic(
                statement,
                format!("Could not find a Material Parameter named {}", mapping.right.name),
            ));
        };
        let var_type = param.var_type;

        if let Some(multiplicity) = mapping.left.multiplicity.clone() {
            if !var_type.is_array() {
                return Err(self.semantic(
                    statement,
                    format!("{} is not of Array type", param.name),
                ));
            }
            let multiplicity = if multiplicity.parse::<u32>().is_ok() {
                multiplicity
            } else if let Some(count_param) = material.param(&multiplicity) {
                self.register_define(technique, &count_param.name, VarType::Int, statement)?;
                let define = multiplicity.to_uppercase();
                let guard = format!("defined({define})");
                mapping.left.condition = Some(match mapping.left.condition.take() {
                    Some(condition) => format!("({condition})||({guard})"),
                    None => guard,
                });
                mapping.left.multiplicity = Some(define.clone());
                define
            } else {
                return Err(self.semantic(
                    statement,
                    format!(
                        "Wrong multiplicity for variable {}. {multiplicity} should be an int \
                         or a declared material parameter",
                        mapping.left.name
                    ),
                ));
            };
            mapping.right.multiplicity = Some(multiplicity);
            mapping.right.condition = mapping.left.condition.clone();
        }

        mapping.right.name = param.name.clone();
        mapping.right.prefix = MATERIAL_UNIFORM_PREFIX.to_string();

        let key = mapping.right.glsl_name();
        let declared = if node.stage() == ShaderStage::Vertex {
            self.vertex_uniforms.lookup(&self.info.vertex_uniforms, &key)
        } else {
            self.fragment_uniforms.lookup(&self.info.fragment_uniforms, &key)
        };

        if declared.is_none() {
            let glsl_type = var_type.glsl_type();
            mapping.right.var_type = if glsl_type.contains('|') {
                resolve_glsl_type(glsl_type, &mapping.left.var_type)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        self.semantic(
                            statement,
                            format!(
                                "{var_type} can only be matched to one of {} found {}",
                                glsl_type.replace('|', ", "),
                                mapping.left.var_type
                            ),
                        )
                    })?
            } else {
                glsl_type.to_string()
            };
        }
        mapping.right = self.declare_uniform(node, mapping.right.clone());
        Ok(())
    }

    fn resolve_node_output(
        &mut self,
        node: &ShaderNode,
        producer: &str,
        mapping: &mut VariableMapping,
        statement: &Statement,
    ) -> Result<()> {
        let Some(index) = self.nodes.iter().position(|n| n.name == producer) else {
            return Err(self.semantic(
                statement,
                format!(
                    "Undeclared node {producer}. Make sure this node is declared before the current node"
                ),
            ));
        };
        let producer_node = &self.nodes[index];
        let Some(output) = producer_node.definition.output(&mapping.right.name) else {
            return Err(self.semantic(
                statement,
                format!(
                    "Cannot find output variable {} from ShaderNode {producer}",
                    mapping.right.name
                ),
            ));
        };
        mapping.right.var_type = output.var_type.clone();
        mapping.right.multiplicity = output.multiplicity.clone();
        let producer_stage = producer_node.stage();
        self.info.unused_nodes.remove(producer);

        match (producer_stage, node.stage()) {
            (ShaderStage::Fragment, ShaderStage::Vertex) => {
                return Err(self.semantic(
                    statement,
                    format!(
                        "Vertex node {} cannot read {}.{} from a fragment node",
                        node.name, producer, mapping.right.name
                    ),
                ));
            }
            (ShaderStage::Vertex, ShaderStage::Fragment) => {
                if mapping.right.is_sampler() {
                    return Err(self.semantic(statement, "Samplers cannot be passed as varyings"));
                }
                mapping.right.shader_output = true;
                // The producer writes the varying, so it guards it as well.
                self.varyings
                    .declare(&mut self.info.varyings, mapping.right.clone(), producer);
                self.varyings
                    .declare(&mut self.info.varyings, mapping.right.clone(), &node.name);
                // A producer input of the same name now aliases the varying.
                let name = mapping.right.name.clone();
                for input in &mut self.nodes[index].input_mappings {
                    if input.left.name == name {
                        input.left.shader_output = true;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn check_types(&self, mapping: &VariableMapping, statement: &Statement) -> Result<()> {
        if !types_match(mapping) {
            return Err(self.semantic(
                statement,
                format!(
                    "Type mismatch, cannot convert {}{} to {}{}",
                    mapping.right.var_type,
                    dotted(&mapping.right_swizzle),
                    mapping.left.var_type,
                    dotted(&mapping.left_swizzle)
                ),
            ));
        }
        if !multiplicity_match(mapping) {
            return Err(self.semantic(
                statement,
                format!(
                    "Type mismatch, cannot convert {}[{}] to {}[{}]",
                    mapping.right.var_type,
                    mapping.right.multiplicity.as_deref().unwrap_or(""),
                    mapping.left.var_type,
                    mapping.left.multiplicity.as_deref().unwrap_or("")
                ),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Finish
    // ========================================================================

    /// Computes declaration conditions and hands the graph over.
    #[must_use]
    pub fn finish(mut self) -> NodeProgram {
        self.compute_conditions();
        log::debug!(
            "Built shader node graph: {} nodes, {} unused, {} varyings",
            self.nodes.len(),
            self.info.unused_nodes.len(),
            self.info.varyings.len()
        );
        NodeProgram {
            info: self.info,
            nodes: self.nodes,
        }
    }

    /// A declaration is guarded by the OR over its users of each user's
    /// activation condition, so it disappears exactly when nobody reads it.
    fn compute_conditions(&mut self) {
        let nodes = &self.nodes;
        let tables = [
            (&self.vertex_uniforms, &mut self.info.vertex_uniforms),
            (&self.fragment_uniforms, &mut self.info.fragment_uniforms),
            (&self.attributes, &mut self.info.attributes),
            (&self.varyings, &mut self.info.varyings),
        ];
        for (table, list) in tables {
            for (index, var) in list.iter_mut().enumerate() {
                var.condition = declaration_condition(var, &table.users[index], nodes);
            }
        }

        for varying in &self.info.varyings {
            for node in self
                .nodes
                .iter_mut()
                .filter(|n| n.stage() == ShaderStage::Vertex)
            {
                for mapping in &mut node.input_mappings {
                    if mapping.left.namespace == varying.namespace && mapping.left.name == varying.name {
                        mapping.condition = and_conditions(
                            mapping.condition.as_deref(),
                            varying.condition.as_deref(),
                        );
                    }
                }
            }
        }
    }
}

/// Condition under which a mapping is emitted: its own condition and the
/// guard of its left variable (array multiplicity defines).
#[must_use]
pub fn mapping_guard(mapping: &VariableMapping) -> Option<String> {
    and_conditions(mapping.condition.as_deref(), mapping.left.condition.as_deref())
}

fn declaration_condition(
    var: &ShaderNodeVariable,
    users: &[String],
    nodes: &[ShaderNode],
) -> Option<String> {
    let key = var.glsl_name();
    let mut guards: Vec<String> = Vec::new();

    for user in users {
        let Some(node) = nodes.iter().find(|n| &n.name == user) else {
            continue;
        };

        // A user with no matching mapping (the producer of a varying)
        // touches it whenever active.
        let mut guarded_reads: Vec<String> = Vec::new();
        let mut unguarded = false;
        for mapping in node
            .input_mappings
            .iter()
            .filter(|m| m.right.namespace == var.namespace && m.right.glsl_name() == key)
        {
            let Some(guard) = mapping_guard(mapping) else {
                unguarded = true;
                break;
            };
            push_unique(&mut guarded_reads, guard);
        }
        let reads = if unguarded { None } else { any_of(&guarded_reads) };

        let user_guard = match (&node.condition, reads) {
            (None, None) => return None,
            (Some(own), None) => own.clone(),
            (None, Some(reads)) => reads,
            (Some(own), Some(reads)) => format!("({own}) && ({reads})"),
        };
        push_unique(&mut guards, user_guard);
    }
    match guards.as_slice() {
        [single] => Some(single.clone()),
        _ => any_of(&guards),
    }
}

fn push_unique(list: &mut Vec<String>, condition: String) {
    if !list.contains(&condition) {
        list.push(condition);
    }
}

/// `(a) || (b) || ...`, or `None` for an empty list.
fn any_of(conditions: &[String]) -> Option<String> {
    if conditions.is_empty() {
        return None;
    }
    Some(
        conditions
            .iter()
            .map(|c| format!("({c})"))
            .collect::<Vec<_>>()
            .join(" || "),
    )
}

fn swizzle_type(components: usize) -> String {
    if components == 1 {
        "float".to_string()
    } else {
        format!("vec{components}")
    }
}

fn dotted(swizzle: &str) -> String {
    if swizzle.is_empty() {
        String::new()
    } else {
        format!(".{swizzle}")
    }
}
