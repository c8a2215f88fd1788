//! Shader-Node Definition Loader
//!
//! Parses `ShaderNodeDefinitions` files:
//!
//! ```text
//! ShaderNodeDefinitions {
//!     ShaderNodeDefinition ColorMult {
//!         Type: Fragment
//!         Shader GLSL100: Nodes/ColorMult100.frag
//!         Shader GLSL150: Nodes/ColorMult150.frag
//!         Documentation {
//!             Multiplies two colors
//!         }
//!         Input {
//!             vec4 color1
//!             vec4 color2 : vec4(1.0)
//!         }
//!         Output {
//!             vec4 outColor
//!         }
//!     }
//! }
//! ```

use rustc_hash::FxHashSet;

use crate::assets::loaders::root_statement;
use crate::errors::{MaterialError, Result};
use crate::resources::technique::ShaderStage;
use crate::shader_nodes::definition::ShaderNodeDefinition;
use crate::shader_nodes::variable::ShaderNodeVariable;
use crate::statement::{Statement, keyword_table};

keyword_table! {
    enum DefinitionKeyword {
        Type => "Type",
        Shader => "Shader",
        Documentation => "Documentation",
        Input => "Input",
        Output => "Output",
    }
}

/// Options of the node-definition loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderSettings {
    /// Keep `Documentation` blocks. Editors want them, the runtime does not.
    pub load_documentation: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShaderNodeDefinitionLoader {
    settings: LoaderSettings,
}

impl ShaderNodeDefinitionLoader {
    #[must_use]
    pub fn new(settings: LoaderSettings) -> Self {
        Self { settings }
    }

    /// Parses every definition of the file at `path`, in file order.
    pub fn load(&self, path: &str, roots: &[Statement]) -> Result<Vec<ShaderNodeDefinition>> {
        let root = root_statement(path, roots)?;
        if root.keyword() != "ShaderNodeDefinitions" {
            return Err(MaterialError::unexpected(path, root, "ShaderNodeDefinitions"));
        }
        let definitions = self.read_definitions(path, root.contents())?;
        log::debug!("Loaded {} shader node definitions from {path}", definitions.len());
        Ok(definitions)
    }

    /// Parses a list of `ShaderNodeDefinition` blocks, as found in a
    /// definitions file or inline in a technique's `ShaderNodesDefinitions`.
    pub fn read_definitions(
        &self,
        path: &str,
        statements: &[Statement],
    ) -> Result<Vec<ShaderNodeDefinition>> {
        let mut definitions: Vec<ShaderNodeDefinition> = Vec::new();
        for statement in statements {
            if statement.keyword() != "ShaderNodeDefinition" {
                return Err(MaterialError::unexpected(path, statement, "ShaderNodeDefinition"));
            }
            let name = statement.argument();
            if name.is_empty() {
                return Err(MaterialError::syntax(
                    path,
                    statement,
                    "ShaderNodeDefinition requires a name",
                ));
            }
            if definitions.iter().any(|d| d.name == name) {
                return Err(MaterialError::semantic(
                    path,
                    statement,
                    format!("Duplicate shader node definition {name}"),
                ));
            }
            definitions.push(self.read_definition(path, name, statement)?);
        }
        Ok(definitions)
    }

    fn read_definition(
        &self,
        path: &str,
        name: &str,
        block: &Statement,
    ) -> Result<ShaderNodeDefinition> {
        let mut definition = ShaderNodeDefinition::new(name, path);
        let mut has_type = false;
        let mut input_names = FxHashSet::default();
        let mut output_names = FxHashSet::default();

        for statement in block.contents() {
            let Some(keyword) = DefinitionKeyword::from_keyword(statement.keyword()) else {
                return Err(MaterialError::unexpected(
                    path,
                    statement,
                    &DefinitionKeyword::expected(),
                ));
            };
            match keyword {
                DefinitionKeyword::Type => {
                    definition.stage = match statement.argument() {
                        "Vertex" => ShaderStage::Vertex,
                        "Fragment" => ShaderStage::Fragment,
                        other => {
                            return Err(MaterialError::syntax(
                                path,
                                statement,
                                format!("Expected Vertex or Fragment, got '{other}'"),
                            ));
                        }
                    };
                    has_type = true;
                }
                DefinitionKeyword::Shader => {
                    let (language, source) = read_shader_statement(path, statement)?;
                    definition.add_source(language, source);
                }
                DefinitionKeyword::Documentation => {
                    if self.settings.load_documentation {
                        let text: Vec<&str> =
                            statement.contents().iter().map(Statement::line).collect();
                        definition.documentation = Some(text.join("\n"));
                    }
                }
                DefinitionKeyword::Input => {
                    for line in statement.contents() {
                        definition.inputs.push(read_variable(path, line, &mut input_names)?);
                    }
                }
                DefinitionKeyword::Output => {
                    for line in statement.contents() {
                        if line.line().trim() == "None" {
                            definition.no_output = true;
                        } else {
                            definition.outputs.push(read_variable(path, line, &mut output_names)?);
                        }
                    }
                }
            }
        }

        if !has_type {
            return Err(MaterialError::syntax(
                path,
                block,
                format!("Shader node definition {name} has no Type"),
            ));
        }
        if definition.sources.is_empty() {
            return Err(MaterialError::syntax(
                path,
                block,
                format!("Shader node definition {name} has no Shader"),
            ));
        }
        Ok(definition)
    }
}

/// `Shader [<Stage>] <Lang> : <path>`
fn read_shader_statement(path: &str, statement: &Statement) -> Result<(String, String)> {
    let line = statement.line().trim();
    let Some((head, source)) = line.split_once(':') else {
        return Err(MaterialError::syntax(
            path,
            statement,
            "Expected 'Shader <Lang> : <path>'",
        ));
    };
    let source = source.trim();
    let tokens: Vec<&str> = head.split_whitespace().skip(1).collect();
    let language = match tokens.as_slice() {
        [language] => *language,
        [stage, language] if ShaderStage::from_keyword(stage).is_some() => *language,
        _ => {
            return Err(MaterialError::syntax(
                path,
                statement,
                "Expected 'Shader [<Stage>] <Lang> : <path>'",
            ));
        }
    };
    if source.is_empty() {
        return Err(MaterialError::syntax(path, statement, "Missing shader source path"));
    }
    Ok((language.to_string(), source.to_string()))
}

/// `<type> <name>[<multiplicity>] [: <default>]`
fn read_variable(
    path: &str,
    statement: &Statement,
    names: &mut FxHashSet<String>,
) -> Result<ShaderNodeVariable> {
    let line = statement.line().trim();
    let (declaration, default_value) = match line.split_once(':') {
        Some((declaration, default)) => (declaration.trim(), Some(default.trim())),
        None => (line, None),
    };

    let Some((var_type, rest)) = declaration.split_once(char::is_whitespace) else {
        return Err(MaterialError::syntax(path, statement, "Expected '<type> <name>'"));
    };
    let rest: String = rest.split_whitespace().collect();

    let (name, multiplicity) = match rest.split_once('[') {
        Some((name, multiplicity)) => {
            let Some(multiplicity) = multiplicity.strip_suffix(']') else {
                return Err(MaterialError::syntax(path, statement, "Unclosed '[' in declaration"));
            };
            (name.to_string(), Some(multiplicity.to_string()))
        }
        None => (rest, None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(MaterialError::syntax(
            path,
            statement,
            format!("Invalid variable name '{name}'"),
        ));
    }
    if !names.insert(name.clone()) {
        return Err(MaterialError::semantic(
            path,
            statement,
            format!("Duplicate variable name {name}"),
        ));
    }

    let mut variable = ShaderNodeVariable::new(var_type, name).with_multiplicity(multiplicity);
    variable.default_value = default_value
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    Ok(variable)
}
