//! Shader Variables and Mappings
//!
//! A [`ShaderNodeVariable`] is a typed GLSL variable living in a
//! [`Namespace`]; a [`VariableMapping`] assigns one variable to another and
//! is the edge type of the node graph.
//!
//! # Naming
//!
//! | Namespace | Generated name |
//! |---|---|
//! | `Local` | `name` |
//! | `Global` | `Global_name` |
//! | `Attr` | `name` |
//! | `MatParam` / `WorldParam` | `m_name` / `g_name` |
//! | node `N` | `N_name` |

use std::fmt;

use serde::Serialize;

/// Namespace a variable resolves in, parsed once from the dotted prefix of
/// a mapping expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Namespace {
    /// Declared by a node definition, not yet bound to a node.
    #[default]
    Local,
    Global,
    Attribute,
    MaterialParam,
    WorldParam,
    /// Output or input of the node with this name.
    Node(String),
}

impl Namespace {
    #[must_use]
    pub fn parse(namespace: &str) -> Self {
        match namespace {
            "" => Self::Local,
            "Global" => Self::Global,
            "Attr" => Self::Attribute,
            "MatParam" => Self::MaterialParam,
            "WorldParam" => Self::WorldParam,
            node => Self::Node(node.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local => "",
            Self::Global => "Global",
            Self::Attribute => "Attr",
            Self::MaterialParam => "MatParam",
            Self::WorldParam => "WorldParam",
            Self::Node(name) => name,
        }
    }

    /// `true` for namespaces whose variables are declared as uniforms.
    #[inline]
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        matches!(self, Self::MaterialParam | Self::WorldParam)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ShaderNodeVariable {
    /// GLSL type, possibly a `|` separated list for texture parameters.
    pub var_type: String,
    pub name: String,
    pub namespace: Namespace,
    /// `m_` or `g_` for uniforms, empty otherwise.
    pub prefix: String,
    /// Array length: a literal or the name of an Int material parameter.
    pub multiplicity: Option<String>,
    /// Formatted `defined(...)` expression guarding the declaration.
    pub condition: Option<String>,
    /// Set when the variable is already declared as a stage output (a
    /// varying), so assignments to it must not redeclare it.
    pub shader_output: bool,
    /// GLSL expression used when a node input is left unmapped.
    pub default_value: Option<String>,
}

impl ShaderNodeVariable {
    #[must_use]
    pub fn new(var_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            var_type: var_type.into(),
            name: name.into(),
            namespace: Namespace::Local,
            prefix: String::new(),
            multiplicity: None,
            condition: None,
            shader_output: false,
            default_value: None,
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    #[must_use]
    pub fn with_multiplicity(mut self, multiplicity: Option<String>) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    /// Name of the variable in generated source.
    #[must_use]
    pub fn glsl_name(&self) -> String {
        match &self.namespace {
            Namespace::Local | Namespace::Attribute => self.name.clone(),
            Namespace::Global => format!("Global_{}", self.name),
            Namespace::MaterialParam | Namespace::WorldParam => {
                format!("{}{}", self.prefix, self.name)
            }
            Namespace::Node(node) => format!("{node}_{}", self.name),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_sampler(&self) -> bool {
        self.var_type.starts_with("sampler")
    }
}

impl fmt::Display for ShaderNodeVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != Namespace::Local {
            write!(f, "{}.", self.namespace)?;
        }
        f.write_str(&self.name)?;
        if let Some(multiplicity) = &self.multiplicity {
            write!(f, "[{multiplicity}]")?;
        }
        Ok(())
    }
}

/// `left = right` assignment of a node's input or output mapping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableMapping {
    pub left: ShaderNodeVariable,
    pub left_swizzle: String,
    pub right: ShaderNodeVariable,
    pub right_swizzle: String,
    pub condition: Option<String>,
}

impl VariableMapping {
    #[must_use]
    pub fn new(left: ShaderNodeVariable, right: ShaderNodeVariable) -> Self {
        Self {
            left,
            left_swizzle: String::new(),
            right,
            right_swizzle: String::new(),
            condition: None,
        }
    }
}

impl fmt::Display for VariableMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.left)?;
        if !self.left_swizzle.is_empty() {
            write!(f, ".{}", self.left_swizzle)?;
        }
        write!(f, " = {}", self.right)?;
        if !self.right_swizzle.is_empty() {
            write!(f, ".{}", self.right_swizzle)?;
        }
        if let Some(condition) = &self.condition {
            write!(f, " : {condition}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Type rules
// ============================================================================

/// Vector and scalar float types accept swizzles and widen/narrow freely.
#[must_use]
pub fn is_swizzlable(var_type: &str) -> bool {
    matches!(var_type, "float" | "vec2" | "vec3" | "vec4")
}

/// Component count of `var_type` after applying `swizzle`.
#[must_use]
pub fn cardinality(var_type: &str, swizzle: &str) -> usize {
    if !is_swizzlable(var_type) {
        return 0;
    }
    if !swizzle.is_empty() {
        return swizzle.len();
    }
    if var_type == "float" {
        return 1;
    }
    var_type
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map_or(0, |d| d as usize)
}

/// Equal types with equal swizzle length, or two swizzlable types with the
/// same post-swizzle cardinality.
#[must_use]
pub fn types_match(mapping: &VariableMapping) -> bool {
    let left = mapping.left.var_type.as_str();
    let right = mapping.right.var_type.as_str();
    if left == right && mapping.left_swizzle.len() == mapping.right_swizzle.len() {
        return true;
    }
    is_swizzlable(left)
        && is_swizzlable(right)
        && cardinality(left, &mapping.left_swizzle) == cardinality(right, &mapping.right_swizzle)
}

/// Both sides scalar, or both arrays with the same multiplicity (ignoring
/// case, since parameter multiplicities are compared as define names).
#[must_use]
pub fn multiplicity_match(mapping: &VariableMapping) -> bool {
    match (&mapping.left.multiplicity, &mapping.right.multiplicity) {
        (None, None) => true,
        (Some(left), Some(right)) => left.eq_ignore_ascii_case(right),
        _ => false,
    }
}
