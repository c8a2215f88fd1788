//! Material parameter value types.

use crate::statement::keyword_table;

keyword_table! {
    /// Value type of a material parameter, spelled as in `MaterialParameters`.
    ///
    /// `Color` is accepted by the loader as sugar for [`VarType::Vector4`] and
    /// is not part of this table.
    pub enum VarType {
        Float => "Float",
        Vector2 => "Vector2",
        Vector3 => "Vector3",
        Vector4 => "Vector4",
        Int => "Int",
        Boolean => "Boolean",
        Matrix3 => "Matrix3",
        Matrix4 => "Matrix4",
        FloatArray => "FloatArray",
        Vector2Array => "Vector2Array",
        Vector3Array => "Vector3Array",
        Vector4Array => "Vector4Array",
        IntArray => "IntArray",
        Matrix3Array => "Matrix3Array",
        Matrix4Array => "Matrix4Array",
        Texture2D => "Texture2D",
        Texture3D => "Texture3D",
        TextureArray => "TextureArray",
        TextureCubeMap => "TextureCubeMap",
    }
}

impl VarType {
    /// GLSL type used to declare a uniform of this type.
    ///
    /// Texture types may list several accepted sampler types separated by `|`;
    /// the node input consuming the parameter picks one of them.
    #[must_use]
    pub fn glsl_type(self) -> &'static str {
        match self {
            Self::Float | Self::FloatArray => "float",
            Self::Vector2 | Self::Vector2Array => "vec2",
            Self::Vector3 | Self::Vector3Array => "vec3",
            Self::Vector4 | Self::Vector4Array => "vec4",
            Self::Int | Self::IntArray => "int",
            Self::Boolean => "bool",
            Self::Matrix3 | Self::Matrix3Array => "mat3",
            Self::Matrix4 | Self::Matrix4Array => "mat4",
            Self::Texture2D => "sampler2D|sampler2DShadow",
            Self::Texture3D => "sampler3D",
            Self::TextureArray => "sampler2DArray|sampler2DArrayShadow",
            Self::TextureCubeMap => "samplerCube",
        }
    }

    #[inline]
    #[must_use]
    pub fn is_texture(self) -> bool {
        matches!(
            self,
            Self::Texture2D | Self::Texture3D | Self::TextureArray | Self::TextureCubeMap
        )
    }

    #[inline]
    #[must_use]
    pub fn is_array(self) -> bool {
        matches!(
            self,
            Self::FloatArray
                | Self::Vector2Array
                | Self::Vector3Array
                | Self::Vector4Array
                | Self::IntArray
                | Self::Matrix3Array
                | Self::Matrix4Array
        )
    }

    /// Number of whitespace separated tokens a literal of this type takes in
    /// a material file, `None` for types without a literal form.
    #[must_use]
    pub fn literal_token_count(self) -> Option<usize> {
        match self {
            Self::Float | Self::Int | Self::Boolean => Some(1),
            Self::Vector2 => Some(2),
            Self::Vector3 => Some(3),
            Self::Vector4 => Some(4),
            _ => None,
        }
    }

    /// Parses a type token of a parameter declaration, including `Color`.
    #[must_use]
    pub fn from_declaration(token: &str) -> Option<Self> {
        if token == "Color" {
            return Some(Self::Vector4);
        }
        Self::from_keyword(token)
    }
}

/// Resolves a `|` separated list of GLSL types against the type requested by
/// a node input. Returns the requested type when it is one of the options.
#[must_use]
pub fn resolve_glsl_type<'a>(declared: &'a str, requested: &str) -> Option<&'a str> {
    declared.split('|').find(|candidate| *candidate == requested)
}
