//! Material Definitions
//!
//! A [`MaterialDefinition`] declares the parameters a material exposes and
//! the techniques able to render it. A [`MaterialInstance`] picks a
//! definition and assigns concrete parameter values.

mod instance;

pub use instance::MaterialInstance;

use glam::{Vec2, Vec3, Vec4};
use serde::Serialize;

use crate::resources::technique::{DEFAULT_TECHNIQUE_NAME, TechniqueDefinition};
use crate::resources::texture::TextureKey;
use crate::resources::var_type::VarType;

/// Prefix of material parameter uniforms in generated source.
pub const MATERIAL_UNIFORM_PREFIX: &str = "m_";

/// Color space hint of a texture parameter (`-LINEAR` in declarations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ColorSpace {
    #[default]
    Srgb,
    Linear,
}

/// Concrete value of a material parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Boolean(bool),
    Vector2(Vec2),
    Vector3(Vec3),
    Vector4(Vec4),
    Texture(TextureKey),
}

impl ParamValue {
    /// Raw define payload for this value, `None` when the define is unset.
    #[must_use]
    pub fn define_payload(&self) -> Option<u32> {
        match self {
            Self::Int(value) => Some(value.cast_unsigned()),
            Self::Float(value) => Some(value.to_bits()),
            Self::Boolean(value) => value.then_some(1),
            Self::Vector2(_) | Self::Vector3(_) | Self::Vector4(_) | Self::Texture(_) => Some(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialParameter {
    pub name: String,
    pub var_type: VarType,
    pub value: Option<ParamValue>,
    pub color_space: Option<ColorSpace>,
    /// Legacy fixed-function binding name given in parentheses.
    pub ff_binding: Option<String>,
}

impl MaterialParameter {
    #[must_use]
    pub fn new(name: impl Into<String>, var_type: VarType) -> Self {
        Self {
            name: name.into(),
            var_type,
            value: None,
            color_space: None,
            ff_binding: None,
        }
    }

    /// Uniform name in generated source, e.g. `m_Color`.
    #[must_use]
    pub fn uniform_name(&self) -> String {
        format!("{MATERIAL_UNIFORM_PREFIX}{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct MaterialDefinition {
    name: String,
    asset_name: String,
    params: Vec<MaterialParameter>,
    techniques: Vec<TechniqueDefinition>,
}

impl MaterialDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, asset_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset_name: asset_name.into(),
            params: Vec::new(),
            techniques: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    /// Declares a parameter, replacing an earlier one with the same name.
    pub fn add_param(&mut self, param: MaterialParameter) {
        if let Some(existing) = self.params.iter_mut().find(|p| p.name == param.name) {
            *existing = param;
        } else {
            self.params.push(param);
        }
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&MaterialParameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[MaterialParameter] {
        &self.params
    }

    pub fn add_technique(&mut self, technique: TechniqueDefinition) {
        log::debug!(
            "Registered technique '{}' ({:#018x}) on {}",
            technique.name(),
            technique.id(),
            self.asset_name
        );
        self.techniques.push(technique);
    }

    /// All techniques, language variants of one technique are adjacent.
    #[must_use]
    pub fn techniques(&self) -> &[TechniqueDefinition] {
        &self.techniques
    }

    /// Every variant registered under `name`.
    pub fn techniques_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a TechniqueDefinition> + 'a {
        self.techniques.iter().filter(move |t| t.name() == name)
    }

    /// First variant of the `Default` technique.
    #[must_use]
    pub fn default_technique(&self) -> Option<&TechniqueDefinition> {
        self.techniques_named(DEFAULT_TECHNIQUE_NAME).next()
    }

    /// Distinct technique names in registration order.
    #[must_use]
    pub fn technique_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for technique in &self.techniques {
            if !names.contains(&technique.name()) {
                names.push(technique.name());
            }
        }
        names
    }
}
